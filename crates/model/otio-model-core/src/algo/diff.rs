use log::debug;

use crate::error::Result;
use crate::object::Object;
use crate::schemas::{Gap, Stack, Track};

use super::trim::expect_track;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffOp {
    Common,
    Added,
    Removed,
}

/// One step of a track diff. `before_index` is set for `Common` and
/// `Removed`, `after_index` for `Common` and `Added`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffResult {
    pub op: DiffOp,
    pub before_index: Option<usize>,
    pub after_index: Option<usize>,
}

impl DiffResult {
    fn common(before: usize, after: usize) -> Self {
        Self {
            op: DiffOp::Common,
            before_index: Some(before),
            after_index: Some(after),
        }
    }

    fn added(after: usize) -> Self {
        Self {
            op: DiffOp::Added,
            before_index: None,
            after_index: Some(after),
        }
    }

    fn removed(before: usize) -> Self {
        Self {
            op: DiffOp::Removed,
            before_index: Some(before),
            after_index: None,
        }
    }
}

/// Longest-common-subsequence diff of two tracks' children, compared by
/// equivalence. Entries come out in timeline order, removals before
/// additions at the same position.
pub fn track_clip_diff(before: &Object, after: &Object) -> Result<Vec<DiffResult>> {
    expect_track(before)?;
    expect_track(after)?;
    let old = before.children();
    let new = after.children();
    let (n, m) = (old.len(), new.len());

    let same: Vec<Vec<bool>> = old
        .iter()
        .map(|a| new.iter().map(|b| a.is_equivalent_to(b)).collect())
        .collect();

    // lcs[i][j] is the common length of old[i..] and new[j..].
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if same[i][j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut out = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if same[i][j] {
            out.push(DiffResult::common(i, j));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            out.push(DiffResult::removed(i));
            i += 1;
        } else {
            out.push(DiffResult::added(j));
            j += 1;
        }
    }
    out.extend((i..n).map(DiffResult::removed));
    out.extend((j..m).map(DiffResult::added));

    debug!(
        "track diff: {} common, {} removed, {} added",
        out.iter().filter(|d| d.op == DiffOp::Common).count(),
        out.iter().filter(|d| d.op == DiffOp::Removed).count(),
        out.iter().filter(|d| d.op == DiffOp::Added).count(),
    );
    Ok(out)
}

/// A Stack named `diff` with the tracks `added`, `common` and `removed`,
/// laid out so each child sits at the same time in every lane. Lanes that
/// do not hold a given child get a gap of its duration instead.
pub fn track_diff_stack(before: &Object, after: &Object) -> Result<Object> {
    let diff = track_clip_diff(before, after)?;
    let old = before.children();
    let new = after.children();

    let lanes = [
        Object::new(Track::named("added")),
        Object::new(Track::named("common")),
        Object::new(Track::named("removed")),
    ];
    for step in diff {
        let (lane, source) = match (step.op, step.before_index, step.after_index) {
            (DiffOp::Added, _, Some(j)) => (0, &new[j]),
            (DiffOp::Common, _, Some(j)) => (1, &new[j]),
            (DiffOp::Removed, Some(i), _) => (2, &old[i]),
            _ => continue,
        };
        lanes[lane].append_child(&source.deep_clone()?)?;
        if !source.is_item() {
            continue;
        }
        let duration = source.duration()?;
        for (index, other) in lanes.iter().enumerate() {
            if index != lane {
                other.append_child(&Object::new(Gap::with_duration(duration)))?;
            }
        }
    }

    let stack = Object::new(Stack::named("diff"));
    for lane in &lanes {
        stack.append_child(lane)?;
    }
    Ok(stack)
}
