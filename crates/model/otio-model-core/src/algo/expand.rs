use otio_time_core::{RationalTime, TimeRange};

use crate::error::{Error, ErrorKind, Result};
use crate::object::Object;
use crate::schemas::{Gap, Transition};

use super::trim::expect_track;

/// One entry of [`track_with_expanded_transitions`].
#[derive(Debug, Clone)]
pub enum ExpandedChild {
    /// A copy of an item, trimmed by the transitions on either side of it.
    Item(Object),
    /// A copy of a transition with copies of the media it blends: the end of
    /// the outgoing item and the start of the incoming one.
    Transition {
        pre: Object,
        transition: Object,
        post: Object,
    },
}

#[derive(Clone, Copy)]
struct Offsets {
    in_offset: RationalTime,
    out_offset: RationalTime,
}

fn offsets(child: &Object) -> Option<Offsets> {
    child.downcast_ref::<Transition>().map(|t| Offsets {
        in_offset: t.in_offset,
        out_offset: t.out_offset,
    })
}

fn adjacent_transitions(first: &Object, second: &Object) -> Error {
    Error::new(
        ErrorKind::TypeMismatch,
        format!("transition {second:?} directly follows {first:?}"),
    )
}

fn renamed_copy(item: &Object, suffix: &str, range: impl FnOnce(TimeRange) -> TimeRange) -> Result<Object> {
    let copy = item.deep_clone()?;
    copy.set_name(format!("{}{suffix}", copy.name()))?;
    let trimmed = copy.trimmed_range()?;
    copy.set_source_range(Some(range(trimmed)))?;
    Ok(copy)
}

/// Copies of the children of `track` with every transition expanded into
/// the overlapping parts of its neighbours.
///
/// `A, T, B` becomes `A', (A_t, T, B_t), B'`, where `A'` and `B'` lose the
/// frames the transition covers and `A_t`/`B_t` hold exactly those frames.
/// A transition at either end of the track blends with an implied gap. Two
/// transitions in a row fail with `TypeMismatch`. The track is not modified.
pub fn track_with_expanded_transitions(track: &Object) -> Result<Vec<ExpandedChild>> {
    expect_track(track)?;
    let children = track.children();
    let mut out = Vec::with_capacity(children.len());

    for (index, child) in children.iter().enumerate() {
        let previous = index.checked_sub(1).and_then(|i| children.get(i));
        let next = children.get(index + 1);

        let Some(Offsets { in_offset, out_offset }) = offsets(child) else {
            let before = previous.and_then(offsets);
            let after = next.and_then(offsets);
            let copy = child.deep_clone()?;
            let mut range = copy.trimmed_range()?;
            if let Some(before) = before {
                range = TimeRange::new(
                    range.start_time() + before.out_offset,
                    range.duration() - before.out_offset,
                );
            }
            if let Some(after) = after {
                range = TimeRange::new(range.start_time(), range.duration() - after.in_offset);
            }
            copy.set_source_range(Some(range))?;
            out.push(ExpandedChild::Item(copy));
            continue;
        };

        let span = in_offset + out_offset;
        let pre_source = match previous {
            Some(previous) if previous.is::<Transition>() => {
                return Err(adjacent_transitions(previous, child));
            }
            Some(previous) => previous.clone(),
            None => Object::new(Gap::with_duration(in_offset)),
        };
        let post_source = match next {
            Some(next) if next.is::<Transition>() => {
                return Err(adjacent_transitions(child, next));
            }
            Some(next) => next.clone(),
            None => Object::new(Gap::with_duration(out_offset)),
        };

        let pre = renamed_copy(&pre_source, "_transition_pre", |trimmed| {
            TimeRange::new(trimmed.end_time_exclusive() - in_offset, span)
        })?;
        let post = renamed_copy(&post_source, "_transition_post", |trimmed| {
            TimeRange::new(trimmed.start_time() - in_offset, span)
        })?;
        out.push(ExpandedChild::Transition {
            pre,
            transition: child.deep_clone()?,
            post,
        });
    }
    Ok(out)
}
