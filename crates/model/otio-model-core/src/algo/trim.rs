use otio_time_core::TimeRange;

use crate::error::{Error, ErrorKind, Result};
use crate::object::Object;
use crate::schemas::{Track, Transition};

pub(crate) fn expect_track(object: &Object) -> Result<()> {
    if object.is::<Track>() {
        return Ok(());
    }
    Err(Error::new(
        ErrorKind::TypeMismatch,
        format!("expected a Track, found {}", object.schema_name()),
    ))
}

/// Copy of `track` holding only what lies inside `range`.
///
/// Children outside the range are dropped and children straddling an edge
/// have their source range shortened. A transition straddling an edge cannot
/// be cut and fails with `CannotTrimTransition`.
pub fn track_trimmed_to_range(track: &Object, range: TimeRange) -> Result<Object> {
    expect_track(track)?;
    let trimmed = track.deep_clone()?;
    let child_ranges = trimmed.range_of_all_children()?;

    for (index, (child, child_range)) in child_ranges.iter().enumerate().rev() {
        if !range.overlaps(*child_range) {
            trimmed.remove_child(index)?;
            continue;
        }
        if range.contains_range(*child_range) {
            continue;
        }
        if child.is::<Transition>() {
            return Err(Error::new(
                ErrorKind::CannotTrimTransition,
                format!("{child:?} straddles the edge of {range}"),
            ));
        }
        if !child.is_item() {
            return Err(Error::new(
                ErrorKind::TypeMismatch,
                format!("expected an item, found {}", child.schema_name()),
            ));
        }

        let mut source = child.trimmed_range()?;
        if range.start_time() > child_range.start_time() {
            let cut = range.start_time() - child_range.start_time();
            source = TimeRange::new(source.start_time() + cut, source.duration() - cut);
        }
        let range_end = range.end_time_exclusive();
        let child_end = child_range.end_time_exclusive();
        if range_end < child_end {
            let cut = child_end - range_end;
            source = TimeRange::new(source.start_time(), source.duration() - cut);
        }
        child.set_source_range(Some(source))?;
    }
    Ok(trimmed)
}
