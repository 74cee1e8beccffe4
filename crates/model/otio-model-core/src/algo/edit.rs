//! Track-level edit operations.
//!
//! Times and ranges are in the track's own child coordinates, the same
//! coordinates as [`Object::range_of_all_children`]. Each operation computes
//! every new range before it mutates the track, so a failed call leaves the
//! track as it was.

use log::debug;
use otio_time_core::{RationalTime, TimeRange};
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};
use crate::object::Object;
use crate::schemas::{Gap, LinearTimeWarp, Transition};

use super::trim::expect_track;

// Smallest step still resolvable next to one million seconds.
const DOUBLE_EPSILON: f64 = 5.82077e-11;

/// How [`fill`] places an item into a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferencePoint {
    /// Keep the item's own trimmed range.
    #[default]
    Source,
    /// Clip the item to the part of its range that lines up with the gap.
    Sequence,
    /// Retime the item with a time warp so it spans the rest of the gap.
    Fit,
}

fn is_zero(time: RationalTime) -> bool {
    time.value().abs() <= DOUBLE_EPSILON
}

fn zero_at(rate: f64) -> RationalTime {
    RationalTime::new(0.0, rate)
}

fn not_an_item(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::NotAnItem, message)
}

fn expect_free_item(item: &Object) -> Result<()> {
    if !item.is_item() {
        return Err(not_an_item(format!("{} is not an item", item.schema_name())));
    }
    if item.parent().is_some() {
        return Err(Error::new(
            ErrorKind::ChildAlreadyParented,
            format!("{item:?} already has a parent"),
        ));
    }
    Ok(())
}

fn parent_of(item: &Object) -> Result<(Object, usize)> {
    let parent = item.parent().ok_or_else(|| {
        Error::new(ErrorKind::NotAChild, format!("{item:?} has no parent"))
    })?;
    let index = parent.index_of_child(item)?;
    Ok((parent, index))
}

/// The item neighbour at `index`, or `None` past either end.
fn neighbour_item(children: &[Object], index: Option<usize>) -> Result<Option<Object>> {
    let Some(child) = index.and_then(|i| children.get(i)) else {
        return Ok(None);
    };
    if child.is::<Transition>() {
        return Err(Error::new(
            ErrorKind::CannotTrimTransition,
            format!("{child:?} borders the edited item"),
        ));
    }
    Ok(Some(child.clone()))
}

/// The item's available range when it has a meaningful one.
fn media_bounds(item: &Object) -> Result<Option<TimeRange>> {
    match item.available_range() {
        Ok(range) if !is_zero(range.duration()) => Ok(Some(range)),
        Ok(_) => Ok(None),
        Err(err) if err.kind() == ErrorKind::CannotComputeAvailableRange => Ok(None),
        Err(err) => Err(err),
    }
}

/// A fill item spanning `range`: a clone of `template`, or a plain Gap.
fn make_fill(template: Option<&Object>, range: TimeRange) -> Result<Object> {
    let fill = match template {
        Some(template) => {
            let fill = template.deep_clone()?;
            if !fill.is_item() {
                return Err(not_an_item(format!(
                    "fill template {} is not an item",
                    fill.schema_name()
                )));
            }
            fill
        }
        None => Object::new(Gap::default()),
    };
    fill.set_source_range(Some(range))?;
    Ok(fill)
}

fn fill_for(template: Option<&Object>, duration: RationalTime) -> Result<Object> {
    make_fill(template, TimeRange::new(zero_at(duration.rate()), duration))
}

fn content_range(track: &Object) -> Result<TimeRange> {
    track.available_range()
}

/// The item (not transition) whose track range contains `time`.
fn item_at_time(track: &Object, time: RationalTime) -> Result<Option<(usize, Object, TimeRange)>> {
    let found = track
        .range_of_all_children()?
        .into_iter()
        .enumerate()
        .find(|(_, (child, range))| child.is_item() && range.contains_time(time))
        .map(|(index, (child, range))| (index, child, range));
    Ok(found)
}

fn items_overlapping(track: &Object, range: TimeRange) -> Result<Vec<(usize, Object, TimeRange)>> {
    Ok(track
        .range_of_all_children()?
        .into_iter()
        .enumerate()
        .filter(|(_, (child, child_range))| child.is_item() && range.overlaps(*child_range))
        .map(|(index, (child, child_range))| (index, child, child_range))
        .collect())
}

fn remove_transitions_overlapping(track: &Object, range: TimeRange) -> Result<()> {
    let doomed: Vec<usize> = track
        .range_of_all_children()?
        .into_iter()
        .enumerate()
        .filter(|(_, (child, child_range))| child.is::<Transition>() && range.overlaps(*child_range))
        .map(|(index, _)| index)
        .collect();
    for index in doomed.into_iter().rev() {
        track.remove_child(index)?;
    }
    Ok(())
}

/// Put `item` over `range` of `track`, cutting or removing whatever was
/// there. A range past the end appends after a fill; a range before the
/// start prepends before one.
pub fn overwrite(
    item: &Object,
    track: &Object,
    range: TimeRange,
    remove_transitions: bool,
    fill_template: Option<&Object>,
) -> Result<()> {
    expect_track(track)?;
    expect_free_item(item)?;
    let bounds = content_range(track)?;

    if range.start_time() >= bounds.end_time_exclusive() {
        let hole = range.start_time() - bounds.end_time_exclusive();
        if !is_zero(hole) {
            track.append_child(&fill_for(fill_template, hole)?)?;
        }
        return track.append_child(item);
    }
    if range.end_time_exclusive() < bounds.start_time() {
        let hole = bounds.start_time() - range.end_time_exclusive();
        if !is_zero(hole) {
            track.insert_child(0, &fill_for(fill_template, hole)?)?;
        }
        return track.insert_child(0, item);
    }

    if remove_transitions {
        remove_transitions_overlapping(track, range)?;
    }
    let mut covered = items_overlapping(track, range)?;
    let Some((first_index, first, first_range)) = covered.first().cloned() else {
        return Err(not_an_item(format!("nothing to overwrite within {range}")));
    };
    let item_start = item.trimmed_range()?.start_time();
    let placed = TimeRange::new(item_start, range.duration());

    if covered.len() == 1 && first_range.contains_range(range) {
        // Cut a hole inside a single item.
        let head = range.start_time() - first_range.start_time();
        let tail = first_range.end_time_exclusive() - range.end_time_exclusive();
        let source = first.trimmed_range()?;
        let second = if is_zero(tail) {
            None
        } else {
            let second = first.deep_clone()?;
            second.set_source_range(Some(TimeRange::new(
                source.start_time() + head + range.duration(),
                tail,
            )))?;
            Some(second)
        };

        let mut insert_at = first_index;
        if is_zero(head) {
            track.remove_child(first_index)?;
        } else {
            first.set_source_range(Some(TimeRange::new(source.start_time(), head)))?;
            insert_at += 1;
        }
        item.set_source_range(Some(placed))?;
        track.insert_child(insert_at, item)?;
        if let Some(second) = second {
            track.insert_child(insert_at + 1, &second)?;
        }
        return Ok(());
    }

    // Shorten the items straddling either edge; drop the ones fully covered.
    let mut insert_at = first_index;
    let mut edits = Vec::new();
    if first_range.start_time() < range.start_time() {
        let source = first.trimmed_range()?;
        let kept = range.start_time() - first_range.start_time();
        edits.push((first.clone(), TimeRange::new(source.start_time(), kept)));
        covered.remove(0);
        insert_at += 1;
    }
    if let Some((_, last, last_range)) = covered.last().cloned() {
        if last_range.end_time_exclusive() > range.end_time_exclusive() {
            let source = last.trimmed_range()?;
            let cut = range.end_time_exclusive() - last_range.start_time();
            edits.push((
                last,
                TimeRange::new(source.start_time() + cut, source.duration() - cut),
            ));
            covered.pop();
        }
    }

    for (child, source) in edits {
        child.set_source_range(Some(source))?;
    }
    for (index, _, _) in covered.iter().rev() {
        track.remove_child(*index)?;
    }
    item.set_source_range(Some(placed))?;
    track.insert_child(insert_at, item)
}

/// Insert `item` at `time`, splitting the item found there. Everything
/// after the insertion point moves later by the item's duration.
pub fn insert(
    item: &Object,
    track: &Object,
    time: RationalTime,
    remove_transitions: bool,
    fill_template: Option<&Object>,
) -> Result<()> {
    expect_track(track)?;
    expect_free_item(item)?;
    if remove_transitions {
        remove_transitions_overlapping(track, TimeRange::new(time, RationalTime::new(1.0, time.rate())))?;
    }

    let bounds = content_range(track)?;
    let Some((index, target, target_range)) = item_at_time(track, time)? else {
        if time >= bounds.end_time_exclusive() {
            let hole = time - bounds.end_time_exclusive();
            if !is_zero(hole) {
                track.append_child(&fill_for(fill_template, hole)?)?;
            }
            return track.append_child(item);
        }
        if time < bounds.start_time() {
            return track.insert_child(0, item);
        }
        return Err(Error::new(
            ErrorKind::InternalError,
            format!("no item at {time} inside {bounds}"),
        ));
    };

    let head = time - target_range.start_time();
    if is_zero(head) {
        return track.insert_child(index, item);
    }

    let source = target.trimmed_range()?;
    let tail = target_range.end_time_exclusive() - time;
    let second = if is_zero(tail) {
        None
    } else {
        let second = target.deep_clone()?;
        second.set_source_range(Some(TimeRange::new(source.start_time() + head, tail)))?;
        Some(second)
    };
    target.set_source_range(Some(TimeRange::new(source.start_time(), head)))?;
    track.insert_child(index + 1, item)?;
    if let Some(second) = second {
        track.insert_child(index + 2, &second)?;
    }
    Ok(())
}

/// Move the in and out points of `item` without moving its neighbours.
///
/// The previous item absorbs `delta_in`. A following gap absorbs
/// `delta_out`. When the item shortens in front of another item, a fill is
/// inserted behind it. A later edge that would run into a following item is
/// left alone.
pub fn trim(
    item: &Object,
    delta_in: RationalTime,
    delta_out: RationalTime,
    fill_template: Option<&Object>,
) -> Result<()> {
    let (track, index) = parent_of(item)?;
    let children = track.children();
    let range = item.trimmed_range()?;
    let mut start = range.start_time();
    let mut end = range.end_time_exclusive();

    let mut previous_edit = None;
    if !is_zero(delta_in) {
        start += delta_in;
        if let Some(previous) = neighbour_item(&children, index.checked_sub(1))? {
            let previous_range = previous.trimmed_range()?;
            previous_edit = Some((
                previous,
                TimeRange::new(previous_range.start_time(), previous_range.duration() + delta_in),
            ));
        }
    }

    let mut next_edit = None;
    let mut fill = None;
    if !is_zero(delta_out) {
        match neighbour_item(&children, Some(index + 1))? {
            None => end += delta_out,
            Some(next) if next.is::<Gap>() => {
                let gap_range = next.trimmed_range()?;
                let shift = delta_out.min(gap_range.duration());
                end += shift;
                next_edit = Some((
                    next,
                    TimeRange::new(gap_range.start_time() + shift, gap_range.duration() - shift),
                ));
            }
            Some(_) if delta_out.value() < 0.0 => {
                end += delta_out;
                fill = Some(fill_for(fill_template, -delta_out)?);
            }
            Some(_) => {}
        }
    }
    if end < start {
        return Err(Error::new(
            ErrorKind::InvalidTimeRange,
            format!("trim leaves {item:?} with a negative duration"),
        ));
    }

    if let Some((previous, source)) = previous_edit {
        previous.set_source_range(Some(source))?;
    }
    if let Some((next, source)) = next_edit {
        next.set_source_range(Some(source))?;
    }
    if let Some(fill) = fill {
        track.insert_child(index + 1, &fill)?;
    }
    item.set_source_range(Some(TimeRange::range_from_start_end_time(start, end)))
}

/// Cut the item under `time` in two. Transitions spanning the cut are
/// removed, or fail with `CannotTrimTransition` when `remove_transitions` is
/// false. Cutting exactly on an item boundary does nothing.
pub fn slice(track: &Object, time: RationalTime, remove_transitions: bool) -> Result<()> {
    expect_track(track)?;
    let Some((index, target, target_range)) = item_at_time(track, time)? else {
        return Err(not_an_item(format!("no item at {time}")));
    };
    let head = time - target_range.start_time();
    if is_zero(head) {
        return Ok(());
    }

    let ranges = track.range_of_all_children()?;
    let crossing: Vec<usize> = [index.checked_sub(1), Some(index + 1)]
        .into_iter()
        .flatten()
        .filter(|i| {
            ranges
                .get(*i)
                .is_some_and(|(child, range)| child.is::<Transition>() && range.contains_time(time))
        })
        .collect();
    if !crossing.is_empty() && !remove_transitions {
        return Err(Error::new(
            ErrorKind::CannotTrimTransition,
            format!("a transition spans the cut at {time}"),
        ));
    }

    let source = target.trimmed_range()?;
    let second = target.deep_clone()?;
    second.set_source_range(Some(TimeRange::new(
        source.start_time() + head,
        target_range.duration() - head,
    )))?;
    for i in crossing.into_iter().rev() {
        track.remove_child(i)?;
    }
    target.set_source_range(Some(TimeRange::new(source.start_time(), head)))?;
    let index = track.index_of_child(&target)?;
    track.insert_child(index + 1, &second)
}

/// Shift the media under `item` by `delta`, keeping its position and
/// duration. The result is clamped to the media's available range.
pub fn slip(item: &Object, delta: RationalTime) -> Result<()> {
    let range = item.trimmed_range()?;
    let mut start = range.start_time() + delta;
    if let Some(bounds) = media_bounds(item)? {
        if start < bounds.start_time() {
            start = bounds.start_time();
        } else if start + range.duration() > bounds.end_time_exclusive() {
            start = bounds.end_time_exclusive() - range.duration();
        }
    }
    item.set_source_range(Some(TimeRange::new(start, range.duration())))
}

/// Move `item` along the track by lengthening or shortening the item before
/// it. The first item of a track cannot slide, and a slide that would
/// consume the whole previous item is ignored.
pub fn slide(item: &Object, delta: RationalTime) -> Result<()> {
    let (track, index) = parent_of(item)?;
    if index == 0 || is_zero(delta) {
        return Ok(());
    }
    let children = track.children();
    let Some(previous) = neighbour_item(&children, Some(index - 1))? else {
        return Ok(());
    };

    let range = previous.trimmed_range()?;
    let mut offset = delta;
    if delta.value() < 0.0 {
        if range.duration() <= -delta {
            debug!("slide of {delta} would consume {previous:?}; ignored");
            return Ok(());
        }
    } else if let Some(bounds) = media_bounds(&previous)? {
        if range.duration() + delta > bounds.duration() {
            offset = bounds.duration() - range.duration();
        }
    }
    previous.set_source_range(Some(TimeRange::new(range.start_time(), range.duration() + offset)))
}

/// Move the in and out points of `item`; everything after it moves with the
/// changed duration. Both points stay inside the available media.
pub fn ripple(item: &Object, delta_in: RationalTime, delta_out: RationalTime) -> Result<()> {
    let range = item.trimmed_range()?;
    let bounds = media_bounds(item)?;
    let mut start = range.start_time();
    let mut end = range.end_time_exclusive();

    if !is_zero(delta_in) {
        start = (start + delta_in).min(end);
        if let Some(bounds) = bounds {
            start = start.max(bounds.start_time());
        }
    }
    if !is_zero(delta_out) {
        end = (end + delta_out).max(start);
        if let Some(bounds) = bounds {
            end = end.min(bounds.end_time_exclusive());
        }
    }
    item.set_source_range(Some(TimeRange::range_from_start_end_time(start, end)))
}

/// Move the edit points on either side of `item`. The neighbours change
/// length to match, so the track keeps its duration.
pub fn roll(item: &Object, delta_in: RationalTime, delta_out: RationalTime) -> Result<()> {
    let (track, index) = parent_of(item)?;
    let children = track.children();
    let range = item.trimmed_range()?;
    let mut start = range.start_time();
    let mut end = range.end_time_exclusive();

    let mut previous_edit = None;
    if !is_zero(delta_in) {
        let mut offset = delta_in.min(range.duration());
        if let Some(bounds) = media_bounds(item)? {
            offset = offset.max(bounds.start_time() - start);
        }
        if let Some(previous) = neighbour_item(&children, index.checked_sub(1))? {
            let previous_range = previous.trimmed_range()?;
            offset = offset.max(-previous_range.duration());
            previous_edit = Some((
                previous,
                TimeRange::new(previous_range.start_time(), previous_range.duration() + offset),
            ));
        }
        start += offset;
    }

    let mut next_edit = None;
    if !is_zero(delta_out) {
        if let Some(next) = neighbour_item(&children, Some(index + 1))? {
            let next_range = next.trimmed_range()?;
            let floor = match media_bounds(&next)? {
                Some(bounds) => bounds.start_time(),
                None => zero_at(next_range.start_time().rate()),
            };
            let offset = delta_out
                .max(floor - next_range.start_time())
                .max(start - end)
                .min(next_range.duration());
            end += offset;
            next_edit = Some((
                next,
                TimeRange::new(next_range.start_time() + offset, next_range.duration() - offset),
            ));
        }
    }

    if let Some((previous, source)) = previous_edit {
        previous.set_source_range(Some(source))?;
    }
    if let Some((next, source)) = next_edit {
        next.set_source_range(Some(source))?;
    }
    item.set_source_range(Some(TimeRange::range_from_start_end_time(start, end)))
}

/// Place `item` into the gap found at `track_time`.
pub fn fill(
    item: &Object,
    track: &Object,
    track_time: RationalTime,
    reference_point: ReferencePoint,
) -> Result<()> {
    expect_track(track)?;
    expect_free_item(item)?;
    let gap = track
        .children_at_time(track_time, true)?
        .into_iter()
        .find(|child| child.is::<Gap>())
        .ok_or_else(|| {
            Error::new(ErrorKind::TypeMismatch, format!("no gap at {track_time}"))
        })?;

    let clip_range = item.trimmed_range()?;
    let gap_source = gap.trimmed_range()?;
    let gap_in_track = track.range_of_child(&gap)?;
    let room = gap_in_track.end_time_exclusive() - track_time;

    match reference_point {
        ReferencePoint::Source => overwrite(
            item,
            track,
            TimeRange::new(track_time, clip_range.duration()),
            true,
            None,
        ),
        ReferencePoint::Sequence => {
            let start = clip_range.start_time().max(gap_source.start_time());
            let end = clip_range
                .end_time_exclusive()
                .min(gap_source.end_time_exclusive());
            let duration = (end - start).min(room);
            if duration.value() <= 0.0 {
                return Err(Error::new(
                    ErrorKind::InvalidTimeRange,
                    format!("{clip_range} does not line up with {gap_source}"),
                ));
            }
            let placed = item.deep_clone()?;
            placed.set_source_range(Some(TimeRange::new(start, duration)))?;
            overwrite(&placed, track, TimeRange::new(track_time, duration), true, None)
        }
        ReferencePoint::Fit => {
            let scalar = clip_range.duration().to_seconds() / room.to_seconds();
            let name = item.name();
            item.add_effect(Object::new(LinearTimeWarp::new(format!("{name}_timeWarp"), scalar)))?;
            item.set_source_range(Some(TimeRange::new(clip_range.start_time(), room)))?;
            overwrite(item, track, TimeRange::new(track_time, room), true, None)
        }
    }
}

/// Take out the item under `time`. With `fill`, a gap (or a clone of
/// `fill_template`) of the same range takes its place.
pub fn remove(
    track: &Object,
    time: RationalTime,
    fill: bool,
    fill_template: Option<&Object>,
) -> Result<Object> {
    expect_track(track)?;
    let Some((index, target, _)) = item_at_time(track, time)? else {
        return Err(not_an_item(format!("no item at {time}")));
    };
    let replacement = if fill {
        Some(make_fill(fill_template, target.trimmed_range()?)?)
    } else {
        None
    };
    let removed = track.remove_child(index)?;
    if let Some(replacement) = replacement {
        track.insert_child(index, &replacement)?;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{Clip, Track};

    fn rt(frames: f64) -> RationalTime {
        RationalTime::new(frames, 24.0)
    }

    fn clip(name: &str, start: f64, frames: f64) -> Object {
        let range = TimeRange::new(rt(start), rt(frames));
        Object::new(Clip::new(name, None, Some(range)).unwrap())
    }

    #[test]
    fn failed_overwrite_leaves_track_unchanged() {
        let track = Object::new(Track::default());
        track.append_child(&clip("a", 0.0, 10.0)).unwrap();
        let owned = clip("owned", 0.0, 4.0);
        let owner = Object::new(Track::default());
        owner.append_child(&owned).unwrap();

        let err = overwrite(&owned, &track, TimeRange::new(rt(2.0), rt(4.0)), true, None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ChildAlreadyParented);
        assert_eq!(track.children().len(), 1);
        assert_eq!(track.child_at(0).unwrap().source_range().unwrap().duration(), rt(10.0));
    }

    #[test]
    fn fill_template_must_be_an_item() {
        let marker = Object::new(crate::schemas::Marker::default());
        let err = fill_for(Some(&marker), rt(3.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAnItem);
    }
}
