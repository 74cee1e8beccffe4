use log::trace;
use otio_time_core::{RationalTime, TimeRange};

use crate::error::{Error, ErrorKind, Result};
use crate::object::Object;
use crate::schemas::{Gap, Track, Transition};

use super::trim::{expect_track, track_trimmed_to_range};

/// Composite the tracks of `stack` into one track.
pub fn flatten_stack(stack: &Object) -> Result<Object> {
    let tracks = stack.children();
    for child in &tracks {
        expect_track(child)?;
    }
    flatten_tracks(&tracks)
}

/// Composite parallel tracks into one track named `Flattened`.
///
/// Later tracks sit on top. Wherever the top track holds something visible
/// (or a transition) it is copied through; elsewhere the same span is filled
/// from the track below. The bottom track is always copied as is, so the
/// result has no holes. Shorter tracks are first padded with a gap to the
/// longest duration.
pub fn flatten_tracks(tracks: &[Object]) -> Result<Object> {
    for track in tracks {
        expect_track(track)?;
    }
    let flat = Object::new(Track::named("Flattened"));
    if tracks.is_empty() {
        return Ok(flat);
    }
    let tracks = padded_to_longest(tracks)?;
    let flattener = Flattener {
        tracks: &tracks,
        flat: &flat,
    };
    flattener.fill(tracks.len() - 1, None)?;
    Ok(flat)
}

fn padded_to_longest(tracks: &[Object]) -> Result<Vec<Object>> {
    let durations = tracks
        .iter()
        .map(Object::duration)
        .collect::<Result<Vec<RationalTime>>>()?;
    let Some(longest) = durations.iter().copied().reduce(RationalTime::max) else {
        return Ok(Vec::new());
    };
    tracks
        .iter()
        .zip(durations)
        .map(|(track, duration)| {
            if duration >= longest {
                return Ok(track.clone());
            }
            let padded = track.deep_clone()?;
            padded.append_child(&Object::new(Gap::with_duration(longest - duration)))?;
            Ok(padded)
        })
        .collect()
}

struct Flattener<'a> {
    tracks: &'a [Object],
    flat: &'a Object,
}

impl Flattener<'_> {
    /// Emit track `index`, restricted to `window` when set.
    fn fill(&self, index: usize, window: Option<TimeRange>) -> Result<()> {
        let track = match window {
            Some(range) => track_trimmed_to_range(&self.tracks[index], range)?,
            None => self.tracks[index].clone(),
        };
        trace!("flatten: track {index} window {window:?}");

        for (child, range) in track.range_of_all_children()? {
            let is_transition = child.is::<Transition>();
            if !child.is_item() && !is_transition {
                return Err(Error::new(
                    ErrorKind::TypeMismatch,
                    format!("expected an item or transition, found {}", child.schema_name()),
                ));
            }
            if is_transition || child.visible() || index == 0 {
                self.flat.append_child(&child.deep_clone()?)?;
                continue;
            }
            let region = match window {
                Some(outer) => TimeRange::new(range.start_time() + outer.start_time(), range.duration()),
                None => range,
            };
            self.fill(index - 1, Some(region))?;
        }
        Ok(())
    }
}
