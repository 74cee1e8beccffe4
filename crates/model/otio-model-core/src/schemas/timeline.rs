use otio_time_core::{RationalTime, TimeRange};

use crate::error::{Error, ErrorKind, Result};
use crate::json::{Reader, Writer};
use crate::object::Object;
use crate::schema::{meta_accessors, schema_identity, schema_type, ObjectMeta, Schema};

use super::{track, Clip, Stack, Track};

/// A top-level edit: one stack of tracks and an optional start time.
#[derive(Debug)]
pub struct Timeline {
    pub meta: ObjectMeta,
    pub global_start_time: Option<RationalTime>,
    tracks: Object,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            meta: ObjectMeta::default(),
            global_start_time: None,
            tracks: Object::new(Stack::named("tracks")),
        }
    }
}

schema_type!(Timeline, "Timeline", 1);

impl Timeline {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::named(name),
            ..Self::default()
        }
    }

    /// The top-level stack.
    pub fn tracks(&self) -> &Object {
        &self.tracks
    }

    pub fn set_tracks(&mut self, tracks: Object) -> Result<()> {
        if !tracks.is::<Stack>() {
            return Err(Error::new(
                ErrorKind::TypeMismatch,
                format!("timeline tracks must be a Stack, found {}", tracks.schema_name()),
            ));
        }
        if tracks.parent().is_some() {
            return Err(Error::new(
                ErrorKind::ChildAlreadyParented,
                format!("stack '{}' already has a parent", tracks.name()),
            ));
        }
        self.tracks = tracks;
        Ok(())
    }

    pub fn duration(&self) -> Result<RationalTime> {
        self.tracks.duration()
    }

    pub fn range_of_child(&self, child: &Object) -> Result<TimeRange> {
        self.tracks.range_of_child(child)
    }

    fn tracks_of_kind(&self, kind: &str) -> Vec<Object> {
        self.tracks
            .children()
            .into_iter()
            .filter(|child| {
                child
                    .downcast_ref::<Track>()
                    .is_some_and(|track| track.kind == kind)
            })
            .collect()
    }

    pub fn video_tracks(&self) -> Vec<Object> {
        self.tracks_of_kind(track::kind::VIDEO)
    }

    pub fn audio_tracks(&self) -> Vec<Object> {
        self.tracks_of_kind(track::kind::AUDIO)
    }

    /// Every clip in the timeline, depth first.
    pub fn find_clips(&self) -> Vec<Object> {
        self.tracks.find_children(&|child| child.is::<Clip>(), false)
    }
}

impl Schema for Timeline {
    schema_identity!();
    meta_accessors!();

    fn write_fields(&self, writer: &mut Writer<'_>) {
        self.meta.write(writer);
        writer.write_optional_time("global_start_time", self.global_start_time);
        writer.write_object("tracks", Some(&self.tracks));
    }

    fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
        self.meta.read(reader)?;
        self.global_start_time = reader.read_time("global_start_time")?;
        if let Some(tracks) = reader.read_object("tracks")? {
            if tracks.is_unknown_schema() {
                self.tracks = tracks;
            } else {
                self.set_tracks(tracks)?;
            }
        }
        Ok(())
    }
}
