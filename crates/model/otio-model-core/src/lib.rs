//! otio-model-core: the editorial timeline object model.
//!
//! Schema objects (clips, gaps, transitions, tracks, stacks, timelines, …) live
//! behind shared [`Object`] handles. Compositions own their children and give
//! them weak parent links; metadata dictionaries hold heterogeneous [`Value`]s,
//! including further object references. Every object round-trips through the
//! `OTIO_SCHEMA`-tagged JSON format via the [`json`] module. The [`algo`]
//! module flattens stacks, trims and diffs tracks, and [`edit`] holds the
//! overwrite, insert, slice and roll style track edits.
//!
//! Objects are single-threaded (`!Send`); the [`TypeRegistry`] is process-wide
//! and immutable once first used.

pub mod algo;
pub mod composition;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod ids;
pub mod item;
pub mod json;
pub mod object;
pub mod registry;
pub mod schema;
pub mod schemas;
pub mod value;

pub use algo::{
    edit, flatten_stack, flatten_tracks, track_clip_diff, track_diff_stack,
    track_trimmed_to_range, track_with_expanded_transitions, DiffOp, DiffResult, ExpandedChild,
    ReferencePoint,
};
pub use config::Config;
pub use dictionary::{Cursor, Dictionary, Vector};
pub use error::{Error, ErrorKind, Result};
pub use ids::ObjectId;
pub use json::{
    from_json_string, from_json_string_with_config, from_json_value, from_json_value_with,
    read_from_file, read_from_file_with_config, to_json_string, to_json_string_with_config,
    to_json_value, write_to_file, Reader, Writer,
};
pub use object::{Object, WeakObject};
pub use registry::{global, install, SchemaEntry, TypeRegistry, TypeRegistryBuilder};
pub use schema::{ItemFields, ObjectMeta, Schema, SchemaType};
pub use schemas::*;
pub use value::{Value, ValueKind};

pub use otio_time_core::{
    is_drop_frame_rate, is_valid_timecode_rate, IsDropFrameRate, RationalTime, TimeError,
    TimeRange, TimeTransform, DEFAULT_EPSILON_S,
};
