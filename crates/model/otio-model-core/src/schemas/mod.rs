//! Concrete schema bodies.

mod base;
mod clip;
mod collection;
mod effect;
mod gap;
mod marker;
mod media_reference;
mod stack;
mod timeline;
mod track;
mod transition;
mod unknown;

pub use base::{Composable, Composition, Item, SerializableObject, SerializableObjectWithMetadata};
pub use clip::Clip;
pub use collection::SerializableCollection;
pub use effect::{Effect, FreezeFrame, LinearTimeWarp, TimeEffect};
pub use gap::Gap;
pub use marker::{color as marker_color, Marker};
pub use media_reference::{ExternalReference, GeneratorReference, MediaReference, MissingReference};
pub use stack::Stack;
pub use timeline::Timeline;
pub use track::{kind as track_kind, Track};
pub use transition::{transition_type, Transition};
pub use unknown::UnknownSchema;

pub(crate) use marker::upgrade_marker_to_v2;
pub(crate) use track::illegal_index;
