//! Whole-track editing algorithms built on the composition API.

mod diff;
pub mod edit;
mod expand;
mod flatten;
mod trim;

pub use diff::{track_clip_diff, track_diff_stack, DiffOp, DiffResult};
pub use edit::ReferencePoint;
pub use expand::{track_with_expanded_transitions, ExpandedChild};
pub use flatten::{flatten_stack, flatten_tracks};
pub use trim::track_trimmed_to_range;
