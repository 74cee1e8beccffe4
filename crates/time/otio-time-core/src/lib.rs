//! otio-time-core: exact, rate-aware time arithmetic for editorial timelines.
//!
//! A [`RationalTime`] is a `value` counted at a `rate` (samples per second), so
//! `value / rate` seconds. [`TimeRange`] pairs a start time with a duration and
//! [`TimeTransform`] maps times and ranges through an offset/scale/rate triple.
//! Timecode and time-string conversion live on [`RationalTime`] as well.

pub mod error;
pub mod rational_time;
pub mod time_range;
pub mod time_transform;
pub mod timecode;

pub use error::TimeError;
pub use rational_time::RationalTime;
pub use time_range::{TimeRange, DEFAULT_EPSILON_S};
pub use time_transform::TimeTransform;
pub use timecode::{is_drop_frame_rate, is_valid_timecode_rate, IsDropFrameRate};
