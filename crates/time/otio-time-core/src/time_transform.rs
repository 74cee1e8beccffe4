//! Affine offset/scale/rate transforms over times and ranges.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rational_time::RationalTime;
use crate::time_range::TimeRange;

/// `t -> t * scale + offset`, optionally rescaled to `rate`.
///
/// A rate `<= 0` (conventionally `-1`) means the result keeps the rate of the
/// offset it was combined with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeTransform {
    offset: RationalTime,
    scale: f64,
    rate: f64,
}

impl Default for TimeTransform {
    fn default() -> Self {
        Self {
            offset: RationalTime::default(),
            scale: 1.0,
            rate: -1.0,
        }
    }
}

impl TimeTransform {
    #[inline]
    pub const fn new(offset: RationalTime, scale: f64, rate: f64) -> Self {
        Self {
            offset,
            scale,
            rate,
        }
    }

    #[inline]
    pub fn offset(&self) -> RationalTime {
        self.offset
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    #[inline]
    fn has_explicit_rate(&self) -> bool {
        self.rate > 0.0
    }

    pub fn applied_to_time(&self, time: RationalTime) -> RationalTime {
        let scaled = RationalTime::new(time.value() * self.scale, time.rate());
        let result = self.offset + scaled;
        if self.has_explicit_rate() {
            result.rescaled_to(self.rate)
        } else {
            result
        }
    }

    /// The start is mapped like a time; the duration is only scaled.
    pub fn applied_to_range(&self, range: TimeRange) -> TimeRange {
        let start = self.applied_to_time(range.start_time());
        let duration = RationalTime::new(
            range.duration().value() * self.scale,
            range.duration().rate(),
        );
        let duration = if self.has_explicit_rate() {
            duration.rescaled_to(self.rate)
        } else {
            duration
        };
        TimeRange::new(start, duration)
    }

    /// Compose so that `self.applied_to_transform(other)` maps `t` to
    /// `self.applied_to_time(other.applied_to_time(t))`.
    pub fn applied_to_transform(&self, other: TimeTransform) -> TimeTransform {
        let carried = RationalTime::new(
            other.offset.value() * self.scale,
            other.offset.rate(),
        );
        TimeTransform {
            offset: self.offset + carried,
            scale: self.scale * other.scale,
            rate: if self.has_explicit_rate() {
                self.rate
            } else {
                other.rate
            },
        }
    }
}

impl fmt::Display for TimeTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TimeTransform({}, {}, {})",
            self.offset, self.scale, self.rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_preserves_instant() {
        let t = RationalTime::new(12.0, 25.0);
        let out = TimeTransform::default().applied_to_time(t);
        assert!(out.almost_equal(t, 1e-9));
    }

    #[test]
    fn offset_and_scale() {
        let tx = TimeTransform::new(RationalTime::new(10.0, 25.0), 2.0, -1.0);
        let out = tx.applied_to_time(RationalTime::new(12.0, 25.0));
        assert_eq!(out.value(), 34.0);
        assert_eq!(out.rate(), 25.0);
    }

    #[test]
    fn explicit_rate_rescales() {
        let tx = TimeTransform::new(RationalTime::new(0.0, 25.0), 1.0, 50.0);
        let out = tx.applied_to_time(RationalTime::new(12.0, 25.0));
        assert_eq!(out.value(), 24.0);
        assert_eq!(out.rate(), 50.0);
    }

    #[test]
    fn range_duration_is_scaled_not_offset() {
        let tx = TimeTransform::new(RationalTime::new(10.0, 24.0), 2.0, -1.0);
        let r = tx.applied_to_range(TimeRange::new(
            RationalTime::new(5.0, 24.0),
            RationalTime::new(10.0, 24.0),
        ));
        assert_eq!(r.start_time().value(), 20.0);
        assert_eq!(r.duration().value(), 20.0);
    }

    #[test]
    fn composition_matches_sequential_application() {
        let outer = TimeTransform::new(RationalTime::new(10.0, 24.0), 2.0, -1.0);
        let inner = TimeTransform::new(RationalTime::new(3.0, 24.0), 0.5, -1.0);
        let composed = outer.applied_to_transform(inner);
        let t = RationalTime::new(8.0, 24.0);
        assert_eq!(
            composed.applied_to_time(t),
            outer.applied_to_time(inner.applied_to_time(t))
        );
        assert_eq!(composed.scale(), 1.0);
    }

    #[test]
    fn composed_rate_prefers_outer() {
        let outer = TimeTransform::new(RationalTime::default(), 1.0, 48.0);
        let inner = TimeTransform::new(RationalTime::default(), 1.0, 24.0);
        assert_eq!(outer.applied_to_transform(inner).rate(), 48.0);
        assert_eq!(inner.applied_to_transform(TimeTransform::default()).rate(), 24.0);
    }
}
