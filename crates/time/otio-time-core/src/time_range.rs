//! Start/duration ranges on the rational time axis.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rational_time::RationalTime;

/// Tolerance, in seconds, used by range comparisons: half a sample at 192kHz.
pub const DEFAULT_EPSILON_S: f64 = 1.0 / (2.0 * 192_000.0);

/// A half-open interval `[start_time, start_time + duration)`.
///
/// The duration counts samples, so the last sample inside the range is
/// [`TimeRange::end_time_inclusive`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TimeRange {
    start_time: RationalTime,
    duration: RationalTime,
}

impl TimeRange {
    #[inline]
    pub const fn new(start_time: RationalTime, duration: RationalTime) -> Self {
        Self {
            start_time,
            duration,
        }
    }

    /// Zero-length range at `start_time`.
    #[inline]
    pub fn from_start(start_time: RationalTime) -> Self {
        Self::new(start_time, RationalTime::new(0.0, start_time.rate()))
    }

    /// Range covering `[start_time, end_time_exclusive)`.
    pub fn range_from_start_end_time(
        start_time: RationalTime,
        end_time_exclusive: RationalTime,
    ) -> Self {
        Self::new(
            start_time,
            RationalTime::duration_from_start_end_time(start_time, end_time_exclusive),
        )
    }

    /// Range covering `[start_time, end_time_inclusive]`.
    pub fn range_from_start_end_time_inclusive(
        start_time: RationalTime,
        end_time_inclusive: RationalTime,
    ) -> Self {
        Self::new(
            start_time,
            RationalTime::duration_from_start_end_time_inclusive(start_time, end_time_inclusive),
        )
    }

    #[inline]
    pub fn start_time(&self) -> RationalTime {
        self.start_time
    }

    #[inline]
    pub fn duration(&self) -> RationalTime {
        self.duration
    }

    /// First instant after the range, at the duration's rate.
    #[inline]
    pub fn end_time_exclusive(&self) -> RationalTime {
        self.duration + self.start_time.rescaled_to(self.duration.rate())
    }

    /// Last sample inside the range, at the duration's rate.
    pub fn end_time_inclusive(&self) -> RationalTime {
        let end = self.end_time_exclusive();
        if (end - self.start_time.rescaled_to(self.duration.rate())).value() > 1.0 {
            if self.duration.value() != self.duration.value().floor() {
                end.floor()
            } else {
                end - RationalTime::new(1.0, self.duration.rate())
            }
        } else {
            self.start_time
        }
    }

    pub fn duration_extended_by(&self, other: RationalTime) -> Self {
        Self::new(self.start_time, self.duration + other)
    }

    /// Smallest range spanning both ranges (min start, max end).
    pub fn extended_by(&self, other: TimeRange) -> Self {
        let start = self.start_time.min(other.start_time);
        let end = self
            .end_time_exclusive()
            .max(other.end_time_exclusive());
        Self::range_from_start_end_time(start, end)
    }

    /// Clip a time into `[start_time, end_time_inclusive]`.
    pub fn clamped_time(&self, time: RationalTime) -> RationalTime {
        time.max(self.start_time).min(self.end_time_inclusive())
    }

    /// Clip `other` so that it starts no earlier and ends no later than this range.
    pub fn clamped_range(&self, other: TimeRange) -> Self {
        let start = other.start_time.max(self.start_time);
        let moved = Self::new(start, other.duration);
        let end = moved
            .end_time_exclusive()
            .min(self.end_time_exclusive());
        Self::new(start, end - start)
    }

    /// Half-open containment of an instant.
    pub fn contains_time(&self, time: RationalTime) -> bool {
        self.start_time <= time && time < self.end_time_exclusive()
    }

    pub fn contains_range(&self, other: TimeRange) -> bool {
        self.contains_range_within(other, DEFAULT_EPSILON_S)
    }

    /// `other` lies entirely inside this range, with `epsilon` seconds of slack.
    pub fn contains_range_within(&self, other: TimeRange, epsilon: f64) -> bool {
        let this_start = self.start_time.to_seconds();
        let this_end = self.end_time_exclusive().to_seconds();
        let other_start = other.start_time.to_seconds();
        let other_end = other.end_time_exclusive().to_seconds();
        this_start - other_start <= epsilon && other_end - this_end <= epsilon
    }

    pub fn overlaps(&self, other: TimeRange) -> bool {
        self.overlaps_within(other, DEFAULT_EPSILON_S)
    }

    /// The two half-open ranges share more than `epsilon` seconds.
    pub fn overlaps_within(&self, other: TimeRange, epsilon: f64) -> bool {
        let this_start = self.start_time.to_seconds();
        let this_end = self.end_time_exclusive().to_seconds();
        let other_start = other.start_time.to_seconds();
        let other_end = other.end_time_exclusive().to_seconds();
        other_end - this_start >= epsilon && this_end - other_start >= epsilon
    }

    /// This range ends strictly before `other` starts.
    pub fn before(&self, other: TimeRange, epsilon: f64) -> bool {
        other.start_time.to_seconds() - self.end_time_exclusive().to_seconds() >= epsilon
    }

    /// This range ends exactly where `other` starts.
    pub fn meets(&self, other: TimeRange, epsilon: f64) -> bool {
        let gap = other.start_time.to_seconds() - self.end_time_exclusive().to_seconds();
        (0.0..=epsilon).contains(&gap)
    }

    /// Both ranges start together and this one ends first.
    pub fn begins(&self, other: TimeRange, epsilon: f64) -> bool {
        let starts = (self.start_time.to_seconds() - other.start_time.to_seconds()).abs();
        let tail = other.end_time_exclusive().to_seconds() - self.end_time_exclusive().to_seconds();
        starts <= epsilon && tail > epsilon
    }

    /// Both ranges end together and this one starts later.
    pub fn finishes(&self, other: TimeRange, epsilon: f64) -> bool {
        let ends = (self.end_time_exclusive().to_seconds()
            - other.end_time_exclusive().to_seconds())
        .abs();
        let head = self.start_time.to_seconds() - other.start_time.to_seconds();
        ends <= epsilon && head > epsilon
    }
}

impl PartialEq for TimeRange {
    fn eq(&self, other: &Self) -> bool {
        let start = (self.start_time - other.start_time).to_seconds().abs();
        let duration = (self.duration - other.duration).to_seconds().abs();
        start < DEFAULT_EPSILON_S && duration < DEFAULT_EPSILON_S
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeRange({}, {})", self.start_time, self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rt(v: f64) -> RationalTime {
        RationalTime::new(v, 24.0)
    }

    #[test]
    fn end_times() {
        let r = TimeRange::new(rt(10.0), rt(5.0));
        assert_eq!(r.end_time_exclusive(), rt(15.0));
        assert_eq!(r.end_time_inclusive(), rt(14.0));

        let single = TimeRange::new(rt(10.0), rt(1.0));
        assert_eq!(single.end_time_inclusive(), rt(10.0));

        let fractional = TimeRange::new(rt(0.0), rt(10.5));
        assert_eq!(fractional.end_time_inclusive(), rt(10.0));
    }

    #[test]
    fn clamp_time_to_bounds() {
        let r = TimeRange::new(rt(-1.0), rt(6.0));
        assert_eq!(r.clamped_time(rt(-2.0)), r.start_time());
        assert_eq!(r.clamped_time(rt(6.0)), r.end_time_inclusive());
        assert_eq!(r.clamped_time(rt(2.0)), rt(2.0));
    }

    #[test]
    fn clamp_range() {
        let outer = TimeRange::new(rt(0.0), rt(10.0));
        let inner = TimeRange::new(rt(-5.0), rt(20.0));
        let clamped = outer.clamped_range(inner);
        assert_eq!(clamped, TimeRange::new(rt(0.0), rt(10.0)));
    }

    #[test]
    fn extend_spans_both() {
        let a = TimeRange::new(rt(0.0), rt(5.0));
        let b = TimeRange::new(rt(10.0), rt(5.0));
        assert_eq!(a.extended_by(b), TimeRange::new(rt(0.0), rt(15.0)));
        assert_eq!(
            a.duration_extended_by(rt(3.0)),
            TimeRange::new(rt(0.0), rt(8.0))
        );
    }

    #[test]
    fn half_open_semantics() {
        let a = TimeRange::new(rt(0.0), rt(10.0));
        let b = TimeRange::new(rt(10.0), rt(10.0));
        assert!(a.contains_time(rt(0.0)));
        assert!(!a.contains_time(rt(10.0)));
        assert!(!a.overlaps(b));
        assert!(a.meets(b, DEFAULT_EPSILON_S));
        assert!(!a.before(b, DEFAULT_EPSILON_S));
        assert!(a.overlaps(TimeRange::new(rt(9.0), rt(2.0))));
        assert!(a.contains_range(TimeRange::new(rt(2.0), rt(8.0))));
        assert!(!a.contains_range(TimeRange::new(rt(2.0), rt(9.0))));
    }

    #[test]
    fn begins_and_finishes() {
        let outer = TimeRange::new(rt(0.0), rt(10.0));
        assert!(TimeRange::new(rt(0.0), rt(4.0)).begins(outer, DEFAULT_EPSILON_S));
        assert!(TimeRange::new(rt(6.0), rt(4.0)).finishes(outer, DEFAULT_EPSILON_S));
        assert!(!outer.begins(outer, DEFAULT_EPSILON_S));
    }

    #[test]
    fn equality_is_cross_rate() {
        let a = TimeRange::new(RationalTime::new(1.0, 1.0), RationalTime::new(2.0, 1.0));
        let b = TimeRange::new(rt(24.0), rt(48.0));
        assert_eq!(a, b);
    }
}
