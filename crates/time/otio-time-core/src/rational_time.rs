//! Rate-scaled time values.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::error::TimeError;

/// A time expressed as `value` samples at `rate` samples per second.
///
/// Equality and ordering compare the represented instant, so
/// `RationalTime::new(30.4, 2.0) == RationalTime::new(15.2, 1.0)`.
/// A rate `<= 0` marks an invalid (sentinel) time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RationalTime {
    value: f64,
    rate: f64,
}

impl Default for RationalTime {
    fn default() -> Self {
        Self {
            value: 0.0,
            rate: 1.0,
        }
    }
}

impl RationalTime {
    #[inline]
    pub const fn new(value: f64, rate: f64) -> Self {
        Self { value, rate }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// True for NaN values and for non-positive rates.
    #[inline]
    pub fn is_invalid_time(&self) -> bool {
        self.value.is_nan() || self.rate.is_nan() || self.rate <= 0.0
    }

    /// The value this time would have at `new_rate`.
    #[inline]
    pub fn value_rescaled_to(&self, new_rate: f64) -> f64 {
        if new_rate == self.rate {
            self.value
        } else {
            self.value * new_rate / self.rate
        }
    }

    /// Rescale without validation; a zero source rate yields a non-finite value.
    #[inline]
    pub fn rescaled_to(&self, new_rate: f64) -> Self {
        Self::new(self.value_rescaled_to(new_rate), new_rate)
    }

    /// Rescale, rejecting zero, negative or non-finite rates on either side.
    pub fn try_rescaled_to(&self, new_rate: f64) -> Result<Self, TimeError> {
        if !(self.rate.is_finite() && self.rate != 0.0) {
            return Err(TimeError::InvalidTimeRate { rate: self.rate });
        }
        if !(new_rate.is_finite() && new_rate > 0.0) {
            return Err(TimeError::InvalidTimeRate { rate: new_rate });
        }
        Ok(self.rescaled_to(new_rate))
    }

    /// Compare at `other`'s rate with an absolute tolerance in samples.
    #[inline]
    pub fn almost_equal(&self, other: RationalTime, delta: f64) -> bool {
        (self.value_rescaled_to(other.rate) - other.value).abs() <= delta
    }

    /// Duration between a start and an exclusive end, at the start's rate.
    pub fn duration_from_start_end_time(start: RationalTime, end_exclusive: RationalTime) -> Self {
        Self::new(
            end_exclusive.value_rescaled_to(start.rate) - start.value,
            start.rate,
        )
    }

    /// Duration between a start and an inclusive end, at the start's rate.
    pub fn duration_from_start_end_time_inclusive(
        start: RationalTime,
        end_inclusive: RationalTime,
    ) -> Self {
        Self::new(
            end_inclusive.value_rescaled_to(start.rate) - start.value + 1.0,
            start.rate,
        )
    }

    /// Whole frame `frame` at `rate`; fractional frames are truncated.
    #[inline]
    pub fn from_frames(frame: f64, rate: f64) -> Self {
        Self::new(frame.trunc(), rate)
    }

    #[inline]
    pub fn from_seconds(seconds: f64, rate: f64) -> Self {
        Self::new(seconds * rate, rate)
    }

    /// Frame number at this time's own rate (truncated).
    #[inline]
    pub fn to_frames(&self) -> i64 {
        self.value as i64
    }

    /// Frame number at `rate` (truncated).
    #[inline]
    pub fn to_frames_at(&self, rate: f64) -> i64 {
        self.value_rescaled_to(rate) as i64
    }

    #[inline]
    pub fn to_seconds(&self) -> f64 {
        self.value_rescaled_to(1.0)
    }

    #[inline]
    pub fn floor(&self) -> Self {
        Self::new(self.value.floor(), self.rate)
    }

    #[inline]
    pub fn ceil(&self) -> Self {
        Self::new(self.value.ceil(), self.rate)
    }

    #[inline]
    pub fn round(&self) -> Self {
        Self::new(self.value.round(), self.rate)
    }

    /// Larger of two times; `self` wins ties.
    #[inline]
    pub fn max(self, other: RationalTime) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    /// Smaller of two times; `self` wins ties.
    #[inline]
    pub fn min(self, other: RationalTime) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }
}

impl PartialEq for RationalTime {
    fn eq(&self, other: &Self) -> bool {
        self.value_rescaled_to(other.rate) == other.value
    }
}

impl PartialOrd for RationalTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        (self.value / self.rate).partial_cmp(&(other.value / other.rate))
    }
}

// The right operand is rescaled to the left operand's rate.
impl Add for RationalTime {
    type Output = RationalTime;

    fn add(self, rhs: RationalTime) -> RationalTime {
        RationalTime::new(self.value + rhs.value_rescaled_to(self.rate), self.rate)
    }
}

impl Sub for RationalTime {
    type Output = RationalTime;

    fn sub(self, rhs: RationalTime) -> RationalTime {
        RationalTime::new(self.value - rhs.value_rescaled_to(self.rate), self.rate)
    }
}

impl AddAssign for RationalTime {
    fn add_assign(&mut self, rhs: RationalTime) {
        *self = *self + rhs;
    }
}

impl SubAssign for RationalTime {
    fn sub_assign(&mut self, rhs: RationalTime) {
        *self = *self - rhs;
    }
}

impl Neg for RationalTime {
    type Output = RationalTime;

    fn neg(self) -> RationalTime {
        RationalTime::new(-self.value, self.rate)
    }
}

impl fmt::Display for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RationalTime({}, {})", self.value, self.rate)
    }
}
