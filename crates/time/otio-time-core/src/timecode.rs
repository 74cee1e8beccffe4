//! SMPTE timecode and `HH:MM:SS.frac` string conversion.

use serde::{Deserialize, Serialize};

use crate::error::TimeError;
use crate::rational_time::RationalTime;

const RATE_TOLERANCE: f64 = 1e-9;

const VALID_TIMECODE_RATES: [f64; 24] = [
    1.0,
    12.0,
    23.97,
    23.976,
    23.98,
    24000.0 / 1001.0,
    24.0,
    25.0,
    29.97,
    30000.0 / 1001.0,
    30.0,
    47.95,
    48000.0 / 1001.0,
    48.0,
    50.0,
    59.94,
    60000.0 / 1001.0,
    60.0,
    72.0,
    96.0,
    100.0,
    119.88,
    120000.0 / 1001.0,
    120.0,
];

const DROP_FRAME_RATES: [f64; 4] = [29.97, 30000.0 / 1001.0, 59.94, 60000.0 / 1001.0];

/// Whether drop-frame notation is used when formatting timecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IsDropFrameRate {
    /// Drop-frame exactly when the rate is a drop-frame rate.
    #[default]
    InferFromRate,
    ForceNo,
    ForceYes,
}

fn rate_in(list: &[f64], rate: f64) -> bool {
    list.iter().any(|r| (r - rate).abs() < RATE_TOLERANCE)
}

/// Exact allow-list of broadcast rates accepted for timecode.
pub fn is_valid_timecode_rate(rate: f64) -> bool {
    rate_in(&VALID_TIMECODE_RATES, rate)
}

/// 29.97 and 59.94 (and their exact NTSC fractions).
pub fn is_drop_frame_rate(rate: f64) -> bool {
    rate_in(&DROP_FRAME_RATES, rate)
}

// Frames skipped at the start of every minute not divisible by ten.
fn dropped_frames_per_minute(rate: f64) -> f64 {
    if rate < 40.0 {
        2.0
    } else {
        4.0
    }
}

fn parse_field(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

impl RationalTime {
    /// Timecode at `rate`, inferring drop-frame from the rate.
    pub fn to_timecode(&self, rate: f64) -> Result<String, TimeError> {
        self.to_timecode_with(rate, IsDropFrameRate::InferFromRate)
    }

    /// Format as `HH:MM:SS:FF`, or `HH:MM:SS;FF` when drop-frame applies.
    /// Values wrap every 24 hours.
    pub fn to_timecode_with(
        &self,
        rate: f64,
        drop_frame: IsDropFrameRate,
    ) -> Result<String, TimeError> {
        if !is_valid_timecode_rate(rate) {
            return Err(TimeError::InvalidTimecodeRate { rate });
        }

        let rate_is_drop = is_drop_frame_rate(rate);
        let use_drop = match drop_frame {
            IsDropFrameRate::InferFromRate => rate_is_drop,
            IsDropFrameRate::ForceNo => false,
            IsDropFrameRate::ForceYes => {
                if !rate_is_drop {
                    return Err(TimeError::NonDropframeRate { rate });
                }
                true
            }
        };

        if !(self.rate().is_finite() && self.rate() > 0.0) {
            return Err(TimeError::InvalidTimeRate { rate: self.rate() });
        }
        let frames = self.value_rescaled_to(rate).floor();
        if !frames.is_finite() || frames < 0.0 {
            return Err(TimeError::NegativeValue { value: frames });
        }

        let dropframes = if use_drop {
            dropped_frames_per_minute(rate)
        } else {
            0.0
        };
        let frames_per_24_hours = (rate * 3600.0).round() * 24.0;
        let frames_per_10_minutes = (rate * 600.0).round();
        let frames_per_minute = rate.round() * 60.0 - dropframes;

        let mut value = frames % frames_per_24_hours;
        if use_drop {
            let ten_minute_chunks = (value / frames_per_10_minutes).floor();
            let frames_over = value % frames_per_10_minutes;
            value += dropframes * 9.0 * ten_minute_chunks;
            if frames_over > dropframes {
                value += dropframes * ((frames_over - dropframes) / frames_per_minute).floor();
            }
        }

        let nominal_fps = rate.ceil();
        let frame = (value % nominal_fps) as u64;
        let seconds_total = (value / nominal_fps).floor() as u64;
        let seconds = seconds_total % 60;
        let minutes = (seconds_total / 60) % 60;
        let hours = seconds_total / 3600;
        let separator = if use_drop { ';' } else { ':' };

        Ok(format!(
            "{hours:02}:{minutes:02}:{seconds:02}{separator}{frame:02}"
        ))
    }

    /// Parse `HH:MM:SS:FF` (or `HH:MM:SS;FF` for drop-frame rates).
    pub fn from_timecode(timecode: &str, rate: f64) -> Result<Self, TimeError> {
        if !is_valid_timecode_rate(rate) {
            return Err(TimeError::InvalidTimecodeRate { rate });
        }

        let is_drop = timecode.contains(';');
        if is_drop && !is_drop_frame_rate(rate) {
            return Err(TimeError::NonDropframeRate { rate });
        }

        let malformed = || TimeError::InvalidTimecodeString {
            input: timecode.to_string(),
        };
        let fields: Vec<&str> = timecode.split([':', ';']).collect();
        if fields.len() != 4 {
            return Err(malformed());
        }
        let mut parsed = [0u64; 4];
        for (slot, field) in parsed.iter_mut().zip(&fields) {
            *slot = parse_field(field).ok_or_else(malformed)?;
        }
        let [hours, minutes, seconds, frames] = parsed;
        if minutes >= 60 || seconds >= 60 {
            return Err(malformed());
        }

        let nominal_fps = rate.ceil();
        if frames as f64 >= nominal_fps {
            return Err(TimeError::TimecodeRateMismatch {
                timecode: timecode.to_string(),
                rate,
            });
        }

        let total_minutes = hours
            .checked_mul(60)
            .and_then(|m| m.checked_add(minutes))
            .ok_or_else(malformed)? as f64;
        let mut value =
            (total_minutes * 60.0 + seconds as f64) * nominal_fps + frames as f64;
        if is_drop {
            let dropframes = dropped_frames_per_minute(rate);
            value -= dropframes * (total_minutes - (total_minutes / 10.0).floor());
        }

        Ok(RationalTime::new(value, rate))
    }

    /// Signed `HH:MM:SS.frac` with microsecond precision.
    pub fn to_time_string(&self) -> String {
        let seconds = self.to_seconds();
        let sign = if seconds < 0.0 { "-" } else { "" };
        let micros = (seconds.abs() * 1_000_000.0).round() as u64;

        let whole = micros / 1_000_000;
        let frac = micros % 1_000_000;
        let hours = whole / 3600;
        let minutes = (whole / 60) % 60;
        let secs = whole % 60;

        let frac = if frac == 0 {
            ".0".to_string()
        } else {
            format!(".{frac:06}").trim_end_matches('0').to_string()
        };
        format!("{sign}{hours:02}:{minutes:02}:{secs:02}{frac}")
    }

    /// Parse `[-][[HH:]MM:]SS[.frac]` into a time at `rate`.
    pub fn from_time_string(time_string: &str, rate: f64) -> Result<Self, TimeError> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(TimeError::InvalidTimeRate { rate });
        }
        let malformed = || TimeError::InvalidTimeString {
            input: time_string.to_string(),
        };

        let (negative, body) = match time_string.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, time_string),
        };
        let fields: Vec<&str> = body.split(':').collect();
        if fields.is_empty() || fields.len() > 3 {
            return Err(malformed());
        }

        let (whole_fields, last) = fields.split_at(fields.len() - 1);
        let seconds_text = last[0];
        let valid_seconds = !seconds_text.is_empty()
            && seconds_text.bytes().filter(|b| *b == b'.').count() <= 1
            && seconds_text.bytes().all(|b| b.is_ascii_digit() || b == b'.')
            && seconds_text.bytes().any(|b| b.is_ascii_digit());
        if !valid_seconds {
            return Err(malformed());
        }
        let mut total: f64 = seconds_text.parse().map_err(|_| malformed())?;

        let mut unit = 60.0;
        for field in whole_fields.iter().rev() {
            let amount = parse_field(field).ok_or_else(malformed)?;
            total += amount as f64 * unit;
            unit *= 60.0;
        }
        if negative {
            total = -total;
        }

        Ok(RationalTime::from_seconds(total, rate))
    }
}
