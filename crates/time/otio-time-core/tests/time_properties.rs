use approx::assert_relative_eq;
use otio_time_core::{
    is_drop_frame_rate, IsDropFrameRate, RationalTime, TimeRange, TimeTransform,
};
use proptest::prelude::*;

const TIMECODE_RATES: [f64; 8] = [
    24.0,
    25.0,
    30.0,
    29.97,
    30000.0 / 1001.0,
    59.94,
    60000.0 / 1001.0,
    60.0,
];

fn rate_strategy() -> impl Strategy<Value = f64> {
    prop::sample::select(vec![1.0, 12.0, 24.0, 25.0, 29.97, 48.0, 60.0, 96000.0])
}

proptest! {
    #[test]
    fn rescaled_times_stay_equal(value in -1.0e6f64..1.0e6, from in rate_strategy(), to in rate_strategy()) {
        let t = RationalTime::new(value, from);
        prop_assert_eq!(t, t.rescaled_to(to));
    }

    #[test]
    fn adding_positive_duration_moves_forward(value in -100_000i32..100_000, step in 1i32..10_000, rate in rate_strategy()) {
        let t = RationalTime::new(value as f64, rate);
        let step = step as f64;
        let later = t + RationalTime::new(step, rate);
        prop_assert!(later > t);
        prop_assert!(t < later);
        prop_assert_eq!(later - RationalTime::new(step, rate), t);
    }

    #[test]
    fn timecode_round_trip(frame in 0u32..2_000_000, index in 0usize..TIMECODE_RATES.len()) {
        let rate = TIMECODE_RATES[index];
        let t = RationalTime::from_frames(frame as f64, rate);
        let tc = t.to_timecode(rate).unwrap();
        let back = RationalTime::from_timecode(&tc, rate).unwrap();
        prop_assert_eq!(back, t, "timecode {} at {}", tc, rate);
    }

    #[test]
    fn time_string_round_trip(frame in -100_000i32..100_000) {
        let t = RationalTime::new(frame as f64, 24.0);
        let parsed = RationalTime::from_time_string(&t.to_time_string(), 24.0).unwrap();
        prop_assert!(parsed.almost_equal(t, 1e-3));
    }

    #[test]
    fn clamped_time_stays_inside(start in -1000i32..1000, duration in 2i32..1000, sample in -5000i32..5000) {
        let range = TimeRange::new(
            RationalTime::new(start as f64, 24.0),
            RationalTime::new(duration as f64, 24.0),
        );
        let clamped = range.clamped_time(RationalTime::new(sample as f64, 24.0));
        prop_assert!(range.contains_time(clamped));
    }
}

#[test]
fn frame_1113_round_trips_at_24() {
    let t = RationalTime::from_frames(1113.0, 24.0);
    let tc = t.to_timecode(24.0).unwrap();
    assert_eq!(RationalTime::from_timecode(&tc, 24.0).unwrap(), t);
}

#[test]
fn drop_frame_forcing() {
    let t = RationalTime::new(10790.0, 29.97);
    assert!(is_drop_frame_rate(29.97));
    assert_eq!(
        t.to_timecode_with(29.97, IsDropFrameRate::ForceYes).unwrap(),
        "00:06:00;02"
    );
    assert_eq!(
        t.to_timecode_with(29.97, IsDropFrameRate::ForceNo).unwrap(),
        "00:05:59:20"
    );
}

#[test]
fn clamp_matches_documented_bounds() {
    let range = TimeRange::new(RationalTime::new(-1.0, 24.0), RationalTime::new(6.0, 24.0));
    assert_eq!(range.clamped_time(RationalTime::new(-2.0, 24.0)), range.start_time());
    assert_eq!(
        range.clamped_time(RationalTime::new(6.0, 24.0)),
        range.end_time_inclusive()
    );
}

#[test]
fn seconds_survive_rate_changes() {
    let t = RationalTime::new(1001.0, 30000.0 / 1001.0);
    assert_relative_eq!(t.to_seconds(), 1001.0 * 1001.0 / 30000.0, epsilon = 1e-9);
    let r = t.rescaled_to(48000.0);
    assert_relative_eq!(r.to_seconds(), t.to_seconds(), epsilon = 1e-9);
}

#[test]
fn transform_applies_to_range_start_and_duration() {
    let tx = TimeTransform::new(RationalTime::new(24.0, 24.0), 0.5, 48.0);
    let range = TimeRange::new(RationalTime::new(48.0, 24.0), RationalTime::new(24.0, 24.0));
    let out = tx.applied_to_range(range);
    assert_relative_eq!(out.start_time().to_seconds(), 2.0);
    assert_relative_eq!(out.duration().to_seconds(), 0.5);
    assert_eq!(out.start_time().rate(), 48.0);
}
