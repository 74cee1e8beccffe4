use otio_model_core::{
    Clip, ErrorKind, ExternalReference, Gap, Item, LinearTimeWarp, MissingReference, Object,
    RationalTime, Stack, TimeRange, Timeline, Track,
};
use otio_test_fixtures::timelines;

fn rt(frames: f64) -> RationalTime {
    RationalTime::new(frames, 24.0)
}

fn range(start: f64, duration: f64) -> TimeRange {
    TimeRange::new(rt(start), rt(duration))
}

#[test]
fn clip_without_any_range_cannot_report_one() {
    let clip = Object::new(Clip::named("empty"));
    let err = clip.available_range().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CannotComputeAvailableRange);
    assert_eq!(
        clip.duration().unwrap_err().kind(),
        ErrorKind::CannotComputeAvailableRange
    );

    let media = Object::new(MissingReference::new(Some(range(0.0, 10.0))));
    let clip = Object::new(Clip::new("m", Some(media), None).unwrap());
    assert_eq!(clip.duration().unwrap(), rt(10.0));
}

#[test]
fn plain_item_has_no_available_range() {
    let item = Object::new(Item::default());
    assert_eq!(
        item.available_range().unwrap_err().kind(),
        ErrorKind::NotImplemented
    );
    assert_eq!(
        item.duration().unwrap_err().kind(),
        ErrorKind::NotImplemented
    );
}

#[test]
fn clip_rejects_non_media_references() {
    let err = Clip::new("bad", Some(Object::new(Gap::default())), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn gap_visibility_follows_effects() {
    let gap = Object::new(Gap::with_duration(rt(10.0)));
    assert!(!gap.visible());
    gap.add_effect(Object::new(LinearTimeWarp::new("slow", 0.5)))
        .unwrap();
    assert!(gap.visible());
    gap.set_enabled(false).unwrap();
    assert!(!gap.visible());
}

#[test]
fn transformed_time_maps_between_siblings() {
    let stack = Object::new(Stack::default());
    let track = Object::new(Track::default());
    let a = Object::new(Clip::new("a", None, Some(range(0.0, 24.0))).unwrap());
    let b = Object::new(Clip::new("b", None, Some(range(10.0, 36.0))).unwrap());
    track.append_child(&a).unwrap();
    track.append_child(&b).unwrap();
    stack.append_child(&track).unwrap();

    assert_eq!(b.transformed_time(rt(10.0), &track).unwrap(), rt(24.0));
    assert_eq!(b.transformed_time(rt(10.0), &a).unwrap(), rt(24.0));
    assert_eq!(a.transformed_time(rt(30.0), &b).unwrap(), rt(16.0));

    let mapped = b.transformed_time_range(range(12.0, 4.0), &stack).unwrap();
    assert_eq!(mapped, range(26.0, 4.0));
    assert!(b.highest_ancestor().ptr_eq(&stack));
    assert_eq!(b.range_in_parent().unwrap(), range(24.0, 36.0));
}

#[test]
fn timeline_exposes_tracks_by_kind() {
    let timeline =
        otio_model_core::from_json_string(&timelines::json("simple").unwrap()).unwrap();
    let body = timeline.downcast_ref::<Timeline>().unwrap();
    assert_eq!(body.global_start_time, Some(rt(86400.0)));

    let video = body.video_tracks();
    let audio = body.audio_tracks();
    assert_eq!(video.len(), 1);
    assert_eq!(audio.len(), 1);
    assert_eq!(video[0].name(), "V1");
    assert_eq!(audio[0].name(), "A1");

    assert_eq!(body.duration().unwrap(), rt(96.0));
    let names: Vec<String> = body.find_clips().iter().map(Object::name).collect();
    assert_eq!(names, vec!["shot_a", "shot_b", "shot_c", "music"]);

    let shot_c = &body.find_clips()[2];
    assert_eq!(body.range_of_child(shot_c).unwrap(), range(60.0, 36.0));
}

#[test]
fn external_reference_supplies_available_range() {
    let media = Object::new(ExternalReference::new(
        "file:///plate.exr",
        Some(range(1001.0, 48.0)),
    ));
    let clip = Object::new(Clip::new("plate", Some(media), None).unwrap());
    assert_eq!(clip.trimmed_range().unwrap(), range(1001.0, 48.0));
}
