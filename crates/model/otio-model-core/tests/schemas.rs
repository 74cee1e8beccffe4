use otio_model_core::{
    from_json_string, to_json_value, Clip, Effect, ErrorKind, FreezeFrame, GeneratorReference,
    LinearTimeWarp, Object, RationalTime, SerializableCollection, Stack, TimeRange, Timeline,
    Track, Value, Vector,
};
use otio_test_fixtures::timelines;

fn rt(frames: f64) -> RationalTime {
    RationalTime::new(frames, 24.0)
}

#[test]
fn collection_holds_timelines_without_parenting_them() {
    let first = from_json_string(&timelines::json("simple").unwrap()).unwrap();
    let second = from_json_string(&timelines::json("layered").unwrap()).unwrap();

    let mut collection = SerializableCollection::named("reel");
    collection.push(first.clone());
    collection.insert(0, second.clone()).unwrap();
    assert_eq!(
        collection.insert(5, first.clone()).unwrap_err().kind(),
        ErrorKind::IllegalIndex
    );
    assert_eq!(collection.len(), 2);
    assert!(first.parent().is_none());

    let names: Vec<String> = collection.find_clips().iter().map(Object::name).collect();
    assert_eq!(
        names,
        vec!["background", "top_a", "top_b", "shot_a", "shot_b", "shot_c", "music"]
    );

    let removed = collection.remove(0).unwrap();
    assert!(removed.ptr_eq(&second));
    assert_eq!(
        collection.remove(1).unwrap_err().kind(),
        ErrorKind::IllegalIndex
    );
}

#[test]
fn timeline_tracks_must_be_a_stack() {
    let mut timeline = Timeline::named("cut");
    let err = timeline
        .set_tracks(Object::new(Track::default()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    let stack = Object::new(Stack::named("tracks"));
    stack.append_child(&Object::new(Track::named("V1"))).unwrap();
    timeline.set_tracks(stack.clone()).unwrap();
    assert!(timeline.tracks().ptr_eq(&stack));
    assert_eq!(timeline.video_tracks().len(), 1);
}

#[test]
fn timeline_refuses_a_parented_stack() {
    let outer = Object::new(Stack::named("outer"));
    let nested = Object::new(Stack::named("nested"));
    outer.append_child(&nested).unwrap();

    let mut timeline = Timeline::named("cut");
    let err = timeline.set_tracks(nested.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ChildAlreadyParented);
    assert!(!timeline.tracks().ptr_eq(&nested));
}

#[test]
fn clone_is_equivalent_but_distinct() {
    let original = from_json_string(&timelines::json("simple").unwrap()).unwrap();
    let copy = original.deep_clone().unwrap();
    assert!(copy.is_equivalent_to(&original));
    assert!(!copy.ptr_eq(&original));

    copy.set_name("changed").unwrap();
    assert!(!copy.is_equivalent_to(&original));
    assert_eq!(original.name(), "Example");
}

#[test]
fn clone_keeps_internal_sharing() {
    let original = from_json_string(&timelines::json("shared-refs").unwrap()).unwrap();
    let copy = original.deep_clone().unwrap();
    let clips = copy.downcast_ref::<Timeline>().unwrap().find_clips();
    let a = clips[0].metadata().unwrap().get_object("plate").unwrap().clone();
    let b = clips[1].metadata().unwrap().get_object("plate").unwrap().clone();
    assert!(a.ptr_eq(&b));

    let source_clips = original.downcast_ref::<Timeline>().unwrap().find_clips();
    let source_plate = source_clips[0]
        .metadata()
        .unwrap()
        .get_object("plate")
        .unwrap()
        .clone();
    assert!(!a.ptr_eq(&source_plate));
}

#[test]
fn effects_round_trip_with_their_parameters() {
    let clip = Object::new(Clip::new("fx", None, Some(TimeRange::new(rt(0.0), rt(10.0)))).unwrap());
    clip.add_effect(Object::new(LinearTimeWarp::new("fast", 2.0)))
        .unwrap();
    clip.add_effect(Object::new(FreezeFrame::default())).unwrap();
    clip.add_effect(Object::new(Effect::new("blur", "GaussianBlur")))
        .unwrap();

    let json = to_json_value(&clip).unwrap();
    assert_eq!(json["effects"][0]["time_scalar"], 2.0);
    assert_eq!(json["effects"][1]["OTIO_SCHEMA"], "FreezeFrame.1");
    assert_eq!(json["effects"][1]["time_scalar"], 0.0);
    assert_eq!(json["effects"][2]["effect_name"], "GaussianBlur");

    let copy = clip.deep_clone().unwrap();
    let effects = copy.effects();
    assert_eq!(effects.len(), 3);
    assert_eq!(
        effects[0].downcast_ref::<LinearTimeWarp>().unwrap().time_scalar,
        2.0
    );
    assert!(effects.iter().all(Object::is_effect));
}

#[test]
fn generator_parameters_survive_serialization() {
    let mut generator = GeneratorReference::new("SMPTEBars", Some(TimeRange::new(rt(0.0), rt(48.0))));
    generator.parameters.insert("brightness", 0.75);
    generator
        .parameters
        .insert("label", Value::String("bars".to_string()));
    let clip = Object::new(Clip::new("bars", Some(Object::new(generator)), None).unwrap());
    assert_eq!(clip.duration().unwrap(), rt(48.0));

    let copy = clip.deep_clone().unwrap();
    let body = copy.downcast_ref::<Clip>().unwrap();
    let reference = body.media_reference().clone();
    drop(body);
    let generator = reference.downcast_ref::<GeneratorReference>().unwrap();
    assert_eq!(generator.generator_kind, "SMPTEBars");
    assert_eq!(generator.parameters.get_f64("brightness").unwrap(), 0.75);
}

#[test]
fn stale_cursor_is_rejected() {
    let clip = Object::new(Clip::named("cursor"));
    let mut metadata = clip.metadata_mut().unwrap();
    metadata.insert("a", 1i64);
    metadata.insert("b", 2i64);

    let mut cursor = metadata.cursor();
    let (key, _) = metadata.advance(&mut cursor).unwrap().unwrap();
    assert_eq!(key, "a");

    metadata.remove("a");
    let err = metadata.advance(&mut cursor).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalIndex);

    let mut fresh = metadata.cursor();
    let (key, value) = metadata.advance(&mut fresh).unwrap().unwrap();
    assert_eq!((key, value), ("b", &Value::Int(2)));
    assert!(metadata.advance(&mut fresh).unwrap().is_none());
}

#[test]
fn vectors_in_metadata_check_indices() {
    let mut vector: Vector = [1i64, 2, 3].into_iter().collect();
    assert_eq!(vector.insert(9, 4i64).unwrap_err().kind(), ErrorKind::IllegalIndex);
    vector.insert(3, "four").unwrap();
    assert_eq!(vector.get_str(3).unwrap(), "four");
    assert_eq!(vector.get_i64(0).unwrap(), 1);
    assert_eq!(vector.remove(0).unwrap(), Value::Int(1));
    assert_eq!(vector.len(), 3);

    let clip = Object::new(Clip::named("list"));
    clip.metadata_mut().unwrap().insert("items", vector);
    let copy = clip.deep_clone().unwrap();
    let metadata = copy.metadata().unwrap();
    let items = metadata.get_vector("items").unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items.get_str(2).unwrap(), "four");
}

#[test]
fn teardown_releases_metadata_cycles_across_objects() {
    let track = Object::new(Track::named("loop"));
    let clip = Object::new(Clip::named("inner"));
    track.append_child(&clip).unwrap();
    clip.metadata_mut()
        .unwrap()
        .insert("owner", Value::Object(track.clone()));

    let weak = track.downgrade();
    track.teardown();
    assert!(clip.metadata().unwrap().is_empty());
    drop(track);
    assert!(weak.upgrade().is_none());
    assert!(clip.parent().is_none());
}
