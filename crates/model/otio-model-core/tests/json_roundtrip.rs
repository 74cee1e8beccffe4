use serde_json::{json, Value as JsonValue};

use otio_model_core::{
    from_json_string, from_json_string_with_config, from_json_value, to_json_string,
    to_json_string_with_config, to_json_value, Clip, Config, Dictionary, ErrorKind, Marker,
    Object, RationalTime, TimeRange, TimeTransform, Track, UnknownSchema, Value,
};
use otio_test_fixtures::{compat, invalid, timelines};

fn rt(frames: f64) -> RationalTime {
    RationalTime::new(frames, 24.0)
}

#[test]
fn fixture_timelines_round_trip_exactly() {
    for name in timelines::keys() {
        let original = timelines::value(&name).unwrap();
        let object = from_json_value(original.clone()).unwrap();
        let written = to_json_value(&object).unwrap();
        assert_eq!(written, original, "fixture {name} changed on round trip");
    }
}

#[test]
fn decoded_graph_is_equivalent_after_second_pass() {
    let text = timelines::json("simple").unwrap();
    let first = from_json_string(&text).unwrap();
    let second = from_json_string(&to_json_string(&first).unwrap()).unwrap();
    assert!(first.is_equivalent_to(&second));
    assert!(!first.ptr_eq(&second));
}

#[test]
fn compact_and_indented_output_decode_the_same() {
    let text = timelines::json("layered").unwrap();
    let object = from_json_string(&text).unwrap();
    let compact = to_json_string_with_config(&object, &Config::compact()).unwrap();
    assert!(!compact.contains('\n'));
    let pretty = to_json_string(&object).unwrap();
    assert!(pretty.contains("\n    \"OTIO_SCHEMA\""));

    let a: JsonValue = serde_json::from_str(&compact).unwrap();
    let b: JsonValue = serde_json::from_str(&pretty).unwrap();
    assert_eq!(a, b);
}

#[test]
fn unknown_schema_is_preserved() {
    let text = compat::json("unknown-schema").unwrap();
    let original: JsonValue = serde_json::from_str(&text).unwrap();
    let track = from_json_string(&text).unwrap();

    let mystery = track.child_at(1).unwrap();
    assert!(mystery.is_unknown_schema());
    {
        let body = mystery.downcast_ref::<UnknownSchema>().unwrap();
        assert_eq!(body.original_schema_name(), "BogusName");
        assert_eq!(body.original_schema_version(), 3);
    }
    assert_eq!(
        mystery.dynamic_fields().get_str("name").unwrap(),
        "mystery"
    );

    let written = to_json_value(&track).unwrap();
    assert_eq!(written["children"][1], original["children"][1]);
    assert_eq!(written, original);
}

#[test]
fn unknown_schema_can_be_refused() {
    let text = compat::json("unknown-schema").unwrap();
    let config = Config {
        allow_unknown_schemas: false,
        ..Config::default()
    };
    let err = from_json_string_with_config(&text, &config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaNotRegistered);
}

#[test]
fn legacy_names_decode_to_current_schemas() {
    for name in compat::keys() {
        let Some(expected) = compat::expected_schema(&name).unwrap() else {
            continue;
        };
        let object = from_json_string(&compat::json(&name).unwrap()).unwrap();
        assert_eq!(object.schema_name(), expected, "fixture {name}");
    }

    let track = from_json_string(&compat::json("filler-sequence").unwrap()).unwrap();
    let first = track.child_at(0).unwrap();
    assert_eq!(first.schema_name(), "Gap");
    let written = to_json_value(&track).unwrap();
    assert_eq!(written["OTIO_SCHEMA"], json!("Track.1"));
    assert_eq!(written["children"][0]["OTIO_SCHEMA"], json!("Gap.1"));
    assert_eq!(track.duration().unwrap(), rt(15.0));
}

#[test]
fn marker_v1_is_upgraded() {
    let clip = from_json_string(&compat::json("marker-v1").unwrap()).unwrap();
    let markers = clip.markers();
    assert_eq!(markers.len(), 1);
    let marker = markers[0].downcast_ref::<Marker>().unwrap();
    assert_eq!(marker.marked_range, TimeRange::new(rt(4.0), rt(2.0)));
    assert_eq!(marker.color, "BLUE");
    drop(marker);

    let written = to_json_value(&clip).unwrap();
    let marker_json = &written["markers"][0];
    assert_eq!(marker_json["OTIO_SCHEMA"], json!("Marker.2"));
    assert!(marker_json.get("range").is_none());
    assert!(marker_json.get("marked_range").is_some());
}

#[test]
fn invalid_documents_fail_with_their_kind() {
    for name in invalid::keys() {
        let expected: ErrorKind =
            serde_json::from_value(json!(invalid::expected_error(&name).unwrap())).unwrap();
        let err = from_json_string(&invalid::json(&name).unwrap()).unwrap_err();
        assert_eq!(err.kind(), expected, "fixture {name}: {err}");
    }
}

#[test]
fn shared_objects_are_written_once() {
    let shared = Object::new(Clip::named("shared"));
    let holder = Object::new(Track::default());
    holder
        .metadata_mut()
        .unwrap()
        .insert("first", Value::Object(shared.clone()));
    holder
        .metadata_mut()
        .unwrap()
        .insert("second", Value::Object(shared.clone()));

    let written = to_json_value(&holder).unwrap();
    assert_eq!(written["metadata"]["first"]["OTIO_REF_ID"], json!("Clip-1"));
    assert_eq!(
        written["metadata"]["second"],
        json!({"OTIO_SCHEMA": "SerializableObjectRef.1", "id": "Clip-1"})
    );

    let decoded = from_json_value(written).unwrap();
    let metadata = decoded.metadata().unwrap();
    let first = metadata.get_object("first").unwrap();
    let second = metadata.get_object("second").unwrap();
    assert!(first.ptr_eq(&second));
}

#[test]
fn shared_fixture_resolves_to_one_object() {
    let timeline = from_json_string(&timelines::json("shared-refs").unwrap()).unwrap();
    let clips = timeline
        .downcast_ref::<otio_model_core::Timeline>()
        .unwrap()
        .find_clips();
    let a = clips[0].metadata().unwrap().get_object("plate").unwrap().clone();
    let b = clips[1].metadata().unwrap().get_object("plate").unwrap().clone();
    assert!(a.ptr_eq(&b));
    assert_eq!(a.name(), "plate");
}

#[test]
fn metadata_values_keep_their_types() {
    let clip = Object::new(Clip::named("typed"));
    {
        let mut metadata = clip.metadata_mut().unwrap();
        metadata.insert("flag", true);
        metadata.insert("count", 7i64);
        metadata.insert("ratio", 0.5);
        metadata.insert("label", "hero");
        metadata.insert("at", Value::RationalTime(rt(12.0)));
        metadata.insert(
            "span",
            Value::TimeRange(TimeRange::new(rt(0.0), rt(5.0))),
        );
        metadata.insert(
            "warp",
            Value::TimeTransform(TimeTransform::new(rt(10.0), 2.0, 24.0)),
        );
        let nested: Dictionary = [("inner", 1i64)].into_iter().collect();
        metadata.insert("nested", Value::Dictionary(nested));
        metadata.insert("nothing", Value::None);
    }

    let decoded = from_json_string(&to_json_string(&clip).unwrap()).unwrap();
    let metadata = decoded.metadata().unwrap();
    assert!(metadata.get_bool("flag").unwrap());
    assert_eq!(metadata.get_i64("count").unwrap(), 7);
    assert_eq!(metadata.get_f64("ratio").unwrap(), 0.5);
    assert_eq!(metadata.get_str("label").unwrap(), "hero");
    assert_eq!(metadata.get_time("at").unwrap(), rt(12.0));
    assert_eq!(
        metadata.get_range("span").unwrap(),
        TimeRange::new(rt(0.0), rt(5.0))
    );
    assert_eq!(metadata.get_transform("warp").unwrap().scale(), 2.0);
    assert_eq!(metadata.get_dictionary("nested").unwrap().get_i64("inner").unwrap(), 1);
    assert_eq!(metadata.get("nothing"), Some(&Value::None));
    assert_eq!(
        metadata.get_i64("label").unwrap_err().kind(),
        ErrorKind::TypeMismatch
    );
    assert_eq!(
        metadata.get_i64("missing").unwrap_err().kind(),
        ErrorKind::KeyNotFound
    );
}

#[test]
fn unregistered_fields_survive_as_dynamic_fields() {
    let doc = json!({
        "OTIO_SCHEMA": "Gap.1",
        "name": "spacer",
        "metadata": {},
        "source_range": null,
        "effects": [],
        "markers": [],
        "enabled": true,
        "vendor_hint": {"lane": 2}
    });
    let gap = from_json_value(doc.clone()).unwrap();
    assert_eq!(
        gap.dynamic_fields()
            .get_dictionary("vendor_hint")
            .unwrap()
            .get_i64("lane")
            .unwrap(),
        2
    );
    assert_eq!(to_json_value(&gap).unwrap(), doc);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = from_json_string("{not json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::JsonParseError);
    let err = from_json_string("[1, 2]").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedSchema);
}

#[test]
fn children_must_be_composable() {
    let doc = json!({
        "OTIO_SCHEMA": "Track.1",
        "children": [{"OTIO_SCHEMA": "Marker.2", "name": "wrong place"}]
    });
    let err = from_json_value(doc).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}
