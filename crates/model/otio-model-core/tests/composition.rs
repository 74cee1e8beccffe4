use otio_model_core::{
    Clip, ErrorKind, Gap, Marker, Object, RationalTime, Stack, TimeRange, Track, Transition,
};

fn rt(frames: f64) -> RationalTime {
    RationalTime::new(frames, 24.0)
}

fn range(start: f64, duration: f64) -> TimeRange {
    TimeRange::new(rt(start), rt(duration))
}

fn clip(name: &str, frames: f64) -> Object {
    Object::new(Clip::new(name, None, Some(range(0.0, frames))).unwrap())
}

/// `[a: 24] [gap: 12] [b: 36]`
fn sample_track() -> (Object, Object, Object) {
    let track = Object::new(Track::named("V1"));
    let a = clip("a", 24.0);
    let b = clip("b", 36.0);
    track.append_child(&a).unwrap();
    track
        .append_child(&Object::new(Gap::with_duration(rt(12.0))))
        .unwrap();
    track.append_child(&b).unwrap();
    (track, a, b)
}

#[test]
fn appending_a_parented_child_fails() {
    let (track, a, _) = sample_track();
    let other = Object::new(Track::default());
    let err = other.append_child(&a).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ChildAlreadyParented);
    assert!(a.parent().unwrap().ptr_eq(&track));
    assert!(other.children().is_empty());
}

#[test]
fn clearing_children_unparents_them() {
    let (track, a, b) = sample_track();
    let former = track.children();
    track.clear_children();
    assert!(track.children().is_empty());
    for child in former {
        assert!(child.parent().is_none());
    }
    let fresh = Object::new(Track::default());
    fresh.append_child(&a).unwrap();
    fresh.append_child(&b).unwrap();
    assert_eq!(fresh.children().len(), 2);
}

#[test]
fn index_mutations_check_bounds() {
    let (track, a, _) = sample_track();
    let extra = clip("extra", 5.0);
    assert_eq!(
        track.insert_child(4, &extra).unwrap_err().kind(),
        ErrorKind::IllegalIndex
    );
    assert_eq!(
        track.remove_child(3).unwrap_err().kind(),
        ErrorKind::IllegalIndex
    );
    assert_eq!(
        track.set_child(7, &extra).unwrap_err().kind(),
        ErrorKind::IllegalIndex
    );

    track.insert_child(3, &extra).unwrap();
    assert_eq!(track.index_of_child(&extra).unwrap(), 3);

    let removed = track.remove_child(0).unwrap();
    assert!(removed.ptr_eq(&a));
    assert!(a.parent().is_none());
    assert_eq!(track.children().len(), 3);
}

#[test]
fn set_child_swaps_parentage() {
    let (track, a, _) = sample_track();
    let replacement = clip("replacement", 24.0);
    track.set_child(0, &replacement).unwrap();
    assert!(a.parent().is_none());
    assert!(replacement.parent().unwrap().ptr_eq(&track));
    assert!(track.child_at(0).unwrap().ptr_eq(&replacement));
}

#[test]
fn non_composable_children_are_rejected() {
    let track = Object::new(Track::default());
    let marker = Object::new(Marker::default());
    let err = track.append_child(&marker).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    let clip = clip("leaf", 1.0);
    let err = clip.append_child(&Object::new(Gap::default())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn unrelated_object_is_not_a_child() {
    let (track, _, _) = sample_track();
    let stranger = clip("stranger", 1.0);
    assert_eq!(
        track.index_of_child(&stranger).unwrap_err().kind(),
        ErrorKind::NotAChildOf
    );
    assert_eq!(
        track.range_of_child(&stranger).unwrap_err().kind(),
        ErrorKind::NotAChildOf
    );
}

#[test]
fn track_lays_children_end_to_end() {
    let (track, a, b) = sample_track();
    assert_eq!(track.range_of_child(&a).unwrap(), range(0.0, 24.0));
    assert_eq!(track.range_of_child(&b).unwrap(), range(36.0, 36.0));
    assert_eq!(track.duration().unwrap(), rt(72.0));

    let ranges: Vec<TimeRange> = track
        .range_of_all_children()
        .unwrap()
        .into_iter()
        .map(|(_, r)| r)
        .collect();
    assert_eq!(
        ranges,
        vec![range(0.0, 24.0), range(24.0, 12.0), range(36.0, 36.0)]
    );
}

#[test]
fn stack_overlays_children() {
    let stack = Object::new(Stack::named("layers"));
    let short = Object::new(Track::default());
    short.append_child(&clip("s", 10.0)).unwrap();
    let (long, _, b) = sample_track();
    stack.append_child(&short).unwrap();
    stack.append_child(&long).unwrap();

    assert_eq!(stack.range_of_child_at_index(0).unwrap(), range(0.0, 10.0));
    assert_eq!(stack.range_of_child_at_index(1).unwrap(), range(0.0, 72.0));
    assert_eq!(stack.duration().unwrap(), rt(72.0));
    assert_eq!(stack.range_of_child(&b).unwrap(), range(36.0, 36.0));
    assert!(stack.is_parent_of(&b));
    assert!(!long.is_parent_of(&stack));
}

#[test]
fn trimmed_ranges_respect_the_parent_trim() {
    let (track, a, b) = sample_track();
    track.set_source_range(Some(range(30.0, 20.0))).unwrap();
    assert_eq!(track.trimmed_range_of_child(&a).unwrap(), None);
    assert_eq!(
        track.trimmed_range_of_child(&b).unwrap(),
        Some(range(36.0, 14.0))
    );
    assert_eq!(b.trimmed_range_in_parent().unwrap(), Some(range(36.0, 14.0)));
}

#[test]
fn children_at_time_descends_unless_shallow() {
    let stack = Object::new(Stack::default());
    let (track, _, b) = sample_track();
    stack.append_child(&track).unwrap();

    let deep = stack.children_at_time(rt(40.0), false).unwrap();
    assert_eq!(deep.len(), 2);
    assert!(deep[0].ptr_eq(&track));
    assert!(deep[1].ptr_eq(&b));

    let shallow = stack.children_at_time(rt(40.0), true).unwrap();
    assert_eq!(shallow.len(), 1);
}

#[test]
fn find_clips_walks_nested_compositions() {
    let stack = Object::new(Stack::default());
    let (track, _, _) = sample_track();
    stack.append_child(&track).unwrap();
    stack.append_child(&clip("top", 4.0)).unwrap();

    let names: Vec<String> = stack.find_clips(false).iter().map(Object::name).collect();
    assert_eq!(names, vec!["a", "b", "top"]);
    assert_eq!(stack.find_clips(true).len(), 1);
}

#[test]
fn transitions_overlap_their_neighbours() {
    let track = Object::new(Track::default());
    let a = clip("a", 24.0);
    let b = clip("b", 24.0);
    let dissolve = Object::new(Transition::new("x", "SMPTE_Dissolve", rt(5.0), rt(5.0)));
    track.append_child(&a).unwrap();
    track.append_child(&dissolve).unwrap();
    track.append_child(&b).unwrap();

    assert_eq!(track.duration().unwrap(), rt(48.0));
    assert_eq!(track.range_of_child(&b).unwrap(), range(24.0, 24.0));
    assert_eq!(track.range_of_child(&dissolve).unwrap(), range(19.0, 10.0));
    assert!(!dissolve.visible());
    assert!(dissolve.overlapping());

    let (head, tail) = track.handles_of_child(&a).unwrap();
    assert_eq!(head, None);
    assert_eq!(tail, Some(rt(5.0)));
    assert_eq!(b.visible_range().unwrap(), range(-5.0, 29.0));
}
