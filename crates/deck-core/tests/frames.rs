use deck_core::{
    CameraState, DeckConfig, DeckError, Document, Frame, Presentation, TimingFunction,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

const DECK: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" width="800" height="600">
  <rect/>
  <g id="bg" inkscape:label="Background"><rect/></g>
  <g id="fg" inkscape:label="Foreground"><circle r="3"/></g>
</svg>"#;

fn deck(config: DeckConfig) -> Presentation {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Presentation::init_with_config(Document::parse_svg(DECK).unwrap(), config).unwrap()
}

#[test]
fn frame_ids_are_unique_for_a_fixed_seed() {
    let mut pres = deck(DeckConfig::default().with_seed(0));
    let ids: Vec<String> = (0..500).map(|_| pres.make_frame_id()).collect();
    let distinct: HashSet<&String> = ids.iter().collect();

    assert_eq!(distinct.len(), ids.len());
}

#[test]
fn added_frames_have_unique_ids_and_aligned_arrays() {
    let mut pres = deck(DeckConfig::default().with_seed(5));
    for _ in 0..50 {
        pres.new_frame().unwrap();
    }

    let ids: HashSet<&str> = pres.frames().iter().map(|f| f.frame_id()).collect();
    assert_eq!(ids.len(), 50);
    for (i, frame) in pres.frames().iter().enumerate() {
        assert_eq!(frame.index(&pres), Ok(i));
        assert_eq!(frame.camera_states().len(), pres.layers().len());
        assert_eq!(frame.layer_properties().len(), pres.layers().len());
    }
}

#[test]
fn new_frame_captures_document_view() {
    let mut pres = deck(DeckConfig::default().with_seed(1));
    let index = pres.new_frame().unwrap();
    let frame = pres.frame(index).unwrap();

    let expected = CameraState {
        cx: 400.0,
        cy: 300.0,
        width: 800.0,
        height: 600.0,
        angle: 0.0,
        clipped: true,
    };
    assert!(frame.camera_states().iter().all(|s| *s == expected));
    assert_eq!(pres.document_camera(), expected);
}

#[test]
fn config_defaults_flow_into_new_frames() {
    let config = DeckConfig::from_json_str(
        r#"{
            "frame_id_prefix": "slide",
            "seed": 9,
            "frame": { "title": "Untitled", "transition_duration_ms": 250, "timeout_enable": true },
            "layer": { "clip": false, "transition_timing_function": "ease-out", "transition_relative_zoom": -0.5 }
        }"#,
    )
    .unwrap();
    let mut pres = deck(config);
    let index = pres.new_frame().unwrap();
    let frame = pres.frame(index).unwrap();

    assert!(frame.frame_id().starts_with("slide"));
    assert_eq!(frame.title(), "Untitled");
    assert_eq!(frame.transition_duration_ms(), 250);
    assert!(frame.timeout_enable());
    let prop = frame.layer_property(0).unwrap();
    assert!(!prop.clip);
    assert_eq!(prop.transition_timing_function, TimingFunction::EaseOut);
    assert_eq!(prop.transition_relative_zoom, -0.5);
    assert!(prop.transition_path_hide);
}

#[test]
fn copying_states_between_frames() {
    let mut pres = deck(DeckConfig::default().with_seed(2));
    let first = pres.new_frame().unwrap();
    let second = pres.new_frame().unwrap();

    pres.frame_mut(first).unwrap().camera_state_mut(1).unwrap().angle = 30.0;
    let states = pres.frame(first).unwrap().camera_states().to_vec();
    pres.frame_mut(second).unwrap().set_camera_states(&states).unwrap();

    assert_eq!(pres.frame(second).unwrap().camera_states()[1].angle, 30.0);

    let err = pres
        .frame_mut(second)
        .unwrap()
        .set_camera_states(&states[..2])
        .unwrap_err();
    assert_eq!(err, DeckError::LengthMismatch { expected: 3, actual: 2 });
}

#[test]
fn frame_list_changes_are_notified() {
    let mut pres = deck(DeckConfig::default().with_seed(3));
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    let subscription = pres.subscribe(move |e| sink.borrow_mut().push(e.to_string()));

    pres.new_frame().unwrap();
    pres.new_frame().unwrap();
    pres.move_frame(1, 0).unwrap();
    pres.move_frame(0, 0).unwrap();
    pres.remove_frame(0).unwrap();
    assert!(pres.unsubscribe(subscription));
    pres.new_frame().unwrap();

    assert_eq!(events.borrow().len(), 4);
    assert!(events.borrow().iter().all(|e| e == "change:frames"));
}

#[test]
fn layer_visibility_through_presentation() {
    let mut pres = deck(DeckConfig::default().with_seed(4));
    let fired = Rc::new(RefCell::new(0));
    let counter = fired.clone();
    pres.layer_mut(2)
        .unwrap()
        .subscribe(move |_| *counter.borrow_mut() += 1);

    pres.set_layer_visible(2, false).unwrap();
    assert_eq!(pres.is_layer_visible(2), Ok(false));
    assert_eq!(pres.is_layer_visible(1), Ok(true));

    pres.set_layer_visible(2, true).unwrap();
    assert_eq!(pres.is_layer_visible(2), Ok(true));
    assert_eq!(*fired.borrow(), 2);

    let xml = pres.document().to_xml_string();
    assert!(xml.contains(r#"id="fg" inkscape:label="Foreground" style="visibility:visible""#));
}

#[test]
fn detached_frame_has_no_index() {
    let mut pres = deck(DeckConfig::default().with_seed(6));
    let frame = Frame::init(&mut pres);

    assert_eq!(frame.index(&pres), Err(DeckError::Detached));
    let index = pres.add_frame(frame).unwrap();
    assert_eq!(pres.frame(index).unwrap().index(&pres), Ok(0));
}

#[test]
fn entities_of_another_presentation_are_detached() {
    let mut a = deck(DeckConfig::default().with_seed(42));
    let mut b = deck(DeckConfig::default().with_seed(42));
    a.new_frame().unwrap();

    let foreign_frame = Frame::init(&mut b);
    assert_eq!(foreign_frame.frame_id(), a.frame(0).unwrap().frame_id());
    assert_eq!(foreign_frame.index(&a), Err(DeckError::Detached));

    let foreign_layer = b.layer(1).unwrap();
    assert_eq!(foreign_layer.label(), a.layer(1).unwrap().label());
    assert_eq!(foreign_layer.index(&a), Err(DeckError::Detached));
    assert_eq!(foreign_layer.index(&b), Ok(1));

    assert!(matches!(
        a.add_frame(foreign_frame),
        Err(DeckError::ForeignFrame(_))
    ));
    assert_eq!(a.frames().len(), 1);
}
