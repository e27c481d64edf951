//! End-to-end parses of small recording documents.

use num_rational::Rational64;

use core_events::{parse_events_str, EventKind, LegacyShapeKind, ShapeStatus};

fn doc(version: &str, body: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?><recording bbb_version=\"{version}\"><metadata bn-rec-hide-logo=\"false\"/>{body}</recording>"
    )
}

#[test]
fn empty_session_with_explicit_record_event() {
    // A minimal session: a single record-start event. One event, no
    // synthetic prepend, a 0-length recording.
    let xml = doc(
        "2.0",
        concat!(
            r#"<event timestamp="500" module="PARTICIPANT" eventname="RecordStatusEvent">"#,
            "<status>true</status></event>",
        ),
    );
    let parsed = parse_events_str(&xml).unwrap();
    assert_eq!(parsed.events.len(), 1);
    assert_eq!(parsed.length, Rational64::from_integer(0));
    assert!(matches!(parsed.events[0].kind, EventKind::Record(_)));
    assert!(!parsed.hide_logo);
}

#[test]
fn record_gating_pauses_are_preserved_in_order() {
    let xml = doc(
        "2.0",
        concat!(
            r#"<event timestamp="0" module="PARTICIPANT" eventname="RecordStatusEvent"><status>true</status></event>"#,
            r#"<event timestamp="4000" module="PARTICIPANT" eventname="RecordStatusEvent"><status>false</status></event>"#,
            r#"<event timestamp="9000" module="PARTICIPANT" eventname="RecordStatusEvent"><status>true</status></event>"#,
        ),
    );
    let parsed = parse_events_str(&xml).unwrap();
    let statuses: Vec<bool> = parsed
        .events
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::Record(r) => Some(r.status),
            _ => None,
        })
        .collect();
    assert_eq!(statuses, [true, false, true]);
    assert_eq!(parsed.length, Rational64::from_integer(9));
}

#[test]
fn pod_events_carry_their_pod_id() {
    let xml = doc(
        "2.1",
        concat!(
            r#"<event timestamp="0" module="PRESENTATION" eventname="SharePresentationEvent">"#,
            "<presentationName>deck</presentationName><podId>pod-2</podId></event>",
            r#"<event timestamp="100" module="PRESENTATION" eventname="SetPresenterInPodEvent">"#,
            "<nextPresenterId>u9</nextPresenterId><podId>pod-2</podId></event>",
        ),
    );
    let parsed = parse_events_str(&xml).unwrap();
    let pods: Vec<&str> = parsed
        .events
        .iter()
        .filter_map(|e| e.kind.pod_id())
        .collect();
    assert_eq!(pods, ["pod-2", "pod-2"]);
}

#[test]
fn legacy_presenter_event_is_ignored_when_pods_exist() {
    // From 2.1 on the per-pod presenter event supersedes the participant
    // module's one.
    let xml = doc(
        "2.1",
        concat!(
            r#"<event timestamp="0" module="PARTICIPANT" eventname="AssignPresenterEvent">"#,
            "<userid>legacy</userid></event>",
            r#"<event timestamp="100" module="PRESENTATION" eventname="SetPresenterInPodEvent">"#,
            "<nextPresenterId>modern</nextPresenterId><podId>DEFAULT_PRESENTATION_POD</podId></event>",
        ),
    );
    let parsed = parse_events_str(&xml).unwrap();
    let presenters: Vec<String> = parsed
        .events
        .iter()
        .filter_map(|e| match &e.kind {
            EventKind::Presenter(p) => Some(p.user_id.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(presenters, ["modern"]);
}

#[test]
fn modify_text_event_parses_like_a_shape() {
    let xml = doc(
        "2.0",
        concat!(
            r#"<event timestamp="0" module="WHITEBOARD" eventname="ModifyTextEvent">"#,
            "<id>t1</id><type>text</type><status>textEdited</status>",
            "<presentation>deck</presentation><slide>1</slide>",
            "<dataPoints>10,10</dataPoints>",
            "<textBoxWidth>50</textBoxWidth><textBoxHeight>20</textBoxHeight>",
            "<fontColor>0</fontColor><fontSize>18</fontSize>",
            "<calcedFontSize>4</calcedFontSize><text>hello</text></event>",
        ),
    );
    let parsed = parse_events_str(&xml).unwrap();
    let shape = parsed
        .events
        .iter()
        .find_map(|e| match &e.kind {
            EventKind::Shape(s) => Some(s.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(shape.kind, LegacyShapeKind::Text);
    assert_eq!(shape.status, Some(ShapeStatus::DrawUpdate));
    assert_eq!(shape.text, "hello");
    assert!((shape.width - 0.5).abs() < 1e-12);
    assert!((shape.calced_font_size - 0.04).abs() < 1e-12);
}

#[test]
fn whiteboard_cursor_coordinates_depend_on_the_version() {
    let body = concat!(
        r#"<event timestamp="0" module="WHITEBOARD" eventname="WhiteboardCursorMoveEvent">"#,
        "<xOffset>50</xOffset><yOffset>25</yOffset><userId>u1</userId></event>",
    );

    // Pre-tldraw: percent of the slide.
    let parsed = parse_events_str(&doc("2.5", body)).unwrap();
    let cursor = parsed
        .events
        .iter()
        .find_map(|e| match &e.kind {
            EventKind::WhiteboardCursor(c) => Some(c.clone()),
            _ => None,
        })
        .unwrap();
    let position = cursor.cursor.unwrap();
    assert!((position.x - 0.5).abs() < 1e-12);
    assert!((position.y - 0.25).abs() < 1e-12);

    // Tldraw: absolute shapes-space coordinates.
    let parsed = parse_events_str(&doc("2.6", body)).unwrap();
    let cursor = parsed
        .events
        .iter()
        .find_map(|e| match &e.kind {
            EventKind::WhiteboardCursor(c) => Some(c.clone()),
            _ => None,
        })
        .unwrap();
    let position = cursor.cursor.unwrap();
    assert_eq!((position.x, position.y), (50.0, 25.0));
}
