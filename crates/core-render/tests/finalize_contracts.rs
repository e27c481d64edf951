//! The two-phase finalize contract across layers: `finalize_frame` returns
//! true exactly when the cached pattern changed, and a repeated call with
//! the same state and transform is a no-op.

use cairo::{Context, Format, ImageSurface};
use serde_json::json;

use core_events::{
    AddShapeEvent, Event, EventKind, JoinEvent, PresentationEvent, ShapeEvent, ShapeStatus,
    SlideEvent, Timestamp, WhiteboardCursorEvent,
};
use core_events::LegacyShapeKind;
use core_geom::{Position, Size};
use core_render::cursor::CursorLayer;
use core_render::tldraw::TldrawLayer;
use core_render::whiteboard::ShapesLayer;
use core_render::Transform;

const VIEWPORT: Size = Size::new(96.0, 72.0);

fn ctx() -> Context {
    let surface = ImageSurface::create(Format::Rgb24, 96, 72).unwrap();
    Context::new(&surface).unwrap()
}

fn presentation_event() -> PresentationEvent {
    PresentationEvent {
        presentation: "deck".into(),
        pod_id: "DEFAULT_PRESENTATION_POD".into(),
    }
}

fn pencil(points: &[(f64, f64)]) -> ShapeEvent {
    let mut shape = ShapeEvent::new(LegacyShapeKind::Pencil);
    shape.shape_id = Some("s1".into());
    shape.status = Some(ShapeStatus::DrawEnd);
    shape.presentation = Some("deck".into());
    shape.slide = Some(0);
    shape.points = points.iter().map(|&(x, y)| Position::new(x, y)).collect();
    shape.thickness = Some(2.0);
    shape
}

#[test]
fn legacy_layer_is_clean_until_something_changes() {
    let transform = Transform::initial(VIEWPORT, false);
    let mut layer = ShapesLayer::new(ctx(), transform);

    // Nothing to draw, nothing changed.
    assert!(!layer.finalize_frame(transform).unwrap());

    layer.update_presentation(&presentation_event());
    layer.update_shape(&pencil(&[(0.1, 0.1), (0.5, 0.5)]));
    assert!(layer.finalize_frame(transform).unwrap());

    // Same state, same transform: cached pattern still valid.
    assert!(!layer.finalize_frame(transform).unwrap());

    // A moved view forces a re-render of the same shapes.
    let zoomed = Transform::derive(
        Size::new(1600.0, 1200.0),
        VIEWPORT,
        Position::new(0.1, 0.1),
        Size::new(0.5, 0.5),
        false,
    );
    assert!(layer.finalize_frame(zoomed).unwrap());
}

#[test]
fn tldraw_layer_rerenders_on_shape_updates_only() {
    let transform = Transform::initial(VIEWPORT, true);
    let mut layer = TldrawLayer::new(ctx(), transform, true);

    let presentation = Event {
        timestamp: Timestamp::from_integer(0),
        kind: EventKind::Presentation(presentation_event()),
    };
    let slide = Event {
        timestamp: Timestamp::from_integer(0),
        kind: EventKind::Slide(SlideEvent {
            slide: 1,
            pod_id: "DEFAULT_PRESENTATION_POD".into(),
        }),
    };
    layer.update(&presentation);
    layer.update(&slide);

    let add = Event {
        timestamp: Timestamp::from_integer(0),
        kind: EventKind::TldrawAddShape(AddShapeEvent {
            id: "shape:a".into(),
            presentation: "deck".into(),
            slide: 1,
            user_id: "u1".into(),
            data: json!({
                "type": "geo",
                "x": 10.0, "y": 10.0,
                "props": {"geo": "rectangle", "w": 40.0, "h": 30.0, "dash": "solid"},
            }),
        }),
    };
    layer.update(&add);

    assert!(layer.finalize_frame(transform).unwrap());
    assert!(!layer.finalize_frame(transform).unwrap());

    // Updating the shape invalidates its pattern and the layer.
    layer.update(&add);
    assert!(layer.finalize_frame(transform).unwrap());
}

#[test]
fn cursor_layer_tracks_movement_and_transform() {
    let transform = Transform::initial(VIEWPORT, false);
    let mut layer = CursorLayer::new(ctx(), VIEWPORT, false);

    // First finalize builds the (empty) pattern.
    assert!(layer.finalize_frame(transform).unwrap());
    assert!(!layer.finalize_frame(transform).unwrap());

    layer.update_join(&JoinEvent {
        user_id: "u1".into(),
        user_name: "User One".into(),
    });
    layer.update_cursor_v2(&WhiteboardCursorEvent {
        presentation: None,
        slide: None,
        cursor: Some(Position::new(0.25, 0.75)),
        user_id: "u1".into(),
    });
    assert!(layer.finalize_frame(transform).unwrap());
    assert!(!layer.finalize_frame(transform).unwrap());
}
