//! Event model and `events.xml` parsing.
//!
//! The recorder writes a single XML document of timestamped events indexed by
//! module and event name. This crate turns that document into an ordered
//! sequence of typed [`Event`]s with timestamps rebased to seconds since the
//! first event, stored as exact rationals so the frame scheduler can step
//! time without drift.
//!
//! Parsing policy (see [`errors`]): a malformed individual event is logged
//! and skipped; only an unreadable or empty document is fatal. Recorder
//! version quirks are normalized here ([`version`]) so downstream layers
//! never branch on the recording's vintage except through the flags the
//! parser hands them.

pub mod errors;
pub mod parse;
pub mod version;

use core_geom::{Color, Position, Size};
use num_rational::Rational64;
use serde_json::Value;

pub use errors::{EventLogError, EventParsingError};
pub use parse::{parse_events, parse_events_str, ParsedEvents};
pub use version::{RecorderVersion, VersionGates};

/// Seconds since the start of the recording, exact.
pub type Timestamp = Rational64;

/// The pod used when an event does not carry an explicit pod id.
pub const DEFAULT_PRESENTATION_POD: &str = "DEFAULT_PRESENTATION_POD";

/// A single recorded event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub timestamp: Timestamp,
    pub kind: EventKind,
}

/// Every event kind the renderer consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Cursor(CursorEvent),
    WhiteboardCursor(WhiteboardCursorEvent),
    PanZoom(PanZoomEvent),
    Slide(SlideEvent),
    Presentation(PresentationEvent),
    Shape(ShapeEvent),
    Undo(UndoEvent),
    Clear(ClearEvent),
    Record(RecordEvent),
    Presenter(PresenterEvent),
    Join(JoinEvent),
    Left(LeftEvent),
    TldrawAddShape(AddShapeEvent),
    TldrawDeleteShape(DeleteShapeEvent),
    TldrawCamera(CameraEvent),
}

impl EventKind {
    /// Pod this event belongs to, for the kinds that are per-pod. The
    /// scheduler drops per-pod events addressed to other pods.
    pub fn pod_id(&self) -> Option<&str> {
        match self {
            Self::PanZoom(e) => Some(&e.pod_id),
            Self::Slide(e) => Some(&e.pod_id),
            Self::Presentation(e) => Some(&e.pod_id),
            Self::Presenter(e) => Some(&e.pod_id),
            _ => None,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cursor(_) => "cursor",
            Self::WhiteboardCursor(_) => "cursor_v2",
            Self::PanZoom(_) => "pan_zoom",
            Self::Slide(_) => "slide",
            Self::Presentation(_) => "presentation",
            Self::Shape(_) => "shape",
            Self::Undo(_) => "undo",
            Self::Clear(_) => "clear",
            Self::Record(_) => "record",
            Self::Presenter(_) => "presenter",
            Self::Join(_) => "join",
            Self::Left(_) => "left",
            Self::TldrawAddShape(_) => "tldraw.add_shape",
            Self::TldrawDeleteShape(_) => "tldraw.delete_shape",
            Self::TldrawCamera(_) => "tldraw.camera",
        }
    }
}

/// Lifecycle status of a legacy drawn shape. Text shapes reuse the same
/// states under their own names in the XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeStatus {
    DrawStart,
    DrawUpdate,
    DrawEnd,
}

impl ShapeStatus {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "DRAW_START" | "textCreated" => Some(Self::DrawStart),
            "DRAW_UPDATE" | "textEdited" => Some(Self::DrawUpdate),
            "DRAW_END" | "textPublished" => Some(Self::DrawEnd),
            _ => None,
        }
    }
}

/// Path command stream for pencil shapes that carry curve data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PencilCommand {
    MoveTo,
    LineTo,
    QCurveTo,
    CCurveTo,
}

impl PencilCommand {
    pub fn from_int(i: i64) -> Option<Self> {
        match i {
            1 => Some(Self::MoveTo),
            2 => Some(Self::LineTo),
            3 => Some(Self::QCurveTo),
            4 => Some(Self::CCurveTo),
            _ => None,
        }
    }
}

/// Legacy shape kind discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyShapeKind {
    Pencil,
    Rectangle,
    Ellipse,
    Triangle,
    Line,
    Text,
    PollResult,
}

impl LegacyShapeKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pencil" => Some(Self::Pencil),
            "rectangle" => Some(Self::Rectangle),
            "ellipse" => Some(Self::Ellipse),
            "triangle" => Some(Self::Triangle),
            "line" => Some(Self::Line),
            "text" => Some(Self::Text),
            "poll_result" => Some(Self::PollResult),
            _ => None,
        }
    }

    /// Shapes that carry color and thickness.
    pub fn is_drawn(&self) -> bool {
        matches!(
            self,
            Self::Pencil | Self::Rectangle | Self::Ellipse | Self::Triangle | Self::Line
        )
    }
}

/// One answer row of a legacy poll result.
#[derive(Debug, Clone, PartialEq)]
pub struct PollAnswer {
    pub key: String,
    pub num_votes: i64,
}

/// Legacy (pre-tldraw) whiteboard shape event. Which optional fields are
/// populated depends on [`ShapeEvent::kind`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeEvent {
    pub kind: LegacyShapeKind,
    pub shape_id: Option<String>,
    pub status: Option<ShapeStatus>,
    pub presentation: Option<String>,
    pub slide: Option<i64>,
    pub user_id: Option<String>,
    /// Normalized to 0..1 slide fractions.
    pub points: Vec<Position>,
    // Drawn shapes.
    pub color: Color,
    pub thickness: Option<f64>,
    pub thickness_ratio: Option<f64>,
    pub rounded: bool,
    pub square: bool,
    pub circle: bool,
    pub commands: Option<Vec<PencilCommand>>,
    // Poll results.
    pub num_responders: i64,
    pub num_respondents: i64,
    pub result: Vec<PollAnswer>,
    // Text.
    pub width: f64,
    pub height: f64,
    pub font_color: Color,
    pub font_size: f64,
    pub calced_font_size: f64,
    pub text: String,
}

impl ShapeEvent {
    pub fn new(kind: LegacyShapeKind) -> Self {
        Self {
            kind,
            shape_id: None,
            status: None,
            presentation: None,
            slide: None,
            user_id: None,
            points: Vec::new(),
            color: Color::rgb(0.0, 0.0, 0.0),
            thickness: None,
            thickness_ratio: None,
            rounded: false,
            square: false,
            circle: false,
            commands: None,
            num_responders: 0,
            num_respondents: 0,
            result: Vec::new(),
            width: 0.0,
            height: 0.0,
            font_color: Color::rgb(0.0, 0.0, 0.0),
            font_size: 0.0,
            calced_font_size: 0.0,
            text: String::new(),
        }
    }
}

/// Presenter mouse position over the slide, 0..1 fractions; `None` when the
/// pointer left the slide.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorEvent {
    pub cursor: Option<Position>,
}

/// Per-user whiteboard cursor. Coordinates are 0..1 fractions on legacy
/// recordings and absolute shapes-space positions on tldraw recordings.
#[derive(Debug, Clone, PartialEq)]
pub struct WhiteboardCursorEvent {
    pub presentation: Option<String>,
    pub slide: Option<i64>,
    pub cursor: Option<Position>,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanZoomEvent {
    pub pan: Position,
    pub zoom: Size,
    pub pod_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideEvent {
    pub slide: i64,
    pub pod_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresentationEvent {
    pub presentation: String,
    pub pod_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UndoEvent {
    pub presentation: Option<String>,
    pub slide: Option<i64>,
    pub user_id: Option<String>,
    pub shape_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClearEvent {
    pub presentation: Option<String>,
    pub slide: Option<i64>,
    pub user_id: Option<String>,
    /// Absent on old recordings; treated as a full clear.
    pub full_clear: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordEvent {
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresenterEvent {
    pub user_id: String,
    pub pod_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinEvent {
    pub user_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeftEvent {
    pub user_id: String,
}

/// Tldraw shape add/update. `data` is the raw shape JSON document; the shape
/// model merges it over any existing shape with the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct AddShapeEvent {
    pub id: String,
    pub presentation: String,
    pub slide: i64,
    pub user_id: String,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteShapeEvent {
    pub id: String,
    pub presentation: String,
    pub slide: i64,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraEvent {
    pub pod: String,
    pub presentation: String,
    pub camera: Position,
    pub zoom: f64,
}
