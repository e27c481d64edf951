//! Tldraw whiteboard shape model.
//!
//! Shapes arrive as JSON documents attached to add-shape events. A document
//! may be partial: the first add creates the shape, later adds merge their
//! fields over the existing state, so every shape type exposes
//! `update_from_data` with "only overwrite what is present" semantics.
//!
//! Two schema generations exist. v1 puts fields at the top level with a
//! `style` object; v2 nests nearly everything under `props` with snake-case
//! style tokens and a different handle layout. [`parse_shape_from_data`]
//! picks the variant using the recorder version, after which the two
//! families never mix.

pub mod style;

use core_geom::{vec, Position, Size};
use serde_json::Value;
use thiserror::Error;

pub use style::{
    color, fill_color, font_face, font_size, highlight_color, sticky_fill_color,
    sticky_font_size, stroke_color, stroke_width, AlignStyle, ColorStyle, DashStyle, FillStyle,
    FontStyle, SizeStyle, Style, CANVAS, LETTER_SPACING, PATTERN_FILL_BACKGROUND_COLOR,
    STICKY_PADDING, STICKY_TEXT_COLOR,
};

/// A shape document could not be understood; the add event is dropped and
/// any existing shape with the same id left intact.
#[derive(Debug, Error)]
pub enum ShapeDataError {
    #[error("shape data has no type field")]
    MissingType,

    #[error("unknown shape type '{0}'")]
    UnknownType(String),

    #[error("unknown geo shape '{0}'")]
    UnknownGeo(String),

    #[error("unknown {field} token '{token}'")]
    UnknownToken { field: String, token: String },

    #[error("shape update has an empty point list")]
    EmptyPoints,
}

impl ShapeDataError {
    pub(crate) fn unknown_token(field: &str, token: &str) -> Self {
        Self::UnknownToken {
            field: field.to_owned(),
            token: token.to_owned(),
        }
    }
}

/// Arrow end-cap decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    Arrow,
    Bar,
    Diamond,
    Dot,
    Inverted,
    None,
    Square,
    Triangle,
}

impl Decoration {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "arrow" => Some(Self::Arrow),
            "bar" => Some(Self::Bar),
            "diamond" => Some(Self::Diamond),
            "dot" => Some(Self::Dot),
            "inverted" => Some(Self::Inverted),
            "none" => Some(Self::None),
            "square" => Some(Self::Square),
            "triangle" => Some(Self::Triangle),
            _ => None,
        }
    }
}

/// Spline mode of a v2 line shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplineType {
    #[default]
    None,
    Line,
    Cubic,
}

/// Which geo outline a v2 `geo` shape uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeoKind {
    #[default]
    None,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    CheckBox,
    Cloud,
    Diamond,
    Ellipse,
    Hexagon,
    Oval,
    Rectangle,
    Rhombus,
    Star,
    Trapezoid,
    Triangle,
    XBox,
}

impl GeoKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "arrow-down" => Some(Self::ArrowDown),
            "arrow-left" => Some(Self::ArrowLeft),
            "arrow-right" => Some(Self::ArrowRight),
            "arrow-up" => Some(Self::ArrowUp),
            "check-box" => Some(Self::CheckBox),
            "cloud" => Some(Self::Cloud),
            "diamond" => Some(Self::Diamond),
            "ellipse" => Some(Self::Ellipse),
            "hexagon" => Some(Self::Hexagon),
            "" => Some(Self::None),
            "oval" => Some(Self::Oval),
            "rectangle" => Some(Self::Rectangle),
            "rhombus" => Some(Self::Rhombus),
            "star" => Some(Self::Star),
            "trapezoid" => Some(Self::Trapezoid),
            "triangle" => Some(Self::Triangle),
            "x-box" => Some(Self::XBox),
            _ => None,
        }
    }
}

/// A point-ish JSON value: `[x, y]`, `[x, y, z]`, or `{"x": .., "y": ..}`.
fn value_position(v: &Value) -> Option<Position> {
    if let Some(arr) = v.as_array() {
        let x = arr.first()?.as_f64()?;
        let y = arr.get(1)?.as_f64()?;
        return Some(Position::new(x, y));
    }
    let x = v.get("x")?.as_f64()?;
    let y = v.get("y")?.as_f64()?;
    Some(Position::new(x, y))
}

/// Fields common to every shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    pub style: Style,
    /// Paint-order sort key within a slide.
    pub child_index: f64,
    /// Origin of the shape in shapes space.
    pub point: Position,
    /// Owning frame or group, empty when top-level.
    pub parent_id: String,
    /// Child ids, populated for groups.
    pub children: Vec<String>,
}

impl Default for Base {
    fn default() -> Self {
        Self {
            style: Style::default(),
            child_index: 1.0,
            point: Position::new(0.0, 0.0),
            parent_id: String::new(),
            children: Vec::new(),
        }
    }
}

impl Base {
    fn update_from_data(&mut self, data: &Value) -> Result<(), ShapeDataError> {
        if let Some(style) = data.get("style") {
            self.style.update_from_data(style)?;
        }
        if let Some(props) = data.get("props") {
            self.style.update_from_data(props)?;
        }
        if let Some(v) = data.get("childIndex").and_then(|v| v.as_f64()) {
            self.child_index = v;
        }
        if let Some(point) = data.get("point").and_then(value_position) {
            self.point = point;
        } else if let (Some(x), Some(y)) = (
            data.get("x").and_then(|v| v.as_f64()),
            data.get("y").and_then(|v| v.as_f64()),
        ) {
            self.point = Position::new(x, y);
        }
        if let Some(v) = data.get("opacity").and_then(|v| v.as_f64()) {
            self.style.opacity = v;
        }
        if let Some(v) = data.get("parentId").and_then(|v| v.as_str()) {
            self.parent_id = v.to_owned();
        }
        if let Some(children) = data.get("children").and_then(|v| v.as_array()) {
            self.children = children
                .iter()
                .filter_map(|c| c.as_str().map(str::to_owned))
                .collect();
        }
        Ok(())
    }
}

/// Merge the precalculated bounding box: v1 `size: [w, h]`, v2
/// `props.w`/`props.h` plus the text-overflow `growY`.
fn update_size(size: &mut Size, data: &Value) {
    if let Some(v) = data.get("size").and_then(value_position) {
        *size = Size::new(v.x, v.y);
    }
    if let Some(props) = data.get("props") {
        if let (Some(w), Some(h)) = (
            props.get("w").and_then(|v| v.as_f64()),
            props.get("h").and_then(|v| v.as_f64()),
        ) {
            let grow_y = props.get("growY").and_then(|v| v.as_f64()).unwrap_or(0.0);
            *size = Size::new(w, h + grow_y);
        }
    }
}

fn update_rotation(rotation: &mut f64, data: &Value) {
    if let Some(v) = data.get("rotation").and_then(|v| v.as_f64()) {
        *rotation = v;
    }
}

/// Input samples of a freehand stroke. Pressure defaults to 0.5 when the
/// sample had none; the draw finalizer uses that value to decide whether to
/// simulate pressure.
pub type DrawPoints = Vec<(f64, f64, f64)>;

fn update_draw_points(points: &mut DrawPoints, data: &Value) {
    if let Some(raw) = data.get("points").and_then(|v| v.as_array()) {
        *points = raw
            .iter()
            .filter_map(|p| {
                let arr = p.as_array()?;
                let x = arr.first()?.as_f64()?;
                let y = arr.get(1)?.as_f64()?;
                let z = arr.get(2).and_then(|v| v.as_f64()).unwrap_or(0.5);
                Some((x, y, z))
            })
            .collect();
    } else if let Some(segments) = data
        .get("props")
        .and_then(|p| p.get("segments"))
        .and_then(|v| v.as_array())
    {
        let mut collected = Vec::new();
        for segment in segments {
            let Some(seg_points) = segment.get("points").and_then(|v| v.as_array()) else {
                continue;
            };
            for p in seg_points {
                let (Some(x), Some(y)) = (
                    p.get("x").and_then(|v| v.as_f64()),
                    p.get("y").and_then(|v| v.as_f64()),
                ) else {
                    continue;
                };
                let z = p.get("z").and_then(|v| v.as_f64()).unwrap_or(0.5);
                collected.push((x, y, z));
            }
        }
        *points = collected;
    }
}

fn update_is_complete(is_complete: &mut bool, data: &Value) {
    if let Some(v) = data.get("isComplete").and_then(|v| v.as_bool()) {
        *is_complete = v;
    } else if let Some(v) = data
        .get("props")
        .and_then(|p| p.get("isComplete"))
        .and_then(|v| v.as_bool())
    {
        *is_complete = v;
    }
}

/// Freehand pen stroke.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawShape {
    pub base: Base,
    pub size: Size,
    pub rotation: f64,
    pub points: DrawPoints,
    pub is_complete: bool,
}

impl DrawShape {
    pub fn update_from_data(&mut self, data: &Value) -> Result<(), ShapeDataError> {
        self.base.update_from_data(data)?;
        update_size(&mut self.size, data);
        update_rotation(&mut self.rotation, data);
        update_draw_points(&mut self.points, data);
        update_is_complete(&mut self.is_complete, data);
        Ok(())
    }
}

/// Highlighter stroke; same payload as a draw shape, different rendering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HighlighterShape {
    pub base: Base,
    pub size: Size,
    pub rotation: f64,
    pub points: DrawPoints,
    pub is_complete: bool,
}

impl HighlighterShape {
    pub fn update_from_data(&mut self, data: &Value) -> Result<(), ShapeDataError> {
        self.base.update_from_data(data)?;
        update_size(&mut self.size, data);
        update_rotation(&mut self.rotation, data);
        update_draw_points(&mut self.points, data);
        update_is_complete(&mut self.is_complete, data);
        Ok(())
    }
}

/// Fields shared by every shape that can carry a centred label.
#[derive(Debug, Clone, PartialEq)]
pub struct Labelled {
    pub base: Base,
    pub size: Size,
    pub rotation: f64,
    pub label: Option<String>,
    /// Label anchor within the shape, 0..1 fractions of the bounds.
    pub label_point: Position,
    pub align: AlignStyle,
    pub vertical_align: AlignStyle,
    pub geo: GeoKind,
}

impl Default for Labelled {
    fn default() -> Self {
        Self::with_size(Size::new(1.0, 1.0))
    }
}

impl Labelled {
    pub fn with_size(size: Size) -> Self {
        Self {
            base: Base::default(),
            size,
            rotation: 0.0,
            label: None,
            label_point: Position::new(0.5, 0.5),
            align: AlignStyle::Middle,
            vertical_align: AlignStyle::Middle,
            geo: GeoKind::None,
        }
    }

    /// Offset applied when drawing the label for most shapes.
    pub fn label_offset(&self) -> Position {
        Position::new(
            (self.label_point.x - 0.5) * self.size.width,
            (self.label_point.y - 0.5) * self.size.height,
        )
    }

    pub fn update_from_data(&mut self, data: &Value) -> Result<(), ShapeDataError> {
        self.base.update_from_data(data)?;
        update_size(&mut self.size, data);
        update_rotation(&mut self.rotation, data);

        if let Some(v) = data.get("label").and_then(|v| v.as_str()) {
            self.label = if v.is_empty() { None } else { Some(v.to_owned()) };
        }
        if let Some(p) = data.get("labelPoint").and_then(value_position) {
            self.label_point = p;
        }
        if let Some(props) = data.get("props") {
            if let Some(v) = props.get("text").and_then(|v| v.as_str()) {
                self.label = Some(v.to_owned());
            }
            if let Some(token) = props.get("align").and_then(|v| v.as_str()) {
                self.align = AlignStyle::from_token(token)
                    .ok_or_else(|| ShapeDataError::unknown_token("align", token))?;
            }
            if let Some(token) = props.get("verticalAlign").and_then(|v| v.as_str()) {
                self.vertical_align = AlignStyle::from_token(token)
                    .ok_or_else(|| ShapeDataError::unknown_token("verticalAlign", token))?;
            }
            if let Some(token) = props.get("geo").and_then(|v| v.as_str()) {
                self.geo = GeoKind::from_token(token)
                    .ok_or_else(|| ShapeDataError::UnknownGeo(token.to_owned()))?;
            }
            // Frames carry their title in `name`.
            if props.get("w").is_some() && props.get("h").is_some() {
                if let Some(name) = props.get("name").and_then(|v| v.as_str()) {
                    if !name.is_empty() {
                        self.label = Some(name.to_owned());
                    }
                }
            }
        }
        Ok(())
    }
}

/// v1 ellipse; the radius is stored separately from the bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseShape {
    pub labelled: Labelled,
    pub radius: (f64, f64),
}

impl Default for EllipseShape {
    fn default() -> Self {
        Self {
            labelled: Labelled::default(),
            radius: (1.0, 1.0),
        }
    }
}

impl EllipseShape {
    pub fn update_from_data(&mut self, data: &Value) -> Result<(), ShapeDataError> {
        self.labelled.update_from_data(data)?;
        if let Some(r) = data.get("radius").and_then(value_position) {
            self.radius = (r.x, r.y);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextShape {
    pub base: Base,
    pub size: Size,
    pub rotation: f64,
    pub text: String,
}

impl TextShape {
    pub fn update_from_data(&mut self, data: &Value, v2: bool) -> Result<(), ShapeDataError> {
        self.base.update_from_data(data)?;
        update_size(&mut self.size, data);
        update_rotation(&mut self.rotation, data);
        if v2 {
            if let Some(v) = data
                .get("props")
                .and_then(|p| p.get("text"))
                .and_then(|v| v.as_str())
            {
                self.text = v.to_owned();
            }
        } else if let Some(v) = data.get("text").and_then(|v| v.as_str()) {
            self.text = v.to_owned();
        }
        Ok(())
    }
}

/// v1 sticky note.
#[derive(Debug, Clone, PartialEq)]
pub struct StickyShape {
    pub base: Base,
    pub size: Size,
    pub rotation: f64,
    pub text: String,
}

impl Default for StickyShape {
    fn default() -> Self {
        Self {
            base: Base::default(),
            size: Size::new(200.0, 200.0),
            rotation: 0.0,
            text: String::new(),
        }
    }
}

impl StickyShape {
    pub fn update_from_data(&mut self, data: &Value) -> Result<(), ShapeDataError> {
        self.base.update_from_data(data)?;
        update_size(&mut self.size, data);
        update_rotation(&mut self.rotation, data);
        if let Some(v) = data.get("text").and_then(|v| v.as_str()) {
            self.text = v.to_owned();
        }
        Ok(())
    }
}

/// v2 sticky note; text can grow the note and force top alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct StickyShapeV2 {
    pub base: Base,
    pub size: Size,
    pub rotation: f64,
    pub text: String,
    pub align: AlignStyle,
    pub vertical_align: AlignStyle,
}

impl Default for StickyShapeV2 {
    fn default() -> Self {
        Self {
            base: Base::default(),
            size: Size::new(200.0, 200.0),
            rotation: 0.0,
            text: String::new(),
            align: AlignStyle::Middle,
            vertical_align: AlignStyle::Middle,
        }
    }
}

impl StickyShapeV2 {
    pub fn update_from_data(&mut self, data: &Value) -> Result<(), ShapeDataError> {
        self.base.update_from_data(data)?;
        update_size(&mut self.size, data);
        update_rotation(&mut self.rotation, data);
        if let Some(props) = data.get("props") {
            if let Some(v) = props.get("text").and_then(|v| v.as_str()) {
                self.text = v.to_owned();
            }
            if let Some(token) = props.get("align").and_then(|v| v.as_str()) {
                self.align = AlignStyle::from_token(token)
                    .ok_or_else(|| ShapeDataError::unknown_token("align", token))?;
            }
            if let Some(token) = props.get("verticalAlign").and_then(|v| v.as_str()) {
                self.vertical_align = AlignStyle::from_token(token)
                    .ok_or_else(|| ShapeDataError::unknown_token("verticalAlign", token))?;
            }
            if let Some(grow_y) = props.get("growY").and_then(|v| v.as_f64()) {
                self.size = Size::new(self.size.width, self.size.height + grow_y);
                if grow_y != 0.0 {
                    self.vertical_align = AlignStyle::Start;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupShape {
    pub base: Base,
}

impl GroupShape {
    pub fn update_from_data(&mut self, data: &Value) -> Result<(), ShapeDataError> {
        self.base.update_from_data(data)
    }
}

/// Handle positions of a v1 arrow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHandles {
    pub start: Position,
    pub bend: Position,
    pub end: Position,
}

impl Default for ArrowHandles {
    fn default() -> Self {
        Self {
            start: Position::new(0.0, 0.0),
            bend: Position::new(0.5, 0.5),
            end: Position::new(1.0, 1.0),
        }
    }
}

impl ArrowHandles {
    fn update_from_data(&mut self, data: &Value) {
        for (name, slot) in [
            ("start", &mut self.start),
            ("bend", &mut self.bend),
            ("end", &mut self.end),
        ] {
            if let Some(p) = data
                .get(name)
                .and_then(|h| h.get("point"))
                .and_then(value_position)
            {
                *slot = p;
            }
        }
    }
}

/// Handle positions of a v2 line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHandles {
    pub start: Position,
    pub control_point: Position,
    pub end: Position,
}

impl Default for LineHandles {
    fn default() -> Self {
        Self {
            start: Position::new(0.0, 0.0),
            control_point: Position::new(0.5, 0.5),
            end: Position::new(1.0, 1.0),
        }
    }
}

impl LineHandles {
    fn update_from_data(&mut self, data: &Value) {
        for (name, slot) in [("start", &mut self.start), ("end", &mut self.end)] {
            if let Some(h) = data.get(name) {
                if let Some(p) = h.get("point").and_then(value_position) {
                    *slot = p;
                } else if let Some(p) = value_position(h) {
                    *slot = p;
                }
            }
        }
        // The optional curve control handle has a generated name.
        if let Some(h) = data.get("handle:a1V") {
            if let Some(p) = value_position(h) {
                self.control_point = p;
            }
        }
    }
}

/// Whether each end of an arrow draws a decoration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowDecorations {
    pub start: Option<Decoration>,
    pub end: Option<Decoration>,
}

impl Default for ArrowDecorations {
    fn default() -> Self {
        Self {
            start: None,
            end: Some(Decoration::Arrow),
        }
    }
}

impl ArrowDecorations {
    fn update_from_data(&mut self, data: &Value) {
        self.start = data
            .get("start")
            .and_then(|v| v.as_str())
            .and_then(Decoration::from_token);
        self.end = data
            .get("end")
            .and_then(|v| v.as_str())
            .and_then(Decoration::from_token);
    }
}

/// v1 arrow: explicit bend handle plus a redundant bend scalar.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrowShape {
    pub labelled: Labelled,
    /// Ratio of the bend to half the start-end distance; negative bends to
    /// the other side.
    pub bend: f64,
    pub handles: ArrowHandles,
    pub decorations: ArrowDecorations,
}

impl ArrowShape {
    pub fn update_from_data(&mut self, data: &Value) -> Result<(), ShapeDataError> {
        self.labelled.update_from_data(data)?;
        if let Some(v) = data.get("bend").and_then(|v| v.as_f64()) {
            self.bend = v;
        }
        if let Some(handles) = data.get("handles") {
            self.handles.update_from_data(handles);
        }
        if let Some(decorations) = data.get("decorations") {
            self.decorations.update_from_data(decorations);
        }
        Ok(())
    }

    /// Where the bend handle sits for the stored bend ratio. A nearly
    /// straight arrow collapses to the midpoint.
    pub fn bend_point(&self) -> (f64, f64) {
        let start: (f64, f64) = self.handles.start.into();
        let end: (f64, f64) = self.handles.end.into();

        let dist = vec::dist(start, end);
        let mid_point = vec::med(start, end);
        let bend_dist = (dist / 2.0) * self.bend;
        let u = vec::uni(vec::vec(start, end));

        if bend_dist.abs() < 10.0 {
            mid_point
        } else {
            vec::add(mid_point, vec::mul(vec::per(u), bend_dist))
        }
    }
}

/// v2 arrow: endpoints under `props`, bend as a plain perpendicular offset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrowShapeV2 {
    pub labelled: Labelled,
    pub bend: f64,
    pub handles: ArrowHandles,
    pub decorations: ArrowDecorations,
}

impl ArrowShapeV2 {
    pub fn update_from_data(&mut self, data: &Value) -> Result<(), ShapeDataError> {
        self.labelled.update_from_data(data)?;
        if let Some(props) = data.get("props") {
            if let Some(v) = props.get("bend").and_then(|v| v.as_f64()) {
                self.bend = v;
            }
            if let Some(p) = props.get("start").and_then(value_position) {
                self.handles.start = p;
            }
            if let Some(p) = props.get("end").and_then(value_position) {
                self.handles.end = p;
            }
            if let Some(token) = props.get("arrowheadStart").and_then(|v| v.as_str()) {
                self.decorations.start = Decoration::from_token(token);
            }
            if let Some(token) = props.get("arrowheadEnd").and_then(|v| v.as_str()) {
                self.decorations.end = Decoration::from_token(token);
            }
        }
        Ok(())
    }

    /// Materialize the bend handle from the scalar: midpoint pushed along
    /// the perpendicular of the start-end direction.
    pub fn bend_point(&self) -> Position {
        let start: (f64, f64) = self.handles.start.into();
        let end: (f64, f64) = self.handles.end.into();

        let mid = vec::med(start, end);
        let unit = vec::uni(vec::vec(start, end));
        let perp = vec::per(unit);
        let p = vec::add(mid, vec::mul(perp, -self.bend));
        Position::new(p.0, p.1)
    }
}

/// v2 line: straight, bent through a control point, or a cubic spline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineShape {
    pub labelled: Labelled,
    pub handles: LineHandles,
    pub spline: SplineType,
}

impl LineShape {
    pub fn update_from_data(&mut self, data: &Value) -> Result<(), ShapeDataError> {
        self.labelled.update_from_data(data)?;
        if let Some(props) = data.get("props") {
            if let Some(handles) = props.get("handles") {
                self.handles.update_from_data(handles);
            }
            if let Some(spline) = props.get("spline").and_then(|v| v.as_str()) {
                self.spline = match spline {
                    "line" => SplineType::Line,
                    "cubic" => SplineType::Cubic,
                    _ => SplineType::None,
                };
            }
        }
        Ok(())
    }
}

/// One answer row of a tldraw poll shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PollAnswer {
    pub key: String,
    pub num_votes: i64,
}

/// v2 poll-result chart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PollShape {
    pub base: Base,
    pub size: Size,
    pub rotation: f64,
    pub answers: Vec<PollAnswer>,
    pub num_respondents: i64,
    pub num_responders: i64,
    pub question_text: String,
}

impl PollShape {
    pub fn update_from_data(&mut self, data: &Value) -> Result<(), ShapeDataError> {
        self.base.update_from_data(data)?;
        update_size(&mut self.size, data);
        update_rotation(&mut self.rotation, data);
        if let Some(props) = data.get("props") {
            if let Some(answers) = props.get("answers").and_then(|v| v.as_array()) {
                self.answers = answers
                    .iter()
                    .map(|a| PollAnswer {
                        key: a
                            .get("key")
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_owned(),
                        num_votes: a.get("numVotes").and_then(|v| v.as_i64()).unwrap_or(0),
                    })
                    .collect();
            }
            if let Some(v) = props.get("numRespondents").and_then(|v| v.as_i64()) {
                self.num_respondents = v;
            }
            if let Some(v) = props.get("numResponders").and_then(|v| v.as_i64()) {
                self.num_responders = v;
            }
            if let Some(v) = props.get("questionText").and_then(|v| v.as_str()) {
                self.question_text = v.to_owned();
            }
        }
        Ok(())
    }
}

/// Every shape variant the whiteboard can hold. v1 and v2 variants are
/// distinct where the formats diverge; geo shapes share the labelled body
/// and differ only in outline.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Draw(DrawShape),
    Highlighter(HighlighterShape),
    Rectangle(Labelled),
    Ellipse(EllipseShape),
    Triangle(Labelled),
    Arrow(ArrowShape),
    ArrowV2(ArrowShapeV2),
    Line(LineShape),
    Text(TextShape),
    TextV2(TextShape),
    Sticky(StickyShape),
    StickyV2(StickyShapeV2),
    Group(GroupShape),
    Frame(Labelled),
    Poll(PollShape),
    GeoRectangle(Labelled),
    GeoEllipse(Labelled),
    GeoTriangle(Labelled),
    Diamond(Labelled),
    Rhombus(Labelled),
    Trapezoid(Labelled),
    Hexagon(Labelled),
    Cloud(Labelled),
    Star(Labelled),
    Oval(Labelled),
    CheckBox(Labelled),
    XBox(Labelled),
    ArrowGeo(Labelled),
}

impl Shape {
    /// Paint-order key.
    pub fn child_index(&self) -> f64 {
        self.base().child_index
    }

    /// Origin in shapes space.
    pub fn point(&self) -> Position {
        self.base().point
    }

    pub fn style(&self) -> &Style {
        &self.base().style
    }

    pub fn parent_id(&self) -> &str {
        &self.base().parent_id
    }

    pub fn base(&self) -> &Base {
        match self {
            Self::Draw(s) => &s.base,
            Self::Highlighter(s) => &s.base,
            Self::Rectangle(s)
            | Self::Triangle(s)
            | Self::Frame(s)
            | Self::GeoRectangle(s)
            | Self::GeoEllipse(s)
            | Self::GeoTriangle(s)
            | Self::Diamond(s)
            | Self::Rhombus(s)
            | Self::Trapezoid(s)
            | Self::Hexagon(s)
            | Self::Cloud(s)
            | Self::Star(s)
            | Self::Oval(s)
            | Self::CheckBox(s)
            | Self::XBox(s)
            | Self::ArrowGeo(s) => &s.base,
            Self::Ellipse(s) => &s.labelled.base,
            Self::Arrow(s) => &s.labelled.base,
            Self::ArrowV2(s) => &s.labelled.base,
            Self::Line(s) => &s.labelled.base,
            Self::Text(s) | Self::TextV2(s) => &s.base,
            Self::Sticky(s) => &s.base,
            Self::StickyV2(s) => &s.base,
            Self::Group(s) => &s.base,
            Self::Poll(s) => &s.base,
        }
    }

    /// Bounding box, for shapes that have one (groups do not).
    pub fn size(&self) -> Option<Size> {
        match self {
            Self::Draw(s) => Some(s.size),
            Self::Highlighter(s) => Some(s.size),
            Self::Rectangle(s)
            | Self::Triangle(s)
            | Self::Frame(s)
            | Self::GeoRectangle(s)
            | Self::GeoEllipse(s)
            | Self::GeoTriangle(s)
            | Self::Diamond(s)
            | Self::Rhombus(s)
            | Self::Trapezoid(s)
            | Self::Hexagon(s)
            | Self::Cloud(s)
            | Self::Star(s)
            | Self::Oval(s)
            | Self::CheckBox(s)
            | Self::XBox(s)
            | Self::ArrowGeo(s) => Some(s.size),
            Self::Ellipse(s) => Some(s.labelled.size),
            Self::Arrow(s) => Some(s.labelled.size),
            Self::ArrowV2(s) => Some(s.labelled.size),
            Self::Line(s) => Some(s.labelled.size),
            Self::Text(s) | Self::TextV2(s) => Some(s.size),
            Self::Sticky(s) => Some(s.size),
            Self::StickyV2(s) => Some(s.size),
            Self::Group(_) => None,
            Self::Poll(s) => Some(s.size),
        }
    }

    /// Merge a partial shape document over the current state.
    pub fn update_from_data(&mut self, data: &Value) -> Result<(), ShapeDataError> {
        match self {
            Self::Draw(s) => s.update_from_data(data),
            Self::Highlighter(s) => s.update_from_data(data),
            Self::Rectangle(s)
            | Self::Triangle(s)
            | Self::Frame(s)
            | Self::GeoRectangle(s)
            | Self::GeoEllipse(s)
            | Self::GeoTriangle(s)
            | Self::Diamond(s)
            | Self::Rhombus(s)
            | Self::Trapezoid(s)
            | Self::Hexagon(s)
            | Self::Cloud(s)
            | Self::Star(s)
            | Self::Oval(s)
            | Self::CheckBox(s)
            | Self::XBox(s)
            | Self::ArrowGeo(s) => s.update_from_data(data),
            Self::Ellipse(s) => s.update_from_data(data),
            Self::Arrow(s) => s.update_from_data(data),
            Self::ArrowV2(s) => s.update_from_data(data),
            Self::Line(s) => s.update_from_data(data),
            Self::Text(s) => s.update_from_data(data, false),
            Self::TextV2(s) => s.update_from_data(data, true),
            Self::Sticky(s) => s.update_from_data(data),
            Self::StickyV2(s) => s.update_from_data(data),
            Self::Group(s) => s.update_from_data(data),
            Self::Poll(s) => s.update_from_data(data),
        }
    }
}

/// Build a new shape from a full (or as-full-as-the-recorder-sent) document.
/// `tldraw_v2` selects the schema generation for the types that have both.
pub fn parse_shape_from_data(data: &Value, tldraw_v2: bool) -> Result<Shape, ShapeDataError> {
    let ty = data
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or(ShapeDataError::MissingType)?;

    let mut shape = match ty {
        "draw" => Shape::Draw(DrawShape::default()),
        "highlight" => Shape::Highlighter(HighlighterShape::default()),
        "rectangle" => Shape::Rectangle(Labelled::default()),
        "ellipse" => Shape::Ellipse(EllipseShape::default()),
        "triangle" => Shape::Triangle(Labelled::default()),
        "arrow" => {
            if tldraw_v2 {
                Shape::ArrowV2(ArrowShapeV2::default())
            } else {
                Shape::Arrow(ArrowShape::default())
            }
        }
        "text" => {
            if tldraw_v2 {
                Shape::TextV2(TextShape::default())
            } else {
                Shape::Text(TextShape::default())
            }
        }
        "group" => Shape::Group(GroupShape::default()),
        "sticky" => Shape::Sticky(StickyShape::default()),
        "note" => Shape::StickyV2(StickyShapeV2::default()),
        "line" => Shape::Line(LineShape::default()),
        "frame" => {
            let mut frame = Labelled::default();
            // Unnamed frames still show a title.
            frame.label = Some("Frame".to_owned());
            Shape::Frame(frame)
        }
        "poll" => Shape::Poll(PollShape::default()),
        "geo" => {
            let token = data
                .get("props")
                .and_then(|p| p.get("geo"))
                .and_then(|v| v.as_str())
                .unwrap_or("");
            let geo =
                GeoKind::from_token(token).ok_or_else(|| ShapeDataError::UnknownGeo(token.to_owned()))?;
            match geo {
                GeoKind::Diamond => Shape::Diamond(Labelled::default()),
                GeoKind::Ellipse => Shape::GeoEllipse(Labelled::default()),
                GeoKind::Rectangle => Shape::GeoRectangle(Labelled::default()),
                GeoKind::Triangle => Shape::GeoTriangle(Labelled::default()),
                GeoKind::Trapezoid => Shape::Trapezoid(Labelled::default()),
                GeoKind::Rhombus => Shape::Rhombus(Labelled::default()),
                GeoKind::Hexagon => Shape::Hexagon(Labelled::default()),
                GeoKind::Cloud => Shape::Cloud(Labelled::default()),
                GeoKind::Star => Shape::Star(Labelled::default()),
                GeoKind::Oval => Shape::Oval(Labelled::default()),
                GeoKind::CheckBox => Shape::CheckBox(Labelled::default()),
                GeoKind::XBox => Shape::XBox(Labelled::default()),
                GeoKind::ArrowDown
                | GeoKind::ArrowLeft
                | GeoKind::ArrowRight
                | GeoKind::ArrowUp => Shape::ArrowGeo(Labelled::default()),
                GeoKind::None => return Err(ShapeDataError::UnknownGeo(token.to_owned())),
            }
        }
        other => return Err(ShapeDataError::UnknownType(other.to_owned())),
    };

    shape.update_from_data(data)?;
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn v1_draw_shape_parses_points_and_style() {
        let data = json!({
            "type": "draw",
            "childIndex": 2.5,
            "point": [100.0, 50.0],
            "style": {"color": "green", "size": "small", "dash": "draw"},
            "size": [40.0, 20.0],
            "points": [[0.0, 0.0], [10.0, 5.0, 0.7]],
            "isComplete": true,
        });
        let shape = parse_shape_from_data(&data, false).unwrap();
        let Shape::Draw(draw) = &shape else {
            panic!("expected draw shape");
        };
        assert_eq!(draw.base.child_index, 2.5);
        assert_eq!(draw.base.point, Position::new(100.0, 50.0));
        assert_eq!(draw.points, vec![(0.0, 0.0, 0.5), (10.0, 5.0, 0.7)]);
        assert!(draw.is_complete);
        assert_eq!(draw.base.style.color, ColorStyle::Green);
    }

    #[test]
    fn v2_draw_shape_parses_segments() {
        let data = json!({
            "type": "draw",
            "x": 12.0,
            "y": 20.0,
            "props": {
                "color": "light-blue",
                "size": "m",
                "segments": [
                    {"points": [{"x": 0.0, "y": 0.0, "z": 0.3}, {"x": 4.0, "y": 4.0}]}
                ],
                "isComplete": true,
            },
        });
        let shape = parse_shape_from_data(&data, true).unwrap();
        let Shape::Draw(draw) = &shape else {
            panic!("expected draw shape");
        };
        assert_eq!(draw.base.point, Position::new(12.0, 20.0));
        assert_eq!(draw.points, vec![(0.0, 0.0, 0.3), (4.0, 4.0, 0.5)]);
        assert_eq!(draw.base.style.size, SizeStyle::M);
    }

    #[test]
    fn update_with_full_data_is_identity() {
        let data = json!({
            "type": "rectangle",
            "childIndex": 1.0,
            "point": [5.0, 6.0],
            "parentId": "page:1",
            "style": {"color": "violet", "size": "large", "dash": "dashed", "isFilled": true},
            "size": [30.0, 40.0],
            "rotation": 0.4,
            "label": "hi",
            "labelPoint": [0.5, 0.5],
        });
        let mut shape = parse_shape_from_data(&data, false).unwrap();
        let before = shape.clone();
        shape.update_from_data(&data).unwrap();
        assert_eq!(shape, before);
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let mut shape = parse_shape_from_data(
            &json!({
                "type": "rectangle",
                "point": [5.0, 6.0],
                "style": {"color": "red"},
                "size": [30.0, 40.0],
            }),
            false,
        )
        .unwrap();
        shape.update_from_data(&json!({"point": [9.0, 9.0]})).unwrap();
        let Shape::Rectangle(rect) = &shape else {
            panic!();
        };
        assert_eq!(rect.base.point, Position::new(9.0, 9.0));
        assert_eq!(rect.size, Size::new(30.0, 40.0));
        assert_eq!(rect.base.style.color, ColorStyle::Red);
    }

    #[test]
    fn v1_arrow_bend_point_matches_reference_values() {
        let mut arrow = ArrowShape::default();
        arrow.handles.start = Position::new(0.0, 0.0);
        arrow.handles.end = Position::new(100.0, 0.0);
        arrow.bend = 0.5;
        assert_eq!(arrow.bend_point(), (50.0, -25.0));
        arrow.bend = -0.5;
        assert_eq!(arrow.bend_point(), (50.0, 25.0));
    }

    #[test]
    fn zero_bend_point_is_the_midpoint() {
        let mut arrow = ArrowShape::default();
        arrow.handles.start = Position::new(0.0, 0.0);
        arrow.handles.end = Position::new(100.0, 40.0);
        arrow.bend = 0.0;
        assert_eq!(arrow.bend_point(), (50.0, 20.0));

        let mut v2 = ArrowShapeV2::default();
        v2.handles.start = Position::new(0.0, 0.0);
        v2.handles.end = Position::new(100.0, 40.0);
        v2.bend = 0.0;
        assert_eq!(v2.bend_point(), Position::new(50.0, 20.0));
    }

    #[test]
    fn v2_arrow_reads_props() {
        let data = json!({
            "type": "arrow",
            "props": {
                "bend": 20.0,
                "start": {"x": 0.0, "y": 0.0},
                "end": {"x": 10.0, "y": 0.0},
                "arrowheadStart": "none",
                "arrowheadEnd": "arrow",
            },
        });
        let shape = parse_shape_from_data(&data, true).unwrap();
        let Shape::ArrowV2(arrow) = &shape else {
            panic!("expected v2 arrow");
        };
        assert_eq!(arrow.bend, 20.0);
        assert_eq!(arrow.decorations.start, Some(Decoration::None));
        assert_eq!(arrow.decorations.end, Some(Decoration::Arrow));
    }

    #[test]
    fn version_gate_selects_arrow_variant() {
        let data = json!({"type": "arrow"});
        assert!(matches!(
            parse_shape_from_data(&data, false).unwrap(),
            Shape::Arrow(_)
        ));
        assert!(matches!(
            parse_shape_from_data(&data, true).unwrap(),
            Shape::ArrowV2(_)
        ));
    }

    #[test]
    fn sticky_v2_grow_y_extends_and_top_aligns() {
        let data = json!({
            "type": "note",
            "props": {"text": "hello", "growY": 60.0},
        });
        let shape = parse_shape_from_data(&data, true).unwrap();
        let Shape::StickyV2(sticky) = &shape else {
            panic!();
        };
        assert_eq!(sticky.size, Size::new(200.0, 260.0));
        assert_eq!(sticky.vertical_align, AlignStyle::Start);
    }

    #[test]
    fn geo_discriminator_picks_the_outline() {
        let data = json!({
            "type": "geo",
            "props": {"geo": "hexagon", "w": 10.0, "h": 12.0},
        });
        let shape = parse_shape_from_data(&data, true).unwrap();
        assert!(matches!(shape, Shape::Hexagon(_)));
        assert_eq!(shape.size(), Some(Size::new(10.0, 12.0)));
    }

    #[test]
    fn frame_name_becomes_label() {
        let data = json!({
            "type": "frame",
            "props": {"w": 100.0, "h": 80.0, "name": "Frame 1"},
        });
        let shape = parse_shape_from_data(&data, true).unwrap();
        let Shape::Frame(frame) = &shape else {
            panic!();
        };
        assert_eq!(frame.label.as_deref(), Some("Frame 1"));
    }

    #[test]
    fn line_control_handle_has_generated_name() {
        let data = json!({
            "type": "line",
            "props": {
                "spline": "cubic",
                "handles": {
                    "start": {"x": 0.0, "y": 0.0},
                    "end": {"x": 10.0, "y": 10.0},
                    "handle:a1V": {"x": 3.0, "y": 8.0},
                },
            },
        });
        let shape = parse_shape_from_data(&data, true).unwrap();
        let Shape::Line(line) = &shape else {
            panic!();
        };
        assert_eq!(line.spline, SplineType::Cubic);
        assert_eq!(line.handles.control_point, Position::new(3.0, 8.0));
    }

    #[test]
    fn unknown_type_is_an_error() {
        assert!(matches!(
            parse_shape_from_data(&json!({"type": "video"}), true),
            Err(ShapeDataError::UnknownType(_))
        ));
        assert!(matches!(
            parse_shape_from_data(&json!({}), true),
            Err(ShapeDataError::MissingType)
        ));
    }

    #[test]
    fn poll_shape_parses_answers() {
        let data = json!({
            "type": "poll",
            "props": {
                "w": 300.0, "h": 200.0,
                "answers": [{"key": "A", "numVotes": 3}, {"key": "B", "numVotes": 1}],
                "numRespondents": 5,
                "numResponders": 4,
                "questionText": "Favourite?",
            },
        });
        let shape = parse_shape_from_data(&data, true).unwrap();
        let Shape::Poll(poll) = &shape else {
            panic!();
        };
        assert_eq!(poll.answers.len(), 2);
        assert_eq!(poll.answers[0].num_votes, 3);
        assert_eq!(poll.num_responders, 4);
    }
}
