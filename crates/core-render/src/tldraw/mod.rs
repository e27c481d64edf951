//! Tldraw whiteboard annotations layer.
//!
//! Shapes live in a per-(presentation, slide) store ordered by
//! `(child_index, id)`. Add events either create a shape from its JSON
//! document or merge the document over the existing shape; deletes remove
//! it. Rendering caches two levels of patterns: one per shape (valid until
//! the shape changes or the view moves) and one for the whole layer.
//!
//! Invariants:
//! - Store iteration is monotone non-decreasing in `child_index`.
//! - A cached shape pattern is valid iff the (presentation, slide,
//!   transform) triple and the shape itself are unchanged since it was
//!   rendered; a child update also invalidates its frame's pattern.
//! - Shapes whose parent is a frame paint inside the frame's clip, never at
//!   the top level.

pub mod draw_utils;
pub mod geo;
pub mod rng;
pub mod shape;

use std::collections::HashMap;

use cairo::{Context, Pattern};
use tracing::{debug, warn};

use core_events::{
    AddShapeEvent, DeleteShapeEvent, Event, EventKind, PresentationEvent, SlideEvent,
};
use core_shapes::{parse_shape_from_data, Shape};

use crate::transform::{apply_shapes_transform, Transform};
use crate::RenderError;

/// Shapes of one slide, ordered by `(child_index, id)`.
#[derive(Debug, Default)]
struct ShapeStore {
    entries: Vec<(String, Shape)>,
}

impl ShapeStore {
    fn sort(&mut self) {
        self.entries.sort_by(|a, b| {
            a.1.child_index()
                .total_cmp(&b.1.child_index())
                .then_with(|| a.0.cmp(&b.0))
        });
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Shape> {
        self.entries
            .iter_mut()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, shape)| shape)
    }

    fn insert(&mut self, id: String, shape: Shape) {
        if let Some(slot) = self.get_mut(&id) {
            *slot = shape;
        } else {
            self.entries.push((id, shape));
        }
        self.sort();
    }

    fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| entry_id != id);
        self.entries.len() != before
    }

    fn iter(&self) -> impl Iterator<Item = &(String, Shape)> {
        self.entries.iter()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

pub struct TldrawLayer {
    ctx: Context,
    tldraw_v2: bool,

    presentation: Option<String>,
    slide: Option<i64>,
    presentation_slide: HashMap<String, i64>,
    shapes: HashMap<String, HashMap<i64, ShapeStore>>,

    /// Cached per-shape patterns for the current (presentation, slide,
    /// transform).
    shape_patterns: HashMap<String, Pattern>,
    pattern: Option<Pattern>,
    shapes_changed: bool,
    transform: Transform,
}

impl TldrawLayer {
    pub fn new(ctx: Context, transform: Transform, tldraw_v2: bool) -> Self {
        Self {
            ctx,
            tldraw_v2,
            presentation: None,
            slide: None,
            presentation_slide: HashMap::new(),
            shapes: HashMap::new(),
            shape_patterns: HashMap::new(),
            pattern: None,
            shapes_changed: false,
            transform,
        }
    }

    /// Route an event to whatever sub-handler wants it; events the layer
    /// does not track are ignored.
    pub fn update(&mut self, event: &Event) {
        match &event.kind {
            EventKind::Presentation(e) => self.update_presentation(e),
            EventKind::Slide(e) => self.update_slide(e),
            EventKind::TldrawAddShape(e) => self.add_shape(e),
            EventKind::TldrawDeleteShape(e) => self.delete_shape(e),
            _ => {}
        }
    }

    fn update_presentation(&mut self, event: &PresentationEvent) {
        if self.presentation.as_deref() == Some(event.presentation.as_str()) {
            debug!(target: "render.tldraw", "presentation did not change");
            return;
        }
        self.presentation = Some(event.presentation.clone());
        self.slide = Some(
            self.presentation_slide
                .get(&event.presentation)
                .copied()
                .unwrap_or(0),
        );
        self.shape_patterns.clear();
        self.shapes_changed = true;
        debug!(target: "render.tldraw", presentation = %event.presentation, slide = ?self.slide, "presentation");
    }

    fn update_slide(&mut self, event: &SlideEvent) {
        let Some(presentation) = self.presentation.clone() else {
            debug!(target: "render.tldraw", "ignoring slide update, no current presentation");
            return;
        };
        if self.slide == Some(event.slide) {
            debug!(target: "render.tldraw", "slide did not change");
            return;
        }
        self.slide = Some(event.slide);
        self.presentation_slide.insert(presentation, event.slide);
        self.shape_patterns.clear();
        self.shapes_changed = true;
        debug!(target: "render.tldraw", slide = event.slide, "slide");
    }

    fn invalidate_shape_pattern(&mut self, id: &str, parent_id: &str) {
        self.shape_patterns.remove(id);
        // A frame's pattern bakes in its children.
        if !parent_id.is_empty() {
            self.shape_patterns.remove(parent_id);
        }
    }

    fn add_shape(&mut self, event: &AddShapeEvent) {
        if event.data.get("type").and_then(|t| t.as_str()) == Some("image") {
            debug!(target: "render.tldraw", id = %event.id, "ignoring image shape");
            return;
        }

        let store = self
            .shapes
            .entry(event.presentation.clone())
            .or_default()
            .entry(event.slide)
            .or_default();

        let parent_id;
        if let Some(existing) = store.get_mut(&event.id) {
            if let Err(error) = existing.update_from_data(&event.data) {
                // The previous version of the shape stays untouched.
                warn!(target: "render.tldraw", id = %event.id, %error, "dropping shape update");
                return;
            }
            parent_id = existing.parent_id().to_owned();
            store.sort();
        } else {
            let shape = match parse_shape_from_data(&event.data, self.tldraw_v2) {
                Ok(shape) => shape,
                Err(error) => {
                    warn!(target: "render.tldraw", id = %event.id, %error, "dropping shape add");
                    return;
                }
            };
            parent_id = shape.parent_id().to_owned();
            store.insert(event.id.clone(), shape);
        }

        self.invalidate_shape_pattern(&event.id, &parent_id);
        self.shapes_changed = true;
        debug!(
            target: "render.tldraw",
            id = %event.id,
            presentation = %event.presentation,
            slide = event.slide,
            "added shape"
        );
    }

    fn delete_shape(&mut self, event: &DeleteShapeEvent) {
        let Some(store) = self
            .shapes
            .get_mut(&event.presentation)
            .and_then(|slides| slides.get_mut(&event.slide))
        else {
            return;
        };
        let parent_id = store
            .get_mut(&event.id)
            .map(|s| s.parent_id().to_owned())
            .unwrap_or_default();
        if !store.remove(&event.id) {
            return;
        }
        self.invalidate_shape_pattern(&event.id, &parent_id);
        self.shapes_changed = true;
        debug!(target: "render.tldraw", id = %event.id, "deleted shape");
    }

    /// Rebuild the layer pattern if shapes changed or the view moved.
    pub fn finalize_frame(&mut self, transform: Transform) -> Result<bool, RenderError> {
        if !self.shapes_changed && self.transform == transform {
            return Ok(false);
        }
        if self.transform != transform {
            // Cached shape patterns bake in the old view.
            self.shape_patterns.clear();
        }
        self.transform = transform;

        let (Some(presentation), Some(slide)) = (self.presentation.clone(), self.slide) else {
            self.pattern = None;
            self.shapes_changed = false;
            return Ok(false);
        };
        let Some(store) = self
            .shapes
            .get(&presentation)
            .and_then(|slides| slides.get(&slide))
        else {
            self.pattern = None;
            self.shapes_changed = false;
            return Ok(false);
        };

        debug!(target: "render.tldraw", count = store.len(), "rendering shapes");

        // Index frame children so they render clipped inside their frames
        // instead of at the top level.
        let mut frame_children: HashMap<String, Vec<(String, Shape)>> = HashMap::new();
        for (id, shape) in store.iter() {
            if matches!(shape, Shape::Frame(_)) {
                frame_children.insert(id.clone(), Vec::new());
            }
        }
        for (id, shape) in store.iter() {
            let parent = shape.parent_id();
            if let Some(children) = frame_children.get_mut(parent) {
                children.push((id.clone(), shape.clone()));
            }
        }

        let ctx = self.ctx.clone();
        ctx.push_group();
        apply_shapes_transform(&ctx, &self.transform);

        for (id, shape) in store.iter() {
            if frame_children.contains_key(shape.parent_id()) {
                continue;
            }

            if let Some(cached) = self.shape_patterns.get(id) {
                ctx.save()?;
                ctx.set_source(cached)?;
                ctx.paint()?;
                ctx.restore()?;
                continue;
            }

            ctx.push_group();
            finalize_shape(&ctx, id, shape, &frame_children)?;
            let shape_pattern = ctx.pop_group()?;
            ctx.save()?;
            ctx.set_source(&shape_pattern)?;
            ctx.paint()?;
            ctx.restore()?;
            self.shape_patterns.insert(id.clone(), shape_pattern);
        }

        self.pattern = Some(ctx.pop_group()?);
        self.shapes_changed = false;
        Ok(true)
    }

    /// Composite the cached layer pattern onto the frame.
    pub fn render(&self) -> Result<(), RenderError> {
        if let Some(pattern) = &self.pattern {
            let ctx = &self.ctx;
            ctx.save()?;
            ctx.set_source(pattern)?;
            ctx.paint()?;
            ctx.restore()?;
        }
        Ok(())
    }

    #[cfg(test)]
    fn slot_ids(&self, presentation: &str, slide: i64) -> Vec<String> {
        self.shapes
            .get(presentation)
            .and_then(|s| s.get(&slide))
            .map(|store| store.iter().map(|(id, _)| id.clone()).collect())
            .unwrap_or_default()
    }
}

/// Render one shape at the current origin translated to its point. Frames
/// recurse into their children through this same entry point.
fn finalize_shape(
    ctx: &Context,
    id: &str,
    shape: &Shape,
    frame_children: &HashMap<String, Vec<(String, Shape)>>,
) -> Result<(), RenderError> {
    ctx.save()?;
    let point = shape.point();
    ctx.translate(point.x, point.y);

    match shape {
        Shape::Draw(s) => shape::draw::finalize_draw(ctx, id, s)?,
        Shape::Highlighter(s) => shape::highlighter::finalize_highlight(ctx, id, s)?,
        Shape::Rectangle(s) => shape::rectangle::finalize_rectangle(ctx, id, s)?,
        Shape::Ellipse(s) => shape::ellipse::finalize_ellipse(ctx, id, s)?,
        Shape::Triangle(s) => shape::triangle::finalize_triangle(ctx, id, s)?,
        Shape::Arrow(s) => shape::arrow::finalize_arrow(ctx, id, s)?,
        Shape::ArrowV2(s) => shape::arrow_v2::finalize_arrow_v2(ctx, id, s)?,
        Shape::Line(s) => shape::line::finalize_line(ctx, id, s)?,
        Shape::Text(s) => shape::text::finalize_text(ctx, id, s)?,
        Shape::TextV2(s) => shape::text_v2::finalize_v2_text(ctx, id, s)?,
        Shape::Sticky(s) => shape::sticky::finalize_sticky(ctx, id, s)?,
        Shape::StickyV2(s) => shape::sticky_v2::finalize_sticky_v2(ctx, id, s)?,
        Shape::Frame(s) => {
            let children = frame_children
                .get(id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let finalize_child = |ctx: &Context, child_id: &str, child: &Shape| {
                finalize_shape(ctx, child_id, child, frame_children)
            };
            shape::frame::finalize_frame(ctx, id, s, children, &finalize_child)?;
        }
        // Group members carry their own transforms; the group itself has
        // nothing to draw.
        Shape::Group(_) => {}
        Shape::Poll(s) => shape::poll::finalize_poll(ctx, id, s)?,
        Shape::GeoRectangle(s) => geo::rectangle::finalize_geo_rectangle(ctx, id, s)?,
        Shape::GeoEllipse(s) => geo::ellipse::finalize_geo_ellipse(ctx, id, s)?,
        Shape::GeoTriangle(s) => geo::triangle::finalize_geo_triangle(ctx, id, s)?,
        Shape::Diamond(s) => geo::diamond::finalize_diamond(ctx, id, s)?,
        Shape::Rhombus(s) => geo::rhombus::finalize_rhombus(ctx, id, s)?,
        Shape::Trapezoid(s) => geo::trapezoid::finalize_trapezoid(ctx, id, s)?,
        Shape::Hexagon(s) => geo::hexagon::finalize_hexagon(ctx, id, s)?,
        Shape::Cloud(s) => geo::cloud::finalize_cloud(ctx, id, s)?,
        Shape::Star(s) => geo::star::finalize_star(ctx, id, s)?,
        Shape::Oval(s) => geo::oval::finalize_oval(ctx, id, s)?,
        Shape::CheckBox(s) => geo::checkbox::finalize_checkbox(ctx, id, s)?,
        Shape::XBox(s) => geo::xbox::finalize_x_box(ctx, id, s)?,
        Shape::ArrowGeo(s) => geo::arrow::finalize_geo_arrow(ctx, id, s)?,
    }

    ctx.restore()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairo::{Format, ImageSurface};
    use core_geom::Size;
    use serde_json::json;

    fn layer() -> TldrawLayer {
        let surface = ImageSurface::create(Format::Rgb24, 64, 48).unwrap();
        let ctx = Context::new(&surface).unwrap();
        let transform = Transform::initial(Size::new(64.0, 48.0), true);
        TldrawLayer::new(ctx, transform, true)
    }

    fn add(layer: &mut TldrawLayer, id: &str, data: serde_json::Value) {
        layer.add_shape(&AddShapeEvent {
            id: id.into(),
            presentation: "pres".into(),
            slide: 1,
            user_id: "u1".into(),
            data,
        });
    }

    #[test]
    fn shapes_iterate_in_child_index_order() {
        let mut layer = layer();
        add(
            &mut layer,
            "shape:b",
            json!({"type": "geo", "childIndex": 3.0, "props": {"geo": "rectangle"}}),
        );
        add(
            &mut layer,
            "shape:a",
            json!({"type": "geo", "childIndex": 1.0, "props": {"geo": "rectangle"}}),
        );
        add(
            &mut layer,
            "shape:c",
            json!({"type": "geo", "childIndex": 2.0, "props": {"geo": "rectangle"}}),
        );
        assert_eq!(layer.slot_ids("pres", 1), ["shape:a", "shape:c", "shape:b"]);
    }

    #[test]
    fn equal_child_index_ties_break_by_id() {
        let mut layer = layer();
        add(
            &mut layer,
            "shape:z",
            json!({"type": "geo", "childIndex": 1.0, "props": {"geo": "rectangle"}}),
        );
        add(
            &mut layer,
            "shape:a",
            json!({"type": "geo", "childIndex": 1.0, "props": {"geo": "rectangle"}}),
        );
        assert_eq!(layer.slot_ids("pres", 1), ["shape:a", "shape:z"]);
    }

    #[test]
    fn update_merges_over_existing_shape() {
        let mut layer = layer();
        add(
            &mut layer,
            "shape:a",
            json!({"type": "note", "props": {"text": "hello", "color": "red"}}),
        );
        add(&mut layer, "shape:a", json!({"type": "note", "x": 40.0, "y": 50.0}));

        let ids = layer.slot_ids("pres", 1);
        assert_eq!(ids.len(), 1);
        let store = layer.shapes.get("pres").unwrap().get(&1).unwrap();
        let (_, shape) = store.iter().next().unwrap();
        let Shape::StickyV2(sticky) = shape else {
            panic!("expected sticky");
        };
        assert_eq!(sticky.text, "hello");
        assert_eq!(sticky.base.point.x, 40.0);
    }

    #[test]
    fn image_shapes_are_rejected() {
        let mut layer = layer();
        add(&mut layer, "shape:img", json!({"type": "image"}));
        assert!(layer.slot_ids("pres", 1).is_empty());
    }

    #[test]
    fn bad_update_leaves_prior_shape_intact() {
        let mut layer = layer();
        add(
            &mut layer,
            "shape:a",
            json!({"type": "note", "props": {"text": "hello"}}),
        );
        add(
            &mut layer,
            "shape:a",
            json!({"type": "note", "props": {"color": "not-a-color"}}),
        );
        let store = layer.shapes.get("pres").unwrap().get(&1).unwrap();
        let (_, shape) = store.iter().next().unwrap();
        let Shape::StickyV2(sticky) = shape else {
            panic!();
        };
        assert_eq!(sticky.text, "hello");
    }

    #[test]
    fn delete_removes_the_shape() {
        let mut layer = layer();
        add(
            &mut layer,
            "shape:a",
            json!({"type": "geo", "props": {"geo": "star"}}),
        );
        layer.delete_shape(&DeleteShapeEvent {
            id: "shape:a".into(),
            presentation: "pres".into(),
            slide: 1,
            user_id: "u1".into(),
        });
        assert!(layer.slot_ids("pres", 1).is_empty());
    }

    #[test]
    fn presentation_change_clears_the_pattern_cache() {
        let mut layer = layer();
        layer.shape_patterns.insert("stale".into(), {
            // Any pattern value works for the test.
            let surface = ImageSurface::create(Format::ARgb32, 1, 1).unwrap();
            let scratch = Context::new(&surface).unwrap();
            scratch.push_group();
            scratch.pop_group().unwrap()
        });
        layer.update_presentation(&PresentationEvent {
            presentation: "pres".into(),
            pod_id: "DEFAULT_PRESENTATION_POD".into(),
        });
        assert!(layer.shape_patterns.is_empty());
    }
}
