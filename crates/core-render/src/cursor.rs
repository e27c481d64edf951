//! Cursor layer: per-user cursors plus the legacy unattributed cursor.
//!
//! Cursors hide whenever the presentation or slide changes, and a
//! whiteboard-cursor event for a different presentation/slide is ignored.
//! Legacy shape events also nudge the drawing user's cursor to the last
//! sample point, except on `DRAW_END` which can arrive seconds late. The
//! presenter's cursor paints over everything; other cursors composite
//! underneath so they can never obscure the presenter.

use std::collections::HashMap;
use std::f64::consts::TAU;

use cairo::{Context, Operator, Pattern};
use tracing::debug;

use core_events::{
    CursorEvent, JoinEvent, LeftEvent, PresentationEvent, PresenterEvent, ShapeEvent, ShapeStatus,
    SlideEvent, WhiteboardCursorEvent,
};
use core_geom::{Color, Position, Size};

use crate::transform::{
    apply_legacy_cursor_transform, apply_shapes_transform, Transform,
};
use crate::RenderError;

const CURSOR_OPACITY: f64 = 0.6;
const CURSOR_PRESENTER: Color = Color::from_int(0xFF0000);
const CURSOR_OTHER: Color = Color::from_int(0x2A992A);
/// Fraction of the viewport diagonal; 6px on a 960x720 frame.
const CURSOR_RADIUS: f64 = 0.005;

#[derive(Debug, Clone, Default)]
struct Cursor {
    label: Option<String>,
    position: Option<Position>,
}

pub struct CursorLayer {
    ctx: Context,
    cursors: HashMap<String, Cursor>,
    legacy_cursor: Cursor,

    cursors_changed: bool,
    presenter: Option<String>,
    transform: Option<Transform>,
    tldraw_whiteboard: bool,

    presentation: Option<String>,
    presentation_slide: HashMap<String, i64>,
    slide: i64,

    pattern: Option<Pattern>,
    radius: f64,
}

impl CursorLayer {
    pub fn new(ctx: Context, size: Size, tldraw_whiteboard: bool) -> Self {
        Self {
            ctx,
            cursors: HashMap::new(),
            legacy_cursor: Cursor::default(),
            cursors_changed: false,
            presenter: None,
            transform: None,
            tldraw_whiteboard,
            presentation: None,
            presentation_slide: HashMap::new(),
            slide: 0,
            pattern: None,
            radius: CURSOR_RADIUS
                * (size.width * size.width + size.height * size.height).sqrt(),
        }
    }

    fn hide_all_cursors(&mut self) {
        for cursor in self.cursors.values_mut() {
            cursor.position = None;
        }
        self.cursors_changed = true;
        debug!(target: "render.cursor", "all cursors moved offscreen");
    }

    pub fn update_presentation(&mut self, event: &PresentationEvent) {
        if self.presentation.as_deref() == Some(event.presentation.as_str()) {
            debug!(target: "render.cursor", "presentation did not change");
            return;
        }
        self.presentation = Some(event.presentation.clone());
        self.slide = self
            .presentation_slide
            .get(&event.presentation)
            .copied()
            .unwrap_or(0);
        self.hide_all_cursors();
    }

    pub fn update_slide(&mut self, event: &SlideEvent) {
        if self.slide == event.slide {
            debug!(target: "render.cursor", "slide did not change");
            return;
        }
        self.slide = event.slide;
        if let Some(presentation) = &self.presentation {
            self.presentation_slide
                .insert(presentation.clone(), self.slide);
        }
        self.hide_all_cursors();
    }

    pub fn update_presenter(&mut self, event: &PresenterEvent) {
        if self.presenter.as_deref() == Some(event.user_id.as_str()) {
            debug!(target: "render.cursor", "presenter did not change");
            return;
        }
        self.presenter = Some(event.user_id.clone());
        self.cursors_changed = true;
        debug!(target: "render.cursor", presenter = %event.user_id, "presenter");
    }

    pub fn update_join(&mut self, event: &JoinEvent) {
        self.cursors.insert(
            event.user_id.clone(),
            Cursor {
                label: Some(event.user_name.clone()),
                position: None,
            },
        );
    }

    pub fn update_left(&mut self, event: &LeftEvent) {
        if let Some(cursor) = self.cursors.remove(&event.user_id) {
            if cursor.position.is_some() {
                debug!(target: "render.cursor", user_id = %event.user_id, "removing cursor");
                self.cursors_changed = true;
            }
        }
    }

    pub fn update_cursor(&mut self, event: &CursorEvent) {
        if self.legacy_cursor.position == event.cursor {
            debug!(target: "render.cursor", "legacy cursor did not move");
            return;
        }
        self.legacy_cursor.position = event.cursor;
        self.cursors_changed = true;
    }

    pub fn update_cursor_v2(&mut self, event: &WhiteboardCursorEvent) {
        // A cursor event for some other presentation or slide belongs to a
        // different pod's view.
        if event.presentation.is_some() || event.slide.is_some() {
            if event.presentation != self.presentation || event.slide != Some(self.slide) {
                debug!(target: "render.cursor", "cursor not on current presentation/slide");
                return;
            }
        }

        let Some(cursor) = self.cursors.get_mut(&event.user_id) else {
            debug!(target: "render.cursor", user_id = %event.user_id, "user not present");
            return;
        };

        if cursor.position == event.cursor {
            return;
        }
        cursor.position = event.cursor;
        self.cursors_changed = true;
    }

    /// Use legacy draw events to move the drawing user's cursor; it makes
    /// the recording track the pen.
    pub fn update_shape(&mut self, event: &ShapeEvent) {
        let Some(user_id) = &event.user_id else {
            return;
        };

        if event.presentation != self.presentation || event.slide != Some(self.slide) {
            return;
        }

        let Some(cursor) = self.cursors.get_mut(user_id) else {
            return;
        };
        if cursor.position.is_none() {
            return;
        }

        // DRAW_END events can arrive late and would look like a jump.
        if event.kind.is_drawn() && event.status != Some(ShapeStatus::DrawEnd) {
            if let Some(point) = event.points.last() {
                cursor.position = Some(*point);
                self.cursors_changed = true;
            }
        }
    }

    /// Rebuild the cursor pattern when cursors moved or the transform
    /// changed.
    pub fn finalize_frame(&mut self, transform: Transform) -> Result<bool, RenderError> {
        if !self.cursors_changed && self.transform == Some(transform) {
            return Ok(false);
        }
        self.transform = Some(transform);

        let ctx = &self.ctx;
        ctx.push_group();

        if let Some(position) = self.legacy_cursor.position {
            ctx.save()?;
            apply_legacy_cursor_transform(ctx, &transform)?;
            let (x1, y1, x2, y2) = ctx.clip_extents()?;

            let screen_pos = Position::new((x2 - x1) * position.x, (y2 - y1) * position.y);
            ctx.translate(screen_pos.x, screen_pos.y);
            ctx.arc(0.0, 0.0, self.radius, 0.0, TAU);
            ctx.set_source_rgba(
                CURSOR_PRESENTER.r,
                CURSOR_PRESENTER.g,
                CURSOR_PRESENTER.b,
                CURSOR_OPACITY,
            );
            ctx.fill()?;
            ctx.restore()?;
        }

        for (user_id, cursor) in &self.cursors {
            let Some(position) = cursor.position else {
                continue;
            };

            ctx.save()?;
            apply_shapes_transform(ctx, &transform);
            let pos = if self.tldraw_whiteboard {
                position
            } else {
                Position::new(
                    position.x * transform.shapes_size.width,
                    position.y * transform.shapes_size.height,
                )
            };
            debug!(target: "render.cursor", %user_id, label = ?cursor.label, position = %pos, "cursor");

            ctx.translate(pos.x, pos.y);
            ctx.arc(
                0.0,
                0.0,
                self.radius / transform.shapes_scale / transform.scale,
                0.0,
                TAU,
            );
            if self.presenter.as_deref() == Some(user_id.as_str()) {
                ctx.set_source_rgba(
                    CURSOR_PRESENTER.r,
                    CURSOR_PRESENTER.g,
                    CURSOR_PRESENTER.b,
                    CURSOR_OPACITY,
                );
                ctx.set_operator(Operator::Over);
            } else {
                ctx.set_source_rgba(
                    CURSOR_OTHER.r,
                    CURSOR_OTHER.g,
                    CURSOR_OTHER.b,
                    CURSOR_OPACITY,
                );
                // Never paint over the presenter's cursor.
                ctx.set_operator(Operator::DestOver);
            }
            ctx.fill()?;
            ctx.restore()?;
        }

        self.pattern = Some(ctx.pop_group()?);
        self.cursors_changed = false;
        Ok(true)
    }

    /// Composite the cached cursor pattern onto the frame.
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
    fn cursor_position(&self, user_id: &str) -> Option<Position> {
        self.cursors.get(user_id).and_then(|c| c.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairo::{Format, ImageSurface};
    use core_events::LegacyShapeKind;

    fn layer() -> CursorLayer {
        let surface = ImageSurface::create(Format::Rgb24, 96, 72).unwrap();
        let ctx = Context::new(&surface).unwrap();
        CursorLayer::new(ctx, Size::new(96.0, 72.0), false)
    }

    fn join(layer: &mut CursorLayer, user_id: &str) {
        layer.update_join(&JoinEvent {
            user_id: user_id.into(),
            user_name: format!("name of {user_id}"),
        });
    }

    fn move_cursor(layer: &mut CursorLayer, user_id: &str, x: f64, y: f64) {
        layer.update_cursor_v2(&WhiteboardCursorEvent {
            presentation: None,
            slide: None,
            cursor: Some(Position::new(x, y)),
            user_id: user_id.into(),
        });
    }

    #[test]
    fn slide_change_hides_all_cursors() {
        let mut layer = layer();
        join(&mut layer, "u1");
        move_cursor(&mut layer, "u1", 0.5, 0.5);
        assert!(layer.cursor_position("u1").is_some());

        layer.update_slide(&SlideEvent {
            slide: 3,
            pod_id: "DEFAULT_PRESENTATION_POD".into(),
        });
        assert!(layer.cursor_position("u1").is_none());
    }

    #[test]
    fn cursor_for_unknown_user_is_ignored() {
        let mut layer = layer();
        move_cursor(&mut layer, "ghost", 0.5, 0.5);
        assert!(layer.cursor_position("ghost").is_none());
    }

    #[test]
    fn foreign_presentation_cursor_is_ignored() {
        let mut layer = layer();
        layer.update_presentation(&PresentationEvent {
            presentation: "pres".into(),
            pod_id: "DEFAULT_PRESENTATION_POD".into(),
        });
        join(&mut layer, "u1");
        layer.update_cursor_v2(&WhiteboardCursorEvent {
            presentation: Some("other".into()),
            slide: Some(0),
            cursor: Some(Position::new(0.5, 0.5)),
            user_id: "u1".into(),
        });
        assert!(layer.cursor_position("u1").is_none());
    }

    #[test]
    fn draw_events_nudge_the_cursor_but_not_on_draw_end() {
        let mut layer = layer();
        layer.update_presentation(&PresentationEvent {
            presentation: "pres".into(),
            pod_id: "DEFAULT_PRESENTATION_POD".into(),
        });
        join(&mut layer, "u1");
        move_cursor(&mut layer, "u1", 0.1, 0.1);

        let mut shape = ShapeEvent::new(LegacyShapeKind::Pencil);
        shape.user_id = Some("u1".into());
        shape.presentation = Some("pres".into());
        shape.slide = Some(0);
        shape.status = Some(ShapeStatus::DrawUpdate);
        shape.points = vec![Position::new(0.2, 0.2), Position::new(0.3, 0.4)];
        layer.update_shape(&shape);
        assert_eq!(layer.cursor_position("u1"), Some(Position::new(0.3, 0.4)));

        shape.status = Some(ShapeStatus::DrawEnd);
        shape.points = vec![Position::new(0.9, 0.9)];
        layer.update_shape(&shape);
        assert_eq!(layer.cursor_position("u1"), Some(Position::new(0.3, 0.4)));
    }

    #[test]
    fn leaving_removes_the_cursor() {
        let mut layer = layer();
        join(&mut layer, "u1");
        move_cursor(&mut layer, "u1", 0.5, 0.5);
        layer.update_left(&LeftEvent {
            user_id: "u1".into(),
        });
        assert!(layer.cursor_position("u1").is_none());
    }
}
