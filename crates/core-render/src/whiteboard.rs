//! Legacy (pre-tldraw) whiteboard annotations layer.
//!
//! Shapes live in an insertion-ordered list per (presentation, slide);
//! updates replace in place so paint order is stable. The matching rules
//! reproduce the recorder's quirks: updates match by shape id when present,
//! otherwise the newest shape with the same type and first point is assumed
//! to be the one being updated (old recordings have no ids), and pencil
//! `DRAW_UPDATE` events carry only the new points, which are appended to the
//! existing list.

use std::collections::{HashMap, VecDeque};

use cairo::{Context, LineCap, LineJoin, Pattern};
use pango::prelude::*;
use tracing::debug;

use core_events::{
    ClearEvent, LegacyShapeKind, PencilCommand, PresentationEvent, ShapeEvent, ShapeStatus,
    SlideEvent, UndoEvent,
};
use core_geom::arcs::BEZIER_CIRCLE_MAGIC;
use core_geom::{Color, Position};

use crate::transform::{apply_shapes_transform, Transform};
use crate::RenderError;

const FONT_FAMILY: &str = "Arial";

const POLL_BAR_COLOR: Color = Color::from_int(0x333333);
const POLL_LINE_WIDTH: f64 = 2.0;
const POLL_FONT_SIZE: f64 = 22.0;
const POLL_BG: Color = Color::from_int(0xFFFFFF);
const POLL_FG: Color = Color::from_int(0x000000);
const POLL_VPADDING: f64 = 20.0;
const POLL_HPADDING: f64 = 10.0;

pub struct ShapesLayer {
    ctx: Context,

    presentation: Option<String>,
    presentation_slide: HashMap<String, i64>,
    slide: i64,
    shapes: HashMap<String, HashMap<i64, VecDeque<ShapeEvent>>>,

    transform: Transform,
    pattern: Option<Pattern>,
    shapes_changed: bool,
}

impl ShapesLayer {
    pub fn new(ctx: Context, transform: Transform) -> Self {
        Self {
            ctx,
            presentation: None,
            presentation_slide: HashMap::new(),
            slide: 0,
            shapes: HashMap::new(),
            transform,
            pattern: None,
            shapes_changed: false,
        }
    }

    pub fn update_presentation(&mut self, event: &PresentationEvent) {
        if self.presentation.as_deref() == Some(event.presentation.as_str()) {
            debug!(target: "render.shapes", "presentation did not change");
            return;
        }
        self.presentation = Some(event.presentation.clone());
        self.shapes_changed = true;
        self.slide = self
            .presentation_slide
            .get(&event.presentation)
            .copied()
            .unwrap_or(0);
        debug!(target: "render.shapes", presentation = %event.presentation, slide = self.slide, "presentation");
    }

    pub fn update_slide(&mut self, event: &SlideEvent) {
        if self.slide == event.slide {
            debug!(target: "render.shapes", "slide did not change");
            return;
        }
        self.slide = event.slide;
        if let Some(presentation) = &self.presentation {
            self.presentation_slide
                .insert(presentation.clone(), self.slide);
        }
        self.shapes_changed = true;
        debug!(target: "render.shapes", slide = self.slide, "slide");
    }

    /// The slot an event targets, falling back to the layer's current
    /// presentation and slide when the event does not name them.
    fn event_slot(&self, presentation: &Option<String>, slide: Option<i64>) -> Option<(String, i64)> {
        let presentation = presentation
            .clone()
            .or_else(|| self.presentation.clone())?;
        let slide = slide.unwrap_or(self.slide);
        Some((presentation, slide))
    }

    pub fn update_shape(&mut self, event: &ShapeEvent) {
        // A text DRAW_END without page info arrives after the page context
        // is gone; applying it to the current page would misplace it.
        if event.slide.is_none()
            && event.kind == LegacyShapeKind::Text
            && event.status == Some(ShapeStatus::DrawEnd)
        {
            debug!(target: "render.shapes", shape_id = ?event.shape_id, "ignoring text publish without page info");
            return;
        }

        let Some((presentation, slide)) = self.event_slot(&event.presentation, event.slide) else {
            // Nothing to draw the shape on.
            return;
        };

        let shapes = self
            .shapes
            .entry(presentation)
            .or_default()
            .entry(slide)
            .or_default();

        let mut prev_index = None;
        if let Some(shape_id) = &event.shape_id {
            prev_index = shapes
                .iter()
                .position(|s| s.shape_id.as_deref() == Some(shape_id.as_str()));
            if let Some(i) = prev_index {
                debug!(target: "render.shapes", %shape_id, index = i, "replacing shape with same id");
            }
        } else if let Some(prev) = shapes.back() {
            // Old recordings have no shape ids; the newest shape with the
            // same type and starting point is the one being updated.
            if prev.kind == event.kind
                && !prev.points.is_empty()
                && prev.points.first() == event.points.first()
            {
                prev_index = Some(shapes.len() - 1);
                debug!(target: "render.shapes", "replacing shape with same initial point");
            }
        }

        let mut event = event.clone();
        if let Some(i) = prev_index {
            // Pencil DRAW_UPDATE is an incremental delta: prepend the points
            // already collected.
            if event.kind == LegacyShapeKind::Pencil
                && event.status == Some(ShapeStatus::DrawUpdate)
            {
                let mut points = shapes[i].points.clone();
                points.extend(event.points);
                event.points = points;
            }
            shapes[i] = event;
        } else {
            shapes.push_back(event);
        }
        self.shapes_changed = true;
    }

    pub fn update_undo(&mut self, event: &UndoEvent) {
        let Some((presentation, slide)) = self.event_slot(&event.presentation, event.slide) else {
            return;
        };
        let shapes = self
            .shapes
            .entry(presentation)
            .or_default()
            .entry(slide)
            .or_default();

        if let Some(shape_id) = &event.shape_id {
            shapes.retain(|s| s.shape_id.as_deref() != Some(shape_id.as_str()));
            self.shapes_changed = true;
            debug!(target: "render.shapes", %shape_id, "undo removed id");
        } else if let Some(shape) = shapes.pop_back() {
            // Undo without an id removes the most recently added shape.
            self.shapes_changed = true;
            debug!(target: "render.shapes", shape_id = ?shape.shape_id, "undo removed last shape");
        }
    }

    pub fn update_clear(&mut self, event: &ClearEvent) {
        let Some((presentation, slide)) = self.event_slot(&event.presentation, event.slide) else {
            return;
        };
        let shapes = self
            .shapes
            .entry(presentation)
            .or_default()
            .entry(slide)
            .or_default();

        // Recordings without the full_clear attribute always clear fully.
        if event.full_clear.unwrap_or(true) {
            shapes.clear();
            self.shapes_changed = true;
            debug!(target: "render.shapes", "cleared all shapes");
        } else {
            shapes.retain(|s| s.user_id != event.user_id);
            self.shapes_changed = true;
            debug!(target: "render.shapes", user_id = ?event.user_id, "cleared user shapes");
        }
    }

    fn shape_thickness(&self, shape: &ShapeEvent) -> f64 {
        if let Some(ratio) = shape.thickness_ratio {
            ratio * self.transform.shapes_size.width
        } else {
            shape.thickness.unwrap_or(0.0)
        }
    }

    fn draw_pencil(&self, shape: &ShapeEvent) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        ctx.set_source_rgb(shape.color.r, shape.color.g, shape.color.b);
        ctx.set_line_width(self.shape_thickness(shape));
        ctx.set_line_cap(LineCap::Round);
        ctx.set_line_join(LineJoin::Round);

        let size = self.transform.shapes_size;
        let at = |p: &Position| (p.x * size.width, p.y * size.height);

        match (&shape.commands, shape.points.len() > 1) {
            (Some(commands), true) => {
                let mut points = shape.points.iter();
                let mut prev_point = shape.points[0];
                'commands: for command in commands {
                    let point = match command {
                        PencilCommand::MoveTo => {
                            let Some(point) = points.next() else {
                                break 'commands;
                            };
                            let (x, y) = at(point);
                            ctx.move_to(x, y);
                            *point
                        }
                        PencilCommand::LineTo => {
                            let Some(point) = points.next() else {
                                break 'commands;
                            };
                            let (x, y) = at(point);
                            ctx.line_to(x, y);
                            *point
                        }
                        PencilCommand::QCurveTo => {
                            let (Some(qc), Some(point)) = (points.next(), points.next()) else {
                                break 'commands;
                            };
                            // Cairo only has cubic curves.
                            let cc1 = Position::new(
                                prev_point.x + (qc.x - prev_point.x) * 2.0 / 3.0,
                                prev_point.y + (qc.y - prev_point.y) * 2.0 / 3.0,
                            );
                            let cc2 = Position::new(
                                point.x + (qc.x - point.x) * 2.0 / 3.0,
                                point.y + (qc.y - point.y) * 2.0 / 3.0,
                            );
                            let (c1x, c1y) = at(&cc1);
                            let (c2x, c2y) = at(&cc2);
                            let (x, y) = at(point);
                            ctx.curve_to(c1x, c1y, c2x, c2y, x, y);
                            *point
                        }
                        PencilCommand::CCurveTo => {
                            let (Some(c1), Some(c2), Some(point)) =
                                (points.next(), points.next(), points.next())
                            else {
                                break 'commands;
                            };
                            let (c1x, c1y) = at(c1);
                            let (c2x, c2y) = at(c2);
                            let (x, y) = at(point);
                            ctx.curve_to(c1x, c1y, c2x, c2y, x, y);
                            *point
                        }
                    };
                    prev_point = point;
                }
                ctx.stroke()?;
            }
            _ => {
                let Some(first) = shape.points.first() else {
                    return Ok(());
                };
                let (x, y) = at(first);
                ctx.move_to(x, y);
                for point in &shape.points {
                    let (x, y) = at(point);
                    ctx.line_to(x, y);
                }
                ctx.stroke()?;
            }
        }
        Ok(())
    }

    fn draw_rectangle(&self, shape: &ShapeEvent) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        ctx.set_source_rgb(shape.color.r, shape.color.g, shape.color.b);
        ctx.set_line_width(self.shape_thickness(shape));
        ctx.set_line_join(if shape.rounded {
            LineJoin::Round
        } else {
            LineJoin::Miter
        });

        let (Some(a), Some(b)) = (shape.points.first(), shape.points.get(1)) else {
            return Ok(());
        };
        let size = self.transform.shapes_size;

        let (x1, y1) = (a.x * size.width, a.y * size.height);
        let (x2, mut y2) = (b.x * size.width, b.y * size.height);
        let width = (x2 - x1).abs();

        // Convert to a square, keeping aligned with the start point. The
        // y direction is chosen from the x direction, reproducing the
        // original client's behaviour.
        if shape.square {
            if x2 > x1 {
                y2 = y1 + width;
            } else {
                y2 = y1 - width;
            }
        }

        // A plain path; cairo's rectangle misbehaves when drawn backwards.
        ctx.move_to(x1, y1);
        ctx.line_to(x2, y1);
        ctx.line_to(x2, y2);
        ctx.line_to(x1, y2);
        ctx.close_path();
        ctx.stroke()?;
        Ok(())
    }

    fn draw_ellipse(&self, shape: &ShapeEvent) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        ctx.set_source_rgb(shape.color.r, shape.color.g, shape.color.b);
        ctx.set_line_width(self.shape_thickness(shape));

        let (Some(a), Some(b)) = (shape.points.first(), shape.points.get(1)) else {
            return Ok(());
        };
        let size = self.transform.shapes_size;

        let (x1, y1) = (a.x * size.width, a.y * size.height);
        let (x2, mut y2) = (b.x * size.width, b.y * size.height);

        let width_r = (x2 - x1).abs() / 2.0;
        let mut height_r = (y2 - y1).abs() / 2.0;

        // Convert to a circle, keeping aligned with the start point; same
        // bug-compatible y replacement as the square flag.
        if shape.circle {
            height_r = width_r;
            if x2 > x1 {
                y2 = y1 + width_r + width_r;
            } else {
                y2 = y1 - width_r - width_r;
            }
        }

        // A four-cubic approximation; cairo's arc does not deal well with
        // degenerate (zero-height or zero-width) ellipses.
        let k = BEZIER_CIRCLE_MAGIC;
        ctx.translate((x1 + x2) / 2.0, (y1 + y2) / 2.0);
        ctx.move_to(-width_r, 0.0);
        ctx.curve_to(-width_r, -height_r * k, -width_r * k, -height_r, 0.0, -height_r);
        ctx.curve_to(width_r * k, -height_r, width_r, -height_r * k, width_r, 0.0);
        ctx.curve_to(width_r, height_r * k, width_r * k, height_r, 0.0, height_r);
        ctx.curve_to(-width_r * k, height_r, -width_r, height_r * k, -width_r, 0.0);
        ctx.close_path();
        ctx.stroke()?;
        Ok(())
    }

    fn draw_triangle(&self, shape: &ShapeEvent) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        ctx.set_source_rgb(shape.color.r, shape.color.g, shape.color.b);
        ctx.set_line_width(self.shape_thickness(shape));
        if shape.rounded {
            ctx.set_line_join(LineJoin::Round);
        } else {
            ctx.set_line_join(LineJoin::Miter);
            ctx.set_miter_limit(8.0);
        }

        let (Some(a), Some(b)) = (shape.points.first(), shape.points.get(1)) else {
            return Ok(());
        };
        let size = self.transform.shapes_size;

        let (x1, y1) = (a.x * size.width, a.y * size.height);
        let (x2, y2) = (b.x * size.width, b.y * size.height);

        ctx.move_to(x1, y2);
        ctx.line_to((x1 + x2) / 2.0, y1);
        ctx.line_to(x2, y2);
        ctx.close_path();
        ctx.stroke()?;
        Ok(())
    }

    fn draw_line(&self, shape: &ShapeEvent) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        ctx.set_source_rgb(shape.color.r, shape.color.g, shape.color.b);
        ctx.set_line_width(self.shape_thickness(shape));
        ctx.set_line_cap(if shape.rounded {
            LineCap::Round
        } else {
            LineCap::Butt
        });

        let (Some(a), Some(b)) = (shape.points.first(), shape.points.get(1)) else {
            return Ok(());
        };
        let size = self.transform.shapes_size;

        ctx.move_to(a.x * size.width, a.y * size.height);
        ctx.line_to(b.x * size.width, b.y * size.height);
        ctx.stroke()?;
        Ok(())
    }

    fn draw_text(&self, shape: &ShapeEvent) -> Result<(), RenderError> {
        let Some(origin) = shape.points.first() else {
            return Ok(());
        };
        let size = self.transform.shapes_size;
        let rect_width = shape.width * size.width;
        let font_size = shape.calced_font_size * size.height;

        let ctx = &self.ctx;
        ctx.set_source_rgb(shape.font_color.r, shape.font_color.g, shape.font_color.b);
        ctx.translate(origin.x * size.width, origin.y * size.height);

        let mut font = pango::FontDescription::new();
        font.set_family(FONT_FAMILY);
        font.set_absolute_size(font_size * pango::SCALE as f64);

        let pctx = pangocairo::functions::create_context(ctx);
        let mut fo = cairo::FontOptions::new()?;
        fo.set_antialias(cairo::Antialias::Gray);
        fo.set_hint_metrics(cairo::HintMetrics::On);
        fo.set_hint_style(cairo::HintStyle::None);
        pangocairo::functions::context_set_font_options(&pctx, Some(&fo));

        let layout = pango::Layout::new(&pctx);
        layout.set_font_description(Some(&font));
        layout.set_width((rect_width * pango::SCALE as f64) as i32);
        // The recorded font size is approximate, so let the text overflow
        // vertically rather than clipping it.
        layout.set_wrap(pango::WrapMode::WordChar);
        layout.set_text(&shape.text);

        pangocairo::functions::show_layout(ctx, &layout);
        Ok(())
    }

    fn draw_poll_result(&self, shape: &ShapeEvent) -> Result<(), RenderError> {
        if shape.result.is_empty() {
            return Ok(());
        }

        let ctx = &self.ctx;
        let (Some(a), Some(b)) = (shape.points.first(), shape.points.get(1)) else {
            return Ok(());
        };
        let size = self.transform.shapes_size;
        let (x, y) = (a.x * size.width, a.y * size.height);
        let (width, height) = (b.x * size.width, b.y * size.height);

        ctx.set_line_join(LineJoin::Miter);
        ctx.set_line_cap(LineCap::Square);

        // Background and outline.
        let half_lw = POLL_LINE_WIDTH / 2.0;
        ctx.set_line_width(POLL_LINE_WIDTH);
        ctx.move_to(x + half_lw, y + half_lw);
        ctx.line_to(x + width - half_lw, y + half_lw);
        ctx.line_to(x + width - half_lw, y + height - half_lw);
        ctx.line_to(x + half_lw, y + height - half_lw);
        ctx.close_path();
        ctx.set_source_rgb(POLL_BG.r, POLL_BG.g, POLL_BG.b);
        ctx.fill_preserve()?;
        ctx.set_source_rgb(POLL_FG.r, POLL_FG.g, POLL_FG.b);
        ctx.stroke()?;

        let mut font = pango::FontDescription::new();
        font.set_family(FONT_FAMILY);
        font.set_absolute_size(POLL_FONT_SIZE * pango::SCALE as f64);

        let pctx = pangocairo::functions::create_context(ctx);
        let layout = pango::Layout::new(&pctx);
        layout.set_font_description(Some(&font));

        // Measure label and percentage columns.
        let mut max_label_width = 0.0_f64;
        let mut max_percent_width = 0.0_f64;
        let mut percents = Vec::with_capacity(shape.result.len());
        for answer in &shape.result {
            layout.set_text(&answer.key);
            let (label_width, _) = layout.pixel_size();
            max_label_width = max_label_width.max(label_width as f64);
            let percent = if shape.num_responders > 0 {
                format!(
                    "{}%",
                    (answer.num_votes as f64 / shape.num_responders as f64 * 100.0) as i64
                )
            } else {
                "0%".to_owned()
            };
            layout.set_text(&percent);
            let (percent_width, _) = layout.pixel_size();
            max_percent_width = max_percent_width.max(percent_width as f64);
            percents.push(percent);
        }

        let max_label_width = max_label_width.min(width * 0.3);
        let max_percent_width = max_percent_width.min(width * 0.3);

        let bar_height = (height - POLL_VPADDING) / shape.result.len() as f64 - POLL_VPADDING;
        let bar_width = width - 4.0 * POLL_HPADDING - max_label_width - max_percent_width;
        let bar_x = x + 2.0 * POLL_HPADDING + max_label_width;

        for (i, answer) in shape.result.iter().enumerate() {
            let bar_y = y + (bar_height + POLL_VPADDING) * i as f64 + POLL_VPADDING;
            let result_ratio = if shape.num_responders > 0 {
                answer.num_votes as f64 / shape.num_responders as f64
            } else {
                0.0
            };
            let bar_x2 = bar_x + bar_width * result_ratio;

            // The bar.
            ctx.set_line_width(POLL_LINE_WIDTH);
            ctx.move_to(bar_x + half_lw, bar_y + half_lw);
            ctx.line_to((bar_x + half_lw).max(bar_x2 - half_lw), bar_y + half_lw);
            ctx.line_to(
                (bar_x + half_lw).max(bar_x2 - half_lw),
                bar_y + bar_height - half_lw,
            );
            ctx.line_to(bar_x + half_lw, bar_y + bar_height - half_lw);
            ctx.close_path();
            ctx.set_source_rgb(POLL_BAR_COLOR.r, POLL_BAR_COLOR.g, POLL_BAR_COLOR.b);
            ctx.fill_preserve()?;
            ctx.stroke()?;

            // Label on the left, percentage on the right.
            layout.set_ellipsize(pango::EllipsizeMode::End);
            ctx.set_source_rgb(POLL_FG.r, POLL_FG.g, POLL_FG.b);
            layout.set_width((max_label_width * pango::SCALE as f64) as i32);
            layout.set_text(&answer.key);
            let (label_width, label_height) = layout.pixel_size();
            ctx.move_to(
                bar_x - POLL_HPADDING - label_width as f64,
                bar_y + (bar_height - label_height as f64) / 2.0,
            );
            pangocairo::functions::show_layout(ctx, &layout);

            layout.set_width((max_percent_width * pango::SCALE as f64) as i32);
            layout.set_text(&percents[i]);
            let (percent_width, percent_height) = layout.pixel_size();
            ctx.move_to(
                x + width - POLL_HPADDING - percent_width as f64,
                bar_y + (bar_height - percent_height as f64) / 2.0,
            );
            pangocairo::functions::show_layout(ctx, &layout);

            // Vote count: inside the bar if it fits, after it otherwise.
            layout.set_ellipsize(pango::EllipsizeMode::None);
            layout.set_width(-1);
            layout.set_text(&answer.num_votes.to_string());
            let (votes_width, votes_height) = layout.pixel_size();
            if (votes_width as f64) < bar_x2 - bar_x - 2.0 * POLL_HPADDING {
                ctx.move_to(
                    bar_x + (bar_x2 - bar_x - votes_width as f64) / 2.0,
                    bar_y + (bar_height - votes_height as f64) / 2.0,
                );
                ctx.set_source_rgb(POLL_BG.r, POLL_BG.g, POLL_BG.b);
                pangocairo::functions::show_layout(ctx, &layout);
            } else {
                ctx.move_to(
                    bar_x2 + POLL_HPADDING,
                    bar_y + (bar_height - votes_height as f64) / 2.0,
                );
                ctx.set_source_rgb(POLL_FG.r, POLL_FG.g, POLL_FG.b);
                pangocairo::functions::show_layout(ctx, &layout);
            }
        }
        Ok(())
    }

    /// Rebuild the annotations pattern when shapes changed or the transform
    /// moved. Returns whether the pattern changed.
    pub fn finalize_frame(&mut self, transform: Transform) -> Result<bool, RenderError> {
        let result = self.finalize_inner(transform);
        self.shapes_changed = false;
        result
    }

    fn finalize_inner(&mut self, transform: Transform) -> Result<bool, RenderError> {
        if !self.shapes_changed && self.transform == transform {
            return Ok(false);
        }
        self.transform = transform;

        let shapes = self.presentation.as_ref().and_then(|presentation| {
            self.shapes
                .get(presentation)
                .and_then(|slides| slides.get(&self.slide))
        });
        let Some(shapes) = shapes else {
            if self.pattern.is_some() {
                debug!(target: "render.shapes", "no shapes to render");
                self.pattern = None;
                return Ok(true);
            }
            return Ok(false);
        };
        let shapes = shapes.clone();

        debug!(target: "render.shapes", count = shapes.len(), "rendering shapes");

        let ctx = self.ctx.clone();
        ctx.push_group();
        apply_shapes_transform(&ctx, &self.transform);

        for shape in &shapes {
            ctx.save()?;
            match shape.kind {
                LegacyShapeKind::Pencil => self.draw_pencil(shape)?,
                LegacyShapeKind::Rectangle => self.draw_rectangle(shape)?,
                LegacyShapeKind::Ellipse => self.draw_ellipse(shape)?,
                LegacyShapeKind::Triangle => self.draw_triangle(shape)?,
                LegacyShapeKind::Line => self.draw_line(shape)?,
                LegacyShapeKind::Text => self.draw_text(shape)?,
                LegacyShapeKind::PollResult => self.draw_poll_result(shape)?,
            }
            ctx.restore()?;
        }

        self.pattern = Some(ctx.pop_group()?);
        Ok(true)
    }

    /// Composite the cached annotations pattern onto the frame.
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
    fn slot_points(&self, presentation: &str, slide: i64) -> Vec<Vec<Position>> {
        self.shapes
            .get(presentation)
            .and_then(|s| s.get(&slide))
            .map(|d| d.iter().map(|s| s.points.clone()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairo::{Format, ImageSurface};
    use core_geom::Size;

    fn layer() -> ShapesLayer {
        let surface = ImageSurface::create(Format::Rgb24, 64, 48).unwrap();
        let ctx = Context::new(&surface).unwrap();
        let transform = Transform::initial(Size::new(64.0, 48.0), false);
        let mut layer = ShapesLayer::new(ctx, transform);
        layer.update_presentation(&PresentationEvent {
            presentation: "pres".into(),
            pod_id: "DEFAULT_PRESENTATION_POD".into(),
        });
        layer
    }

    fn pencil(id: &str, status: ShapeStatus, points: &[(f64, f64)]) -> ShapeEvent {
        let mut shape = ShapeEvent::new(LegacyShapeKind::Pencil);
        shape.shape_id = Some(id.into());
        shape.status = Some(status);
        shape.presentation = Some("pres".into());
        shape.slide = Some(0);
        shape.user_id = Some("user".into());
        shape.points = points.iter().map(|&(x, y)| Position::new(x, y)).collect();
        shape.thickness = Some(1.0);
        shape
    }

    #[test]
    fn pencil_updates_concatenate_and_end_replaces() {
        let mut layer = layer();
        layer.update_shape(&pencil(
            "s1",
            ShapeStatus::DrawStart,
            &[(10.0, 10.0), (20.0, 20.0)],
        ));
        layer.update_shape(&pencil("s1", ShapeStatus::DrawUpdate, &[(30.0, 30.0)]));
        layer.update_shape(&pencil(
            "s1",
            ShapeStatus::DrawEnd,
            &[(30.0, 30.0), (40.0, 40.0)],
        ));

        let slots = layer.slot_points("pres", 0);
        assert_eq!(slots.len(), 1);
        let expected: Vec<Position> = [
            (10.0, 10.0),
            (20.0, 20.0),
            (30.0, 30.0),
            (30.0, 30.0),
            (40.0, 40.0),
        ]
        .iter()
        .map(|&(x, y)| Position::new(x, y))
        .collect();
        assert_eq!(slots[0], expected);
    }

    #[test]
    fn user_clear_then_full_clear() {
        let mut layer = layer();
        let mut a1 = pencil("a1", ShapeStatus::DrawEnd, &[(1.0, 1.0)]);
        a1.user_id = Some("userA".into());
        let mut a2 = pencil("a2", ShapeStatus::DrawEnd, &[(2.0, 2.0)]);
        a2.user_id = Some("userA".into());
        let mut b1 = pencil("b1", ShapeStatus::DrawEnd, &[(3.0, 3.0)]);
        b1.user_id = Some("userB".into());
        layer.update_shape(&a1);
        layer.update_shape(&a2);
        layer.update_shape(&b1);

        layer.update_clear(&ClearEvent {
            presentation: Some("pres".into()),
            slide: Some(0),
            user_id: Some("userA".into()),
            full_clear: Some(false),
        });
        assert_eq!(layer.slot_points("pres", 0).len(), 1);

        layer.update_clear(&ClearEvent {
            presentation: Some("pres".into()),
            slide: Some(0),
            user_id: None,
            full_clear: Some(true),
        });
        assert!(layer.slot_points("pres", 0).is_empty());
    }

    #[test]
    fn undo_by_id_and_undo_latest() {
        let mut layer = layer();
        layer.update_shape(&pencil("a", ShapeStatus::DrawEnd, &[(1.0, 1.0)]));
        layer.update_shape(&pencil("b", ShapeStatus::DrawEnd, &[(2.0, 2.0)]));

        layer.update_undo(&UndoEvent {
            presentation: Some("pres".into()),
            slide: Some(0),
            user_id: None,
            shape_id: Some("a".into()),
        });
        assert_eq!(layer.slot_points("pres", 0).len(), 1);

        layer.update_undo(&UndoEvent {
            presentation: Some("pres".into()),
            slide: Some(0),
            user_id: None,
            shape_id: None,
        });
        assert!(layer.slot_points("pres", 0).is_empty());
    }

    #[test]
    fn text_publish_without_page_is_dropped() {
        let mut layer = layer();
        let mut text = ShapeEvent::new(LegacyShapeKind::Text);
        text.shape_id = Some("t1".into());
        text.status = Some(ShapeStatus::DrawEnd);
        text.presentation = Some("pres".into());
        text.slide = None;
        text.points = vec![Position::new(0.1, 0.1)];
        layer.update_shape(&text);
        assert!(layer.slot_points("pres", 0).is_empty());
    }

    #[test]
    fn idless_update_matches_newest_shape_by_first_point() {
        let mut layer = layer();
        let mut first = pencil("x", ShapeStatus::DrawStart, &[(5.0, 5.0), (6.0, 6.0)]);
        first.shape_id = None;
        layer.update_shape(&first);

        let mut second = pencil(
            "x",
            ShapeStatus::DrawEnd,
            &[(5.0, 5.0), (6.0, 6.0), (7.0, 7.0)],
        );
        second.shape_id = None;
        layer.update_shape(&second);

        let slots = layer.slot_points("pres", 0);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].len(), 3);
    }
}
