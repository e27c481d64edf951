//! Highlighter shape: a wide translucent marker stroke.

use std::f64::consts::TAU;

use cairo::{Context, LineCap, LineJoin};
use tracing::debug;

use core_shapes::{highlight_color, stroke_width, HighlighterShape};

use crate::tldraw::draw_utils::{draw_smooth_stroke_point_path, draw_stroke_points};
use crate::tldraw::shape::apply_shape_rotation;
use crate::RenderError;

const HIGHLIGHT_OPACITY: f64 = 0.7;

pub fn finalize_highlight(
    ctx: &Context,
    id: &str,
    shape: &HighlighterShape,
) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing highlight");

    apply_shape_rotation(ctx, shape.size, shape.rotation);

    let style = &shape.base.style;
    let stroke = highlight_color(style.color);
    let sw = stroke_width(style.size) * 5.0;

    // Very short strokes become a dot.
    let size = shape.size;
    let very_small = size.width <= sw / 2.0 && size.height <= sw && sw < 2.0;
    if very_small {
        ctx.arc(0.0, 0.0, 1.0 + sw, 0.0, TAU);
        ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, HIGHLIGHT_OPACITY);
        ctx.fill_preserve()?;
        ctx.set_line_cap(LineCap::Round);
        ctx.set_line_join(LineJoin::Round);
        ctx.set_line_width(1.0);
        ctx.stroke()?;
        return Ok(());
    }

    let stroke_points = draw_stroke_points(&shape.points, sw, shape.is_complete);
    draw_smooth_stroke_point_path(ctx, &stroke_points, false);

    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    ctx.set_line_width(1.0 + sw * 1.5);
    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, HIGHLIGHT_OPACITY);
    ctx.stroke()?;
    Ok(())
}
