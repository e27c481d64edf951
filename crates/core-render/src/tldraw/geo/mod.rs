//! v2 geo shape family.
//!
//! Every geo shape follows the same two render modes: a hand-drawn outline
//! built from jittered vertices fed through the freehand stroke pass, or an
//! exact polygon with per-path dash alignment. The per-shape modules supply
//! the geometry; the shared pieces live here.

pub mod arrow;
pub mod checkbox;
pub mod cloud;
pub mod diamond;
pub mod ellipse;
pub mod hexagon;
pub mod oval;
pub mod rectangle;
pub mod rhombus;
pub mod star;
pub mod trapezoid;
pub mod triangle;
pub mod xbox;

use cairo::{Context, LineCap, LineJoin};

use core_geom::freehand::{get_stroke_outline_points, StrokeOptions, StrokePoint};
use core_shapes::{stroke_color, stroke_width, Style};

use crate::tldraw::draw_utils::{
    apply_geo_fill, draw_smooth_path, draw_smooth_stroke_point_path,
};
use crate::RenderError;

/// The hand-drawn render mode shared by the geo shapes: optional fill of the
/// smoothed spine, then a filled-and-stroked freehand outline.
pub(crate) fn draw_geo_outline(
    ctx: &Context,
    style: &Style,
    stroke_points: &[StrokePoint],
) -> Result<(), RenderError> {
    let stroke = stroke_color(style.color);
    let sw = stroke_width(style.size);

    if style.is_filled {
        draw_smooth_stroke_point_path(ctx, stroke_points, false);
        apply_geo_fill(ctx, style, false)?;
    }

    let outline = get_stroke_outline_points(
        stroke_points,
        &StrokeOptions {
            size: sw,
            thinning: 0.65,
            smoothing: 1.0,
            simulate_pressure: false,
            last: true,
            ..Default::default()
        },
    );
    draw_smooth_path(ctx, &outline, true);

    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
    ctx.fill_preserve()?;
    ctx.set_line_width(sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    ctx.stroke()?;
    Ok(())
}
