//! Geo x-box: a rectangle with a crossed-out interior.

use cairo::{Context, LineCap};
use tracing::debug;

use core_shapes::{stroke_color, stroke_width, DashStyle, Labelled};

use crate::tldraw::geo::draw_geo_outline;
use crate::tldraw::geo::rectangle::dash_rectangle;
use crate::tldraw::shape::rectangle::rectangle_stroke_points;
use crate::tldraw::shape::text_v2::finalize_v2_label;
use crate::RenderError;

/// The diagonal cross, inset so overlapping opacities do not stack at the
/// box corners.
fn overlay_x_cross(ctx: &Context, shape: &Labelled) -> Result<(), RenderError> {
    let style = &shape.base.style;
    let sw = stroke_width(style.size);

    let w = shape.size.width.max(0.0);
    let h = shape.size.height.max(0.0);

    let x_offset = 2.0 * sw;
    let y_offset = 2.0 * sw;

    let tl = (x_offset, y_offset);
    let tr = (w - x_offset, y_offset);
    let br = (w - x_offset, h - y_offset);
    let bl = (x_offset, h - y_offset);

    let stroke = stroke_color(style.color);
    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);

    ctx.move_to(tl.0, tl.1);
    ctx.line_to(br.0, br.1);
    ctx.move_to(tr.0, tr.1);
    ctx.line_to(bl.0, bl.1);
    ctx.set_line_width(2.0 * sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.stroke()?;
    Ok(())
}

pub fn finalize_x_box(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing x-box");

    ctx.rotate(shape.rotation);

    if shape.base.style.dash == DashStyle::Draw {
        let stroke_points = rectangle_stroke_points(id, shape);
        draw_geo_outline(ctx, &shape.base.style, &stroke_points)?;
    } else {
        dash_rectangle(ctx, shape)?;
    }
    overlay_x_cross(ctx, shape)?;

    finalize_v2_label(ctx, shape, None)?;
    Ok(())
}
