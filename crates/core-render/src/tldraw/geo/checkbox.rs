//! Geo check-box: a rectangle with a checkmark overlay.

use cairo::{Context, LineCap, LineJoin};
use tracing::debug;

use core_shapes::{stroke_color, stroke_width, DashStyle, Labelled};

use crate::tldraw::geo::draw_geo_outline;
use crate::tldraw::geo::rectangle::dash_rectangle;
use crate::tldraw::shape::rectangle::rectangle_stroke_points;
use crate::tldraw::shape::text_v2::finalize_v2_label;
use crate::RenderError;

/// Checkmark segments scaled into the box and clamped to its bounds.
fn get_check_box_lines(w: f64, h: f64) -> [[(f64, f64); 2]; 2] {
    let size = w.min(h) * 0.82;
    let ox = (w - size) / 2.0;
    let oy = (h - size) / 2.0;

    let clamp_x = |x: f64| x.clamp(0.0, w);
    let clamp_y = |y: f64| y.clamp(0.0, h);

    [
        [
            (clamp_x(ox + size * 0.25), clamp_y(oy + size * 0.52)),
            (clamp_x(ox + size * 0.45), clamp_y(oy + size * 0.82)),
        ],
        [
            (clamp_x(ox + size * 0.45), clamp_y(oy + size * 0.82)),
            (clamp_x(ox + size * 0.82), clamp_y(oy + size * 0.22)),
        ],
    ]
}

fn overlay_checkmark(ctx: &Context, shape: &Labelled) -> Result<(), RenderError> {
    let style = &shape.base.style;
    let sw = stroke_width(style.size);

    let w = shape.size.width.max(0.0);
    let h = shape.size.height.max(0.0);
    let lines = get_check_box_lines(w, h);

    let stroke = stroke_color(style.color);
    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
    ctx.set_line_width(1.0 + sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);

    for [start, end] in lines {
        ctx.line_to(start.0, start.1);
        ctx.line_to(end.0, end.1);
    }
    ctx.stroke()?;
    Ok(())
}

pub fn finalize_checkbox(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing check-box");

    ctx.rotate(shape.rotation);

    if shape.base.style.dash == DashStyle::Draw {
        let stroke_points = rectangle_stroke_points(id, shape);
        draw_geo_outline(ctx, &shape.base.style, &stroke_points)?;
        overlay_checkmark(ctx, shape)?;
    } else {
        overlay_checkmark(ctx, shape)?;
        dash_rectangle(ctx, shape)?;
    }

    finalize_v2_label(ctx, shape, None)?;
    Ok(())
}
