//! Geo ellipse: the exact four-cubic outline with quadrant-aligned dashes.

use cairo::{Context, LineCap, LineJoin};
use tracing::debug;

use core_geom::arcs::{perimeter_of_ellipse, BEZIER_CIRCLE_MAGIC};
use core_shapes::{stroke_color, stroke_width, Labelled};

use crate::tldraw::draw_utils::{apply_geo_fill, get_perfect_dash_props};
use crate::tldraw::shape::text_v2::finalize_v2_label;
use crate::RenderError;

/// Four-cubic Bézier ellipse path centred at (cx, cy), in absolute
/// coordinates so it can be emitted repeatedly without touching the CTM.
fn bezier_ellipse(ctx: &Context, cx: f64, cy: f64, rx: f64, ry: f64) {
    let k = BEZIER_CIRCLE_MAGIC;
    ctx.move_to(cx - rx, cy);
    ctx.curve_to(cx - rx, cy - ry * k, cx - rx * k, cy - ry, cx, cy - ry);
    ctx.curve_to(cx + rx * k, cy - ry, cx + rx, cy - ry * k, cx + rx, cy);
    ctx.curve_to(cx + rx, cy + ry * k, cx + rx * k, cy + ry, cx, cy + ry);
    ctx.curve_to(cx - rx * k, cy + ry, cx - rx, cy + ry * k, cx - rx, cy);
    ctx.close_path();
}

pub fn finalize_geo_ellipse(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing ellipse (geo)");

    ctx.rotate(shape.rotation);

    let style = &shape.base.style;
    let radius = (shape.size.width / 2.0, shape.size.height / 2.0);
    let stroke = stroke_color(style.color);
    let sw_base = stroke_width(style.size) * 1.618;

    let sw = 1.0 + sw_base;
    let rx = (radius.0 - sw / 2.0).max(0.0);
    let ry = (radius.1 - sw / 2.0).max(0.0);
    let perimeter = perimeter_of_ellipse(rx, ry);
    let (dash_array, dash_offset) = get_perfect_dash_props(
        if perimeter < 64.0 {
            perimeter * 2.0
        } else {
            perimeter
        },
        sw_base,
        style.dash,
        4,
        true,
        2.0,
    );

    if style.is_filled {
        bezier_ellipse(ctx, radius.0, radius.1, radius.0, radius.1);
        apply_geo_fill(ctx, style, false)?;
    }

    bezier_ellipse(ctx, radius.0, radius.1, radius.0, radius.1);

    ctx.set_dash(&dash_array, dash_offset);
    ctx.set_line_width(sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
    ctx.stroke()?;

    finalize_v2_label(ctx, shape, None)?;
    Ok(())
}
