//! v1 rectangle shape.

use cairo::{Context, LineCap, LineJoin};
use tracing::debug;

use core_geom::freehand::{get_stroke_outline_points, get_stroke_points, StrokeOptions, StrokePoint};
use core_geom::vec;
use core_shapes::{fill_color, stroke_color, stroke_width, DashStyle, Labelled};

use crate::tldraw::draw_utils::{
    draw_smooth_path, draw_smooth_stroke_point_path, get_perfect_dash_props,
};
use crate::tldraw::rng::ShapeRng;
use crate::tldraw::shape::apply_shape_rotation;
use crate::tldraw::shape::text::finalize_label;
use crate::RenderError;

/// Hand-drawn rectangle outline: jittered corners, a random starting side,
/// and corner-radius insets that let the freehand pass round the corners.
pub fn rectangle_stroke_points(id: &str, shape: &Labelled) -> Vec<StrokePoint> {
    let mut random = ShapeRng::new(id);
    let sw = stroke_width(shape.base.style.size);

    let w = shape.size.width.max(0.0);
    let h = shape.size.height.max(0.0);

    let variation = sw * 0.75;
    let tl = (
        sw / 2.0 + random.uniform(variation),
        sw / 2.0 + random.uniform(variation),
    );
    let tr = (
        w - sw / 2.0 + random.uniform(variation),
        sw / 2.0 + random.uniform(variation),
    );
    let br = (
        w - sw / 2.0 + random.uniform(variation),
        h - sw / 2.0 + random.uniform(variation),
    );
    let bl = (
        sw / 2.0 + random.uniform(variation),
        h - sw / 2.0 + random.uniform(variation),
    );

    let rm = random.randrange(4);

    let rx = (w / 4.0).min(sw * 2.0);
    let ry = (h / 4.0).min(sw / 2.0);

    let px = 8.max((w / 16.0).floor() as usize);
    let py = 8.max((h / 16.0).floor() as usize);

    let mut lines = vec![
        vec::points_between(vec::add(tl, (rx, 0.0)), vec::sub(tr, (rx, 0.0)), px),
        vec::points_between(vec::add(tr, (0.0, ry)), vec::sub(br, (0.0, ry)), py),
        vec::points_between(vec::sub(br, (rx, 0.0)), vec::add(bl, (rx, 0.0)), px),
        vec::points_between(vec::sub(bl, (0.0, ry)), vec::add(tl, (0.0, ry)), py),
    ];
    lines.rotate_left(rm);

    // Wrap the first line around again, then trim both ends so the stroke
    // overlaps itself away from a corner.
    let mut points: Vec<(f64, f64, f64)> = Vec::new();
    for line in &lines {
        points.extend_from_slice(line);
    }
    points.extend_from_slice(&lines[0]);

    let trim_end = lines[0].len().div_ceil(2).saturating_sub(3);
    let end = points.len() - trim_end;
    let sliced = if 5 < end { &points[5..end] } else { &points[..] };

    get_stroke_points(
        sliced,
        &StrokeOptions {
            size: sw,
            streamline: 0.3,
            last: true,
            ..Default::default()
        },
    )
}

fn finalize_draw_rectangle(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    let style = &shape.base.style;

    let stroke_points = rectangle_stroke_points(id, shape);

    if style.is_filled {
        draw_smooth_stroke_point_path(ctx, &stroke_points, false);
        let fill = fill_color(style.color);
        ctx.set_source_rgb(fill.r, fill.g, fill.b);
        ctx.fill()?;
    }

    let outline = get_stroke_outline_points(
        &stroke_points,
        &StrokeOptions {
            size: stroke_width(style.size),
            thinning: 0.65,
            smoothing: 1.0,
            simulate_pressure: false,
            last: true,
            ..Default::default()
        },
    );
    draw_smooth_path(ctx, &outline, true);

    let stroke = stroke_color(style.color);
    ctx.set_source_rgb(stroke.r, stroke.g, stroke.b);
    ctx.fill_preserve()?;
    ctx.set_line_width(stroke_width(style.size));
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    ctx.stroke()?;
    Ok(())
}

fn finalize_dash_rectangle(ctx: &Context, shape: &Labelled) -> Result<(), RenderError> {
    let style = &shape.base.style;
    let sw_base = stroke_width(style.size) * 1.618;

    let sw = 1.0 + sw_base;
    let w = (shape.size.width - sw / 2.0).max(0.0);
    let h = (shape.size.height - sw / 2.0).max(0.0);

    if style.is_filled {
        ctx.move_to(sw / 2.0, sw / 2.0);
        ctx.line_to(w, sw / 2.0);
        ctx.line_to(w, h);
        ctx.line_to(sw / 2.0, h);
        ctx.close_path();
        let fill = fill_color(style.color);
        ctx.set_source_rgb(fill.r, fill.g, fill.b);
        ctx.fill()?;
    }

    // Each side is dashed independently so the pattern aligns at corners.
    let strokes = [
        ((sw / 2.0, sw / 2.0), (w, sw / 2.0), w - sw / 2.0),
        ((w, sw / 2.0), (w, h), h - sw / 2.0),
        ((w, h), (sw / 2.0, h), w - sw / 2.0),
        ((sw / 2.0, h), (sw / 2.0, sw / 2.0), h - sw / 2.0),
    ];
    ctx.set_line_width(sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    let stroke = stroke_color(style.color);
    ctx.set_source_rgb(stroke.r, stroke.g, stroke.b);
    for (start, end, length) in strokes {
        let (dash_array, dash_offset) =
            get_perfect_dash_props(length, sw_base, style.dash, 1, true, 2.0);
        ctx.move_to(start.0, start.1);
        ctx.line_to(end.0, end.1);
        ctx.set_dash(&dash_array, dash_offset);
        ctx.stroke()?;
    }
    Ok(())
}

pub fn finalize_rectangle(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing rectangle");

    apply_shape_rotation(ctx, shape.size, shape.rotation);

    if shape.base.style.dash == DashStyle::Draw {
        finalize_draw_rectangle(ctx, id, shape)?;
    } else {
        finalize_dash_rectangle(ctx, shape)?;
    }

    finalize_label(ctx, shape, None, None)?;
    Ok(())
}
