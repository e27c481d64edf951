//! v1 triangle shape.

use cairo::{Context, LineCap, LineJoin};
use tracing::debug;

use core_geom::freehand::{
    get_stroke_outline_points, get_stroke_points, StrokeOptions, StrokePoint,
};
use core_geom::{vec, Position, Size};
use core_shapes::{fill_color, stroke_color, stroke_width, DashStyle, Labelled};

use crate::tldraw::draw_utils::{
    draw_smooth_path, draw_smooth_stroke_point_path, get_perfect_dash_props,
};
use crate::tldraw::rng::ShapeRng;
use crate::tldraw::shape::apply_shape_rotation;
use crate::tldraw::shape::text::finalize_label;
use crate::RenderError;

pub fn triangle_centroid(size: Size) -> Position {
    (Position::new(size.width / 2.0, 0.0)
        + Position::new(size.width, size.height)
        + Position::new(0.0, size.height))
        / 3.0
}

pub fn triangle_stroke_points(id: &str, shape: &Labelled) -> Vec<StrokePoint> {
    let mut random = ShapeRng::new(id);
    let size = shape.size;
    let sw = stroke_width(shape.base.style.size);

    // Corners with random offsets.
    let variation = sw * 0.75;
    let t = (
        size.width / 2.0 + random.uniform(variation),
        random.uniform(variation),
    );
    let br = (
        size.width + random.uniform(variation),
        size.height + random.uniform(variation),
    );
    let bl = (
        random.uniform(variation),
        size.height + random.uniform(variation),
    );

    let rm = random.randrange(3);

    let mut lines = vec![
        vec::points_between(t, br, 32),
        vec::points_between(br, bl, 32),
        vec::points_between(bl, t, 32),
    ];
    lines.rotate_left(rm);

    // Wrap the first line around so the stroke does not end on a corner.
    let mut points: Vec<(f64, f64, f64)> = Vec::new();
    for line in &lines {
        points.extend_from_slice(line);
    }
    points.extend_from_slice(&lines[0]);

    get_stroke_points(
        &points,
        &StrokeOptions {
            size: sw,
            streamline: 0.3,
            last: true,
            ..Default::default()
        },
    )
}

fn draw_triangle(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    let style = &shape.base.style;
    let stroke = stroke_color(style.color);
    let sw = stroke_width(style.size);

    let stroke_points = triangle_stroke_points(id, shape);

    if style.is_filled {
        ctx.save()?;
        draw_smooth_stroke_point_path(ctx, &stroke_points, false);
        let fill = fill_color(style.color);
        ctx.set_source_rgb(fill.r, fill.g, fill.b);
        ctx.fill()?;
        ctx.restore()?;
    }

    let outline = get_stroke_outline_points(
        &stroke_points,
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

    ctx.set_source_rgb(stroke.r, stroke.g, stroke.b);
    ctx.fill_preserve()?;
    ctx.set_line_width(sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    ctx.stroke()?;
    Ok(())
}

fn dash_triangle(ctx: &Context, shape: &Labelled) -> Result<(), RenderError> {
    let style = &shape.base.style;
    let stroke = stroke_color(style.color);
    let sw_base = stroke_width(style.size) * 1.618;

    let sw = 1.0 + sw_base;
    let w = (shape.size.width - sw / 2.0).max(0.0);
    let h = (shape.size.height - sw / 2.0).max(0.0);

    let side_width = (w / 2.0).hypot(h);

    if style.is_filled {
        ctx.save()?;
        ctx.move_to(w / 2.0, 0.0);
        ctx.line_to(w, h);
        ctx.line_to(0.0, h);
        ctx.close_path();
        let fill = fill_color(style.color);
        ctx.set_source_rgb(fill.r, fill.g, fill.b);
        ctx.fill()?;
        ctx.restore()?;
    }

    let strokes = [
        ((w / 2.0, 0.0), (w, h), side_width),
        ((w, h), (0.0, h), w),
        ((0.0, h), (w / 2.0, 0.0), side_width),
    ];
    ctx.set_line_width(sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    ctx.set_source_rgb(stroke.r, stroke.g, stroke.b);
    for (start, end, length) in strokes {
        ctx.move_to(start.0, start.1);
        ctx.line_to(end.0, end.1);
        let (dash_array, dash_offset) =
            get_perfect_dash_props(length, sw_base, style.dash, 1, true, 2.0);
        ctx.set_dash(&dash_array, dash_offset);
        ctx.stroke()?;
    }
    Ok(())
}

pub fn finalize_triangle(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing triangle");

    apply_shape_rotation(ctx, shape.size, shape.rotation);

    if shape.base.style.dash == DashStyle::Draw {
        draw_triangle(ctx, id, shape)?;
    } else {
        dash_triangle(ctx, shape)?;
    }

    // Labels sit at the triangle's visual centre, not the bounds centre.
    let center = Position::new(shape.size.width / 2.0, shape.size.height / 2.0);
    let centroid = triangle_centroid(shape.size);
    let offset_y = (centroid.y - center.y) * 0.72;
    let offset = shape.label_offset() + Position::new(0.0, offset_y);
    finalize_label(ctx, shape, Some(offset), None)?;
    Ok(())
}
