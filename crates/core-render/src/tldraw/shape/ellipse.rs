//! v1 ellipse shape.

use std::f64::consts::PI;

use cairo::{Context, LineCap, LineJoin};
use tracing::debug;

use core_geom::arcs::{perimeter_of_ellipse, BEZIER_CIRCLE_MAGIC};
use core_geom::easings::ease_in_out_sine;
use core_geom::freehand::{
    get_stroke_outline_points, get_stroke_points, StrokeOptions, StrokePoint,
};
use core_shapes::{fill_color, stroke_color, stroke_width, DashStyle, EllipseShape};

use crate::tldraw::draw_utils::{
    draw_smooth_path, draw_smooth_stroke_point_path, get_perfect_dash_props,
};
use crate::tldraw::rng::ShapeRng;
use crate::tldraw::shape::apply_shape_rotation;
use crate::tldraw::shape::text::finalize_label;
use crate::RenderError;

/// Sample points around the ellipse with jittered radius and an eased
/// angular schedule, overshooting a little so the stroke overlaps itself.
pub fn ellipse_stroke_points(id: &str, shape: &EllipseShape) -> (Vec<StrokePoint>, f64) {
    let sw = stroke_width(shape.labelled.base.style.size);
    let mut random = ShapeRng::new(id);
    let variation = sw * 2.0;
    let rx = shape.radius.0 + random.uniform(variation);
    let ry = shape.radius.1 + random.uniform(variation);
    let perimeter = perimeter_of_ellipse(rx, ry);

    let start = PI + PI + random.uniform_range(-1.0, 1.0);
    let extra = random.random();
    let count = (perimeter / 10.0).max(16.0) as usize;

    let mut points: Vec<(f64, f64, f64)> = Vec::with_capacity(count);
    for i in 0..count {
        let t = ease_in_out_sine(i as f64 / (count + 1) as f64);
        let rads = start * 2.0 + PI * (2.0 + extra) * t;
        points.push((
            rx * rads.cos() + shape.radius.0,
            ry * rads.sin() + shape.radius.1,
            t + random.random(),
        ));
    }

    (
        get_stroke_points(
            &points,
            &StrokeOptions {
                size: 2.0 + sw * 2.0,
                streamline: 0.0,
                ..Default::default()
            },
        ),
        perimeter,
    )
}

fn draw_ellipse(ctx: &Context, id: &str, shape: &EllipseShape) -> Result<(), RenderError> {
    let style = &shape.labelled.base.style;
    let (stroke_points, perimeter) = ellipse_stroke_points(id, shape);

    if style.is_filled {
        draw_smooth_stroke_point_path(ctx, &stroke_points, false);
        let fill = fill_color(style.color);
        ctx.set_source_rgb(fill.r, fill.g, fill.b);
        ctx.fill()?;
    }

    let outline = get_stroke_outline_points(
        &stroke_points,
        &StrokeOptions {
            size: 2.0 + stroke_width(style.size) * 2.0,
            thinning: 0.618,
            taper_end: perimeter / 8.0,
            taper_start: perimeter / 12.0,
            simulate_pressure: true,
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

fn dash_ellipse(ctx: &Context, shape: &EllipseShape) -> Result<(), RenderError> {
    let style = &shape.labelled.base.style;
    let sw_base = stroke_width(style.size) * 1.618;
    let (radius_x, radius_y) = shape.radius;

    let sw = 1.0 + sw_base;
    let rx = (radius_x - sw / 2.0).max(0.0);
    let ry = (radius_y - sw / 2.0).max(0.0);
    let perimeter = perimeter_of_ellipse(rx, ry);
    // Snap to 4 so dashes align at the quadrants.
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

    // A four-cubic approximation; cairo's arc does not deal well with
    // degenerate ellipses.
    let k = BEZIER_CIRCLE_MAGIC;
    ctx.translate(radius_x, radius_y);
    ctx.move_to(-rx, 0.0);
    ctx.curve_to(-rx, -ry * k, -rx * k, -ry, 0.0, -ry);
    ctx.curve_to(rx * k, -ry, rx, -ry * k, rx, 0.0);
    ctx.curve_to(rx, ry * k, rx * k, ry, 0.0, ry);
    ctx.curve_to(-rx * k, ry, -rx, ry * k, -rx, 0.0);
    ctx.close_path();

    if style.is_filled {
        let fill = fill_color(style.color);
        ctx.set_source_rgb(fill.r, fill.g, fill.b);
        ctx.fill_preserve()?;
    }

    ctx.set_dash(&dash_array, dash_offset);
    ctx.set_line_width(sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    let stroke = stroke_color(style.color);
    ctx.set_source_rgb(stroke.r, stroke.g, stroke.b);
    ctx.stroke()?;
    Ok(())
}

pub fn finalize_ellipse(ctx: &Context, id: &str, shape: &EllipseShape) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing ellipse");

    apply_shape_rotation(ctx, shape.labelled.size, shape.labelled.rotation);

    if shape.labelled.base.style.dash == DashStyle::Draw {
        draw_ellipse(ctx, id, shape)?;
    } else {
        dash_ellipse(ctx, shape)?;
    }

    finalize_label(ctx, &shape.labelled, None, None)?;
    Ok(())
}
