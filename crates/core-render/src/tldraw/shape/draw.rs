//! Freehand draw shape.

use std::f64::consts::TAU;

use cairo::{Context, LineCap, LineJoin};
use tracing::debug;

use core_geom::easings::{real_pressure, simulated_pressure};
use core_geom::freehand::{get_stroke_outline_points, StrokeOptions};
use core_geom::vec;
use core_shapes::{fill_color, stroke_color, stroke_width, DashStyle, DrawShape};

use crate::tldraw::draw_utils::{
    draw_smooth_path, draw_smooth_stroke_point_path, draw_stroke_points,
};
use crate::tldraw::shape::apply_shape_rotation;
use crate::RenderError;

pub fn finalize_draw(ctx: &Context, id: &str, shape: &DrawShape) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing draw");

    apply_shape_rotation(ctx, shape.size, shape.rotation);

    let style = &shape.base.style;
    let size = shape.size;
    let points = &shape.points;
    let stroke = stroke_color(style.color);
    let sw = stroke_width(style.size);

    if size.width <= sw / 2.0 && size.height <= sw && sw < 2.0 {
        // Too small for a stroke: a dot.
        ctx.arc(0.0, 0.0, 1.0 + sw, 0.0, TAU);
        ctx.set_source_rgb(stroke.r, stroke.g, stroke.b);
        ctx.fill_preserve()?;
        ctx.set_line_cap(LineCap::Round);
        ctx.set_line_join(LineJoin::Round);
        ctx.set_line_width(sw / 2.0);
        ctx.stroke()?;
        return Ok(());
    }

    let should_fill = style.is_filled
        && points.len() > 3
        && vec::dist(
            (points[0].0, points[0].1),
            (points[points.len() - 1].0, points[points.len() - 1].1),
        ) < sw * 2.0;

    let stroke_points = draw_stroke_points(points, sw, shape.is_complete);

    if should_fill {
        // Closed enough to fill.
        draw_smooth_stroke_point_path(ctx, &stroke_points, false);
        let fill = fill_color(style.color);
        ctx.set_source_rgb(fill.r, fill.g, fill.b);
        ctx.fill()?;
    }

    if style.dash == DashStyle::Draw {
        // The brushed look: a pressure-shaped outline, filled.
        // Input without real pressure samples carries the 0.5 placeholder.
        let simulate_pressure = points.first().map(|p| p.2 == 0.5).unwrap_or(true);

        let outline = get_stroke_outline_points(
            &stroke_points,
            &StrokeOptions {
                size: 1.0 + sw * 1.5,
                thinning: 0.65,
                smoothing: 0.65,
                simulate_pressure,
                last: shape.is_complete,
                easing: if simulate_pressure {
                    simulated_pressure
                } else {
                    real_pressure
                },
                ..Default::default()
            },
        );
        draw_smooth_path(ctx, &outline, true);

        ctx.set_source_rgb(stroke.r, stroke.g, stroke.b);
        ctx.fill_preserve()?;
        ctx.set_line_cap(LineCap::Round);
        ctx.set_line_join(LineJoin::Round);
        ctx.set_line_width(sw / 2.0);
        ctx.stroke()?;
        return Ok(());
    } else if style.dash == DashStyle::Dotted {
        ctx.set_dash(&[0.0, sw * 4.0], 0.0);
    } else if style.dash == DashStyle::Dashed {
        ctx.set_dash(&[sw * 4.0, sw * 4.0], 0.0);
    }

    // Plain stroked spine, possibly dashed or dotted.
    draw_smooth_stroke_point_path(ctx, &stroke_points, false);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    ctx.set_line_width(1.0 + sw * 1.5);
    ctx.set_source_rgb(stroke.r, stroke.g, stroke.b);
    ctx.stroke()?;
    Ok(())
}
