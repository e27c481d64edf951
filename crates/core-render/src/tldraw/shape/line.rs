//! v2 line shape: straight, bent through a control handle, or a cubic
//! spline that passes through the control handle at its midpoint.

use cairo::{Context, LineCap, LineJoin};
use tracing::debug;

use core_geom::arcs::bezier_length;
use core_geom::vec::{self, V};
use core_shapes::{stroke_color, stroke_width, DashStyle, LineShape, SplineType};

use crate::tldraw::draw_utils::get_perfect_dash_props;
use crate::tldraw::shape::apply_shape_rotation;
use crate::tldraw::shape::arrow::freehand_shaft;
use crate::RenderError;

fn straight_line(ctx: &Context, id: &str, shape: &LineShape) -> Result<f64, RenderError> {
    let style = &shape.labelled.base.style;
    let start: V = shape.handles.start.into();
    let end: V = shape.handles.end.into();

    let line_dist = vec::dist(start, end);
    if line_dist < 2.0 {
        return Ok(line_dist);
    }

    let sw_base = stroke_width(style.size);
    let sw = 1.0 + sw_base * 1.618;
    let stroke = stroke_color(style.color);

    ctx.save()?;
    if style.dash == DashStyle::Draw {
        freehand_shaft(ctx, id, style, start, end);
        ctx.set_source_rgb(stroke.r, stroke.g, stroke.b);
        ctx.fill_preserve()?;
        ctx.set_line_width(sw / 2.0);
        ctx.set_line_cap(LineCap::Round);
        ctx.set_line_join(LineJoin::Round);
        ctx.stroke()?;
    } else {
        ctx.move_to(start.0, start.1);
        ctx.line_to(end.0, end.1);
        ctx.set_line_width(sw);
        ctx.set_line_cap(LineCap::Round);
        ctx.set_line_join(LineJoin::Round);
        let (dash_array, dash_offset) =
            get_perfect_dash_props(line_dist, sw_base * 1.618, style.dash, 2, false, 2.0);
        ctx.set_dash(&dash_array, dash_offset);
        ctx.set_source_rgb(stroke.r, stroke.g, stroke.b);
        ctx.stroke()?;
    }
    ctx.restore()?;

    Ok(line_dist)
}

fn bent_line(ctx: &Context, id: &str, shape: &LineShape) -> Result<f64, RenderError> {
    let style = &shape.labelled.base.style;
    let start: V = shape.handles.start.into();
    let control: V = shape.handles.control_point.into();
    let end: V = shape.handles.end.into();

    let dist_start_control = vec::dist(start, control);
    let dist_control_end = vec::dist(control, end);
    if dist_start_control < 2.0 && dist_control_end < 2.0 {
        return Ok(dist_start_control + dist_control_end);
    }

    let sw_base = stroke_width(style.size);
    let sw = 1.0 + sw_base * 1.618;
    let stroke = stroke_color(style.color);

    ctx.save()?;
    ctx.set_line_width(sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    ctx.set_source_rgb(stroke.r, stroke.g, stroke.b);

    if style.dash == DashStyle::Draw {
        freehand_shaft(ctx, id, style, start, control);
        freehand_shaft(ctx, id, style, control, end);
        ctx.fill_preserve()?;
        ctx.stroke()?;
    } else {
        if style.dash == DashStyle::Dotted {
            ctx.set_dash(&[0.0, sw_base * 4.0], 0.0);
        } else if style.dash == DashStyle::Dashed {
            ctx.set_dash(&[sw_base * 4.0, sw_base * 4.0], 0.0);
        }

        ctx.move_to(start.0, start.1);
        ctx.line_to(control.0, control.1);
        ctx.stroke()?;

        ctx.move_to(control.0, control.1);
        ctx.line_to(end.0, end.1);
        ctx.stroke()?;
    }
    ctx.restore()?;

    Ok(dist_start_control + dist_control_end)
}

fn curved_line(ctx: &Context, shape: &LineShape) -> Result<f64, RenderError> {
    let style = &shape.labelled.base.style;
    let start = shape.handles.start;
    let control = shape.handles.control_point;
    let end = shape.handles.end;

    let line_dist = vec::dist(start.into(), end.into());
    if line_dist < 2.0 {
        return Ok(line_dist);
    }

    let sw_base = stroke_width(style.size);
    let sw = 1.0 + sw_base * 1.618;

    // Solve for the cubic control point that makes the curve pass through
    // the user's handle at t = 0.5 (both cubic controls coincide).
    let t: f64 = 0.5;
    let b_x = (control.x - (1.0 - t).powi(3) * start.x - t.powi(3) * end.x)
        / (3.0 * (1.0 - t) * t);
    let b_y = (control.y - (1.0 - t).powi(3) * start.y - t.powi(3) * end.y)
        / (3.0 * (1.0 - t) * t);

    ctx.move_to(start.x, start.y);
    ctx.curve_to(b_x, b_y, b_x, b_y, end.x, end.y);

    let length = bezier_length(start, control, end);
    let stroke = stroke_color(style.color);

    ctx.save()?;
    ctx.set_line_width(sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    let (dash_array, dash_offset) =
        get_perfect_dash_props(length.abs(), sw, style.dash, 2, false, 2.0);
    ctx.set_dash(&dash_array, dash_offset);
    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
    ctx.stroke()?;
    ctx.restore()?;

    Ok(length.abs())
}

pub fn finalize_line(ctx: &Context, id: &str, shape: &LineShape) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing line");

    apply_shape_rotation(ctx, shape.labelled.size, shape.labelled.rotation);

    ctx.push_group();
    match shape.spline {
        SplineType::Cubic => curved_line(ctx, shape)?,
        SplineType::Line => bent_line(ctx, id, shape)?,
        SplineType::None => straight_line(ctx, id, shape)?,
    };
    let line_pattern = ctx.pop_group()?;

    ctx.set_source(&line_pattern)?;
    ctx.paint()?;
    Ok(())
}
