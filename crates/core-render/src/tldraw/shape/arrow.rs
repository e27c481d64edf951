//! v1 arrow shape, plus the shaft/arrowhead helpers both arrow generations
//! share.
//!
//! Straight arrows are a (possibly freehand) segment with feathered heads:
//! the head base is where a circle of radius `min(length/3, 8*stroke_width)`
//! centred on the tip crosses the shaft, rotated a sixth of a half-turn to
//! each side. Curved arrows run along the circle through start, bend, and
//! end; their heads intersect the same head circle with the arc's circle and
//! pick the solution on the sweep side.

use std::f64::consts::PI;

use cairo::{Context, LineCap, LineJoin, Operator};
use pango::prelude::*;
use tracing::debug;

use core_geom::arcs::{arc_length, circle_from_three_points, lerp_angles};
use core_geom::easings::{ease_in_out_cubic, ease_in_out_sine, ease_out_quad};
use core_geom::freehand::{get_stroke, StrokeOptions};
use core_geom::intersect::{intersect_circle_circle, intersect_circle_line_segment};
use core_geom::vec::{self, V};
use core_geom::{Position, Size};
use core_shapes::{stroke_color, stroke_width, ArrowShape, DashStyle, Decoration, Style};

use crate::tldraw::draw_utils::{draw_smooth_path, get_perfect_dash_props, rounded_rect};
use crate::tldraw::rng::ShapeRng;
use crate::tldraw::shape::apply_shape_rotation;
use crate::tldraw::shape::text::{create_pango_layout, finalize_label, get_layout_size};
use crate::RenderError;

/// Three-point feather at `a`, pointing back along the segment toward `b`.
pub(crate) fn straight_arrow_head(ctx: &Context, a: V, b: V, r: f64) {
    let ints = intersect_circle_line_segment(a, r, a, b);
    let Some(int_point) = ints.points.first().copied() else {
        return;
    };
    let left = vec::rot_with(int_point, a, PI / 6.0);
    let right = vec::rot_with(int_point, a, -PI / 6.0);
    ctx.move_to(left.0, left.1);
    ctx.line_to(a.0, a.1);
    ctx.line_to(right.0, right.1);
}

/// Arc along the shaft circle; the bend sign picks the winding direction.
pub(crate) fn curved_arrow_shaft(
    ctx: &Context,
    start: V,
    end: V,
    center: V,
    radius: f64,
    arrow_bend: f64,
) {
    let start_angle = vec::angle(center, start);
    let end_angle = vec::angle(center, end);

    ctx.move_to(start.0, start.1);
    if arrow_bend > 0.0 {
        ctx.arc(center.0, center.1, radius, start_angle, end_angle);
    } else {
        ctx.arc_negative(center.0, center.1, radius, start_angle, end_angle);
    }
}

/// Feather at `point` on a curved shaft. Of the two crossings between the
/// head circle and the arc circle, the sweep flag picks the trailing one.
pub(crate) fn curved_arrow_head(
    ctx: &Context,
    point: V,
    length: f64,
    center: V,
    radius: f64,
    sweep: bool,
) {
    let ints = intersect_circle_circle(point, length, center, radius);
    if ints.points.is_empty() {
        return;
    }
    let int_point = if sweep {
        ints.points[0]
    } else {
        ints.points[ints.points.len() - 1]
    };
    let left = vec::rot_with(int_point, point, PI / 6.0);
    let right = vec::rot_with(int_point, point, -PI / 6.0);
    ctx.move_to(left.0, left.1);
    ctx.line_to(point.0, point.1);
    ctx.line_to(right.0, right.1);
}

/// Freehand shaft between two points, used by arrows and lines in DRAW mode.
pub(crate) fn freehand_shaft(
    ctx: &Context,
    id: &str,
    style: &Style,
    start: V,
    end: V,
) -> Vec<(f64, f64)> {
    let mut random = ShapeRng::new(id);
    let sw = stroke_width(style.size);

    let outline = get_stroke(
        &[(start.0, start.1, 0.5), (end.0, end.1, 0.5)],
        &StrokeOptions {
            size: sw,
            thinning: 0.618 + random.uniform_range(-0.2, 0.2),
            easing: ease_out_quad,
            simulate_pressure: true,
            streamline: 0.0,
            last: true,
            ..Default::default()
        },
    );
    draw_smooth_path(ctx, &outline, true);
    outline
}

/// Freehand arc shaft through the circle from start to end.
#[allow(clippy::too_many_arguments)]
pub(crate) fn curved_freehand_shaft(
    ctx: &Context,
    id: &str,
    style: &Style,
    start: V,
    end: V,
    center: V,
    radius: f64,
    length: f64,
) {
    let mut random = ShapeRng::new(id);
    let sw = stroke_width(style.size);
    let start_angle = vec::angle(center, start);
    let end_angle = vec::angle(center, end);

    // The easing that shapes point spacing is itself a deterministic
    // function of the shape id.
    let easing: fn(f64) -> f64 = if ShapeRng::new(id).randrange(2) == 0 {
        ease_in_out_sine
    } else {
        ease_in_out_cubic
    };

    let mut points: Vec<(f64, f64, f64)> = vec![(start.0, start.1, 0.5)];
    let count = 8 + ((length.abs() / 20.0) + random.uniform_range(-0.5, 0.5)).floor() as usize;
    for i in 0..count {
        let t = easing(i as f64 / count as f64);
        let angle = lerp_angles(start_angle, end_angle, t);
        let p = vec::to_fixed(vec::nudge_at_angle(center, angle, radius));
        points.push((p.0, p.1, 0.5));
    }
    points.push((end.0, end.1, 0.5));

    let outline = get_stroke(
        &points,
        &StrokeOptions {
            size: 1.0 + sw,
            thinning: 0.618 + random.uniform_range(-0.2, 0.2),
            easing: ease_out_quad,
            simulate_pressure: false,
            streamline: 0.0,
            last: true,
            ..Default::default()
        },
    );
    draw_smooth_path(ctx, &outline, true);
}

fn straight_arrow(ctx: &Context, id: &str, shape: &ArrowShape) -> Result<f64, RenderError> {
    let style = &shape.labelled.base.style;
    let start: V = shape.handles.start.into();
    let end: V = shape.handles.end.into();
    let arrow_dist = vec::dist(start, end);
    if arrow_dist < 2.0 {
        return Ok(arrow_dist);
    }

    let sw_base = stroke_width(style.size);
    let sw = 1.0 + sw_base * 1.618;
    let stroke = stroke_color(style.color);

    ctx.save()?;
    if style.dash == DashStyle::Draw {
        freehand_shaft(ctx, id, style, start, end);
        ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
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
            get_perfect_dash_props(arrow_dist, sw_base * 1.618, style.dash, 2, false, 2.0);
        ctx.set_dash(&dash_array, dash_offset);
        ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
        ctx.stroke()?;
    }
    ctx.restore()?;

    // Feathered heads only for the plain arrow decoration.
    let arrow_head_len = (arrow_dist / 3.0).min(sw_base * 8.0);
    if shape.decorations.start == Some(Decoration::Arrow) {
        straight_arrow_head(ctx, start, end, arrow_head_len);
    }
    if shape.decorations.end == Some(Decoration::Arrow) {
        straight_arrow_head(ctx, end, start, arrow_head_len);
    }

    ctx.set_line_width(sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
    ctx.stroke()?;

    Ok(arrow_dist)
}

fn curved_arrow(
    ctx: &Context,
    id: &str,
    shape: &ArrowShape,
    bend_point: V,
) -> Result<f64, RenderError> {
    let style = &shape.labelled.base.style;
    let start: V = shape.handles.start.into();
    let end: V = shape.handles.end.into();

    let arrow_dist = vec::dist(start, end);
    if arrow_dist < 2.0 {
        return Ok(arrow_dist);
    }

    let sw_base = stroke_width(style.size);
    let sw = 1.0 + sw_base * 1.618;
    let stroke = stroke_color(style.color);

    let (center, radius) = circle_from_three_points(start, bend_point, end);
    let center: V = center.into();
    let length = arc_length(center, radius, start, end);

    ctx.save()?;
    if style.dash == DashStyle::Draw {
        curved_freehand_shaft(ctx, id, style, start, end, center, radius, length);
        ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
        ctx.fill_preserve()?;
        ctx.set_line_width(sw / 2.0);
        ctx.set_line_cap(LineCap::Round);
        ctx.set_line_join(LineJoin::Round);
        ctx.stroke()?;
    } else {
        curved_arrow_shaft(ctx, start, end, center, radius, -shape.bend);
        ctx.set_line_width(sw);
        ctx.set_line_cap(LineCap::Round);
        ctx.set_line_join(LineJoin::Round);
        let (dash_array, dash_offset) =
            get_perfect_dash_props(length.abs(), sw, style.dash, 2, false, 2.0);
        ctx.set_dash(&dash_array, dash_offset);
        ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
        ctx.stroke()?;
    }
    ctx.restore()?;

    let arrow_head_len = (arrow_dist / 3.0).min(sw_base * 8.0);
    let sweep_flag = (end.0 - start.0) * (bend_point.1 - start.1)
        - (bend_point.0 - start.0) * (end.1 - start.1)
        < 0.0;

    if shape.decorations.start == Some(Decoration::Arrow) {
        curved_arrow_head(ctx, start, arrow_head_len, center, radius, sweep_flag);
    }
    if shape.decorations.end == Some(Decoration::Arrow) {
        curved_arrow_head(ctx, end, arrow_head_len, center, radius, sweep_flag);
    }

    ctx.set_line_width(sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
    ctx.stroke()?;

    Ok(length.abs())
}

/// Clear a rounded window in the already-drawn shaft so the label text never
/// sits on the line. Runs inside the arrow's group.
fn mask_label_area(ctx: &Context, center: V, label_size: Size) -> Result<(), RenderError> {
    ctx.save()?;
    ctx.set_operator(Operator::Clear);
    ctx.translate(
        center.0 - label_size.width / 2.0 - 4.0,
        center.1 - label_size.height / 2.0 - 4.0,
    );
    rounded_rect(
        ctx,
        Size::new(label_size.width + 8.0, label_size.height + 8.0),
        4.0,
    );
    ctx.fill()?;
    ctx.restore()?;
    Ok(())
}

pub fn finalize_arrow(ctx: &Context, id: &str, shape: &ArrowShape) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing arrow");

    apply_shape_rotation(ctx, shape.labelled.size, shape.labelled.rotation);

    let start: V = shape.handles.start.into();
    let end: V = shape.handles.end.into();
    let bend_point = shape.bend_point();
    let is_straight = vec::dist(bend_point, vec::med(start, end)) < 1.0;

    ctx.push_group();
    let shaft_length = if is_straight {
        straight_arrow(ctx, id, shape)?
    } else {
        curved_arrow(ctx, id, shape, bend_point)?
    };

    // Labelled shafts get a window cleared under the text.
    let label_center = if is_straight {
        vec::med(start, end)
    } else {
        bend_point
    };
    let scale_cb = move |size: Size| (shaft_length / (size.width + 64.0)).min(1.0);

    if let Some(label) = shape
        .labelled
        .label
        .as_deref()
        .filter(|l| !l.is_empty())
    {
        let mut style = shape.labelled.base.style.clone();
        style.text_align = core_shapes::AlignStyle::Middle;
        let layout = create_pango_layout(ctx, &style, core_shapes::font_size(style.size), None, 0.0)?;
        layout.set_text(label);
        let label_size = get_layout_size(&layout, 4.0) * scale_cb(get_layout_size(&layout, 4.0));
        mask_label_area(ctx, label_center, label_size)?;
    }

    let arrow_pattern = ctx.pop_group()?;
    ctx.set_source(&arrow_pattern)?;
    ctx.paint()?;

    let bounds_center = Position::new(
        shape.labelled.size.width / 2.0,
        shape.labelled.size.height / 2.0,
    );
    let offset = Position::new(label_center.0, label_center.1) - bounds_center;
    finalize_label(ctx, &shape.labelled, Some(offset), Some(&scale_cb))?;
    Ok(())
}
