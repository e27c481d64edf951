//! Geo cloud: bumps around a pill perimeter, each bump an arc through a
//! circumcircle.

use std::f64::consts::TAU;

use cairo::{Context, LineCap, LineJoin};
use tracing::debug;

use core_geom::arcs::{circle_from_three_points, point_on_circle};
use core_geom::vec::{self, V};
use core_shapes::{stroke_color, stroke_width, DashStyle, Labelled, SizeStyle};

use crate::tldraw::draw_utils::{apply_geo_fill, get_perfect_dash_props};
use crate::tldraw::rng::ShapeRng;
use crate::tldraw::shape::text_v2::finalize_v2_label;
use crate::RenderError;

struct Arc {
    left_point: V,
    right_point: V,
    center: Option<V>,
    radius: f64,
}

fn pill_circumference(w: f64, h: f64) -> f64 {
    let radius = w.min(h) / 2.0;
    let long_side = w.max(h) - TAU;
    TAU * radius + 2.0 * long_side
}

enum PillSection {
    Straight { start: V, delta: V },
    Arc { center: V, start_angle: f64 },
}

/// Evenly spaced points around the pill inscribed in (width, height).
fn pill_points(width: f64, height: f64, num_points: usize) -> Vec<V> {
    let radius = width.min(height) / 2.0;
    let long_side = width.max(height) - radius * 2.0;
    let circumference = TAU * radius + 2.0 * long_side;
    let spacing = circumference / num_points as f64;

    let mut sections: Vec<PillSection> = if width > height {
        vec![
            PillSection::Straight {
                start: (radius, 0.0),
                delta: (1.0, 0.0),
            },
            PillSection::Arc {
                center: (width - radius, radius),
                start_angle: -TAU / 4.0,
            },
            PillSection::Straight {
                start: (width - radius, height),
                delta: (-1.0, 0.0),
            },
            PillSection::Arc {
                center: (radius, radius),
                start_angle: TAU / 4.0,
            },
        ]
    } else {
        vec![
            PillSection::Straight {
                start: (width, radius),
                delta: (0.0, 1.0),
            },
            PillSection::Arc {
                center: (radius, height - radius),
                start_angle: 0.0,
            },
            PillSection::Straight {
                start: (0.0, height - radius),
                delta: (0.0, -1.0),
            },
            PillSection::Arc {
                center: (radius, radius),
                start_angle: TAU / 2.0,
            },
        ]
    };

    let section_length = |section: &PillSection| match section {
        PillSection::Straight { .. } => long_side,
        PillSection::Arc { .. } => TAU / 2.0 * radius,
    };

    let mut points = Vec::with_capacity(num_points);
    let mut section_offset = 0.0;

    for _ in 0..num_points {
        match &sections[0] {
            PillSection::Straight { start, delta } => {
                points.push(vec::add(*start, vec::mul(*delta, section_offset)));
            }
            PillSection::Arc {
                center,
                start_angle,
            } => {
                points.push(point_on_circle(
                    *center,
                    radius,
                    start_angle + section_offset / radius,
                ));
            }
        }

        section_offset += spacing;
        let mut current_length = section_length(&sections[0]);
        while section_offset > current_length {
            section_offset -= current_length;
            sections.rotate_left(1);
            current_length = section_length(&sections[0]);
        }
    }

    points
}

fn bump_spacing(size: SizeStyle) -> f64 {
    match size {
        SizeStyle::Small | SizeStyle::S => 50.0,
        SizeStyle::Medium | SizeStyle::M => 70.0,
        SizeStyle::Large | SizeStyle::L => 100.0,
        SizeStyle::Xl => 130.0,
    }
}

fn get_cloud_arcs(width: f64, height: f64, seed: &str, size: SizeStyle) -> Vec<Arc> {
    let mut random = ShapeRng::new(seed);
    let circumference = pill_circumference(width, height);

    let num_bumps = ((circumference / bump_spacing(size)).ceil() as usize)
        .max(6)
        .max((circumference / width.min(height)).ceil() as usize);

    let target_bump_protrusion = (circumference / num_bumps as f64) * 0.2;
    let inner_width = (width - target_bump_protrusion * 2.0).max(1.0);
    let inner_height = (height - target_bump_protrusion * 2.0).max(1.0);
    let padding_x = (width - inner_width) / 2.0;
    let padding_y = (height - inner_height) / 2.0;

    let distance_between_points_on_perimeter =
        pill_circumference(inner_width, inner_height) / num_bumps as f64;

    let mut bump_points: Vec<V> = pill_points(inner_width, inner_height, num_bumps)
        .into_iter()
        .map(|p| vec::add(p, (padding_x, padding_y)))
        .collect();

    let max_wiggle_x = if width < 20.0 {
        0.0
    } else {
        target_bump_protrusion * 0.3
    };
    let max_wiggle_y = if height < 20.0 {
        0.0
    } else {
        target_bump_protrusion * 0.3
    };

    // Wiggle the bump points, outer ones first, like a hand would.
    for i in 0..num_bumps / 2 {
        let w1 = (random.random() * max_wiggle_x, random.random() * max_wiggle_y);
        bump_points[i] = vec::add(bump_points[i], w1);
        let w2 = (random.random() * max_wiggle_x, random.random() * max_wiggle_y);
        let j = num_bumps - i - 1;
        bump_points[j] = vec::add(bump_points[j], w2);
    }

    let mut arcs = Vec::with_capacity(bump_points.len());
    for i in 0..bump_points.len() {
        let j = if i == bump_points.len() - 1 { 0 } else { i + 1 };
        let left_point = bump_points[i];
        let right_point = bump_points[j];

        let mid_point = vec::med(left_point, right_point);
        let offset_angle = vec::angle(left_point, right_point) - TAU / 4.0;

        let distance_between_original_points = vec::dist(left_point, right_point);
        let curvature_offset =
            distance_between_points_on_perimeter - distance_between_original_points;
        let final_distance = padding_x.max(padding_y) + curvature_offset;

        let arc_point = vec::add(mid_point, vec::from_angle(offset_angle, final_distance));
        let arc_point = (
            arc_point.0.clamp(0.0, width),
            arc_point.1.clamp(0.0, height),
        );

        let (center_pos, _) = circle_from_three_points(left_point, right_point, arc_point);
        let center: V = center_pos.into();
        let (center, radius) = if center.0.is_finite() && center.1.is_finite() {
            (Some(center), vec::dist(center, left_point))
        } else {
            // Collinear bump: fall back to a straight join.
            (None, vec::dist(vec::med(left_point, right_point), left_point))
        };

        arcs.push(Arc {
            left_point,
            right_point,
            center,
            radius,
        });
    }

    arcs
}

fn trace_cloud_path(ctx: &Context, arcs: &[Arc]) {
    ctx.new_sub_path();
    for arc in arcs {
        match arc.center {
            None => {
                ctx.move_to(arc.left_point.0, arc.left_point.1);
                ctx.line_to(arc.right_point.0, arc.right_point.1);
            }
            Some(center) => {
                let start_angle = vec::angle(center, arc.left_point);
                let end_angle = vec::angle(center, arc.right_point);
                ctx.arc(center.0, center.1, arc.radius, start_angle, end_angle);
            }
        }
    }
    ctx.close_path();
}

fn stroke_cloud(
    ctx: &Context,
    shape: &Labelled,
    w: f64,
    h: f64,
    sw: f64,
) -> Result<(), RenderError> {
    let style = &shape.base.style;
    if style.is_filled {
        apply_geo_fill(ctx, style, true)?;
    }

    ctx.set_line_width(sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);

    let (dash_array, dash_offset) =
        get_perfect_dash_props((2.0 * w + 2.0 * h).abs(), sw, style.dash, 2, false, 2.0);
    ctx.set_dash(&dash_array, dash_offset);

    let stroke = stroke_color(style.color);
    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
    ctx.stroke()?;
    Ok(())
}

fn dash_cloud(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    let style = &shape.base.style;
    let w = shape.size.width.max(0.0);
    let h = shape.size.height.max(0.0);
    let sw = 1.0 + stroke_width(style.size) * 1.618;

    ctx.save()?;
    let arcs = get_cloud_arcs(w, h, id, style.size);
    trace_cloud_path(ctx, &arcs);
    stroke_cloud(ctx, shape, w, h, sw)?;
    ctx.restore()?;
    Ok(())
}

fn draw_cloud(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    let style = &shape.base.style;
    let mut random = ShapeRng::new(id);
    let w = shape.size.width.max(0.0);
    let h = shape.size.height.max(0.0);
    let sw = 1.0 + stroke_width(style.size) * 1.618;

    let mut_multiplier = match style.size {
        SizeStyle::Small | SizeStyle::S => 0.5,
        SizeStyle::Medium | SizeStyle::M => 0.7,
        SizeStyle::Large | SizeStyle::L => 0.9,
        SizeStyle::Xl => 1.6,
    };

    ctx.save()?;
    let arcs = get_cloud_arcs(w, h, id, style.size);

    let avg_arc_length = arcs
        .iter()
        .map(|arc| vec::dist(arc.left_point, arc.right_point))
        .sum::<f64>()
        / arcs.len() as f64;
    let should_mutate = avg_arc_length > mut_multiplier * 15.0;

    ctx.new_sub_path();
    for arc in &arcs {
        let mut left_point = arc.left_point;
        let mut right_point = arc.right_point;
        if should_mutate {
            left_point = (
                left_point.0 + random.random() * mut_multiplier * 2.0,
                left_point.1 + random.random() * mut_multiplier * 2.0,
            );
            right_point = (
                right_point.0 + random.random() * mut_multiplier * 2.0,
                right_point.1 + random.random() * mut_multiplier * 2.0,
            );
        }

        match arc.center {
            None => {
                ctx.move_to(left_point.0, left_point.1);
                ctx.line_to(right_point.0, right_point.1);
            }
            Some(center) => {
                let mut center = center;
                let mut radius = arc.radius;
                let start_angle = vec::angle(center, left_point);
                let end_angle = vec::angle(center, right_point);
                if should_mutate {
                    center = (
                        center.0 + random.random() * mut_multiplier * 2.0,
                        center.1 + random.random() * mut_multiplier * 2.0,
                    );
                    radius += random.random() * mut_multiplier;
                }
                ctx.arc(center.0, center.1, radius, start_angle, end_angle);
            }
        }
    }
    ctx.close_path();

    stroke_cloud(ctx, shape, w, h, sw)?;
    ctx.restore()?;
    Ok(())
}

pub fn finalize_cloud(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing cloud");

    ctx.rotate(shape.rotation);

    if shape.base.style.dash == DashStyle::Draw {
        draw_cloud(ctx, id, shape)?;
    } else {
        dash_cloud(ctx, id, shape)?;
    }

    finalize_v2_label(ctx, shape, None)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_arcs_are_deterministic_and_cover_the_box() {
        let a = get_cloud_arcs(200.0, 120.0, "shape:cloud", SizeStyle::M);
        let b = get_cloud_arcs(200.0, 120.0, "shape:cloud", SizeStyle::M);
        assert_eq!(a.len(), b.len());
        assert!(a.len() >= 6);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.left_point, y.left_point);
            assert_eq!(x.radius, y.radius);
        }
    }

    #[test]
    fn pill_points_stay_inside_the_box() {
        for p in pill_points(100.0, 60.0, 12) {
            assert!(p.0 >= -1e-9 && p.0 <= 100.0 + 1e-9);
            assert!(p.1 >= -1e-9 && p.1 <= 60.0 + 1e-9);
        }
    }

}
