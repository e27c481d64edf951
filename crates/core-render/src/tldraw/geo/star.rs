//! Geo star.

use std::f64::consts::TAU;

use cairo::Context;
use tracing::debug;

use core_geom::freehand::{get_stroke_points, StrokeOptions, StrokePoint};
use core_geom::{vec, Position};
use core_shapes::{stroke_width, DashStyle, Labelled};

use crate::tldraw::draw_utils::{finalize_geo_path, get_polygon_draw_vertices};
use crate::tldraw::geo::draw_geo_outline;
use crate::tldraw::shape::text_v2::finalize_v2_label;
use crate::RenderError;

const VERTICES: usize = 5;

/// Alternating outer and inner vertices around the bounding box centre.
fn get_star_points(w: f64, h: f64, n: usize) -> Vec<Position> {
    let step = TAU / n as f64 / 2.0;

    let (cx, cy) = (w / 2.0, h / 2.0);
    let (ox, oy) = (w / 2.0, h / 2.0);
    let (ix, iy) = (ox / 2.0, oy / 2.0);

    (0..n * 2)
        .map(|i| {
            let t = -(TAU / 4.0) + i as f64 * step;
            let (rx, ry) = if i % 2 == 1 { (ix, iy) } else { (ox, oy) };
            Position::new(cx + rx * t.cos(), cy + ry * t.sin())
        })
        .collect()
}

fn star_stroke_points(id: &str, shape: &Labelled) -> Vec<StrokePoint> {
    let sw = stroke_width(shape.base.style.size);
    let width = shape.size.width.max(0.0);
    let height = shape.size.height.max(0.0);

    let star_points = get_star_points(width, height, VERTICES);
    let strokes: Vec<(Position, Position, f64)> = (0..star_points.len())
        .map(|i| {
            let pos1 = star_points[i];
            let pos2 = star_points[(i + 1) % star_points.len()];
            (pos1, pos2, vec::dist(pos1.into(), pos2.into()))
        })
        .collect();

    let points = get_polygon_draw_vertices(&strokes, sw, id);

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

fn dash_star(ctx: &Context, shape: &Labelled) -> Result<(), RenderError> {
    let width = shape.size.width.max(0.0);
    let height = shape.size.height.max(0.0);
    let points = get_star_points(width, height, VERTICES);
    finalize_geo_path(ctx, &points, &shape.base.style)
}

pub fn finalize_star(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing star");

    ctx.rotate(shape.rotation);

    if shape.base.style.dash == DashStyle::Draw {
        let stroke_points = star_stroke_points(id, shape);
        draw_geo_outline(ctx, &shape.base.style, &stroke_points)?;
    } else {
        dash_star(ctx, shape)?;
    }

    finalize_v2_label(ctx, shape, None)?;
    Ok(())
}
