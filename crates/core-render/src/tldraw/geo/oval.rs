//! Geo oval: a pill outline traced as a point polygon.

use std::f64::consts::TAU;

use cairo::Context;
use tracing::debug;

use core_geom::Position;
use core_shapes::Labelled;

use crate::tldraw::draw_utils::finalize_geo_path;
use crate::tldraw::shape::text_v2::finalize_v2_label;
use crate::RenderError;

/// Sample the pill outline: two half-circles joined by the long sides,
/// oriented by the aspect ratio.
fn oval_points(w: f64, h: f64, n_vertices: usize) -> Vec<Position> {
    let cx = w / 2.0;
    let cy = h / 2.0;

    let mut points = vec![Position::new(0.0, 0.0); n_vertices * 2 - 2];

    if h > w {
        for i in 0..n_vertices - 1 {
            let t1 = -(TAU / 2.0) + (TAU / 2.0 * i as f64) / (n_vertices - 2) as f64;
            let t2 = (TAU / 2.0 * i as f64) / (n_vertices - 2) as f64;
            points[i] = Position::new(cx + cx * t1.cos(), cx + cx * t1.sin());
            points[i + (n_vertices - 1)] =
                Position::new(cx + cx * t2.cos(), h - cx + cx * t2.sin());
        }
    } else {
        for i in 0..n_vertices - 1 {
            let t1 = -(TAU / 4.0) + (TAU / 2.0 * i as f64) / (n_vertices - 2) as f64;
            let t2 = (TAU / 4.0) + (TAU / 2.0 * -(i as f64)) / (n_vertices - 2) as f64;
            points[i] = Position::new(w - cy + cy * t1.cos(), h - cy + cy * t1.sin());
            points[i + (n_vertices - 1)] =
                Position::new(cy - cy * t2.cos(), h - cy + cy * t2.sin());
        }
    }

    points
}

pub fn finalize_oval(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing oval");

    ctx.rotate(shape.rotation);

    let w = shape.size.width.max(0.0);
    let h = shape.size.height.max(0.0);
    let points = oval_points(w, h, 50);
    finalize_geo_path(ctx, &points, &shape.base.style)?;

    finalize_v2_label(ctx, shape, None)?;
    Ok(())
}
