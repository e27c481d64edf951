//! Geo diamond.

use cairo::Context;
use tracing::debug;

use core_geom::freehand::{get_stroke_points, StrokeOptions, StrokePoint};
use core_geom::{vec, Position};
use core_shapes::{stroke_width, DashStyle, Labelled};

use crate::tldraw::draw_utils::finalize_geo_path;
use crate::tldraw::geo::draw_geo_outline;
use crate::tldraw::rng::ShapeRng;
use crate::tldraw::shape::text_v2::finalize_v2_label;
use crate::RenderError;

fn diamond_stroke_points(id: &str, shape: &Labelled) -> Vec<StrokePoint> {
    let mut random = ShapeRng::new(id);
    let width = shape.size.width;
    let height = shape.size.height;
    let half_width = width / 2.0;
    let half_height = height / 2.0;

    let sw = stroke_width(shape.base.style.size);
    let variation = sw * 0.75;

    let t = (
        half_width + random.uniform(variation),
        random.uniform(variation),
    );
    let r = (
        width + random.uniform(variation),
        half_height + random.uniform(variation),
    );
    let b = (
        half_width + random.uniform(variation),
        height + random.uniform(variation),
    );
    let l = (
        random.uniform(variation),
        half_height + random.uniform(variation),
    );

    let rm = random.randrange(3);

    let mut lines = vec![
        vec::points_between(t, r, 32),
        vec::points_between(r, b, 32),
        vec::points_between(b, l, 32),
        vec::points_between(l, t, 32),
    ];
    lines.rotate_left(rm);

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

fn dash_diamond(ctx: &Context, shape: &Labelled) -> Result<(), RenderError> {
    let w = shape.size.width.max(0.0);
    let h = shape.size.height.max(0.0);
    let half_width = w / 2.0;
    let half_height = h / 2.0;

    let points = [
        Position::new(half_width, 0.0),
        Position::new(w, half_height),
        Position::new(half_width, h),
        Position::new(0.0, half_height),
    ];
    finalize_geo_path(ctx, &points, &shape.base.style)
}

pub fn finalize_diamond(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing diamond");

    ctx.rotate(shape.rotation);

    if shape.base.style.dash == DashStyle::Draw {
        let stroke_points = diamond_stroke_points(id, shape);
        draw_geo_outline(ctx, &shape.base.style, &stroke_points)?;
    } else {
        dash_diamond(ctx, shape)?;
    }

    finalize_v2_label(ctx, shape, None)?;
    Ok(())
}
