//! Geo rhombus (a slanted parallelogram).

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

fn rhombus_stroke_points(id: &str, shape: &Labelled) -> Vec<StrokePoint> {
    let mut random = ShapeRng::new(id);
    let width = shape.size.width;
    let height = shape.size.height;

    // The slant angle varies with the aspect ratio.
    let x_offset = (width * 0.38).min(height * 0.38);
    let sw = stroke_width(shape.base.style.size);
    let variation = sw * 0.75;

    let tl = (
        x_offset + random.uniform(variation),
        random.uniform(variation),
    );
    let tr = (
        width + random.uniform(variation),
        random.uniform(variation),
    );
    let br = (
        width - x_offset + random.uniform(variation),
        height + random.uniform(variation),
    );
    let bl = (random.uniform(variation), height + random.uniform(variation));

    let rm = random.randrange(3);

    let mut lines = vec![
        vec::points_between(tl, tr, 32),
        vec::points_between(tr, br, 32),
        vec::points_between(br, bl, 32),
        vec::points_between(bl, tl, 32),
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

fn dash_rhombus(ctx: &Context, shape: &Labelled) -> Result<(), RenderError> {
    let w = shape.size.width.max(0.0);
    let h = shape.size.height.max(0.0);
    let x_offset = (w * 0.38).min(h * 0.38);

    let points = [
        Position::new(x_offset, 0.0),
        Position::new(w, 0.0),
        Position::new(w - x_offset, h),
        Position::new(0.0, h),
        Position::new(x_offset, 0.0),
    ];
    finalize_geo_path(ctx, &points, &shape.base.style)
}

pub fn finalize_rhombus(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing rhombus");

    ctx.rotate(shape.rotation);

    if shape.base.style.dash == DashStyle::Draw {
        let stroke_points = rhombus_stroke_points(id, shape);
        draw_geo_outline(ctx, &shape.base.style, &stroke_points)?;
    } else {
        dash_rhombus(ctx, shape)?;
    }

    finalize_v2_label(ctx, shape, None)?;
    Ok(())
}
