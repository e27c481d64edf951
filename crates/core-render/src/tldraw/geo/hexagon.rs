//! Geo hexagon.

use cairo::Context;
use tracing::debug;

use core_geom::freehand::{get_stroke_points, StrokeOptions, StrokePoint};
use core_shapes::{stroke_width, DashStyle, Labelled};

use crate::tldraw::draw_utils::{
    finalize_geo_path, get_polygon_draw_vertices, get_polygon_strokes,
};
use crate::tldraw::geo::draw_geo_outline;
use crate::tldraw::shape::text_v2::finalize_v2_label;
use crate::RenderError;

const SIDES: usize = 6;

fn hexagon_stroke_points(id: &str, shape: &Labelled) -> Vec<StrokePoint> {
    let sw = stroke_width(shape.base.style.size);
    let width = shape.size.width.max(0.0);
    let height = shape.size.height.max(0.0);

    let strokes = get_polygon_strokes(width, height, SIDES);
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

fn dash_hexagon(ctx: &Context, shape: &Labelled) -> Result<(), RenderError> {
    let width = shape.size.width.max(0.0);
    let height = shape.size.height.max(0.0);

    let strokes = get_polygon_strokes(width, height, SIDES);
    let points: Vec<_> = strokes.iter().map(|stroke| stroke.0).collect();
    finalize_geo_path(ctx, &points, &shape.base.style)
}

pub fn finalize_hexagon(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing hexagon");

    ctx.rotate(shape.rotation);

    if shape.base.style.dash == DashStyle::Draw {
        let stroke_points = hexagon_stroke_points(id, shape);
        draw_geo_outline(ctx, &shape.base.style, &stroke_points)?;
    } else {
        dash_hexagon(ctx, shape)?;
    }

    finalize_v2_label(ctx, shape, None)?;
    Ok(())
}
