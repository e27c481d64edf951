//! Geo triangle.

use cairo::Context;
use tracing::debug;

use core_geom::Position;
use core_shapes::{DashStyle, Labelled};

use crate::tldraw::draw_utils::finalize_geo_path;
use crate::tldraw::geo::draw_geo_outline;
use crate::tldraw::shape::text_v2::finalize_v2_label;
use crate::tldraw::shape::triangle::{triangle_centroid, triangle_stroke_points};
use crate::RenderError;

fn dash_triangle(ctx: &Context, shape: &Labelled) -> Result<(), RenderError> {
    let w = shape.size.width.max(0.0);
    let h = shape.size.height.max(0.0);

    let points = [
        Position::new(w / 2.0, 0.0),
        Position::new(w, h),
        Position::new(0.0, h),
        Position::new(w / 2.0, 0.0),
    ];
    finalize_geo_path(ctx, &points, &shape.base.style)
}

pub fn finalize_geo_triangle(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing triangle (geo)");

    ctx.rotate(shape.rotation);

    if shape.base.style.dash == DashStyle::Draw {
        let stroke_points = triangle_stroke_points(id, shape);
        draw_geo_outline(ctx, &shape.base.style, &stroke_points)?;
    } else {
        dash_triangle(ctx, shape)?;
    }

    let center = Position::new(shape.size.width / 2.0, shape.size.height / 2.0);
    let centroid = triangle_centroid(shape.size);
    let offset_y = (centroid.y - center.y) * 0.72;
    let offset = shape.label_offset() + Position::new(0.0, offset_y);
    finalize_v2_label(ctx, shape, Some(offset))?;
    Ok(())
}
