//! Geo rectangle.

use cairo::Context;
use tracing::debug;

use core_geom::Position;
use core_shapes::{DashStyle, Labelled};

use crate::tldraw::draw_utils::finalize_geo_path;
use crate::tldraw::geo::draw_geo_outline;
use crate::tldraw::shape::rectangle::rectangle_stroke_points;
use crate::tldraw::shape::text_v2::finalize_v2_label;
use crate::RenderError;

pub(crate) fn dash_rectangle(ctx: &Context, shape: &Labelled) -> Result<(), RenderError> {
    let w = shape.size.width.max(0.0);
    let h = shape.size.height.max(0.0);

    let points = [
        Position::new(0.0, 0.0),
        Position::new(w, 0.0),
        Position::new(w, h),
        Position::new(0.0, h),
    ];
    finalize_geo_path(ctx, &points, &shape.base.style)
}

pub fn finalize_geo_rectangle(
    ctx: &Context,
    id: &str,
    shape: &Labelled,
) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing rectangle (geo)");

    ctx.rotate(shape.rotation);

    if shape.base.style.dash == DashStyle::Draw {
        let stroke_points = rectangle_stroke_points(id, shape);
        draw_geo_outline(ctx, &shape.base.style, &stroke_points)?;
    } else {
        dash_rectangle(ctx, shape)?;
    }

    finalize_v2_label(ctx, shape, None)?;
    Ok(())
}
