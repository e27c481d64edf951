//! Geo directional arrows (up/down/left/right block arrows).

use cairo::Context;
use tracing::debug;

use core_geom::freehand::{get_stroke_points, StrokeOptions, StrokePoint};
use core_geom::{vec, Position};
use core_shapes::{stroke_width, DashStyle, GeoKind, Labelled};

use crate::tldraw::draw_utils::finalize_geo_path;
use crate::tldraw::geo::draw_geo_outline;
use crate::tldraw::rng::ShapeRng;
use crate::tldraw::shape::text_v2::finalize_v2_label;
use crate::RenderError;

/// The seven corners of the block arrow pointing in the shape's direction.
fn arrow_vertices(geo: GeoKind, w: f64, h: f64) -> [Position; 7] {
    match geo {
        GeoKind::ArrowUp => {
            let oy = w.min(h) * 0.38;
            let ox = w * 0.16;
            [
                Position::new(w / 2.0, 0.0),
                Position::new(w, oy),
                Position::new(w - ox, oy),
                Position::new(w - ox, h),
                Position::new(ox, h),
                Position::new(ox, oy),
                Position::new(0.0, oy),
            ]
        }
        GeoKind::ArrowDown => {
            let oy = w.min(h) * 0.38;
            let ox = w * 0.16;
            [
                Position::new(ox, 0.0),
                Position::new(w - ox, 0.0),
                Position::new(w - ox, h - oy),
                Position::new(w, h - oy),
                Position::new(w / 2.0, h),
                Position::new(0.0, h - oy),
                Position::new(ox, h - oy),
            ]
        }
        GeoKind::ArrowLeft => {
            let ox = w.min(h) * 0.38;
            let oy = h * 0.16;
            [
                Position::new(ox, 0.0),
                Position::new(ox, oy),
                Position::new(w, oy),
                Position::new(w, h - oy),
                Position::new(ox, h - oy),
                Position::new(ox, h),
                Position::new(0.0, h / 2.0),
            ]
        }
        _ => {
            let ox = w.min(h) * 0.38;
            let oy = h * 0.16;
            [
                Position::new(0.0, oy),
                Position::new(w - ox, oy),
                Position::new(w - ox, 0.0),
                Position::new(w, h / 2.0),
                Position::new(w - ox, h),
                Position::new(w - ox, h - oy),
                Position::new(0.0, h - oy),
            ]
        }
    }
}

fn arrow_geo_stroke_points(id: &str, shape: &Labelled) -> Vec<StrokePoint> {
    let mut random = ShapeRng::new(id);
    let sw = stroke_width(shape.base.style.size);

    let w = shape.size.width.max(0.0);
    let h = shape.size.height.max(0.0);
    let variation = sw * 0.75;

    let v: Vec<(f64, f64)> = arrow_vertices(shape.geo, w, h)
        .iter()
        .map(|p| (p.x + random.uniform(variation), p.y + random.uniform(variation)))
        .collect();

    let rm = random.randrange(4);
    let p = 8.max((w / 16.0).floor() as usize);

    let mut lines: Vec<Vec<(f64, f64, f64)>> = (0..v.len())
        .map(|i| vec::points_between(v[i], v[(i + 1) % v.len()], p))
        .collect();
    lines.rotate_left(rm);

    let mut points: Vec<(f64, f64, f64)> = Vec::new();
    for line in &lines {
        points.extend_from_slice(line);
    }
    points.extend_from_slice(&lines[0]);

    let trim_end = lines[0].len().div_ceil(2).saturating_sub(3);
    let end = points.len() - trim_end;
    let sliced = if 5 < end { &points[5..end] } else { &points[..] };

    get_stroke_points(
        sliced,
        &StrokeOptions {
            size: sw,
            streamline: 0.3,
            last: true,
            ..Default::default()
        },
    )
}

pub fn finalize_geo_arrow(ctx: &Context, id: &str, shape: &Labelled) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, geo = ?shape.geo, "finalizing arrow (geo)");

    ctx.rotate(shape.rotation);

    if shape.base.style.dash == DashStyle::Draw {
        let stroke_points = arrow_geo_stroke_points(id, shape);
        draw_geo_outline(ctx, &shape.base.style, &stroke_points)?;
    } else {
        let w = shape.size.width.max(0.0);
        let h = shape.size.height.max(0.0);
        let points = arrow_vertices(shape.geo, w, h);
        finalize_geo_path(ctx, &points, &shape.base.style)?;
    }

    finalize_v2_label(ctx, shape, None)?;
    Ok(())
}
