//! Shared drawing helpers for the tldraw shape finalizers.

use std::f64::consts::TAU;

use cairo::{Context, Format, ImageSurface, LineCap, LineJoin, SurfacePattern};

use core_geom::arcs::bezier_quad_to_cube;
use core_geom::freehand::{get_stroke_points, StrokeOptions, StrokePoint};
use core_geom::vec::{self, V};
use core_geom::{Color, Position, Size};

use core_shapes::{
    color, fill_color, stroke_color, stroke_width, ColorStyle, DashStyle, FillStyle, Style,
    PATTERN_FILL_BACKGROUND_COLOR,
};

use crate::tldraw::rng::ShapeRng;
use crate::RenderError;

/// Resample freehand input with the stroke-width-derived parameters every
/// drawn outline uses.
pub fn draw_stroke_points(
    points: &[(f64, f64, f64)],
    stroke_width: f64,
    is_complete: bool,
) -> Vec<StrokePoint> {
    get_stroke_points(
        points,
        &StrokeOptions {
            size: 1.0 + stroke_width * 1.5,
            streamline: 0.65,
            last: is_complete,
            ..Default::default()
        },
    )
}

/// Dash parameters that come out visually even along a path: at least four
/// on-segments, snapped to a multiple, with equal gaps.
pub fn get_perfect_dash_props(
    length: f64,
    stroke_width: f64,
    style: DashStyle,
    snap: usize,
    outset: bool,
    length_ratio: f64,
) -> (Vec<f64>, f64) {
    let (dash_length, ratio, offset) = match style {
        DashStyle::Dashed => {
            let dash_length = stroke_width * length_ratio;
            (dash_length, 1.0, if outset { dash_length / 2.0 } else { 0.0 })
        }
        // Dots are tiny on-segments stretched round by the line cap.
        DashStyle::Dotted => (stroke_width / 100.0, 100.0, 0.0),
        _ => return (Vec::new(), 0.0),
    };

    let mut dashes = (length / dash_length / (2.0 * ratio)).floor() as i64;
    dashes -= dashes % snap as i64;
    let dashes = dashes.max(4) as f64;

    let gap_length = dash_length
        .max((length - dashes * dash_length) / if outset { dashes } else { dashes - 1.0 });

    (vec![dash_length, gap_length], offset)
}

/// Turn a point list into a path of quadratic curves through segment
/// midpoints, emitted as cubics (cairo has no quadratic operator).
pub fn draw_smooth_path(ctx: &Context, points: &[V], closed: bool) {
    if points.is_empty() {
        return;
    }

    let mut prev_point = points[0];
    let mut prev_mid = if closed {
        vec::med(points[points.len() - 1], prev_point)
    } else {
        prev_point
    };
    ctx.move_to(prev_mid.0, prev_mid.1);

    for point in &points[1..] {
        let mid = vec::med(prev_point, *point);
        let (cp1, cp2) = bezier_quad_to_cube(prev_mid, prev_point, mid);
        ctx.curve_to(cp1.0, cp1.1, cp2.0, cp2.1, mid.0, mid.1);
        prev_point = *point;
        prev_mid = mid;
    }

    let mid = if closed {
        vec::med(prev_point, points[0])
    } else {
        points[points.len() - 1]
    };
    let (cp1, cp2) = bezier_quad_to_cube(prev_mid, prev_point, mid);
    ctx.curve_to(cp1.0, cp1.1, cp2.0, cp2.1, mid.0, mid.1);

    if closed {
        ctx.close_path();
    }
}

/// As [`draw_smooth_path`], over resampled stroke points.
pub fn draw_smooth_stroke_point_path(ctx: &Context, points: &[StrokePoint], closed: bool) {
    let outline: Vec<V> = points.iter().map(|p| p.point).collect();
    draw_smooth_path(ctx, &outline, closed);
}

/// The repeating 8x8 tile behind `pattern` fills: three diagonal ticks on a
/// light background. A tile pattern stays resolution independent under the
/// shapes-space scaling.
pub fn pattern_fill(fill: Color, opacity: f64) -> Result<SurfacePattern, RenderError> {
    let surface = ImageSurface::create(Format::ARgb32, 8, 8)?;
    let ctx = Context::new(&surface)?;

    ctx.set_source_rgba(
        PATTERN_FILL_BACKGROUND_COLOR.r,
        PATTERN_FILL_BACKGROUND_COLOR.g,
        PATTERN_FILL_BACKGROUND_COLOR.b,
        opacity,
    );
    ctx.rectangle(0.0, 0.0, 8.0, 8.0);
    ctx.fill()?;

    ctx.set_line_cap(LineCap::Round);
    ctx.set_source_rgba(fill.r, fill.g, fill.b, opacity);

    for (x1, y1, x2, y2) in [
        (0.66, 2.0, 2.0, 0.66),
        (3.33, 4.66, 4.66, 3.33),
        (6.0, 7.33, 7.33, 6.0),
    ] {
        ctx.move_to(x1, y1);
        ctx.line_to(x2, y2);
    }
    ctx.set_line_width(2.0);
    ctx.stroke()?;

    let pattern = SurfacePattern::create(&surface);
    pattern.set_extend(cairo::Extend::Repeat);
    Ok(pattern)
}

/// Fill the current path per the v2 fill style (semi, pattern, or solid).
pub fn apply_geo_fill(ctx: &Context, style: &Style, preserve_path: bool) -> Result<(), RenderError> {
    match style.fill {
        FillStyle::Semi => {
            let fill = color(ColorStyle::Semi);
            ctx.set_source_rgba(fill.r, fill.g, fill.b, style.opacity);
        }
        FillStyle::Pattern => {
            let pattern = pattern_fill(fill_color(style.color), style.opacity)?;
            ctx.set_source(&pattern)?;
        }
        _ => {
            let fill = fill_color(style.color);
            ctx.set_source_rgba(fill.r, fill.g, fill.b, style.opacity);
        }
    }

    if preserve_path {
        ctx.fill_preserve()?;
    } else {
        ctx.fill()?;
    }
    Ok(())
}

/// Fill and stroke an exact polygon with per-path dash alignment; the
/// non-DRAW geo outline path.
pub fn finalize_geo_path(
    ctx: &Context,
    points: &[Position],
    style: &Style,
) -> Result<(), RenderError> {
    let Some(first) = points.first() else {
        return Ok(());
    };

    if style.is_filled {
        ctx.move_to(first.x, first.y);
        for point in &points[1..] {
            ctx.line_to(point.x, point.y);
        }
        ctx.close_path();
        apply_geo_fill(ctx, style, false)?;
    }

    let stroke = stroke_color(style.color);
    let sw_base = stroke_width(style.size) * 1.618;
    let sw = 1.0 + sw_base;

    ctx.set_line_width(sw);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);

    let mut dist = 0.0;
    ctx.move_to(first.x, first.y);
    for i in 1..points.len() {
        dist += vec::dist(points[i - 1].into(), points[i].into());
        ctx.line_to(points[i].x, points[i].y);
    }
    dist += vec::dist(points[points.len() - 1].into(), (*first).into());
    ctx.close_path();

    let (dash_array, dash_offset) = get_perfect_dash_props(dist, sw_base, style.dash, 1, true, 2.0);
    ctx.set_dash(&dash_array, dash_offset);
    ctx.stroke()?;
    Ok(())
}

/// Vertices of a regular polygon inscribed in the bounding box, shifted so
/// the polygon starts at (0, 0). Each entry is (start, end, length).
pub fn get_polygon_strokes(
    width: f64,
    height: f64,
    sides: usize,
) -> Vec<(Position, Position, f64)> {
    let cx = width / 2.0;
    let cy = height / 2.0;
    let step = TAU / sides as f64;

    let mut strokes: Vec<(Position, Position, f64)> = (0..sides)
        .map(|i| {
            let t = -(TAU / 4.0) + i as f64 * step;
            let next_t = -(TAU / 4.0) + ((i + 1) % sides) as f64 * step;
            let pos1 = Position::new(cx + cx * t.cos(), cy + cy * t.sin());
            let pos2 = Position::new(cx + cx * next_t.cos(), cy + cy * next_t.sin());
            let distance = vec::dist(pos1.into(), pos2.into());
            (pos1, pos2, distance)
        })
        .collect();

    let min_x = strokes
        .iter()
        .map(|s| s.0.x)
        .fold(f64::INFINITY, f64::min);
    let min_y = strokes
        .iter()
        .map(|s| s.0.y)
        .fold(f64::INFINITY, f64::min);
    for stroke in &mut strokes {
        stroke.0 = Position::new(stroke.0.x - min_x, stroke.0.y - min_y);
        stroke.1 = Position::new(stroke.1.x - min_x, stroke.1.y - min_y);
    }

    strokes
}

/// Hand-drawn vertices for a polygon outline: jittered corners, a random
/// starting edge, and interpolated points with simulated pressure.
pub fn get_polygon_draw_vertices(
    strokes: &[(Position, Position, f64)],
    stroke_width: f64,
    id: &str,
) -> Vec<(f64, f64, f64)> {
    let mut random = ShapeRng::new(id);
    let variation = stroke_width * 0.75;

    let v_points: Vec<V> = strokes
        .iter()
        .map(|stroke| {
            (
                stroke.0.x + random.uniform(variation),
                stroke.0.y + random.uniform(variation),
            )
        })
        .collect();

    let rm = random.randrange(v_points.len());

    let mut lines: Vec<Vec<(f64, f64, f64)>> = (0..v_points.len())
        .map(|i| vec::points_between(v_points[i], v_points[(i + 1) % v_points.len()], 32))
        .collect();
    lines.rotate_left(rm);

    let mut points = Vec::new();
    for line in &lines {
        points.extend_from_slice(line);
    }
    // Wrap around so the stroke does not end on a sharp corner.
    points.extend_from_slice(&lines[0]);
    points
}

/// A rounded rectangle path from (0, 0) to `size`.
pub fn rounded_rect(ctx: &Context, size: Size, radius: f64) {
    ctx.new_sub_path();
    ctx.arc(size.width - radius, radius, radius, -TAU / 4.0, 0.0);
    ctx.arc(size.width - radius, size.height - radius, radius, 0.0, TAU / 4.0);
    ctx.arc(radius, size.height - radius, radius, TAU / 4.0, TAU / 2.0);
    ctx.arc(radius, radius, radius, TAU / 2.0, -TAU / 4.0);
    ctx.close_path();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashed_props_fit_at_least_four_segments() {
        let (dash, offset) = get_perfect_dash_props(100.0, 2.0, DashStyle::Dashed, 1, true, 2.0);
        assert_eq!(dash.len(), 2);
        assert_eq!(dash[0], 4.0);
        // Outset dashes start half a dash in.
        assert_eq!(offset, 2.0);
        let segments = (100.0 / (dash[0] + dash[1])).floor();
        assert!(segments >= 4.0);
    }

    #[test]
    fn dotted_props_use_near_zero_on_length() {
        let (dash, offset) = get_perfect_dash_props(100.0, 3.0, DashStyle::Dotted, 1, true, 2.0);
        assert_eq!(dash[0], 0.03);
        assert!(dash[1] > dash[0]);
        assert_eq!(offset, 0.0);
    }

    #[test]
    fn draw_and_solid_have_no_dashes() {
        assert_eq!(
            get_perfect_dash_props(50.0, 2.0, DashStyle::Draw, 1, true, 2.0),
            (Vec::new(), 0.0)
        );
        assert_eq!(
            get_perfect_dash_props(50.0, 2.0, DashStyle::Solid, 1, true, 2.0),
            (Vec::new(), 0.0)
        );
    }

    #[test]
    fn snap_rounds_the_dash_count_down() {
        // length 100, sw 2: raw dashes = floor(100 / 4 / 2) = 12; snap 4 keeps 12,
        // snap 5 drops to 10.
        let (dash_a, _) = get_perfect_dash_props(100.0, 2.0, DashStyle::Dashed, 4, true, 2.0);
        let (dash_b, _) = get_perfect_dash_props(100.0, 2.0, DashStyle::Dashed, 5, true, 2.0);
        assert!(dash_b[1] >= dash_a[1]);
    }

    #[test]
    fn polygon_strokes_touch_the_origin() {
        let strokes = get_polygon_strokes(100.0, 80.0, 6);
        assert_eq!(strokes.len(), 6);
        let min_x = strokes.iter().map(|s| s.0.x).fold(f64::INFINITY, f64::min);
        let min_y = strokes.iter().map(|s| s.0.y).fold(f64::INFINITY, f64::min);
        assert!(min_x.abs() < 1e-9);
        assert!(min_y.abs() < 1e-9);
    }

    #[test]
    fn polygon_draw_vertices_are_deterministic() {
        let strokes = get_polygon_strokes(100.0, 80.0, 5);
        let a = get_polygon_draw_vertices(&strokes, 2.0, "shape:star");
        let b = get_polygon_draw_vertices(&strokes, 2.0, "shape:star");
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }
}
