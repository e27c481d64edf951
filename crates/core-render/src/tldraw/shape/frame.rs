//! Frame shape: a bordered box that clips its children.

use cairo::{Context, LineCap, LineJoin};
use tracing::debug;

use core_geom::Position;
use core_shapes::{color, stroke_color, ColorStyle, Labelled, Shape};

use crate::tldraw::shape::text_v2::finalize_frame_name;
use crate::RenderError;

/// Draw the frame body, then render each child clipped to the frame's box.
/// Children carry coordinates relative to the frame, so the caller's
/// translation to the frame origin is all the positioning they need.
pub fn finalize_frame(
    ctx: &Context,
    id: &str,
    shape: &Labelled,
    children: &[(String, Shape)],
    finalize_child: &dyn Fn(&Context, &str, &Shape) -> Result<(), RenderError>,
) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, children = children.len(), "finalizing frame");

    ctx.rotate(shape.rotation);

    let style = &shape.base.style;
    let w = shape.size.width.max(0.0);
    let h = shape.size.height.max(0.0);

    let points = [
        Position::new(0.0, 0.0),
        Position::new(w, 0.0),
        Position::new(w, h),
        Position::new(0.0, h),
    ];

    // Semi-transparent fill.
    let fill = color(ColorStyle::Semi);
    ctx.set_source_rgba(fill.r, fill.g, fill.b, style.opacity);

    ctx.move_to(points[0].x, points[0].y);
    for point in &points[1..] {
        ctx.line_to(point.x, point.y);
    }
    ctx.close_path();
    ctx.fill_preserve()?;

    // Black border.
    let stroke = stroke_color(ColorStyle::Black);
    ctx.set_line_width(2.0);
    ctx.set_line_cap(LineCap::Round);
    ctx.set_line_join(LineJoin::Round);
    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
    ctx.stroke()?;

    // Children are clipped inside the frame box.
    ctx.save()?;
    ctx.new_path();
    ctx.move_to(0.0, 0.0);
    ctx.line_to(w, 0.0);
    ctx.line_to(w, h);
    ctx.line_to(0.0, h);
    ctx.close_path();
    ctx.clip();

    for (child_id, child) in children {
        finalize_child(ctx, child_id, child)?;
    }

    ctx.restore()?;

    finalize_frame_name(ctx, shape)?;
    Ok(())
}
