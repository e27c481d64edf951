//! v2 sticky note; supports vertical alignment and grown height.

use cairo::Context;
use tracing::debug;

use core_geom::Size;
use core_shapes::{sticky_fill_color, ColorStyle, StickyShapeV2};

use crate::tldraw::draw_utils::rounded_rect;
use crate::tldraw::shape::text_v2::finalize_sticky_text_v2;
use crate::RenderError;

pub fn finalize_sticky_v2(
    ctx: &Context,
    id: &str,
    shape: &StickyShapeV2,
) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing sticky (v2)");

    // Black notes render on the yellow paper; white has its own fill in v2.
    let mut color = shape.base.style.color;
    if color == ColorStyle::Black {
        color = ColorStyle::Yellow;
    }
    let fill = sticky_fill_color(color);
    let opacity = shape.base.style.opacity;

    ctx.rotate(shape.rotation);

    // Offset drop shadow plus border instead of a blur.
    ctx.save()?;
    ctx.translate(-1.0, -1.0);
    let blur_size = Size::new(shape.size.width + 3.0, shape.size.height + 3.0);
    rounded_rect(ctx, blur_size, 5.0);
    ctx.set_source_rgba(0.0, 0.0, 0.0, 0.15);
    ctx.fill()?;
    ctx.restore()?;

    rounded_rect(ctx, shape.size, 3.0);
    ctx.set_source_rgba(0.0, 0.0, 0.0, 0.15);
    ctx.set_line_width(2.0);
    ctx.stroke_preserve()?;

    ctx.set_source_rgba(fill.r, fill.g, fill.b, opacity);
    ctx.fill()?;

    let mut recolored = shape.clone();
    recolored.base.style.color = color;
    finalize_sticky_text_v2(ctx, &recolored)
}
