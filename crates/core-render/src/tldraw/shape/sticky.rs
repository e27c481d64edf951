//! v1 sticky note.

use cairo::Context;
use tracing::debug;

use core_geom::Size;
use core_shapes::{sticky_fill_color, ColorStyle, StickyShape};

use crate::tldraw::draw_utils::rounded_rect;
use crate::tldraw::shape::apply_shape_rotation;
use crate::tldraw::shape::text::finalize_sticky_text;
use crate::RenderError;

pub fn finalize_sticky(ctx: &Context, id: &str, shape: &StickyShape) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing sticky");

    apply_shape_rotation(ctx, shape.size, shape.rotation);

    // White and black notes render on the yellow paper.
    let mut color = shape.base.style.color;
    if color == ColorStyle::White || color == ColorStyle::Black {
        color = ColorStyle::Yellow;
    }
    let fill = sticky_fill_color(color);

    // A blurred shadow is expensive; an offset drop shadow plus border reads
    // the same at slide scale.
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

    ctx.set_source_rgb(fill.r, fill.g, fill.b);
    ctx.fill()?;

    let mut recolored = shape.clone();
    recolored.base.style.color = color;
    finalize_sticky_text(ctx, &recolored)
}
