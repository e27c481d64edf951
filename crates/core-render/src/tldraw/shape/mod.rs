//! Per-shape finalizers for the tldraw layer.
//!
//! Each module draws one shape family onto a context that is already
//! translated to the shape's origin in shapes space. Rotation happens here,
//! about the shape centre, because it needs the shape's own size.

pub mod arrow;
pub mod arrow_v2;
pub mod draw;
pub mod ellipse;
pub mod frame;
pub mod highlighter;
pub mod line;
pub mod poll;
pub mod rectangle;
pub mod sticky;
pub mod sticky_v2;
pub mod text;
pub mod text_v2;
pub mod triangle;

use cairo::Context;
use core_geom::Size;

/// Rotate about the shape's centre.
pub fn apply_shape_rotation(ctx: &Context, size: Size, rotation: f64) {
    let x = size.width / 2.0;
    let y = size.height / 2.0;
    ctx.translate(x, y);
    ctx.rotate(rotation);
    ctx.translate(-x, -y);
}
