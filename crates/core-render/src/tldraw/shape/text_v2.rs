//! v2 text rendering: glyphs get a white halo so they stay readable over
//! slide content, labels align per shape, frames carry a name above the box.

use cairo::Context;
use pango::prelude::*;
use tracing::debug;

use core_geom::{Position, Size};
use core_shapes::{
    font_size, sticky_font_size, stroke_color, AlignStyle, ColorStyle, FontStyle, Labelled,
    StickyShapeV2, TextShape, STICKY_PADDING, STICKY_TEXT_COLOR,
};

use crate::tldraw::shape::text::{create_pango_layout, get_layout_size, show_layout_by_lines};
use crate::RenderError;

const BORDER_THICKNESS: f64 = 2.0;

/// The four diagonal offsets that fake a halo outline.
const BORDER_OFFSETS: [(f64, f64); 4] = [
    (-BORDER_THICKNESS, -BORDER_THICKNESS),
    (BORDER_THICKNESS, -BORDER_THICKNESS),
    (-BORDER_THICKNESS, BORDER_THICKNESS),
    (BORDER_THICKNESS, BORDER_THICKNESS),
];

pub fn finalize_v2_text(ctx: &Context, id: &str, shape: &TextShape) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing text (v2)");

    let style = &shape.base.style;
    ctx.rotate(shape.rotation);

    let stroke = stroke_color(style.color);
    let layout = create_pango_layout(ctx, style, font_size(style.size), None, 0.0)?;
    layout.set_text(&shape.text);

    for (dx, dy) in BORDER_OFFSETS {
        ctx.translate(dx, dy);
        ctx.set_source_rgba(1.0, 1.0, 1.0, 1.0);
        show_layout_by_lines(ctx, &layout, 4.0)?;
        ctx.translate(-dx, -dy);
    }

    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
    show_layout_by_lines(ctx, &layout, 4.0)
}

/// v2 labels are always black over a white halo, horizontally aligned per
/// the shape, vertically per `verticalAlign`.
pub fn finalize_v2_label(
    ctx: &Context,
    shape: &Labelled,
    offset: Option<Position>,
) -> Result<Size, RenderError> {
    let Some(label) = shape.label.as_deref().filter(|l| !l.is_empty()) else {
        return Ok(Size::new(16.0, 32.0));
    };

    debug!(target: "render.tldraw", "finalizing label (v2)");

    let mut style = shape.base.style.clone();
    style.text_align = shape.align;
    let stroke = stroke_color(ColorStyle::Black);

    ctx.save()?;

    let layout = create_pango_layout(
        ctx,
        &style,
        font_size(style.size),
        Some(shape.size.width),
        4.0,
    )?;
    layout.set_text(label);

    let label_size = get_layout_size(&layout, 4.0);
    let bounds = shape.size;
    let offset = offset.unwrap_or_else(|| shape.label_offset());

    let x = offset.x;
    let y = match shape.vertical_align {
        AlignStyle::Start => offset.y,
        AlignStyle::End => bounds.height - label_size.height + offset.y,
        _ => bounds.height / 2.0 - label_size.height / 2.0 + offset.y,
    };

    for (dx, dy) in BORDER_OFFSETS {
        ctx.translate(x + dx, y + dy);
        ctx.set_source_rgba(1.0, 1.0, 1.0, 1.0);
        show_layout_by_lines(ctx, &layout, 4.0)?;
        ctx.translate(-x - dx, -y - dy);
    }

    ctx.translate(x, y);
    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
    show_layout_by_lines(ctx, &layout, 4.0)?;

    ctx.restore()?;
    Ok(label_size)
}

/// The frame's name, drawn just above the frame box in a small UI face.
pub fn finalize_frame_name(ctx: &Context, shape: &Labelled) -> Result<Size, RenderError> {
    let Some(label) = shape.label.as_deref().filter(|l| !l.is_empty()) else {
        return Ok(Size::new(0.0, 0.0));
    };

    debug!(target: "render.tldraw", "finalizing frame name");

    let mut style = shape.base.style.clone();
    style.text_align = AlignStyle::Start;
    style.font = FontStyle::Arial;
    let stroke = stroke_color(ColorStyle::Black);

    ctx.save()?;

    let layout = create_pango_layout(ctx, &style, 15.0, Some(shape.size.width), 0.0)?;
    layout.set_text(label);
    let label_size = get_layout_size(&layout, 4.0);

    ctx.translate(0.0, -20.0);
    ctx.set_source_rgba(stroke.r, stroke.g, stroke.b, style.opacity);
    show_layout_by_lines(ctx, &layout, 4.0)?;

    ctx.restore()?;
    Ok(label_size)
}

pub fn finalize_sticky_text_v2(ctx: &Context, shape: &StickyShapeV2) -> Result<(), RenderError> {
    if shape.text.is_empty() {
        return Ok(());
    }

    debug!(target: "render.tldraw", "finalizing sticky text (v2)");

    let mut style = shape.base.style.clone();
    style.text_align = shape.align;

    let layout = create_pango_layout(
        ctx,
        &style,
        sticky_font_size(style.size),
        Some(shape.size.width),
        STICKY_PADDING,
    )?;
    layout.set_text(&shape.text);

    let text_height = get_layout_size(&layout, STICKY_PADDING).height;
    let y = match shape.vertical_align {
        AlignStyle::Middle => (shape.size.height - text_height) / 2.0,
        AlignStyle::End => shape.size.height - text_height,
        _ => 0.0,
    };
    ctx.translate(0.0, y);

    ctx.set_source_rgba(
        STICKY_TEXT_COLOR.r,
        STICKY_TEXT_COLOR.g,
        STICKY_TEXT_COLOR.b,
        style.opacity,
    );
    show_layout_by_lines(ctx, &layout, STICKY_PADDING)
}
