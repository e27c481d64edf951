//! Tldraw text layout: shared layout construction plus the v1 text, label,
//! and sticky-text finalizers.
//!
//! Lines are shown one at a time with a line height equal to the font size
//! (CSS `line-height: 1`), replacing pango's natural leading, so wrapped
//! text matches what the whiteboard showed live.

use cairo::Context;
use pango::prelude::*;
use tracing::debug;

use core_geom::{Position, Size};
use core_shapes::{
    font_face, font_size, sticky_font_size, stroke_color, AlignStyle, Style, LETTER_SPACING,
    STICKY_PADDING, STICKY_TEXT_COLOR,
};

use crate::tldraw::shape::apply_shape_rotation;
use crate::RenderError;

use core_shapes::{Labelled, StickyShape, TextShape};

/// Pango resolution so font sizes are plain point values.
const DPI: f64 = 72.0;

/// Build a layout for the given style: face, size x scale, letter spacing,
/// no hyphenation, alignment, optional wrap width.
pub fn create_pango_layout(
    ctx: &Context,
    style: &Style,
    font_size_pt: f64,
    width: Option<f64>,
    padding: f64,
) -> Result<pango::Layout, RenderError> {
    let scale = style.scale;

    let pctx = pangocairo::functions::create_context(ctx);
    pctx.set_round_glyph_positions(false);

    let mut font = pango::FontDescription::new();
    font.set_family(font_face(style.font));
    font.set_size((font_size_pt * scale * pango::SCALE as f64).round() as i32);

    let mut fo = cairo::FontOptions::new()?;
    fo.set_antialias(cairo::Antialias::Gray);
    fo.set_hint_metrics(cairo::HintMetrics::Off);
    fo.set_hint_style(cairo::HintStyle::None);
    pangocairo::functions::context_set_font_options(&pctx, Some(&fo));

    let attrs = pango::AttrList::new();
    attrs.insert(pango::AttrInt::new_letter_spacing(
        (LETTER_SPACING * font_size_pt * scale * pango::SCALE as f64).round() as i32,
    ));
    attrs.insert(pango::AttrInt::new_insert_hyphens(false));

    let layout = pango::Layout::new(&pctx);
    pangocairo::functions::context_set_resolution(&pctx, DPI);
    layout.set_auto_dir(true);
    layout.set_attributes(Some(&attrs));
    layout.set_font_description(Some(&font));

    match style.text_align {
        AlignStyle::Start => layout.set_alignment(pango::Alignment::Left),
        AlignStyle::Middle => layout.set_alignment(pango::Alignment::Center),
        AlignStyle::End => layout.set_alignment(pango::Alignment::Right),
        AlignStyle::Justify => {
            layout.set_alignment(pango::Alignment::Left);
            layout.set_justify(true);
        }
    }

    if let Some(width) = width {
        layout.set_width(((width - padding * 2.0) * pango::SCALE as f64).ceil() as i32);
    }
    layout.set_wrap(pango::WrapMode::WordChar);

    Ok(layout)
}

/// Show a layout line by line with CSS-style line height (line height equals
/// the font size; leading split half above, half below the line).
pub fn show_layout_by_lines(ctx: &Context, layout: &pango::Layout, padding: f64) -> Result<(), RenderError> {
    let line_height = layout
        .font_description()
        .map(|f| f.size() as f64 / pango::SCALE as f64)
        .unwrap_or_default();

    ctx.save()?;
    ctx.translate(padding, padding);
    let mut iter = layout.iter();
    loop {
        // Layout-level extents position the line horizontally.
        let (_ink, logical) = iter.line_extents();
        let offset_x = logical.x() as f64 / pango::SCALE as f64;

        if let Some(line) = iter.line_readonly() {
            // Line-level extents position the baseline: y is how far the
            // font extends above the baseline (negative), height its
            // natural line height.
            let (_ink, logical) = line.extents();
            let logical_y = logical.y() as f64 / pango::SCALE as f64;
            let logical_height = logical.height() as f64 / pango::SCALE as f64;
            let offset_y = -logical_y + (line_height - logical_height) / 2.0;

            ctx.save()?;
            ctx.translate(offset_x, offset_y);
            pangocairo::functions::show_layout_line(ctx, &line);
            ctx.restore()?;
        }

        ctx.translate(0.0, line_height);
        if !iter.next_line() {
            break;
        }
    }
    ctx.restore()?;
    Ok(())
}

/// Layout size under the same CSS line-height rule, plus padding.
pub fn get_layout_size(layout: &pango::Layout, padding: f64) -> Size {
    let (width, _) = layout.size();
    let width = width as f64 / pango::SCALE as f64;
    let lines = layout.line_count() as f64;
    let line_height = layout
        .font_description()
        .map(|f| f.size() as f64 / pango::SCALE as f64)
        .unwrap_or_default();
    Size::new(width + padding * 2.0, lines * line_height + padding * 2.0)
}

pub fn finalize_text(ctx: &Context, id: &str, shape: &TextShape) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing text");

    apply_shape_rotation(ctx, shape.size, shape.rotation);

    let style = &shape.base.style;
    let stroke = stroke_color(style.color);

    let layout = create_pango_layout(ctx, style, font_size(style.size), None, 0.0)?;
    layout.set_text(&shape.text);

    ctx.set_source_rgb(stroke.r, stroke.g, stroke.b);
    show_layout_by_lines(ctx, &layout, 4.0)
}

/// Draw a shape's centred label. Returns the label size and the scale that
/// was applied; shapes that must fit the label into limited space (arrows)
/// pass a `scale` callback mapping the label size to a shrink factor.
pub fn finalize_label(
    ctx: &Context,
    shape: &Labelled,
    offset: Option<Position>,
    scale: Option<&dyn Fn(Size) -> f64>,
) -> Result<(Size, f64), RenderError> {
    let Some(label) = shape.label.as_deref().filter(|l| !l.is_empty()) else {
        return Ok((Size::new(16.0, 32.0), 1.0));
    };

    debug!(target: "render.tldraw", "finalizing label");

    // Label text is always centred.
    let mut style = shape.base.style.clone();
    style.text_align = AlignStyle::Middle;
    let stroke = stroke_color(style.color);

    ctx.save()?;

    let layout = create_pango_layout(ctx, &style, font_size(style.size), None, 0.0)?;
    layout.set_text(label);

    let mut label_size = get_layout_size(&layout, 4.0);
    let mut scale_adj = 1.0;
    if let Some(scale) = scale {
        scale_adj = scale(label_size);
        label_size = label_size * scale_adj;
    }

    let bounds = shape.size;
    let offset = offset.unwrap_or_else(|| shape.label_offset());
    let x = bounds.width / 2.0 - label_size.width / 2.0 + offset.x;
    let y = bounds.height / 2.0 - label_size.height / 2.0 + offset.y;
    ctx.translate(x, y);

    if scale.is_some() {
        ctx.scale(scale_adj, scale_adj);
        pangocairo::functions::update_context(ctx, &layout.context());
        layout.context_changed();
    }

    ctx.set_source_rgb(stroke.r, stroke.g, stroke.b);
    show_layout_by_lines(ctx, &layout, 4.0)?;

    ctx.restore()?;
    Ok((label_size, scale_adj))
}

pub fn finalize_sticky_text(ctx: &Context, shape: &StickyShape) -> Result<(), RenderError> {
    if shape.text.is_empty() {
        return Ok(());
    }

    debug!(target: "render.tldraw", "finalizing sticky text");

    let style = &shape.base.style;
    let layout = create_pango_layout(
        ctx,
        style,
        sticky_font_size(style.size),
        Some(shape.size.width),
        STICKY_PADDING,
    )?;
    layout.set_text(&shape.text);

    ctx.set_source_rgb(STICKY_TEXT_COLOR.r, STICKY_TEXT_COLOR.g, STICKY_TEXT_COLOR.b);
    show_layout_by_lines(ctx, &layout, STICKY_PADDING)
}
