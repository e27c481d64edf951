//! Tldraw poll-result chart.

use cairo::{Context, LineCap, LineJoin};
use pango::prelude::*;
use tracing::debug;

use core_geom::Color;
use core_shapes::{fill_color, stroke_color, PollShape};

use crate::tldraw::shape::apply_shape_rotation;
use crate::RenderError;

const FONT_FAMILY: &str = "Arial";
const POLL_LINE_WIDTH: f64 = 2.0;
const POLL_FONT_SIZE: f64 = 18.0;
const POLL_VPADDING: f64 = 8.0;
const POLL_HPADDING: f64 = 8.0;
const POLL_TEXT_COLOR: Color = Color::from_int(0x0D0D0D);

pub fn finalize_poll(ctx: &Context, id: &str, shape: &PollShape) -> Result<(), RenderError> {
    debug!(target: "render.tldraw", %id, "finalizing poll");

    if shape.answers.is_empty() {
        return Ok(());
    }

    apply_shape_rotation(ctx, shape.size, shape.rotation);

    let width = shape.size.width;
    let height = shape.size.height;
    let solid = stroke_color(shape.base.style.color);
    let semi = fill_color(shape.base.style.color);

    ctx.set_line_join(LineJoin::Miter);
    ctx.set_line_cap(LineCap::Square);

    // Background and outline.
    let half_lw = POLL_LINE_WIDTH / 2.0;
    ctx.set_line_width(POLL_LINE_WIDTH);
    ctx.move_to(half_lw, half_lw);
    ctx.line_to(width - half_lw, half_lw);
    ctx.line_to(width - half_lw, height - half_lw);
    ctx.line_to(half_lw, height - half_lw);
    ctx.close_path();
    ctx.set_source_rgb(semi.r, semi.g, semi.b);
    ctx.fill_preserve()?;
    ctx.set_source_rgb(solid.r, solid.g, solid.b);
    ctx.stroke()?;

    let mut font = pango::FontDescription::new();
    font.set_family(FONT_FAMILY);
    font.set_absolute_size(POLL_FONT_SIZE * pango::SCALE as f64);

    let pctx = pangocairo::functions::create_context(ctx);
    let layout = pango::Layout::new(&pctx);
    layout.set_font_description(Some(&font));

    // Measure the label and percentage columns.
    let mut max_label_width = 0.0_f64;
    let mut max_percent_width = 0.0_f64;
    let mut percents = Vec::with_capacity(shape.answers.len());
    for answer in &shape.answers {
        layout.set_text(&answer.key);
        let (label_width, _) = layout.pixel_size();
        max_label_width = max_label_width.max(label_width as f64);
        let percent = if shape.num_responders > 0 {
            format!(
                "{}%",
                (answer.num_votes as f64 / shape.num_responders as f64 * 100.0) as i64
            )
        } else {
            "0%".to_owned()
        };
        layout.set_text(&percent);
        let (percent_width, _) = layout.pixel_size();
        max_percent_width = max_percent_width.max(percent_width as f64);
        percents.push(percent);
    }

    let max_label_width = max_label_width.min(width * 0.3);
    let max_percent_width = max_percent_width.min(width * 0.3);

    let mut title_height = 0.0;
    if !shape.question_text.is_empty() {
        title_height = POLL_FONT_SIZE + POLL_VPADDING;
    }

    let bar_height =
        (height - POLL_VPADDING - title_height) / shape.answers.len() as f64 - POLL_VPADDING;
    let bar_width = width - 4.0 * POLL_HPADDING - max_label_width - max_percent_width;
    let bar_x = 2.0 * POLL_HPADDING + max_label_width;

    layout.set_ellipsize(pango::EllipsizeMode::End);
    if !shape.question_text.is_empty() {
        layout.set_width(((width - 2.0 * POLL_HPADDING) as i32) * pango::SCALE);
        layout.set_text(&shape.question_text);
        let (title_width, measured_height) = layout.pixel_size();
        ctx.move_to(
            (width - title_width as f64) / 2.0,
            (POLL_FONT_SIZE - measured_height as f64) / 2.0 + POLL_VPADDING,
        );
        ctx.set_source_rgb(POLL_TEXT_COLOR.r, POLL_TEXT_COLOR.g, POLL_TEXT_COLOR.b);
        pangocairo::functions::show_layout(ctx, &layout);
    }

    for (i, answer) in shape.answers.iter().enumerate() {
        let bar_y = (bar_height + POLL_VPADDING) * i as f64 + POLL_VPADDING + title_height;
        let result_ratio = if shape.num_responders > 0 {
            answer.num_votes as f64 / shape.num_responders as f64
        } else {
            0.0
        };
        let bar_x2 = bar_x + bar_width * result_ratio;

        // The bar.
        ctx.set_line_width(POLL_LINE_WIDTH);
        ctx.move_to(bar_x + half_lw, bar_y + half_lw);
        ctx.line_to((bar_x + half_lw).max(bar_x2 - half_lw), bar_y + half_lw);
        ctx.line_to(
            (bar_x + half_lw).max(bar_x2 - half_lw),
            bar_y + bar_height - half_lw,
        );
        ctx.line_to(bar_x + half_lw, bar_y + bar_height - half_lw);
        ctx.close_path();
        ctx.set_source_rgb(solid.r, solid.g, solid.b);
        ctx.fill_preserve()?;
        ctx.stroke()?;

        // Label and percentage.
        ctx.set_source_rgb(POLL_TEXT_COLOR.r, POLL_TEXT_COLOR.g, POLL_TEXT_COLOR.b);
        layout.set_width((max_label_width * pango::SCALE as f64) as i32);
        layout.set_text(&answer.key);
        let (label_width, label_height) = layout.pixel_size();
        ctx.move_to(
            bar_x - POLL_HPADDING - label_width as f64,
            bar_y + (bar_height - label_height as f64) / 2.0,
        );
        pangocairo::functions::show_layout(ctx, &layout);

        layout.set_width((max_percent_width * pango::SCALE as f64) as i32);
        layout.set_text(&percents[i]);
        let (percent_width, percent_height) = layout.pixel_size();
        ctx.move_to(
            width - POLL_HPADDING - percent_width as f64,
            bar_y + (bar_height - percent_height as f64) / 2.0,
        );
        pangocairo::functions::show_layout(ctx, &layout);

        // Vote count: inside the bar when it fits, after it otherwise.
        layout.set_ellipsize(pango::EllipsizeMode::None);
        layout.set_width(-1);
        layout.set_text(&answer.num_votes.to_string());
        let (votes_width, votes_height) = layout.pixel_size();
        if (votes_width as f64) < bar_x2 - bar_x - 2.0 * POLL_HPADDING {
            ctx.move_to(
                bar_x + (bar_x2 - bar_x - votes_width as f64) / 2.0,
                bar_y + (bar_height - votes_height as f64) / 2.0,
            );
            ctx.set_source_rgb(semi.r, semi.g, semi.b);
            pangocairo::functions::show_layout(ctx, &layout);
        } else {
            ctx.move_to(
                bar_x2 + POLL_HPADDING,
                bar_y + (bar_height - votes_height as f64) / 2.0,
            );
            ctx.set_source_rgb(POLL_TEXT_COLOR.r, POLL_TEXT_COLOR.g, POLL_TEXT_COLOR.b);
            pangocairo::functions::show_layout(ctx, &layout);
        }
        layout.set_ellipsize(pango::EllipsizeMode::End);
    }
    Ok(())
}
