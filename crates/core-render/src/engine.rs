//! The frame scheduler.
//!
//! The engine owns presentation time. Each tick drains every event whose
//! timestamp is at or before the current `pts`, dispatching it to all layers
//! that consume the kind (one event may touch several layers), then runs the
//! two-phase finalize/composite contract and pushes the frame bytes to the
//! encoder.
//!
//! Invariants:
//! - `pts` is exactly `frame_index * framestep`; rational arithmetic, no
//!   accumulated float error.
//! - Events dispatch in timestamp order; ties keep document order.
//! - A frame is pushed for every tick inside the recorded window, changed
//!   or not (the encoder's decimation filter drops duplicates).

use std::collections::VecDeque;
use std::path::PathBuf;

use cairo::{Context, Format, ImageSurface};
use num_rational::Rational64;
use num_traits::Zero;
use tracing::{debug, info, trace};

use core_encoder::Encoder;
use core_events::{Event, EventKind, ParsedEvents, Timestamp};
use core_geom::Size;

use crate::cursor::CursorLayer;
use crate::presentation::PresentationLayer;
use crate::tldraw::TldrawLayer;
use crate::whiteboard::ShapesLayer;
use crate::{RenderError, DRAWING_BG};

/// Everything the engine needs to know about the job.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Recording directory (events.xml plus presentation assets).
    pub input: PathBuf,
    pub width: i32,
    pub height: i32,
    pub framerate: Rational64,
    /// Clip the output to this window of the recording, in seconds.
    pub start_time: Option<Rational64>,
    pub end_time: Option<Rational64>,
    /// Only events for this pod are rendered.
    pub pod_id: String,
    /// Bundled logo PDF shown when no presentation is active.
    pub logo: Option<PathBuf>,
}

pub struct RenderEngine {
    events: VecDeque<Event>,
    length: Timestamp,
    start_time: Timestamp,
    pod_id: String,

    surface: ImageSurface,
    /// Scratch surface the finished frame is copied through; it has no
    /// long-lived context so its bytes can be borrowed each frame.
    copy_surface: ImageSurface,
    ctx: Context,

    presentation: PresentationLayer,
    shapes: ShapesLayer,
    tldraw: TldrawLayer,
    cursor: CursorLayer,

    frame: u64,
    framestep: Rational64,
    pts: Rational64,
    recording: bool,
}

impl RenderEngine {
    pub fn new(config: EngineConfig, parsed: ParsedEvents) -> Result<Self, RenderError> {
        let surface = ImageSurface::create(Format::Rgb24, config.width, config.height)?;
        let copy_surface = ImageSurface::create(Format::Rgb24, config.width, config.height)?;
        let ctx = Context::new(&surface)?;

        // Font rendering options for everything drawn on the frame.
        let mut font_options = cairo::FontOptions::new()?;
        font_options.set_antialias(cairo::Antialias::Gray);
        font_options.set_hint_style(cairo::HintStyle::None);
        ctx.set_font_options(&font_options);

        let size = Size::new(config.width as f64, config.height as f64);
        let tldraw_whiteboard = parsed.gates.tldraw_whiteboard;

        let presentation = PresentationLayer::new(
            ctx.clone(),
            &config.input,
            size,
            parsed.hide_logo,
            config.logo.clone(),
            tldraw_whiteboard,
        );
        let transform = presentation.transform();
        let shapes = ShapesLayer::new(ctx.clone(), transform);
        let tldraw = TldrawLayer::new(ctx.clone(), transform, parsed.gates.tldraw_v2);
        let cursor = CursorLayer::new(ctx.clone(), size, tldraw_whiteboard);

        // Only the section within [start, end] lands in the output.
        let start_time = config.start_time.unwrap_or_else(Rational64::zero);
        let mut length = parsed.length;
        if let Some(end_time) = config.end_time {
            if end_time < length {
                length = end_time;
            }
        }

        Ok(Self {
            events: parsed.events,
            length,
            start_time,
            pod_id: config.pod_id,
            surface,
            copy_surface,
            ctx,
            presentation,
            shapes,
            tldraw,
            cursor,
            frame: 1,
            framestep: Rational64::new(1, 1) / config.framerate,
            pts: Rational64::zero(),
            recording: false,
        })
    }

    fn update_record(&mut self, status: bool) {
        if self.recording != status {
            self.recording = status;
            info!(target: "render.engine", recording = status, "recording");
        }
    }

    fn dispatch(&mut self, event: Event) {
        trace!(
            target: "render.engine",
            timestamp = %event.timestamp,
            name = event.kind.name(),
            "event"
        );

        // Skip per-pod events addressed to another pod.
        if let Some(pod_id) = event.kind.pod_id() {
            if pod_id != self.pod_id {
                debug!(target: "render.engine", %pod_id, "skipping event for other pod");
                return;
            }
        }

        self.tldraw.update(&event);

        match &event.kind {
            EventKind::Cursor(e) => self.cursor.update_cursor(e),
            EventKind::WhiteboardCursor(e) => self.cursor.update_cursor_v2(e),
            EventKind::PanZoom(e) => self.presentation.update_pan_zoom(e),
            EventKind::Presentation(e) => {
                self.presentation.update_presentation(e);
                self.shapes.update_presentation(e);
                self.cursor.update_presentation(e);
            }
            EventKind::Slide(e) => {
                self.presentation.update_slide(e);
                self.shapes.update_slide(e);
                self.cursor.update_slide(e);
            }
            EventKind::Shape(e) => {
                self.shapes.update_shape(e);
                self.cursor.update_shape(e);
            }
            EventKind::Undo(e) => self.shapes.update_undo(e),
            EventKind::Clear(e) => self.shapes.update_clear(e),
            EventKind::Record(e) => self.update_record(e.status),
            EventKind::Presenter(e) => self.cursor.update_presenter(e),
            EventKind::Join(e) => self.cursor.update_join(e),
            EventKind::Left(e) => self.cursor.update_left(e),
            // Tldraw adds/deletes went through the tldraw layer above.
            // Camera events are parsed but not consumed; pan/zoom events
            // carry the same information for the recordings we render.
            EventKind::TldrawAddShape(_)
            | EventKind::TldrawDeleteShape(_)
            | EventKind::TldrawCamera(_) => {}
        }
    }

    /// Render the whole recording, pushing frames to the encoder. Runs to
    /// completion unless the drawing backend or the encoder fails.
    pub fn run(mut self, encoder: &Encoder) -> Result<(), RenderError> {
        while self.pts < self.length {
            // Drain everything that happened up to the current frame time.
            while self
                .events
                .front()
                .is_some_and(|event| event.timestamp <= self.pts)
            {
                if let Some(event) = self.events.pop_front() {
                    self.dispatch(event);
                }
            }

            if self.recording && self.pts >= self.start_time {
                let presentation_changed = self.presentation.finalize_frame()?;
                let transform = self.presentation.transform();
                let shapes_changed = self.shapes.finalize_frame(transform)?;
                let tldraw_changed = self.tldraw.finalize_frame(transform)?;
                let cursor_changed = self.cursor.finalize_frame(transform)?;

                if presentation_changed || shapes_changed || tldraw_changed || cursor_changed {
                    // Composite the frame, background first.
                    let ctx = &self.ctx;
                    ctx.save()?;
                    ctx.set_source_rgb(DRAWING_BG.r, DRAWING_BG.g, DRAWING_BG.b);
                    ctx.paint()?;
                    ctx.restore()?;

                    self.presentation.render()?;
                    self.shapes.render()?;
                    self.tldraw.render()?;
                    self.cursor.render()?;

                    debug!(target: "render.engine", pts = %self.pts, frame = self.frame, "composited frame");
                }

                self.push_frame(encoder)?;
            }

            self.frame += 1;
            self.pts += self.framestep;
        }

        Ok(())
    }

    /// Hand the frame bytes to the encoder. The frame is copied through a
    /// surface with no attached context, which is the only way to borrow
    /// image bytes from cairo while the drawing context stays alive.
    fn push_frame(&mut self, encoder: &Encoder) -> Result<(), RenderError> {
        self.surface.flush();
        {
            let copy_ctx = Context::new(&self.copy_surface)?;
            copy_ctx.set_source_surface(&self.surface, 0.0, 0.0)?;
            copy_ctx.paint()?;
        }
        self.copy_surface.flush();
        let data = self.copy_surface.data()?;
        encoder.put(&data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framestep_is_exact() {
        let framerate = Rational64::new(24000, 1001);
        let framestep = Rational64::new(1, 1) / framerate;
        assert_eq!(framestep, Rational64::new(1001, 24000));

        // 24 steps land exactly on 24 * 1001/24000, no drift.
        let mut pts = Rational64::zero();
        for _ in 0..24 {
            pts += framestep;
        }
        assert_eq!(pts, Rational64::new(24 * 1001, 24000));
    }

    #[test]
    fn frame_count_for_a_short_window() {
        // A 1 second recording at 24000/1001 fps yields 24 frames: pts
        // values 0, step, ..., 23*step are all under 1.0.
        let framerate = Rational64::new(24000, 1001);
        let framestep = Rational64::new(1, 1) / framerate;
        let length = Rational64::new(1, 1);

        let mut frames = 0;
        let mut pts = Rational64::zero();
        while pts < length {
            frames += 1;
            pts += framestep;
        }
        assert_eq!(frames, 24);
    }
}
