//! Frame rendering: layers, transforms, and the frame scheduler.
//!
//! Rendering is organized as four layers over a shared viewport, composited
//! background-first: presentation (slide raster), legacy annotations, tldraw
//! annotations, cursors. Each layer follows a two-phase "finalize" contract:
//! phase one rebuilds the layer's cached pattern when the layer is dirty or
//! the transform changed, returning whether anything changed; phase two
//! paints the cached pattern onto the frame. The [`engine`] owns presentation
//! time, drains events into the layers, and pushes finished frames to the
//! encoder.
//!
//! Invariants:
//! - Layer update methods never fail on content; they set a dirty flag.
//!   `Result`s here carry drawing-backend errors only.
//! - Every `push_group` is paired with `pop_group` on every path.
//! - Layers never store viewport coordinates; shapes keep their native
//!   coordinates and the transform is re-derived each frame.

pub mod cursor;
pub mod engine;
pub mod presentation;
pub mod raster;
pub mod tldraw;
pub mod transform;
pub mod whiteboard;

use thiserror::Error;

pub use engine::{EngineConfig, RenderEngine};
pub use transform::{Transform, DRAWING_SIZE, TLDRAW_DRAWING_SIZE};

/// Background color of every composited frame.
pub const DRAWING_BG: core_geom::Color = core_geom::Color::from_int(0xE2E8ED);

/// Fatal rendering failures: drawing-backend errors and encoder breakdowns.
/// Missing assets and malformed content are not errors; they degrade to
/// background-only frames.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("drawing backend error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("could not borrow frame surface data: {0}")]
    SurfaceData(#[from] cairo::BorrowError),

    #[error("encoder failed: {0}")]
    Encoder(#[from] core_encoder::EncoderError),
}
