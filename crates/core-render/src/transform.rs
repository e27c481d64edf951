//! Viewport, slide, and shapes coordinate transforms.
//!
//! Two coordinate regimes cover every renderer: "slide space" (origin at the
//! slide's top-left, units equal the page's native pixels) and "shapes
//! space" (the normalized drawing space annotations are stored in: a
//! 1200-unit square for legacy recordings, 2048x1536 for tldraw). The
//! presentation layer derives a [`Transform`] whenever pan/zoom or the page
//! changes; every other layer applies it fresh each frame.

use cairo::Context;
use core_geom::{Position, Size};

/// Side of the square legacy annotation space.
pub const DRAWING_SIZE: f64 = 1200.0;

/// Tldraw whiteboard drawing space.
pub const TLDRAW_DRAWING_SIZE: Size = Size::new(2048.0, 1536.0);

/// The derived transform for one (page size, viewport, pan, zoom) state.
///
/// Invariants: `scale > 0`, `shapes_scale > 0`, `size` is the visible slide
/// portion in page pixels, and `padding` centres the scaled slide in the
/// viewport (one axis is always 0 or positive on both sides).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Letterbox border between viewport edge and slide, in viewport pixels.
    pub padding: Size,
    /// Slide-space to viewport-space scale factor.
    pub scale: f64,
    /// Visible slide portion, in page pixels.
    pub size: Size,
    /// Where the viewport's top-left sits on the slide, in page pixels.
    pub pos: Position,
    /// Shapes-space to slide-space scale factor.
    pub shapes_scale: f64,
    /// The slide's size expressed in shapes-space units.
    pub shapes_size: Size,
}

impl Transform {
    /// A mostly-valid identity transform for before the first presentation
    /// event arrives.
    pub fn initial(viewport: Size, tldraw_whiteboard: bool) -> Self {
        Self {
            padding: Size::new(0.0, 0.0),
            scale: 1.0,
            size: viewport,
            pos: Position::new(-0.0, -0.0),
            shapes_scale: 1.0,
            shapes_size: if tldraw_whiteboard {
                TLDRAW_DRAWING_SIZE
            } else {
                Size::new(DRAWING_SIZE, DRAWING_SIZE)
            },
        }
    }

    /// Derive the transform for a page shown in a viewport under the given
    /// pan and zoom. `tldraw_whiteboard` picks the drawing space and the pan
    /// interpretation.
    pub fn derive(
        page_size: Size,
        viewport: Size,
        pan: Position,
        zoom: Size,
        tldraw_whiteboard: bool,
    ) -> Self {
        // The visible portion of the slide; zoom components are in (0, 1].
        let size = Size::new(page_size.width * zoom.width, page_size.height * zoom.height);
        // Scale that fits the visible portion inside the viewport.
        let scale = (viewport.width / size.width).min(viewport.height / size.height);
        let scaled_size = size * scale;

        let padding = Size::new(
            (viewport.width - scaled_size.width) / 2.0,
            (viewport.height - scaled_size.height) / 2.0,
        );

        let (shapes_scale, pos) = if tldraw_whiteboard {
            let shapes_scale = (page_size.height / TLDRAW_DRAWING_SIZE.height)
                .max(page_size.width / TLDRAW_DRAWING_SIZE.width);
            // Tldraw pan is an absolute camera offset in shapes space.
            (
                shapes_scale,
                Position::new(-pan.x * shapes_scale, -pan.y * shapes_scale),
            )
        } else {
            let shapes_scale =
                (page_size.width / DRAWING_SIZE).max(page_size.height / DRAWING_SIZE);
            // Legacy pan is a fraction of the page.
            (
                shapes_scale,
                Position::new(page_size.width * -pan.x, page_size.height * -pan.y),
            )
        };
        let shapes_size = page_size / shapes_scale;

        Self {
            padding,
            scale,
            size,
            pos,
            shapes_scale,
            shapes_size,
        }
    }
}

/// Install the viewport-to-slide transform: translate past the letterbox,
/// scale, clip to the visible slide rectangle, then pan.
pub fn apply_slide_transform(ctx: &Context, t: &Transform) {
    ctx.translate(t.padding.width, t.padding.height);
    ctx.scale(t.scale, t.scale);
    ctx.rectangle(0.0, 0.0, t.size.width, t.size.height);
    ctx.clip();
    ctx.translate(-t.pos.x, -t.pos.y);
}

/// Install the viewport-to-shapes transform. Returns the slide size in
/// shapes-space units for callers that scale normalized coordinates.
pub fn apply_shapes_transform(ctx: &Context, t: &Transform) -> Size {
    apply_slide_transform(ctx, t);
    ctx.scale(t.shapes_scale, t.shapes_scale);
    t.shapes_size
}

/// Clip to the slide rectangle without leaving the scale applied; the legacy
/// cursor is positioned against the clip extents in viewport pixels.
pub fn apply_legacy_cursor_transform(ctx: &Context, t: &Transform) -> Result<(), cairo::Error> {
    ctx.translate(t.padding.width, t.padding.height);
    ctx.save()?;
    ctx.scale(t.scale, t.scale);
    ctx.rectangle(0.0, 0.0, t.size.width, t.size.height);
    ctx.restore()?;
    ctx.clip();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(960.0, 720.0);

    #[test]
    fn four_by_three_page_fills_viewport() {
        let t = Transform::derive(
            Size::new(1600.0, 1200.0),
            VIEWPORT,
            Position::new(0.0, 0.0),
            Size::new(1.0, 1.0),
            false,
        );
        assert!((t.scale - 0.6).abs() < 1e-12);
        assert_eq!(t.padding, Size::new(0.0, 0.0));
        assert_eq!(t.size, Size::new(1600.0, 1200.0));
        // 1600x1200 over a 1200 square: scale by the larger ratio.
        assert!((t.shapes_scale - 1600.0 / 1200.0).abs() < 1e-12);
        assert!((t.shapes_size.width - 1200.0).abs() < 1e-12);
        assert!((t.shapes_size.height - 900.0).abs() < 1e-12);
    }

    #[test]
    fn wide_page_letterboxes_vertically() {
        let t = Transform::derive(
            Size::new(1920.0, 540.0),
            VIEWPORT,
            Position::new(0.0, 0.0),
            Size::new(1.0, 1.0),
            false,
        );
        assert_eq!(t.padding.width, 0.0);
        assert!(t.padding.height > 0.0);
        let shown_height = t.size.height * t.scale;
        assert!((t.padding.height * 2.0 + shown_height - VIEWPORT.height).abs() < 1e-9);
    }

    #[test]
    fn zoom_shrinks_the_visible_portion() {
        let page = Size::new(1600.0, 1200.0);
        let t = Transform::derive(
            page,
            VIEWPORT,
            Position::new(0.25, 0.25),
            Size::new(0.5, 0.5),
            false,
        );
        assert_eq!(t.size, Size::new(800.0, 600.0));
        assert!((t.scale - 1.2).abs() < 1e-12);
        // Legacy pan is a page fraction.
        assert_eq!(t.pos, Position::new(-400.0, -300.0));
    }

    #[test]
    fn tldraw_pan_is_scaled_by_shapes_scale() {
        let page = Size::new(1024.0, 768.0);
        let t = Transform::derive(
            page,
            VIEWPORT,
            Position::new(100.0, 50.0),
            Size::new(1.0, 1.0),
            true,
        );
        assert!((t.shapes_scale - 0.5).abs() < 1e-12);
        assert_eq!(t.pos, Position::new(-50.0, -25.0));
        assert_eq!(t.shapes_size, Size::new(2048.0, 1536.0));
    }

    #[test]
    fn initial_transform_picks_the_drawing_space() {
        assert_eq!(
            Transform::initial(VIEWPORT, false).shapes_size,
            Size::new(DRAWING_SIZE, DRAWING_SIZE)
        );
        assert_eq!(
            Transform::initial(VIEWPORT, true).shapes_size,
            TLDRAW_DRAWING_SIZE
        );
    }
}
