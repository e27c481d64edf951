//! Presentation (slide) layer.
//!
//! Tracks the current presentation, per-presentation last-viewed slide, and
//! pan/zoom; owns the source document (PDF or raster image) and the derived
//! [`Transform`] every other layer consumes. The current page is rasterized
//! into a cached pattern only when something changed.
//!
//! Asset failures are not errors: a missing file, an unloadable document, or
//! an out-of-range page degrade to an empty pattern (frames show only the
//! background), matching the recoverable-asset policy.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cairo::{Context, Format, ImageSurface, Pattern, SurfacePattern};
use tracing::{debug, info, warn};

use core_events::{PanZoomEvent, PresentationEvent, SlideEvent};
use core_geom::{Position, Size};

use crate::raster::{self, RasterPage};
use crate::transform::{apply_slide_transform, Transform};
use crate::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageType {
    Missing,
    Pdf,
    Image,
}

/// Probe order for presentation assets. Case matters on the filesystems the
/// recorder writes to, so both spellings are tried.
const TYPE_MAP: [(&str, ImageType); 8] = [
    ("PDF", ImageType::Pdf),
    ("pdf", ImageType::Pdf),
    ("PNG", ImageType::Image),
    ("png", ImageType::Image),
    ("JPG", ImageType::Image),
    ("jpg", ImageType::Image),
    ("JPEG", ImageType::Image),
    ("jpeg", ImageType::Image),
];

enum Source {
    Pdf(poppler::Document),
    Image(RasterPage),
}

enum Page {
    Pdf(poppler::Page),
    Image(ImageSurface),
}

pub struct PresentationLayer {
    ctx: Context,
    directory: PathBuf,
    size: Size,
    hide_logo: bool,
    logo: Option<PathBuf>,
    tldraw_whiteboard: bool,

    presentation: Option<String>,
    presentation_slide: HashMap<String, i64>,
    slide: i64,
    pan: Position,
    zoom: Size,

    presentation_changed: bool,
    slide_changed: bool,
    pan_zoom_changed: bool,

    filetype: ImageType,
    source: Option<Source>,
    page: Option<Page>,
    page_size: Option<Size>,
    pattern: Option<Pattern>,

    trans: Transform,
}

impl PresentationLayer {
    pub fn new(
        ctx: Context,
        directory: &Path,
        size: Size,
        hide_logo: bool,
        logo: Option<PathBuf>,
        tldraw_whiteboard: bool,
    ) -> Self {
        Self {
            ctx,
            directory: directory.to_owned(),
            size,
            hide_logo,
            logo,
            tldraw_whiteboard,
            presentation: None,
            presentation_slide: HashMap::new(),
            slide: 0,
            pan: Position::new(-0.0, -0.0),
            zoom: Size::new(1.0, 1.0),
            presentation_changed: true,
            slide_changed: false,
            pan_zoom_changed: false,
            filetype: ImageType::Missing,
            source: None,
            page: None,
            page_size: None,
            pattern: None,
            trans: Transform::initial(size, tldraw_whiteboard),
        }
    }

    /// The transform for the currently displayed page state. The annotation
    /// and cursor layers read this every frame.
    pub fn transform(&self) -> Transform {
        self.trans
    }

    pub fn update_presentation(&mut self, event: &PresentationEvent) {
        if self.presentation.as_deref() == Some(event.presentation.as_str()) {
            debug!(target: "render.presentation", "presentation did not change");
            return;
        }
        self.presentation = Some(event.presentation.clone());
        self.presentation_changed = true;
        // Restore the last viewed page from this presentation; pan and zoom
        // reset when a presentation is shared.
        self.slide = self
            .presentation_slide
            .get(&event.presentation)
            .copied()
            .unwrap_or(0);
        self.pan = Position::new(0.0, 0.0);
        self.zoom = Size::new(1.0, 1.0);
        self.pan_zoom_changed = true;
        info!(target: "render.presentation", presentation = %event.presentation, slide = self.slide, "presentation");
    }

    pub fn update_slide(&mut self, event: &SlideEvent) {
        if self.slide == event.slide {
            debug!(target: "render.presentation", "slide did not change");
            return;
        }
        self.slide = event.slide;
        if let Some(presentation) = &self.presentation {
            self.presentation_slide
                .insert(presentation.clone(), self.slide);
        }
        self.slide_changed = true;
        info!(target: "render.presentation", slide = self.slide, "slide");
    }

    pub fn update_pan_zoom(&mut self, event: &PanZoomEvent) {
        if self.pan == event.pan && self.zoom == event.zoom {
            debug!(target: "render.presentation", "pan/zoom did not change");
            return;
        }
        self.pan = event.pan;
        self.zoom = event.zoom;
        self.pan_zoom_changed = true;
        debug!(target: "render.presentation", pan = %self.pan, zoom = %self.zoom, "pan/zoom");
    }

    fn locate_asset(&self) -> (Option<PathBuf>, ImageType) {
        let Some(name) = self.presentation.as_deref() else {
            if !self.hide_logo {
                if let Some(logo) = &self.logo {
                    return (Some(logo.clone()), ImageType::Pdf);
                }
            }
            return (None, ImageType::Missing);
        };
        for (extension, filetype) in TYPE_MAP {
            let filename = self
                .directory
                .join("presentation")
                .join(name)
                .join(format!("{name}.{extension}"));
            if filename.exists() {
                return (Some(filename), filetype);
            }
        }
        (None, ImageType::Missing)
    }

    fn load_source(&mut self, filename: &Path) {
        match self.filetype {
            ImageType::Image => match raster::load_image(filename) {
                Ok(page) => self.source = Some(Source::Image(page)),
                Err(error) => {
                    warn!(target: "render.presentation", %error, ?filename, "failed to read image");
                    self.presentation = None;
                    self.filetype = ImageType::Missing;
                }
            },
            ImageType::Pdf => {
                let loaded = std::fs::read(filename)
                    .map_err(|e| e.to_string())
                    .and_then(|bytes| {
                        poppler::Document::from_data(&bytes, None).map_err(|e| e.to_string())
                    });
                match loaded {
                    Ok(document) => self.source = Some(Source::Pdf(document)),
                    Err(error) => {
                        warn!(target: "render.presentation", %error, ?filename, "failed to read pdf");
                        self.presentation = None;
                        self.filetype = ImageType::Missing;
                    }
                }
            }
            ImageType::Missing => {}
        }
    }

    fn select_page(&mut self) {
        self.page = None;
        self.page_size = None;
        match (&self.source, self.filetype) {
            (Some(Source::Image(raster)), ImageType::Image) => {
                // A raster presentation has exactly one page.
                if self.slide == 0 {
                    self.page = Some(Page::Image(raster.surface.clone()));
                    self.page_size = Some(Size::new(raster.width, raster.height));
                }
            }
            (Some(Source::Pdf(document)), ImageType::Pdf) => {
                if self.slide >= 0 && self.slide < document.n_pages() as i64 {
                    if let Some(page) = document.page(self.slide as i32) {
                        let (width, height) = page.size();
                        self.page_size = Some(Size::new(width, height));
                        self.page = Some(Page::Pdf(page));
                    }
                }
            }
            _ => {}
        }
        debug!(
            target: "render.presentation",
            page_size = ?self.page_size,
            "selected page"
        );
    }

    /// Rebuild the cached slide pattern if the presentation, slide, or
    /// pan/zoom changed (or nothing is loaded yet). Returns whether the
    /// pattern changed.
    pub fn finalize_frame(&mut self) -> Result<bool, RenderError> {
        let mut needs_render = false;

        if self.presentation_changed || self.source.is_none() {
            needs_render = true;
            self.source = None;
            let (filename, filetype) = self.locate_asset();
            self.filetype = filetype;
            info!(target: "render.presentation", ?filename, ?filetype, "presentation file");
            if let Some(filename) = filename {
                self.load_source(&filename);
            }
        }

        if self.slide_changed || needs_render {
            needs_render = true;
            self.select_page();
        }

        if self.pan_zoom_changed || needs_render {
            needs_render = true;
            // Fallback page size in case the slide did not load.
            if self.page_size.is_none() {
                self.page_size = Some(self.size);
            }
            let page_size = self.page_size.unwrap_or(self.size);
            self.trans = Transform::derive(
                page_size,
                self.size,
                self.pan,
                self.zoom,
                self.tldraw_whiteboard,
            );
            debug!(target: "render.presentation", transform = ?self.trans, "transform");
        }

        if needs_render {
            let ctx = &self.ctx;
            ctx.push_group();

            match &self.page {
                Some(Page::Image(surface)) => {
                    apply_slide_transform(ctx, &self.trans);
                    // Opaque white underneath transparent PNGs.
                    ctx.set_source_rgb(1.0, 1.0, 1.0);
                    ctx.paint()?;
                    ctx.set_source_surface(surface, 0.0, 0.0)?;
                    ctx.paint()?;
                }
                Some(Page::Pdf(page)) => {
                    let page_size = self.page_size.unwrap_or(self.size);
                    if let Err(error) = self.render_pdf_page(page, page_size) {
                        // A failed page render contaminates only the
                        // offscreen surface; the frame shows background.
                        warn!(target: "render.presentation", %error, "pdf rendering failed");
                    }
                }
                None => {}
            }

            self.pattern = Some(ctx.pop_group()?);
        }

        self.presentation_changed = false;
        self.slide_changed = false;
        self.pan_zoom_changed = false;
        Ok(needs_render)
    }

    /// Render the PDF page to an offscreen surface at the final pixel scale,
    /// then blit it with integer-aligned translation so the slide stays
    /// pixel-exact in the viewport.
    fn render_pdf_page(&self, page: &poppler::Page, page_size: Size) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        let t = &self.trans;

        let pdf_surface = ImageSurface::create(
            Format::Rgb24,
            (page_size.width * t.scale).ceil() as i32,
            (page_size.height * t.scale).ceil() as i32,
        )?;
        let pdf_ctx = Context::new(&pdf_surface)?;
        pdf_ctx.set_source_rgb(1.0, 1.0, 1.0);
        pdf_ctx.paint()?;
        pdf_ctx.scale(t.scale, t.scale);
        page.render(&pdf_ctx);
        pdf_ctx.status()?;

        let pdf_pattern = SurfacePattern::create(&pdf_surface);

        // Already rendered at 1:1 pixel ratio; only translation and
        // clipping from here, pixel aligned.
        ctx.translate(t.padding.width.floor(), t.padding.height.floor());
        ctx.rectangle(
            0.0,
            0.0,
            (t.size.width * t.scale).ceil(),
            (t.size.height * t.scale).ceil(),
        );
        ctx.clip();
        ctx.translate((-t.pos.x * t.scale).ceil(), (-t.pos.y * t.scale).ceil());
        ctx.set_source(&pdf_pattern)?;
        ctx.paint()?;
        Ok(())
    }

    /// Composite the cached slide pattern onto the frame.
    pub fn render(&self) -> Result<(), RenderError> {
        if let Some(pattern) = &self.pattern {
            let ctx = &self.ctx;
            ctx.save()?;
            ctx.set_source(pattern)?;
            ctx.paint()?;
            ctx.restore()?;
        } else {
            warn!(target: "render.presentation", "no pattern to render");
        }
        Ok(())
    }
}
