//! Raster slide decoding.
//!
//! Presentation assets that are plain images (png/jpg) are decoded with the
//! `image` crate and converted into a premultiplied-alpha cairo surface once
//! per presentation; the presentation layer then paints that surface under
//! the slide transform.

use std::path::Path;

use cairo::{Format, ImageSurface};
use tracing::debug;

/// A decoded raster page.
pub struct RasterPage {
    pub surface: ImageSurface,
    pub width: f64,
    pub height: f64,
}

/// Decode an image file into a cairo surface. Any decode failure is reported
/// to the caller, which treats it like a missing page.
pub fn load_image(path: &Path) -> Result<RasterPage, String> {
    let img = image::open(path).map_err(|e| e.to_string())?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut surface = ImageSurface::create(Format::ARgb32, width as i32, height as i32)
        .map_err(|e| e.to_string())?;
    let stride = surface.stride() as usize;

    {
        let mut data = surface.data().map_err(|e| e.to_string())?;
        for (y, row) in rgba.rows().enumerate() {
            let line = &mut data[y * stride..y * stride + width as usize * 4];
            for (x, pixel) in row.enumerate() {
                let [r, g, b, a] = pixel.0;
                // Cairo wants premultiplied ARGB in native endianness.
                let af = a as u32;
                let pr = (r as u32 * af / 255) as u8;
                let pg = (g as u32 * af / 255) as u8;
                let pb = (b as u32 * af / 255) as u8;
                let packed = (af << 24) | ((pr as u32) << 16) | ((pg as u32) << 8) | pb as u32;
                line[x * 4..x * 4 + 4].copy_from_slice(&packed.to_ne_bytes());
            }
        }
    }
    surface.mark_dirty();

    debug!(target: "render.presentation", ?path, width, height, "decoded raster page");
    Ok(RasterPage {
        surface,
        width: width as f64,
        height: height as f64,
    })
}
