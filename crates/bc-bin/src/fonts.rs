//! One-shot registration of the bundled fonts with fontconfig.
//!
//! The whiteboard faces (Caveat Brush, Source Sans Pro, Crimson Pro, Source
//! Code Pro) ship with the tool so recordings render the same on any host.
//! `FcConfigAppFontAddDir` adds them to the current fontconfig configuration
//! without touching the system font set. A missing directory only degrades
//! text to fallback faces, so it is logged and tolerated.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::sync::Once;

use tracing::{info, warn};

use crate::assets;

/// Add fonts from a directory to the current fontconfig configuration.
fn app_font_add_dir(dir: &Path) -> Result<(), String> {
    let c_dir = CString::new(dir.as_os_str().as_bytes())
        .map_err(|_| "font directory path contains a NUL byte".to_owned())?;
    let ok = unsafe {
        fontconfig_sys::FcConfigAppFontAddDir(
            std::ptr::null_mut(),
            c_dir.as_ptr() as *const fontconfig_sys::FcChar8,
        )
    };
    if ok == 1 {
        Ok(())
    } else {
        Err(format!("FcConfigAppFontAddDir({}) failed", dir.display()))
    }
}

static FONTS_REGISTERED: Once = Once::new();

/// Register the bundled font directory exactly once.
pub fn register_bundled_fonts() {
    FONTS_REGISTERED.call_once(|| {
        let dir = assets::font_dir();
        if !dir.is_dir() {
            warn!(target: "fonts", dir = %dir.display(), "bundled font directory missing, using system fonts");
            return;
        }
        match app_font_add_dir(&dir) {
            Ok(()) => info!(target: "fonts", dir = %dir.display(), "registered bundled fonts"),
            Err(error) => {
                warn!(target: "fonts", %error, "could not register bundled fonts");
            }
        }
    });
}
