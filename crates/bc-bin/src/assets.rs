//! Bundled asset discovery (fonts, logo).
//!
//! The asset directory resolves, in order: the `BOARDCAST_ASSETS`
//! environment variable, a directory next to the installed executable, or
//! the repository's `assets/` directory during development.

use std::path::PathBuf;

/// The assets directory for this invocation. The path may not exist; the
/// callers decide whether that matters.
pub fn assets_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BOARDCAST_ASSETS") {
        return PathBuf::from(dir);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let installed = dir.join("../share/boardcast/assets");
            if installed.is_dir() {
                return installed;
            }
        }
    }
    // Development tree: workspace-root assets directory.
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../../assets"))
}

pub fn font_dir() -> PathBuf {
    assets_dir().join("fonts")
}

/// The logo shown when no presentation is active, if it is installed.
pub fn logo_file() -> Option<PathBuf> {
    let path = assets_dir().join("logo.pdf");
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_dir_is_under_assets() {
        assert!(font_dir().ends_with("fonts"));
    }
}
