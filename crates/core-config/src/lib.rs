//! Configuration file loading.
//!
//! An optional `boardcast.toml` supplies defaults for the video parameters;
//! explicit CLI flags always win. Unknown fields are tolerated so a config
//! written for a newer build keeps working. A missing file is not an error,
//! a malformed one is.
//!
//! ```toml
//! [video]
//! width = 1280
//! height = 960
//! framerate = "30000/1001"
//! codec = "vp9"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use num_rational::Rational64;
use serde::Deserialize;
use tracing::{debug, info};

/// File searched in the working directory when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "boardcast.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub video: VideoConfig,
}

/// Defaults for the flags the renderer consumes. All optional; unset fields
/// fall back to built-in defaults after CLI merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoConfig {
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// A rational like "24000/1001" or a plain integer string.
    pub framerate: Option<String>,
    pub codec: Option<String>,
}

impl Config {
    /// Load from an explicit path, or probe `boardcast.toml` in the working
    /// directory. `path` being `Some` makes the file mandatory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_owned(), true),
            None => (PathBuf::from(CONFIG_FILE_NAME), false),
        };

        if !path.exists() {
            if required {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            debug!(target: "config", "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("could not parse {}", path.display()))?;
        info!(target: "config", path = %path.display(), "loaded config");
        Ok(config)
    }
}

/// Parse a framerate written either as "N/D" or as a plain integer.
pub fn parse_framerate(s: &str) -> Result<Rational64> {
    let s = s.trim();
    if let Some((numer, denom)) = s.split_once('/') {
        let numer: i64 = numer.trim().parse().context("bad framerate numerator")?;
        let denom: i64 = denom.trim().parse().context("bad framerate denominator")?;
        anyhow::ensure!(denom != 0, "framerate denominator is zero");
        Ok(Rational64::new(numer, denom))
    } else {
        let value: i64 = s.parse().context("bad framerate")?;
        Ok(Rational64::from_integer(value))
    }
}

/// Parse a point in time, in seconds: "N/D", a decimal like "12.5", or an
/// integer. Decimals convert exactly (digits over a power of ten), keeping
/// the no-drift arithmetic downstream honest.
pub fn parse_seconds(s: &str) -> Result<Rational64> {
    let s = s.trim();
    if s.contains('/') {
        return parse_framerate(s);
    }
    if let Some((whole, frac)) = s.split_once('.') {
        let negative = whole.starts_with('-');
        let whole: i64 = if whole.is_empty() || whole == "-" {
            0
        } else {
            whole.parse().context("bad seconds value")?
        };
        anyhow::ensure!(
            !frac.is_empty() && frac.chars().all(|c| c.is_ascii_digit()),
            "bad seconds value {s:?}"
        );
        anyhow::ensure!(frac.len() <= 9, "too many decimal places in {s:?}");
        let digits: i64 = frac.parse().context("bad seconds value")?;
        let scale = 10_i64.pow(frac.len() as u32);
        let fraction = Rational64::new(if negative { -digits } else { digits }, scale);
        return Ok(Rational64::from_integer(whole) + fraction);
    }
    let value: i64 = s.parse().context("bad seconds value")?;
    Ok(Rational64::from_integer(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("nope.toml").as_path()));
        assert!(config.is_err());

        // Probing mode tolerates absence.
        let cwd = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        let config = Config::load(None).unwrap();
        std::env::set_current_dir(cwd).unwrap();
        assert!(config.video.width.is_none());
    }

    #[test]
    fn parses_video_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boardcast.toml");
        std::fs::write(
            &path,
            "[video]\nwidth = 1280\nheight = 960\nframerate = \"30000/1001\"\ncodec = \"vp9\"\n",
        )
        .unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.video.width, Some(1280));
        assert_eq!(config.video.codec.as_deref(), Some("vp9"));
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boardcast.toml");
        std::fs::write(&path, "[video]\nwidth = 640\n[future]\nx = 1\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.video.width, Some(640));
    }

    #[test]
    fn seconds_forms() {
        assert_eq!(parse_seconds("90").unwrap(), Rational64::from_integer(90));
        assert_eq!(parse_seconds("12.5").unwrap(), Rational64::new(25, 2));
        assert_eq!(parse_seconds("0.04").unwrap(), Rational64::new(1, 25));
        assert_eq!(parse_seconds("3/2").unwrap(), Rational64::new(3, 2));
        assert_eq!(parse_seconds("-1.5").unwrap(), Rational64::new(-3, 2));
        assert!(parse_seconds("abc").is_err());
    }

    #[test]
    fn framerate_forms() {
        assert_eq!(
            parse_framerate("24000/1001").unwrap(),
            Rational64::new(24000, 1001)
        );
        assert_eq!(parse_framerate("30").unwrap(), Rational64::from_integer(30));
        assert!(parse_framerate("x/y").is_err());
        assert!(parse_framerate("1/0").is_err());
    }
}
