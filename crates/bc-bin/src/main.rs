//! boardcast entrypoint: renders a recorded whiteboard session to video.

mod assets;
mod fonts;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use core_config::{parse_framerate, parse_seconds, Config};
use core_encoder::{Codec, Encoder, EncoderConfig};
use core_events::{parse_events, DEFAULT_PRESENTATION_POD};
use core_render::{EngineConfig, RenderEngine};

const DEFAULT_WIDTH: i32 = 960;
const DEFAULT_HEIGHT: i32 = 720;
const DEFAULT_RATE: &str = "24000/1001";
const DEFAULT_CODEC: Codec = Codec::H264;

/// CLI arguments. `-h` is the height flag as in the recorder's other tools;
/// help is reached with `--help`.
#[derive(Parser, Debug)]
#[command(
    name = "boardcast",
    version,
    about = "Render a recorded whiteboard session to video",
    disable_help_flag = true
)]
struct Args {
    /// Show this help message and exit.
    #[arg(long, action = clap::ArgAction::Help)]
    help: Option<bool>,

    /// Video width.
    #[arg(short = 'w', long, value_name = "WIDTH")]
    width: Option<i32>,

    /// Video height.
    #[arg(short = 'h', long, value_name = "HEIGHT")]
    height: Option<i32>,

    /// Video framerate, a rational like 24000/1001.
    #[arg(short = 'r', long, value_name = "RATE")]
    framerate: Option<String>,

    /// Video codec (h264 or vp9).
    #[arg(short = 'c', long, value_name = "CODEC")]
    codec: Option<String>,

    /// Input directory containing events.xml (default: working directory).
    #[arg(short = 'i', long, value_name = "DIRECTORY", default_value = ".")]
    input: PathBuf,

    /// Output filename.
    #[arg(short = 'o', long, value_name = "FILENAME", default_value = "presentation.mkv")]
    output: PathBuf,

    /// Render only the section starting at SECONDS.
    #[arg(short = 's', long, value_name = "SECONDS")]
    start: Option<String>,

    /// Render only the section ending at SECONDS.
    #[arg(short = 'e', long, value_name = "SECONDS")]
    end: Option<String>,

    /// Render a specific pod instead of the default pod.
    #[arg(short = 'p', long, value_name = "POD_ID", default_value = DEFAULT_PRESENTATION_POD)]
    pod: String,

    /// Configuration file path (overrides discovery of boardcast.toml).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn configure_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;

    let width = args.width.or(config.video.width).unwrap_or(DEFAULT_WIDTH);
    let height = args.height.or(config.video.height).unwrap_or(DEFAULT_HEIGHT);
    let framerate = parse_framerate(
        args.framerate
            .as_deref()
            .or(config.video.framerate.as_deref())
            .unwrap_or(DEFAULT_RATE),
    )?;
    let codec = match args.codec.as_deref().or(config.video.codec.as_deref()) {
        Some(token) => token.parse::<Codec>().map_err(anyhow::Error::msg)?,
        None => DEFAULT_CODEC,
    };
    let start_time = args.start.as_deref().map(parse_seconds).transpose()?;
    let end_time = args.end.as_deref().map(parse_seconds).transpose()?;

    info!(
        target: "startup",
        input = %args.input.display(),
        output = %args.output.display(),
        width,
        height,
        framerate = %framerate,
        codec = %codec,
        "boardcast"
    );

    // Bundled fonts must be visible to the text shaper before any layout.
    fonts::register_bundled_fonts();

    let parsed = parse_events(&args.input)
        .with_context(|| format!("reading events from {}", args.input.display()))?;
    info!(
        target: "startup",
        events = parsed.events.len(),
        length = %parsed.length,
        hide_logo = parsed.hide_logo,
        "parsed recording"
    );

    let encoder = Encoder::start(EncoderConfig {
        output: args.output.clone(),
        width,
        height,
        framerate,
        codec,
    })?;

    let engine = RenderEngine::new(
        EngineConfig {
            input: args.input.clone(),
            width,
            height,
            framerate,
            start_time,
            end_time,
            pod_id: args.pod.clone(),
            logo: assets::logo_file(),
        },
        parsed,
    )?;

    // Join the encoder even when rendering failed so the child process is
    // reaped and the file closed; the render error stays the primary one.
    let run_result = engine.run(&encoder);
    let join_result = encoder.join();
    run_result?;
    join_result?;

    info!(target: "startup", output = %args.output.display(), "done");
    Ok(())
}

fn main() -> ExitCode {
    configure_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(target: "startup", "fatal: {error:#}");
            ExitCode::FAILURE
        }
    }
}
