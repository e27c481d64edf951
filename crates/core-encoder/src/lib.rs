//! Frame encoding: a bounded queue of recycled frame buffers feeding an
//! external ffmpeg process.
//!
//! The scheduler thread calls [`Encoder::put`] with finished BGRx frames;
//! a worker thread pipes them into ffmpeg's stdin. Exactly three buffers
//! circulate between the two threads through a return queue, so a slow
//! encoder applies backpressure to the scheduler instead of ballooning
//! memory. A `None` sentinel shuts the worker down; [`Encoder::join`] sends
//! it, waits, and reports the encoder's exit status.
//!
//! Ordering: frames are written in exactly the order they were put (one
//! FIFO channel, one consumer).

use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender};
use num_rational::Rational64;
use num_traits::ToPrimitive;
use thiserror::Error;
use tracing::{debug, info};

/// Buffers circulating between scheduler and worker.
const FRAME_BUFFERS: usize = 3;

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("could not launch video encoder: {0}")]
    Spawn(std::io::Error),

    #[error("writing to the video encoder failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("frame has {got} bytes, expected {expected}")]
    FrameSize { expected: usize, got: usize },

    #[error("encoder worker is gone")]
    WorkerGone,

    #[error("video encoder exited with status {0}")]
    ExitStatus(i32),

    #[error("encoder worker panicked")]
    WorkerPanicked,
}

/// Output codec selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    H264,
    Vp9,
}

impl Codec {
    fn options(self) -> &'static [&'static str] {
        match self {
            // Lossless fast settings; quality is decided at re-encode time
            // by the processing pipeline downstream of this tool.
            Codec::H264 => &["-c:v", "libx264", "-qp", "0", "-preset", "ultrafast"],
            Codec::Vp9 => &[
                "-c:v",
                "libvpx-vp9",
                "-deadline",
                "realtime",
                "-cpu-used",
                "8",
                "-lossless",
                "1",
                "-row-mt",
                "1",
            ],
        }
    }
}

impl std::str::FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "h264" => Ok(Self::H264),
            "vp9" => Ok(Self::Vp9),
            other => Err(format!("unknown codec '{other}', expected h264 or vp9")),
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::H264 => write!(f, "h264"),
            Self::Vp9 => write!(f, "vp9"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub output: PathBuf,
    pub width: i32,
    pub height: i32,
    pub framerate: Rational64,
    pub codec: Codec,
}

fn format_framerate(framerate: Rational64) -> String {
    if *framerate.denom() == 1 {
        framerate.numer().to_string()
    } else {
        format!("{}/{}", framerate.numer(), framerate.denom())
    }
}

fn rounded_framerate(framerate: Rational64) -> i64 {
    framerate.to_f64().unwrap_or(0.0).round() as i64
}

/// The full ffmpeg invocation for a job. Raw BGRx ("bgr0") frames come in
/// on stdin; duplicate frames are decimated; the result is a Matroska file
/// with a single yuv420p video track.
fn ffmpeg_args(config: &EncoderConfig) -> Vec<String> {
    let rounded = rounded_framerate(config.framerate);
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-nostats".into(),
        "-v".into(),
        "warning".into(),
        "-f".into(),
        "rawvideo".into(),
        // Note that 'bgr0' matches cairo's RGB24 layout only on
        // little-endian machines.
        "-pixel_format".into(),
        "bgr0".into(),
        "-video_size".into(),
        format!("{}x{}", config.width, config.height),
        "-framerate".into(),
        format_framerate(config.framerate),
        "-i".into(),
        "-".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-vf".into(),
        format!("mpdecimate=max={rounded}:hi=1:lo=1:frac=1"),
    ];
    args.extend(config.codec.options().iter().map(|s| (*s).to_string()));
    args.extend([
        "-threads".into(),
        "2".into(),
        "-g".into(),
        (rounded * 10).to_string(),
        "-f".into(),
        "matroska".into(),
        config.output.to_string_lossy().into_owned(),
    ]);
    args
}

pub struct Encoder {
    queue: Sender<Option<Vec<u8>>>,
    ret_queue: Receiver<Vec<u8>>,
    frame_size: usize,
    handle: Option<JoinHandle<Result<(), EncoderError>>>,
}

impl Encoder {
    /// Launch ffmpeg and the worker thread that feeds it.
    pub fn start(config: EncoderConfig) -> Result<Self, EncoderError> {
        let frame_size = config.width as usize * config.height as usize * 4;

        let (queue_tx, queue_rx) = bounded::<Option<Vec<u8>>>(FRAME_BUFFERS);
        let (ret_tx, ret_rx) = bounded::<Vec<u8>>(FRAME_BUFFERS);
        for _ in 0..FRAME_BUFFERS {
            ret_tx
                .send(vec![0u8; frame_size])
                .expect("return queue holds all initial buffers");
        }

        let args = ffmpeg_args(&config);
        info!(target: "encoder", output = %config.output.display(), codec = %config.codec, "starting ffmpeg");
        debug!(target: "encoder", ?args, "ffmpeg command line");

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(EncoderError::Spawn)?;

        let handle = std::thread::Builder::new()
            .name("encoder".into())
            .spawn(move || encoder_worker(child, queue_rx, ret_tx))
            .map_err(EncoderError::Spawn)?;

        Ok(Self {
            queue: queue_tx,
            ret_queue: ret_rx,
            frame_size,
            handle: Some(handle),
        })
    }

    /// Queue one frame. Blocks while all buffers are in flight, which is
    /// the backpressure that paces the scheduler.
    pub fn put(&self, data: &[u8]) -> Result<(), EncoderError> {
        if data.len() != self.frame_size {
            return Err(EncoderError::FrameSize {
                expected: self.frame_size,
                got: data.len(),
            });
        }
        let mut buf = self
            .ret_queue
            .recv()
            .map_err(|_| EncoderError::WorkerGone)?;
        buf.copy_from_slice(data);
        self.queue
            .send(Some(buf))
            .map_err(|_| EncoderError::WorkerGone)
    }

    /// Send the shutdown sentinel and wait for ffmpeg to finish the file.
    pub fn join(mut self) -> Result<(), EncoderError> {
        // The worker may already be gone after a failure; join either way.
        let _ = self.queue.send(None);
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| EncoderError::WorkerPanicked)?,
            None => Ok(()),
        }
    }
}

fn encoder_worker(
    mut child: Child,
    queue: Receiver<Option<Vec<u8>>>,
    ret_queue: Sender<Vec<u8>>,
) -> Result<(), EncoderError> {
    let mut stdin = child.stdin.take().expect("encoder stdin is piped");

    let result = (|| -> Result<(), EncoderError> {
        while let Ok(Some(buf)) = queue.recv() {
            stdin.write_all(&buf)?;
            // Hand the buffer back for reuse; if the producer is gone we
            // are shutting down anyway.
            let _ = ret_queue.send(buf);
        }
        Ok(())
    })();

    drop(stdin);
    let status = child.wait()?;
    result?;

    if !status.success() {
        return Err(EncoderError::ExitStatus(status.code().unwrap_or(-1)));
    }
    debug!(target: "encoder", "ffmpeg finished");
    Ok(())
}

/// The exact command line, exposed for the binary's verbose logging.
pub fn command_line(config: &EncoderConfig) -> Vec<String> {
    let mut cmd = vec!["ffmpeg".to_owned()];
    cmd.extend(ffmpeg_args(config));
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(codec: Codec) -> EncoderConfig {
        EncoderConfig {
            output: PathBuf::from("out.mkv"),
            width: 960,
            height: 720,
            framerate: Rational64::new(24000, 1001),
            codec,
        }
    }

    #[test]
    fn ffmpeg_args_for_h264() {
        let args = ffmpeg_args(&config(Codec::H264));
        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo"));
        assert!(joined.contains("-pixel_format bgr0"));
        assert!(joined.contains("-video_size 960x720"));
        assert!(joined.contains("-framerate 24000/1001"));
        assert!(joined.contains("mpdecimate=max=24:hi=1:lo=1:frac=1"));
        assert!(joined.contains("-c:v libx264 -qp 0 -preset ultrafast"));
        assert!(joined.contains("-g 240"));
        assert!(joined.ends_with("-f matroska out.mkv"));
    }

    #[test]
    fn ffmpeg_args_for_vp9() {
        let args = ffmpeg_args(&config(Codec::Vp9));
        let joined = args.join(" ");
        assert!(joined.contains("-c:v libvpx-vp9"));
        assert!(joined.contains("-lossless 1"));
    }

    #[test]
    fn integral_framerate_formats_without_denominator() {
        assert_eq!(format_framerate(Rational64::new(30, 1)), "30");
        assert_eq!(format_framerate(Rational64::new(24000, 1001)), "24000/1001");
    }

    #[test]
    fn codec_parses_from_cli_tokens() {
        assert_eq!("h264".parse::<Codec>().unwrap(), Codec::H264);
        assert_eq!("vp9".parse::<Codec>().unwrap(), Codec::Vp9);
        assert!("av1".parse::<Codec>().is_err());
    }

    #[test]
    fn put_rejects_wrong_frame_size() {
        // Use `cat`-free validation: only the size check runs before any
        // channel interaction when the length is wrong, so a dummy encoder
        // with closed channels suffices.
        let (queue, _queue_rx) = bounded(1);
        let (_ret_tx, ret_queue) = bounded(1);
        let encoder = Encoder {
            queue,
            ret_queue,
            frame_size: 16,
            handle: None,
        };
        let err = encoder.put(&[0u8; 8]).unwrap_err();
        assert!(matches!(
            err,
            EncoderError::FrameSize {
                expected: 16,
                got: 8
            }
        ));
    }
}
