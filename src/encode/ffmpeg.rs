use std::ffi::OsString;
use std::io::Read as _;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::foundation::error::{MintError, MintResult};
use crate::render::graph::{FilterGraph, GraphParams};

/// Fixed output settings for every specimen video and thumbnail.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    pub fps: u32,
    /// Total frames per video.
    pub frames: u32,
    /// x264 constant rate factor.
    pub crf: u8,
    /// x264 preset.
    pub preset: String,
    /// Output pixel format.
    pub pix_fmt: String,
    /// Offset into the video at which the thumbnail frame is taken.
    pub thumbnail_offset: Duration,
    /// JPEG-scale quality for the thumbnail (`-q:v`).
    pub thumbnail_quality: u8,
    /// Per-invocation wall-clock limit; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
            fps: 24,
            frames: 120,
            crf: 18,
            preset: "slow".to_string(),
            // yuv420p for broad player compatibility.
            pix_fmt: "yuv420p".to_string(),
            thumbnail_offset: Duration::from_secs(1),
            thumbnail_quality: 2,
            timeout: Some(Duration::from_secs(600)),
        }
    }
}

impl EncodeConfig {
    /// Reject settings the encoder cannot honor.
    pub fn validate(&self) -> MintResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MintError::config("encode width/height must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(MintError::config(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if self.fps == 0 || self.frames == 0 {
            return Err(MintError::config("encode fps and frames must be non-zero"));
        }
        if self.crf > 51 {
            return Err(MintError::config("encode crf must be within 0..=51"));
        }
        let duration = Duration::from_secs_f64(f64::from(self.frames) / f64::from(self.fps));
        if self.thumbnail_offset >= duration {
            return Err(MintError::config(format!(
                "thumbnail offset {:?} is past the end of a {:?} video",
                self.thumbnail_offset, duration
            )));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(MintError::config("encode timeout must be non-zero when set"));
        }
        Ok(())
    }

    /// Geometry and timing handed to the graph builder.
    pub fn graph_params(&self) -> GraphParams {
        GraphParams {
            width: self.width,
            height: self.height,
            fps: self.fps,
        }
    }
}

/// Produces the two artifacts of a specimen render.
///
/// Implementations must be shareable across render workers.
pub trait Encoder: Send + Sync {
    /// Composite `graph` into a video at `out`.
    fn encode_video(&self, graph: &FilterGraph, out: &Path) -> MintResult<()>;
    /// Grab one frame of `video` into an image at `out`.
    fn extract_thumbnail(&self, video: &Path, out: &Path) -> MintResult<()>;
}

/// [`Encoder`] backed by the system `ffmpeg` binary.
#[derive(Clone, Debug)]
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    program: OsString,
}

impl FfmpegEncoder {
    /// Encoder invoking `ffmpeg` from `PATH`.
    pub fn new(cfg: EncodeConfig) -> MintResult<Self> {
        Self::with_program(cfg, "ffmpeg")
    }

    /// Encoder invoking `program` instead of `ffmpeg`.
    pub fn with_program(cfg: EncodeConfig, program: impl Into<OsString>) -> MintResult<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            program: program.into(),
        })
    }

    /// Settings in use.
    pub fn config(&self) -> &EncodeConfig {
        &self.cfg
    }

    /// Full argument list for a video encode.
    pub fn video_args(&self, graph: &FilterGraph, out: &Path) -> Vec<OsString> {
        let cfg = &self.cfg;
        let mut args: Vec<OsString> = vec!["-y".into(), "-loglevel".into(), "error".into()];
        args.extend(graph.input_args());
        args.extend(
            [
                "-filter_complex".to_string(),
                graph.to_string(),
                "-map".to_string(),
                graph.map_arg(),
                "-vsync".to_string(),
                "0".to_string(),
                "-r".to_string(),
                cfg.fps.to_string(),
                "-frames:v".to_string(),
                cfg.frames.to_string(),
                "-c:v".to_string(),
                "libx264".to_string(),
                "-crf".to_string(),
                cfg.crf.to_string(),
                "-preset".to_string(),
                cfg.preset.clone(),
                "-pix_fmt".to_string(),
                cfg.pix_fmt.clone(),
                "-movflags".to_string(),
                "+faststart".to_string(),
                "-an".to_string(),
            ]
            .map(OsString::from),
        );
        args.push(out.as_os_str().to_owned());
        args
    }

    /// Full argument list for a thumbnail extraction.
    pub fn thumbnail_args(&self, video: &Path, out: &Path) -> Vec<OsString> {
        let cfg = &self.cfg;
        let mut args: Vec<OsString> = ["-y", "-loglevel", "error", "-ss"]
            .map(OsString::from)
            .to_vec();
        args.push(format_seconds(cfg.thumbnail_offset).into());
        args.push("-i".into());
        args.push(video.as_os_str().to_owned());
        args.extend(
            [
                "-vf".to_string(),
                format!("scale={}:{}", cfg.width, cfg.height),
                "-frames:v".to_string(),
                "1".to_string(),
                "-q:v".to_string(),
                cfg.thumbnail_quality.to_string(),
            ]
            .map(OsString::from),
        );
        args.push(out.as_os_str().to_owned());
        args
    }

    fn run(&self, args: Vec<OsString>) -> MintResult<()> {
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                MintError::encode(format!(
                    "failed to spawn {} (is it installed and on PATH?): {e}",
                    self.program.to_string_lossy()
                ))
            })?;

        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| MintError::encode("failed to open encoder stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || -> std::io::Result<Vec<u8>> {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        let status = wait_with_timeout(&mut child, self.cfg.timeout)?;
        let stderr_bytes = stderr_drain
            .join()
            .map_err(|_| MintError::encode("encoder stderr drain thread panicked"))?
            .map_err(|e| MintError::encode(format!("encoder stderr read failed: {e}")))?;

        match status {
            None => Err(MintError::encode(format!(
                "encoder timed out after {:?}",
                self.cfg.timeout.unwrap_or_default()
            ))),
            Some(status) if !status.success() => {
                let stderr = String::from_utf8_lossy(&stderr_bytes);
                Err(MintError::encode(format!(
                    "encoder exited with status {}: {}",
                    status,
                    stderr.trim()
                )))
            }
            Some(_) => Ok(()),
        }
    }
}

impl Encoder for FfmpegEncoder {
    fn encode_video(&self, graph: &FilterGraph, out: &Path) -> MintResult<()> {
        self.run(self.video_args(graph, out))
    }

    fn extract_thumbnail(&self, video: &Path, out: &Path) -> MintResult<()> {
        self.run(self.thumbnail_args(video, out))
    }
}

/// Wait for `child`, killing it once `timeout` elapses. `Ok(None)` means it was killed.
fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> MintResult<Option<ExitStatus>> {
    let Some(limit) = timeout else {
        return child
            .wait()
            .map(Some)
            .map_err(|e| MintError::encode(format!("failed to wait for encoder: {e}")));
    };

    let deadline = Instant::now() + limit;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {}
            Err(e) => return Err(MintError::encode(format!("failed to poll encoder: {e}"))),
        }
        if Instant::now() >= deadline {
            // Kill can fail if the process exited in between; the wait reaps it either way.
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        std::thread::sleep(Duration::from_millis(25));
    }
}

fn format_seconds(d: Duration) -> String {
    let millis = d.as_millis();
    if millis % 1000 == 0 {
        (millis / 1000).to_string()
    } else {
        format!("{:.3}", d.as_secs_f64())
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
