use std::path::PathBuf;
use std::process::Command;

use crate::encode::ensure_parent_dir;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, Rgba8};
use crate::foundation::error::{SceneError, SceneResult};
use crate::process::{PipedChild, is_tool_on_path};
use crate::render::surface::FrameRGBA;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    /// Replace an existing file at `out_path`.
    pub overwrite: bool,
    /// Backdrop shown through transparent pixels; the video has no alpha.
    pub background: Rgba8,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            background: Rgba8::BLACK,
        }
    }
}

/// Encodes the show into an H.264 MP4 through the system `ffmpeg`.
///
/// Frames are flattened onto the background and streamed as packed RGB24.
#[derive(Debug)]
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
}

#[derive(Debug)]
struct Encoder {
    child: PipedChild,
    cfg: SinkConfig,
    next_min: FrameIndex,
    rgb: Vec<u8>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
        }
    }

    fn command(&self, cfg: SinkConfig) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" })
            .args(["-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgb24"])
            .args(["-s", &format!("{}x{}", cfg.width, cfg.height)])
            .args(["-r", &cfg.fps.to_string(), "-i", "pipe:0"])
            .args(["-an", "-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .args(["-movflags", "+faststart"])
            .arg(&self.opts.out_path);
        cmd
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> SceneResult<()> {
        if self.encoder.is_some() {
            return Err(SceneError::render("mp4 encoder is already running"));
        }
        if cfg.width == 0 || cfg.height == 0 || cfg.fps == 0 {
            return Err(SceneError::validation(
                "mp4 output needs a non-zero size and frame rate",
            ));
        }
        // yuv420p subsamples chroma 2x2.
        if cfg.width % 2 != 0 || cfg.height % 2 != 0 {
            return Err(SceneError::validation(format!(
                "mp4 output needs even dimensions, got {}x{}",
                cfg.width, cfg.height
            )));
        }
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(SceneError::validation(format!(
                "'{}' already exists",
                self.opts.out_path.display()
            )));
        }
        ensure_parent_dir(&self.opts.out_path)?;
        if !is_tool_on_path("ffmpeg") {
            return Err(SceneError::render("mp4 output needs ffmpeg on PATH"));
        }

        let child = PipedChild::spawn(self.command(cfg))
            .map_err(|e| SceneError::render(format!("failed to start ffmpeg: {e}")))?;
        self.encoder = Some(Encoder {
            child,
            cfg,
            next_min: FrameIndex(0),
            rgb: Vec::with_capacity(cfg.width as usize * cfg.height as usize * 3),
        });
        tracing::debug!(out = %self.opts.out_path.display(), "mp4 encoder started");
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> SceneResult<()> {
        let background = self.opts.background;
        let enc = self
            .encoder
            .as_mut()
            .ok_or_else(|| SceneError::render("mp4 encoder is not running"))?;
        if idx < enc.next_min {
            return Err(SceneError::render(format!(
                "frame {} arrived after frame {}",
                idx.0,
                enc.next_min.0.saturating_sub(1)
            )));
        }
        if (frame.width, frame.height) != (enc.cfg.width, enc.cfg.height) {
            return Err(SceneError::validation(format!(
                "frame is {}x{}, encoder expects {}x{}",
                frame.width, frame.height, enc.cfg.width, enc.cfg.height
            )));
        }
        if frame.data.len() != enc.cfg.width as usize * enc.cfg.height as usize * 4 {
            return Err(SceneError::validation("frame data does not match its size"));
        }

        enc.rgb.clear();
        for px in frame.data.chunks_exact(4) {
            let px = [px[0], px[1], px[2], px[3]];
            let rgb = if frame.premultiplied {
                background.backdrop_for(px)
            } else {
                background.backdrop_for(Rgba8::new(px[0], px[1], px[2], px[3]).to_premul())
            };
            enc.rgb.extend_from_slice(&rgb);
        }

        enc.child
            .write_all(&enc.rgb)
            .map_err(|e| SceneError::render(format!("ffmpeg stopped accepting frames: {e}")))?;
        enc.next_min = idx.next();
        Ok(())
    }

    fn end(&mut self) -> SceneResult<()> {
        let enc = self
            .encoder
            .take()
            .ok_or_else(|| SceneError::render("mp4 encoder is not running"))?;
        if enc.next_min == FrameIndex(0) {
            enc.child.kill();
            tracing::warn!(
                out = %self.opts.out_path.display(),
                "no frames rendered, mp4 not written"
            );
            return Ok(());
        }
        enc.child
            .finish()
            .map_err(|e| SceneError::render(format!("mp4 encoding failed: {e}")))?;
        tracing::info!(out = %self.opts.out_path.display(), "mp4 written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
