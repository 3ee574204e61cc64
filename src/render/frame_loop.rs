use std::time::{Duration, Instant};

use crate::{
    encode::sink::{FrameSink, SinkConfig},
    foundation::{
        core::FrameIndex,
        error::{SceneError, SceneResult},
    },
    render::surface::Surface,
};

/// Canvas size, frame rate and window title.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub title: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 500,
            fps: 60,
            title: "New Year".to_string(),
        }
    }
}

impl CanvasConfig {
    pub fn validate(&self) -> SceneResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::validation("canvas width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(SceneError::validation("canvas fps must be non-zero"));
        }
        Ok(())
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}

/// Returned by the per-frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    /// Present this frame and draw another.
    Continue,
    /// Stop without presenting this frame.
    Exit,
}

/// Summary of a finished loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub elapsed: Duration,
    /// The loop stopped at `max_frames` rather than on [`LoopControl::Exit`].
    pub hit_frame_limit: bool,
}

/// Fixed-rate frame driver.
///
/// Calls `setup` once, then `draw` once per frame until it returns [`LoopControl::Exit`]. The
/// callback owns clearing. Each presented frame is handed to the optional sink; the frame that
/// returned `Exit` is discarded and not counted.
#[derive(Clone, Debug)]
pub struct FrameLoop {
    canvas: CanvasConfig,
    realtime: bool,
    max_frames: Option<u64>,
}

impl FrameLoop {
    pub fn new(canvas: CanvasConfig) -> SceneResult<Self> {
        canvas.validate()?;
        Ok(Self {
            canvas,
            realtime: true,
            max_frames: None,
        })
    }

    /// Pace frames to the configured rate (on by default).
    pub fn realtime(mut self, on: bool) -> Self {
        self.realtime = on;
        self
    }

    pub fn max_frames(mut self, limit: Option<u64>) -> Self {
        self.max_frames = limit;
        self
    }

    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    #[tracing::instrument(skip_all, fields(title = %self.canvas.title, fps = self.canvas.fps))]
    pub fn run(
        &self,
        surface: &mut dyn Surface,
        mut sink: Option<&mut (dyn FrameSink + '_)>,
        setup: impl FnOnce(&mut dyn Surface),
        mut draw: impl FnMut(&mut dyn Surface, FrameIndex) -> LoopControl,
    ) -> SceneResult<LoopStats> {
        if surface.width() != self.canvas.width || surface.height() != self.canvas.height {
            return Err(SceneError::validation(format!(
                "surface is {}x{}, canvas expects {}x{}",
                surface.width(),
                surface.height(),
                self.canvas.width,
                self.canvas.height
            )));
        }

        if let Some(sink) = sink.as_deref_mut() {
            sink.begin(SinkConfig {
                width: self.canvas.width,
                height: self.canvas.height,
                fps: self.canvas.fps,
            })?;
        }

        setup(surface);

        let period = self.canvas.frame_period();
        let start = Instant::now();
        let mut idx = FrameIndex(0);
        let mut stats = LoopStats {
            frames: 0,
            elapsed: Duration::ZERO,
            hit_frame_limit: false,
        };

        loop {
            if self.max_frames.is_some_and(|limit| stats.frames >= limit) {
                stats.hit_frame_limit = true;
                tracing::warn!(frames = stats.frames, "frame limit reached before the show ended");
                break;
            }

            if draw(surface, idx) == LoopControl::Exit {
                break;
            }

            if let Some(sink) = sink.as_deref_mut() {
                let frame = surface
                    .snapshot()
                    .ok_or_else(|| SceneError::render("surface cannot produce frames for a sink"))?;
                sink.push_frame(idx, &frame)?;
            }
            stats.frames += 1;

            if self.realtime {
                let due = start + period.mul_f64(stats.frames as f64);
                let now = Instant::now();
                if due > now {
                    std::thread::sleep(due - now);
                }
            }
            idx = idx.next();
        }

        if let Some(sink) = sink.as_deref_mut() {
            sink.end()?;
        }

        stats.elapsed = start.elapsed();
        tracing::info!(
            frames = stats.frames,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "frame loop finished"
        );
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame_loop.rs"]
mod tests;
