use std::{
    sync::{Arc, mpsc},
    thread::JoinHandle,
    time::Duration,
};

use crate::foundation::error::{SceneError, SceneResult};

/// Native format of a decoded stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl StreamFormat {
    /// Output buffer size: a tenth of a second of frames.
    pub fn buffer_frames(self) -> u32 {
        (self.sample_rate / 10).max(1)
    }
}

/// Fully decoded PCM ready for playback.
#[derive(Clone, Debug)]
pub struct DecodedAudio {
    pub format: StreamFormat,
    pub interleaved_f32: Arc<Vec<f32>>,
}

impl DecodedAudio {
    pub fn frames(&self) -> u64 {
        let channels = usize::from(self.format.channels.max(1));
        (self.interleaved_f32.len() / channels) as u64
    }

    pub fn duration(&self) -> Duration {
        if self.format.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / f64::from(self.format.sample_rate))
    }
}

/// Fired once when a stream plays through to its end.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Codec + output device used by the playback task.
///
/// Calls arrive in order `decode`, `open_device`, `play`, `close` from a single thread. `close`
/// must release the device even while playback is still running, and must not fire the
/// completion callback afterwards.
pub trait AudioBackend: Send {
    fn decode(&mut self, bytes: &[u8]) -> SceneResult<DecodedAudio>;

    fn open_device(&mut self, sample_rate: u32, buffer_frames: u32) -> SceneResult<()>;

    fn play(&mut self, stream: &DecodedAudio, on_complete: CompletionCallback) -> SceneResult<()>;

    fn close(&mut self);
}

/// Builds a fresh backend for each scene.
pub type BackendFactory = Arc<dyn Fn() -> Box<dyn AudioBackend> + Send + Sync>;

/// Backend without an output device.
///
/// Playback "runs" for the stream's duration (at least the configured hold time) on a timer
/// thread and then completes. Nothing is decoded, so a fresh stream is empty and completes after
/// the hold alone.
#[derive(Debug, Default)]
pub struct SilentAudio {
    hold: Duration,
    device_open: bool,
    timer: Option<(mpsc::Sender<()>, JoinHandle<()>)>,
}

impl SilentAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hold(hold: Duration) -> Self {
        Self {
            hold,
            ..Self::default()
        }
    }

    pub fn factory() -> BackendFactory {
        Arc::new(|| Box::new(SilentAudio::new()) as Box<dyn AudioBackend>)
    }
}

impl AudioBackend for SilentAudio {
    fn decode(&mut self, _bytes: &[u8]) -> SceneResult<DecodedAudio> {
        Ok(DecodedAudio {
            format: StreamFormat {
                sample_rate: 48_000,
                channels: 2,
            },
            interleaved_f32: Arc::new(Vec::new()),
        })
    }

    fn open_device(&mut self, sample_rate: u32, _buffer_frames: u32) -> SceneResult<()> {
        if sample_rate == 0 {
            return Err(SceneError::audio("device sample rate must be non-zero"));
        }
        self.device_open = true;
        Ok(())
    }

    fn play(&mut self, stream: &DecodedAudio, on_complete: CompletionCallback) -> SceneResult<()> {
        if !self.device_open {
            return Err(SceneError::audio("play called before open_device"));
        }
        let hold = self.hold.max(stream.duration());
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let timer = std::thread::spawn(move || {
            if let Err(mpsc::RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(hold) {
                on_complete();
            }
        });
        self.timer = Some((cancel_tx, timer));
        Ok(())
    }

    fn close(&mut self) {
        if let Some((cancel, timer)) = self.timer.take() {
            let _ = cancel.send(());
            let _ = timer.join();
        }
        self.device_open = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/backend.rs"]
mod tests;
