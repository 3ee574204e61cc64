use crate::audio::backend::{AudioBackend, CompletionCallback, DecodedAudio};
use crate::foundation::error::{SceneError, SceneResult};

#[cfg(feature = "media-ffmpeg")]
use crate::{
    audio::backend::StreamFormat,
    process::{PipedChild, is_tool_on_path, run_with_stdin},
};
#[cfg(feature = "media-ffmpeg")]
use std::{
    io::Write as _,
    process::{Command, Output},
    sync::{Arc, Mutex, PoisonError},
    thread::JoinHandle,
    time::Duration,
};

#[cfg(feature = "media-ffmpeg")]
const WATCH_INTERVAL: Duration = Duration::from_millis(10);

/// The running `ffplay`, shared with its watcher. Empty once it exited or was stopped.
#[cfg(feature = "media-ffmpeg")]
type PlayerSlot = Arc<Mutex<Option<PipedChild>>>;

/// Audio backend built on the system `ffprobe`, `ffmpeg` and `ffplay`.
///
/// Encoded bytes are decoded to interleaved `f32` stereo at the stream's native sample rate. The
/// output device is an `ffplay` child fed raw PCM on stdin; playback completes when it exits.
#[derive(Debug, Default)]
pub struct FfmpegAudio {
    #[cfg(feature = "media-ffmpeg")]
    device: Option<DeviceConfig>,
    #[cfg(feature = "media-ffmpeg")]
    player: Option<PlayerSlot>,
    #[cfg(feature = "media-ffmpeg")]
    threads: Vec<JoinHandle<()>>,
}

#[cfg(feature = "media-ffmpeg")]
#[derive(Clone, Copy, Debug)]
struct DeviceConfig {
    sample_rate: u32,
    buffer_frames: u32,
}

impl FfmpegAudio {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(feature = "media-ffmpeg")]
impl AudioBackend for FfmpegAudio {
    fn decode(&mut self, bytes: &[u8]) -> SceneResult<DecodedAudio> {
        if bytes.is_empty() {
            return Err(SceneError::audio("audio blob is empty"));
        }
        let format = source_format(bytes)?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-v", "error", "-i", "pipe:0", "-vn"]).args([
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &format.sample_rate.to_string(),
            "pipe:1",
        ]);
        let out = run_tool(cmd, bytes)?;
        if !out.status.success() {
            return Err(SceneError::audio(format!(
                "ffmpeg audio decode failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        if !out.stdout.len().is_multiple_of(4) {
            return Err(SceneError::audio(
                "decoded audio byte length is not aligned to f32 samples",
            ));
        }
        let pcm = out
            .stdout
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect::<Vec<_>>();

        Ok(DecodedAudio {
            format: StreamFormat {
                sample_rate: format.sample_rate,
                channels: 2,
            },
            interleaved_f32: Arc::new(pcm),
        })
    }

    fn open_device(&mut self, sample_rate: u32, buffer_frames: u32) -> SceneResult<()> {
        if sample_rate == 0 || buffer_frames == 0 {
            return Err(SceneError::audio(
                "device sample rate and buffer size must be non-zero",
            ));
        }
        if !is_tool_on_path("ffplay") {
            return Err(SceneError::audio(
                "ffplay is required for audio output, but was not found on PATH",
            ));
        }
        self.device = Some(DeviceConfig {
            sample_rate,
            buffer_frames,
        });
        Ok(())
    }

    fn play(&mut self, stream: &DecodedAudio, on_complete: CompletionCallback) -> SceneResult<()> {
        let device = self
            .device
            .ok_or_else(|| SceneError::audio("play called before open_device"))?;
        if self.player.is_some() {
            return Err(SceneError::audio("stream is already playing"));
        }

        let mut cmd = Command::new("ffplay");
        cmd.args(["-nodisp", "-autoexit", "-loglevel", "error"])
            .args(["-f", "f32le", "-ar", &device.sample_rate.to_string()])
            .args(["-ch_layout", "stereo", "-i", "pipe:0"]);
        let mut child = PipedChild::spawn(cmd)
            .map_err(|e| SceneError::audio(format!("failed to spawn ffplay: {e}")))?;
        let mut stdin = child
            .take_stdin()
            .ok_or_else(|| SceneError::audio("failed to open ffplay stdin (unexpected)"))?;

        let pcm = Arc::clone(&stream.interleaved_f32);
        let chunk_samples = device.buffer_frames as usize * usize::from(stream.format.channels);
        let feeder = std::thread::spawn(move || {
            let mut bytes = Vec::with_capacity(chunk_samples * 4);
            for chunk in pcm.chunks(chunk_samples.max(1)) {
                bytes.clear();
                bytes.extend(chunk.iter().flat_map(|s| s.to_le_bytes()));
                // A closed pipe means the player was stopped.
                if stdin.write_all(&bytes).is_err() {
                    return;
                }
            }
        });

        let slot: PlayerSlot = Arc::new(Mutex::new(Some(child)));
        let watched = Arc::clone(&slot);
        let watcher = std::thread::spawn(move || watch_player(watched, on_complete));

        self.player = Some(slot);
        self.threads = vec![feeder, watcher];
        Ok(())
    }

    fn close(&mut self) {
        if let Some(slot) = self.player.take() {
            stop_player(&slot);
        }
        for t in self.threads.drain(..) {
            let _ = t.join();
        }
        self.device = None;
    }
}

#[cfg(feature = "media-ffmpeg")]
impl Drop for FfmpegAudio {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(not(feature = "media-ffmpeg"))]
impl AudioBackend for FfmpegAudio {
    fn decode(&mut self, _bytes: &[u8]) -> SceneResult<DecodedAudio> {
        Err(SceneError::audio(
            "audio playback requires the 'media-ffmpeg' feature",
        ))
    }

    fn open_device(&mut self, _sample_rate: u32, _buffer_frames: u32) -> SceneResult<()> {
        Err(SceneError::audio(
            "audio playback requires the 'media-ffmpeg' feature",
        ))
    }

    fn play(&mut self, _stream: &DecodedAudio, _on_complete: CompletionCallback) -> SceneResult<()> {
        Err(SceneError::audio(
            "audio playback requires the 'media-ffmpeg' feature",
        ))
    }

    fn close(&mut self) {}
}

#[cfg(feature = "media-ffmpeg")]
#[derive(Clone, Copy, Debug)]
struct SourceFormat {
    sample_rate: u32,
}

/// Read the native sample rate of the first audio stream in `bytes` through `ffprobe`.
#[cfg(feature = "media-ffmpeg")]
fn source_format(bytes: &[u8]) -> SceneResult<SourceFormat> {
    #[derive(serde::Deserialize)]
    struct StreamInfo {
        codec_type: Option<String>,
        sample_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct StreamList {
        streams: Vec<StreamInfo>,
    }

    let mut cmd = Command::new("ffprobe");
    cmd.args([
        "-v",
        "error",
        "-print_format",
        "json",
        "-show_streams",
        "-i",
        "pipe:0",
    ]);
    let out = run_tool(cmd, bytes)?;
    if !out.status.success() {
        return Err(SceneError::audio(format!(
            "ffprobe failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: StreamList = serde_json::from_slice(&out.stdout)
        .map_err(|e| SceneError::audio(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .ok_or_else(|| SceneError::audio("no audio stream found"))?;
    let sample_rate = stream
        .sample_rate
        .as_deref()
        .and_then(|s| s.parse::<u32>().ok())
        .filter(|&r| r > 0)
        .ok_or_else(|| SceneError::audio("missing audio sample rate from ffprobe"))?;

    Ok(SourceFormat { sample_rate })
}

#[cfg(feature = "media-ffmpeg")]
fn run_tool(cmd: Command, input: &[u8]) -> SceneResult<Output> {
    let tool = cmd.get_program().to_string_lossy().into_owned();
    run_with_stdin(cmd, input)
        .map_err(|e| SceneError::audio(format!("failed to run {tool}: {e}")))
}

/// Poll the player until it exits. Only a clean exit counts as the stream playing through.
///
/// Returns without firing `on_complete` once the slot has been emptied by [`stop_player`].
#[cfg(feature = "media-ffmpeg")]
fn watch_player(slot: PlayerSlot, on_complete: CompletionCallback) {
    let status = loop {
        {
            let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            let Some(child) = guard.as_mut() else {
                return;
            };
            match child.try_wait() {
                Ok(None) => {}
                Ok(Some(status)) => {
                    guard.take();
                    break status;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "lost track of the audio player");
                    guard.take();
                    return;
                }
            }
        }
        std::thread::sleep(WATCH_INTERVAL);
    };

    if status.success() {
        on_complete();
    } else {
        tracing::warn!(%status, "audio player exited with an error");
    }
}

/// Kill the player if it is still running. Its watcher returns without completing.
#[cfg(feature = "media-ffmpeg")]
fn stop_player(slot: &PlayerSlot) {
    let child = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(child) = child {
        child.kill();
    }
}

#[cfg(all(test, feature = "media-ffmpeg"))]
#[path = "../../tests/unit/audio/ffmpeg.rs"]
mod tests;
