use std::{
    sync::mpsc::{Receiver, SyncSender, sync_channel},
    thread::JoinHandle,
};

use crate::{
    audio::backend::AudioBackend,
    foundation::error::{SceneError, SceneResult},
};

/// Slots in the completion channel. Both the completion callback and a stop request can be
/// buffered without either writer blocking.
pub const SIGNAL_CAPACITY: usize = 2;

/// How a playback task ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// The stream played to its end.
    Completed,
    /// A stop was requested before the stream ended.
    Stopped,
    DecodeFailed,
    DeviceFailed,
    PlayFailed,
}

/// Owner side of a running playback task.
///
/// Dropping the handle requests a stop but does not wait for the task.
#[derive(Debug)]
pub struct AudioHandle {
    signal: SyncSender<bool>,
    thread: Option<JoinHandle<PlaybackOutcome>>,
}

impl AudioHandle {
    /// Ask the task to stop. Never blocks; a no-op once the task is gone or already signaled.
    pub fn stop(&self) {
        let _ = self.signal.try_send(false);
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Wait for the task to end on its own.
    pub fn join(mut self) -> Option<PlaybackOutcome> {
        self.thread.take()?.join().ok()
    }

    /// Request a stop, then wait for the task.
    pub fn stop_and_join(self) -> Option<PlaybackOutcome> {
        self.stop();
        self.join()
    }
}

impl Drop for AudioHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start playing `audio` on a dedicated thread.
///
/// The task decodes the bytes, opens the device at the stream's native rate and starts playback,
/// then blocks until either the stream completes or [`AudioHandle::stop`] is called. It closes the
/// device exactly once before exiting. Decode and device failures end the task without a signal.
pub fn spawn_playback(backend: Box<dyn AudioBackend>, audio: Vec<u8>) -> SceneResult<AudioHandle> {
    let (signal, done) = sync_channel::<bool>(SIGNAL_CAPACITY);
    let completion = signal.clone();
    let thread = std::thread::Builder::new()
        .name("scene-audio".to_string())
        .spawn(move || run_playback(backend, &audio, completion, done))
        .map_err(|e| SceneError::audio(format!("failed to spawn audio thread: {e}")))?;

    Ok(AudioHandle {
        signal,
        thread: Some(thread),
    })
}

#[tracing::instrument(skip_all, fields(audio_len = audio.len()))]
fn run_playback(
    mut backend: Box<dyn AudioBackend>,
    audio: &[u8],
    completion: SyncSender<bool>,
    done: Receiver<bool>,
) -> PlaybackOutcome {
    let stream = match backend.decode(audio) {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!(error = %e, "audio decode failed, scene continues without sound");
            return PlaybackOutcome::DecodeFailed;
        }
    };

    let format = stream.format;
    if let Err(e) = backend.open_device(format.sample_rate, format.buffer_frames()) {
        tracing::warn!(error = %e, sample_rate = format.sample_rate, "audio device init failed");
        return PlaybackOutcome::DeviceFailed;
    }

    let on_complete = Box::new(move || {
        let _ = completion.try_send(true);
    });
    if let Err(e) = backend.play(&stream, on_complete) {
        tracing::warn!(error = %e, "audio playback failed to start");
        backend.close();
        return PlaybackOutcome::PlayFailed;
    }
    tracing::debug!(
        sample_rate = format.sample_rate,
        seconds = stream.duration().as_secs_f64(),
        "audio playing"
    );

    // All senders gone counts as a stop.
    let natural = done.recv().unwrap_or(false);
    backend.close();

    if natural {
        tracing::debug!("audio completed");
        PlaybackOutcome::Completed
    } else {
        tracing::debug!("audio stopped");
        PlaybackOutcome::Stopped
    }
}
