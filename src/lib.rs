//! scenelog pre-generates a short animated show into a binary scene log and plays it back.
//!
//! A show is a sequence of scenes. Each scene is written once as a 12-byte marker, a
//! length-prefixed audio blob and a fixed number of particle records. Playback scans the log for
//! the marker, plays the audio on a background task and reveals the particles frame by frame:
//!
//! - Generate the log with [`create_show`]
//! - Build a [`Show`] and drive it from a [`FrameLoop`] over a [`Surface`]
//! - Optionally stream frames into a [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod audio;
pub(crate) mod config;
pub(crate) mod encode;
pub(crate) mod particle;
pub(crate) mod process;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod scene_log;

pub use crate::foundation::core::{Canvas, FrameIndex, Rgba8};
pub use crate::foundation::error::{SceneError, SceneResult};
pub use crate::foundation::rng::Rng64;

pub use crate::audio::backend::{
    AudioBackend, BackendFactory, CompletionCallback, DecodedAudio, SilentAudio, StreamFormat,
};
pub use crate::audio::ffmpeg::FfmpegAudio;
pub use crate::audio::task::{AudioHandle, PlaybackOutcome, SIGNAL_CAPACITY, spawn_playback};
pub use crate::config::{SceneSettings, ScenesConfig, ShowConfig};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::png::PngSequenceSink;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::particle::Particle;
pub use crate::particle::ballistic::BallisticParticle;
pub use crate::particle::drift::DriftParticle;
pub use crate::process::is_tool_on_path;
pub use crate::render::cpu::{CpuSurface, DEFAULT_FONT_SIZE_PX};
pub use crate::render::frame_loop::{CanvasConfig, FrameLoop, LoopControl, LoopStats};
pub use crate::render::surface::{DrawCall, FrameRGBA, RecordingSurface, Surface};
pub use crate::scene::Scene;
pub use crate::scene::decor::{Caption, Decor};
pub use crate::scene::player::{PlayerConfig, PlayerPhase, ScenePlayer};
pub use crate::scene::show::{CreatedScenes, Show, create_show};
pub use crate::scene_log::codec::{MARKER_LEN, Marker};
pub use crate::scene_log::locator::{LocatedScene, ParticleStream, locate, scan_for_marker};
pub use crate::scene_log::writer::{remove_log, write_scene};
