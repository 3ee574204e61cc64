//! Scene audio: backends that decode and play an encoded blob, and the playback task that runs
//! one backend per scene on its own thread.

pub(crate) mod backend;
pub(crate) mod ffmpeg;
pub(crate) mod task;
