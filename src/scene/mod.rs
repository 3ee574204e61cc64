//! Scene playback: the per-scene player, its decorations, and the show that sequences scenes.

use crate::{
    audio::task::PlaybackOutcome, foundation::error::SceneResult, render::surface::Surface,
};

pub(crate) mod decor;
pub(crate) mod player;
pub(crate) mod show;

/// A scene driven once per frame by the show.
pub trait Scene {
    fn name(&self) -> &str;

    /// Draw one frame. An error means the scene cannot be played; the caller abandons it.
    fn draw(&mut self, surface: &mut dyn Surface) -> SceneResult<()>;

    fn is_over(&self) -> bool;

    /// Mark the scene finished without playing it further.
    fn abandon(&mut self);

    /// Finish the scene and wait for its background work to end.
    fn shutdown(&mut self) -> Option<PlaybackOutcome>;
}
