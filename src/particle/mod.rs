//! Particle models stored in the scene log and simulated by the scene player.

use crate::{
    foundation::{core::Canvas, error::SceneResult, rng::Rng64},
    render::surface::Surface,
};

pub(crate) mod ballistic;
pub(crate) mod drift;

/// A simulated entity with a fixed-size record layout.
///
/// `update` advances the state by one implicit fixed step; the scene player calls it once per
/// frame, before [`Particle::draw`].
pub trait Particle: Clone + std::fmt::Debug + Send + 'static {
    /// Short name used in logs.
    const KIND: &'static str;
    /// Exact encoded size of one record in bytes.
    const RECORD_SIZE: usize;

    /// Randomized initial state within the canvas bounds.
    fn spawn(rng: &mut Rng64, canvas: Canvas) -> Self;

    fn update(&mut self, canvas: Canvas);

    /// Self-reported completion. Particles that never finish on their own return `false`.
    fn is_done(&self) -> bool;

    /// Whether the player should drop this particle after the current update.
    fn is_culled(&self, _canvas: Canvas) -> bool {
        self.is_done()
    }

    fn draw(&self, surface: &mut dyn Surface);

    /// Append exactly [`Particle::RECORD_SIZE`] bytes to `out`.
    fn encode(&self, out: &mut Vec<u8>);

    fn decode(bytes: &[u8]) -> SceneResult<Self>;
}
