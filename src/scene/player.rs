use std::path::PathBuf;

use crate::{
    audio::{
        backend::BackendFactory,
        task::{AudioHandle, PlaybackOutcome, spawn_playback},
    },
    foundation::{core::Canvas, error::SceneResult, rng::Rng64},
    particle::Particle,
    render::surface::Surface,
    scene::{Scene, decor::Decor},
    scene_log::{
        codec::Marker,
        locator::{ParticleStream, locate},
    },
};

/// Static description of one scene's playback.
#[derive(Clone, Debug)]
pub struct PlayerConfig {
    pub name: String,
    pub log_path: PathBuf,
    pub marker: Marker,
    /// Number of records to admit before the scene can finish.
    pub total: usize,
    /// Per-frame admission probability.
    pub admission: f64,
    pub canvas: Canvas,
    pub decor: Decor,
}

/// Lifecycle of a [`ScenePlayer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerPhase {
    Uninitialized,
    Playing,
    Finished,
}

enum PlayerState<P> {
    Uninitialized,
    Playing(Playing<P>),
    Finished,
}

struct Playing<P> {
    records: ParticleStream,
    audio: Option<AudioHandle>,
    /// One slot per admitted record; `None` once culled.
    slots: Vec<Option<P>>,
}

/// Plays one scene from the log: lazily locates it, runs its audio on a background task and
/// reveals its particles a frame at a time.
pub struct ScenePlayer<P: Particle> {
    cfg: PlayerConfig,
    audio: BackendFactory,
    rng: Rng64,
    state: PlayerState<P>,
    admitted: usize,
    /// Stopped audio task, kept until [`Scene::shutdown`] reaps it.
    stopped_audio: Option<AudioHandle>,
}

impl<P: Particle> std::fmt::Debug for ScenePlayer<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenePlayer")
            .field("name", &self.cfg.name)
            .field("kind", &P::KIND)
            .field("phase", &self.phase())
            .field("admitted", &self.admitted)
            .field("total", &self.cfg.total)
            .finish_non_exhaustive()
    }
}

impl<P: Particle> ScenePlayer<P> {
    /// `rng` drives admission draws only.
    pub fn new(cfg: PlayerConfig, audio: BackendFactory, rng: Rng64) -> Self {
        Self {
            cfg,
            audio,
            rng,
            state: PlayerState::Uninitialized,
            admitted: 0,
            stopped_audio: None,
        }
    }

    pub fn phase(&self) -> PlayerPhase {
        match self.state {
            PlayerState::Uninitialized => PlayerPhase::Uninitialized,
            PlayerState::Playing(_) => PlayerPhase::Playing,
            PlayerState::Finished => PlayerPhase::Finished,
        }
    }

    /// Records admitted so far. Never decreases and never exceeds [`ScenePlayer::total`].
    pub fn admitted(&self) -> usize {
        self.admitted
    }

    pub fn total(&self) -> usize {
        self.cfg.total
    }

    /// Admitted particles not yet culled.
    pub fn live(&self) -> usize {
        match &self.state {
            PlayerState::Playing(p) => p.slots.iter().flatten().count(),
            _ => 0,
        }
    }

    /// Advance one frame.
    ///
    /// On the first call the scene is located and its audio started. Every call then updates and
    /// draws the live particles, culls the ones that are done, possibly admits one more record,
    /// and finishes the scene once all records were admitted and culled. Any error finishes the
    /// scene before it is returned.
    pub fn tick(&mut self, surface: &mut dyn Surface) -> SceneResult<()> {
        if let PlayerState::Uninitialized = self.state {
            match self.start() {
                Ok(playing) => self.state = PlayerState::Playing(playing),
                Err(e) => {
                    self.state = PlayerState::Finished;
                    return Err(e);
                }
            }
        }

        let PlayerState::Playing(playing) = &mut self.state else {
            return Ok(());
        };

        let canvas = self.cfg.canvas;
        self.cfg
            .decor
            .draw(surface, canvas, self.admitted, self.cfg.total);

        for slot in playing.slots.iter_mut() {
            let Some(p) = slot else { continue };
            p.update(canvas);
            p.draw(surface);
            if p.is_culled(canvas) {
                *slot = None;
            }
        }

        // The draw happens every frame, even once everything is admitted.
        if self.rng.chance(self.cfg.admission) && self.admitted < self.cfg.total {
            match playing.records.next_record::<P>() {
                Ok(p) => {
                    playing.slots.push(Some(p));
                    self.admitted += 1;
                    tracing::debug!(
                        scene = %self.cfg.name,
                        admitted = self.admitted,
                        total = self.cfg.total,
                        "particle admitted"
                    );
                }
                Err(e) => {
                    self.finish();
                    return Err(e);
                }
            }
        }

        if self.is_complete() {
            self.finish();
        }
        Ok(())
    }

    fn is_complete(&self) -> bool {
        match &self.state {
            PlayerState::Playing(p) => {
                self.admitted >= self.cfg.total && p.slots.iter().all(Option::is_none)
            }
            PlayerState::Uninitialized => false,
            PlayerState::Finished => true,
        }
    }

    #[tracing::instrument(skip(self), fields(scene = %self.cfg.name, marker = %self.cfg.marker))]
    fn start(&mut self) -> SceneResult<Playing<P>> {
        let located = locate(&self.cfg.log_path, &self.cfg.marker)?;

        let audio = match spawn_playback((self.audio)(), located.audio) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "audio task not started, scene continues silently");
                None
            }
        };

        tracing::info!(total = self.cfg.total, kind = P::KIND, "scene playing");
        Ok(Playing {
            records: located.records,
            audio,
            slots: Vec::with_capacity(self.cfg.total),
        })
    }

    /// Leave `Playing` exactly once: stop the audio and close the log handle.
    fn finish(&mut self) {
        let previous = std::mem::replace(&mut self.state, PlayerState::Finished);
        if let PlayerState::Playing(playing) = previous {
            if let Some(audio) = playing.audio {
                audio.stop();
                self.stopped_audio = Some(audio);
            }
            drop(playing.records);
            tracing::info!(
                scene = %self.cfg.name,
                admitted = self.admitted,
                "scene finished"
            );
        }
    }
}

impl<P: Particle> Scene for ScenePlayer<P> {
    fn name(&self) -> &str {
        &self.cfg.name
    }

    fn draw(&mut self, surface: &mut dyn Surface) -> SceneResult<()> {
        self.tick(surface)
    }

    fn is_over(&self) -> bool {
        self.phase() == PlayerPhase::Finished
    }

    fn abandon(&mut self) {
        self.finish();
    }

    fn shutdown(&mut self) -> Option<PlaybackOutcome> {
        self.abandon();
        let outcome = self.stopped_audio.take()?.stop_and_join();
        tracing::debug!(scene = %self.cfg.name, ?outcome, "audio task reaped");
        outcome
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/player.rs"]
mod tests;
