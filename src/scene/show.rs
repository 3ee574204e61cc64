use crate::{
    audio::backend::BackendFactory,
    config::{SceneSettings, ShowConfig},
    foundation::{
        core::Canvas,
        error::{SceneError, SceneResult},
        rng::Rng64,
    },
    particle::{Particle, ballistic::BallisticParticle, drift::DriftParticle},
    render::{frame_loop::LoopControl, surface::Surface},
    scene::{
        Scene,
        decor::Decor,
        player::{PlayerConfig, ScenePlayer},
    },
    scene_log::writer::{remove_log, write_scene},
};

/// Stream labels for [`Rng64::fork`].
const SPAWN_STREAM: u64 = 1;
const SNOWFALL_STREAM: u64 = 2;
const FIREWORKS_STREAM: u64 = 3;

/// Which scenes [`create_show`] wrote into the log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CreatedScenes {
    pub snowfall: bool,
    pub fireworks: bool,
}

/// Regenerate the scene log.
///
/// Removes the previous log, then writes the snowfall scene with `first_scene_chance` and, only
/// if it was written, the fireworks scene with `second_scene_chance`. A scene that fails to write
/// is logged and left out; only validation and log removal errors are returned.
#[tracing::instrument(skip_all, fields(log = %cfg.log_path.display()))]
pub fn create_show(cfg: &ShowConfig, rng: &mut Rng64) -> SceneResult<CreatedScenes> {
    cfg.validate()?;
    let canvas = Canvas::new(cfg.canvas.width, cfg.canvas.height)?;

    if remove_log(&cfg.log_path)? {
        tracing::info!("previous scene log removed");
    } else {
        tracing::warn!("no previous scene log to remove");
    }

    let mut spawn_rng = rng.fork(SPAWN_STREAM);
    let mut created = CreatedScenes::default();

    if rng.chance(cfg.first_scene_chance) {
        created.snowfall = write_logged::<DriftParticle>(
            "snowfall",
            cfg,
            &cfg.scenes.snowfall,
            canvas,
            &mut spawn_rng,
        );
    } else {
        tracing::warn!("snowfall scene was not created");
    }

    if created.snowfall && rng.chance(cfg.second_scene_chance) {
        created.fireworks = write_logged::<BallisticParticle>(
            "fireworks",
            cfg,
            &cfg.scenes.fireworks,
            canvas,
            &mut spawn_rng,
        );
    } else {
        tracing::warn!("fireworks scene was not created");
    }

    Ok(created)
}

fn write_logged<P: Particle>(
    name: &str,
    cfg: &ShowConfig,
    scene: &SceneSettings,
    canvas: Canvas,
    rng: &mut Rng64,
) -> bool {
    match write_settings::<P>(cfg, scene, canvas, rng) {
        Ok(()) => {
            tracing::info!(scene = name, "scene created");
            true
        }
        Err(e) => {
            tracing::warn!(scene = name, error = %e, "scene not created");
            false
        }
    }
}

fn write_settings<P: Particle>(
    cfg: &ShowConfig,
    scene: &SceneSettings,
    canvas: Canvas,
    rng: &mut Rng64,
) -> SceneResult<()> {
    let marker = scene.marker()?;
    let audio = scene.read_audio()?;
    write_scene(&cfg.log_path, &marker, &audio, scene.count, || {
        P::spawn(rng, canvas)
    })
}

/// Sequential driver over a fixed list of scenes.
///
/// Each frame goes to the first scene that is not over. A scene that fails is logged as skipped
/// and abandoned, and the same frame falls through to the next scene. Once every scene is over
/// the frame returns [`LoopControl::Exit`].
pub struct Show {
    scenes: Vec<Box<dyn Scene>>,
}

impl std::fmt::Debug for Show {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.scenes.iter().map(|s| (s.name(), s.is_over())))
            .finish()
    }
}

impl Show {
    pub fn new(scenes: Vec<Box<dyn Scene>>) -> Self {
        Self { scenes }
    }

    /// Snowfall followed by fireworks, both read from the configured log.
    ///
    /// Both scenes are always present; a scene missing from the log is skipped on its first frame.
    pub fn from_config(cfg: &ShowConfig, audio: BackendFactory, rng: &mut Rng64) -> SceneResult<Self> {
        cfg.validate()?;
        let canvas = Canvas::new(cfg.canvas.width, cfg.canvas.height)?;

        let player_config = |name: &str, scene: &SceneSettings, decor: Decor| {
            Ok::<_, SceneError>(PlayerConfig {
                name: name.to_string(),
                log_path: cfg.log_path.clone(),
                marker: scene.marker()?,
                total: scene.count,
                admission: scene.admission,
                canvas,
                decor,
            })
        };

        let snowfall = ScenePlayer::<DriftParticle>::new(
            player_config("snowfall", &cfg.scenes.snowfall, Decor::snowfall())?,
            audio.clone(),
            rng.fork(SNOWFALL_STREAM),
        );
        let fireworks = ScenePlayer::<BallisticParticle>::new(
            player_config("fireworks", &cfg.scenes.fireworks, Decor::fireworks())?,
            audio,
            rng.fork(FIREWORKS_STREAM),
        );

        Ok(Self::new(vec![Box::new(snowfall), Box::new(fireworks)]))
    }

    pub fn is_over(&self) -> bool {
        self.scenes.iter().all(|s| s.is_over())
    }

    /// Name of the scene that receives the next frame.
    pub fn current(&self) -> Option<&str> {
        self.scenes.iter().find(|s| !s.is_over()).map(|s| s.name())
    }

    /// One frame of the frame loop.
    pub fn draw_frame(&mut self, surface: &mut dyn Surface) -> LoopControl {
        for scene in self.scenes.iter_mut().filter(|s| !s.is_over()) {
            match scene.draw(surface) {
                Ok(()) => return LoopControl::Continue,
                Err(e) if e.is_not_found() => {
                    tracing::warn!(
                        scene = scene.name(),
                        error = %e,
                        "scene skipped, marker not found"
                    );
                }
                Err(e) => {
                    tracing::warn!(scene = scene.name(), error = %e, "scene skipped");
                }
            }
            scene.abandon();
        }
        LoopControl::Exit
    }

    /// Finish every scene and wait for their audio tasks.
    pub fn shutdown(&mut self) {
        for scene in &mut self.scenes {
            scene.shutdown();
        }
    }
}

impl Drop for Show {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/show.rs"]
mod tests;
