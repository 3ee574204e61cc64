use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::{
    foundation::error::{SceneError, SceneResult},
    render::{cpu::DEFAULT_FONT_SIZE_PX, frame_loop::CanvasConfig},
    scene_log::codec::Marker,
};

/// Chance of writing the snowfall scene.
pub const FIRST_SCENE_CHANCE: f64 = 0.91;
/// Chance of also writing the fireworks scene once the snowfall scene exists, so that both are
/// present 81% of the time.
pub const SECOND_SCENE_CHANCE: f64 = 0.81 / FIRST_SCENE_CHANCE;

/// Settings for the whole show, loaded from JSON. Every field has a default.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShowConfig {
    pub canvas: CanvasConfig,
    /// Scene log location; rewritten on every run.
    pub log_path: PathBuf,
    pub first_scene_chance: f64,
    pub second_scene_chance: f64,
    /// Font used for captions. Captions are skipped without one.
    pub font_path: Option<PathBuf>,
    pub font_size_px: f32,
    pub scenes: ScenesConfig,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            log_path: PathBuf::from("cartoon.bin"),
            first_scene_chance: FIRST_SCENE_CHANCE,
            second_scene_chance: SECOND_SCENE_CHANCE,
            font_path: None,
            font_size_px: DEFAULT_FONT_SIZE_PX,
            scenes: ScenesConfig::default(),
        }
    }
}

/// Per-scene settings. A scene block, when present, must be complete apart from `audio_path`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneSettings {
    /// 12-byte ASCII marker that anchors the scene in the log.
    pub marker: String,
    /// Particles written to the log and admitted during playback.
    pub count: usize,
    /// Per-frame probability of admitting the next particle.
    pub admission: f64,
    /// Encoded audio embedded in the log.
    #[serde(default)]
    pub audio_path: Option<PathBuf>,
}

impl SceneSettings {
    pub fn snowfall() -> Self {
        Self {
            marker: "firstscene..".to_string(),
            count: 100,
            admission: 0.23,
            audio_path: None,
        }
    }

    pub fn fireworks() -> Self {
        Self {
            marker: "secondscene.".to_string(),
            count: 25,
            admission: 0.04,
            audio_path: None,
        }
    }

    pub fn marker(&self) -> SceneResult<Marker> {
        Marker::try_from(self.marker.as_str())
    }

    /// Read the audio file to embed.
    ///
    /// A missing file yields an empty blob (a silent scene) with a warning.
    pub fn read_audio(&self) -> SceneResult<Vec<u8>> {
        let Some(path) = self.audio_path.as_deref() else {
            return Ok(Vec::new());
        };
        match std::fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "audio file not found, scene will be silent");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn validate(&self, name: &str) -> SceneResult<Marker> {
        let marker = self.marker()?;
        if !(0.0..=1.0).contains(&self.admission) {
            return Err(SceneError::validation(format!(
                "{name}.admission must be within [0, 1], got {}",
                self.admission
            )));
        }
        Ok(marker)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenesConfig {
    #[serde(default = "SceneSettings::snowfall")]
    pub snowfall: SceneSettings,
    #[serde(default = "SceneSettings::fireworks")]
    pub fireworks: SceneSettings,
}

impl Default for ScenesConfig {
    fn default() -> Self {
        Self {
            snowfall: SceneSettings::snowfall(),
            fireworks: SceneSettings::fireworks(),
        }
    }
}

impl ShowConfig {
    /// Parse a config from a JSON reader. The result is not validated.
    pub fn from_reader<R: std::io::Read>(r: R) -> SceneResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| SceneError::validation(format!("parse show config JSON: {e}")))
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SceneError::validation(format!("open show config '{}': {e}", path.display()))
        })?;
        let cfg = Self::from_reader(BufReader::new(f))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> SceneResult<()> {
        self.canvas.validate()?;
        for (name, p) in [
            ("first_scene_chance", self.first_scene_chance),
            ("second_scene_chance", self.second_scene_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SceneError::validation(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(SceneError::validation("font_size_px must be finite and > 0"));
        }

        let snowfall = self.scenes.snowfall.validate("snowfall")?;
        let fireworks = self.scenes.fireworks.validate("fireworks")?;
        if snowfall == fireworks {
            return Err(SceneError::validation(format!(
                "scene markers must differ, both are '{snowfall}'"
            )));
        }
        Ok(())
    }

    /// Read the configured font, if any.
    pub fn read_font(&self) -> SceneResult<Option<Vec<u8>>> {
        let Some(path) = self.font_path.as_deref() else {
            return Ok(None);
        };
        use anyhow::Context as _;
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font '{}'", path.display()))?;
        Ok(Some(bytes))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
