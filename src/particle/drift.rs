use std::f64::consts::PI;

use crate::{
    foundation::{
        core::{Canvas, Rgba8},
        error::SceneResult,
        rng::Rng64,
    },
    particle::Particle,
    render::surface::Surface,
    scene_log::codec::{FieldReader, FieldWriter},
};

/// Falling particle swaying on an orbit around the canvas center line (a snowflake).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DriftParticle {
    pub x: f64,
    pub y: f64,
    /// Fixed angular rate; the orbital phase is derived from it and `lifetime`.
    pub angle: f64,
    pub size: f64,
    pub radius: f64,
    pub lifetime: f64,
}

impl DriftParticle {
    pub const MIN_SIZE: f64 = 1.5;
    pub const SIZE_SPREAD: f64 = 2.0;
    pub const LIFETIME_STEP: f64 = 0.02;
    const PHASE_SCALE: f64 = 0.2;
    const PHASE_OFFSET: f64 = 200.0;
    /// Size at which a particle is drawn fully opaque.
    const OPAQUE_SIZE: f64 = 3.5;

    fn phase(&self) -> f64 {
        Self::PHASE_SCALE * (self.lifetime + Self::PHASE_OFFSET) * self.angle
    }
}

impl Particle for DriftParticle {
    const KIND: &'static str = "drift";
    const RECORD_SIZE: usize = 6 * 8;

    fn spawn(rng: &mut Rng64, canvas: Canvas) -> Self {
        let half_width = canvas.width_f64() / 2.0;
        Self {
            x: rng.next_f64_01() * canvas.width_f64(),
            y: 0.0,
            angle: 2.0 * PI * rng.next_f64_01(),
            size: Self::MIN_SIZE + rng.next_f64_01() * Self::SIZE_SPREAD,
            radius: (rng.next_f64_01() * half_width.powi(2)).sqrt(),
            lifetime: 0.0,
        }
    }

    fn update(&mut self, canvas: Canvas) {
        let phase = self.phase();
        self.x = canvas.width_f64() / 2.0 + self.radius * phase.sin();
        self.y += self.size;
        self.lifetime += Self::LIFETIME_STEP;
    }

    fn is_done(&self) -> bool {
        false
    }

    fn is_culled(&self, canvas: Canvas) -> bool {
        self.y > canvas.height_f64()
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.set_color(Rgba8::WHITE.with_opacity(self.size / Self::OPAQUE_SIZE));
        surface.fill_circle(self.x, self.y, self.size);
    }

    fn encode(&self, out: &mut Vec<u8>) {
        FieldWriter::new(out)
            .f64(self.x)
            .f64(self.y)
            .f64(self.angle)
            .f64(self.size)
            .f64(self.radius)
            .f64(self.lifetime);
    }

    fn decode(bytes: &[u8]) -> SceneResult<Self> {
        let mut r = FieldReader::new(bytes);
        let p = Self {
            x: r.f64()?,
            y: r.f64()?,
            angle: r.f64()?,
            size: r.f64()?,
            radius: r.f64()?,
            lifetime: r.f64()?,
        };
        r.finish()?;
        Ok(p)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/particle/drift.rs"]
mod tests;
