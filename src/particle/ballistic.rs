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

/// Number of points in an explosion burst.
pub const BURST_POINTS: usize = 120;

/// Burst radius growth per tick since the apex.
pub const BURST_SPEED: f64 = 6.0;

/// Seed of the burst-local generator. Reseeded for every burst computation so the layout is
/// identical from frame to frame.
const BURST_SEED: u64 = 0;

/// Rocket that decelerates to its apex and then bursts into a ring of points (a firework).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BallisticParticle {
    pub x: f64,
    pub y: f64,
    pub vy: f64,
    pub size: f64,
    pub acc: f64,
    /// Ticks elapsed since the apex; zero until the rocket explodes.
    pub exploded_time: f64,
    pub finished: bool,
    pub color: Rgba8,
}

impl BallisticParticle {
    pub const MIN_SPEED: f64 = 10.0;
    pub const SPEED_SPREAD: f64 = 5.0;
    pub const MIN_SIZE: f64 = 4.0;
    pub const SIZE_SPREAD: f64 = 3.0;
    pub const ACCELERATION: f64 = -0.2;

    pub fn is_exploded(&self) -> bool {
        self.exploded_time > 0.0
    }

    /// Positions of the burst points for the current explosion time.
    pub fn burst_points(&self) -> Vec<(f64, f64)> {
        let mut rng = Rng64::new(BURST_SEED);
        let amplitude = self.exploded_time * BURST_SPEED;
        (0..BURST_POINTS)
            .map(|i| {
                let degrees = (i * 360 / BURST_POINTS) as f64;
                let radians = degrees * PI / 180.0;
                let cx = self.x + amplitude * radians.sin() * rng.next_f64_01();
                let cy = self.y + amplitude * radians.cos() * rng.next_f64_01();
                (cx, cy)
            })
            .collect()
    }
}

impl Particle for BallisticParticle {
    const KIND: &'static str = "ballistic";
    const RECORD_SIZE: usize = 6 * 8 + 1 + 4;

    fn spawn(rng: &mut Rng64, canvas: Canvas) -> Self {
        Self {
            x: rng.next_f64_01() * canvas.width_f64(),
            y: canvas.height_f64(),
            vy: Self::MIN_SPEED + rng.next_f64_01() * Self::SPEED_SPREAD,
            size: Self::MIN_SIZE + rng.next_f64_01() * Self::SIZE_SPREAD,
            acc: Self::ACCELERATION,
            exploded_time: 0.0,
            finished: false,
            color: Rgba8::opaque(rng.next_u8(), rng.next_u8(), rng.next_u8()),
        }
    }

    fn update(&mut self, canvas: Canvas) {
        self.vy += self.acc;
        self.y -= self.vy;

        if self.vy <= 0.0 {
            self.exploded_time += 1.0;
        }

        if self.is_exploded() {
            let height = canvas.height_f64();
            self.finished = self.burst_points().iter().all(|&(_, cy)| cy > height);
        }
    }

    fn is_done(&self) -> bool {
        self.finished
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.set_color(self.color);
        if !self.is_exploded() {
            surface.fill_circle(self.x, self.y, self.size);
            return;
        }
        for (cx, cy) in self.burst_points() {
            surface.fill_circle(cx, cy, self.size / 2.0);
        }
    }

    fn encode(&self, out: &mut Vec<u8>) {
        FieldWriter::new(out)
            .f64(self.x)
            .f64(self.y)
            .f64(self.vy)
            .f64(self.size)
            .f64(self.acc)
            .f64(self.exploded_time)
            .bool(self.finished)
            .u8(self.color.r)
            .u8(self.color.g)
            .u8(self.color.b)
            .u8(self.color.a);
    }

    fn decode(bytes: &[u8]) -> SceneResult<Self> {
        let mut r = FieldReader::new(bytes);
        let p = Self {
            x: r.f64()?,
            y: r.f64()?,
            vy: r.f64()?,
            size: r.f64()?,
            acc: r.f64()?,
            exploded_time: r.f64()?,
            finished: r.bool()?,
            color: Rgba8::new(r.u8()?, r.u8()?, r.u8()?, r.u8()?),
        };
        r.finish()?;
        Ok(p)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/particle/ballistic.rs"]
mod tests;
