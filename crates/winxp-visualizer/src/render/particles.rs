use egui::{pos2, vec2, Painter, Pos2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::color::{glow_circle, hsl, hsla};
use super::Viewport;
use crate::audio::FrequencySnapshot;
use crate::config::VisualizerConfig;

// Particle drifting across the surface, in logical units
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Pos2,
    pub vel: Vec2,
    pub size: f32,
}

impl Particle {
    fn random(rng: &mut StdRng, width: f32, height: f32) -> Self {
        Self {
            pos: pos2(
                wrap(rng.random::<f32>() * width, width),
                wrap(rng.random::<f32>() * height, height),
            ),
            vel: vec2(
                (rng.random::<f32>() - 0.5) * 2.0,
                (rng.random::<f32>() - 0.5) * 2.0,
            ),
            size: rng.random::<f32>() * 3.0 + 1.0,
        }
    }

    fn update(&mut self, speed: f32, width: f32, height: f32) {
        self.pos += self.vel * speed;
        self.pos.x = wrap(self.pos.x, width);
        self.pos.y = wrap(self.pos.y, height);
    }
}

/// Wrap `value` into `[0, extent)`.
fn wrap(value: f32, extent: f32) -> f32 {
    if !value.is_finite() || extent <= 0.0 {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

/// How one particle looks this frame, in logical units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleStyle {
    pub hue: f32,
    pub alpha: f32,
    pub radius: f32,
}

/// Particle `index` reads bin `index mod N`: louder bins shift the hue toward
/// magenta, raise opacity and grow the particle up to twice its size.
pub fn style(
    particle: &Particle,
    index: usize,
    snapshot: FrequencySnapshot<'_>,
) -> ParticleStyle {
    let freq = snapshot.normalized_wrapping(index);
    ParticleStyle {
        hue: freq * 120.0 + 200.0,
        alpha: freq * 0.8 + 0.2,
        radius: particle.size * (1.0 + freq),
    }
}

/// Session-long particle pool, allocated on the first particle-mode frame.
pub struct ParticleField {
    particles: Vec<Particle>,
    capacity: usize,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            capacity,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_allocated(&self) -> bool {
        !self.particles.is_empty()
    }

    /// Integrate one frame. Speed scales with the mean magnitude of
    /// `snapshot`.
    pub fn step(&mut self, snapshot: FrequencySnapshot<'_>, width: f32, height: f32) {
        if self.particles.is_empty() {
            for _ in 0..self.capacity {
                let p = Particle::random(&mut self.rng, width, height);
                self.particles.push(p);
            }
        }

        let intensity = snapshot.mean_intensity();
        let speed = 1.0 + intensity * 2.0;
        for p in &mut self.particles {
            p.update(speed, width, height);
        }
    }

    pub fn draw(
        &mut self,
        painter: &Painter,
        viewport: &Viewport,
        snapshot: FrequencySnapshot<'_>,
        cfg: &VisualizerConfig,
    ) {
        self.step(snapshot, viewport.width, viewport.height);

        let scale = viewport.scale();
        let blur = cfg.particle_glow_blur * scale;
        for (i, p) in self.particles.iter().enumerate() {
            let look = style(p, i, snapshot);
            let center = viewport.pos(p.pos);
            let radius = look.radius * scale;

            glow_circle(painter, center, radius, hsl(look.hue, 1.0, 0.5), blur);
            painter.circle_filled(center, radius, hsla(look.hue, 1.0, 0.6, look.alpha));
        }
    }
}
