use glam::Vec3;
use serde::Deserialize;

use super::hall::HallBounds;

#[derive(Debug, Clone, Deserialize)]
pub struct ParticleConfig {
    pub count: usize,
    pub ceiling: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub fall_speed: f32,
}

/// Ambient motes drifting down through the hall; each one that reaches the
/// floor reappears at the ceiling somewhere else.
pub struct ParticleField {
    particles: Vec<Particle>,
    bounds: HallBounds,
    ceiling: f32,
    min_speed: f32,
    max_speed: f32,
    size: f32,
    respawns: u32,
}

/// Integer hash mapped to [0, 1).
fn hash01(n: u32) -> f32 {
    let mut h = n.wrapping_mul(374761393).wrapping_add(668265263);
    h = (h ^ (h >> 13)).wrapping_mul(1274126177);
    h ^= h >> 16;
    (h & 0x00ff_ffff) as f32 / 16_777_216.0
}

impl ParticleField {
    pub fn new(config: &ParticleConfig, bounds: HallBounds) -> Self {
        let mut field = Self {
            particles: Vec::with_capacity(config.count),
            bounds,
            ceiling: config.ceiling.max(0.0),
            min_speed: config.min_speed.min(config.max_speed),
            max_speed: config.max_speed.max(config.min_speed),
            size: config.size,
            respawns: 0,
        };
        for i in 0..config.count as u32 {
            let seed = i.wrapping_mul(4);
            let mut p = field.spawn(seed);
            p.position.y = hash01(seed.wrapping_add(3)) * field.ceiling;
            field.particles.push(p);
        }
        field
    }

    fn spawn(&self, seed: u32) -> Particle {
        let b = &self.bounds;
        let x = b.min_x + hash01(seed) * (b.max_x - b.min_x);
        let z = b.min_z + hash01(seed.wrapping_add(1)) * (b.max_z - b.min_z);
        let fall_speed = self.min_speed + hash01(seed.wrapping_add(2)) * (self.max_speed - self.min_speed);
        Particle { position: Vec3::new(x, self.ceiling, z), fall_speed }
    }

    pub fn update(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        for i in 0..self.particles.len() {
            let p = &mut self.particles[i];
            p.position.y -= p.fall_speed * dt;
            if p.position.y < 0.0 {
                self.respawns = self.respawns.wrapping_add(1);
                let seed = 0x9e37_79b9u32.wrapping_add(self.respawns.wrapping_mul(4));
                let fresh = self.spawn(seed);
                self.particles[i] = fresh;
            }
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
