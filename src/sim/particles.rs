//! Ephemeral visual-effect particles
//!
//! Particles carry no gameplay meaning, but eating, dying, skills and
//! transitions all promise a burst, so their spawn/decay lifecycle lives here.
//! Particles draw from their own RNG stream so cosmetic effects never shift
//! gameplay randomness.

use std::f32::consts::TAU;

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{heading_to_vec, random_between};

/// Translucent white used for bubbles
pub const BUBBLE_COLOR: u32 = 0xFFFFFF;
/// Burst color for hazard explosions
pub const EXPLOSION_COLOR: u32 = 0xFF4444;
/// Burst color for zone arrival
pub const TRANSITION_COLOR: u32 = 0x9966FF;

/// Upward acceleration applied to bubbles
const BUBBLE_BUOYANCY: f32 = 50.0;
/// Particles in an explosion burst
const BURST_COUNT: usize = 15;

/// A particle for visual effects
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds left to live
    pub life: f32,
    /// Starting life (for alpha fade)
    pub max_life: f32,
    pub color: u32,
    pub size: f32,
    /// Bubbles float upward
    pub buoyant: bool,
}

impl Particle {
    /// Opacity in [0, 1], fading linearly with remaining life
    pub fn alpha(&self) -> f32 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }

    fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.life -= dt;
        if self.buoyant {
            self.vel.y -= BUBBLE_BUOYANCY * dt;
        }
    }
}

/// Narrow capability handed to fish so they can request effects without
/// reaching into the whole game state.
pub trait EffectSink {
    /// A puff of `count` bubbles around `pos`
    fn bubbles(&mut self, pos: Vec2, count: usize);
    /// A radial burst (eat/death/explosion) in `color`
    fn burst(&mut self, pos: Vec2, color: u32);
}

/// Owns every live particle
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    max_particles: usize,
    rng: Pcg32,
}

impl ParticleSystem {
    pub fn new(seed: u64, max_particles: usize) -> Self {
        Self {
            particles: Vec::new(),
            max_particles,
            // Separate stream from the gameplay RNG
            rng: Pcg32::new(seed, 0xa02b_dbf7_bb3c_0a7a),
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Add a particle, evicting the oldest when at the cap
    pub fn push(&mut self, particle: Particle) {
        if self.max_particles == 0 {
            return;
        }
        if self.particles.len() >= self.max_particles {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Advance every particle and purge the dead ones
    pub fn update(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.update(dt);
        }
        self.particles.retain(|p| !p.is_dead());
    }

    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        random_between(&mut self.rng, lo, hi)
    }

    /// Spinning ring for the stun pulse plus a small white core burst
    pub fn stun_ring(&mut self, center: Vec2, radius: f32, count: usize, color: u32) {
        for i in 0..count {
            let angle = i as f32 / count as f32 * TAU;
            let r = self.range(20.0, radius);
            let size = self.range(2.0, 4.0);
            self.push(Particle {
                pos: center + heading_to_vec(angle) * r,
                // Tangential, so the ring appears to swirl
                vel: heading_to_vec(angle + std::f32::consts::FRAC_PI_2) * 80.0,
                life: 0.8,
                max_life: 0.8,
                color,
                size,
                buoyant: false,
            });
        }
        for _ in 0..6 {
            let angle = self.range(0.0, TAU);
            let speed = self.range(50.0, 120.0);
            let size = self.range(1.0, 3.0);
            self.push(Particle {
                pos: center,
                vel: heading_to_vec(angle) * speed,
                life: 0.6,
                max_life: 0.6,
                color: 0xFFFFFF,
                size,
                buoyant: false,
            });
        }
    }

    /// Outward ring of eight particles around a boosted fish
    pub fn boost_ring(&mut self, center: Vec2, radius: f32, color: u32) {
        for i in 0..8 {
            let dir = heading_to_vec(i as f32 / 8.0 * TAU);
            self.push(Particle {
                pos: center + dir * radius,
                vel: dir * 60.0,
                life: 1.0,
                max_life: 1.0,
                color,
                size: 3.0,
                buoyant: false,
            });
        }
    }
}

impl EffectSink for ParticleSystem {
    fn bubbles(&mut self, pos: Vec2, count: usize) {
        for _ in 0..count {
            let offset = Vec2::new(self.range(-10.0, 10.0), self.range(-10.0, 10.0));
            let vel = Vec2::new(self.range(-20.0, 20.0), self.range(-30.0, -10.0));
            let life = self.range(1.0, 3.0);
            let size = self.range(2.0, 6.0);
            self.push(Particle {
                pos: pos + offset,
                vel,
                life,
                max_life: life,
                color: BUBBLE_COLOR,
                size,
                buoyant: true,
            });
        }
    }

    fn burst(&mut self, pos: Vec2, color: u32) {
        for i in 0..BURST_COUNT {
            let angle = TAU * i as f32 / BURST_COUNT as f32;
            let speed = self.range(50.0, 150.0);
            let life = self.range(0.5, 1.5);
            let size = self.range(3.0, 8.0);
            self.push(Particle {
                pos,
                vel: heading_to_vec(angle) * speed,
                life,
                max_life: life,
                color,
                size,
                buoyant: false,
            });
        }
    }
}

/// Records effect requests instead of spawning particles
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub bubbles: Vec<(Vec2, usize)>,
    pub bursts: Vec<(Vec2, u32)>,
}

#[cfg(test)]
impl EffectSink for RecordingSink {
    fn bubbles(&mut self, pos: Vec2, count: usize) {
        self.bubbles.push((pos, count));
    }

    fn burst(&mut self, pos: Vec2, color: u32) {
        self.bursts.push((pos, color));
    }
}
