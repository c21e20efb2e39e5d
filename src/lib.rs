//! Reef Rush - a grow-by-eating reef arena game
//!
//! Core modules:
//! - `sim`: Simulation engine (fish, AI, interactions, skills, zones)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Nominal frame step (60 Hz) used by the headless runner and tests
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Eat threshold: prey must be strictly smaller than this fraction of the predator
    pub const EAT_RATIO: f32 = 0.8;
    /// Growth step when the accumulator reaches twice the current size
    pub const GROWTH_STEP: f32 = 2.0;

    /// AI re-evaluation cadence (simulated seconds)
    pub const AI_REEVAL_SECS: f32 = 2.0;
    /// AI prey scan radius
    pub const AI_PREY_RADIUS: f32 = 200.0;
    /// AI predator scan radius
    pub const AI_PREDATOR_RADIUS: f32 = 150.0;
    /// Anything larger than this multiple of our size is a threat
    pub const AI_PREDATOR_RATIO: f32 = 1.2;
    /// Per-tick chance of nudging the wander heading
    pub const AI_WANDER_NUDGE_CHANCE: f64 = 0.02;
    /// Maximum wander nudge (radians)
    pub const AI_WANDER_NUDGE: f32 = 0.5;

    /// Seconds between trail bubble puffs
    pub const TRAIL_PERIOD: f32 = 0.3;
    /// Bubbles per trail puff
    pub const TRAIL_BUBBLES: usize = 2;

    /// Barrier spawn offset ahead of the caster
    pub const BARRIER_OFFSET: f32 = 60.0;
    /// Extra clearance when pushing a fish off a barrier
    pub const BARRIER_CLEARANCE: f32 = 5.0;
    /// Random velocity jitter after a barrier bounce (per axis)
    pub const BARRIER_JITTER: f32 = 20.0;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Angle of the vector pointing from `from` to `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Linear interpolation
#[inline]
pub fn lerp(start: f32, end: f32, factor: f32) -> f32 {
    start + (end - start) * factor
}

/// Strict circle overlap test (touching circles do not overlap)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Unit vector for a heading angle
#[inline]
pub fn heading_to_vec(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Clamp a point into the square world `[0, extent]²`
#[inline]
pub fn clamp_to_world(pos: Vec2, extent: f32) -> Vec2 {
    pos.clamp(Vec2::ZERO, Vec2::splat(extent))
}

/// Uniform sample in `[lo, hi)`; reversed bounds are swapped and an empty
/// range yields `lo`
pub fn random_between<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_circles_overlap_is_strict() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
    }

    #[test]
    fn test_angle_between() {
        let a = angle_between(Vec2::new(1.0, 1.0), Vec2::new(1.0, 5.0));
        assert!((a - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_to_world() {
        let p = clamp_to_world(Vec2::new(-10.0, 2500.0), 2000.0);
        assert_eq!(p, Vec2::new(0.0, 2000.0));
    }

    #[test]
    fn test_random_between_handles_degenerate_ranges() {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(9);
        assert_eq!(random_between(&mut rng, 4.0, 4.0), 4.0);
        for _ in 0..100 {
            let v = random_between(&mut rng, 35.0, 20.0);
            assert!((20.0..35.0).contains(&v));
        }
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(10.0, 20.0, 0.25), 12.5);
        assert!((distance(Vec2::ZERO, Vec2::new(3.0, 4.0)) - 5.0).abs() < 1e-6);
    }
}
