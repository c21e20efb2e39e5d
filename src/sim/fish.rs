//! Fish entities: the player and every AI-controlled organism
//!
//! A fish's `size` is both its collision radius and its "mass" for the eat
//! rule. Status effects are timed; stun suspends the fish completely.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ai::{Brain, Sighting};
use super::particles::EffectSink;
use crate::consts::*;
use crate::{circles_overlap, clamp_to_world, heading_to_vec, random_between};

/// Color of the player fish before any zone re-skin
pub const PLAYER_COLOR: u32 = 0x00D4FF;

/// Stable handle into the fish table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FishId(pub u32);

/// Fish species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FishKind {
    Small,
    #[default]
    Normal,
    Fast,
    Big,
}

impl FishKind {
    pub const ALL: [FishKind; 4] = [
        FishKind::Small,
        FishKind::Normal,
        FishKind::Fast,
        FishKind::Big,
    ];

    /// Cruising speed before multipliers (units/s)
    pub fn base_speed(self) -> f32 {
        match self {
            FishKind::Small => 120.0,
            FishKind::Normal => 100.0,
            FishKind::Fast => 140.0,
            FishKind::Big => 80.0,
        }
    }

    /// Size cap for AI fish of this kind
    pub fn max_size(self) -> f32 {
        match self {
            FishKind::Small => 15.0,
            FishKind::Normal => 25.0,
            FishKind::Fast => 20.0,
            FishKind::Big => 40.0,
        }
    }

    pub fn color(self) -> u32 {
        match self {
            FishKind::Small => 0x96CEB4,
            FishKind::Normal => 0x4ECDC4,
            FishKind::Fast => 0xFF6B6B,
            FishKind::Big => 0x45B7D1,
        }
    }
}

/// A timed speed multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    pub multiplier: f32,
    pub remaining: f32,
    pub duration: f32,
}

impl Boost {
    pub fn new(multiplier: f32, duration: f32) -> Self {
        Self {
            multiplier,
            remaining: duration,
            duration,
        }
    }

    /// Decay by `dt`; returns false once expired
    fn decay(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining > 0.0
    }
}

fn decay_boost(slot: &mut Option<Boost>, dt: f32) {
    let expired = slot.as_mut().is_some_and(|boost| !boost.decay(dt));
    if expired {
        *slot = None;
    }
}

/// How a fish decides its velocity this tick
#[derive(Debug, Clone, Copy)]
pub enum Control<'a> {
    /// Player: optional steering direction plus drag
    Player {
        steer: Option<Vec2>,
        accel: f32,
        drag: f32,
    },
    /// AI: runs the behavior machine against the world snapshot
    Ai { sightings: &'a [Sighting] },
}

/// A fish entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fish {
    pub id: FishId,
    pub kind: FishKind,
    /// Cosmetic species key (the player is re-skinned per zone)
    pub skin: FishKind,
    pub color: u32,
    pub is_player: bool,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing angle (radians); unchanged while velocity is exactly zero
    pub facing: f32,
    pub size: f32,
    pub max_size: f32,
    pub alive: bool,
    /// Remaining stun time; `None` when not stunned
    pub stun: Option<f32>,
    pub teleport_boost: Option<Boost>,
    pub speed_boost: Option<Boost>,
    pub growth_points: f32,
    /// AI scratch state (`None` for the player)
    pub brain: Option<Brain>,
    #[serde(skip)]
    trail_timer: f32,
}

impl Fish {
    /// Create the player fish. Its size cap is the win threshold.
    pub fn player(id: FishId, pos: Vec2, size: f32, max_size: f32) -> Self {
        Self {
            id,
            kind: FishKind::Normal,
            skin: FishKind::Normal,
            color: PLAYER_COLOR,
            is_player: true,
            pos,
            vel: Vec2::ZERO,
            facing: 0.0,
            size: size.min(max_size),
            max_size,
            alive: true,
            stun: None,
            teleport_boost: None,
            speed_boost: None,
            growth_points: 0.0,
            brain: None,
            trail_timer: 0.0,
        }
    }

    /// Create an AI fish; `size` is clamped to the kind's cap
    pub fn ai<R: Rng + ?Sized>(id: FishId, pos: Vec2, size: f32, kind: FishKind, rng: &mut R) -> Self {
        let max_size = kind.max_size();
        Self {
            id,
            kind,
            skin: kind,
            color: kind.color(),
            is_player: false,
            pos,
            vel: Vec2::ZERO,
            facing: 0.0,
            size: size.min(max_size),
            max_size,
            alive: true,
            stun: None,
            teleport_boost: None,
            speed_boost: None,
            growth_points: 0.0,
            brain: Some(Brain::new(random_between(rng, 0.0, std::f32::consts::TAU))),
            trail_timer: 0.0,
        }
    }

    pub fn is_stunned(&self) -> bool {
        self.stun.is_some()
    }

    /// Collision radius
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size
    }

    /// Type base speed times every active multiplier (boosts stack multiplicatively)
    pub fn effective_speed(&self) -> f32 {
        let mut speed = self.kind.base_speed();
        if let Some(boost) = self.teleport_boost {
            speed *= boost.multiplier;
        }
        if let Some(boost) = self.speed_boost {
            speed *= boost.multiplier;
        }
        speed
    }

    pub fn sighting(&self) -> Sighting {
        Sighting {
            id: self.id,
            pos: self.pos,
            size: self.size,
            alive: self.alive,
        }
    }

    /// Advance one tick: status timers, control, integration, bounds, trail
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        control: Control<'_>,
        world_extent: f32,
        rng: &mut R,
        effects: &mut dyn EffectSink,
    ) {
        if !self.alive {
            return;
        }

        if let Some(remaining) = self.stun {
            let remaining = remaining - dt;
            self.stun = (remaining > 0.0).then_some(remaining);
            return;
        }

        decay_boost(&mut self.teleport_boost, dt);
        decay_boost(&mut self.speed_boost, dt);

        let speed = self.effective_speed();
        match control {
            Control::Player { steer, accel, drag } => {
                if let Some(dir) = steer.map(Vec2::normalize_or_zero) {
                    self.vel += dir * speed * dt * accel;
                }
                self.vel *= drag;
            }
            Control::Ai { sightings } => {
                if let Some(brain) = self.brain.as_mut() {
                    let steered = brain.think(self.id, self.pos, self.size, speed, dt, sightings, rng);
                    if let Some(vel) = steered {
                        self.vel = vel;
                    }
                }
            }
        }

        self.pos += self.vel * dt;
        if self.vel != Vec2::ZERO {
            self.facing = self.vel.y.atan2(self.vel.x);
        }
        self.pos = clamp_to_world(self.pos, world_extent);

        self.trail_timer += dt;
        if self.trail_timer > TRAIL_PERIOD {
            let tail = self.pos - heading_to_vec(self.facing) * self.radius();
            effects.bubbles(tail, TRAIL_BUBBLES);
            self.trail_timer = 0.0;
        }
    }

    /// Alive, strictly below 80% of our size, and overlapping
    pub fn can_eat(&self, other: &Fish) -> bool {
        other.alive
            && other.size < self.size * EAT_RATIO
            && circles_overlap(self.pos, self.radius(), other.pos, other.radius())
    }

    /// Consume `other`. Does not kill it; the caller follows up with `die()`.
    /// Returns false (and changes nothing) when `can_eat` does not hold.
    pub fn eat(&mut self, other: &Fish, effects: &mut dyn EffectSink) -> bool {
        if !self.can_eat(other) {
            return false;
        }

        self.growth_points += other.size;
        if self.growth_points >= self.size * 2.0 {
            self.grow();
            // Overflow above the threshold is discarded
            self.growth_points = 0.0;
        }

        effects.burst(other.pos, other.color);
        true
    }

    fn grow(&mut self) {
        self.size = (self.size + GROWTH_STEP).min(self.max_size);
    }

    /// Freeze for `duration`; re-stunning resets the timer (no stacking)
    pub fn stun(&mut self, duration: f32) {
        self.stun = Some(duration);
        self.vel = Vec2::ZERO;
    }

    /// Mark dead and emit the death burst. Callers check `alive` first.
    pub fn die(&mut self, effects: &mut dyn EffectSink) {
        self.alive = false;
        effects.burst(self.pos, self.color);
    }

    pub fn activate_teleport_boost(&mut self, multiplier: f32, duration: f32) {
        self.teleport_boost = Some(Boost::new(multiplier, duration));
    }

    pub fn activate_speed_boost(&mut self, multiplier: f32, duration: f32) {
        self.speed_boost = Some(Boost::new(multiplier, duration));
    }

    /// Cosmetic re-skin; speed still follows `kind`
    pub fn reskin(&mut self, skin: FishKind, color: u32) {
        self.skin = skin;
        self.color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::particles::RecordingSink;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    fn ai_fish(id: u32, pos: Vec2, size: f32) -> Fish {
        Fish::ai(FishId(id), pos, size, FishKind::Big, &mut rng())
    }

    fn player_control() -> Control<'static> {
        Control::Player {
            steer: None,
            accel: 3.0,
            drag: 0.9,
        }
    }

    #[test]
    fn test_eat_threshold_is_strict() {
        let predator = ai_fish(1, Vec2::ZERO, 20.0);
        let tie = ai_fish(2, Vec2::new(5.0, 0.0), 16.0);
        let smaller = ai_fish(3, Vec2::new(5.0, 0.0), 15.9);
        assert!(!predator.can_eat(&tie));
        assert!(predator.can_eat(&smaller));
    }

    #[test]
    fn test_eat_requires_overlap_and_life() {
        let predator = ai_fish(1, Vec2::ZERO, 20.0);
        let far = ai_fish(2, Vec2::new(30.0, 0.0), 10.0);
        assert!(!predator.can_eat(&far));

        let mut dead = ai_fish(3, Vec2::new(5.0, 0.0), 10.0);
        dead.alive = false;
        assert!(!predator.can_eat(&dead));
    }

    #[test]
    fn test_growth_accumulates_then_steps() {
        let mut sink = RecordingSink::default();
        let mut predator = Fish::player(FishId(1), Vec2::ZERO, 12.0, 50.0);

        for (i, expected_points) in [6.0, 12.0, 18.0].into_iter().enumerate() {
            let prey = ai_fish(10 + i as u32, Vec2::new(1.0, 0.0), 6.0);
            assert!(predator.eat(&prey, &mut sink));
            assert_eq!(predator.growth_points, expected_points);
            assert_eq!(predator.size, 12.0);
        }

        let prey = ai_fish(20, Vec2::new(1.0, 0.0), 6.0);
        assert!(predator.eat(&prey, &mut sink));
        assert_eq!(predator.size, 14.0);
        assert_eq!(predator.growth_points, 0.0);
        assert_eq!(sink.bursts.len(), 4);
    }

    #[test]
    fn test_overflow_is_discarded() {
        let mut sink = RecordingSink::default();
        let mut predator = ai_fish(1, Vec2::ZERO, 20.0);
        predator.growth_points = 35.0;
        let prey = ai_fish(2, Vec2::new(1.0, 0.0), 15.0);
        predator.eat(&prey, &mut sink);
        assert_eq!(predator.size, 22.0);
        assert_eq!(predator.growth_points, 0.0);
    }

    #[test]
    fn test_growth_is_capped() {
        let mut sink = RecordingSink::default();
        let mut predator = Fish::ai(FishId(1), Vec2::ZERO, 15.0, FishKind::Small, &mut rng());
        predator.growth_points = 29.0;
        let prey = ai_fish(2, Vec2::new(1.0, 0.0), 5.0);
        predator.eat(&prey, &mut sink);
        assert_eq!(predator.size, 15.0);
    }

    #[test]
    fn test_ai_spawn_size_is_clamped() {
        let fish = Fish::ai(FishId(1), Vec2::ZERO, 30.0, FishKind::Fast, &mut rng());
        assert_eq!(fish.size, 20.0);
    }

    #[test]
    fn test_stun_freezes_then_releases() {
        let mut sink = RecordingSink::default();
        let mut r = rng();
        let mut fish = ai_fish(1, Vec2::new(500.0, 500.0), 20.0);
        fish.vel = Vec2::new(50.0, 0.0);
        fish.stun(0.5);
        let frozen_at = fish.pos;

        for _ in 0..4 {
            fish.advance(0.1, Control::Ai { sightings: &[] }, 2000.0, &mut r, &mut sink);
        }
        assert!(fish.is_stunned());
        assert_eq!(fish.vel, Vec2::ZERO);
        assert_eq!(fish.pos, frozen_at);

        for _ in 0..2 {
            fish.advance(0.1, Control::Ai { sightings: &[] }, 2000.0, &mut r, &mut sink);
        }
        assert!(!fish.is_stunned());

        fish.advance(0.1, Control::Ai { sightings: &[] }, 2000.0, &mut r, &mut sink);
        assert_ne!(fish.vel, Vec2::ZERO);
    }

    #[test]
    fn test_restun_resets_timer() {
        let mut fish = ai_fish(1, Vec2::ZERO, 20.0);
        fish.stun(3.5);
        fish.stun(0.5);
        assert_eq!(fish.stun, Some(0.5));
    }

    #[test]
    fn test_player_drag_and_steering() {
        let mut sink = RecordingSink::default();
        let mut r = rng();
        let mut player = Fish::player(FishId(1), Vec2::new(1000.0, 1000.0), 12.0, 50.0);
        player.vel = Vec2::new(100.0, 0.0);
        player.advance(0.016, player_control(), 2000.0, &mut r, &mut sink);
        assert!((player.vel.x - 90.0).abs() < 1e-3);

        let steer = Control::Player {
            steer: Some(Vec2::new(0.0, 2.0)),
            accel: 3.0,
            drag: 0.9,
        };
        player.vel = Vec2::ZERO;
        player.advance(0.1, steer, 2000.0, &mut r, &mut sink);
        // 100 speed * 0.1 dt * 3 accel, then drag
        assert!((player.vel.y - 27.0).abs() < 1e-3);
    }

    #[test]
    fn test_facing_kept_when_still() {
        let mut sink = RecordingSink::default();
        let mut r = rng();
        let mut player = Fish::player(FishId(1), Vec2::new(100.0, 100.0), 12.0, 50.0);
        player.facing = 1.0;
        player.advance(0.1, player_control(), 2000.0, &mut r, &mut sink);
        assert_eq!(player.facing, 1.0);
    }

    #[test]
    fn test_position_clamped_to_world() {
        let mut sink = RecordingSink::default();
        let mut r = rng();
        let mut player = Fish::player(FishId(1), Vec2::new(1995.0, 5.0), 12.0, 50.0);
        player.vel = Vec2::new(1000.0, -1000.0);
        player.advance(0.1, player_control(), 2000.0, &mut r, &mut sink);
        assert_eq!(player.pos, Vec2::new(2000.0, 0.0));
    }

    #[test]
    fn test_boosts_stack_and_expire() {
        let mut sink = RecordingSink::default();
        let mut r = rng();
        let mut player = Fish::player(FishId(1), Vec2::new(100.0, 100.0), 12.0, 50.0);
        player.activate_teleport_boost(1.5, 3.0);
        player.activate_speed_boost(2.0, 0.25);
        assert!((player.effective_speed() - 300.0).abs() < 1e-3);

        for _ in 0..3 {
            player.advance(0.1, player_control(), 2000.0, &mut r, &mut sink);
        }
        assert!(player.speed_boost.is_none());
        assert!((player.effective_speed() - 150.0).abs() < 1e-3);
    }

    #[test]
    fn test_trail_bubbles_every_period() {
        let mut sink = RecordingSink::default();
        let mut r = rng();
        let mut player = Fish::player(FishId(1), Vec2::new(100.0, 100.0), 12.0, 50.0);
        for _ in 0..10 {
            player.advance(0.1, player_control(), 2000.0, &mut r, &mut sink);
        }
        assert!(!sink.bubbles.is_empty());
        assert!(sink.bubbles.iter().all(|&(_, count)| count == TRAIL_BUBBLES));
    }

    #[test]
    fn test_dead_fish_do_not_move() {
        let mut sink = RecordingSink::default();
        let mut fish = ai_fish(1, Vec2::new(100.0, 100.0), 20.0);
        fish.vel = Vec2::new(10.0, 0.0);
        fish.die(&mut sink);
        fish.advance(0.1, Control::Ai { sightings: &[] }, 2000.0, &mut rng(), &mut sink);
        assert_eq!(fish.pos, Vec2::new(100.0, 100.0));
        assert_eq!(sink.bursts.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_eat_is_never_mutual(
            size_a in 1.0f32..40.0,
            size_b in 1.0f32..40.0,
            dx in -60.0f32..60.0,
        ) {
            let a = ai_fish(1, Vec2::ZERO, size_a);
            let b = ai_fish(2, Vec2::new(dx, 0.0), size_b);
            prop_assert!(!(a.can_eat(&b) && b.can_eat(&a)));
        }

        #[test]
        fn prop_size_never_exceeds_cap(meals in proptest::collection::vec(1.0f32..11.0, 1..60)) {
            let mut sink = RecordingSink::default();
            let mut predator = Fish::ai(FishId(1), Vec2::ZERO, 14.0, FishKind::Normal, &mut rng());
            let mut last = predator.size;
            for (i, meal) in meals.into_iter().enumerate() {
                let prey = ai_fish(100 + i as u32, Vec2::new(1.0, 0.0), meal);
                predator.eat(&prey, &mut sink);
                prop_assert!(predator.size <= predator.max_size);
                prop_assert!(predator.size >= last);
                last = predator.size;
            }
        }
    }
}
