//! Autonomous fish behavior
//!
//! Each AI fish runs a three-state machine (wander / hunt / flee). The choice
//! is re-evaluated on a fixed cadence of simulated time; in between, the
//! chosen behavior is executed every tick against a fresh snapshot of the
//! world, so a target that died since the last decision is simply ignored.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::fish::FishId;
use crate::consts::*;
use crate::{angle_between, heading_to_vec, random_between};

/// What an AI fish is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Behavior {
    #[default]
    Wander,
    Hunt,
    Flee,
}

/// Read-only view of another fish, taken once per tick before anyone moves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub id: FishId,
    pub pos: Vec2,
    pub size: f32,
    pub alive: bool,
}

/// Nearest prey and predator candidates from one perception pass
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Perception {
    pub prey: Option<FishId>,
    pub predator: Option<FishId>,
}

/// Scan every other living fish once, keeping the nearest candidate in each
/// category. The two radii are independent.
pub fn perceive(me: FishId, pos: Vec2, size: f32, sightings: &[Sighting]) -> Perception {
    let mut prey: Option<(FishId, f32)> = None;
    let mut predator: Option<(FishId, f32)> = None;

    for other in sightings {
        if other.id == me || !other.alive {
            continue;
        }
        let dist = pos.distance(other.pos);

        if other.size < size * EAT_RATIO
            && dist < AI_PREY_RADIUS
            && prey.is_none_or(|(_, d)| dist < d)
        {
            prey = Some((other.id, dist));
        }

        if other.size > size * AI_PREDATOR_RATIO
            && dist < AI_PREDATOR_RADIUS
            && predator.is_none_or(|(_, d)| dist < d)
        {
            predator = Some((other.id, dist));
        }
    }

    Perception {
        prey: prey.map(|(id, _)| id),
        predator: predator.map(|(id, _)| id),
    }
}

/// AI scratch state carried by every non-player fish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brain {
    pub behavior: Behavior,
    /// Advisory handle; re-validated against the snapshot every tick
    pub target: Option<FishId>,
    pub wander_heading: f32,
    /// Seconds since the last re-evaluation
    pub reeval_timer: f32,
}

impl Brain {
    pub fn new(wander_heading: f32) -> Self {
        Self {
            behavior: Behavior::Wander,
            target: None,
            wander_heading,
            reeval_timer: 0.0,
        }
    }

    /// Apply a perception result. Flee beats hunt beats wander; a new wander
    /// heading is drawn only when wandering is (re)chosen.
    pub fn decide<R: Rng + ?Sized>(&mut self, perception: Perception, rng: &mut R) {
        if let Some(predator) = perception.predator {
            self.behavior = Behavior::Flee;
            self.target = Some(predator);
        } else if let Some(prey) = perception.prey {
            self.behavior = Behavior::Hunt;
            self.target = Some(prey);
        } else {
            self.behavior = Behavior::Wander;
            self.target = None;
            self.wander_heading = random_between(rng, 0.0, std::f32::consts::TAU);
        }
    }

    /// Advance the decision clock, re-decide when due, then produce this
    /// tick's velocity. `None` means "leave velocity as it is" (target gone).
    pub fn think<R: Rng + ?Sized>(
        &mut self,
        me: FishId,
        pos: Vec2,
        size: f32,
        speed: f32,
        dt: f32,
        sightings: &[Sighting],
        rng: &mut R,
    ) -> Option<Vec2> {
        self.reeval_timer += dt;
        if self.reeval_timer >= AI_REEVAL_SECS {
            let perception = perceive(me, pos, size, sightings);
            self.decide(perception, rng);
            self.reeval_timer = 0.0;
        }
        self.steer(pos, speed, sightings, rng)
    }

    fn steer<R: Rng + ?Sized>(
        &mut self,
        pos: Vec2,
        speed: f32,
        sightings: &[Sighting],
        rng: &mut R,
    ) -> Option<Vec2> {
        match self.behavior {
            Behavior::Flee => {
                let target = self.live_target(sightings)?;
                Some(heading_to_vec(angle_between(target.pos, pos)) * speed)
            }
            Behavior::Hunt => {
                let target = self.live_target(sightings)?;
                Some(heading_to_vec(angle_between(pos, target.pos)) * speed)
            }
            Behavior::Wander => {
                let vel = heading_to_vec(self.wander_heading) * speed * 0.5;
                if rng.random_bool(AI_WANDER_NUDGE_CHANCE) {
                    self.wander_heading += random_between(rng, -AI_WANDER_NUDGE, AI_WANDER_NUDGE);
                }
                Some(vel)
            }
        }
    }

    fn live_target<'a>(&self, sightings: &'a [Sighting]) -> Option<&'a Sighting> {
        let id = self.target?;
        sightings.iter().find(|s| s.id == id && s.alive)
    }
}
