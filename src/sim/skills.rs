//! Player abilities: stun pulse, speed boost, wall barrier
//!
//! Three slots, one selected at a time. Using a slot starts its cooldown;
//! using it again before the cooldown runs out is rejected without touching
//! any state.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision::{OrientedRect, bounce_off_rect, circle_rect_collision};
use super::fish::{Fish, FishId};
use super::particles::ParticleSystem;
use super::state::{GameEvent, GameState};
use crate::consts::*;
use crate::{heading_to_vec, random_between};

/// Number of ability slots
pub const SKILL_SLOTS: usize = 3;

/// Ability kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    StunPulse,
    SpeedBoost,
    WallBarrier,
}

/// Kind-specific magnitudes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkillEffect {
    /// Stun every other living fish within `radius` for the skill duration
    StunPulse { radius: f32, particle_count: usize },
    /// Multiply the caster's speed for the skill duration
    SpeedBoost { multiplier: f32 },
    /// Raise a wall ahead of the caster for the skill duration
    WallBarrier { width: f32, thickness: f32 },
}

/// Static ability definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDef {
    pub name: String,
    pub description: String,
    /// Seconds between uses
    pub cooldown: f32,
    /// Seconds the effect lasts (stun time, boost time, wall lifetime)
    pub duration: f32,
    /// Effect color for particles/overlays
    pub color: u32,
    pub effect: SkillEffect,
}

impl SkillDef {
    pub fn kind(&self) -> SkillKind {
        match self.effect {
            SkillEffect::StunPulse { .. } => SkillKind::StunPulse,
            SkillEffect::SpeedBoost { .. } => SkillKind::SpeedBoost,
            SkillEffect::WallBarrier { .. } => SkillKind::WallBarrier,
        }
    }
}

/// The canonical three abilities, in slot order
pub fn default_skills() -> [SkillDef; SKILL_SLOTS] {
    [
        SkillDef {
            name: "Stun Vortex".into(),
            description: "Unleash a whirlpool that stuns nearby fish".into(),
            cooldown: 5.0,
            duration: 3.5,
            color: 0xFFD700,
            effect: SkillEffect::StunPulse {
                radius: 80.0,
                particle_count: 15,
            },
        },
        SkillDef {
            name: "Dash".into(),
            description: "Swim at double speed for a while".into(),
            cooldown: 6.0,
            duration: 5.0,
            color: 0x00FFFF,
            effect: SkillEffect::SpeedBoost { multiplier: 2.0 },
        },
        SkillDef {
            name: "Stone Wall".into(),
            description: "Raise a wall that deflects other fish".into(),
            cooldown: 5.0,
            duration: 8.0,
            color: 0x8B4513,
            effect: SkillEffect::WallBarrier {
                width: 120.0,
                thickness: 20.0,
            },
        },
    ]
}

/// Why a skill request was refused
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkillError {
    #[error("skill slot {slot} is on cooldown ({remaining:.2}s left)")]
    OnCooldown { slot: usize, remaining: f32 },
    #[error("caster is not alive")]
    CasterDown,
    #[error("no skill in slot {0}")]
    UnknownSlot(usize),
}

/// What a successful cast did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkillOutcome {
    Stunned { affected: usize },
    Boosted { multiplier: f32 },
    BarrierRaised { center: Vec2 },
}

/// A temporary wall that deflects every fish except its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barrier {
    pub rect: OrientedRect,
    pub remaining: f32,
    pub duration: f32,
    pub owner: FishId,
}

impl Barrier {
    /// Wall centered `BARRIER_OFFSET` ahead of the caster, long side
    /// perpendicular to its facing
    pub fn ahead_of(caster: &Fish, width: f32, thickness: f32, duration: f32) -> Self {
        let center = caster.pos + heading_to_vec(caster.facing) * BARRIER_OFFSET;
        let rotation = caster.facing + std::f32::consts::FRAC_PI_2;
        Self {
            rect: OrientedRect::new(center, width, thickness, rotation),
            remaining: duration,
            duration,
            owner: caster.id,
        }
    }

    /// Fraction of lifetime left, 1.0 when fresh
    pub fn remaining_fraction(&self) -> f32 {
        if self.duration <= 0.0 {
            0.0
        } else {
            (self.remaining / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// Per-slot cooldowns and the current selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillBook {
    cooldowns: [f32; SKILL_SLOTS],
    selected: usize,
}

impl SkillBook {
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Change the selected slot (never touches cooldowns)
    pub fn select(&mut self, slot: usize) -> Result<(), SkillError> {
        if slot >= SKILL_SLOTS {
            return Err(SkillError::UnknownSlot(slot));
        }
        self.selected = slot;
        Ok(())
    }

    /// Seconds until `slot` is usable
    pub fn remaining(&self, slot: usize) -> f32 {
        self.cooldowns.get(slot).copied().unwrap_or(0.0)
    }

    /// Cooldown left as a fraction of the full cooldown (0 = ready)
    pub fn cooldown_fraction(&self, slot: usize, def: &SkillDef) -> f32 {
        if def.cooldown <= 0.0 {
            0.0
        } else {
            (self.remaining(slot) / def.cooldown).clamp(0.0, 1.0)
        }
    }

    pub fn is_ready(&self, slot: usize) -> bool {
        self.remaining(slot) <= 0.0
    }

    /// Count every cooldown down by `dt`
    pub fn tick(&mut self, dt: f32) {
        for cooldown in &mut self.cooldowns {
            *cooldown = (*cooldown - dt).max(0.0);
        }
    }

    /// Claim `slot`, starting its full cooldown
    fn begin(&mut self, slot: usize, def: &SkillDef) -> Result<(), SkillError> {
        let remaining = *self.cooldowns.get(slot).ok_or(SkillError::UnknownSlot(slot))?;
        if remaining > 0.0 {
            return Err(SkillError::OnCooldown { slot, remaining });
        }
        self.cooldowns[slot] = def.cooldown;
        Ok(())
    }
}

/// Apply a skill's effect. `others` never contains the caster.
pub fn cast(
    def: &SkillDef,
    caster: &mut Fish,
    others: &mut [Fish],
    barriers: &mut Vec<Barrier>,
    particles: &mut ParticleSystem,
) -> SkillOutcome {
    match def.effect {
        SkillEffect::StunPulse {
            radius,
            particle_count,
        } => {
            particles.stun_ring(caster.pos, radius, particle_count, def.color);
            let mut affected = 0;
            for fish in others.iter_mut() {
                if fish.alive && fish.id != caster.id && fish.pos.distance(caster.pos) <= radius {
                    fish.stun(def.duration);
                    affected += 1;
                }
            }
            SkillOutcome::Stunned { affected }
        }
        SkillEffect::SpeedBoost { multiplier } => {
            caster.activate_speed_boost(multiplier, def.duration);
            particles.boost_ring(caster.pos, caster.radius() + 10.0, def.color);
            SkillOutcome::Boosted { multiplier }
        }
        SkillEffect::WallBarrier { width, thickness } => {
            let barrier = Barrier::ahead_of(caster, width, thickness, def.duration);
            let center = barrier.rect.center;
            barriers.push(barrier);
            SkillOutcome::BarrierRaised { center }
        }
    }
}

/// Use the ability in `slot` as the player
pub fn use_skill(state: &mut GameState, slot: usize) -> Result<SkillOutcome, SkillError> {
    if !state.player.alive {
        return Err(SkillError::CasterDown);
    }
    let def = state
        .tuning
        .skills
        .get(slot)
        .ok_or(SkillError::UnknownSlot(slot))?;
    state.skills.begin(slot, def)?;

    let outcome = cast(
        def,
        &mut state.player,
        &mut state.fishes,
        &mut state.barriers,
        &mut state.particles,
    );
    match outcome {
        SkillOutcome::Stunned { affected } => {
            log::info!("{} stunned {} fish", def.name, affected)
        }
        _ => log::info!("{} used", def.name),
    }
    state.events.push(GameEvent::SkillUsed {
        kind: def.kind(),
        outcome,
    });
    Ok(outcome)
}

/// Age every barrier and drop the expired ones
pub fn tick_barriers(barriers: &mut Vec<Barrier>, dt: f32) {
    for barrier in barriers.iter_mut() {
        barrier.remaining -= dt;
    }
    barriers.retain(|b| b.remaining > 0.0);
}

/// Deflect fish off barriers. Players, stunned fish and a barrier's own
/// caster are exempt; each fish reacts to at most its first overlapping
/// barrier per tick. Returns the number of bounces.
pub fn resolve_barrier_contacts<R: Rng + ?Sized>(
    barriers: &[Barrier],
    fishes: &mut [Fish],
    rng: &mut R,
) -> usize {
    if barriers.is_empty() {
        return 0;
    }

    let mut bounces = 0;
    for fish in fishes.iter_mut() {
        if fish.is_player || !fish.alive || fish.is_stunned() {
            continue;
        }
        let hit = barriers.iter().find(|b| {
            b.owner != fish.id && circle_rect_collision(fish.pos, fish.radius(), &b.rect).hit
        });
        if let Some(barrier) = hit {
            let jitter = Vec2::new(
                random_between(rng, -BARRIER_JITTER, BARRIER_JITTER),
                random_between(rng, -BARRIER_JITTER, BARRIER_JITTER),
            );
            let (pos, vel) = bounce_off_rect(fish.pos, fish.vel, fish.radius(), &barrier.rect, jitter);
            fish.pos = pos;
            fish.vel = vel;
            bounces += 1;
        }
    }
    bounces
}
