//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Seeded RNG only (gameplay and particles on separate streams)
//! - Stable iteration order (fish kept in spawn order)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod fish;
pub mod particles;
pub mod skills;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod view;
pub mod zones;

pub use ai::{Behavior, Brain, Sighting};
pub use collision::{CollisionResult, OrientedRect, circle_rect_collision};
pub use fish::{Fish, FishId, FishKind};
pub use particles::{EffectSink, Particle, ParticleSystem};
pub use skills::{
    Barrier, SKILL_SLOTS, SkillBook, SkillDef, SkillEffect, SkillError, SkillKind, SkillOutcome,
    use_skill,
};
pub use state::{GameEvent, GamePhase, GameState, Hazard, ViewFollow};
pub use tick::{POINTER_DEADZONE, TickInput, tick};
pub use view::Snapshot;
pub use zones::{Portal, TeleportError, Zone, ZoneCatalog, ZoneId, teleport};
