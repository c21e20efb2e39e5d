//! Read-only view models for the presentation layer
//!
//! A [`Snapshot`] is taken after a tick completes; renderers and UI never
//! touch [`GameState`] directly.

use glam::Vec2;
use serde::Serialize;

use super::fish::{Fish, FishKind};
use super::particles::Particle;
use super::skills::Barrier;
use super::state::{GamePhase, GameState, Hazard};
use super::zones::{Decoration, Portal, Zone, ZoneId};

#[derive(Debug, Clone, Serialize)]
pub struct FishView {
    pub id: u32,
    pub is_player: bool,
    pub pos: Vec2,
    pub radius: f32,
    pub facing: f32,
    pub alive: bool,
    pub stunned: bool,
    pub teleport_boosted: bool,
    pub speed_boosted: bool,
    /// Species key for sprite lookup
    pub skin: FishKind,
    pub color: u32,
}

impl From<&Fish> for FishView {
    fn from(fish: &Fish) -> Self {
        Self {
            id: fish.id.0,
            is_player: fish.is_player,
            pos: fish.pos,
            radius: fish.radius(),
            facing: fish.facing,
            alive: fish.alive,
            stunned: fish.is_stunned(),
            teleport_boosted: fish.teleport_boost.is_some(),
            speed_boosted: fish.speed_boost.is_some(),
            skin: fish.skin,
            color: fish.color,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BarrierView {
    pub center: Vec2,
    pub half_extents: Vec2,
    pub rotation: f32,
    /// 1.0 when freshly raised, falling to 0.0
    pub remaining_fraction: f32,
}

impl From<&Barrier> for BarrierView {
    fn from(barrier: &Barrier) -> Self {
        Self {
            center: barrier.rect.center,
            half_extents: barrier.rect.half_extents,
            rotation: barrier.rect.rotation,
            remaining_fraction: barrier.remaining_fraction(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HazardView {
    pub pos: Vec2,
    pub radius: f32,
    pub phase: f32,
}

impl From<&Hazard> for HazardView {
    fn from(hazard: &Hazard) -> Self {
        Self {
            pos: hazard.pos,
            radius: hazard.radius,
            phase: hazard.phase,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillView {
    pub name: String,
    pub description: String,
    /// Cooldown left as a fraction (0 = ready)
    pub cooldown_fraction: f32,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneView {
    pub id: ZoneId,
    pub name: String,
    pub background: [u32; 3],
    pub decorations: Vec<Decoration>,
    pub extent: f32,
}

impl From<&Zone> for ZoneView {
    fn from(zone: &Zone) -> Self {
        Self {
            id: zone.id,
            name: zone.name.clone(),
            background: zone.background,
            decorations: zone.decorations.clone(),
            extent: zone.extent,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PortalView {
    pub pos: Vec2,
    pub radius: f32,
    pub to: ZoneId,
}

impl From<&Portal> for PortalView {
    fn from(portal: &Portal) -> Self {
        Self {
            pos: portal.pos,
            radius: portal.radius,
            to: portal.to,
        }
    }
}

/// Everything a frame needs to draw
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub elapsed: f32,
    pub camera: Vec2,
    pub player_size: f32,
    pub win_size: f32,
    /// Player first, then the living AI fish
    pub fishes: Vec<FishView>,
    pub hazards: Vec<HazardView>,
    pub barriers: Vec<BarrierView>,
    pub skills: Vec<SkillView>,
    pub zone: ZoneView,
    /// Portals of the current zone only
    pub portals: Vec<PortalView>,
    pub particles: Vec<Particle>,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let zone = state.current_zone();
        let fishes = std::iter::once(&state.player)
            .chain(state.fishes.iter().filter(|f| f.alive))
            .map(FishView::from)
            .collect();
        let skills = state
            .tuning
            .skills
            .iter()
            .enumerate()
            .map(|(slot, def)| SkillView {
                name: def.name.clone(),
                description: def.description.clone(),
                cooldown_fraction: state.skills.cooldown_fraction(slot, def),
                selected: state.skills.selected() == slot,
            })
            .collect();

        Self {
            phase: state.phase,
            elapsed: state.elapsed,
            camera: state.camera.center,
            player_size: state.player.size,
            win_size: state.tuning.win_size,
            fishes,
            hazards: state.hazards.iter().map(HazardView::from).collect(),
            barriers: state.barriers.iter().map(BarrierView::from).collect(),
            skills,
            zone: ZoneView::from(zone),
            portals: state
                .zones
                .portals_from(zone.id)
                .map(PortalView::from)
                .collect(),
            particles: state.particles.particles().to_vec(),
        }
    }

    /// Serialize for an out-of-process renderer or debugging
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::skills::use_skill;

    #[test]
    fn test_snapshot_lists_player_first() {
        let state = GameState::new(10);
        let snap = Snapshot::capture(&state);
        assert!(snap.fishes[0].is_player);
        assert_eq!(snap.fishes.len(), state.fishes.len() + 1);
        assert_eq!(snap.zone.name, "Shallow Sea");
        assert_eq!(snap.zone.decorations.len(), 4);
        assert_eq!(snap.portals.len(), 1);
        assert_eq!(snap.hazards.len(), 3);
    }

    #[test]
    fn test_skill_views_track_cooldowns() {
        let mut state = GameState::new(10);
        use_skill(&mut state, 1).expect("dash is ready");
        let snap = Snapshot::capture(&state);
        assert_eq!(snap.skills.len(), 3);
        assert_eq!(snap.skills[1].cooldown_fraction, 1.0);
        assert_eq!(snap.skills[0].cooldown_fraction, 0.0);
        assert!(snap.skills[0].selected);
        assert!(snap.fishes[0].speed_boosted);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(10);
        let json = Snapshot::capture(&state).to_json().expect("serializable");
        assert!(json.contains("\"phase\":\"Playing\""));
        assert!(json.contains("Shallow Sea"));
    }
}
