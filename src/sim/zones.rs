//! Zones, portals and the zone-transition state machine
//!
//! The catalog is static. The only runtime state is the [`ZoneTracker`]: which
//! zone is active, whether a transition is in flight, and when the last one
//! happened. Both timers run on the simulation clock, so the re-entry guard is
//! a timestamp comparison polled from the tick loop.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::fish::FishKind;
use super::particles::{EffectSink, TRANSITION_COLOR};
use super::spawn::populate_zone;
use super::state::{GameEvent, GameState};
use crate::{circles_overlap, clamp_to_world};

/// Catalog identifier of a zone (1-based, matches the portal table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub u32);

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cosmetic scenery kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecorationKind {
    Seaweed,
    Rock,
    Coral,
    Cave,
    AbyssRock,
    VolcanicVent,
    Bone,
}

/// Footprint of a decoration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Footprint {
    Circle { radius: f32 },
    Rect { width: f32, height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub kind: DecorationKind,
    pub pos: Vec2,
    pub footprint: Footprint,
}

impl Decoration {
    fn circle(kind: DecorationKind, x: f32, y: f32, radius: f32) -> Self {
        Self {
            kind,
            pos: Vec2::new(x, y),
            footprint: Footprint::Circle { radius },
        }
    }

    fn rect(kind: DecorationKind, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            kind,
            pos: Vec2::new(x, y),
            footprint: Footprint::Rect { width, height },
        }
    }
}

/// A discrete world region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    /// Side length of the square world
    pub extent: f32,
    /// Kinds drawn for the normal and big population bands
    pub palette: Vec<FishKind>,
    pub fish_count: usize,
    pub hazard_count: usize,
    /// Background gradient, top to bottom
    pub background: [u32; 3],
    pub decorations: Vec<Decoration>,
}

/// A directional trigger from one zone to another
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub from: ZoneId,
    pub to: ZoneId,
    pub pos: Vec2,
    pub radius: f32,
    /// Where the player lands in the destination zone
    pub arrival: Vec2,
}

/// Trigger radius shared by every portal
pub const PORTAL_RADIUS: f32 = 60.0;

impl Portal {
    fn new(from: u32, to: u32, pos: (f32, f32), arrival: (f32, f32)) -> Self {
        Self {
            from: ZoneId(from),
            to: ZoneId(to),
            pos: Vec2::new(pos.0, pos.1),
            radius: PORTAL_RADIUS,
            arrival: Vec2::new(arrival.0, arrival.1),
        }
    }
}

/// Immutable zone and portal tables. Always holds at least one zone.
#[derive(Debug, Clone)]
pub struct ZoneCatalog {
    zones: Vec<Zone>,
    portals: Vec<Portal>,
}

impl Default for ZoneCatalog {
    fn default() -> Self {
        use DecorationKind::*;

        let zones = vec![
            Zone {
                id: ZoneId(1),
                name: "Shallow Sea".into(),
                extent: 2000.0,
                palette: vec![FishKind::Small, FishKind::Normal],
                fish_count: 20,
                hazard_count: 3,
                background: [0x001A2E, 0x003D5C, 0x005577],
                decorations: vec![
                    Decoration::rect(Seaweed, 200.0, 1800.0, 50.0, 200.0),
                    Decoration::rect(Seaweed, 800.0, 1700.0, 60.0, 250.0),
                    Decoration::circle(Rock, 1500.0, 1600.0, 80.0),
                    Decoration::circle(Coral, 300.0, 400.0, 60.0),
                ],
            },
            Zone {
                id: ZoneId(2),
                name: "Deep Sea".into(),
                extent: 2500.0,
                palette: vec![FishKind::Normal, FishKind::Big, FishKind::Fast],
                fish_count: 25,
                hazard_count: 5,
                background: [0x000D1A, 0x001A33, 0x002244],
                decorations: vec![
                    Decoration::rect(Cave, 500.0, 2000.0, 200.0, 150.0),
                    Decoration::circle(Rock, 1200.0, 1800.0, 120.0),
                    Decoration::circle(Rock, 2000.0, 1000.0, 100.0),
                    Decoration::rect(Seaweed, 1800.0, 2200.0, 80.0, 300.0),
                ],
            },
            Zone {
                id: ZoneId(3),
                name: "Abyss".into(),
                extent: 3000.0,
                palette: vec![FishKind::Big, FishKind::Fast],
                fish_count: 30,
                hazard_count: 8,
                background: [0x000000, 0x0A0A1A, 0x1A1A2E],
                decorations: vec![
                    Decoration::circle(AbyssRock, 1000.0, 2500.0, 200.0),
                    Decoration::circle(AbyssRock, 2200.0, 1800.0, 150.0),
                    Decoration::circle(VolcanicVent, 1500.0, 2800.0, 100.0),
                    Decoration::rect(Bone, 800.0, 1200.0, 150.0, 50.0),
                ],
            },
        ];

        let portals = vec![
            Portal::new(1, 2, (1600.0, 1600.0), (300.0, 300.0)),
            Portal::new(2, 1, (300.0, 300.0), (1600.0, 1600.0)),
            Portal::new(2, 3, (2000.0, 2000.0), (400.0, 400.0)),
            Portal::new(3, 2, (400.0, 400.0), (2000.0, 2000.0)),
        ];

        Self { zones, portals }
    }
}

impl ZoneCatalog {
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Zone at a catalog index (indices come from [`ZoneCatalog::index_of`])
    pub fn get(&self, index: usize) -> &Zone {
        &self.zones[index.min(self.zones.len() - 1)]
    }

    pub fn index_of(&self, id: ZoneId) -> Option<usize> {
        self.zones.iter().position(|z| z.id == id)
    }

    /// Portals that start in `zone`
    pub fn portals_from(&self, zone: ZoneId) -> impl Iterator<Item = &Portal> {
        self.portals.iter().filter(move |p| p.from == zone)
    }
}

/// Portal-transition state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransitionState {
    Stationary,
    /// Transition began at this simulation time
    Transitioning { since: f32 },
}

/// Active zone plus the transition lock and re-entry guard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneTracker {
    current: usize,
    state: TransitionState,
    last_transition_at: Option<f32>,
}

impl ZoneTracker {
    pub fn new(current: usize) -> Self {
        Self {
            current,
            state: TransitionState::Stationary,
            last_transition_at: None,
        }
    }

    /// Catalog index of the active zone
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, TransitionState::Transitioning { .. })
    }

    /// Portal checks are skipped while transitioning and for `guard` seconds
    /// after the last transition
    pub fn can_check_portals(&self, now: f32, guard: f32) -> bool {
        !self.is_transitioning() && self.last_transition_at.is_none_or(|at| now - at >= guard)
    }

    fn begin(&mut self, index: usize, now: f32) {
        self.current = index;
        self.state = TransitionState::Transitioning { since: now };
        self.last_transition_at = Some(now);
    }

    /// Release the transition lock once `lock` seconds have passed
    pub fn tick(&mut self, now: f32, lock: f32) {
        if let TransitionState::Transitioning { since } = self.state {
            if now - since >= lock {
                self.state = TransitionState::Stationary;
            }
        }
    }
}

/// Why a transition request was refused
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TeleportError {
    #[error("a zone transition is already in progress")]
    AlreadyTransitioning,
    #[error("unknown zone {0}")]
    UnknownZone(ZoneId),
}

/// Player appearance per zone, cosmetic only
pub fn reskin_for(zone: ZoneId) -> Option<(FishKind, u32)> {
    match zone.0 {
        1 => Some((FishKind::Normal, 0x00D4FF)),
        2 => Some((FishKind::Fast, 0xFF6B6B)),
        3 => Some((FishKind::Big, 0x9966FF)),
        _ => None,
    }
}

/// The first portal of the current zone the player overlaps, if checks are
/// currently allowed
pub fn check_portals(state: &GameState) -> Option<Portal> {
    if !state.player.alive
        || !state
            .tracker
            .can_check_portals(state.elapsed, state.tuning.portal_guard_secs)
    {
        return None;
    }
    let zone = state.current_zone().id;
    state
        .zones
        .portals_from(zone)
        .find(|p| circles_overlap(state.player.pos, state.player.radius(), p.pos, p.radius))
        .copied()
}

/// Move the player to `arrival` in zone `to`, keeping its momentum, and
/// rebuild the world around it
pub fn teleport(state: &mut GameState, to: ZoneId, arrival: Vec2) -> Result<(), TeleportError> {
    if state.tracker.is_transitioning() {
        return Err(TeleportError::AlreadyTransitioning);
    }
    let index = state
        .zones
        .index_of(to)
        .ok_or(TeleportError::UnknownZone(to))?;

    state.tracker.begin(index, state.elapsed);
    let momentum = state.player.vel;

    let (extent, name) = {
        let zone = state.zones.get(index);
        (zone.extent, zone.name.clone())
    };
    state.world_extent = extent;

    // Position and view change together so the next frame never shows a jump
    state.player.pos = clamp_to_world(arrival, extent);
    state.camera.snap(state.player.pos);

    state.player.vel = momentum;
    state.player.activate_teleport_boost(
        state.tuning.teleport_boost_multiplier,
        state.tuning.teleport_boost_secs,
    );
    if let Some((skin, color)) = reskin_for(to) {
        state.player.reskin(skin, color);
    }

    state.fishes.clear();
    state.hazards.clear();
    state.barriers.clear();
    populate_zone(state);

    state.particles.burst(state.player.pos, TRANSITION_COLOR);
    state.events.push(GameEvent::ZoneEntered { zone: to });
    log::info!("Entered zone {}: {}", to, name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_consistent() {
        let catalog = ZoneCatalog::default();
        assert_eq!(catalog.zones().len(), 3);
        for portal in &catalog.portals {
            let dest = catalog.index_of(portal.to).expect("destination exists");
            let extent = catalog.get(dest).extent;
            assert!(portal.arrival.x < extent && portal.arrival.y < extent);
            // Every portal has a way back
            assert!(catalog.portals_from(portal.to).any(|p| p.to == portal.from));
        }
        assert_eq!(catalog.portals_from(ZoneId(2)).count(), 2);
    }

    #[test]
    fn test_guard_window() {
        let mut tracker = ZoneTracker::new(0);
        assert!(tracker.can_check_portals(0.0, 2.0));

        tracker.begin(1, 10.0);
        assert!(!tracker.can_check_portals(10.5, 2.0));

        tracker.tick(10.9, 1.0);
        assert!(tracker.is_transitioning());
        tracker.tick(11.0, 1.0);
        assert_eq!(tracker.state(), TransitionState::Stationary);

        // Lock released but still inside the re-entry guard
        assert!(!tracker.can_check_portals(11.5, 2.0));
        assert!(tracker.can_check_portals(12.0, 2.0));
    }

    #[test]
    fn test_teleport_rejections_leave_state_alone() {
        let mut state = GameState::new(5);
        let before = state.player.pos;

        assert_eq!(
            teleport(&mut state, ZoneId(9), Vec2::ZERO),
            Err(TeleportError::UnknownZone(ZoneId(9)))
        );
        assert_eq!(state.tracker.current(), 0);
        assert_eq!(state.player.pos, before);

        teleport(&mut state, ZoneId(2), Vec2::new(300.0, 300.0)).expect("first transition");
        let fish_count = state.fishes.len();
        assert_eq!(
            teleport(&mut state, ZoneId(3), Vec2::new(400.0, 400.0)),
            Err(TeleportError::AlreadyTransitioning)
        );
        assert_eq!(state.current_zone().id, ZoneId(2));
        assert_eq!(state.fishes.len(), fish_count);
    }

    #[test]
    fn test_teleport_rebuilds_world() {
        let mut state = GameState::new(5);
        state.player.vel = Vec2::new(30.0, -40.0);

        teleport(&mut state, ZoneId(2), Vec2::new(300.0, 300.0)).expect("transition");

        assert_eq!(state.world_extent, 2500.0);
        assert_eq!(state.player.pos, Vec2::new(300.0, 300.0));
        assert_eq!(state.player.vel, Vec2::new(30.0, -40.0));
        assert_eq!(state.camera.center, state.player.pos);
        assert!(state.player.teleport_boost.is_some());
        assert_eq!(state.player.skin, FishKind::Fast);
        assert_eq!(state.player.color, 0xFF6B6B);
        // Speed still follows the real kind
        assert!((state.player.effective_speed() - 150.0).abs() < 1e-3);

        assert_eq!(state.fishes.len(), 25);
        assert_eq!(state.hazards.len(), 5);
        assert!(state.barriers.is_empty());
        assert!(state.events.contains(&GameEvent::ZoneEntered { zone: ZoneId(2) }));
    }

    #[test]
    fn test_portal_check_only_in_current_zone() {
        let mut state = GameState::new(5);
        // Zone 2's portal back to zone 1 sits here; zone 1 has none at this spot
        state.player.pos = Vec2::new(300.0, 300.0);
        assert_eq!(check_portals(&state), None);

        state.player.pos = Vec2::new(1610.0, 1590.0);
        let portal = check_portals(&state).expect("overlapping the 1 -> 2 portal");
        assert_eq!(portal.to, ZoneId(2));
    }
}
