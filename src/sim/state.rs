//! Game state and core simulation types
//!
//! The orchestrator owns everything here exclusively; the presentation layer
//! only reads a [`Snapshot`](super::view::Snapshot) taken after a tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ai::Sighting;
use super::fish::{Fish, FishId};
use super::particles::ParticleSystem;
use super::skills::{Barrier, SkillBook, SkillKind, SkillOutcome};
use super::spawn::populate_zone;
use super::zones::{Zone, ZoneCatalog, ZoneId, ZoneTracker};
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Player reached the win size
    Won,
    /// Player was eaten or blown up
    Lost,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// Game events for the presentation layer (sound, flashes, UI refresh)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    FishEaten { predator: FishId, prey: FishId },
    PlayerGrew { size: f32 },
    HazardExploded { pos: Vec2, kills: usize },
    SkillUsed { kind: SkillKind, outcome: SkillOutcome },
    ZoneEntered { zone: ZoneId },
    Won,
    Lost,
}

/// A static bomb. Any contact with the player sets it off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub pos: Vec2,
    /// Trigger radius
    pub radius: f32,
    /// Cosmetic pulse phase (radians)
    pub phase: f32,
}

/// Hazard pulse animation rate (rad/s)
pub const HAZARD_PULSE_RATE: f32 = 3.0;

/// Camera-equivalent view state. Follows the player smoothly; teleports snap it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewFollow {
    pub center: Vec2,
    pub target: Vec2,
}

impl ViewFollow {
    pub fn new(at: Vec2) -> Self {
        Self {
            center: at,
            target: at,
        }
    }

    /// Ease toward `target` at `rate` per second
    pub fn follow(&mut self, target: Vec2, rate: f32, dt: f32) {
        self.target = target;
        self.center = self.center.lerp(target, (rate * dt).clamp(0.0, 1.0));
    }

    /// Jump straight to `at` with no easing
    pub fn snap(&mut self, at: Vec2) {
        self.center = at;
        self.target = at;
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Balance parameters for this run
    pub tuning: Tuning,
    /// Gameplay RNG (spawns, AI, jitter)
    pub rng: Pcg32,
    /// Current phase
    pub phase: GamePhase,
    /// Simulated seconds (sum of clamped dt)
    pub elapsed: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Fish,
    /// Every non-player fish, in spawn order
    pub fishes: Vec<Fish>,
    pub hazards: Vec<Hazard>,
    pub barriers: Vec<Barrier>,
    pub skills: SkillBook,
    pub zones: ZoneCatalog,
    pub tracker: ZoneTracker,
    /// Side length of the current zone's square world
    pub world_extent: f32,
    /// Visual particles (not gameplay-affecting)
    pub particles: ParticleSystem,
    pub camera: ViewFollow,
    /// Seconds since the last fish respawn batch
    pub fish_spawn_timer: f32,
    /// Seconds since the last hazard respawn batch
    pub hazard_spawn_timer: f32,
    /// Events raised during the most recent tick
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game with the canonical balance
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a new game: player at the centre of the first zone, zone populated
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let zones = ZoneCatalog::default();
        let tracker = ZoneTracker::new(0);
        let world_extent = zones.get(0).extent;
        let start = Vec2::splat(world_extent / 2.0);

        let player = Fish::player(FishId(1), start, tuning.player_start_size, tuning.win_size);
        let particles = ParticleSystem::new(seed, tuning.max_particles);

        let mut state = Self {
            seed,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            elapsed: 0.0,
            time_ticks: 0,
            player,
            fishes: Vec::new(),
            hazards: Vec::new(),
            barriers: Vec::new(),
            skills: SkillBook::default(),
            zones,
            tracker,
            world_extent,
            particles,
            camera: ViewFollow::new(start),
            fish_spawn_timer: 0.0,
            hazard_spawn_timer: 0.0,
            events: Vec::new(),
            next_id: 2,
        };

        populate_zone(&mut state);
        log::info!(
            "New game (seed {}) in {} with {} fish and {} hazards",
            seed,
            state.current_zone().name,
            state.fishes.len(),
            state.hazards.len()
        );
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn current_zone(&self) -> &Zone {
        self.zones.get(self.tracker.current())
    }

    /// Snapshot of every fish (player first) for this tick's AI decisions
    pub fn sightings(&self) -> Vec<Sighting> {
        std::iter::once(&self.player)
            .chain(self.fishes.iter())
            .map(Fish::sighting)
            .collect()
    }

    pub fn living_fish(&self) -> usize {
        self.fishes.iter().filter(|f| f.alive).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_layout() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.id, FishId(1));
        assert_eq!(state.player.pos, Vec2::new(1000.0, 1000.0));
        assert_eq!(state.player.size, 12.0);
        assert_eq!(state.player.max_size, 50.0);
        assert_eq!(state.world_extent, 2000.0);
        assert_eq!(state.fishes.len(), 20);
        assert_eq!(state.hazards.len(), 3);
        assert_eq!(state.camera.center, state.player.pos);
    }

    #[test]
    fn test_ids_are_unique() {
        let state = GameState::new(7);
        let mut ids: Vec<_> = state.fishes.iter().map(|f| f.id).collect();
        ids.push(state.player.id);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), state.fishes.len() + 1);
    }

    #[test]
    fn test_sightings_cover_everyone() {
        let state = GameState::new(3);
        let sightings = state.sightings();
        assert_eq!(sightings.len(), state.fishes.len() + 1);
        assert_eq!(sightings[0].id, state.player.id);
    }

    #[test]
    fn test_view_follow_eases_and_snaps() {
        let mut view = ViewFollow::new(Vec2::ZERO);
        view.follow(Vec2::new(100.0, 0.0), 5.0, 0.1);
        assert!((view.center.x - 50.0).abs() < 1e-4);
        assert_eq!(view.target, Vec2::new(100.0, 0.0));

        // A huge step never overshoots
        view.follow(Vec2::new(100.0, 0.0), 5.0, 10.0);
        assert_eq!(view.center, Vec2::new(100.0, 0.0));

        view.snap(Vec2::new(-5.0, 7.0));
        assert_eq!(view.center, view.target);
    }
}
