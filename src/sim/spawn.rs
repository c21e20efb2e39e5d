//! Population placement: initial/zone population and periodic respawns

use glam::Vec2;
use rand::Rng;

use super::fish::{Fish, FishId, FishKind};
use super::state::{GameState, Hazard};
use crate::random_between;

/// Minimum player distance for each band of a fresh zone population
const SMALL_BAND_MIN_DIST: f32 = 300.0;
const NORMAL_BAND_MIN_DIST: f32 = 300.0;
const BIG_BAND_MIN_DIST: f32 = 400.0;
const ZONE_HAZARD_MIN_DIST: f32 = 400.0;

/// Smallest fish a zone population ever contains
const SMALL_BAND_MIN_SIZE: f32 = 6.0;
/// Upper edge of the big band
const BIG_BAND_MAX_SIZE: f32 = 35.0;

/// Rejection-sample a point in `[margin, extent - margin]²` at least
/// `min_dist` from `avoid`. After `attempts` misses the last sample is used.
pub fn sample_position<R: Rng + ?Sized>(
    rng: &mut R,
    extent: f32,
    margin: f32,
    avoid: Vec2,
    min_dist: f32,
    attempts: u32,
) -> Vec2 {
    let mut pos = Vec2::ZERO;
    for _ in 0..attempts.max(1) {
        pos = Vec2::new(
            random_between(rng, margin, extent - margin),
            random_between(rng, margin, extent - margin),
        );
        if pos.distance(avoid) >= min_dist {
            break;
        }
    }
    pos
}

fn pick<R: Rng + ?Sized>(rng: &mut R, palette: &[FishKind]) -> FishKind {
    if palette.is_empty() {
        FishKind::default()
    } else {
        palette[rng.random_range(0..palette.len())]
    }
}

fn place_fish(state: &mut GameState, kind: FishKind, size: f32, min_dist: f32) {
    let pos = sample_position(
        &mut state.rng,
        state.world_extent,
        state.tuning.fish_spawn_margin,
        state.player.pos,
        min_dist,
        state.tuning.spawn_attempts,
    );
    let id = FishId(state.next_entity_id());
    let fish = Fish::ai(id, pos, size, kind, &mut state.rng);
    state.fishes.push(fish);
}

/// Place `count` hazards at least `min_dist` from the player
pub fn spawn_hazards(state: &mut GameState, count: usize, min_dist: f32) {
    for _ in 0..count {
        let pos = sample_position(
            &mut state.rng,
            state.world_extent,
            state.tuning.hazard_spawn_margin,
            state.player.pos,
            min_dist,
            state.tuning.spawn_attempts,
        );
        let phase = random_between(&mut state.rng, 0.0, std::f32::consts::TAU);
        let id = state.next_entity_id();
        state.hazards.push(Hazard {
            id,
            pos,
            radius: state.tuning.hazard_radius,
            phase,
        });
    }
}

/// Fill the current zone to its catalog targets, sized relative to the player:
/// 60% small prey, 30% near the player's size, the rest bigger threats.
pub fn populate_zone(state: &mut GameState) {
    let (palette, fish_count, hazard_count) = {
        let zone = state.current_zone();
        (zone.palette.clone(), zone.fish_count, zone.hazard_count)
    };
    let player_size = state.player.size;

    let small = fish_count * 6 / 10;
    let normal = fish_count * 3 / 10;
    let big = fish_count - small - normal;

    for _ in 0..small {
        let size = random_between(
            &mut state.rng,
            SMALL_BAND_MIN_SIZE,
            (player_size * 0.7).max(8.0),
        );
        place_fish(state, FishKind::Small, size, SMALL_BAND_MIN_DIST);
    }
    for _ in 0..normal {
        let size = random_between(&mut state.rng, player_size * 0.8, player_size * 1.2);
        let kind = pick(&mut state.rng, &palette);
        place_fish(state, kind, size, NORMAL_BAND_MIN_DIST);
    }
    for _ in 0..big {
        let size = random_between(&mut state.rng, player_size * 1.3, BIG_BAND_MAX_SIZE);
        let kind = pick(&mut state.rng, &palette);
        place_fish(state, kind, size, BIG_BAND_MIN_DIST);
    }

    spawn_hazards(state, hazard_count, ZONE_HAZARD_MIN_DIST);
}

/// Periodic top-up: a batch of random fish away from the player
pub fn spawn_fish_batch(state: &mut GameState) {
    let (lo, hi) = state.tuning.fish_respawn_size;
    let min_dist = state.tuning.fish_respawn_min_dist;
    for _ in 0..state.tuning.fish_respawn_batch {
        let kind = FishKind::ALL[state.rng.random_range(0..FishKind::ALL.len())];
        let size = random_between(&mut state.rng, lo, hi);
        place_fish(state, kind, size, min_dist);
    }
    log::debug!(
        "Respawned {} fish ({} alive)",
        state.tuning.fish_respawn_batch,
        state.living_fish()
    );
}
