//! Per-frame simulation tick
//!
//! One call advances the whole world synchronously, in a fixed order:
//! input, movement, interactions, portals, timers, respawns, terminal checks.
//! Fish that die during the tick stay in the table (marked dead) until the
//! final purge so every resolution step sees a stable layout.

use glam::Vec2;

use super::fish::Control;
use super::particles::{EXPLOSION_COLOR, EffectSink};
use super::skills::{resolve_barrier_contacts, tick_barriers, use_skill};
use super::spawn::{spawn_fish_batch, spawn_hazards};
use super::state::{GameEvent, GamePhase, GameState, HAZARD_PULSE_RATE};
use super::zones::{check_portals, teleport};
use crate::circles_overlap;

/// Pointer distance inside which pointer steering is ignored
pub const POINTER_DEADZONE: f32 = 50.0;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired swim direction (normalized by the core); `None` coasts
    pub steer: Option<Vec2>,
    /// Change the selected ability slot
    pub select: Option<usize>,
    /// Use the selected ability
    pub use_skill: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// Keyboard-style axes, e.g. `(-1, 0)` for left; `(0, 0)` is no intent
    pub fn from_axes(x: f32, y: f32) -> Self {
        let axes = Vec2::new(x, y);
        Self {
            steer: (axes != Vec2::ZERO).then_some(axes),
            ..Default::default()
        }
    }

    /// Steer toward a pointer. Within `deadzone` of the player there is no intent.
    pub fn pointer(player_screen_pos: Vec2, pointer_pos: Vec2, deadzone: f32) -> Self {
        let offset = pointer_pos - player_screen_pos;
        Self {
            steer: (offset.length() > deadzone).then_some(offset),
            ..Default::default()
        }
    }
}

/// Advance the game state by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    // Don't tick if paused or the run is over
    if state.phase != GamePhase::Playing {
        return;
    }

    // Stalled frames are clamped, never sub-stepped
    let dt = dt.clamp(0.0, state.tuning.max_frame_dt);
    state.elapsed += dt;
    state.time_ticks += 1;

    handle_skill_input(state, input);
    move_fish(state, input.steer, dt);

    for hazard in &mut state.hazards {
        hazard.phase = (hazard.phase + HAZARD_PULSE_RATE * dt) % std::f32::consts::TAU;
    }
    state.particles.update(dt);
    state
        .camera
        .follow(state.player.pos, state.tuning.camera_follow_rate, dt);

    resolve_interactions(state);
    if state.phase == GamePhase::Lost {
        purge_dead(state);
        return;
    }

    if let Some(portal) = check_portals(state) {
        if let Err(err) = teleport(state, portal.to, portal.arrival) {
            log::debug!("Portal ignored: {}", err);
        }
    }
    state
        .tracker
        .tick(state.elapsed, state.tuning.transition_lock_secs);

    state.skills.tick(dt);
    tick_barriers(&mut state.barriers, dt);

    update_spawning(state, dt);

    if state.player.alive && state.player.size >= state.tuning.win_size {
        end_run(state, GamePhase::Won);
    }

    purge_dead(state);
}

fn handle_skill_input(state: &mut GameState, input: &TickInput) {
    if let Some(slot) = input.select {
        if let Err(err) = state.skills.select(slot) {
            log::debug!("Select rejected: {}", err);
        }
    }
    if input.use_skill {
        let slot = state.skills.selected();
        if let Err(err) = use_skill(state, slot) {
            log::debug!("Skill rejected: {}", err);
        }
    }
}

/// Integrate the player, then every AI fish against the pre-move snapshot
fn move_fish(state: &mut GameState, steer: Option<Vec2>, dt: f32) {
    let sightings = state.sightings();
    let extent = state.world_extent;

    let control = Control::Player {
        steer,
        accel: state.tuning.input_accel,
        drag: state.tuning.player_drag,
    };
    state
        .player
        .advance(dt, control, extent, &mut state.rng, &mut state.particles);

    for fish in &mut state.fishes {
        fish.advance(
            dt,
            Control::Ai {
                sightings: &sightings,
            },
            extent,
            &mut state.rng,
            &mut state.particles,
        );
    }
}

/// Player vs fish, player vs hazards, AI vs AI, then barriers
fn resolve_interactions(state: &mut GameState) {
    if !state.player.alive {
        return;
    }

    for fish in state.fishes.iter_mut() {
        if !fish.alive {
            continue;
        }
        if state.player.can_eat(fish) {
            let before = state.player.size;
            state.player.eat(fish, &mut state.particles);
            fish.die(&mut state.particles);
            state.events.push(GameEvent::FishEaten {
                predator: state.player.id,
                prey: fish.id,
            });
            if state.player.size > before {
                log::info!("Player grew to {:.0}", state.player.size);
                state.events.push(GameEvent::PlayerGrew {
                    size: state.player.size,
                });
            }
        } else if fish.can_eat(&state.player) {
            state.player.die(&mut state.particles);
            state.events.push(GameEvent::FishEaten {
                predator: fish.id,
                prey: state.player.id,
            });
            break;
        }
    }
    if !state.player.alive {
        end_run(state, GamePhase::Lost);
        return;
    }

    let triggered = state.hazards.iter().position(|h| {
        circles_overlap(state.player.pos, state.player.radius(), h.pos, h.radius)
    });
    if let Some(index) = triggered {
        let hazard = state.hazards.remove(index);
        explode(state, hazard.pos);
        if !state.player.alive {
            end_run(state, GamePhase::Lost);
            return;
        }
    }

    // Every unordered AI pair once; eat needs strict asymmetry so at most
    // one direction can hold
    let fishes = &mut state.fishes;
    for i in 0..fishes.len() {
        let (head, tail) = fishes.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if !a.alive {
                break;
            }
            if !b.alive {
                continue;
            }
            if a.can_eat(b) {
                a.eat(b, &mut state.particles);
                b.die(&mut state.particles);
                state.events.push(GameEvent::FishEaten {
                    predator: a.id,
                    prey: b.id,
                });
            } else if b.can_eat(a) {
                b.eat(a, &mut state.particles);
                a.die(&mut state.particles);
                state.events.push(GameEvent::FishEaten {
                    predator: b.id,
                    prey: a.id,
                });
            }
        }
    }

    resolve_barrier_contacts(&state.barriers, &mut state.fishes, &mut state.rng);
}

/// Kill everything alive (player included) within the blast radius
fn explode(state: &mut GameState, at: Vec2) {
    let radius = state.tuning.blast_radius;
    state.particles.burst(at, EXPLOSION_COLOR);

    let mut kills = 0;
    for fish in std::iter::once(&mut state.player).chain(state.fishes.iter_mut()) {
        if fish.alive && fish.pos.distance(at) < radius {
            fish.die(&mut state.particles);
            kills += 1;
        }
    }

    log::debug!("Hazard exploded at ({:.0}, {:.0}): {} killed", at.x, at.y, kills);
    state
        .events
        .push(GameEvent::HazardExploded { pos: at, kills });
}

fn update_spawning(state: &mut GameState, dt: f32) {
    state.fish_spawn_timer += dt;
    if state.fish_spawn_timer >= state.tuning.fish_respawn_interval {
        state.fish_spawn_timer = 0.0;
        spawn_fish_batch(state);
    }

    state.hazard_spawn_timer += dt;
    if state.hazard_spawn_timer >= state.tuning.hazard_respawn_interval {
        state.hazard_spawn_timer = 0.0;
        let count = state.tuning.hazard_respawn_batch;
        let min_dist = state.tuning.hazard_respawn_min_dist;
        spawn_hazards(state, count, min_dist);
        log::debug!("Respawned {} hazards", count);
    }
}

fn end_run(state: &mut GameState, phase: GamePhase) {
    state.phase = phase;
    match phase {
        GamePhase::Won => {
            log::info!(
                "Won at size {:.0} after {:.1}s",
                state.player.size,
                state.elapsed
            );
            state.events.push(GameEvent::Won);
        }
        GamePhase::Lost => {
            log::info!(
                "Lost at size {:.0} after {:.1}s",
                state.player.size,
                state.elapsed
            );
            state.events.push(GameEvent::Lost);
        }
        _ => {}
    }
}

fn purge_dead(state: &mut GameState) {
    state.fishes.retain(|f| f.alive);
}
