//! Reef Rush entry point
//!
//! Runs a headless session driven by a simple autopilot and logs the outcome.
//! Usage: `reef-rush [tuning.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
use reef_rush::Tuning;
#[cfg(not(target_arch = "wasm32"))]
use reef_rush::consts::SIM_DT;
#[cfg(not(target_arch = "wasm32"))]
use reef_rush::sim::{GameEvent, GamePhase, GameState, Snapshot, TickInput, tick};

/// Give up after this many simulated seconds
#[cfg(not(target_arch = "wasm32"))]
const SESSION_SECS: f32 = 600.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Reef Rush (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load(&path).unwrap_or_else(|e| {
            log::warn!("Using default tuning: {}", e);
            Tuning::default()
        }),
        None => Tuning::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(time_seed);

    let mut state = GameState::with_tuning(seed, tuning);
    let mut zones_visited = 1;
    let mut eaten = 0;

    while !state.phase.is_terminal() && state.elapsed < SESSION_SECS {
        let input = autopilot(&state);
        tick(&mut state, &input, SIM_DT);

        for event in &state.events {
            match event {
                GameEvent::FishEaten { predator, .. } if *predator == state.player.id => eaten += 1,
                GameEvent::ZoneEntered { .. } => zones_visited += 1,
                _ => {}
            }
        }
    }

    let outcome = match state.phase {
        GamePhase::Won => "won",
        GamePhase::Lost => "lost",
        _ => "timed out",
    };
    log::info!(
        "Session {} (seed {}): size {:.0}, {} fish eaten, {} zone entries, {:.1}s",
        outcome,
        seed,
        state.player.size,
        eaten,
        zones_visited,
        state.elapsed
    );

    if log::log_enabled!(log::Level::Debug) {
        match Snapshot::capture(&state).to_json() {
            Ok(json) => log::debug!("Final snapshot: {}", json),
            Err(e) => log::warn!("Snapshot failed: {}", e),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn time_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Idle-mode player: flee threats (stunning them when close), avoid bombs,
/// chase prey, otherwise head for the zone's first portal
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(state: &GameState) -> TickInput {
    use glam::Vec2;

    let player = &state.player;
    let nearest = |keep: &dyn Fn(f32) -> bool| {
        state
            .fishes
            .iter()
            .filter(|f| f.alive && keep(f.size))
            .map(|f| (f.pos, f.pos.distance(player.pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    };

    let threat = nearest(&|size| player.size < size * 0.8);
    if let Some((pos, dist)) = threat {
        if dist < 250.0 {
            return TickInput {
                select: Some(0),
                use_skill: dist < 90.0,
                ..TickInput::from_axes(player.pos.x - pos.x, player.pos.y - pos.y)
            };
        }
    }

    let bomb = state
        .hazards
        .iter()
        .map(|h| (h.pos, h.pos.distance(player.pos)))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((pos, dist)) = bomb {
        if dist < 80.0 {
            let away: Vec2 = player.pos - pos;
            return TickInput::from_axes(away.x, away.y);
        }
    }

    let target = nearest(&|size| size < player.size * 0.8)
        .map(|(pos, _)| pos)
        .or_else(|| {
            state
                .zones
                .portals_from(state.current_zone().id)
                .next()
                .map(|p| p.pos)
        });
    match target {
        Some(pos) => TickInput::from_axes(pos.x - player.pos.x, pos.y - player.pos.y),
        None => TickInput::default(),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation core has no browser front end
}
