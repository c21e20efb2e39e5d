//! Data-driven game balance
//!
//! Every balance constant the simulation reads lives in [`Tuning`]. The
//! defaults are the canonical game; a JSON file can override any subset.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::skills::{SKILL_SLOTS, SkillDef, default_skills};

/// Failure to read or parse a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Game balance parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    /// Size the player starts each run at
    pub player_start_size: f32,
    /// Reaching this size wins the run (also the player's size cap)
    pub win_size: f32,
    /// Steering acceleration factor (velocity += dir * speed * dt * factor)
    pub input_accel: f32,
    /// Per-tick velocity retention for the player (0.9 = 10% loss)
    pub player_drag: f32,

    // === Frame ===
    /// Largest dt a single tick will integrate (stalled frames are clamped)
    pub max_frame_dt: f32,
    /// Camera follow rate (lerp factor per second)
    pub camera_follow_rate: f32,

    // === Population maintenance ===
    /// Seconds between fish respawn batches
    pub fish_respawn_interval: f32,
    /// Fish per respawn batch
    pub fish_respawn_batch: usize,
    /// Respawned fish size range [min, max)
    pub fish_respawn_size: (f32, f32),
    /// Respawned fish keep at least this far from the player
    pub fish_respawn_min_dist: f32,
    /// Seconds between hazard respawn batches
    pub hazard_respawn_interval: f32,
    /// Hazards per respawn batch
    pub hazard_respawn_batch: usize,
    /// Respawned hazards keep at least this far from the player
    pub hazard_respawn_min_dist: f32,
    /// Fish spawn this far inside the world edge
    pub fish_spawn_margin: f32,
    /// Hazards spawn this far inside the world edge
    pub hazard_spawn_margin: f32,
    /// Rejection-sampling attempts before accepting the last sample
    pub spawn_attempts: u32,

    // === Hazards ===
    /// Trigger radius of a hazard
    pub hazard_radius: f32,
    /// Everything alive within this distance of a triggered hazard dies
    pub blast_radius: f32,

    // === Zones ===
    /// Portal checks are skipped for this long after a transition
    pub portal_guard_secs: f32,
    /// Transition flag stays raised for this long
    pub transition_lock_secs: f32,
    /// Speed multiplier granted on arrival in a new zone
    pub teleport_boost_multiplier: f32,
    /// Duration of the arrival speed boost
    pub teleport_boost_secs: f32,

    // === Effects ===
    /// Particle cap (oldest particles are evicted beyond this)
    pub max_particles: usize,

    // === Skills ===
    pub skills: [SkillDef; SKILL_SLOTS],
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_start_size: 12.0,
            win_size: 50.0,
            input_accel: 3.0,
            player_drag: 0.9,

            max_frame_dt: 0.1,
            camera_follow_rate: 5.0,

            fish_respawn_interval: 10.0,
            fish_respawn_batch: 3,
            fish_respawn_size: (8.0, 30.0),
            fish_respawn_min_dist: 200.0,
            hazard_respawn_interval: 15.0,
            hazard_respawn_batch: 1,
            hazard_respawn_min_dist: 300.0,
            fish_spawn_margin: 50.0,
            hazard_spawn_margin: 100.0,
            spawn_attempts: 50,

            hazard_radius: 15.0,
            blast_radius: 100.0,

            portal_guard_secs: 2.0,
            transition_lock_secs: 1.0,
            teleport_boost_multiplier: 1.5,
            teleport_boost_secs: 3.0,

            max_particles: 512,

            skills: default_skills(),
        }
    }
}

impl Tuning {
    /// Parse a JSON overlay; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Serialize to pretty JSON (for dumping the current balance)
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::skills::SkillKind;

    #[test]
    fn test_partial_overlay_keeps_defaults() {
        let tuning = Tuning::from_json_str(r#"{ "win_size": 40.0, "blast_radius": 80.0 }"#)
            .expect("valid overlay");
        assert_eq!(tuning.win_size, 40.0);
        assert_eq!(tuning.blast_radius, 80.0);
        assert_eq!(tuning.player_start_size, 12.0);
        assert_eq!(tuning.skills[0].kind(), SkillKind::StunPulse);
    }

    #[test]
    fn test_round_trip_defaults() {
        let json = Tuning::default().to_json().expect("serializable");
        let back = Tuning::from_json_str(&json).expect("parseable");
        assert_eq!(back.fish_respawn_batch, 3);
        assert_eq!(back.skills[2].cooldown, 5.0);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = Tuning::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Tuning::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, TuningError::Io(_)));
    }
}
