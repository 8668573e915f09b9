//! Data-driven game balance
//!
//! Every gameplay constant lives in [`Tuning`]. Defaults reproduce the
//! shipped balance; a host may override any subset from JSON.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest accepted distance-per-point; below this scores overflow quickly
pub const MIN_SCORE_FACTOR: f32 = 0.01;
/// Largest accepted spawn weight, keeping weight sums well inside `u32`
pub const MAX_SPAWN_WEIGHT: u32 = 10_000;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Difficulty ramp and the value ranges it scales
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Factor gained per second of session time
    pub rate_per_sec: f32,
    /// Saturation value of the factor
    pub max_factor: f32,
    /// Most negative gate value at factor 1.0 (scales linearly)
    pub gate_value_min: i32,
    /// Highest gate value a spawn roll can produce
    pub gate_value_max: i32,
    /// Hazard barrel health range at factor 1.0 (scales with sqrt)
    pub hazard_health_min: i32,
    pub hazard_health_max: i32,
    /// Fire-rate barrel required hits at factor 1.0 (scales linearly)
    pub fire_rate_hits_min: i32,
    pub fire_rate_hits_max: i32,
    /// Zombie spawn chance per zombie tick at factor 1.0
    pub zombie_chance_base: f32,
    /// Zombie spawn chance per zombie tick at max factor
    pub zombie_chance_max: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            rate_per_sec: 0.02,
            max_factor: 3.0,
            gate_value_min: -10,
            gate_value_max: 2,
            hazard_health_min: 3,
            hazard_health_max: 10,
            fire_rate_hits_min: 4,
            fire_rate_hits_max: 10,
            zombie_chance_base: 0.1,
            zombie_chance_max: 0.4,
        }
    }
}

/// Relative weights for row patterns and object types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnWeights {
    pub left_only: u32,
    pub right_only: u32,
    /// Scaled by the difficulty factor at roll time
    pub both: u32,
    pub empty: u32,
    pub gate: u32,
    pub hazard_barrel: u32,
    pub fire_rate_barrel: u32,
}

impl Default for SpawnWeights {
    fn default() -> Self {
        Self {
            left_only: 3,
            right_only: 3,
            both: 2,
            empty: 2,
            gate: 45,
            hazard_barrel: 40,
            fire_rate_barrel: 15,
        }
    }
}

/// Collision box sizes per entity type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySizes {
    pub player: Vec2,
    pub crowd_member: Vec2,
    pub projectile: Vec2,
    pub gate: Vec2,
    pub barrel: Vec2,
    pub zombie: Vec2,
}

impl Default for EntitySizes {
    fn default() -> Self {
        Self {
            player: Vec2::new(32.0, 32.0),
            crowd_member: Vec2::new(24.0, 24.0),
            projectile: Vec2::new(5.0, 10.0),
            gate: Vec2::new(80.0, 40.0),
            barrel: Vec2::new(40.0, 60.0),
            zombie: Vec2::new(30.0, 30.0),
        }
    }
}

/// Facts the asset layer reports about loaded art.
///
/// Missing entries fall back to [`EntitySizes`] and to instant removal of
/// dead zombies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetHints {
    /// Size of the closed gate texture
    pub gate_size: Option<Vec2>,
    /// Size of the first zombie walk frame
    pub zombie_size: Option<Vec2>,
    /// Length of the zombie death animation
    pub zombie_death_secs: Option<f32>,
}

impl Default for AssetHints {
    fn default() -> Self {
        Self {
            gate_size: None,
            zombie_size: None,
            zombie_death_secs: Some(0.6),
        }
    }
}

/// Complete gameplay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Scrolling ===
    pub initial_scroll_speed: f32,
    pub max_scroll_speed: f32,
    /// Scroll speed gained per second
    pub scroll_acceleration: f32,

    // === Spawning ===
    /// Seconds between object rows
    pub row_interval: f32,
    /// Seconds between zombie spawn rolls
    pub zombie_interval: f32,
    pub weights: SpawnWeights,
    pub difficulty: DifficultyTuning,

    // === Shooting ===
    /// Seconds between volleys at session start
    pub fire_interval: f32,
    /// Interval reduction granted by a fire-rate barrel
    pub fire_interval_step: f32,
    pub min_fire_interval: f32,
    pub projectile_speed: f32,

    // === Crowd ===
    /// Fraction of the remaining distance covered per second
    pub follow_speed_factor: f32,
    /// Formation slots relative to the leader
    pub formation_offsets: Vec<Vec2>,

    // === Session ===
    /// Distance units per score point
    pub score_factor: f32,
    /// Seconds between game over and leaving the game scene
    pub game_over_delay: f32,
    /// Frame deltas above this are clamped
    pub max_frame_delta: f32,

    pub sizes: EntitySizes,
    pub assets: AssetHints,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_scroll_speed: 150.0,
            max_scroll_speed: 300.0,
            scroll_acceleration: 2.0,

            row_interval: 1.5,
            zombie_interval: 0.5,
            weights: SpawnWeights::default(),
            difficulty: DifficultyTuning::default(),

            fire_interval: 0.4,
            fire_interval_step: 0.05,
            min_fire_interval: 0.1,
            projectile_speed: 600.0,

            follow_speed_factor: 8.0,
            formation_offsets: vec![
                Vec2::new(-30.0, -40.0),
                Vec2::new(30.0, -40.0),
                Vec2::new(0.0, -60.0),
                Vec2::new(-60.0, -80.0),
                Vec2::new(60.0, -80.0),
                Vec2::new(-30.0, -100.0),
                Vec2::new(30.0, -100.0),
            ],

            score_factor: 10.0,
            game_over_delay: 0.5,
            max_frame_delta: 0.1,

            sizes: EntitySizes::default(),
            assets: AssetHints::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a tuning file, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Using default tuning ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("row_interval", self.row_interval),
            ("zombie_interval", self.zombie_interval),
            ("fire_interval", self.fire_interval),
            ("min_fire_interval", self.min_fire_interval),
            ("projectile_speed", self.projectile_speed),
            ("score_factor", self.score_factor),
            ("max_frame_delta", self.max_frame_delta),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must be positive",
                });
            }
        }
        if self.score_factor < MIN_SCORE_FACTOR {
            return Err(TuningError::Invalid {
                field: "score_factor",
                reason: "must be at least 0.01",
            });
        }
        if self.max_scroll_speed < self.initial_scroll_speed {
            return Err(TuningError::Invalid {
                field: "max_scroll_speed",
                reason: "must not be below initial_scroll_speed",
            });
        }
        if self.difficulty.max_factor < 1.0 {
            return Err(TuningError::Invalid {
                field: "difficulty.max_factor",
                reason: "must be at least 1.0",
            });
        }
        if self.formation_offsets.is_empty() {
            return Err(TuningError::Invalid {
                field: "formation_offsets",
                reason: "needs at least one slot",
            });
        }
        let w = &self.weights;
        let all = [
            w.left_only,
            w.right_only,
            w.both,
            w.empty,
            w.gate,
            w.hazard_barrel,
            w.fire_rate_barrel,
        ];
        if all.iter().any(|&weight| weight > MAX_SPAWN_WEIGHT) {
            return Err(TuningError::Invalid {
                field: "weights",
                reason: "each weight must be at most 10000",
            });
        }
        if w.gate + w.hazard_barrel + w.fire_rate_barrel == 0 {
            return Err(TuningError::Invalid {
                field: "weights",
                reason: "object type weights sum to zero",
            });
        }
        Ok(())
    }

    /// Gate collision size, preferring the loaded texture size
    pub fn gate_size(&self) -> Vec2 {
        self.assets.gate_size.unwrap_or(self.sizes.gate)
    }

    /// Zombie collision size, preferring the loaded walk frame size
    pub fn zombie_size(&self) -> Vec2 {
        self.assets.zombie_size.unwrap_or(self.sizes.zombie)
    }

    /// Death sequence length; zero means zombies vanish immediately
    pub fn zombie_death_secs(&self) -> f32 {
        self.assets.zombie_death_secs.unwrap_or(0.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_tiny_score_factor() {
        let err = Tuning::from_json(r#"{ "score_factor": 1e-30 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "score_factor",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_oversized_weight() {
        let err = Tuning::from_json(r#"{ "weights": { "gate": 4294967295 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "weights", .. }));
    }

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "fire_interval": 0.25, "weights": { "empty": 0 } }"#)
            .expect("valid tuning");
        assert_eq!(tuning.fire_interval, 0.25);
        assert_eq!(tuning.weights.empty, 0);
        assert_eq!(tuning.weights.gate, 45);
        assert_eq!(tuning.formation_offsets.len(), 7);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = Tuning::from_json(r#"{ "row_interval": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "row_interval",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tuning = Tuning::load_or_default("/nonexistent/horde-rush-tuning.json");
        assert_eq!(tuning.score_factor, 10.0);
    }

    #[test]
    fn test_asset_hint_fallbacks() {
        let mut tuning = Tuning::default();
        assert_eq!(tuning.gate_size(), tuning.sizes.gate);
        tuning.assets.gate_size = Some(Vec2::new(90.0, 50.0));
        assert_eq!(tuning.gate_size(), Vec2::new(90.0, 50.0));
        tuning.assets.zombie_death_secs = None;
        assert_eq!(tuning.zombie_death_secs(), 0.0);
    }
}
