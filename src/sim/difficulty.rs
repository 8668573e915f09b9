//! Difficulty ramp
//!
//! A linear factor from 1.0 at session start up to a cap. Spawn ranges and
//! probabilities are derived from it at roll time.

use serde::{Deserialize, Serialize};

use crate::tuning::DifficultyTuning;

/// Pure mapping from session time to spawn parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyModel {
    params: DifficultyTuning,
}

impl DifficultyModel {
    pub fn new(params: DifficultyTuning) -> Self {
        Self { params }
    }

    pub fn max_factor(&self) -> f32 {
        self.params.max_factor.max(1.0)
    }

    /// Difficulty factor after `elapsed_secs` of play
    pub fn factor(&self, elapsed_secs: f32) -> f32 {
        let ramp = 1.0 + self.params.rate_per_sec * elapsed_secs.max(0.0);
        ramp.min(self.max_factor())
    }

    /// Ramp progress in [0, 1]
    fn progress(&self, factor: f32) -> f32 {
        let span = self.max_factor() - 1.0;
        if span <= f32::EPSILON {
            return 1.0;
        }
        ((factor - 1.0) / span).clamp(0.0, 1.0)
    }

    /// Initial gate value range. The negative end grows with the factor.
    pub fn gate_value_range(&self, factor: f32) -> (i32, i32) {
        let min = (self.params.gate_value_min as f32 * factor).round() as i32;
        ordered(min, self.params.gate_value_max)
    }

    /// Hazard barrel health range, scaled by sqrt(factor)
    pub fn hazard_health_range(&self, factor: f32) -> (i32, i32) {
        let scale = factor.max(1.0).sqrt();
        scaled(
            self.params.hazard_health_min,
            self.params.hazard_health_max,
            scale,
        )
    }

    /// Hits needed to empty a fire-rate barrel
    pub fn fire_rate_hits_range(&self, factor: f32) -> (i32, i32) {
        scaled(
            self.params.fire_rate_hits_min,
            self.params.fire_rate_hits_max,
            factor.max(1.0),
        )
    }

    /// Chance that a zombie tick spawns a zombie
    pub fn zombie_chance(&self, factor: f32) -> f32 {
        let t = self.progress(factor);
        let base = self.params.zombie_chance_base;
        (base + (self.params.zombie_chance_max - base) * t).clamp(0.0, 1.0)
    }

    /// Weight of two-object rows, which grow more common over time
    pub fn both_lanes_weight(&self, base: u32, factor: f32) -> u32 {
        (base as f32 * factor.max(1.0)).round() as u32
    }
}

fn scaled(min: i32, max: i32, scale: f32) -> (i32, i32) {
    let lo = (min as f32 * scale).round() as i32;
    let hi = (max as f32 * scale).round() as i32;
    let (lo, hi) = ordered(lo, hi);
    (lo.max(1), hi.max(1))
}

fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Current difficulty as read by the spawners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySnapshot {
    pub factor: f32,
}

impl Default for DifficultySnapshot {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

impl DifficultySnapshot {
    /// Recompute from session time; never moves backwards
    pub fn update(&mut self, model: &DifficultyModel, elapsed_secs: f32) {
        self.factor = self.factor.max(model.factor(elapsed_secs));
    }
}
