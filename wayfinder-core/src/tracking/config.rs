use serde::{Deserialize, Serialize};

use crate::{Meters, Millis};

/// Tuning of the sensor fusion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Distance credited for one detected step
    pub step_length: Meters,
    /// Distance credited for one manual trigger
    pub manual_increment: Meters,
    /// Minimum time between two accepted steps
    pub step_refractory_ms: Millis,
    /// Acceleration magnitude (gravity included) a sample must exceed to
    /// count as a step
    pub step_threshold: f64,
    /// Fix-to-fix displacements below this are credited as zero. The fix
    /// still replaces the previous one. Zero keeps raw displacement.
    pub fix_noise_floor: Meters,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            step_length: 5,
            manual_increment: 10,
            step_refractory_ms: 400,
            step_threshold: 12.0,
            fix_noise_floor: 0,
        }
    }
}
