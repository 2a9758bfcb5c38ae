/// Simulation configuration
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// User-facing configuration, loadable from TOML by the front-ends.
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Duration of one quarter or half turn animation, in milliseconds
    pub turn_duration_ms: f64,
    /// Maximum number of moves waiting behind the active turn
    pub queue_capacity: usize,
    /// Number of moves in a generated scramble
    pub scramble_length: usize,
    /// Whether middle-slice turns (M, E, S) are available
    pub slice_turns: bool,
    /// Minimum drag distance, in cube units, before a gesture becomes a turn
    pub drag_threshold: f32,
    /// Whole-cube view rotation per arrow key press, in radians
    pub view_step: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            turn_duration_ms: 250.0,
            queue_capacity: 8,
            scramble_length: 25,
            slice_turns: true,
            drag_threshold: 0.25,
            view_step: 0.15,
        }
    }
}

impl SimConfig {
    /// Check every field and convert the turn duration
    pub fn validate(&self) -> Result<ValidConfig> {
        let turn_duration = turn_duration_from_millis(self.turn_duration_ms)?;
        if self.queue_capacity == 0 {
            return Err(Error::InvalidConfiguration(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.scramble_length == 0 {
            return Err(Error::InvalidConfiguration(
                "scramble_length must be at least 1".to_string(),
            ));
        }
        if !(self.drag_threshold.is_finite() && self.drag_threshold > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "drag_threshold must be positive, got {}",
                self.drag_threshold
            )));
        }
        if !self.view_step.is_finite() {
            return Err(Error::InvalidConfiguration(format!(
                "view_step must be finite, got {}",
                self.view_step
            )));
        }
        Ok(ValidConfig {
            turn_duration,
            queue_capacity: self.queue_capacity,
            scramble_length: self.scramble_length,
            slice_turns: self.slice_turns,
            drag_threshold: self.drag_threshold,
            view_step: self.view_step,
        })
    }
}

/// Configuration that passed validation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidConfig {
    pub turn_duration: Duration,
    pub queue_capacity: usize,
    pub scramble_length: usize,
    pub slice_turns: bool,
    pub drag_threshold: f32,
    pub view_step: f32,
}

impl Default for ValidConfig {
    fn default() -> Self {
        Self {
            turn_duration: Duration::from_millis(250),
            queue_capacity: 8,
            scramble_length: 25,
            slice_turns: true,
            drag_threshold: 0.25,
            view_step: 0.15,
        }
    }
}

/// Turn duration must be strictly positive and finite
pub fn turn_duration_from_millis(ms: f64) -> Result<Duration> {
    if !(ms.is_finite() && ms > 0.0) {
        return Err(Error::InvalidConfiguration(format!(
            "turn duration must be positive and finite, got {ms} ms"
        )));
    }
    let nanos = (ms * 1_000_000.0).round();
    if nanos < 1.0 || nanos >= u64::MAX as f64 {
        return Err(Error::InvalidConfiguration(format!(
            "turn duration {ms} ms is out of range"
        )));
    }
    Ok(Duration::from_nanos(nanos as u64))
}
