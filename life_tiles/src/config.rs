use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::{RuleParameters, MIN_GRID_SIDE};
use crate::LifeError;

// ============================================================================
// DEFAULTS
// ============================================================================

pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 10;
pub const LEVEL_PERIOD: f64 = 20.0;
pub const LEVEL_SETTLE_DELAY: f64 = 2.0;
pub const DELAY_DIVISOR: f64 = 1.5;
pub const REVIVAL_STEP_EVERY: u32 = 5;
pub const BAND_STEP_EVERY: u32 = 8;
pub const EASE_RATE: f32 = 7.0;
pub const HOVER_EPSILON: f32 = 0.1;
pub const REST_EPSILON: f32 = 0.001;
pub const SPAWN_INTERVAL: f64 = 0.02;

// ============================================================================
// CONFIG
// ============================================================================

/// Every tunable of one board. Missing JSON fields fall back to the defaults.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub width: usize,
    pub height: usize,
    /// Starting thresholds and delay range.
    pub rules: RuleParameters,
    pub level_period: f64,
    pub level_settle_delay: f64,
    pub delay_divisor: f64,
    pub revival_step_every: u32,
    pub band_step_every: u32,
    /// Hover target relative to a tile's resting position.
    pub hover_offset: Vec3,
    pub ease_rate: f32,
    pub hover_epsilon: f32,
    pub rest_epsilon: f32,
    /// Reveal cadence while loading; zero reveals the whole board at once.
    pub spawn_interval: f64,
    pub shake_intensity: f32,
    pub shake_duration: f32,
    pub win_alive_percent: f64,
    pub lose_dead_percent: f64,
    /// Seed for the delay RNG; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            rules: RuleParameters::default(),
            level_period: LEVEL_PERIOD,
            level_settle_delay: LEVEL_SETTLE_DELAY,
            delay_divisor: DELAY_DIVISOR,
            revival_step_every: REVIVAL_STEP_EVERY,
            band_step_every: BAND_STEP_EVERY,
            hover_offset: Vec3::new(0.0, 0.0, -2.0),
            ease_rate: EASE_RATE,
            hover_epsilon: HOVER_EPSILON,
            rest_epsilon: REST_EPSILON,
            spawn_interval: SPAWN_INTERVAL,
            shake_intensity: 0.15,
            shake_duration: 0.3,
            win_alive_percent: 70.0,
            lose_dead_percent: 90.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self, LifeError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LifeError> {
        validate_grid_size(self.width, self.height)?;
        validate_delay_range(self.rules.min_delay, self.rules.max_delay)?;

        if !(self.level_period > 0.0) {
            return Err(LifeError::InvalidConfig(format!(
                "level_period must be positive, got {}",
                self.level_period
            )));
        }
        if !(self.level_settle_delay >= 0.0) {
            return Err(LifeError::InvalidConfig(format!(
                "level_settle_delay must not be negative, got {}",
                self.level_settle_delay
            )));
        }
        // A divisor at or below 1 would stall or slow the sweep instead of speeding it up
        if !(self.delay_divisor > 1.0) {
            return Err(LifeError::InvalidConfig(format!(
                "delay_divisor must be greater than 1, got {}",
                self.delay_divisor
            )));
        }
        if self.revival_step_every == 0 || self.band_step_every == 0 {
            return Err(LifeError::InvalidConfig(
                "level step intervals must be at least 1".to_string(),
            ));
        }
        if !(self.ease_rate > 0.0) || !(self.hover_epsilon > 0.0) || !(self.rest_epsilon > 0.0) {
            return Err(LifeError::InvalidConfig(
                "ease_rate and epsilons must be positive".to_string(),
            ));
        }
        if !(self.spawn_interval >= 0.0) {
            return Err(LifeError::InvalidConfig(format!(
                "spawn_interval must not be negative, got {}",
                self.spawn_interval
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_grid_size(width: usize, height: usize) -> Result<(), LifeError> {
    if width < MIN_GRID_SIDE || height < MIN_GRID_SIDE {
        return Err(LifeError::InvalidGridSize { width, height });
    }
    Ok(())
}

pub(crate) fn validate_delay_range(min: f64, max: f64) -> Result<(), LifeError> {
    if !min.is_finite() || !max.is_finite() || min <= 0.0 || max < min {
        return Err(LifeError::InvalidDelayRange { min, max });
    }
    Ok(())
}
