//! Error types for board construction and configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifeError {
    /// Lattice too small to hold a single interior cell.
    #[error("invalid grid size {width}x{height}: both sides must be at least 3")]
    InvalidGridSize { width: usize, height: usize },

    /// Per-cell delay range is empty, non-positive or not finite.
    #[error("invalid delay range [{min}, {max}]")]
    InvalidDelayRange { min: f64, max: f64 },

    /// Any other tunable out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Ability selector other than 1 or 2.
    #[error("unknown ability {0}, expected 1 or 2")]
    UnknownAbility(u8),

    /// Configuration document could not be parsed.
    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
}
