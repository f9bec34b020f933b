//! Tile-animated Game of Life core.
//!
//! A bounded board swept one cell at a time on a randomized cadence, tiles
//! that lift and settle with their own state machine, and a difficulty ramp
//! that tightens the rule over time. Rendering, sound and the score display
//! are host collaborators reached through [`ports`].

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod abilities;
pub mod config;
pub mod difficulty;
mod error;
pub mod grid;
pub mod ports;
pub mod rules;
pub mod scheduler;
pub mod scoreboard;
pub mod seed;
pub mod simulation;
pub mod tiles;
pub mod types;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::SimulationConfig;
pub use error::LifeError;
pub use grid::Grid;
pub use ports::{DisplaySink, EffectSink, Ports, Recorder, TileFactory};
pub use simulation::{BoardSnapshot, Simulation};
pub use types::{Ability, CellState, Outcome, Phase, RuleParameters, TileHandle, TileState};

// ============================================================================
// CONVENIENCE
// ============================================================================

/// Allocate a board and seed its interior. Fails with
/// [`LifeError::InvalidGridSize`] when there is no interior cell.
pub fn initialize_grid<F>(width: usize, height: usize, seed_fn: F) -> Result<Grid, LifeError>
where
    F: FnMut(usize, usize) -> CellState,
{
    Grid::initialize(width, height, seed_fn)
}

#[cfg(test)]
mod tests;
