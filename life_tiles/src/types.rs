use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Smallest lattice side that still leaves one interior cell.
pub const MIN_GRID_SIDE: usize = 3;

/// Offsets of the 8-neighborhood, self excluded. Row order is (-1, 0, +1) on x,
/// then y, matching the sweep order.
pub const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1),           (0, 1),
    (1, -1),  (1, 0),  (1, 1),
];

// ============================================================================
// CELLS
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    Alive,
    #[default]
    Dead,
}

impl CellState {
    #[inline]
    pub fn is_alive(self) -> bool {
        matches!(self, CellState::Alive)
    }
}

impl From<bool> for CellState {
    fn from(alive: bool) -> Self {
        if alive {
            CellState::Alive
        } else {
            CellState::Dead
        }
    }
}

// ============================================================================
// RULES
// ============================================================================

/// Thresholds of the birth/death rule plus the sweep's per-cell delay range.
///
/// Only the difficulty controller writes these after start. The integer
/// thresholds are signed on purpose: the band keeps tightening without a floor,
/// so `over_population` eventually goes negative.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct RuleParameters {
    pub under_population: i32,
    pub over_population: i32,
    pub revival_population: i32,
    pub min_delay: f64,
    pub max_delay: f64,
}

impl Default for RuleParameters {
    fn default() -> Self {
        Self {
            under_population: 2,
            over_population: 3,
            revival_population: 3,
            min_delay: 0.1,
            max_delay: 0.2,
        }
    }
}

// ============================================================================
// TILES
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TileState {
    #[default]
    Idle,
    Hover,
    Descend,
}

/// Opaque handle minted by the host's tile factory for one visual tile.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileHandle(pub u64);

// ============================================================================
// SIMULATION STATUS
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Initial board is being revealed tile by tile.
    Loading,
    /// Automaton, difficulty timer and player input are live.
    Running,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

/// The two one-shot player abilities.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ability {
    /// Ability 1: a dead tile reaching hover revives itself.
    Revive,
    /// Ability 2: an alive tile reaching hover lifts every dead neighbor.
    Surround,
}

impl TryFrom<u8> for Ability {
    type Error = crate::LifeError;

    fn try_from(which: u8) -> Result<Self, Self::Error> {
        match which {
            1 => Ok(Ability::Revive),
            2 => Ok(Ability::Surround),
            other => Err(crate::LifeError::UnknownAbility(other)),
        }
    }
}
