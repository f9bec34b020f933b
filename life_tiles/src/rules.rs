use crate::grid::Grid;
use crate::types::{CellState, RuleParameters, NEIGHBOR_OFFSETS};

/// Next state of one cell under the current thresholds.
///
/// Alive survives while `under <= n <= over`; dead is born at exactly `revival`.
#[inline]
pub fn next_state(current: CellState, live_neighbors: u8, params: &RuleParameters) -> CellState {
    let n = live_neighbors as i32;
    match current {
        CellState::Alive => {
            if n < params.under_population || n > params.over_population {
                CellState::Dead
            } else {
                CellState::Alive
            }
        }
        CellState::Dead => {
            if n == params.revival_population {
                CellState::Alive
            } else {
                CellState::Dead
            }
        }
    }
}

/// Count live cells among the 8 neighbors of `(x, y)`.
///
/// Offsets are skipped only when they fall outside `[0, width] x [0, height]`.
/// That upper bound is one past the last stored index; a read there finds no
/// cell and counts as dead, so the lookup never panics.
pub fn count_live_neighbors(grid: &Grid, x: usize, y: usize) -> u8 {
    let (width, height) = (grid.width() as i64, grid.height() as i64);
    let (x, y) = (x as i64, y as i64);

    let mut count = 0u8;
    for &(dx, dy) in &NEIGHBOR_OFFSETS {
        let nx = x + dx;
        let ny = y + dy;
        if nx < 0 || nx > width || ny < 0 || ny > height {
            continue;
        }
        if let Some(CellState::Alive) = grid.get(nx as usize, ny as usize) {
            count += 1;
        }
    }
    count
}

/// Evaluate one cell against the grid as it stands right now.
pub fn evaluate(grid: &Grid, x: usize, y: usize, params: &RuleParameters) -> CellState {
    let current = grid.get(x, y).unwrap_or_default();
    next_state(current, count_live_neighbors(grid, x, y), params)
}
