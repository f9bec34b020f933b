use rand::Rng;
use tracing::debug;

use crate::grid::Grid;
use crate::rules;
use crate::types::{CellState, RuleParameters};

/// Cap on how far one `advance` call catches up, in full sweeps.
/// Whatever is left stays due and runs on the next call.
pub const MAX_CATCHUP_SWEEPS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepState {
    Idle,
    Sweeping,
}

/// A cell whose state changed during a sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellFlip {
    pub x: usize,
    pub y: usize,
    pub state: CellState,
}

/// What one `advance` call did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Every evaluated cell, in processing order.
    pub visited: Vec<(usize, usize)>,
    pub flips: Vec<CellFlip>,
    pub completed_sweeps: u32,
}

impl SweepReport {
    pub(crate) fn append(&mut self, mut later: SweepReport) {
        self.visited.append(&mut later.visited);
        self.flips.append(&mut later.flips);
        self.completed_sweeps += later.completed_sweeps;
    }
}

/// Walks the interior one cell at a time, waiting a random delay from the
/// current rule parameters between cells.
///
/// Cells are written in place as they are visited, so a cell sees this sweep's
/// result for neighbors already visited and last sweep's for the rest.
#[derive(Clone, Debug)]
pub struct AutomatonScheduler {
    state: SweepState,
    requested: bool,
    cursor: usize,
    next_eligible: f64,
    generation: u64,
}

impl Default for AutomatonScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl AutomatonScheduler {
    pub fn new() -> Self {
        AutomatonScheduler {
            state: SweepState::Idle,
            requested: false,
            cursor: 0,
            next_eligible: 0.0,
            generation: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> SweepState {
        self.state
    }

    /// Completed sweeps so far.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn next_eligible(&self) -> f64 {
        self.next_eligible
    }

    /// Arm the first sweep; its first cell is due at `now`.
    pub fn start(&mut self, now: f64) {
        self.next_eligible = now;
        self.requested = true;
    }

    /// Ask for a sweep. Refused while one is already in flight.
    pub fn request_sweep(&mut self) -> bool {
        if self.state == SweepState::Sweeping {
            return false;
        }
        self.requested = true;
        true
    }

    fn begin_sweep(&mut self) {
        self.state = SweepState::Sweeping;
        self.requested = false;
        self.cursor = 0;
    }

    /// Process every cell whose delay has elapsed by `now`.
    pub fn advance<R: Rng>(
        &mut self,
        now: f64,
        grid: &mut Grid,
        params: &RuleParameters,
        rng: &mut R,
    ) -> SweepReport {
        let mut report = SweepReport::default();
        let budget = MAX_CATCHUP_SWEEPS * grid.interior_len();

        while report.visited.len() < budget {
            if self.state == SweepState::Idle {
                if !self.requested {
                    break;
                }
                self.begin_sweep();
            }
            if now < self.next_eligible {
                break;
            }

            let (x, y) = grid.interior_cell(self.cursor);
            if let Some(flip) = self.process_cell(grid, x, y, params) {
                report.flips.push(flip);
            }
            report.visited.push((x, y));

            self.next_eligible += draw_delay(params, rng);
            self.cursor += 1;

            if self.cursor == grid.interior_len() {
                self.generation += 1;
                report.completed_sweeps += 1;
                // Next generation follows straight on, no idle gap
                self.state = SweepState::Idle;
                self.requested = true;
                debug!(generation = self.generation, "sweep complete");
            }
        }
        report
    }

    fn process_cell(
        &self,
        grid: &mut Grid,
        x: usize,
        y: usize,
        params: &RuleParameters,
    ) -> Option<CellFlip> {
        let current = grid.get(x, y)?;
        let next = rules::evaluate(grid, x, y, params);
        if next == current {
            return None;
        }
        grid.set(x, y, next);
        Some(CellFlip { x, y, state: next })
    }
}

/// Uniform draw from `[min_delay, max_delay]`.
pub fn draw_delay<R: Rng>(params: &RuleParameters, rng: &mut R) -> f64 {
    if params.max_delay <= params.min_delay {
        return params.min_delay;
    }
    rng.gen_range(params.min_delay..=params.max_delay)
}
