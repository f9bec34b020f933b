use serde::Serialize;

use crate::grid::Grid;
use crate::types::Outcome;

/// Alive/dead tallies over interior cells, as the score display shows them.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct Scoreboard {
    pub alive: usize,
    pub dead: usize,
    /// Rounded to whole percent.
    pub alive_percent: f64,
    pub dead_percent: f64,
}

impl Scoreboard {
    pub fn tally(grid: &Grid) -> Self {
        let (alive, dead) = grid.population();
        Scoreboard::from_counts(alive, dead)
    }

    pub fn from_counts(alive: usize, dead: usize) -> Self {
        let total = alive + dead;
        let share = |n: usize| {
            if total == 0 {
                0.0
            } else {
                (n as f64 * (100.0 / total as f64)).round()
            }
        };
        Scoreboard {
            alive,
            dead,
            alive_percent: share(alive),
            dead_percent: share(dead),
        }
    }

    /// `Won` once the alive share passes `win_above`, `Lost` once the dead
    /// share passes `lose_above`. A win is checked first.
    pub fn outcome(&self, win_above: f64, lose_above: f64) -> Option<Outcome> {
        if self.alive_percent > win_above {
            Some(Outcome::Won)
        } else if self.dead_percent > lose_above {
            Some(Outcome::Lost)
        } else {
            None
        }
    }
}
