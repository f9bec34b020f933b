use std::collections::VecDeque;

use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::types::RuleParameters;

/// Cap on level-ups plus settlements fired by one `advance` call. Anything
/// later stays due for the next call.
pub const MAX_CATCHUP_EVENTS: usize = 128;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DifficultyEvent {
    /// Level counter went up; the display should announce it.
    LevelChanged(u32),
    /// The level's rule tightening was applied.
    LevelSettled(u32),
}

/// Periodic difficulty ramp.
///
/// Every `period` the level goes up by one. `settle_delay` later the delay
/// range shrinks by `divisor`, every `revival_every`-th level raises the
/// revival count and every `band_every`-th level narrows the survival band.
/// Nothing is clamped.
#[derive(Clone, Debug)]
pub struct DifficultyController {
    level_count: u32,
    running: bool,
    next_level_at: f64,
    pending: VecDeque<(f64, u32)>,
    period: f64,
    settle_delay: f64,
    divisor: f64,
    revival_every: u32,
    band_every: u32,
}

impl DifficultyController {
    pub fn new(config: &SimulationConfig) -> Self {
        DifficultyController {
            level_count: 0,
            running: false,
            next_level_at: 0.0,
            pending: VecDeque::new(),
            period: config.level_period,
            settle_delay: config.level_settle_delay,
            divisor: config.delay_divisor,
            revival_every: config.revival_step_every,
            band_every: config.band_step_every,
        }
    }

    #[inline]
    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start the timer. The first level-up is due immediately.
    pub fn start(&mut self, now: f64) {
        if self.running {
            return;
        }
        self.running = true;
        self.next_level_at = now;
    }

    /// When the next level-up or settlement is due, if the timer runs.
    pub fn next_due(&self) -> Option<f64> {
        if !self.running {
            return None;
        }
        let due = match self.pending.front() {
            Some(&(settle_at, _)) => settle_at.min(self.next_level_at),
            None => self.next_level_at,
        };
        Some(due)
    }

    /// Fire the level-ups and settlements due by `now`, oldest first, at most
    /// [`MAX_CATCHUP_EVENTS`] of them.
    pub fn advance(&mut self, now: f64, params: &mut RuleParameters) -> Vec<DifficultyEvent> {
        let mut events = Vec::new();
        if !self.running {
            return events;
        }

        while events.len() < MAX_CATCHUP_EVENTS {
            let settle_due = self.pending.front().map(|&(due, _)| due);
            match settle_due {
                Some(due) if due <= now && due <= self.next_level_at => {
                    if let Some((_, level)) = self.pending.pop_front() {
                        self.settle(level, params);
                        events.push(DifficultyEvent::LevelSettled(level));
                    }
                }
                _ if self.next_level_at <= now => {
                    let fired_at = self.next_level_at;
                    self.level_count += 1;
                    self.pending.push_back((fired_at + self.settle_delay, self.level_count));
                    self.next_level_at += self.period;
                    info!(level = self.level_count, "level up");
                    events.push(DifficultyEvent::LevelChanged(self.level_count));
                }
                _ => break,
            }
        }
        events
    }

    fn settle(&self, level: u32, params: &mut RuleParameters) {
        params.min_delay /= self.divisor;
        params.max_delay /= self.divisor;

        if level != 0 && level % self.revival_every == 0 {
            params.revival_population += 1;
        }
        if level != 0 && level % self.band_every == 0 {
            params.under_population += 1;
            params.over_population -= 1;
        }

        debug!(
            level,
            under = params.under_population,
            over = params.over_population,
            revival = params.revival_population,
            min_delay = params.min_delay,
            max_delay = params.max_delay,
            "level settled"
        );
    }
}
