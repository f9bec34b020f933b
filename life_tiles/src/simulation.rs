use arrayvec::ArrayVec;
use glam::Vec3;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::abilities::AbilityGate;
use crate::config::SimulationConfig;
use crate::difficulty::{DifficultyController, DifficultyEvent, MAX_CATCHUP_EVENTS};
use crate::grid::Grid;
use crate::ports::Ports;
use crate::scheduler::{AutomatonScheduler, SweepReport};
use crate::scoreboard::Scoreboard;
use crate::seed;
use crate::tiles::{resting_position, Tile, TileArena, TileId};
use crate::types::{
    Ability, CellState, Outcome, Phase, RuleParameters, TileState, NEIGHBOR_OFFSETS,
};
use crate::LifeError;

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Full board state for a host display.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct BoardSnapshot {
    /// x-major flat array, border included.
    pub cells: Vec<bool>,
    pub width: u32,
    pub height: u32,
    pub generation: u64,
    pub level: u32,
    pub phase: Phase,
    pub rules: RuleParameters,
    pub score: Scoreboard,
    pub outcome: Option<Outcome>,
    pub clock: f64,
}

impl BoardSnapshot {
    pub fn to_json(&self) -> Result<String, LifeError> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// SIMULATION
// ============================================================================

/// One board and everything that drives it. The host owns this value and
/// calls [`Simulation::advance`] from its own loop.
pub struct Simulation {
    config: SimulationConfig,
    grid: Grid,
    arena: TileArena,
    rules: RuleParameters,
    scheduler: AutomatonScheduler,
    difficulty: DifficultyController,
    abilities: AbilityGate,
    phase: Phase,
    start_requested: bool,
    reveal_cursor: usize,
    next_reveal_at: f64,
    clock: f64,
    outcome: Option<Outcome>,
    rng: ChaCha8Rng,
    ports: Ports,
}

impl Simulation {
    /// Build the board from `config` and seed its interior with `seed_fn`.
    pub fn new<F>(config: SimulationConfig, ports: Ports, seed_fn: F) -> Result<Self, LifeError>
    where
        F: FnMut(usize, usize) -> CellState,
    {
        config.validate()?;
        let grid = Grid::initialize(config.width, config.height, seed_fn)?;
        Self::with_grid(config, grid, ports)
    }

    /// Wrap an already initialized grid. Its size overrides the config's.
    pub fn with_grid(
        mut config: SimulationConfig,
        grid: Grid,
        ports: Ports,
    ) -> Result<Self, LifeError> {
        config.width = grid.width();
        config.height = grid.height();
        config.validate()?;

        let mut sim = Simulation {
            arena: TileArena::with_slots(grid.width() * grid.height()),
            rules: config.rules,
            scheduler: AutomatonScheduler::new(),
            difficulty: DifficultyController::new(&config),
            abilities: AbilityGate::default(),
            phase: Phase::Loading,
            start_requested: false,
            reveal_cursor: 0,
            next_reveal_at: 0.0,
            clock: 0.0,
            outcome: None,
            rng: seed::rng_from_option(config.seed),
            grid,
            config,
            ports,
        };
        sim.reveal_due(0.0);
        Ok(sim)
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Begin the automaton and the difficulty timer. While the board is still
    /// being revealed the start takes effect as soon as the last tile is out.
    pub fn start(&mut self) {
        if self.phase == Phase::Running {
            return;
        }
        self.start_requested = true;
        if self.reveal_complete() {
            self.begin_running(self.clock);
        }
    }

    /// Player selected the tile at `(x, y)`. Only an `Idle` tile on a running
    /// board lifts; anything else is ignored.
    pub fn request_hover(&mut self, x: usize, y: usize) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let Some(id) = self.grid.tile_at(x, y) else {
            return false;
        };
        let Some(tile) = self.arena.get_mut(id) else {
            return false;
        };
        if tile.state != TileState::Idle {
            return false;
        }
        tile.state = TileState::Hover;
        self.ports.effects.play_hover_cue();
        true
    }

    /// Arm ability 1 (revive) or 2 (surround).
    pub fn set_ability_flag(&mut self, which: u8) -> Result<(), LifeError> {
        let ability = Ability::try_from(which)?;
        self.arm_ability(ability);
        Ok(())
    }

    pub fn arm_ability(&mut self, ability: Ability) {
        debug!(?ability, "ability armed");
        self.abilities.arm(ability);
    }

    /// Move simulated time forward by `delta_time` and run everything due.
    /// Negative or non-finite deltas count as zero.
    pub fn advance(&mut self, delta_time: f64) -> SweepReport {
        let delta_time = if delta_time.is_finite() { delta_time.max(0.0) } else { 0.0 };
        self.clock += delta_time;
        let now = self.clock;

        if self.phase == Phase::Loading {
            self.reveal_due(now);
        }

        let mut report = SweepReport::default();
        if self.phase == Phase::Running {
            report = self.run_until(now);
        }

        self.drive_tiles(delta_time);

        if self.phase == Phase::Running {
            self.check_outcome();
        }
        report
    }

    /// Ask the scheduler for another sweep. Refused while one is in flight.
    pub fn request_sweep(&mut self) -> bool {
        self.phase == Phase::Running && self.scheduler.request_sweep()
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn cell(&self, x: usize, y: usize) -> Option<CellState> {
        self.grid.get(x, y)
    }

    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        self.grid.tile_at(x, y).and_then(|id| self.arena.get(id))
    }

    pub fn tile_state(&self, x: usize, y: usize) -> Option<TileState> {
        self.tile(x, y).map(|t| t.state)
    }

    /// Host-side override of a tile's drawn position (drag, snap, tests).
    pub fn set_tile_position(&mut self, x: usize, y: usize, position: Vec3) -> bool {
        match self.grid.tile_at(x, y).and_then(|id| self.arena.get_mut(id)) {
            Some(tile) => {
                tile.position = position;
                true
            }
            None => false,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rules(&self) -> &RuleParameters {
        &self.rules
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn level_count(&self) -> u32 {
        self.difficulty.level_count()
    }

    pub fn generation(&self) -> u64 {
        self.scheduler.generation()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_ability_armed(&self, ability: Ability) -> bool {
        self.abilities.is_armed(ability)
    }

    pub fn tile_count(&self) -> usize {
        self.arena.len()
    }

    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard::tally(&self.grid)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            cells: self.grid.to_flags(),
            width: self.grid.width() as u32,
            height: self.grid.height() as u32,
            generation: self.scheduler.generation(),
            level: self.difficulty.level_count(),
            phase: self.phase,
            rules: self.rules,
            score: self.scoreboard(),
            outcome: self.outcome,
            clock: self.clock,
        }
    }

    // ------------------------------------------------------------------------
    // Phases
    // ------------------------------------------------------------------------

    fn reveal_complete(&self) -> bool {
        self.reveal_cursor >= self.grid.interior_len()
    }

    /// Spawn the tiles whose reveal time has come.
    fn reveal_due(&mut self, now: f64) {
        while !self.reveal_complete() && self.next_reveal_at <= now {
            let (x, y) = self.grid.interior_cell(self.reveal_cursor);
            let kind = self.grid.get(x, y).unwrap_or_default();
            self.swap_tile(x, y, kind, TileState::Idle, resting_position(x, y));
            self.reveal_cursor += 1;
            self.next_reveal_at += self.config.spawn_interval;
        }

        if self.reveal_complete() && self.start_requested && self.phase == Phase::Loading {
            info!(tiles = self.arena.len(), "board revealed");
            self.begin_running(now);
        }
    }

    fn begin_running(&mut self, now: f64) {
        self.phase = Phase::Running;
        self.scheduler.start(now);
        self.difficulty.start(now);
        info!(
            width = self.grid.width(),
            height = self.grid.height(),
            "simulation started"
        );
    }

    /// Run the automaton and the difficulty timer up to `now`, in time order:
    /// cells due before a settlement are processed under the old rules.
    fn run_until(&mut self, now: f64) -> SweepReport {
        let mut report = SweepReport::default();
        let mut fired = 0;

        loop {
            let due = self.difficulty.next_due().filter(|&at| at <= now);
            if due.is_some() && fired >= MAX_CATCHUP_EVENTS {
                // Leave the rest, automaton included, for the next call
                break;
            }

            let until = due.unwrap_or(now);
            let step = self
                .scheduler
                .advance(until, &mut self.grid, &self.rules, &mut self.rng);
            for flip in &step.flips {
                let rest = resting_position(flip.x, flip.y);
                self.swap_tile(flip.x, flip.y, flip.state, TileState::Idle, rest);
            }
            report.append(step);

            match due {
                Some(at) => fired += self.advance_difficulty(at),
                None => break,
            }
        }
        report
    }

    fn advance_difficulty(&mut self, now: f64) -> usize {
        let events = self.difficulty.advance(now, &mut self.rules);
        let fired = events.len();
        for event in events {
            match event {
                DifficultyEvent::LevelChanged(level) => {
                    self.ports.display.on_level_changed(level);
                }
                DifficultyEvent::LevelSettled(level) => {
                    self.ports.display.on_level_settled(level, &self.rules);
                }
            }
        }
        fired
    }

    fn check_outcome(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        let score = self.scoreboard();
        if let Some(outcome) =
            score.outcome(self.config.win_alive_percent, self.config.lose_dead_percent)
        {
            info!(?outcome, alive = score.alive, dead = score.dead, "outcome reached");
            self.outcome = Some(outcome);
            self.ports.display.on_outcome(outcome);
        }
    }

    // ------------------------------------------------------------------------
    // Tile lifecycle
    // ------------------------------------------------------------------------

    /// Destroy whatever represents `(x, y)` and install a fresh tile.
    fn swap_tile(
        &mut self,
        x: usize,
        y: usize,
        kind: CellState,
        state: TileState,
        position: Vec3,
    ) -> Option<TileId> {
        if !self.grid.is_interior(x, y) {
            return None;
        }
        if let Some(old) = self.grid.tile_at(x, y).and_then(|id| self.arena.get(id)) {
            self.ports.tiles.destroy(old.handle);
        }
        let handle = self.ports.tiles.spawn(kind, position);

        let mut tile = Tile::new(kind, x, y, self.config.hover_offset, handle);
        tile.state = state;
        tile.position = position;

        let (id, _) = self.arena.replace(self.grid.idx(x, y), tile);
        self.grid.set_tile(x, y, id);
        Some(id)
    }

    /// One tick for every tile: hover-reached check (running only), then easing.
    fn drive_tiles(&mut self, delta_time: f64) {
        let rate = self.config.ease_rate;
        let rest_epsilon = self.config.rest_epsilon;

        for id in self.arena.ids() {
            let id = if self.phase == Phase::Running {
                self.resolve_hover_reached(id)
            } else {
                id
            };
            if let Some(tile) = self.arena.get_mut(id) {
                tile.ease(delta_time, rate, rest_epsilon);
            }
        }
    }

    /// Force a tile at its hover target into `Descend` and fire the kind's
    /// special transition. Returns the id now occupying the slot.
    fn resolve_hover_reached(&mut self, id: TileId) -> TileId {
        let epsilon = self.config.hover_epsilon;
        let Some(tile) = self.arena.get_mut(id) else {
            return id;
        };
        if !tile.reached_hover(epsilon) {
            return id;
        }

        let was_hovering = tile.state == TileState::Hover;
        tile.state = TileState::Descend;
        let (kind, x, y, lifted) = (tile.kind, tile.x, tile.y, tile.revive_on_arrival);
        if was_hovering {
            self.ports.effects.play_descend_cue();
        }

        match kind {
            CellState::Dead => {
                if lifted || self.abilities.consume(Ability::Revive) {
                    return self.replace(id).unwrap_or(id);
                }
            }
            CellState::Alive => {
                if self.abilities.consume(Ability::Surround) {
                    self.surround(x, y);
                }
            }
        }
        id
    }

    /// Dead tile becomes alive in place and keeps descending from where it is.
    fn replace(&mut self, id: TileId) -> Option<TileId> {
        let (x, y, position) = {
            let tile = self.arena.get(id)?;
            (tile.x, tile.y, tile.position)
        };
        self.grid.set(x, y, CellState::Alive);
        let new_id = self.swap_tile(x, y, CellState::Alive, TileState::Descend, position)?;
        self.ports.effects.play_replace_cue();
        trace!(x, y, "tile revived");
        Some(new_id)
    }

    /// Lift every dead interior neighbor of `(x, y)` into `Hover`; each one
    /// revives when it gets there.
    fn surround(&mut self, x: usize, y: usize) {
        let mut lifted: ArrayVec<(usize, usize), 8> = ArrayVec::new();

        for &(dx, dy) in &NEIGHBOR_OFFSETS {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            if !self.grid.is_interior(nx, ny) || self.grid.get(nx, ny) != Some(CellState::Dead) {
                continue;
            }
            let Some(tile) = self.grid.tile_at(nx, ny).and_then(|id| self.arena.get_mut(id)) else {
                continue;
            };
            tile.state = TileState::Hover;
            tile.revive_on_arrival = true;
            lifted.push((nx, ny));
        }

        for _ in &lifted {
            self.ports.effects.play_hover_cue();
        }
        self.ports
            .effects
            .shake_view(self.config.shake_intensity, self.config.shake_duration);
        debug!(x, y, lifted = lifted.len(), "surround");
    }
}
