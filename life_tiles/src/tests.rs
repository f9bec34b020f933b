//! Unit tests for the tile-life core
//!
//! Covers the rule table, literal neighbor bounds, in-place sweep ordering,
//! tile easing, the difficulty ramp and configuration loading.

use super::*;
use crate::abilities::AbilityGate;
use crate::difficulty::{DifficultyController, DifficultyEvent, MAX_CATCHUP_EVENTS};
use crate::rules::{count_live_neighbors, next_state};
use crate::scheduler::{AutomatonScheduler, SweepState};
use crate::scoreboard::Scoreboard;
use crate::tiles::{Tile, TileArena};
use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn fixed_delay(delay: f64) -> RuleParameters {
    RuleParameters {
        min_delay: delay,
        max_delay: delay,
        ..RuleParameters::default()
    }
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

// ============================================================================
// RULE ENGINE
// ============================================================================

#[test]
fn test_classic_rule_table_under_default_thresholds() {
    let params = RuleParameters::default();
    for n in 0..=8u8 {
        let survives = next_state(CellState::Alive, n, &params) == CellState::Alive;
        assert_eq!(survives, n == 2 || n == 3, "alive cell with {} neighbors", n);

        let born = next_state(CellState::Dead, n, &params) == CellState::Alive;
        assert_eq!(born, n == 3, "dead cell with {} neighbors", n);
    }
}

#[test]
fn test_rule_follows_tightened_thresholds() {
    let params = RuleParameters {
        under_population: 3,
        over_population: 2,
        revival_population: 4,
        ..RuleParameters::default()
    };
    // Band crossed over: nothing survives
    for n in 0..=8u8 {
        assert_eq!(next_state(CellState::Alive, n, &params), CellState::Dead);
    }
    assert_eq!(next_state(CellState::Dead, 3, &params), CellState::Dead);
    assert_eq!(next_state(CellState::Dead, 4, &params), CellState::Alive);
}

#[test]
fn test_neighbor_count_center() {
    let grid = Grid::initialize(5, 5, seed::from_pattern(&[(1, 1), (1, 2), (3, 3), (2, 2)])).unwrap();
    assert_eq!(count_live_neighbors(&grid, 2, 2), 3);
    assert_eq!(count_live_neighbors(&grid, 1, 1), 2);
}

#[test]
fn test_neighbor_count_tolerates_one_past_the_edge() {
    let grid = Grid::initialize(4, 4, |_, _| CellState::Alive).unwrap();
    // Bottom-right corner probes index 4 on both axes; those reads find nothing
    assert_eq!(count_live_neighbors(&grid, 3, 3), 1);
    assert_eq!(count_live_neighbors(&grid, 0, 0), 1);
    assert_eq!(count_live_neighbors(&grid, 2, 2), 3);
}

#[test]
fn test_neighbor_count_smallest_board() {
    let grid = Grid::initialize(3, 3, |_, _| CellState::Alive).unwrap();
    assert_eq!(grid.get(1, 1), Some(CellState::Alive));
    assert_eq!(count_live_neighbors(&grid, 1, 1), 0, "border ring is always dead");
}

// ============================================================================
// GRID
// ============================================================================

#[test]
fn test_grid_rejects_boards_without_interior() {
    for (w, h) in [(2, 10), (10, 2), (0, 0), (1, 3)] {
        match Grid::initialize(w, h, seed::all_dead) {
            Err(LifeError::InvalidGridSize { width, height }) => {
                assert_eq!((width, height), (w, h));
            }
            other => panic!("expected InvalidGridSize for {}x{}, got {:?}", w, h, other.map(|_| ())),
        }
    }
    assert!(initialize_grid(3, 3, seed::all_dead).is_ok());
}

#[test]
fn test_grid_seeds_interior_only() {
    let mut calls = Vec::new();
    let grid = Grid::initialize(5, 4, |x, y| {
        calls.push((x, y));
        CellState::Alive
    })
    .unwrap();

    assert_eq!(calls.len(), 3 * 2);
    assert!(calls.iter().all(|&(x, y)| grid.is_interior(x, y)));
    assert_eq!(grid.get(0, 0), Some(CellState::Dead));
    assert_eq!(grid.get(4, 3), Some(CellState::Dead));
    assert_eq!(grid.get(5, 0), None);
    assert_eq!(grid.population(), (6, 0));
}

#[test]
fn test_grid_border_writes_are_dropped() {
    let mut grid = Grid::initialize(5, 5, seed::all_dead).unwrap();
    assert!(!grid.set(0, 2, CellState::Alive));
    assert!(!grid.set(4, 4, CellState::Alive));
    assert!(grid.set(3, 3, CellState::Alive));
    assert_eq!(grid.population(), (1, 8));
}

#[test]
fn test_interior_order_is_x_major() {
    let grid = Grid::initialize(4, 5, seed::all_dead).unwrap();
    let order: Vec<_> = grid.interior().collect();
    assert_eq!(order, vec![(1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 3)]);
    for (n, cell) in order.iter().enumerate() {
        assert_eq!(grid.interior_cell(n), *cell);
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

#[test]
fn test_empty_board_sweep_is_idempotent() {
    let mut grid = Grid::initialize(10, 10, seed::all_dead).unwrap();
    let mut scheduler = AutomatonScheduler::new();
    scheduler.start(0.0);

    let report = scheduler.advance(63.0, &mut grid, &fixed_delay(1.0), &mut rng());
    assert_eq!(report.completed_sweeps, 1);
    assert_eq!(report.visited.len(), 64);
    assert!(report.flips.is_empty());
    assert_eq!(grid.population(), (0, 64));
}

#[test]
fn test_lone_cell_dies_and_nothing_is_born() {
    let mut grid = Grid::initialize(10, 10, seed::from_pattern(&[(5, 5)])).unwrap();
    let mut scheduler = AutomatonScheduler::new();
    scheduler.start(0.0);

    let report = scheduler.advance(63.0, &mut grid, &fixed_delay(1.0), &mut rng());
    assert_eq!(scheduler.generation(), 1);
    assert_eq!(grid.get(5, 5), Some(CellState::Dead));
    assert_eq!(report.flips.len(), 1);
    assert_eq!(grid.population().0, 0);
}

#[test]
fn test_one_cell_per_delay_interval() {
    let mut grid = Grid::initialize(6, 6, seed::all_dead).unwrap();
    let mut scheduler = AutomatonScheduler::new();
    let params = fixed_delay(0.5);
    let mut rng = rng();
    scheduler.start(0.0);

    assert_eq!(scheduler.advance(0.0, &mut grid, &params, &mut rng).visited, vec![(1, 1)]);
    assert!(scheduler.advance(0.49, &mut grid, &params, &mut rng).visited.is_empty());
    assert_eq!(scheduler.advance(0.5, &mut grid, &params, &mut rng).visited, vec![(1, 2)]);
    assert_eq!(scheduler.advance(2.0, &mut grid, &params, &mut rng).visited, vec![(1, 3), (1, 4), (2, 1)]);
    assert_eq!(scheduler.state(), SweepState::Sweeping);
}

#[test]
fn test_sweep_reads_already_visited_cells_in_place() {
    // Vertical blinker on x = 2
    let mut grid = Grid::initialize(5, 5, seed::from_pattern(&[(2, 1), (2, 2), (2, 3)])).unwrap();
    let mut scheduler = AutomatonScheduler::new();
    let params = fixed_delay(1.0);
    let mut rng = rng();
    scheduler.start(0.0);

    let report = scheduler.advance(1.0, &mut grid, &params, &mut rng);
    assert_eq!(report.visited, vec![(1, 1), (1, 2)]);
    assert_eq!(grid.get(1, 2), Some(CellState::Alive), "(1,2) has 3 live neighbors");

    // (1,3) sees the freshly born (1,2) and so has 3 neighbors, not 2
    assert_eq!(count_live_neighbors(&grid, 1, 3), 3);
    scheduler.advance(2.0, &mut grid, &params, &mut rng);
    assert_eq!(grid.get(1, 3), Some(CellState::Alive));
}

#[test]
fn test_next_sweep_follows_without_gap() {
    let mut grid = Grid::initialize(4, 4, seed::all_dead).unwrap();
    let mut scheduler = AutomatonScheduler::new();
    scheduler.start(0.0);

    let report = scheduler.advance(5.0, &mut grid, &fixed_delay(1.0), &mut rng());
    // 4 interior cells per sweep, cells due at 0..=5
    assert_eq!(report.visited.len(), 6);
    assert_eq!(report.completed_sweeps, 1);
    assert_eq!(report.visited[4], (1, 1));
    assert_eq!(scheduler.state(), SweepState::Sweeping);
}

#[test]
fn test_sweep_request_refused_while_in_flight() {
    let mut grid = Grid::initialize(6, 6, seed::all_dead).unwrap();
    let mut scheduler = AutomatonScheduler::new();
    assert!(scheduler.request_sweep());
    scheduler.advance(0.0, &mut grid, &fixed_delay(1.0), &mut rng());
    assert_eq!(scheduler.state(), SweepState::Sweeping);
    assert!(!scheduler.request_sweep());
}

#[test]
fn test_catch_up_is_bounded() {
    let mut grid = Grid::initialize(4, 4, seed::all_dead).unwrap();
    let mut scheduler = AutomatonScheduler::new();
    scheduler.start(0.0);

    let report = scheduler.advance(10_000.0, &mut grid, &fixed_delay(0.1), &mut rng());
    assert_eq!(report.visited.len(), scheduler::MAX_CATCHUP_SWEEPS * 4);
    assert!(scheduler.next_eligible() < 10_000.0);
}

#[test]
fn test_random_delay_stays_in_range() {
    let params = RuleParameters::default();
    let mut rng = rng();
    for _ in 0..1000 {
        let d = scheduler::draw_delay(&params, &mut rng);
        assert!((params.min_delay..=params.max_delay).contains(&d), "delay {} out of range", d);
    }
}

// ============================================================================
// TILES
// ============================================================================

#[test]
fn test_arena_replace_bumps_generation() {
    let mut arena = TileArena::with_slots(4);
    let first = Tile::new(CellState::Dead, 1, 1, Vec3::new(0.0, 0.0, -2.0), TileHandle(1));
    let (id1, prev) = arena.replace(3, first);
    assert!(prev.is_none());

    let second = Tile::new(CellState::Alive, 1, 1, Vec3::new(0.0, 0.0, -2.0), TileHandle(2));
    let (id2, prev) = arena.replace(3, second);
    assert_eq!(prev.map(|t| t.handle), Some(TileHandle(1)));
    assert_eq!(id1.index(), id2.index());
    assert_ne!(id1.generation(), id2.generation());

    assert!(arena.get(id1).is_none(), "stale id must not resolve");
    assert_eq!(arena.get(id2).map(|t| t.kind), Some(CellState::Alive));
    assert_eq!(arena.len(), 1);
}

#[test]
fn test_tile_hover_then_descend_settles_idle() {
    let mut tile = Tile::new(CellState::Alive, 3, 4, Vec3::new(0.0, 0.0, -2.0), TileHandle(7));
    assert_eq!(tile.hover_target, Vec3::new(3.0, 4.0, -2.0));

    tile.state = TileState::Hover;
    let mut ticks = 0;
    while !tile.reached_hover(0.1) {
        tile.ease(1.0 / 60.0, 7.0, 0.001);
        ticks += 1;
        assert!(ticks < 1000, "hover never converged");
    }

    tile.state = TileState::Descend;
    let mut settled = false;
    for _ in 0..2000 {
        if tile.ease(1.0 / 60.0, 7.0, 0.001) {
            settled = true;
            break;
        }
    }
    assert!(settled);
    assert_eq!(tile.state, TileState::Idle);
    assert!(tile.position.distance(tile.original_position) < 0.001);
}

#[test]
fn test_tile_ease_clamps_large_steps() {
    let mut tile = Tile::new(CellState::Dead, 1, 1, Vec3::new(0.0, 0.0, -2.0), TileHandle(1));
    tile.state = TileState::Hover;
    tile.ease(10.0, 7.0, 0.001);
    assert_eq!(tile.position, tile.hover_target, "one huge step lands on target, no overshoot");
}

#[test]
fn test_idle_tile_does_not_move() {
    let mut tile = Tile::new(CellState::Dead, 2, 2, Vec3::new(0.0, 0.0, -2.0), TileHandle(1));
    assert!(!tile.ease(0.5, 7.0, 0.001));
    assert_eq!(tile.position, tile.original_position);
}

// ============================================================================
// ABILITIES
// ============================================================================

#[test]
fn test_ability_consumed_exactly_once() {
    let mut gate = AbilityGate::default();
    assert!(!gate.consume(Ability::Revive));

    gate.arm(Ability::Revive);
    gate.arm(Ability::Revive);
    assert!(gate.is_armed(Ability::Revive));
    assert!(!gate.is_armed(Ability::Surround));
    assert!(gate.consume(Ability::Revive));
    assert!(!gate.consume(Ability::Revive));
}

#[test]
fn test_ability_selector() {
    assert_eq!(Ability::try_from(1).unwrap(), Ability::Revive);
    assert_eq!(Ability::try_from(2).unwrap(), Ability::Surround);
    assert!(matches!(Ability::try_from(3), Err(LifeError::UnknownAbility(3))));
}

// ============================================================================
// DIFFICULTY
// ============================================================================

fn run_levels(levels: u32) -> (DifficultyController, RuleParameters) {
    let config = SimulationConfig::default();
    let mut controller = DifficultyController::new(&config);
    let mut params = config.rules;
    controller.start(0.0);
    // Level-ups at 0, 20, 40, ...; each settles 2 later
    let last = (levels - 1) as f64 * config.level_period + config.level_settle_delay;
    controller.advance(last + 1.0, &mut params);
    (controller, params)
}

#[test]
fn test_first_level_fires_at_start() {
    let config = SimulationConfig::default();
    let mut controller = DifficultyController::new(&config);
    let mut params = config.rules;
    assert!(controller.advance(100.0, &mut params).is_empty(), "not started yet");

    controller.start(0.0);
    let events = controller.advance(0.0, &mut params);
    assert_eq!(events, vec![DifficultyEvent::LevelChanged(1)]);
    assert_eq!(params, config.rules, "tightening waits for the settle delay");

    let events = controller.advance(2.0, &mut params);
    assert_eq!(events, vec![DifficultyEvent::LevelSettled(1)]);
    assert!((params.min_delay - 0.1 / 1.5).abs() < 1e-12);
    assert!((params.max_delay - 0.2 / 1.5).abs() < 1e-12);
}

#[test]
fn test_five_levels_raise_revival_only() {
    let (controller, params) = run_levels(5);
    let start = RuleParameters::default();
    assert_eq!(controller.level_count(), 5);
    assert_eq!(params.revival_population, start.revival_population + 1);
    assert_eq!(params.under_population, start.under_population);
    assert_eq!(params.over_population, start.over_population);
}

#[test]
fn test_eight_levels_narrow_survival_band() {
    let (controller, params) = run_levels(8);
    let start = RuleParameters::default();
    assert_eq!(controller.level_count(), 8);
    assert_eq!(params.under_population, start.under_population + 1);
    assert_eq!(params.over_population, start.over_population - 1);
    assert_eq!(params.revival_population, start.revival_population + 1);
    let expected_min = start.min_delay / 1.5f64.powi(8);
    assert!((params.min_delay - expected_min).abs() < 1e-12);
}

#[test]
fn test_thresholds_are_not_clamped() {
    let (_, params) = run_levels(40);
    // Five band steps: under 2 -> 7, over 3 -> -2
    assert_eq!(params.under_population, 7);
    assert_eq!(params.over_population, -2);
    assert_eq!(params.revival_population, 3 + 8);
    assert!(params.min_delay > 0.0);
}

#[test]
fn test_events_are_chronological() {
    let config = SimulationConfig::default();
    let mut controller = DifficultyController::new(&config);
    let mut params = config.rules;
    controller.start(0.0);
    let events = controller.advance(41.0, &mut params);
    assert_eq!(
        events,
        vec![
            DifficultyEvent::LevelChanged(1),
            DifficultyEvent::LevelSettled(1),
            DifficultyEvent::LevelChanged(2),
            DifficultyEvent::LevelSettled(2),
            DifficultyEvent::LevelChanged(3),
        ]
    );
}

#[test]
fn test_next_due_tracks_earliest_event() {
    let config = SimulationConfig::default();
    let mut controller = DifficultyController::new(&config);
    let mut params = config.rules;
    assert_eq!(controller.next_due(), None);

    controller.start(0.0);
    assert_eq!(controller.next_due(), Some(0.0));
    controller.advance(0.0, &mut params);
    assert_eq!(controller.next_due(), Some(2.0));
    controller.advance(2.0, &mut params);
    assert_eq!(controller.next_due(), Some(20.0));
}

#[test]
fn test_level_catch_up_is_bounded() {
    let config = SimulationConfig::default();
    let mut controller = DifficultyController::new(&config);
    let mut params = config.rules;
    controller.start(0.0);

    let events = controller.advance(2.0e8, &mut params);
    assert_eq!(events.len(), MAX_CATCHUP_EVENTS);
    assert_eq!(controller.level_count(), MAX_CATCHUP_EVENTS as u32 / 2);

    // The backlog resumes where it stopped
    let next = MAX_CATCHUP_EVENTS as u32 / 2 + 1;
    let events = controller.advance(2.0e8, &mut params);
    assert_eq!(events[0], DifficultyEvent::LevelChanged(next));
    assert_eq!(events[1], DifficultyEvent::LevelSettled(next));
}

// ============================================================================
// SCOREBOARD
// ============================================================================

#[test]
fn test_scoreboard_rounds_percentages() {
    let score = Scoreboard::from_counts(1, 2);
    assert_eq!(score.alive_percent, 33.0);
    assert_eq!(score.dead_percent, 67.0);
    assert_eq!(score.outcome(70.0, 90.0), None);
}

#[test]
fn test_scoreboard_outcomes() {
    assert_eq!(Scoreboard::from_counts(71, 29).outcome(70.0, 90.0), Some(Outcome::Won));
    assert_eq!(Scoreboard::from_counts(70, 30).outcome(70.0, 90.0), None);
    assert_eq!(Scoreboard::from_counts(9, 91).outcome(70.0, 90.0), Some(Outcome::Lost));
    assert_eq!(Scoreboard::from_counts(0, 0).outcome(70.0, 90.0), None);
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn test_partial_json_overrides_defaults() {
    let config = SimulationConfig::from_json(r#"{ "width": 16, "seed": 9, "rules": { "under_population": 2, "over_population": 3, "revival_population": 3, "min_delay": 0.05, "max_delay": 0.05 } }"#).unwrap();
    assert_eq!(config.width, 16);
    assert_eq!(config.height, 10);
    assert_eq!(config.seed, Some(9));
    assert_eq!(config.rules.min_delay, 0.05);
    assert_eq!(config.level_period, 20.0);

    let config = SimulationConfig::from_json(r#"{ "rules": { "min_delay": 0.05 } }"#).unwrap();
    assert_eq!(config.rules.min_delay, 0.05);
    assert_eq!(config.rules.max_delay, 0.2);
    assert_eq!(config.rules.under_population, 2);
    assert_eq!(config.rules.revival_population, 3);
}

#[test]
fn test_config_validation_errors() {
    assert!(matches!(
        SimulationConfig::from_json(r#"{ "width": 2 }"#),
        Err(LifeError::InvalidGridSize { width: 2, height: 10 })
    ));

    let mut config = SimulationConfig::default();
    config.rules.min_delay = 0.3;
    assert!(matches!(config.validate(), Err(LifeError::InvalidDelayRange { .. })));

    let mut config = SimulationConfig::default();
    config.delay_divisor = 1.0;
    assert!(matches!(config.validate(), Err(LifeError::InvalidConfig(_))));

    assert!(matches!(SimulationConfig::from_json("{ not json"), Err(LifeError::Json(_))));
}

// ============================================================================
// SEEDING
// ============================================================================

#[test]
fn test_phrase_seeding_is_reproducible() {
    let mut a = seed::rng_from_phrase("glider gun");
    let mut b = seed::rng_from_phrase("glider gun");
    let grid_a = Grid::initialize(12, 12, seed::uniform(&mut a)).unwrap();
    let grid_b = Grid::initialize(12, 12, seed::uniform(&mut b)).unwrap();
    assert_eq!(grid_a.to_flags(), grid_b.to_flags());

    let mut c = seed::rng_from_phrase("another phrase");
    let grid_c = Grid::initialize(12, 12, seed::uniform(&mut c)).unwrap();
    assert_ne!(grid_a.to_flags(), grid_c.to_flags());
}
