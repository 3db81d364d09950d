use std::{sync::Arc, time::Duration};

use glam::Vec2;
use iso_dimension_core::{
    BlockStyle, CellCoord, EntityId, GridPoint, LevelGoals, PaintOrder, Rating, TileEvent,
    ViewRect,
};
use iso_dimension_system_rating::LevelClock;
use iso_dimension_system_simulation::{SimulationConfig, WorldSimulation};
use iso_dimension_world::decode_map;

const FRAME: Duration = Duration::from_millis(16);

fn simulation(rows: &[&str]) -> WorldSimulation {
    let level = decode_map(rows.iter().copied()).expect("test map should decode");
    WorldSimulation::new(
        Arc::new(level),
        SimulationConfig::default().with_settle_ticks(0),
    )
}

fn clock() -> LevelClock {
    LevelClock::new(LevelGoals::new(10.0, 6.0, 3.0).expect("valid goals"))
}

fn position_of(simulation: &WorldSimulation, row: f32, column: f32) -> Vec2 {
    let config = simulation.config();
    config
        .projection()
        .project(GridPoint::new(row, column).offset_by(config.placement_bias()))
}

fn wide_view() -> ViewRect {
    ViewRect::centered(Vec2::ZERO, Vec2::splat(100_000.0))
}

fn far_view() -> ViewRect {
    ViewRect::centered(Vec2::splat(1_000_000.0), Vec2::splat(10.0))
}

#[test]
fn actor_spawns_on_the_entry_point() {
    let mut simulation = simulation(&["XXX", "XSX", "XXF"]);
    let clock = clock();
    let spawn = simulation.spawn_position();

    assert_eq!(simulation.actor_location(), CellCoord::new(1, 1).to_point());
    let report = simulation
        .tick(spawn, FRAME, wide_view(), &clock)
        .expect("tick succeeds");
    assert_eq!(report.tile_event, None);
}

#[test]
fn standing_off_map_fails_exactly_once() {
    let mut simulation = simulation(&["SXF"]);
    let clock = clock();
    let off_map = position_of(&simulation, 3.0, 0.0);

    let first = simulation
        .tick(off_map, FRAME, wide_view(), &clock)
        .expect("tick succeeds");
    let second = simulation
        .tick(off_map, FRAME, wide_view(), &clock)
        .expect("tick succeeds");

    assert_eq!(first.tile_event, Some(TileEvent::Fail));
    assert_eq!(second.tile_event, None);
    assert!(simulation.is_finished());
    assert!(!simulation.accepts_input());
}

#[test]
fn finished_runs_ignore_further_tiles() {
    let mut simulation = simulation(&["SXF"]);
    let clock = clock();
    let off_map = position_of(&simulation, -2.0, 0.0);
    let finish = position_of(&simulation, 0.0, 2.0);

    let _ = simulation
        .tick(off_map, FRAME, wide_view(), &clock)
        .expect("tick succeeds");
    let report = simulation
        .tick(finish, FRAME, wide_view(), &clock)
        .expect("tick succeeds");

    assert_eq!(report.tile_event, None);
}

#[test]
fn hazard_markers_raise_no_event() {
    let mut simulation = simulation(&["SrgF"]);
    let clock = clock();

    for column in [1.0, 2.0] {
        let hazard = position_of(&simulation, 0.0, column);
        let report = simulation
            .tick(hazard, FRAME, wide_view(), &clock)
            .expect("tick succeeds");
        assert_eq!(report.tile_event, None);
    }
    assert!(!simulation.is_finished());
    assert!(simulation.accepts_input());
}

#[test]
fn reaching_the_finish_completes_with_the_clock_summary() {
    let mut simulation = simulation(&["SXF"]);
    let mut clock = clock();
    for _ in 0..4 {
        let _ = clock.rating_tick();
    }

    let start = simulation.spawn_position();
    let middle = position_of(&simulation, 0.0, 1.0);
    let finish = position_of(&simulation, 0.0, 2.0);
    for position in [start, middle] {
        let report = simulation
            .tick(position, FRAME, wide_view(), &clock)
            .expect("tick succeeds");
        assert_eq!(report.tile_event, None);
    }

    let report = simulation
        .tick(finish, FRAME, wide_view(), &clock)
        .expect("tick succeeds");
    let Some(TileEvent::Complete(summary)) = report.tile_event else {
        panic!("expected completion, got {:?}", report.tile_event);
    };
    assert_eq!(summary.rating, Rating::TwoStars);
    assert_eq!(summary.elapsed, Duration::from_secs(4));
    assert!(simulation.is_finished());
}

#[test]
fn portals_teleport_and_suspend_evaluation() {
    let mut simulation = simulation(&["SXR", "XXX", "RXF"]);
    let clock = clock();
    let portal = position_of(&simulation, 0.0, 2.0);
    let partner = position_of(&simulation, 2.0, 0.0);
    let off_map = position_of(&simulation, -3.0, -3.0);

    let report = simulation
        .tick(portal, FRAME, wide_view(), &clock)
        .expect("tick succeeds");
    let Some(TileEvent::Teleport {
        style,
        from,
        to,
        target,
    }) = report.tile_event
    else {
        panic!("expected teleport, got {:?}", report.tile_event);
    };
    assert_eq!(style, BlockStyle::Red);
    assert_eq!(from, CellCoord::new(0, 2));
    assert_eq!(to, CellCoord::new(2, 0));
    assert!((target - partner).length() < 1e-3);
    assert!(simulation.is_teleporting());
    assert!(!simulation.accepts_input());

    let report = simulation
        .tick(off_map, Duration::from_millis(500), wide_view(), &clock)
        .expect("tick succeeds");
    assert_eq!(report.tile_event, None, "evaluation is suspended");
    assert!(!report.paint_order_updates.is_empty());

    let report = simulation
        .tick(partner, Duration::from_millis(300), wide_view(), &clock)
        .expect("tick succeeds");
    assert_eq!(report.tile_event, None, "same portal kind does not refire");
    assert!(simulation.accepts_input());
}

#[test]
fn settle_ticks_delay_the_first_evaluation() {
    let level = decode_map(["SXF"]).expect("test map should decode");
    let mut simulation = WorldSimulation::new(
        Arc::new(level),
        SimulationConfig::default().with_settle_ticks(2),
    );
    let clock = clock();
    let off_map = position_of(&simulation, 4.0, 4.0);

    for _ in 0..2 {
        let report = simulation
            .tick(off_map, FRAME, wide_view(), &clock)
            .expect("tick succeeds");
        assert_eq!(report.tile_event, None);
    }
    let report = simulation
        .tick(off_map, FRAME, wide_view(), &clock)
        .expect("tick succeeds");
    assert_eq!(report.tile_event, Some(TileEvent::Fail));
}

#[test]
fn visibility_changes_are_edge_triggered() {
    let mut simulation = simulation(&["SX", "XF"]);
    let clock = clock();
    let spawn = simulation.spawn_position();

    let first = simulation
        .tick(spawn, FRAME, wide_view(), &clock)
        .expect("tick succeeds");
    assert_eq!(first.visibility_changes.len(), 5);
    assert!(first.visibility_changes.iter().all(|(_, visible)| *visible));

    let second = simulation
        .tick(spawn, FRAME, wide_view(), &clock)
        .expect("tick succeeds");
    assert!(second.visibility_changes.is_empty());
    assert_eq!(second.paint_order_updates.len(), 5);

    let hidden = simulation
        .tick(spawn, FRAME, far_view(), &clock)
        .expect("tick succeeds");
    assert_eq!(hidden.visibility_changes.len(), 5);
    assert!(hidden.visibility_changes.iter().all(|(_, visible)| !*visible));
    assert!(hidden.paint_order_updates.is_empty());
}

#[test]
fn actor_paints_over_the_tile_it_stands_on() {
    let mut simulation = simulation(&["XXX", "XXS", "FXX"]);
    let clock = clock();
    let spawn = simulation.spawn_position();

    let report = simulation
        .tick(spawn, FRAME, wide_view(), &clock)
        .expect("tick succeeds");
    let key_of = |entity: EntityId| {
        report
            .paint_order_updates
            .iter()
            .find(|(candidate, _)| *candidate == entity)
            .map(|(_, key)| *key)
            .expect("entity is visible")
    };

    let start_key = key_of(EntityId::Tile(CellCoord::new(1, 2)));
    assert_eq!(start_key, PaintOrder::new(-1));
    assert_eq!(key_of(EntityId::Actor), PaintOrder::new(0));
    let near = key_of(EntityId::Tile(CellCoord::new(2, 0)));
    let far = key_of(EntityId::Tile(CellCoord::new(0, 2)));
    assert!(near > far);
}
