#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick world simulation that resolves the tile under the actor, raises
//! level-defining events and keeps visibility and paint order current.

pub mod steering;
mod visibility;

use std::{sync::Arc, time::Duration};

use glam::Vec2;
use iso_dimension_core::{
    BlockKind, BlockStyle, CellCoord, EntityId, GridPoint, IsometricProjection, PaintOrder,
    TileEvent, ViewRect,
};
use iso_dimension_system_rating::LevelClock;
use iso_dimension_world::{query, LoadedLevel};
use thiserror::Error;

pub use steering::Steering;
use visibility::VisibilityTracker;

/// Configuration parameters required to construct the world simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    projection: IsometricProjection,
    placement_bias: GridPoint,
    view_margin: f32,
    tile_extent: f32,
    actor_extent: Vec2,
    teleport_transition: Duration,
    settle_ticks: u32,
}

impl SimulationConfig {
    /// Offset between a cell and the actor's visual anchor standing on it.
    pub const PLACEMENT_BIAS: GridPoint = GridPoint::new(-1.0, 2.25);

    /// Margin by which the view is shrunk before visibility tests.
    pub const VIEW_MARGIN: f32 = 10.0;

    /// Duration of the teleport fade and travel during which tiles are ignored.
    pub const TELEPORT_TRANSITION: Duration = Duration::from_millis(800);

    /// Ticks spent settling the scene before the first tile evaluation.
    pub const SETTLE_TICKS: u32 = 30;

    /// Creates a configuration for the provided projection using the shipped
    /// defaults for every other parameter.
    #[must_use]
    pub fn new(projection: IsometricProjection) -> Self {
        let tile_extent = projection.projected_tile_width();
        Self {
            projection,
            placement_bias: Self::PLACEMENT_BIAS,
            view_margin: Self::VIEW_MARGIN,
            tile_extent,
            actor_extent: Vec2::splat(tile_extent * 0.5),
            teleport_transition: Self::TELEPORT_TRANSITION,
            settle_ticks: Self::SETTLE_TICKS,
        }
    }

    /// Replaces the number of settle ticks.
    #[must_use]
    pub const fn with_settle_ticks(mut self, settle_ticks: u32) -> Self {
        self.settle_ticks = settle_ticks;
        self
    }

    /// Replaces the teleport transition duration.
    #[must_use]
    pub const fn with_teleport_transition(mut self, duration: Duration) -> Self {
        self.teleport_transition = duration;
        self
    }

    /// Projection used to convert between grid and world positions.
    #[must_use]
    pub const fn projection(&self) -> &IsometricProjection {
        &self.projection
    }

    /// Offset between a cell and the actor's visual anchor.
    #[must_use]
    pub const fn placement_bias(&self) -> GridPoint {
        self.placement_bias
    }

    /// Margin applied to the view before visibility tests.
    #[must_use]
    pub const fn view_margin(&self) -> f32 {
        self.view_margin
    }

    /// Edge length of a tile's on-screen bounds.
    #[must_use]
    pub const fn tile_extent(&self) -> f32 {
        self.tile_extent
    }

    /// Size of the actor's on-screen bounds.
    #[must_use]
    pub const fn actor_extent(&self) -> Vec2 {
        self.actor_extent
    }

    /// Time tile evaluation is suspended after a teleport.
    #[must_use]
    pub const fn teleport_transition(&self) -> Duration {
        self.teleport_transition
    }

    /// Ticks spent before the first tile evaluation.
    #[must_use]
    pub const fn settle_ticks(&self) -> u32 {
        self.settle_ticks
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new(IsometricProjection::default())
    }
}

/// Failures raised while evaluating a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The actor entered a portal that has no partner.
    #[error("portal {style:?} at {cell:?} has no paired portal")]
    UnpairedPortal {
        /// Style of the entered portal.
        style: BlockStyle,
        /// Cell of the entered portal.
        cell: CellCoord,
    },
}

/// Everything a single tick decided.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Level-defining event fired this tick, if any.
    pub tile_event: Option<TileEvent>,
    /// Entities whose visibility flipped, with their new flag.
    pub visibility_changes: Vec<(EntityId, bool)>,
    /// Paint-order keys of every currently visible entity.
    pub paint_order_updates: Vec<(EntityId, PaintOrder)>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Settling { remaining: u32 },
    Evaluating,
    Teleporting { remaining: Duration },
    Finished,
}

/// Mutable state of a single run over a loaded level.
#[derive(Debug)]
pub struct WorldSimulation {
    level: Arc<LoadedLevel>,
    config: SimulationConfig,
    tiles: Vec<(CellCoord, ViewRect)>,
    actor_position: Vec2,
    previous_kind: Option<BlockKind>,
    phase: Phase,
    visibility: VisibilityTracker,
}

impl WorldSimulation {
    /// Starts a run with the actor placed on the level's entry point.
    #[must_use]
    pub fn new(level: Arc<LoadedLevel>, config: SimulationConfig) -> Self {
        let extent = Vec2::splat(config.tile_extent);
        let tiles = query::tiles(&level)
            .map(|(cell, _)| {
                let origin = config.projection.project_cell(cell);
                (cell, ViewRect::from_origin_and_size(origin, extent))
            })
            .collect();
        let actor_position = anchor_position(&config, level.start());
        let phase = if config.settle_ticks == 0 {
            Phase::Evaluating
        } else {
            Phase::Settling {
                remaining: config.settle_ticks,
            }
        };

        Self {
            level,
            config,
            tiles,
            actor_position,
            previous_kind: None,
            phase,
            visibility: VisibilityTracker::default(),
        }
    }

    /// Level the run is played on.
    #[must_use]
    pub fn level(&self) -> &Arc<LoadedLevel> {
        &self.level
    }

    /// Configuration the run was created with.
    #[must_use]
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// World position the actor is spawned at.
    #[must_use]
    pub fn spawn_position(&self) -> Vec2 {
        anchor_position(&self.config, self.level.start())
    }

    /// Most recently observed world position of the actor.
    #[must_use]
    pub const fn actor_position(&self) -> Vec2 {
        self.actor_position
    }

    /// Grid location the actor stands on, with the placement bias removed.
    #[must_use]
    pub fn actor_location(&self) -> GridPoint {
        self.config
            .projection
            .unproject(self.actor_position, true)
            .offset_against(self.config.placement_bias.rounded())
    }

    /// Reports whether a fail or complete event ended the run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Reports whether a teleport transition is in progress.
    #[must_use]
    pub fn is_teleporting(&self) -> bool {
        matches!(self.phase, Phase::Teleporting { .. })
    }

    /// Reports whether steering input may currently move the actor.
    #[must_use]
    pub fn accepts_input(&self) -> bool {
        !self.is_finished() && !self.is_teleporting()
    }

    /// Evaluates one world tick for the provided actor position.
    ///
    /// The position is recorded first, then the tile under the actor is
    /// resolved and any resulting event is dispatched, and finally visibility
    /// and paint order are recomputed against `view`.
    pub fn tick(
        &mut self,
        actor_position: Vec2,
        dt: Duration,
        view: ViewRect,
        clock: &LevelClock,
    ) -> Result<TickReport, SimulationError> {
        self.actor_position = actor_position;

        let mut report = TickReport::default();
        if self.advance_phase(dt) {
            report.tile_event = self.evaluate_tile(clock)?;
        }
        self.refresh_visibility(view, &mut report);
        Ok(report)
    }

    fn advance_phase(&mut self, dt: Duration) -> bool {
        match self.phase {
            Phase::Settling { remaining } => {
                self.phase = match remaining.saturating_sub(1) {
                    0 => Phase::Evaluating,
                    remaining => Phase::Settling { remaining },
                };
                false
            }
            Phase::Teleporting { remaining } => {
                let remaining = remaining.saturating_sub(dt);
                if remaining.is_zero() {
                    log::trace!("teleport transition finished");
                    self.phase = Phase::Evaluating;
                    true
                } else {
                    self.phase = Phase::Teleporting { remaining };
                    false
                }
            }
            Phase::Evaluating => true,
            Phase::Finished => false,
        }
    }

    fn evaluate_tile(&mut self, clock: &LevelClock) -> Result<Option<TileEvent>, SimulationError> {
        let location = self.actor_location();
        let cell = location.to_cell();
        let kind = query::block_under(&self.level, location);
        if self.previous_kind == Some(kind) {
            return Ok(None);
        }
        self.previous_kind = Some(kind);

        let event = match (cell, kind) {
            (_, BlockKind::Empty) => {
                self.phase = Phase::Finished;
                TileEvent::Fail
            }
            (_, BlockKind::Finish) => {
                self.phase = Phase::Finished;
                TileEvent::Complete(clock.summary())
            }
            (Some(from), BlockKind::TeleportPortal(style)) => self.teleport(style, from)?,
            _ => return Ok(None),
        };

        log::debug!("tile event at {location:?}: {event:?}");
        Ok(Some(event))
    }

    fn teleport(&mut self, style: BlockStyle, from: CellCoord) -> Result<TileEvent, SimulationError> {
        let to = query::teleport_destination(&self.level, style, from)
            .ok_or(SimulationError::UnpairedPortal { style, cell: from })?;

        log::trace!(
            "suspending tile evaluation for {:?}",
            self.config.teleport_transition
        );
        self.phase = Phase::Teleporting {
            remaining: self.config.teleport_transition,
        };

        Ok(TileEvent::Teleport {
            style,
            from,
            to,
            target: anchor_position(&self.config, to),
        })
    }

    fn refresh_visibility(&mut self, view: ViewRect, report: &mut TickReport) {
        let view = view.inset(self.config.view_margin);

        for (cell, bounds) in &self.tiles {
            let entity = EntityId::Tile(*cell);
            let visible = bounds.intersects(&view);
            if let Some(flag) = self.visibility.observe(entity, visible) {
                report.visibility_changes.push((entity, flag));
            }
            if visible {
                report
                    .paint_order_updates
                    .push((entity, PaintOrder::for_tile(*cell)));
            }
        }

        let actor_bounds = ViewRect::centered(self.actor_position, self.config.actor_extent);
        let visible = actor_bounds.intersects(&view);
        if let Some(flag) = self.visibility.observe(EntityId::Actor, visible) {
            report.visibility_changes.push((EntityId::Actor, flag));
        }
        if visible {
            report.paint_order_updates.push((
                EntityId::Actor,
                PaintOrder::for_actor(self.actor_location()),
            ));
        }
    }
}

fn anchor_position(config: &SimulationConfig, cell: CellCoord) -> Vec2 {
    config
        .projection
        .project(cell.to_point().offset_by(config.placement_bias))
}
