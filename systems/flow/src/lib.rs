#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Flow coordinator that owns the live game state and the active run.
//!
//! Adapters submit [`Intent`] values through [`GameFlow::handle`] and drive
//! the active run with [`GameFlow::tick`]. The coordinator is the only owner
//! of the [`FlowState`]; every transition tears down the previous run before
//! the next state becomes live.

pub mod audio;

use std::{sync::Arc, time::Duration};

use glam::Vec2;
use iso_dimension_core::{
    CompletionSummary, FacingDirection, GoalsError, Intent, LevelConfig, LoadError, Rating,
    TileEvent, ViewRect,
};
use iso_dimension_system_rating::{self as rating, LevelClock};
use iso_dimension_system_simulation::{
    SimulationConfig, SimulationError, Steering, TickReport, WorldSimulation,
};
use thiserror::Error;

pub use audio::{ActorModel, AudioBackend, AudioService, Preferences};

/// Cadence that advances the rating clock of a run.
///
/// Exactly one cadence drives a run, so time is never counted twice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClockDriver {
    /// Frame time passed to [`GameFlow::tick`] advances the clock in whole
    /// periods; [`GameFlow::rating_tick`] is ignored.
    #[default]
    Frames,
    /// Only [`GameFlow::rating_tick`] advances the clock, for collaborators
    /// that own a real periodic timer.
    RatingTicks,
}

/// Configuration parameters required to construct the flow coordinator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowConfig {
    simulation: SimulationConfig,
    clock: rating::Config,
    clock_driver: ClockDriver,
    outcome_delay: Duration,
}

impl FlowConfig {
    /// Time between a fail or complete event and the resulting transition.
    pub const OUTCOME_DELAY: Duration = Duration::from_secs(1);

    /// Creates a new configuration.
    #[must_use]
    pub const fn new(
        simulation: SimulationConfig,
        clock: rating::Config,
        outcome_delay: Duration,
    ) -> Self {
        Self {
            simulation,
            clock,
            clock_driver: ClockDriver::Frames,
            outcome_delay,
        }
    }

    /// Replaces the cadence that advances the rating clock.
    #[must_use]
    pub const fn with_clock_driver(mut self, clock_driver: ClockDriver) -> Self {
        self.clock_driver = clock_driver;
        self
    }

    /// Configuration used for every run's simulation.
    #[must_use]
    pub const fn simulation(&self) -> &SimulationConfig {
        &self.simulation
    }

    /// Configuration used for every run's clock.
    #[must_use]
    pub const fn clock(&self) -> rating::Config {
        self.clock
    }

    /// Cadence that advances every run's clock.
    #[must_use]
    pub const fn clock_driver(&self) -> ClockDriver {
        self.clock_driver
    }

    /// Time between a fail or complete event and the resulting transition.
    #[must_use]
    pub const fn outcome_delay(&self) -> Duration {
        self.outcome_delay
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self::new(
            SimulationConfig::default(),
            rating::Config::default(),
            Self::OUTCOME_DELAY,
        )
    }
}

/// The single live state of the game.
#[derive(Clone, Debug, PartialEq)]
pub enum FlowState {
    /// Level selection menu.
    Menu,
    /// A run of the configured level is in progress.
    Playing(LevelConfig),
    /// The last run finished and is being rated.
    Completed(CompletionSummary),
}

impl FlowState {
    const fn name(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::Playing(_) => "playing",
            Self::Completed(_) => "completed",
        }
    }
}

/// Failures surfaced by the flow coordinator.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The selected level map could not be decoded.
    #[error("level could not be loaded: {0}")]
    Load(#[from] LoadError),
    /// The selected level's goals are misordered or invalid.
    #[error("level goals are invalid: {0}")]
    Goals(#[from] GoalsError),
    /// The active run failed to evaluate a tick.
    #[error("simulation failed: {0}")]
    Simulation(#[from] SimulationError),
    /// The intent has no meaning in the current state.
    #[error("intent {intent} is not accepted while in the {state} state")]
    UnexpectedIntent {
        /// Name of the rejected intent.
        intent: &'static str,
        /// Name of the state that rejected it.
        state: &'static str,
    },
}

/// Everything a single frame produced for the collaborators.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowFrame {
    /// Simulation report of the active run, if one was ticked.
    pub report: Option<TickReport>,
    /// Velocity the physics collaborator should apply to the actor.
    pub impulse: Option<Vec2>,
    /// Rating changes fired this frame, oldest first.
    pub rating_changes: Vec<Rating>,
    /// New state when a transition happened this frame.
    pub transition: Option<FlowState>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Outcome {
    Restart,
    Complete(CompletionSummary),
}

#[derive(Debug)]
struct PendingOutcome {
    outcome: Outcome,
    remaining: Duration,
}

#[derive(Debug)]
struct Run {
    config: LevelConfig,
    raw_map: String,
    simulation: WorldSimulation,
    clock: LevelClock,
    steering: Steering,
    paused: bool,
    pending_impulse: Option<Vec2>,
    outcome: Option<PendingOutcome>,
}

impl Run {
    fn start(config: LevelConfig, raw_map: String, flow: &FlowConfig) -> Result<Self, FlowError> {
        config.goals().validate()?;
        let level = iso_dimension_world::decode(&raw_map, &config)?;
        let initial_direction = level.initial_direction();
        Ok(Self {
            clock: LevelClock::with_config(*config.goals(), flow.clock),
            simulation: WorldSimulation::new(Arc::new(level), flow.simulation),
            steering: Steering::new(initial_direction),
            config,
            raw_map,
            paused: false,
            pending_impulse: None,
            outcome: None,
        })
    }

    fn accepts_input(&self) -> bool {
        !self.paused && self.outcome.is_none() && self.simulation.accepts_input()
    }
}

/// Coordinator that owns the authoritative flow state.
#[derive(Debug)]
pub struct GameFlow {
    config: FlowConfig,
    preferences: Preferences,
    state: FlowState,
    run: Option<Run>,
}

impl GameFlow {
    /// Creates a coordinator that starts on the menu.
    #[must_use]
    pub fn new(config: FlowConfig, preferences: Preferences) -> Self {
        Self {
            config,
            preferences,
            state: FlowState::Menu,
            run: None,
        }
    }

    /// Currently live state.
    #[must_use]
    pub const fn state(&self) -> &FlowState {
        &self.state
    }

    /// Preferences chosen on the menu.
    #[must_use]
    pub const fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Mutable access to the menu preferences.
    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    /// Simulation of the active run, if any.
    #[must_use]
    pub fn simulation(&self) -> Option<&WorldSimulation> {
        self.run.as_ref().map(|run| &run.simulation)
    }

    /// Clock of the active run, if any.
    #[must_use]
    pub fn clock(&self) -> Option<&LevelClock> {
        self.run.as_ref().map(|run| &run.clock)
    }

    /// Direction the actor of the active run faces, if any.
    #[must_use]
    pub fn facing(&self) -> Option<FacingDirection> {
        self.run.as_ref().map(|run| run.steering.facing())
    }

    /// Reports whether the active run is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.run.as_ref().is_some_and(|run| run.paused)
    }

    /// Applies an intent and returns the resulting state.
    ///
    /// A rejected level selection leaves the previous state live.
    pub fn handle(&mut self, intent: Intent) -> Result<&FlowState, FlowError> {
        match intent {
            Intent::SelectLevel { config, raw_map } => {
                if self.state != FlowState::Menu {
                    return Err(self.unexpected("select level"));
                }
                let run = Run::start(config.clone(), raw_map, &self.config).map_err(|error| {
                    log::warn!("level selection rejected: {error}");
                    error
                })?;
                self.enter(FlowState::Playing(config), Some(run));
            }
            Intent::Pause => {
                let run = self.active_run("pause")?;
                if !run.paused {
                    run.paused = true;
                    run.clock.pause();
                    run.steering.release();
                    run.pending_impulse = None;
                    log::info!("run paused");
                }
            }
            Intent::Resume => {
                let run = self.active_run("resume")?;
                if run.paused {
                    run.paused = false;
                    if run.outcome.is_none() {
                        run.clock.resume();
                    }
                    log::info!("run resumed");
                }
            }
            Intent::Steer(direction) => {
                let run = self.active_run("steer")?;
                if run.accepts_input() {
                    if let Some(impulse) = run.steering.press(direction) {
                        run.pending_impulse = Some(impulse);
                    }
                }
            }
            Intent::ReleaseSteering => {
                let run = self.active_run("release steering")?;
                run.steering.release();
            }
            Intent::ReturnToMenu => self.enter(FlowState::Menu, None),
        }
        Ok(&self.state)
    }

    /// Advances the active run's clock by one rating period.
    ///
    /// Only honoured when the flow is configured with
    /// [`ClockDriver::RatingTicks`]; frame-driven clocks ignore it.
    pub fn rating_tick(&mut self) -> Option<Rating> {
        if self.config.clock_driver != ClockDriver::RatingTicks {
            log::trace!("rating tick ignored by a frame-driven clock");
            return None;
        }
        let run = self.run.as_mut()?;
        if run.outcome.is_some() {
            return None;
        }
        run.clock.rating_tick()
    }

    /// Drives one world tick of the active run.
    ///
    /// Outside a run this does nothing. Fail and complete events take effect
    /// once the configured outcome delay has passed.
    pub fn tick(
        &mut self,
        actor_position: Vec2,
        dt: Duration,
        view: ViewRect,
    ) -> Result<FlowFrame, FlowError> {
        let mut frame = FlowFrame::default();
        let Some(run) = self.run.as_mut() else {
            return Ok(frame);
        };

        if let Some(pending) = run.outcome.as_mut() {
            pending.remaining = pending.remaining.saturating_sub(dt);
            if pending.remaining.is_zero() {
                let outcome = pending.outcome;
                frame.transition = Some(self.resolve(outcome)?.clone());
                return Ok(frame);
            }
        }

        frame.impulse = run.pending_impulse.take();
        if run.accepts_input() {
            if let Some(impulse) = run.steering.advance(dt) {
                frame.impulse = Some(impulse);
            }
        }

        let report = run.simulation.tick(actor_position, dt, view, &run.clock)?;
        match report.tile_event {
            Some(TileEvent::Fail) => {
                log::info!("level {:?} failed", run.config.raw_map_file());
                run.steering.release();
                run.clock.pause();
                run.outcome = Some(PendingOutcome {
                    outcome: Outcome::Restart,
                    remaining: self.config.outcome_delay,
                });
            }
            Some(TileEvent::Complete(summary)) => {
                log::info!(
                    "level {:?} completed in {:?}",
                    run.config.raw_map_file(),
                    summary.elapsed
                );
                run.steering.release();
                run.clock.pause();
                run.outcome = Some(PendingOutcome {
                    outcome: Outcome::Complete(summary),
                    remaining: self.config.outcome_delay,
                });
            }
            Some(TileEvent::Teleport { .. }) => {
                run.steering.release();
                frame.impulse = None;
            }
            None => {}
        }

        if run.outcome.is_none() && self.config.clock_driver == ClockDriver::Frames {
            frame.rating_changes = run.clock.advance(dt);
        }
        frame.report = Some(report);
        Ok(frame)
    }

    fn resolve(&mut self, outcome: Outcome) -> Result<&FlowState, FlowError> {
        match outcome {
            Outcome::Restart => {
                let previous = self.run.take();
                let Some(Run {
                    config, raw_map, ..
                }) = previous
                else {
                    return Ok(&self.state);
                };
                let run = Run::start(config.clone(), raw_map, &self.config)?;
                self.enter(FlowState::Playing(config), Some(run));
            }
            Outcome::Complete(summary) => self.enter(FlowState::Completed(summary), None),
        }
        Ok(&self.state)
    }

    fn enter(&mut self, state: FlowState, run: Option<Run>) {
        self.run = None;
        log::info!("flow {} -> {}", self.state.name(), state.name());
        self.state = state;
        self.run = run;
    }

    fn active_run(&mut self, intent: &'static str) -> Result<&mut Run, FlowError> {
        let state = self.state.name();
        self.run
            .as_mut()
            .ok_or(FlowError::UnexpectedIntent { intent, state })
    }

    fn unexpected(&self, intent: &'static str) -> FlowError {
        FlowError::UnexpectedIntent {
            intent,
            state: self.state.name(),
        }
    }
}
