#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Completion clock that measures a run and rates it against the level goals.

use std::time::Duration;

use iso_dimension_core::{CompletionSummary, LevelGoals, Rating};

/// Resolves the rating earned after `elapsed` under the provided goals.
#[must_use]
pub fn rating(elapsed: Duration, goals: &LevelGoals) -> Rating {
    goals.rating_for(elapsed)
}

/// Configuration parameters required to construct a level clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    period: Duration,
}

impl Config {
    /// Creates a configuration with the provided rating tick period.
    #[must_use]
    pub const fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Interval added to the elapsed time by every rating tick.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

/// Run clock that accrues elapsed time in whole periods and tracks the rating.
#[derive(Clone, Debug)]
pub struct LevelClock {
    goals: LevelGoals,
    period: Duration,
    accumulator: Duration,
    elapsed: Duration,
    rating: Rating,
    paused: bool,
}

impl LevelClock {
    /// Creates a running clock using the default one second period.
    #[must_use]
    pub fn new(goals: LevelGoals) -> Self {
        Self::with_config(goals, Config::default())
    }

    /// Creates a running clock using the supplied configuration.
    #[must_use]
    pub fn with_config(goals: LevelGoals, config: Config) -> Self {
        Self {
            rating: goals.rating_for(Duration::ZERO),
            goals,
            period: config.period,
            accumulator: Duration::ZERO,
            elapsed: Duration::ZERO,
            paused: false,
        }
    }

    /// Goals the run is measured against.
    #[must_use]
    pub const fn goals(&self) -> &LevelGoals {
        &self.goals
    }

    /// Time accrued by the run so far.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Rating earned at the current elapsed time.
    #[must_use]
    pub const fn rating(&self) -> Rating {
        self.rating
    }

    /// Reports whether time accrual is suspended.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Suspends time accrual without resetting the elapsed time.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Continues time accrual from the stored elapsed time.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Advances the clock by one period.
    ///
    /// Returns the new rating only when it differs from the rating before the
    /// tick. A paused clock ignores the tick.
    pub fn rating_tick(&mut self) -> Option<Rating> {
        if self.paused {
            return None;
        }

        self.elapsed = self.elapsed.saturating_add(self.period);
        let rating = self.goals.rating_for(self.elapsed);
        if rating == self.rating {
            return None;
        }

        log::debug!(
            "rating dropped from {:?} to {:?} after {:?}",
            self.rating,
            rating,
            self.elapsed
        );
        self.rating = rating;
        Some(rating)
    }

    /// Feeds frame time into the clock, firing a rating tick for every whole
    /// period accumulated.
    ///
    /// Returns every rating change the fired ticks produced, oldest first.
    pub fn advance(&mut self, dt: Duration) -> Vec<Rating> {
        let mut changes = Vec::new();
        if self.paused || self.period.is_zero() {
            return changes;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        while self.accumulator >= self.period {
            self.accumulator -= self.period;
            changes.extend(self.rating_tick());
        }
        changes
    }

    /// Snapshot of the run suitable for the completion screen.
    #[must_use]
    pub fn summary(&self) -> CompletionSummary {
        CompletionSummary {
            rating: self.rating,
            goals: self.goals,
            elapsed: self.elapsed,
        }
    }
}
