//! Periodic movement impulses issued while a direction is held.

use std::time::Duration;

use glam::Vec2;
use iso_dimension_core::FacingDirection;

/// Translates held directions into velocity impulses for the physics
/// collaborator.
#[derive(Clone, Debug)]
pub struct Steering {
    facing: FacingDirection,
    held: Option<FacingDirection>,
    accumulator: Duration,
}

impl Steering {
    /// Speed of the actor along its facing direction, in world units per second.
    pub const SPEED: f32 = 200.0;

    /// Interval at which a held direction re-issues its velocity.
    pub const REISSUE_PERIOD: Duration = Duration::from_millis(100);

    /// Creates steering that faces the provided direction and holds nothing.
    #[must_use]
    pub const fn new(facing: FacingDirection) -> Self {
        Self {
            facing,
            held: None,
            accumulator: Duration::ZERO,
        }
    }

    /// Direction the actor currently faces.
    #[must_use]
    pub const fn facing(&self) -> FacingDirection {
        self.facing
    }

    /// Direction currently held, if any.
    #[must_use]
    pub const fn held(&self) -> Option<FacingDirection> {
        self.held
    }

    /// Starts holding a direction and returns the velocity to apply now.
    ///
    /// Pressing the direction that is already held is ignored.
    pub fn press(&mut self, direction: FacingDirection) -> Option<Vec2> {
        if self.held == Some(direction) {
            return None;
        }

        self.facing = direction;
        self.held = Some(direction);
        self.accumulator = Duration::ZERO;
        Some(velocity(direction))
    }

    /// Stops re-issuing impulses. The facing direction is kept.
    pub fn release(&mut self) {
        self.held = None;
        self.accumulator = Duration::ZERO;
    }

    /// Advances the re-issue timer, returning the velocity when it elapses.
    pub fn advance(&mut self, dt: Duration) -> Option<Vec2> {
        let direction = self.held?;
        self.accumulator = self.accumulator.saturating_add(dt);
        if self.accumulator < Self::REISSUE_PERIOD {
            return None;
        }

        while self.accumulator >= Self::REISSUE_PERIOD {
            self.accumulator -= Self::REISSUE_PERIOD;
        }
        Some(velocity(direction))
    }
}

fn velocity(direction: FacingDirection) -> Vec2 {
    direction.unit_vector() * Steering::SPEED
}
