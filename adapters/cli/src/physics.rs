//! Damped kinematic body standing in for a physics engine.

use std::time::Duration;

use glam::Vec2;

/// Velocity fraction lost per second while no impulse is applied.
const LINEAR_DAMPING: f32 = 3.0;

/// Speed below which the body is considered at rest.
const REST_SPEED: f32 = 1e-2;

/// Point mass moved by steering impulses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Body {
    position: Vec2,
    velocity: Vec2,
}

impl Body {
    /// Creates a resting body at the provided position.
    pub(crate) const fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
        }
    }

    pub(crate) const fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Replaces the body's velocity with the impulse.
    pub(crate) fn apply_impulse(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Moves the body to `target` and brings it to rest.
    pub(crate) fn teleport_to(&mut self, target: Vec2) {
        self.position = target;
        self.velocity = Vec2::ZERO;
    }

    /// Integrates the body over `dt`.
    pub(crate) fn step(&mut self, dt: Duration) {
        let seconds = dt.as_secs_f32();
        self.position += self.velocity * seconds;
        self.velocity *= (-LINEAR_DAMPING * seconds).exp();
        if self.velocity.length() < REST_SPEED {
            self.velocity = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulses_move_the_body_and_decay() {
        let mut body = Body::at(Vec2::ZERO);
        body.apply_impulse(Vec2::new(200.0, 0.0));
        body.step(Duration::from_millis(100));

        assert!((body.position().x - 20.0).abs() < 1e-4);
        assert!(body.velocity().x < 200.0);
        assert!(body.velocity().x > 0.0);
    }

    #[test]
    fn body_comes_to_rest() {
        let mut body = Body::at(Vec2::ZERO);
        body.apply_impulse(Vec2::new(0.0, -200.0));
        for _ in 0..600 {
            body.step(Duration::from_millis(16));
        }

        assert_eq!(body.velocity(), Vec2::ZERO);
        assert!(body.position().y < 0.0);
    }

    #[test]
    fn teleporting_stops_the_body() {
        let mut body = Body::at(Vec2::ZERO);
        body.apply_impulse(Vec2::ONE);
        body.teleport_to(Vec2::new(5.0, 7.0));

        assert_eq!(body.position(), Vec2::new(5.0, 7.0));
        assert_eq!(body.velocity(), Vec2::ZERO);
    }
}
