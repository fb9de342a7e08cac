//! Damped spring integration for pointer-driven motion.
//!
//! A [`SpringSolver`] advances one axis of motion toward a movable
//! target using a spring-damper model: a restoring force proportional
//! to displacement plus a drag force proportional to velocity,
//! integrated with semi-implicit Euler. Stiff settings give a snappy
//! magnetic feel, soft settings a slow ambient drift; both are plain
//! constructor parameters.
//!
//! # Example
//!
//! ```
//! use plexus::spring::SpringSolver;
//!
//! let mut spring = SpringSolver::new(120.0, 12.0);
//! spring.set_target(40.0);
//!
//! // In your frame loop:
//! let x = spring.update(1.0 / 60.0);
//! assert!(x > 0.0);
//! ```

/// One-dimensional spring-damper integrator.
///
/// Tension and friction are fixed at construction; the target can be
/// moved at any time and the solver chases it on each [`update`].
///
/// [`update`]: SpringSolver::update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringSolver {
    position: f32,
    target: f32,
    velocity: f32,
    tension: f32,
    friction: f32,
}

impl SpringSolver {
    /// Create a solver at rest at 0 with the given stiffness and drag.
    pub fn new(tension: f32, friction: f32) -> Self {
        Self {
            position: 0.0,
            target: 0.0,
            velocity: 0.0,
            tension,
            friction,
        }
    }

    /// Move the rest position. No recompute happens until [`update`].
    ///
    /// [`update`]: SpringSolver::update
    pub fn set_target(&mut self, value: f32) {
        self.target = value;
    }

    /// Current rest position the solver is chasing.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Current position.
    #[inline]
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Current velocity.
    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Advance one integration step and return the new position.
    ///
    /// `dt` is caller-supplied and must be clamped upstream; the solver
    /// itself applies no limit. A `dt` of 0 leaves position and
    /// velocity untouched.
    pub fn update(&mut self, dt: f32) -> f32 {
        let force = -self.tension * (self.position - self.target);
        let damping = -self.friction * self.velocity;
        self.velocity += (force + damping) * dt;
        self.position += self.velocity * dt;
        self.position
    }
}

impl Default for SpringSolver {
    fn default() -> Self {
        Self::new(170.0, 26.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn zero_dt_is_a_no_op() {
        let mut spring = SpringSolver::new(120.0, 12.0);
        spring.set_target(50.0);
        spring.update(DT);
        let (pos, vel) = (spring.position(), spring.velocity());

        for _ in 0..10 {
            spring.update(0.0);
        }

        assert_eq!(spring.position(), pos);
        assert_eq!(spring.velocity(), vel);
    }

    #[test]
    fn settles_on_target() {
        let mut spring = SpringSolver::new(120.0, 12.0);
        spring.set_target(40.0);

        for _ in 0..600 {
            spring.update(DT);
        }

        assert!((spring.position() - 40.0).abs() < 0.01);
        assert!(spring.velocity().abs() < 0.01);
    }

    #[test]
    fn displacement_envelope_decays() {
        // Under-damped settings oscillate, but the oscillation envelope
        // must shrink: the peak displacement over each successive window
        // of frames is non-increasing.
        let mut solver = SpringSolver::new(120.0, 12.0);
        solver.set_target(100.0);

        let window = 30;
        let mut peaks = Vec::new();
        for _ in 0..10 {
            let mut peak = 0.0f32;
            for _ in 0..window {
                solver.update(DT);
                peak = peak.max((solver.position() - solver.target()).abs());
            }
            peaks.push(peak);
        }

        for pair in peaks.windows(2) {
            assert!(
                pair[1] <= pair[0] + 1e-3,
                "envelope grew: {} -> {}",
                pair[0],
                pair[1]
            );
        }
        assert!(*peaks.last().unwrap() < 1.0);
    }

    #[test]
    fn soft_spring_is_slower_than_stiff_spring() {
        let mut stiff = SpringSolver::new(120.0, 12.0);
        let mut soft = SpringSolver::new(20.0, 5.0);
        stiff.set_target(100.0);
        soft.set_target(100.0);

        for _ in 0..30 {
            stiff.update(DT);
            soft.update(DT);
        }

        assert!(stiff.position() > soft.position());
    }

    #[test]
    fn default_matches_stock_tuning() {
        assert_eq!(SpringSolver::default(), SpringSolver::new(170.0, 26.0));
    }
}
