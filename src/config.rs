//! Field tuning parameters.

use glam::{Vec2, Vec3};

/// Viewport width (logical px) below which the particle count drops.
const NARROW_VIEWPORT_WIDTH: f32 = 900.0;
const NARROW_PARTICLE_COUNT: usize = 60;
const WIDE_PARTICLE_COUNT: usize = 120;

/// Tuning for a [`ParticleField`](crate::field::ParticleField).
///
/// Every value is plain data; construct one, tweak what you need, and
/// hand it to the field. [`FieldConfig::for_viewport`] picks the
/// particle count from the viewport width, everything else keeps its
/// default.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Number of particle bodies.
    pub particle_count: usize,
    /// Pairwise link threshold, world units.
    pub connection_distance: f32,
    /// Pointer link threshold, world units.
    pub pointer_connection_distance: f32,
    /// Soft reflection bounds: half extent per axis.
    pub bounds: Vec3,
    /// Spawn placement: half extent per axis.
    pub spawn_spread: Vec3,
    /// Spawn velocity: half range per axis, world units per frame.
    pub velocity_range: Vec3,
    /// Maps the normalized pointer offset onto anchor world x/y.
    pub pointer_anchor_scale: Vec2,
    /// Scene rotation added every frame regardless of the pointer.
    pub drift_rate: f32,
    /// Pointer offset to target-rotation factor.
    pub drift_pull: f32,
    /// Blend factor easing the rotation toward its target.
    pub drift_smoothing: f32,
}

impl FieldConfig {
    /// Config sized for a viewport of the given logical width: fewer
    /// particles on narrow viewports, since the pairwise connection
    /// pass is quadratic in the count.
    pub fn for_viewport(width: f32) -> Self {
        let particle_count = if width < NARROW_VIEWPORT_WIDTH {
            NARROW_PARTICLE_COUNT
        } else {
            WIDE_PARTICLE_COUNT
        };
        Self {
            particle_count,
            ..Self::default()
        }
    }

    /// Override the particle count.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    /// Override the pairwise link threshold.
    pub fn with_connection_distance(mut self, distance: f32) -> Self {
        self.connection_distance = distance;
        self
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: WIDE_PARTICLE_COUNT,
            connection_distance: 120.0,
            pointer_connection_distance: 150.0,
            bounds: Vec3::new(250.0, 200.0, 100.0),
            spawn_spread: Vec3::new(200.0, 150.0, 100.0),
            velocity_range: Vec3::new(0.1, 0.1, 0.05),
            pointer_anchor_scale: Vec2::new(120.0, 100.0),
            drift_rate: 0.0005,
            drift_pull: 0.001,
            drift_smoothing: 0.05,
        }
    }
}
