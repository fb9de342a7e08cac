//! # Plexus
//!
//! Animated particle-network backgrounds with springy pointer physics.
//!
//! Plexus is the simulation core behind a "constellation" page
//! background: a 3D particle field whose nearby particles are joined by
//! line segments, with extra segments reaching toward the pointer, plus
//! a spring-physics layer that lets UI elements chase or drift with the
//! pointer.
//!
//! ## Quick Start
//!
//! Run the built-in window shell:
//!
//! ```ignore
//! fn main() -> Result<(), plexus::AppError> {
//!     plexus::window::run()
//! }
//! ```
//!
//! Or drive the pieces yourself:
//!
//! ```
//! use glam::Vec2;
//! use plexus::{FieldConfig, ParticleField, PointerTracker};
//!
//! let mut field = ParticleField::new(FieldConfig::for_viewport(1280.0));
//! let mut pointer = PointerTracker::new(1280.0, 720.0);
//!
//! // Per frame:
//! pointer.pointer_moved(800.0, 300.0);
//! field.step(&pointer.snapshot());
//!
//! // Hand these to a renderer:
//! let _positions = field.positions();
//! let _line_vertices = field.connections().vertex_count();
//! ```
//!
//! ## Core Concepts
//!
//! ### Particle field
//!
//! [`ParticleField`] integrates particle motion per frame (velocities
//! are per-frame deltas), reflects particles off soft bounds by
//! inverting velocity, and rebuilds a [`ConnectionBuffer`] of line
//! segments: one per particle pair within the connection distance, and
//! one from each pointer-adjacent particle to a virtual anchor. The
//! buffer is preallocated for the worst case; only its used length
//! changes per frame, so the renderer just moves a draw range.
//!
//! ### Spring physics
//!
//! [`SpringSolver`] is a one-axis spring-damper integrator.
//! [`MagneticElement`] pairs two of them to drive an element's 2D
//! translation, either chasing the pointer inside the element's
//! rectangle ([`Mode::Magnetic`]) or drifting with a global parallax
//! ([`Mode::Floating`]). [`PhysicsWorld`] owns the elements and ticks
//! them with a clamped delta time, skipping writes for settled idle
//! elements.
//!
//! ### Pointer input
//!
//! Window events feed a [`PointerTracker`]; each frame takes one
//! immutable [`PointerSnapshot`] that both subsystems read. One writer,
//! one frame-scoped read, no shared mutable state.

pub mod config;
pub mod error;
pub mod field;
mod gpu;
pub mod input;
pub mod physics;
pub mod spring;
pub mod time;
pub mod window;

pub use glam::{Vec2, Vec3};

pub use config::FieldConfig;
pub use error::{AppError, GpuError};
pub use field::{ConnectionBuffer, Particle, ParticleField, SceneDrift};
pub use input::{PointerSnapshot, PointerTracker};
pub use physics::{ElementHost, MagneticElement, Mode, PhysicsWorld, Rect};
pub use spring::SpringSolver;
pub use time::FrameClock;

/// Convenient re-exports for common usage.
///
/// ```
/// use plexus::prelude::*;
///
/// let config = FieldConfig::for_viewport(1280.0);
/// assert_eq!(config.particle_count, 120);
/// ```
pub mod prelude {
    pub use crate::config::FieldConfig;
    pub use crate::error::{AppError, GpuError};
    pub use crate::field::{ConnectionBuffer, Particle, ParticleField, SceneDrift};
    pub use crate::input::{PointerSnapshot, PointerTracker};
    pub use crate::physics::{ElementHost, MagneticElement, Mode, PhysicsWorld, Rect};
    pub use crate::spring::SpringSolver;
    pub use crate::time::FrameClock;
    pub use crate::{Vec2, Vec3};
}
