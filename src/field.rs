//! Particle field simulation.
//!
//! A [`ParticleField`] owns N particle bodies and, once per frame,
//! integrates their motion, reflects them off soft rectangular bounds,
//! and rebuilds the connection graph: a line segment for every pair of
//! particles closer than the connection threshold, plus a segment from
//! each particle near the pointer to a virtual anchor projected into
//! the particle coordinate space.
//!
//! Segments land in a [`ConnectionBuffer`] that is allocated once for
//! the worst case and never grows; only its used-length cursor changes
//! from frame to frame, so the renderer's draw range is the only thing
//! that varies.
//!
//! The pairwise pass is O(N²) on purpose: N stays small (60-120) and
//! the flat double loop beats a spatial index at that size while
//! keeping every candidate pair exact.

use glam::{Vec2, Vec3};

use crate::config::FieldConfig;
use crate::input::PointerSnapshot;

/// One particle body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Preallocated line-segment vertex storage.
///
/// Holds xyz floats for the segments of one frame. Capacity covers the
/// pairwise worst case plus headroom for one extra segment; the buffer
/// is reset (not reallocated) every frame and writes past capacity are
/// dropped, never grown into.
#[derive(Debug)]
pub struct ConnectionBuffer {
    data: Vec<f32>,
    used: usize,
}

impl ConnectionBuffer {
    /// Buffer sized for the worst case of `count` particles: every
    /// unordered pair connected, plus one more segment.
    pub fn for_particles(count: usize) -> Self {
        let capacity = count * count.saturating_sub(1) / 2 * 6 + 6;
        Self {
            data: vec![0.0; capacity],
            used: 0,
        }
    }

    /// Start a new frame: rewind the cursor, keep the allocation.
    pub fn reset(&mut self) {
        self.used = 0;
    }

    /// Total float capacity. Constant for the buffer's lifetime.
    pub fn capacity_floats(&self) -> usize {
        self.data.len()
    }

    /// Floats written this frame.
    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Number of line-list vertices written this frame.
    pub fn vertex_count(&self) -> u32 {
        (self.used / 3) as u32
    }

    /// The written prefix, xyz-interleaved.
    pub fn as_floats(&self) -> &[f32] {
        &self.data[..self.used]
    }

    fn push_segment(&mut self, a: Vec3, b: Vec3) {
        if self.used + 6 > self.data.len() {
            return;
        }
        self.write_segment(a, b);
    }

    /// Append a pointer segment, stopping early enough to leave
    /// headroom for one more write.
    fn push_pointer_segment(&mut self, a: Vec3, b: Vec3) {
        if self.used + 6 < self.data.len() {
            self.write_segment(a, b);
        }
    }

    fn write_segment(&mut self, a: Vec3, b: Vec3) {
        let dst = &mut self.data[self.used..self.used + 6];
        dst[0] = a.x;
        dst[1] = a.y;
        dst[2] = a.z;
        dst[3] = b.x;
        dst[4] = b.y;
        dst[5] = b.z;
        self.used += 6;
    }
}

/// Pointer-eased scene rotation. Purely cosmetic; independent of the
/// particle physics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneDrift {
    /// Rotation around x (from pointer y) and y (from pointer x).
    pub rotation: Vec2,
}

impl SceneDrift {
    fn advance(&mut self, pointer_offset: Vec2, config: &FieldConfig) {
        let target = pointer_offset * config.drift_pull;
        self.rotation.y += config.drift_rate + (target.x - self.rotation.y) * config.drift_smoothing;
        self.rotation.x += config.drift_rate + (target.y - self.rotation.x) * config.drift_smoothing;
    }
}

/// The particle field: bodies, flat position buffer, connection graph,
/// and scene drift.
pub struct ParticleField {
    config: FieldConfig,
    particles: Vec<Particle>,
    positions: Vec<f32>,
    connections: ConnectionBuffer,
    drift: SceneDrift,
    positions_dirty: bool,
}

impl ParticleField {
    /// Field with deterministic hash-placed particles: positions spread
    /// over `spawn_spread`, velocities over `velocity_range`.
    pub fn new(config: FieldConfig) -> Self {
        let spread = config.spawn_spread;
        let range = config.velocity_range;
        let particles = (0..config.particle_count)
            .map(|index| {
                let seed = index as u32 * 6;
                Particle {
                    position: Vec3::new(
                        (hash01(seed) - 0.5) * 2.0 * spread.x,
                        (hash01(seed + 1) - 0.5) * 2.0 * spread.y,
                        (hash01(seed + 2) - 0.5) * 2.0 * spread.z,
                    ),
                    velocity: Vec3::new(
                        (hash01(seed + 3) - 0.5) * 2.0 * range.x,
                        (hash01(seed + 4) - 0.5) * 2.0 * range.y,
                        (hash01(seed + 5) - 0.5) * 2.0 * range.z,
                    ),
                }
            })
            .collect();
        Self::with_particles(config, particles)
    }

    /// Field over caller-supplied particles. The config's
    /// `particle_count` is ignored in favor of the actual count.
    pub fn with_particles(mut config: FieldConfig, particles: Vec<Particle>) -> Self {
        config.particle_count = particles.len();
        let mut positions = vec![0.0; particles.len() * 3];
        for (index, particle) in particles.iter().enumerate() {
            positions[index * 3] = particle.position.x;
            positions[index * 3 + 1] = particle.position.y;
            positions[index * 3 + 2] = particle.position.z;
        }
        let connections = ConnectionBuffer::for_particles(particles.len());
        Self {
            config,
            particles,
            positions,
            connections,
            drift: SceneDrift::default(),
            positions_dirty: true,
        }
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Flat xyz position buffer, mirrored from the particles each step.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// This frame's connection graph.
    pub fn connections(&self) -> &ConnectionBuffer {
        &self.connections
    }

    /// Current scene drift rotation.
    pub fn drift(&self) -> SceneDrift {
        self.drift
    }

    /// Whether the position buffer changed since the last call, and
    /// clear the flag.
    pub fn take_positions_dirty(&mut self) -> bool {
        std::mem::take(&mut self.positions_dirty)
    }

    /// Advance one frame.
    ///
    /// Velocities are per-frame deltas; no dt scaling is applied, so
    /// motion speed follows the frame rate.
    pub fn step(&mut self, pointer: &PointerSnapshot) {
        self.drift.advance(pointer.offset(), &self.config);

        // Integrate and reflect, mirroring into the flat buffer.
        let bounds = self.config.bounds;
        for (index, particle) in self.particles.iter_mut().enumerate() {
            particle.position += particle.velocity;
            reflect(particle, bounds);
            let base = index * 3;
            self.positions[base] = particle.position.x;
            self.positions[base + 1] = particle.position.y;
            self.positions[base + 2] = particle.position.z;
        }

        // Pairwise connection graph.
        self.connections.reset();
        let link_sq = self.config.connection_distance * self.config.connection_distance;
        for i in 0..self.particles.len() {
            let a = self.particles[i].position;
            for j in i + 1..self.particles.len() {
                let b = self.particles[j].position;
                if a.distance_squared(b) < link_sq {
                    self.connections.push_segment(a, b);
                }
            }
        }

        // Pointer links: distance is tested in x/y only, and the anchor
        // segment keeps the particle's depth.
        let anchor = pointer_anchor(pointer, &self.config);
        let pointer_sq =
            self.config.pointer_connection_distance * self.config.pointer_connection_distance;
        for particle in &self.particles {
            let p = particle.position;
            let planar = Vec2::new(p.x, p.y) - anchor;
            if planar.length_squared() < pointer_sq {
                self.connections
                    .push_pointer_segment(p, Vec3::new(anchor.x, anchor.y, p.z));
            }
        }

        self.positions_dirty = true;
    }
}

/// Project the pointer into the particle coordinate space: the offset
/// normalized by the viewport half extents, scaled onto the anchor
/// plane, with y flipped from screen-down to world-up.
fn pointer_anchor(pointer: &PointerSnapshot, config: &FieldConfig) -> Vec2 {
    let n = pointer.normalized();
    Vec2::new(
        n.x * config.pointer_anchor_scale.x,
        -n.y * config.pointer_anchor_scale.y,
    )
}

/// Reflect off the soft bounds: past a half extent on any axis, invert
/// that axis's velocity. Position is never clamped, so a particle may
/// overshoot by up to one frame's travel before turning around.
fn reflect(particle: &mut Particle, bounds: Vec3) {
    let p = particle.position;
    if p.x < -bounds.x || p.x > bounds.x {
        particle.velocity.x = -particle.velocity.x;
    }
    if p.y < -bounds.y || p.y > bounds.y {
        particle.velocity.y = -particle.velocity.y;
    }
    if p.z < -bounds.z || p.z > bounds.z {
        particle.velocity.z = -particle.velocity.z;
    }
}

fn hash01(seed: u32) -> f32 {
    let x = seed.wrapping_mul(1103515245).wrapping_add(12345);
    let x = x ^ (x >> 16);
    (x & 0x7FFF_FFFF) as f32 / 0x7FFF_FFFF as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still(position: Vec3) -> Particle {
        Particle {
            position,
            velocity: Vec3::ZERO,
        }
    }

    fn centered_pointer() -> PointerSnapshot {
        PointerSnapshot::new(Vec2::ZERO, Vec2::new(640.0, 360.0))
    }

    fn far_pointer() -> PointerSnapshot {
        // Pointer parked in the bottom-left corner: the anchor lands at
        // (-120, -100), outside the pointer threshold of every particle
        // these tests place.
        PointerSnapshot::new(Vec2::new(-640.0, 360.0), Vec2::new(640.0, 360.0))
    }

    #[test]
    fn spawn_is_deterministic_and_inside_the_spread() {
        let config = FieldConfig::default();
        let a = ParticleField::new(config.clone());
        let b = ParticleField::new(config.clone());
        assert_eq!(a.particles(), b.particles());

        for particle in a.particles() {
            let p = particle.position;
            assert!(p.x.abs() <= config.spawn_spread.x);
            assert!(p.y.abs() <= config.spawn_spread.y);
            assert!(p.z.abs() <= config.spawn_spread.z);
        }
    }

    #[test]
    fn reflection_flips_velocity_without_clamping() {
        let mut particle = Particle {
            position: Vec3::new(251.0, 0.0, 0.0),
            velocity: Vec3::new(1.0, 0.0, 0.0),
        };
        reflect(&mut particle, FieldConfig::default().bounds);

        assert_eq!(particle.velocity.x, -1.0);
        // Still outside: reflection inverts velocity, it never teleports.
        assert_eq!(particle.position.x, 251.0);
    }

    #[test]
    fn close_pair_emits_one_segment() {
        let config = FieldConfig::default();
        let mut field = ParticleField::with_particles(
            config,
            vec![still(Vec3::ZERO), still(Vec3::new(50.0, 0.0, 0.0))],
        );
        field.step(&far_pointer());

        assert_eq!(field.connections().len(), 6);
        assert_eq!(field.connections().vertex_count(), 2);
        let floats = field.connections().as_floats();
        assert_eq!(&floats[..3], &[0.0, 0.0, 0.0]);
        assert_eq!(&floats[3..6], &[50.0, 0.0, 0.0]);
    }

    #[test]
    fn distant_pair_emits_nothing() {
        let mut field = ParticleField::with_particles(
            FieldConfig::default(),
            vec![still(Vec3::ZERO), still(Vec3::new(500.0, 0.0, 0.0))],
        );
        field.step(&far_pointer());

        assert!(field.connections().is_empty());
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut field = ParticleField::with_particles(
            FieldConfig::default(),
            vec![still(Vec3::ZERO), still(Vec3::new(120.0, 0.0, 0.0))],
        );
        field.step(&far_pointer());
        assert!(field.connections().is_empty());
    }

    #[test]
    fn buffer_resets_every_frame_without_reallocating() {
        let mut field = ParticleField::with_particles(
            FieldConfig::default(),
            vec![still(Vec3::ZERO), still(Vec3::new(50.0, 0.0, 0.0))],
        );
        let capacity = field.connections().capacity_floats();

        for _ in 0..10 {
            field.step(&far_pointer());
            assert_eq!(field.connections().len(), 6);
            assert_eq!(field.connections().capacity_floats(), capacity);
        }
    }

    #[test]
    fn float_budget_holds_under_saturation() {
        // Every pair in range and the pointer on top of the cluster: the
        // worst case the buffer is sized for.
        let n = 12;
        let particles: Vec<_> = (0..n)
            .map(|i| still(Vec3::new(i as f32 * 0.5, 0.0, 0.0)))
            .collect();
        let mut field = ParticleField::with_particles(FieldConfig::default(), particles);
        field.step(&centered_pointer());

        let budget = n * (n - 1) / 2 * 6 + 6;
        assert!(field.connections().len() <= budget);
        // The pairwise pass alone fills everything but the headroom.
        assert!(field.connections().len() >= budget - 6);
    }

    #[test]
    fn pointer_link_keeps_particle_depth() {
        let mut field = ParticleField::with_particles(
            FieldConfig::default(),
            vec![
                still(Vec3::new(10.0, 20.0, -42.0)),
                still(Vec3::new(400.0, 180.0, 0.0)),
            ],
        );
        field.step(&centered_pointer());

        // Centered pointer projects to the origin; only the first
        // particle is within the pointer threshold, and no pair links.
        let floats = field.connections().as_floats();
        assert_eq!(floats.len(), 6);
        assert_eq!(&floats[..3], &[10.0, 20.0, -42.0]);
        assert_eq!(&floats[3..6], &[0.0, 0.0, -42.0]);
    }

    #[test]
    fn pointer_distance_ignores_depth() {
        // 90 units away in the plane but 500 deep: still linked,
        // because the pointer test is planar.
        let mut field = ParticleField::with_particles(
            FieldConfig::default(),
            vec![
                still(Vec3::new(90.0, 0.0, 500.0)),
                still(Vec3::new(-400.0, -180.0, -50.0)),
            ],
        );
        field.step(&centered_pointer());
        assert_eq!(field.connections().vertex_count(), 2);
    }

    #[test]
    fn pointer_anchor_projects_and_flips_y() {
        let config = FieldConfig::default();
        // Pointer at the bottom-right edge of the viewport.
        let pointer = PointerSnapshot::new(Vec2::new(640.0, 360.0), Vec2::new(640.0, 360.0));
        let anchor = pointer_anchor(&pointer, &config);

        assert_eq!(anchor, Vec2::new(120.0, -100.0));
    }

    #[test]
    fn drift_eases_toward_the_pointer_target() {
        let config = FieldConfig::default();
        let mut field = ParticleField::with_particles(config.clone(), vec![still(Vec3::ZERO)]);

        let pointer = PointerSnapshot::new(Vec2::new(200.0, 0.0), Vec2::new(640.0, 360.0));
        for _ in 0..2000 {
            field.step(&pointer);
        }

        // Yaw converges near target + rate/smoothing; pitch sees a zero
        // pointer component and settles at the drift floor.
        let target_y = 200.0 * config.drift_pull + config.drift_rate / config.drift_smoothing;
        assert!((field.drift().rotation.y - target_y).abs() < 1e-3);
        let floor = config.drift_rate / config.drift_smoothing;
        assert!((field.drift().rotation.x - floor).abs() < 1e-3);
    }

    #[test]
    fn moving_particle_updates_the_flat_buffer() {
        let mut field = ParticleField::with_particles(
            FieldConfig::default(),
            vec![Particle {
                position: Vec3::new(1.0, 2.0, 3.0),
                velocity: Vec3::new(0.5, -0.5, 0.25),
            }],
        );
        assert!(field.take_positions_dirty());

        field.step(&far_pointer());
        assert!(field.take_positions_dirty());
        assert!(!field.take_positions_dirty());
        assert_eq!(field.positions(), &[1.5, 1.5, 3.25]);
    }
}
