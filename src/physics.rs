//! Magnetic and floating element physics.
//!
//! A [`MagneticElement`] binds two [`SpringSolver`]s to one UI
//! element's translation offset. In [`Mode::Magnetic`] the element is
//! pulled toward the pointer while it hovers inside the element's
//! rectangle and relaxes back to rest when it leaves; in
//! [`Mode::Floating`] the element drifts with a global parallax
//! derived from the pointer's offset from the viewport center.
//!
//! A [`PhysicsWorld`] owns the elements and advances them once per
//! frame with a clamped delta time. Elements receive the frame's
//! pointer snapshot through the world rather than subscribing to
//! events themselves, so there is one dispatcher and one poll per
//! frame.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use plexus::input::PointerSnapshot;
//! use plexus::physics::{ElementHost, MagneticElement, PhysicsWorld, Rect};
//!
//! struct Card {
//!     offset: Vec2,
//! }
//!
//! impl ElementHost for Card {
//!     fn bounds(&self) -> Rect {
//!         Rect::new(100.0, 100.0, 200.0, 80.0)
//!     }
//!     fn apply_translation(&mut self, offset: Vec2) {
//!         self.offset = offset;
//!     }
//! }
//!
//! let mut world = PhysicsWorld::new();
//! world.add_element(MagneticElement::magnetic(Box::new(Card {
//!     offset: Vec2::ZERO,
//! })));
//!
//! let pointer = PointerSnapshot::new(Vec2::ZERO, Vec2::new(640.0, 360.0));
//! world.advance(1.0 / 60.0, &pointer);
//! ```

use glam::Vec2;
use std::time::Instant;

use crate::input::PointerSnapshot;
use crate::spring::SpringSolver;

/// Hard cap on the per-tick timestep, in seconds.
///
/// A stalled host (backgrounded window, long pause) produces a huge
/// raw delta; integrating it in one step would blow the springs up.
pub const MAX_TICK_DELTA: f32 = 0.1;

/// Offsets and velocities below this magnitude count as settled.
const SLEEP_EPSILON: f32 = 0.01;

/// Fraction of the pointer's offset from an element's center that
/// becomes the magnetic spring target.
const MAGNETIC_PULL: f32 = 0.5;

/// Fraction of the pointer's offset from the viewport center that
/// becomes the floating parallax target.
const FLOATING_PULL: f32 = 0.02;

/// Stiff tuning for the snappy magnetic response.
const MAGNETIC_SPRING: (f32, f32) = (120.0, 12.0);

/// Soft tuning for the ambient floating drift.
const FLOATING_SPRING: (f32, f32) = (20.0, 5.0);

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Whether a point lies inside (edges inclusive).
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Host-side integration point for a physics-driven element.
///
/// The physics core never touches a host except through this trait: it
/// reads the on-screen rectangle (lazily, cached between pointer-leave
/// events) and writes a 2D translation offset. Nothing else about the
/// host is visible to the simulation.
pub trait ElementHost {
    /// Current on-screen rectangle, in the same coordinate space as
    /// pointer positions.
    fn bounds(&self) -> Rect;

    /// Apply a translation offset in logical pixels.
    fn apply_translation(&mut self, offset: Vec2);
}

/// Element behavior mode. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Track the pointer while it hovers inside the element.
    Magnetic,
    /// Drift with the global pointer parallax.
    Floating,
}

/// One spring-driven element.
pub struct MagneticElement {
    host: Box<dyn ElementHost>,
    spring_x: SpringSolver,
    spring_y: SpringSolver,
    mode: Mode,
    active: bool,
    bounds: Rect,
    bounds_valid: bool,
}

impl MagneticElement {
    /// Magnetic element with the stock stiff tuning.
    pub fn magnetic(host: Box<dyn ElementHost>) -> Self {
        let (tension, friction) = MAGNETIC_SPRING;
        Self::with_springs(host, Mode::Magnetic, tension, friction)
    }

    /// Floating element with the stock soft tuning.
    pub fn floating(host: Box<dyn ElementHost>) -> Self {
        let (tension, friction) = FLOATING_SPRING;
        Self::with_springs(host, Mode::Floating, tension, friction)
    }

    /// Element with caller-chosen spring tuning.
    pub fn with_springs(host: Box<dyn ElementHost>, mode: Mode, tension: f32, friction: f32) -> Self {
        Self {
            host,
            spring_x: SpringSolver::new(tension, friction),
            spring_y: SpringSolver::new(tension, friction),
            mode,
            active: false,
            bounds: Rect::default(),
            bounds_valid: false,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the pointer is currently engaged with this element.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Drop the cached rectangle so the next containment test refetches
    /// it from the host.
    pub fn invalidate_bounds(&mut self) {
        self.bounds_valid = false;
    }

    fn cached_bounds(&mut self) -> Rect {
        if !self.bounds_valid {
            self.bounds = self.host.bounds();
            self.bounds_valid = true;
        }
        self.bounds
    }

    /// Derive spring targets from the frame's pointer snapshot.
    ///
    /// Enter and leave transitions come from containment tests against
    /// the cached rectangle; the rectangle is refetched at most once
    /// per invalidation, never per frame.
    fn track(&mut self, pointer: &PointerSnapshot) {
        match self.mode {
            Mode::Magnetic => {
                let rect = self.cached_bounds();
                let position = pointer.position();
                if rect.contains(position) {
                    self.active = true;
                    let local = position - rect.center();
                    self.spring_x.set_target(local.x * MAGNETIC_PULL);
                    self.spring_y.set_target(local.y * MAGNETIC_PULL);
                } else if self.active {
                    self.active = false;
                    self.spring_x.set_target(0.0);
                    self.spring_y.set_target(0.0);
                    self.bounds_valid = false;
                }
            }
            Mode::Floating => {
                let target = pointer.offset() * FLOATING_PULL;
                self.spring_x.set_target(target.x);
                self.spring_y.set_target(target.y);
            }
        }
    }

    /// Advance both springs and write the element's translation.
    ///
    /// A settled, unengaged element skips the host write entirely so
    /// idle elements cost nothing downstream.
    pub fn render(&mut self, dt: f32) {
        let x = self.spring_x.update(dt);
        let y = self.spring_y.update(dt);

        if !self.active
            && x.abs() < SLEEP_EPSILON
            && y.abs() < SLEEP_EPSILON
            && self.spring_x.velocity().abs() < SLEEP_EPSILON
            && self.spring_y.velocity().abs() < SLEEP_EPSILON
        {
            return;
        }

        self.host.apply_translation(Vec2::new(x, y));
    }
}

/// Owner of all spring-driven elements and their frame tick.
///
/// Elements are independent; insertion order is update order.
#[derive(Default)]
pub struct PhysicsWorld {
    elements: Vec<MagneticElement>,
    last_tick: Option<Instant>,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element. The world owns it for the rest of its life.
    pub fn add_element(&mut self, element: MagneticElement) {
        self.elements.push(element);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Advance from wall-clock time.
    ///
    /// The first tick integrates nothing (dt = 0); subsequent ticks use
    /// the elapsed time since the previous one, clamped by
    /// [`MAX_TICK_DELTA`].
    pub fn tick(&mut self, now: Instant, pointer: &PointerSnapshot) {
        let dt = match self.last_tick {
            Some(prev) => now.duration_since(prev).as_secs_f32(),
            None => 0.0,
        };
        self.last_tick = Some(now);
        self.advance(dt, pointer);
    }

    /// Advance by a raw delta in seconds.
    ///
    /// The clamp happens here, before any spring sees the value, so a
    /// stalled-host delta of 5.0 integrates exactly like 0.1.
    pub fn advance(&mut self, dt: f32, pointer: &PointerSnapshot) {
        let dt = dt.min(MAX_TICK_DELTA);
        for element in &mut self.elements {
            element.track(pointer);
            element.render(dt);
        }
    }

    /// Invalidate every element's cached rectangle.
    ///
    /// Call on viewport resize or scroll, when host geometry may have
    /// moved under the cache.
    pub fn invalidate_bounds(&mut self) {
        for element in &mut self.elements {
            element.invalidate_bounds();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const DT: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct HostState {
        rect: Rect,
        writes: Vec<Vec2>,
        fetches: u32,
    }

    #[derive(Clone)]
    struct SharedHost(Rc<RefCell<HostState>>);

    impl SharedHost {
        fn new(rect: Rect) -> Self {
            Self(Rc::new(RefCell::new(HostState {
                rect,
                ..Default::default()
            })))
        }

        fn last_write(&self) -> Option<Vec2> {
            self.0.borrow().writes.last().copied()
        }

        fn write_count(&self) -> usize {
            self.0.borrow().writes.len()
        }

        fn fetch_count(&self) -> u32 {
            self.0.borrow().fetches
        }
    }

    impl ElementHost for SharedHost {
        fn bounds(&self) -> Rect {
            let mut state = self.0.borrow_mut();
            state.fetches += 1;
            state.rect
        }

        fn apply_translation(&mut self, offset: Vec2) {
            self.0.borrow_mut().writes.push(offset);
        }
    }

    fn snapshot_at(position: Vec2) -> PointerSnapshot {
        let half = Vec2::new(640.0, 360.0);
        PointerSnapshot::new(position - half, half)
    }

    #[test]
    fn magnetic_pull_targets_half_the_center_offset() {
        let host = SharedHost::new(Rect::new(100.0, 100.0, 200.0, 100.0));
        let mut world = PhysicsWorld::new();
        world.add_element(MagneticElement::magnetic(Box::new(host.clone())));

        // 40 px right of center, 10 px above.
        let pointer = snapshot_at(Vec2::new(240.0, 140.0));
        for _ in 0..600 {
            world.advance(DT, &pointer);
        }

        let settled = host.last_write().unwrap();
        assert!((settled.x - 20.0).abs() < 0.05, "x settled at {}", settled.x);
        assert!((settled.y + 5.0).abs() < 0.05, "y settled at {}", settled.y);
    }

    #[test]
    fn pointer_at_center_settles_to_zero() {
        let rect = Rect::new(100.0, 100.0, 200.0, 100.0);
        let host = SharedHost::new(rect);
        let mut world = PhysicsWorld::new();
        world.add_element(MagneticElement::magnetic(Box::new(host.clone())));

        let pointer = snapshot_at(rect.center());
        for _ in 0..600 {
            world.advance(DT, &pointer);
        }

        let settled = host.last_write().unwrap();
        assert!(settled.x.abs() < 0.01);
        assert!(settled.y.abs() < 0.01);
    }

    #[test]
    fn leave_relaxes_back_to_rest() {
        let host = SharedHost::new(Rect::new(100.0, 100.0, 200.0, 100.0));
        let mut world = PhysicsWorld::new();
        world.add_element(MagneticElement::magnetic(Box::new(host.clone())));

        let inside = snapshot_at(Vec2::new(280.0, 180.0));
        for _ in 0..120 {
            world.advance(DT, &inside);
        }
        assert!(host.last_write().unwrap().length() > 1.0);

        let outside = snapshot_at(Vec2::new(600.0, 600.0));
        for _ in 0..600 {
            world.advance(DT, &outside);
        }

        let settled = host.last_write().unwrap();
        assert!(settled.length() < 0.05, "settled at {settled}");
    }

    #[test]
    fn bounds_refetch_once_per_enter_cycle() {
        let rect = Rect::new(100.0, 100.0, 200.0, 100.0);
        let host = SharedHost::new(rect);
        let mut world = PhysicsWorld::new();
        world.add_element(MagneticElement::magnetic(Box::new(host.clone())));

        let inside = snapshot_at(rect.center());
        let outside = snapshot_at(Vec2::new(900.0, 600.0));

        for _ in 0..50 {
            world.advance(DT, &inside);
        }
        assert_eq!(host.fetch_count(), 1);

        // Leaving invalidates; the next containment test refetches once.
        world.advance(DT, &outside);
        for _ in 0..50 {
            world.advance(DT, &outside);
        }
        assert_eq!(host.fetch_count(), 2);

        for _ in 0..50 {
            world.advance(DT, &inside);
        }
        assert_eq!(host.fetch_count(), 2);
    }

    #[test]
    fn resize_invalidation_forces_a_refetch() {
        let rect = Rect::new(100.0, 100.0, 200.0, 100.0);
        let host = SharedHost::new(rect);
        let mut world = PhysicsWorld::new();
        world.add_element(MagneticElement::magnetic(Box::new(host.clone())));

        let inside = snapshot_at(rect.center());
        world.advance(DT, &inside);
        assert_eq!(host.fetch_count(), 1);

        world.invalidate_bounds();
        world.advance(DT, &inside);
        assert_eq!(host.fetch_count(), 2);
    }

    #[test]
    fn floating_targets_track_the_global_parallax() {
        let host = SharedHost::new(Rect::default());
        let mut world = PhysicsWorld::new();
        world.add_element(MagneticElement::floating(Box::new(host.clone())));

        // 100 px right of viewport center, 50 below.
        let half = Vec2::new(640.0, 360.0);
        let pointer = PointerSnapshot::new(Vec2::new(100.0, 50.0), half);
        for _ in 0..900 {
            world.advance(DT, &pointer);
        }

        let settled = host.last_write().unwrap();
        assert!((settled.x - 2.0).abs() < 0.05);
        assert!((settled.y - 1.0).abs() < 0.05);
    }

    #[test]
    fn settled_idle_element_skips_host_writes() {
        let host = SharedHost::new(Rect::default());
        let mut world = PhysicsWorld::new();
        world.add_element(MagneticElement::floating(Box::new(host.clone())));

        // Pointer parked at the viewport center: targets are zero and the
        // springs never leave rest, so no write should ever land.
        let pointer = PointerSnapshot::new(Vec2::ZERO, Vec2::new(640.0, 360.0));
        for _ in 0..60 {
            world.advance(DT, &pointer);
        }

        assert_eq!(host.write_count(), 0);
    }

    #[test]
    fn stalled_delta_is_clamped_before_integration() {
        let rect = Rect::new(100.0, 100.0, 200.0, 100.0);
        let pointer = snapshot_at(Vec2::new(280.0, 180.0));

        let run = |dt: f32| {
            let host = SharedHost::new(rect);
            let mut world = PhysicsWorld::new();
            world.add_element(MagneticElement::magnetic(Box::new(host.clone())));
            world.advance(dt, &pointer);
            host.last_write().unwrap()
        };

        // A 5 s stall and an exact 0.1 s step must integrate identically.
        assert_eq!(run(5.0), run(MAX_TICK_DELTA));
        assert_ne!(run(5.0), run(0.05));
    }

    #[test]
    fn tick_uses_elapsed_wall_clock() {
        let rect = Rect::new(100.0, 100.0, 200.0, 100.0);
        let host = SharedHost::new(rect);
        let mut world = PhysicsWorld::new();
        world.add_element(MagneticElement::magnetic(Box::new(host.clone())));

        let pointer = snapshot_at(Vec2::new(280.0, 180.0));
        let start = Instant::now();
        world.tick(start, &pointer);
        // First tick integrates nothing; the pointer is inside, so the
        // write still happens but stays at rest.
        assert_eq!(host.last_write().unwrap(), Vec2::ZERO);

        world.tick(start + std::time::Duration::from_millis(16), &pointer);
        assert!(host.last_write().unwrap() != Vec2::ZERO);
    }
}
