//! Collision event filtering and broadcast

use std::fmt;

use serde::Serialize;

use super::surface::{Surface, SurfaceId};
use crate::consts::LINT_TRAP_THRESHOLD;

/// Callback invoked for every dispatched collision
pub type CollisionListener = Box<dyn FnMut(&Surface, f32)>;

/// Counters kept by the dispatcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub dispatched: u64,
    pub suppressed_lint: u64,
    pub suppressed_debounce: u64,
}

/// Filters collision candidates and notifies listeners in registration order.
///
/// Repeated hits on the surface that fired last are dropped, so a ball
/// resting against one surface fires once rather than every step.
pub struct Dispatcher {
    listeners: Vec<CollisionListener>,
    last_surface: Option<SurfaceId>,
    lint_trap: bool,
    lint_threshold: f32,
    stats: DispatchStats,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("listeners", &self.listeners.len())
            .field("last_surface", &self.last_surface)
            .field("lint_trap", &self.lint_trap)
            .field("lint_threshold", &self.lint_threshold)
            .field("stats", &self.stats)
            .finish()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            last_surface: None,
            lint_trap: false,
            lint_threshold: LINT_TRAP_THRESHOLD,
            stats: DispatchStats::default(),
        }
    }

    /// Append a listener; there is no removal
    pub fn subscribe(&mut self, listener: CollisionListener) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn set_lint_trap(&mut self, enabled: bool) {
        self.lint_trap = enabled;
    }

    pub fn lint_trap(&self) -> bool {
        self.lint_trap
    }

    pub fn set_lint_threshold(&mut self, threshold: f32) {
        self.lint_threshold = threshold.max(0.0);
    }

    pub fn lint_threshold(&self) -> f32 {
        self.lint_threshold
    }

    /// Surface of the most recent dispatch
    pub fn last_surface(&self) -> Option<SurfaceId> {
        self.last_surface
    }

    /// Forget the last dispatched surface (its identifier no longer exists)
    pub fn forget_last(&mut self) {
        self.last_surface = None;
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Filter one candidate and broadcast it if it survives.
    ///
    /// Returns true when listeners were called.
    pub fn consider_collision(&mut self, surface: &Surface, speed: f32) -> bool {
        if self.lint_trap && speed < self.lint_threshold {
            self.stats.suppressed_lint += 1;
            return false;
        }

        if self.last_surface == Some(surface.id) {
            self.stats.suppressed_debounce += 1;
            return false;
        }

        self.last_surface = Some(surface.id);
        self.stats.dispatched += 1;
        log::trace!("Collision {} at {:.3} m/s", surface.id, speed);

        for listener in &mut self.listeners {
            listener(surface, speed);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::surface::regenerate;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording(dispatcher: &mut Dispatcher) -> Rc<RefCell<Vec<(SurfaceId, f32)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        dispatcher.subscribe(Box::new(move |s: &Surface, v: f32| sink.borrow_mut().push((s.id, v))));
        log
    }

    #[test]
    fn test_debounce_same_surface() {
        let surfaces = regenerate(3);
        let mut dispatcher = Dispatcher::new();
        let log = recording(&mut dispatcher);

        assert!(dispatcher.consider_collision(&surfaces[0], 1.0));
        assert!(!dispatcher.consider_collision(&surfaces[0], 1.2));
        assert!(dispatcher.consider_collision(&surfaces[1], 0.5));
        assert!(dispatcher.consider_collision(&surfaces[0], 0.7));

        let ids: Vec<SurfaceId> = log.borrow().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![surfaces[0].id, surfaces[1].id, surfaces[0].id]);
        assert_eq!(dispatcher.stats().suppressed_debounce, 1);
    }

    #[test]
    fn test_lint_trap_threshold() {
        let surfaces = regenerate(2);
        let mut dispatcher = Dispatcher::new();
        let log = recording(&mut dispatcher);
        dispatcher.set_lint_trap(true);

        assert!(!dispatcher.consider_collision(&surfaces[0], LINT_TRAP_THRESHOLD * 0.99));
        assert!(dispatcher.consider_collision(&surfaces[0], LINT_TRAP_THRESHOLD));
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(dispatcher.stats().suppressed_lint, 1);

        // A suppressed hit does not count for debounce
        dispatcher.set_lint_trap(false);
        assert!(dispatcher.consider_collision(&surfaces[1], 0.01));
    }

    #[test]
    fn test_lint_drop_does_not_update_last_surface() {
        let surfaces = regenerate(2);
        let mut dispatcher = Dispatcher::new();
        dispatcher.set_lint_trap(true);
        assert!(dispatcher.consider_collision(&surfaces[0], 1.0));
        assert!(!dispatcher.consider_collision(&surfaces[3], 0.01));
        assert_eq!(dispatcher.last_surface(), Some(surfaces[0].id));
        assert!(!dispatcher.consider_collision(&surfaces[0], 1.0));
    }

    #[test]
    fn test_listeners_called_in_order() {
        let surfaces = regenerate(1);
        let mut dispatcher = Dispatcher::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in 0..3 {
            let order = Rc::clone(&order);
            dispatcher.subscribe(Box::new(move |_: &Surface, _: f32| order.borrow_mut().push(tag)));
        }
        dispatcher.consider_collision(&surfaces[2], 1.0);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert_eq!(dispatcher.listener_count(), 3);
    }

    #[test]
    fn test_forget_last_allows_repeat() {
        let surfaces = regenerate(1);
        let mut dispatcher = Dispatcher::new();
        assert!(dispatcher.consider_collision(&surfaces[0], 1.0));
        dispatcher.forget_last();
        assert!(dispatcher.consider_collision(&surfaces[0], 1.0));
        assert_eq!(dispatcher.stats().dispatched, 2);
    }
}
