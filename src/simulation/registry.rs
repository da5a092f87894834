//! # Tick Registry
//!
//! The registry holds weak handles to every timed item created while building
//! or loading a model. Items stay owned by their rooms and floors; once an
//! item is dropped its slot is skipped on every later tick but never removed.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::domain::{Sensor, SharedSensor};

/// Anything that advances with the simulated clock.
pub trait TimedItem {
    /// Advance this item by one simulated minute.
    fn elapse_one_minute(&mut self);
}

/// Ordered set of timed items ticked together.
#[derive(Default)]
pub struct TickRegistry {
    items: Vec<Weak<RefCell<dyn TimedItem>>>,
    elapsed_minutes: u64,
}

impl TickRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item; it is ticked after everything registered before it.
    pub fn register<T: TimedItem + 'static>(&mut self, item: &Rc<RefCell<T>>) {
        let erased: Rc<RefCell<dyn TimedItem>> = item.clone();
        self.items.push(Rc::downgrade(&erased));
    }

    /// Share a sensor and register it in one step.
    pub fn register_sensor(&mut self, sensor: Sensor) -> SharedSensor {
        let shared = sensor.into_shared();
        self.register(&shared);
        shared
    }

    /// Advance every live item by one minute, in registration order.
    pub fn tick(&mut self) {
        self.elapsed_minutes += 1;
        let mut advanced = 0usize;
        for item in self.items.iter().filter_map(Weak::upgrade) {
            item.borrow_mut().elapse_one_minute();
            advanced += 1;
        }
        trace!(
            minute = self.elapsed_minutes,
            advanced,
            registered = self.items.len(),
            "tick"
        );
    }

    /// Number of registration slots, including ones whose item was dropped.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items still alive.
    pub fn live_count(&self) -> usize {
        self.items.iter().filter(|item| item.strong_count() > 0).count()
    }

    /// Minutes ticked since the registry was created.
    pub fn elapsed_minutes(&self) -> u64 {
        self.elapsed_minutes
    }

    /// Append every registration of `other`, keeping its order.
    pub fn absorb(&mut self, other: TickRegistry) {
        self.items.extend(other.items);
    }
}

impl fmt::Debug for TickRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickRegistry")
            .field("registered", &self.items.len())
            .field("live", &self.live_count())
            .field("elapsed_minutes", &self.elapsed_minutes)
            .finish()
    }
}
