//! # Simulation Clock
//!
//! Drives the building model forward in one-minute steps.
//!
//! ## Components
//!
//! - **TickRegistry**: Owns the list of timed items and broadcasts each tick to them
//! - **MaintenanceSchedule**: Rotates maintenance through a floor's rooms as minutes pass
//!
//! ## Usage
//!
//! ```rust
//! use bms::domain::Sensor;
//! use bms::simulation::TickRegistry;
//!
//! let mut registry = TickRegistry::new();
//! let noise = registry.register_sensor(Sensor::noise(vec![55, 67], 1).unwrap());
//!
//! registry.tick();
//! assert_eq!(noise.borrow().current_reading(), 67);
//! ```

pub mod maintenance;
pub mod registry;

pub use maintenance::{MaintenanceSchedule, SharedSchedule};
pub use registry::{TickRegistry, TimedItem};
