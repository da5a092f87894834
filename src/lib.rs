//! Building management simulation.
//!
//! Buildings are stacks of floors holding rooms; rooms carry timed sensors
//! and an optional hazard evaluator, and floors may rotate maintenance
//! through their rooms. A [`simulation::TickRegistry`] advances every sensor
//! and schedule one minute at a time, and [`persistence`] stores whole
//! buildings in a line-oriented text format.

pub mod config;
pub mod domain;
pub mod error;
pub mod hazard;
pub mod persistence;
pub mod recommender;
pub mod report;
pub mod simulation;
pub mod telemetry;

pub use error::BmsError;
