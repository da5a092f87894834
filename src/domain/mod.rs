pub mod building;
pub mod floor;
pub mod room;
pub mod sensor;

pub use building::*;
pub use floor::*;
pub use room::*;
pub use sensor::*;

/// Areas and dimensions are held to the two decimals the save format
/// records, so a model that validates in memory loads back identically.
pub(crate) fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
