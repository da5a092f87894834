use thiserror::Error;

use crate::domain::SensorKind;

/// Errors raised by building, floor and room construction and mutation.
///
/// Configuration errors fail a constructor outright; structural errors are
/// returned by the owning collection's insertion and leave it unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BmsError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Duplicate sensor of type: {0}")]
    DuplicateSensor(SensorKind),

    #[error("The room number {0} is already taken on this floor")]
    DuplicateRoom(i32),

    #[error("Floor number {0} already exists in this building")]
    DuplicateFloor(i32),

    #[error("Floor {0} has no floor below it")]
    NoFloorBelow(i32),

    #[error("Floor {floor_number} ({area:.2}m^2) is larger than the floor below it ({below_area:.2}m^2)")]
    InsufficientFloorSupport {
        floor_number: i32,
        area: f64,
        below_area: f64,
    },

    #[error("New floor area {requested_area:.2}m^2 cannot hold occupied area {occupied_area:.2}m^2")]
    FloorTooSmall {
        requested_area: f64,
        occupied_area: f64,
    },

    #[error("Insufficient space to add room. Floor area: {floor_area:.2}m^2, Occupied area: {occupied_area:.2}m^2, This room: {room_area:.2}m^2")]
    InsufficientSpace {
        floor_area: f64,
        occupied_area: f64,
        room_area: f64,
    },

    #[error("Fire drill cannot be started: {0}")]
    FireDrill(String),
}

impl BmsError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        BmsError::InvalidConfiguration(message.into())
    }
}
