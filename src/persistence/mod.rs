//! # Save File Codec
//!
//! Line-oriented text format for whole buildings. A file is a sequence of
//! building records:
//!
//! ```text
//! <name>
//! <floor count>
//! <floorNumber>:<width>:<length>:<roomCount>[:<room>,<room>,...]
//! <roomNumber>:<STUDY|OFFICE|LABORATORY>:<area>:<sensorCount>[:RuleBased|:WeightingBased]
//! TemperatureSensor:<r1,r2,...>[@weight]
//! NoiseSensor:<readings>:<frequency>[@weight]
//! OccupancySensor:<readings>:<frequency>:<capacity>[@weight]
//! CarbonDioxideSensor:<readings>:<frequency>:<ideal>:<variation>[@weight]
//! ```
//!
//! Decoding either yields every building in the source or a single
//! [`LoadError`]; nothing from a rejected source reaches the caller's
//! [`TickRegistry`].

mod decoder;
mod encoder;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::Building;
use crate::error::BmsError;
use crate::simulation::TickRegistry;

pub use encoder::{encode_buildings, save_buildings};

/// Grammar or validation failure while decoding, located by 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct FormatError {
    pub line: usize,
    pub message: String,
}

impl FormatError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    /// Wrap a model validation failure; only its message is kept.
    pub(crate) fn from_domain(line: usize, error: BmsError) -> Self {
        Self::new(line, error.to_string())
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),
}

/// Load every building stored in the file at `path`.
///
/// Sensors and maintenance schedules of the loaded model are registered with
/// `registry` only when the whole file decodes successfully.
pub fn load_buildings(
    path: impl AsRef<Path>,
    registry: &mut TickRegistry,
) -> Result<Vec<Building>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let buildings = read_buildings(BufReader::new(file), registry);

    match &buildings {
        Ok(buildings) => info!(
            path = %path.display(),
            buildings = buildings.len(),
            "loaded save file"
        ),
        Err(error) => warn!(path = %path.display(), %error, "rejected save file"),
    }
    buildings
}

/// Decode buildings from any buffered source.
pub fn read_buildings<R: BufRead>(
    reader: R,
    registry: &mut TickRegistry,
) -> Result<Vec<Building>, LoadError> {
    let lines = reader.lines().collect::<Result<Vec<_>, _>>()?;
    let (buildings, staged) = decoder::decode(&lines)?;
    registry.absorb(staged);
    Ok(buildings)
}
