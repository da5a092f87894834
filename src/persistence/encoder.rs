use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use tracing::info;

use crate::domain::Building;

/// Newline-joined encoding of every building, without a trailing newline.
pub fn encode_buildings(buildings: &[Building]) -> String {
    buildings.iter().map(Building::encode).join("\n")
}

/// Write `buildings` to `path`, terminated by a single newline.
///
/// An empty slice produces an empty file, which decodes back to no buildings.
pub fn save_buildings(path: impl AsRef<Path>, buildings: &[Building]) -> io::Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    if !buildings.is_empty() {
        writer.write_all(encode_buildings(buildings).as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    info!(
        path = %path.display(),
        buildings = buildings.len(),
        "saved buildings"
    );
    Ok(())
}
