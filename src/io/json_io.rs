use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::CruiseError;
use crate::io::sheet::CruiseSheet;

/// Read a normalized cruise sheet from a JSON file.
pub fn read_json(path: impl AsRef<Path>) -> Result<CruiseSheet, CruiseError> {
    let file = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Write a normalized cruise sheet to a JSON file.
pub fn write_json(
    sheet: &CruiseSheet,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), CruiseError> {
    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(writer, sheet)?;
    } else {
        serde_json::to_writer(writer, sheet)?;
    }
    Ok(())
}
