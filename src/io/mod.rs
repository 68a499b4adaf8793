mod csv_io;
mod excel_io;
mod export;
mod json_io;
pub mod sheet;

use std::path::Path;

use crate::error::CruiseError;
use sheet::CruiseSheet;

pub use csv_io::read_csv;
pub use excel_io::read_excel;
pub use export::{inventory_rows, write_inventory_csv, write_inventory_xlsx};
pub use json_io::{read_json, write_json};

/// Trait for reading a normalized cruise sheet from a file.
pub trait SheetReader {
    fn read(&self, path: &Path) -> Result<CruiseSheet, CruiseError>;
}

/// CSV format reader.
pub struct CsvFormat;

impl SheetReader for CsvFormat {
    fn read(&self, path: &Path) -> Result<CruiseSheet, CruiseError> {
        read_csv(path)
    }
}

/// JSON format reader.
pub struct JsonFormat;

impl SheetReader for JsonFormat {
    fn read(&self, path: &Path) -> Result<CruiseSheet, CruiseError> {
        read_json(path)
    }
}

/// Excel (.xlsx) format reader.
pub struct ExcelFormat;

impl SheetReader for ExcelFormat {
    fn read(&self, path: &Path) -> Result<CruiseSheet, CruiseError> {
        read_excel(path)
    }
}

/// Pick a reader from the file extension.
pub fn read_sheet(path: impl AsRef<Path>) -> Result<CruiseSheet, CruiseError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "csv" => read_csv(path),
        "json" => read_json(path),
        "xlsx" => read_excel(path),
        other => Err(CruiseError::Import(format!(
            "unsupported sheet format '.{other}'; use .csv, .json, or .xlsx"
        ))),
    }
}
