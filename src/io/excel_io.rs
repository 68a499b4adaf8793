use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};

use super::csv_io::{has_required_columns, sheet_from_grid};
use crate::error::CruiseError;
use crate::io::sheet::CruiseSheet;

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// Read a normalized cruise sheet from an Excel (.xlsx) workbook.
///
/// Worksheets are scanned in order; the first one carrying the required
/// cruise columns is used. Headers are matched exactly (case-insensitive),
/// same as the CSV reader.
pub fn read_excel(path: impl AsRef<Path>) -> Result<CruiseSheet, CruiseError> {
    let mut workbook: Xlsx<_> = open_workbook(path.as_ref())?;

    for sheet_name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet_name)?;
        let mut rows_iter = range.rows();
        let Some(header_row) = rows_iter.next() else {
            continue;
        };
        let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();
        if !has_required_columns(&headers) {
            continue;
        }
        let rows: Vec<Vec<String>> = rows_iter
            .map(|r| r.iter().map(cell_to_string).collect())
            .collect();
        return sheet_from_grid(&headers, &rows);
    }
    Err(CruiseError::Excel(
        "no worksheet carries the required cruise columns".to_string(),
    ))
}
