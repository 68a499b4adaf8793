use std::path::Path;

use tracing::debug;

use crate::error::CruiseError;
use crate::io::sheet::{CruiseKind, CruiseSheet, LogRecord, PlotRecord, TreeRecord};

/// Base columns every cruise sheet must carry, by exact (case-insensitive)
/// header name.
const REQUIRED_COLS: [&str; 7] = [
    "Stand",
    "Plot",
    "Plot Factor",
    "Tree",
    "Species",
    "DBH",
    "Total Height",
];

pub(crate) fn find_col(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

fn require_col(headers: &[String], name: &str) -> Result<usize, CruiseError> {
    find_col(headers, name)
        .ok_or_else(|| CruiseError::Import(format!("missing required column '{name}'")))
}

pub(crate) fn has_required_columns(headers: &[String]) -> bool {
    REQUIRED_COLS
        .iter()
        .all(|name| find_col(headers, name).is_some())
}

struct LogCols {
    stem_height: usize,
    length: usize,
    grade: Option<usize>,
    defect: Option<usize>,
}

fn parse_f64(value: &str, line: usize, what: &str) -> Result<f64, CruiseError> {
    value.parse::<f64>().map_err(|_| {
        CruiseError::Import(format!("row {line}: '{value}' is not a valid {what}"))
    })
}

fn parse_u32(value: &str, line: usize, what: &str) -> Result<u32, CruiseError> {
    // spreadsheet cells often carry integers as floats ("3.0")
    let as_float = parse_f64(value, line, what)?;
    Ok(as_float as u32)
}

/// Assemble a normalized cruise sheet from a header row plus data rows.
///
/// A sheet carries either quick-cruise columns (Pref Log Length, Min Log
/// Length, Utility Log DIB) or numbered log groups (Log 1 Stem Hgt, Log 1
/// Length, ...). Rows in a full-cruise sheet with no log data fall back to
/// a default quick cruise, matching how field sheets mix measured and
/// unmeasured trees.
pub(crate) fn sheet_from_grid(
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<CruiseSheet, CruiseError> {
    let stand_c = require_col(headers, "Stand")?;
    let plot_c = require_col(headers, "Plot")?;
    let factor_c = require_col(headers, "Plot Factor")?;
    let tree_c = require_col(headers, "Tree")?;
    let species_c = require_col(headers, "Species")?;
    let dbh_c = require_col(headers, "DBH")?;
    let height_c = require_col(headers, "Total Height")?;

    let quick_cols = match (
        find_col(headers, "Pref Log Length"),
        find_col(headers, "Min Log Length"),
        find_col(headers, "Utility Log DIB"),
    ) {
        (Some(pref), Some(min), Some(ut)) => Some((pref, min, ut)),
        _ => None,
    };

    let mut log_cols = Vec::new();
    let mut i = 1;
    while let Some(stem_height) = find_col(headers, &format!("Log {i} Stem Hgt")) {
        log_cols.push(LogCols {
            stem_height,
            length: require_col(headers, &format!("Log {i} Length"))?,
            grade: find_col(headers, &format!("Log {i} Grade")),
            defect: find_col(headers, &format!("Log {i} Defect")),
        });
        i += 1;
    }

    if quick_cols.is_none() && log_cols.is_empty() {
        return Err(CruiseError::Import(
            "sheet has neither quick-cruise columns nor log columns".to_string(),
        ));
    }

    let mut sheet = CruiseSheet::new();
    for (row_idx, row) in rows.iter().enumerate() {
        let line = row_idx + 2;
        let cell = |idx: usize| row.get(idx).map(|s| s.trim()).unwrap_or("");

        let stand_name = cell(stand_c);
        if stand_name.is_empty() {
            continue;
        }
        let plot_number = parse_u32(cell(plot_c), line, "plot number")?;
        let expansion_factor = parse_f64(cell(factor_c), line, "plot factor")?;
        let tree_number = parse_u32(cell(tree_c), line, "tree number")?;
        let species = cell(species_c);
        if species.is_empty() {
            return Err(CruiseError::Import(format!("row {line}: missing species")));
        }
        let dbh = parse_f64(cell(dbh_c), line, "DBH")?;
        let total_height = match cell(height_c) {
            "" => None,
            value => Some(parse_f64(value, line, "total height")?),
        };

        let mut logs = Vec::new();
        for cols in &log_cols {
            let stem = cell(cols.stem_height);
            let length = cell(cols.length);
            if stem.is_empty() || length.is_empty() {
                break;
            }
            let grade = match cols.grade.map(cell) {
                Some("") | None => None,
                Some(code) => Some(code.to_string()),
            };
            let defect = match cols.defect.map(cell) {
                Some("") | None => 0,
                Some(value) => parse_u32(value, line, "log defect")?,
            };
            logs.push(LogRecord {
                stem_height: parse_u32(stem, line, "log stem height")?,
                length: parse_u32(length, line, "log length")?,
                grade,
                defect,
            });
        }

        let cruise = if !logs.is_empty() {
            CruiseKind::Full { logs }
        } else if let Some((pref_c, min_c, ut_c)) = quick_cols {
            let or_default = |idx: usize, fallback: u32, what: &str| match cell(idx) {
                "" => Ok(fallback),
                value => parse_u32(value, line, what),
            };
            CruiseKind::Quick {
                preferred_log_length: or_default(pref_c, 40, "preferred log length")?,
                minimum_log_length: or_default(min_c, 16, "minimum log length")?,
                utility_log_dib: or_default(ut_c, 3, "utility log DIB")?,
            }
        } else {
            CruiseKind::Quick {
                preferred_log_length: 40,
                minimum_log_length: 16,
                utility_log_dib: 3,
            }
        };

        sheet
            .stand_mut(stand_name)
            .plots
            .entry(plot_number)
            .or_insert_with(|| PlotRecord {
                expansion_factor,
                trees: Vec::new(),
            })
            .trees
            .push(TreeRecord {
                expansion_factor,
                number: tree_number,
                species: species.to_string(),
                dbh,
                total_height,
                cruise,
            });
    }
    debug!(stands = sheet.stands.len(), "parsed cruise grid");
    Ok(sheet)
}

/// Read a normalized cruise sheet from a CSV file.
pub fn read_csv(path: impl AsRef<Path>) -> Result<CruiseSheet, CruiseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(String::from).collect());
    }
    sheet_from_grid(&headers, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    fn quick_headers() -> Vec<String> {
        headers(&[
            "Stand",
            "Plot",
            "Plot Factor",
            "Tree",
            "Species",
            "DBH",
            "Total Height",
            "Pref Log Length",
            "Min Log Length",
            "Utility Log DIB",
        ])
    }

    fn full_headers() -> Vec<String> {
        headers(&[
            "Stand",
            "Plot",
            "Plot Factor",
            "Tree",
            "Species",
            "DBH",
            "Total Height",
            "Log 1 Stem Hgt",
            "Log 1 Length",
            "Log 1 Grade",
            "Log 1 Defect",
            "Log 2 Stem Hgt",
            "Log 2 Length",
            "Log 2 Grade",
            "Log 2 Defect",
        ])
    }

    #[test]
    fn test_quick_sheet() {
        let rows = vec![
            row(&["EX1", "1", "-30", "1", "DF", "18.8", "103", "40", "16", "3"]),
            row(&["EX1", "1", "-30", "2", "WH", "16.0", "", "", "", ""]),
        ];
        let sheet = sheet_from_grid(&quick_headers(), &rows).unwrap();
        let stand = sheet.stand("EX1").unwrap();
        let plot = &stand.plots[&1];
        assert_eq!(plot.expansion_factor, -30.0);
        assert_eq!(plot.trees.len(), 2);
        assert_eq!(plot.trees[0].total_height, Some(103.0));
        assert_eq!(plot.trees[1].total_height, None);
        // blank quick cells fall back to industry defaults
        match &plot.trees[1].cruise {
            CruiseKind::Quick {
                preferred_log_length,
                minimum_log_length,
                utility_log_dib,
            } => {
                assert_eq!(*preferred_log_length, 40);
                assert_eq!(*minimum_log_length, 16);
                assert_eq!(*utility_log_dib, 3);
            }
            CruiseKind::Full { .. } => panic!("expected quick cruise"),
        }
    }

    #[test]
    fn test_full_sheet() {
        let rows = vec![row(&[
            "EX1", "1", "33.61", "1", "DF", "25.0", "117", "42", "40", "SM", "0", "83", "40",
            "S3", "5",
        ])];
        let sheet = sheet_from_grid(&full_headers(), &rows).unwrap();
        let tree = &sheet.stand("EX1").unwrap().plots[&1].trees[0];
        match &tree.cruise {
            CruiseKind::Full { logs } => {
                assert_eq!(logs.len(), 2);
                assert_eq!(logs[0].stem_height, 42);
                assert_eq!(logs[0].grade.as_deref(), Some("SM"));
                assert_eq!(logs[1].defect, 5);
            }
            CruiseKind::Quick { .. } => panic!("expected full cruise"),
        }
    }

    #[test]
    fn test_full_sheet_row_without_logs_defaults_to_quick() {
        let rows = vec![row(&[
            "EX1", "1", "-30", "1", "DF", "18.8", "103", "", "", "", "", "", "", "", "",
        ])];
        let sheet = sheet_from_grid(&full_headers(), &rows).unwrap();
        let tree = &sheet.stand("EX1").unwrap().plots[&1].trees[0];
        assert!(matches!(tree.cruise, CruiseKind::Quick { .. }));
    }

    #[test]
    fn test_rows_group_by_stand_and_plot() {
        let rows = vec![
            row(&["EX1", "1", "-30", "1", "DF", "18.8", "103", "40", "16", "3"]),
            row(&["EX1", "2", "40", "1", "DF", "25.0", "117", "40", "16", "3"]),
            row(&["EX2", "1", "-20", "1", "RC", "20.2", "124", "40", "16", "3"]),
        ];
        let sheet = sheet_from_grid(&quick_headers(), &rows).unwrap();
        assert_eq!(sheet.stands.len(), 2);
        assert_eq!(sheet.stand("EX1").unwrap().plots.len(), 2);
        assert_eq!(sheet.stand("EX1").unwrap().plots[&2].expansion_factor, 40.0);
    }

    #[test]
    fn test_blank_stand_rows_skipped() {
        let rows = vec![
            row(&["", "", "", "", "", "", "", "", "", ""]),
            row(&["EX1", "1", "-30", "1", "DF", "18.8", "103", "40", "16", "3"]),
        ];
        let sheet = sheet_from_grid(&quick_headers(), &rows).unwrap();
        assert_eq!(sheet.stands.len(), 1);
    }

    #[test]
    fn test_missing_required_column() {
        let headers = headers(&["Stand", "Plot", "Tree", "Species", "DBH", "Total Height"]);
        let err = sheet_from_grid(&headers, &[]).unwrap_err();
        assert!(err.to_string().contains("Plot Factor"));
    }

    #[test]
    fn test_sheet_without_cruise_columns() {
        let headers = headers(&[
            "Stand",
            "Plot",
            "Plot Factor",
            "Tree",
            "Species",
            "DBH",
            "Total Height",
        ]);
        let err = sheet_from_grid(&headers, &[]).unwrap_err();
        assert!(err.to_string().contains("neither quick-cruise"));
    }

    #[test]
    fn test_bad_number_reports_row() {
        let rows = vec![row(&[
            "EX1", "1", "-30", "1", "DF", "fat", "103", "40", "16", "3",
        ])];
        let err = sheet_from_grid(&quick_headers(), &rows).unwrap_err();
        assert!(err.to_string().contains("row 2"));
        assert!(err.to_string().contains("DBH"));
    }

    #[test]
    fn test_float_formatted_integers_accepted() {
        let rows = vec![row(&[
            "EX1", "1.0", "-30.0", "2.0", "DF", "18.8", "103", "40.0", "16.0", "3.0",
        ])];
        let sheet = sheet_from_grid(&quick_headers(), &rows).unwrap();
        let plot = &sheet.stand("EX1").unwrap().plots[&1];
        assert_eq!(plot.trees[0].number, 2);
    }

    #[test]
    fn test_read_csv_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cruise.csv");
        std::fs::write(
            &path,
            "Stand,Plot,Plot Factor,Tree,Species,DBH,Total Height,\
             Pref Log Length,Min Log Length,Utility Log DIB\n\
             EX1,1,-30,1,DF,18.8,103,40,16,3\n",
        )
        .unwrap();
        let sheet = read_csv(&path).unwrap();
        assert_eq!(sheet.stand("EX1").unwrap().plots[&1].trees.len(), 1);
    }

    #[test]
    fn test_headers_case_insensitive() {
        let rows = vec![row(&["EX1", "1", "-30", "1", "DF", "18.8", "103", "40", "16", "3"])];
        let lowered: Vec<String> = quick_headers()
            .iter()
            .map(|h| h.to_lowercase())
            .collect();
        let sheet = sheet_from_grid(&lowered, &rows).unwrap();
        assert!(sheet.stand("EX1").is_some());
    }
}
