use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::error::CruiseError;
use crate::models::{Plot, Stand};

/// Flatten stands into the inventory table: one row per tree with its
/// measured dimensions, merch limits, and numbered log groups. The header
/// matches what the sheet readers expect, so an exported table re-imports
/// as a full cruise.
pub fn inventory_rows(stands: &[Stand]) -> (Vec<String>, Vec<Vec<String>>) {
    let max_logs = stands
        .iter()
        .flat_map(Stand::plots)
        .flat_map(Plot::trees)
        .map(|t| t.logs().len())
        .max()
        .unwrap_or(0);

    let mut header: Vec<String> = [
        "Stand",
        "Plot",
        "Plot Factor",
        "Tree",
        "Species",
        "DBH",
        "Merch DIB",
        "Total Height",
        "Merch Hgt",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for i in 1..=max_logs {
        header.push(format!("Log {i} Stem Hgt"));
        header.push(format!("Log {i} Length"));
        header.push(format!("Log {i} Top DIB"));
        header.push(format!("Log {i} Grade"));
        header.push(format!("Log {i} Defect"));
    }

    let mut rows = Vec::new();
    for stand in stands {
        for plot in stand.plots() {
            for tree in plot.trees() {
                let mut row = vec![
                    stand.name().to_string(),
                    plot.number().to_string(),
                    plot.expansion_factor().to_string(),
                    tree.number().to_string(),
                    tree.species().code().to_string(),
                    tree.dbh().to_string(),
                    tree.merch_dib().to_string(),
                    tree.total_height().to_string(),
                    tree.merch_height().to_string(),
                ];
                for i in 0..max_logs {
                    match tree.logs().get(i) {
                        Some(log) => {
                            row.push(log.stem_height().to_string());
                            row.push(log.length().to_string());
                            row.push(log.top_dib().to_string());
                            row.push(log.grade().code().to_string());
                            row.push(log.defect().to_string());
                        }
                        None => row.extend(std::iter::repeat(String::new()).take(5)),
                    }
                }
                rows.push(row);
            }
        }
    }
    (header, rows)
}

/// Write the inventory table as CSV.
pub fn write_inventory_csv(stands: &[Stand], path: impl AsRef<Path>) -> Result<(), CruiseError> {
    let (header, rows) = inventory_rows(stands);
    let mut wtr = csv::Writer::from_path(path.as_ref())?;
    wtr.write_record(&header)?;
    for row in &rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    info!(rows = rows.len(), path = %path.as_ref().display(), "wrote inventory CSV");
    Ok(())
}

/// Write the inventory table as an Excel (.xlsx) workbook.
pub fn write_inventory_xlsx(stands: &[Stand], path: impl AsRef<Path>) -> Result<(), CruiseError> {
    let (header, rows) = inventory_rows(stands);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, name) in header.iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }
    for (r, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            worksheet.write_string(r as u32 + 1, col as u16, value)?;
        }
    }
    workbook.save(path.as_ref())?;
    info!(rows = rows.len(), path = %path.as_ref().display(), "wrote inventory XLSX");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{read_csv, read_excel};
    use crate::models::{BuckingParams, Tree};
    use crate::reference::Species;
    use assert_approx_eq::assert_approx_eq;
    use chrono::NaiveDate;

    fn sample_stand() -> Stand {
        let mut stand = Stand::new("EX1", 22.4, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        let mut plot = Plot::new(1, -30.0).unwrap();
        plot.add_trees(vec![
            Tree::auto_cruised(1, -30.0, Species::DF, 18.8, 103.0, BuckingParams::default())
                .unwrap(),
            Tree::auto_cruised(1, -30.0, Species::RC, 20.2, 124.0, BuckingParams::default())
                .unwrap(),
        ]);
        stand.add_plot(plot).unwrap();
        stand
    }

    #[test]
    fn test_inventory_rows_shape() {
        let stand = sample_stand();
        let (header, rows) = inventory_rows(std::slice::from_ref(&stand));
        assert_eq!(rows.len(), 2);
        let max_logs = stand
            .plots()
            .iter()
            .flat_map(Plot::trees)
            .map(|t| t.logs().len())
            .max()
            .unwrap();
        assert_eq!(header.len(), 9 + 5 * max_logs);
        for row in &rows {
            assert_eq!(row.len(), header.len());
            assert_eq!(row[0], "EX1");
        }
    }

    #[test]
    fn test_csv_export_reimports_as_full_cruise() {
        let stand = sample_stand();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.csv");
        write_inventory_csv(std::slice::from_ref(&stand), &path).unwrap();

        let sheet = read_csv(&path).unwrap();
        let mut reimported = Stand::new("EX1", 22.4, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        reimported.import(&sheet).unwrap();

        assert_eq!(reimported.plot_count(), stand.plot_count());
        assert_eq!(reimported.tree_count(), stand.tree_count());
        // same cuts and grades reproduce the same volumes
        assert_approx_eq!(
            reimported.totals().net_bf_ac,
            stand.totals().net_bf_ac,
            1e-9
        );
        assert_approx_eq!(
            reimported.totals().gross_cf_ac,
            stand.totals().gross_cf_ac,
            1e-9
        );
    }

    #[test]
    fn test_xlsx_export_reimports() {
        let stand = sample_stand();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.xlsx");
        write_inventory_xlsx(std::slice::from_ref(&stand), &path).unwrap();

        let sheet = read_excel(&path).unwrap();
        let record = sheet.stand("EX1").unwrap();
        assert_eq!(record.plots[&1].trees.len(), 2);
    }

    #[test]
    fn test_empty_stands_export_header_only() {
        let (header, rows) = inventory_rows(&[]);
        assert_eq!(header.len(), 9);
        assert!(rows.is_empty());
    }
}
