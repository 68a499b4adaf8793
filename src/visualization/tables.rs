use colored::Colorize;
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table,
};

use crate::analysis::statistics::Dispersion;
use crate::analysis::summary::SummaryRow;
use crate::models::Stand;
use crate::reference::LengthRange;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn summary_cells(key: String, row: &SummaryRow) -> Vec<Cell> {
    vec![
        Cell::new(key),
        Cell::new(format!("{:.1}", row.tpa)),
        Cell::new(format!("{:.1}", row.ba_ac)),
        Cell::new(format!("{:.1}", row.rd_ac)),
        Cell::new(format!("{:.1}", row.qmd)),
        Cell::new(format!("{:.0}", row.total_height)),
        Cell::new(format!("{:.0}", row.merch_height)),
        Cell::new(format!("{:.1}", row.hdr)),
        Cell::new(format!("{:.0}", row.net_bf_ac)),
        Cell::new(format!("{:.1}", row.net_cf_ac)),
        Cell::new(format!("{:.0}", row.gross_bf_ac)),
        Cell::new(format!("{:.1}", row.gross_cf_ac)),
        Cell::new(format!("{:.1}", row.vbar)),
        Cell::new(format!("{:.1}", row.cbar)),
    ]
}

/// Format the stand's per-species summary as a table.
pub fn format_stand_summary(stand: &Stand) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{}\n",
        format!("Stand {}: Species Summary", stand.name())
            .bold()
            .green()
    ));
    output.push_str(&format!("{}\n", "=".repeat(70)));

    let mut table = new_table();
    table.set_header(vec![
        "Species", "TPA", "BA/ac", "RD/ac", "QMD", "Tot Hgt", "Mrch Hgt", "HDR", "Net BF/ac",
        "Net CF/ac", "Grs BF/ac", "Grs CF/ac", "VBAR", "CBAR",
    ]);
    for (key, row) in stand.species_summary().rows() {
        table.add_row(summary_cells(key.to_string(), row));
    }
    output.push_str(&format!("{table}"));
    output
}

/// Print the stand's per-species summary.
pub fn print_stand_summary(stand: &Stand) {
    println!("{}", format_stand_summary(stand));
}

/// Format the stand's diameter-class summary as a table.
pub fn format_diameter_table(stand: &Stand) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{}\n",
        format!("Stand {}: Diameter Classes", stand.name())
            .bold()
            .green()
    ));
    output.push_str(&format!("{}\n", "=".repeat(70)));

    let mut table = new_table();
    table.set_header(vec![
        "DBH Class", "TPA", "BA/ac", "RD/ac", "QMD", "Tot Hgt", "Mrch Hgt", "HDR", "Net BF/ac",
        "Net CF/ac", "Grs BF/ac", "Grs CF/ac", "VBAR", "CBAR",
    ]);
    for (key, row) in stand.diameter_summary().rows() {
        table.add_row(summary_cells(key.to_string(), row));
    }
    output.push_str(&format!("{table}"));
    output
}

/// Print the stand's diameter-class summary.
pub fn print_diameter_table(stand: &Stand) {
    println!("{}", format_diameter_table(stand));
}

/// Format the log merchandizing table: logs/acre, net BF/acre, and net
/// CF/acre per (species, grade) and length range.
pub fn format_logs_table(stand: &Stand) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{}\n",
        format!("Stand {}: Log Merchandizing", stand.name())
            .bold()
            .green()
    ));
    output.push_str(&format!(
        "{}\n",
        "cells are LPA / Net BF/ac / Net CF/ac".dimmed()
    ));
    output.push_str(&format!("{}\n", "=".repeat(70)));

    let mut header = vec!["Species".to_string(), "Grade".to_string()];
    header.extend(LengthRange::ALL.iter().map(|r| r.label().to_string()));
    header.push("Totals".to_string());

    let mut table = new_table();
    table.set_header(header);
    for row in stand.log_summary().rows() {
        let mut cells = vec![
            Cell::new(row.species.to_string()),
            Cell::new(row.grade.to_string()),
        ];
        for range in LengthRange::ALL {
            let cell = row.cell(range);
            cells.push(Cell::new(format!(
                "{:.1} / {:.0} / {:.1}",
                cell.lpa, cell.net_bf_ac, cell.net_cf_ac
            )));
        }
        let totals = row.totals();
        cells.push(Cell::new(format!(
            "{:.1} / {:.0} / {:.1}",
            totals.lpa, totals.net_bf_ac, totals.net_cf_ac
        )));
        table.add_row(cells);
    }
    output.push_str(&format!("{table}"));
    output
}

/// Print the log merchandizing table.
pub fn print_logs_table(stand: &Stand) {
    println!("{}", format_logs_table(stand));
}

/// Format the stand statistics table; spread columns show the
/// insufficient-data sentinel below 2 plots.
pub fn format_statistics_table(stand: &Stand) -> String {
    const NO: &str = "Not enough data";

    let mut output = String::new();
    output.push_str(&format!(
        "\n{}\n",
        format!("Stand {}: Statistics", stand.name()).bold().green()
    ));
    output.push_str(&format!(
        "{}\n",
        format!("{} plots sampled", stand.plot_count()).dimmed()
    ));
    output.push_str(&format!("{}\n", "=".repeat(70)));

    let mut table = new_table();
    table.set_header(vec![
        "Species", "Metric", "Mean", "Variance", "Std Dev", "Std Err", "Std Err %", "Low",
        "High",
    ]);
    for row in stand.statistics().rows() {
        let mut cells = vec![
            Cell::new(row.species.to_string()),
            Cell::new(row.metric.label()),
            Cell::new(format!("{:.1}", row.stats.mean)),
        ];
        match &row.stats.dispersion {
            Dispersion::Computed {
                variance,
                std_dev,
                std_error,
                std_error_pct,
                low,
                high,
            } => {
                cells.push(Cell::new(format!("{variance:.1}")));
                cells.push(Cell::new(format!("{std_dev:.1}")));
                cells.push(Cell::new(format!("{std_error:.1}")));
                cells.push(Cell::new(format!("{std_error_pct:.1}%")));
                cells.push(Cell::new(format!("{low:.1}")));
                cells.push(Cell::new(format!("{high:.1}")));
            }
            Dispersion::InsufficientData => {
                for _ in 0..6 {
                    cells.push(Cell::new(NO));
                }
            }
        }
        table.add_row(cells);
    }
    output.push_str(&format!("{table}"));
    output
}

/// Print the stand statistics table.
pub fn print_statistics_table(stand: &Stand) {
    println!("{}", format_statistics_table(stand));
}
