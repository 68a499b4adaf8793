//! Row-oriented group-by tables backing the plot and stand summaries.
//!
//! Per-acre columns are summed within each group and divided by the plot
//! divisor (1 for a single plot, the plot count for a stand); height columns
//! are arithmetic means; QMD/vbar/cbar are derived per group after the
//! division. Every table carries a TOTALS row.

use serde::{Deserialize, Serialize};

use crate::models::{Log, Tree};
use crate::reference::{Grade, LengthRange, Species};

/// Species grouping key; TOTALS sorts last.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SpeciesKey {
    Code(Species),
    Totals,
}

impl std::fmt::Display for SpeciesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeciesKey::Code(sp) => write!(f, "{sp}"),
            SpeciesKey::Totals => write!(f, "TOTALS"),
        }
    }
}

/// Grade grouping key; TOTALS sorts last.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum GradeKey {
    Grade(Grade),
    Totals,
}

impl std::fmt::Display for GradeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeKey::Grade(g) => write!(f, "{g}"),
            GradeKey::Totals => write!(f, "TOTALS"),
        }
    }
}

/// 2-inch diameter band `[lower, upper)`; TOTALS sorts last.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum DiameterKey {
    Class { lower: u32, upper: u32 },
    Totals,
}

impl std::fmt::Display for DiameterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiameterKey::Class { lower, upper } => write!(f, "{lower}-{upper}\""),
            DiameterKey::Totals => write!(f, "TOTALS"),
        }
    }
}

/// Columns of the species and diameter-class summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryMetric {
    Tpa,
    BaAc,
    RdAc,
    Qmd,
    TotalHeight,
    MerchHeight,
    Hdr,
    NetBfAc,
    NetCfAc,
    GrossBfAc,
    GrossCfAc,
    Vbar,
    Cbar,
}

impl SummaryMetric {
    pub fn label(&self) -> &'static str {
        match self {
            SummaryMetric::Tpa => "TPA",
            SummaryMetric::BaAc => "BA/ac",
            SummaryMetric::RdAc => "RD/ac",
            SummaryMetric::Qmd => "QMD",
            SummaryMetric::TotalHeight => "Total Hgt",
            SummaryMetric::MerchHeight => "Merch Hgt",
            SummaryMetric::Hdr => "HDR",
            SummaryMetric::NetBfAc => "Net BF/ac",
            SummaryMetric::NetCfAc => "Net CF/ac",
            SummaryMetric::GrossBfAc => "Gross BF/ac",
            SummaryMetric::GrossCfAc => "Gross CF/ac",
            SummaryMetric::Vbar => "VBAR",
            SummaryMetric::Cbar => "CBAR",
        }
    }
}

/// One row of aggregated per-acre figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SummaryRow {
    pub tpa: f64,
    pub ba_ac: f64,
    pub rd_ac: f64,
    pub qmd: f64,
    pub total_height: f64,
    pub merch_height: f64,
    pub hdr: f64,
    pub net_bf_ac: f64,
    pub net_cf_ac: f64,
    pub gross_bf_ac: f64,
    pub gross_cf_ac: f64,
    pub vbar: f64,
    pub cbar: f64,
}

impl SummaryRow {
    /// Address a column by metric.
    pub fn value(&self, metric: SummaryMetric) -> f64 {
        match metric {
            SummaryMetric::Tpa => self.tpa,
            SummaryMetric::BaAc => self.ba_ac,
            SummaryMetric::RdAc => self.rd_ac,
            SummaryMetric::Qmd => self.qmd,
            SummaryMetric::TotalHeight => self.total_height,
            SummaryMetric::MerchHeight => self.merch_height,
            SummaryMetric::Hdr => self.hdr,
            SummaryMetric::NetBfAc => self.net_bf_ac,
            SummaryMetric::NetCfAc => self.net_cf_ac,
            SummaryMetric::GrossBfAc => self.gross_bf_ac,
            SummaryMetric::GrossCfAc => self.gross_cf_ac,
            SummaryMetric::Vbar => self.vbar,
            SummaryMetric::Cbar => self.cbar,
        }
    }

    fn from_trees(trees: &[&Tree], divisor: f64) -> SummaryRow {
        let mut row = SummaryRow::default();
        if trees.is_empty() || divisor <= 0.0 {
            return row;
        }
        for tree in trees {
            row.tpa += tree.tpa();
            row.ba_ac += tree.ba_ac();
            row.rd_ac += tree.rd_ac();
            row.net_bf_ac += tree.net_bf_ac();
            row.net_cf_ac += tree.net_cf_ac();
            row.gross_bf_ac += tree.gross_bf_ac();
            row.gross_cf_ac += tree.gross_cf_ac();
            row.total_height += tree.total_height();
            row.merch_height += f64::from(tree.merch_height());
            row.hdr += tree.hdr();
        }
        row.tpa /= divisor;
        row.ba_ac /= divisor;
        row.rd_ac /= divisor;
        row.net_bf_ac /= divisor;
        row.net_cf_ac /= divisor;
        row.gross_bf_ac /= divisor;
        row.gross_cf_ac /= divisor;

        let n = trees.len() as f64;
        row.total_height /= n;
        row.merch_height /= n;
        row.hdr /= n;

        if row.tpa > 0.0 {
            row.qmd = ((row.ba_ac / row.tpa) / 0.005454).sqrt();
        }
        if row.ba_ac > 0.0 {
            row.vbar = row.net_bf_ac / row.ba_ac;
            row.cbar = row.net_cf_ac / row.ba_ac;
        }
        row
    }
}

/// Per-species summary with a TOTALS row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SpeciesSummary {
    rows: Vec<(SpeciesKey, SummaryRow)>,
}

impl SpeciesSummary {
    pub fn build(trees: &[&Tree], divisor: f64) -> SpeciesSummary {
        let mut rows = Vec::new();
        if trees.is_empty() {
            return SpeciesSummary { rows };
        }
        let mut species: Vec<Species> = trees.iter().map(|t| t.species()).collect();
        species.sort();
        species.dedup();
        for sp in species {
            let group: Vec<&Tree> = trees
                .iter()
                .copied()
                .filter(|t| t.species() == sp)
                .collect();
            rows.push((SpeciesKey::Code(sp), SummaryRow::from_trees(&group, divisor)));
        }
        rows.push((SpeciesKey::Totals, SummaryRow::from_trees(trees, divisor)));
        SpeciesSummary { rows }
    }

    pub fn rows(&self) -> &[(SpeciesKey, SummaryRow)] {
        &self.rows
    }

    pub fn get(&self, key: SpeciesKey) -> Option<&SummaryRow> {
        self.rows.iter().find(|(k, _)| *k == key).map(|(_, r)| r)
    }

    pub fn totals(&self) -> Option<&SummaryRow> {
        self.get(SpeciesKey::Totals)
    }

    /// Species present, in reporting order (TOTALS excluded).
    pub fn species(&self) -> Vec<Species> {
        self.rows
            .iter()
            .filter_map(|(k, _)| match k {
                SpeciesKey::Code(sp) => Some(*sp),
                SpeciesKey::Totals => None,
            })
            .collect()
    }
}

/// Per-2-inch-diameter-class summary with a TOTALS row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DiameterSummary {
    rows: Vec<(DiameterKey, SummaryRow)>,
}

impl DiameterSummary {
    /// Bands are half-open `[lo, lo+2)` starting at floor(min DBH), so the
    /// smallest tree always lands in the first band.
    pub fn build(trees: &[&Tree], divisor: f64) -> DiameterSummary {
        let mut rows = Vec::new();
        if trees.is_empty() {
            return DiameterSummary { rows };
        }
        let min_dbh = trees.iter().map(|t| t.dbh()).fold(f64::INFINITY, f64::min);
        let max_dbh = trees
            .iter()
            .map(|t| t.dbh())
            .fold(f64::NEG_INFINITY, f64::max);
        let start = min_dbh.floor() as u32;

        let mut lower = start;
        while f64::from(lower) <= max_dbh {
            let upper = lower + 2;
            let group: Vec<&Tree> = trees
                .iter()
                .copied()
                .filter(|t| t.dbh() >= f64::from(lower) && t.dbh() < f64::from(upper))
                .collect();
            if !group.is_empty() {
                rows.push((
                    DiameterKey::Class { lower, upper },
                    SummaryRow::from_trees(&group, divisor),
                ));
            }
            lower = upper;
        }
        rows.push((DiameterKey::Totals, SummaryRow::from_trees(trees, divisor)));
        DiameterSummary { rows }
    }

    pub fn rows(&self) -> &[(DiameterKey, SummaryRow)] {
        &self.rows
    }

    pub fn get(&self, key: DiameterKey) -> Option<&SummaryRow> {
        self.rows.iter().find(|(k, _)| *k == key).map(|(_, r)| r)
    }

    pub fn totals(&self) -> Option<&SummaryRow> {
        self.get(DiameterKey::Totals)
    }
}

/// One cell of the merchandizing table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LogCell {
    /// Logs per acre.
    pub lpa: f64,
    pub net_bf_ac: f64,
    pub net_cf_ac: f64,
}

impl LogCell {
    fn absorb(&mut self, log: &Log, divisor: f64) {
        self.lpa += log.lpa() / divisor;
        self.net_bf_ac += log.net_bf_ac() / divisor;
        self.net_cf_ac += log.net_cf_ac() / divisor;
    }
}

/// One (species, grade) row of the merchandizing table: a cell per length
/// range plus a row total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSummaryRow {
    pub species: SpeciesKey,
    pub grade: GradeKey,
    by_range: [LogCell; 5],
    totals: LogCell,
}

impl LogSummaryRow {
    fn new(species: SpeciesKey, grade: GradeKey) -> LogSummaryRow {
        LogSummaryRow {
            species,
            grade,
            by_range: [LogCell::default(); 5],
            totals: LogCell::default(),
        }
    }

    pub fn cell(&self, range: LengthRange) -> &LogCell {
        &self.by_range[range as usize]
    }

    pub fn totals(&self) -> &LogCell {
        &self.totals
    }
}

/// Log merchandizing table grouped by (species, grade) with per-species and
/// grand TOTALS rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LogSummary {
    rows: Vec<LogSummaryRow>,
}

impl LogSummary {
    pub fn build(logs: &[&Log], divisor: f64) -> LogSummary {
        let mut rows: Vec<LogSummaryRow> = Vec::new();
        if logs.is_empty() || divisor <= 0.0 {
            return LogSummary { rows };
        }
        for log in logs {
            let keys = [
                (SpeciesKey::Code(log.species()), GradeKey::Grade(log.grade())),
                (SpeciesKey::Code(log.species()), GradeKey::Totals),
                (SpeciesKey::Totals, GradeKey::Totals),
            ];
            for (species, grade) in keys {
                let idx = match rows
                    .iter()
                    .position(|r| r.species == species && r.grade == grade)
                {
                    Some(i) => i,
                    None => {
                        rows.push(LogSummaryRow::new(species, grade));
                        rows.len() - 1
                    }
                };
                rows[idx].by_range[log.length_range() as usize].absorb(log, divisor);
                rows[idx].totals.absorb(log, divisor);
            }
        }
        rows.sort_by_key(|r| (r.species, r.grade));
        LogSummary { rows }
    }

    pub fn rows(&self) -> &[LogSummaryRow] {
        &self.rows
    }

    pub fn get(&self, species: SpeciesKey, grade: GradeKey) -> Option<&LogSummaryRow> {
        self.rows
            .iter()
            .find(|r| r.species == species && r.grade == grade)
    }

    pub fn grand_totals(&self) -> Option<&LogCell> {
        self.get(SpeciesKey::Totals, GradeKey::Totals)
            .map(LogSummaryRow::totals)
    }
}
