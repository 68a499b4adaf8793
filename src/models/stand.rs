use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::statistics::{
    confidence_interval, metric_samples, ConfidenceInterval, StandStatistics, StatsMetric,
};
use crate::analysis::summary::{DiameterSummary, LogSummary, SpeciesSummary, SummaryRow};
use crate::error::CruiseError;
use crate::io::sheet::{CruiseKind, CruiseSheet};
use crate::models::{BuckingParams, Log, Plot, Tree};
use crate::reference::{Grade, Species};

/// A management unit: a named stand of timber with its sample plots.
///
/// Stand-level per-acre summaries are the plot sums divided by the plot
/// count -- each plot already carries its own expansion, so every plot
/// counts as one sampling unit regardless of stand acreage. As with plots,
/// mutating an owned plot through [`Stand::plot_mut`] leaves the summaries
/// stale until [`Stand::rebuild`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stand {
    name: String,
    acres: f64,
    inventory_date: NaiveDate,
    plots: Vec<Plot>,

    species_summary: SpeciesSummary,
    diameter_summary: DiameterSummary,
    log_summary: LogSummary,
    statistics: StandStatistics,
    totals: SummaryRow,
}

impl Stand {
    pub fn new(name: impl Into<String>, acres: f64, inventory_date: NaiveDate) -> Stand {
        Stand {
            name: name.into().trim().to_uppercase(),
            acres,
            inventory_date,
            plots: Vec::new(),
            species_summary: SpeciesSummary::default(),
            diameter_summary: DiameterSummary::default(),
            log_summary: LogSummary::default(),
            statistics: StandStatistics::default(),
            totals: SummaryRow::default(),
        }
    }

    /// Like [`Stand::new`] with a flexible date string (see
    /// [`parse_inventory_date`]).
    pub fn with_date_str(
        name: impl Into<String>,
        acres: f64,
        inventory_date: &str,
    ) -> Result<Stand, CruiseError> {
        Ok(Stand::new(name, acres, parse_inventory_date(inventory_date)?))
    }

    /// Append a plot; plot numbers are caller-assigned identities and must
    /// be unique within the stand.
    pub fn add_plot(&mut self, plot: Plot) -> Result<(), CruiseError> {
        if self.plots.iter().any(|p| p.number() == plot.number()) {
            return Err(CruiseError::Validation(format!(
                "Stand {}: plot number {} already exists",
                self.name,
                plot.number()
            )));
        }
        self.plots.push(plot);
        self.rebuild();
        Ok(())
    }

    /// Remove a plot by number. Remaining plots keep their numbers.
    pub fn remove_plot(&mut self, plot_number: u32) -> Result<Plot, CruiseError> {
        let idx = self
            .plots
            .iter()
            .position(|p| p.number() == plot_number)
            .ok_or_else(|| {
                CruiseError::Validation(format!(
                    "Stand {} has no plot {plot_number}",
                    self.name
                ))
            })?;
        let removed = self.plots.remove(idx);
        self.rebuild();
        Ok(removed)
    }

    pub fn plot(&self, plot_number: u32) -> Option<&Plot> {
        self.plots.iter().find(|p| p.number() == plot_number)
    }

    /// Mutable access to a plot. Derived stand state goes stale until
    /// [`Stand::rebuild`] runs.
    pub fn plot_mut(&mut self, plot_number: u32) -> Option<&mut Plot> {
        self.plots.iter_mut().find(|p| p.number() == plot_number)
    }

    /// Idempotent re-derivation of the stand tables from the owned plots.
    pub fn rebuild(&mut self) {
        let divisor = self.plots.len() as f64;
        let trees: Vec<&Tree> = self.plots.iter().flat_map(Plot::trees).collect();
        let logs: Vec<&Log> = trees.iter().flat_map(|t| t.logs()).collect();
        self.species_summary = SpeciesSummary::build(&trees, divisor);
        self.diameter_summary = DiameterSummary::build(&trees, divisor);
        self.log_summary = LogSummary::build(&logs, divisor);
        self.statistics = StandStatistics::compute(&self.plots);
        self.totals = self.species_summary.totals().cloned().unwrap_or_default();
        debug!(
            stand = %self.name,
            plots = self.plots.len(),
            trees = trees.len(),
            "rebuilt stand summaries"
        );
    }

    /// Ingest this stand's record from a normalized cruise sheet.
    ///
    /// Trees missing a measured height are back-filled as
    /// `(DBH / 12) x HDR`, where HDR is the mean height-to-diameter ratio of
    /// the sheet's measured trees, computed once up front. A record with no
    /// measured height at all cannot be imported.
    pub fn import(&mut self, sheet: &CruiseSheet) -> Result<(), CruiseError> {
        let record = sheet.stand(&self.name).ok_or_else(|| {
            CruiseError::Import(format!("stand {} not present in the sheet", self.name))
        })?;

        let ratios: Vec<f64> = record
            .plots
            .values()
            .flat_map(|p| &p.trees)
            .filter_map(|t| t.total_height.map(|h| h / (t.dbh / 12.0)))
            .collect();
        if ratios.is_empty() {
            return Err(CruiseError::Import(format!(
                "stand {}: no measured heights to derive an HDR from",
                self.name
            )));
        }
        let hdr = ratios.iter().sum::<f64>() / ratios.len() as f64;
        debug!(stand = %self.name, hdr, "import HDR");

        for (plot_number, plot_record) in &record.plots {
            let mut plot = Plot::new(*plot_number, plot_record.expansion_factor)?;
            for tree_record in &plot_record.trees {
                let species: Species = tree_record.species.parse()?;
                let height = match tree_record.total_height {
                    Some(h) => h,
                    None => (tree_record.dbh / 12.0) * hdr,
                };
                let tree = match &tree_record.cruise {
                    CruiseKind::Quick {
                        preferred_log_length,
                        minimum_log_length,
                        utility_log_dib,
                    } => Tree::auto_cruised(
                        tree_record.number,
                        tree_record.expansion_factor,
                        species,
                        tree_record.dbh,
                        height,
                        BuckingParams {
                            preferred_log_length: *preferred_log_length,
                            minimum_log_length: *minimum_log_length,
                            utility_log_dib: *utility_log_dib,
                        },
                    )?,
                    CruiseKind::Full { logs } => {
                        let mut tree = Tree::new(
                            tree_record.number,
                            tree_record.expansion_factor,
                            species,
                            tree_record.dbh,
                            height,
                        )?;
                        for log in logs {
                            let grade = match &log.grade {
                                Some(g) => Some(g.parse::<Grade>()?),
                                None => None,
                            };
                            tree.add_log(log.stem_height, log.length, grade, log.defect)?;
                        }
                        tree
                    }
                };
                plot.add_tree(tree);
            }
            self.add_plot(plot)?;
        }
        info!(
            stand = %self.name,
            plots = self.plots.len(),
            trees = self.tree_count(),
            "imported cruise sheet"
        );
        Ok(())
    }

    /// Student's-t confidence interval for a metric's per-plot TOTALS
    /// samples.
    pub fn confidence_interval(
        &self,
        metric: StatsMetric,
        confidence: f64,
    ) -> Result<ConfidenceInterval, CruiseError> {
        confidence_interval(&metric_samples(&self.plots, metric), confidence)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into().trim().to_uppercase();
    }

    pub fn set_acres(&mut self, acres: f64) {
        self.acres = acres;
    }

    pub fn set_inventory_date(&mut self, date: NaiveDate) {
        self.inventory_date = date;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn acres(&self) -> f64 {
        self.acres
    }

    pub fn inventory_date(&self) -> NaiveDate {
        self.inventory_date
    }

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn plot_count(&self) -> usize {
        self.plots.len()
    }

    pub fn tree_count(&self) -> usize {
        self.plots.iter().map(Plot::tree_count).sum()
    }

    /// Species present in the stand, in reporting order.
    pub fn species(&self) -> Vec<Species> {
        self.species_summary.species()
    }

    pub fn species_summary(&self) -> &SpeciesSummary {
        &self.species_summary
    }

    pub fn diameter_summary(&self) -> &DiameterSummary {
        &self.diameter_summary
    }

    pub fn log_summary(&self) -> &LogSummary {
        &self.log_summary
    }

    pub fn statistics(&self) -> &StandStatistics {
        &self.statistics
    }

    /// Stand-level totals: the TOTALS row of the species summary.
    pub fn totals(&self) -> &SummaryRow {
        &self.totals
    }
}

/// Parse an inventory date from the delimiter-and-order-tolerant formats
/// field paperwork uses: `/ . , | - _` as delimiters, digits in m-d-Y,
/// Y-m-d, Y-d-m, d-m-Y, d-Y-m, or m-Y-d order, with two-digit years
/// windowed around the current year.
pub fn parse_inventory_date(input: &str) -> Result<NaiveDate, CruiseError> {
    let s = input.trim();
    if ![6, 7, 8, 10].contains(&s.len()) {
        return Err(CruiseError::Date(input.to_string()));
    }
    let delimiters = ['/', '.', ',', '|', '-', '_'];
    let delimiter = delimiters
        .iter()
        .find(|d| s.contains(**d))
        .ok_or_else(|| CruiseError::Date(input.to_string()))?;
    let pieces: Vec<&str> = s.split(*delimiter).collect();
    if pieces.len() != 3
        || pieces
            .iter()
            .any(|p| p.is_empty() || p.len() > 4 || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(CruiseError::Date(input.to_string()));
    }

    // (year, month, day) positions to try, in order of preference
    const ORDERS: [(usize, usize, usize); 6] = [
        (2, 0, 1), // m d Y
        (0, 1, 2), // Y m d
        (0, 2, 1), // Y d m
        (2, 1, 0), // d m Y
        (1, 2, 0), // d Y m
        (1, 0, 2), // m Y d
    ];
    for (y_idx, m_idx, d_idx) in ORDERS {
        let year_piece = pieces[y_idx];
        let year = match year_piece.len() {
            4 => year_piece.parse::<i32>().unwrap_or(0),
            _ => expand_two_digit_year(year_piece.parse::<i32>().unwrap_or(0)),
        };
        let (Ok(month), Ok(day)) = (pieces[m_idx].parse::<u32>(), pieces[d_idx].parse::<u32>())
        else {
            continue;
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Ok(date);
        }
    }
    Err(CruiseError::Date(input.to_string()))
}

fn expand_two_digit_year(yy: i32) -> i32 {
    if yy <= Utc::now().year() % 100 {
        2000 + yy
    } else {
        1900 + yy
    }
}
