use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::analysis::summary::SpeciesKey;
use crate::error::CruiseError;
use crate::models::{Plot, Tree};
use crate::reference::Species;

/// Per-acre metrics the stand statistics table covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatsMetric {
    Tpa,
    BaAc,
    RdAc,
    GrossBfAc,
    GrossCfAc,
    NetBfAc,
    NetCfAc,
}

impl StatsMetric {
    pub const ALL: [StatsMetric; 7] = [
        StatsMetric::Tpa,
        StatsMetric::BaAc,
        StatsMetric::RdAc,
        StatsMetric::GrossBfAc,
        StatsMetric::GrossCfAc,
        StatsMetric::NetBfAc,
        StatsMetric::NetCfAc,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StatsMetric::Tpa => "TPA",
            StatsMetric::BaAc => "BA/ac",
            StatsMetric::RdAc => "RD/ac",
            StatsMetric::GrossBfAc => "Gross BF/ac",
            StatsMetric::GrossCfAc => "Gross CF/ac",
            StatsMetric::NetBfAc => "Net BF/ac",
            StatsMetric::NetCfAc => "Net CF/ac",
        }
    }

    fn of_tree(&self, tree: &Tree) -> f64 {
        match self {
            StatsMetric::Tpa => tree.tpa(),
            StatsMetric::BaAc => tree.ba_ac(),
            StatsMetric::RdAc => tree.rd_ac(),
            StatsMetric::GrossBfAc => tree.gross_bf_ac(),
            StatsMetric::GrossCfAc => tree.gross_cf_ac(),
            StatsMetric::NetBfAc => tree.net_bf_ac(),
            StatsMetric::NetCfAc => tree.net_cf_ac(),
        }
    }
}

/// Spread statistics, or the sentinel when fewer than two plots sampled the
/// metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Dispersion {
    Computed {
        variance: f64,
        std_dev: f64,
        std_error: f64,
        std_error_pct: f64,
        /// One-standard-error band, clipped at zero: [low, high].
        low: f64,
        high: f64,
    },
    /// Fewer than 2 plots: spread is not estimable.
    InsufficientData,
}

/// Mean plus spread for one (species, metric) sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    pub dispersion: Dispersion,
}

impl MetricStats {
    /// Sample statistics over per-plot sums. The plot count, not the tree
    /// count, is the sample size.
    pub fn from_samples(samples: &[f64]) -> MetricStats {
        let n = samples.len();
        if n == 0 {
            return MetricStats {
                mean: 0.0,
                dispersion: Dispersion::InsufficientData,
            };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        if n < 2 {
            return MetricStats {
                mean,
                dispersion: Dispersion::InsufficientData,
            };
        }
        let variance =
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let std_dev = variance.sqrt();
        let std_error = std_dev / (n as f64).sqrt();
        let std_error_pct = if mean.abs() > f64::EPSILON {
            (std_error / mean) * 100.0
        } else {
            0.0
        };
        MetricStats {
            mean,
            dispersion: Dispersion::Computed {
                variance,
                std_dev,
                std_error,
                std_error_pct,
                low: (mean - std_error).max(0.0),
                high: mean + std_error,
            },
        }
    }
}

/// One row of the stand statistics table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsRow {
    pub species: SpeciesKey,
    pub metric: StatsMetric,
    pub stats: MetricStats,
}

/// The statistics table: per species and TOTALS, per metric, sample
/// statistics of the per-plot sums.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StandStatistics {
    rows: Vec<StatsRow>,
}

impl StandStatistics {
    pub fn compute(plots: &[Plot]) -> StandStatistics {
        let mut rows = Vec::new();
        if plots.is_empty() {
            return StandStatistics { rows };
        }
        let mut species: Vec<Species> = plots.iter().flat_map(Plot::species).collect();
        species.sort();
        species.dedup();

        let keys: Vec<SpeciesKey> = species
            .into_iter()
            .map(SpeciesKey::Code)
            .chain(std::iter::once(SpeciesKey::Totals))
            .collect();
        for key in keys {
            for metric in StatsMetric::ALL {
                let samples: Vec<f64> = plots
                    .iter()
                    .map(|plot| plot_metric_sum(plot, metric, key))
                    .collect();
                rows.push(StatsRow {
                    species: key,
                    metric,
                    stats: MetricStats::from_samples(&samples),
                });
            }
        }
        StandStatistics { rows }
    }

    pub fn rows(&self) -> &[StatsRow] {
        &self.rows
    }

    pub fn get(&self, species: SpeciesKey, metric: StatsMetric) -> Option<&MetricStats> {
        self.rows
            .iter()
            .find(|r| r.species == species && r.metric == metric)
            .map(|r| &r.stats)
    }
}

/// Per-plot sum of one metric, over one species or all trees. Plots where
/// the species is absent contribute a zero sample.
fn plot_metric_sum(plot: &Plot, metric: StatsMetric, key: SpeciesKey) -> f64 {
    plot.trees()
        .iter()
        .filter(|t| match key {
            SpeciesKey::Code(sp) => t.species() == sp,
            SpeciesKey::Totals => true,
        })
        .map(|t| metric.of_tree(t))
        .sum()
}

/// Confidence interval for a metric at a given confidence level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    pub std_error: f64,
    pub lower: f64,
    pub upper: f64,
    pub confidence_level: f64,
    pub sample_size: usize,
    pub sampling_error_percent: f64,
}

/// Student's-t confidence interval over per-plot samples (e.g. 0.95).
pub fn confidence_interval(
    samples: &[f64],
    confidence: f64,
) -> Result<ConfidenceInterval, CruiseError> {
    let n = samples.len();
    if n < 2 {
        return Err(CruiseError::InsufficientData(
            "need at least 2 plots for a confidence interval".to_string(),
        ));
    }
    let mean = samples.iter().sum::<f64>() / n as f64;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_error = variance.sqrt() / (n as f64).sqrt();

    let df = (n - 1) as f64;
    let alpha = 1.0 - confidence;
    let t_dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| CruiseError::InsufficientData(e.to_string()))?;
    let t_value = t_dist.inverse_cdf(1.0 - alpha / 2.0);

    let margin = t_value * std_error;
    let sampling_error_percent = if mean.abs() > f64::EPSILON {
        (margin / mean) * 100.0
    } else {
        0.0
    };
    Ok(ConfidenceInterval {
        mean,
        std_error,
        lower: mean - margin,
        upper: mean + margin,
        confidence_level: confidence,
        sample_size: n,
        sampling_error_percent,
    })
}

/// Per-plot TOTALS samples for a metric, the input to
/// [`confidence_interval`].
pub fn metric_samples(plots: &[Plot], metric: StatsMetric) -> Vec<f64> {
    plots
        .iter()
        .map(|plot| plot_metric_sum(plot, metric, SpeciesKey::Totals))
        .collect()
}
