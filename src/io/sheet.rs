use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The normalized cruise record produced by the ingestion boundary: stands
/// by name, plots by number, trees as fixed-position tuples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CruiseSheet {
    /// Stand name (uppercased) -> stand record.
    pub stands: BTreeMap<String, StandRecord>,
}

impl CruiseSheet {
    pub fn new() -> CruiseSheet {
        CruiseSheet::default()
    }

    /// Case-insensitive stand lookup.
    pub fn stand(&self, name: &str) -> Option<&StandRecord> {
        self.stands.get(&name.trim().to_uppercase())
    }

    pub fn stand_mut(&mut self, name: &str) -> &mut StandRecord {
        self.stands.entry(name.trim().to_uppercase()).or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StandRecord {
    /// Plot number -> plot record.
    pub plots: BTreeMap<u32, PlotRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlotRecord {
    pub expansion_factor: f64,
    pub trees: Vec<TreeRecord>,
}

/// One measured tree as it comes off the sheet. A missing total height is
/// back-filled from the stand HDR at import time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub expansion_factor: f64,
    pub number: u32,
    /// Species code or display name; parsed during import.
    pub species: String,
    pub dbh: f64,
    pub total_height: Option<f64>,
    pub cruise: CruiseKind,
}

/// Full cruise carries measured logs; quick cruise carries the bucking
/// parameters for the virtual cruiser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CruiseKind {
    Full { logs: Vec<LogRecord> },
    Quick {
        preferred_log_length: u32,
        minimum_log_length: u32,
        utility_log_dib: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub stem_height: u32,
    pub length: u32,
    /// Grade code or name; graded from the ladder when absent.
    pub grade: Option<String>,
    pub defect: u32,
}
