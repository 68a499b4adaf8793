use thiserror::Error;

use crate::reference::{grade, species, Species};

/// Errors that can occur while building or aggregating a timber cruise.
#[derive(Error, Debug)]
pub enum CruiseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("[{0}] is not a valid species code. Valid species codes are:\n{valids}", valids = species::code_listing())]
    Species(String),

    #[error("[{0}] is not a valid log grade. Valid grade codes are:\n{valids}", valids = grade::code_listing())]
    LogGrade(String),

    #[error("[{0}] could not be parsed as an inventory date")]
    Date(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("no taper profile at stem height {stem_height} ft (profile covers 1..={profile_top} ft)")]
    Profile { stem_height: u32, profile_top: u32 },

    #[error("top DIB {dib} in. is outside the Scribner table domain (0-120)")]
    ScribnerRange { dib: u32 },

    #[error("no {species} grading rule matches a {length} ft log with top DIB {top_dib} in.")]
    Ungradeable {
        species: Species,
        top_dib: u32,
        length: u32,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

impl From<calamine::Error> for CruiseError {
    fn from(e: calamine::Error) -> Self {
        CruiseError::Excel(e.to_string())
    }
}

impl From<calamine::XlsxError> for CruiseError {
    fn from(e: calamine::XlsxError) -> Self {
        CruiseError::Excel(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for CruiseError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        CruiseError::Excel(e.to_string())
    }
}
