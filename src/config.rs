use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CruiseError;
use crate::models::BuckingParams;

/// Cruise defaults loadable from a TOML file. Any omitted field keeps the
/// industry-standard default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CruiseConfig {
    /// Target log length for the virtual cruiser, feet.
    pub preferred_log_length: u32,
    /// Shortest log worth cutting, feet.
    pub minimum_log_length: u32,
    /// Smallest merchantable top DIB for a utility log, inches.
    pub utility_log_dib: u32,
    /// Confidence level for the supplemental intervals (0-1).
    pub confidence_level: f64,
}

impl Default for CruiseConfig {
    fn default() -> Self {
        Self {
            preferred_log_length: 40,
            minimum_log_length: 16,
            utility_log_dib: 3,
            confidence_level: 0.95,
        }
    }
}

impl CruiseConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<CruiseConfig, CruiseError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&text).map_err(|e| CruiseError::Config(e.to_string()))
    }

    pub fn bucking_params(&self) -> BuckingParams {
        BuckingParams {
            preferred_log_length: self.preferred_log_length,
            minimum_log_length: self.minimum_log_length,
            utility_log_dib: self.utility_log_dib,
        }
    }
}
