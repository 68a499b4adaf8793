use serde::{Deserialize, Serialize};

use super::normalize_lookup;
use crate::error::CruiseError;

/// Tree species supported by the taper and grading tables.
///
/// Declaration order is the conventional reporting sort order; the derived
/// `Ord` relies on it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Species {
    /// Douglas-fir
    DF,
    /// Western hemlock
    WH,
    /// Western redcedar
    RC,
    /// Sitka spruce
    SS,
    /// Englemann spruce
    ES,
    /// Silver fir
    SF,
    /// Grand fir
    GF,
    /// Noble fir
    NF,
    /// Western larch
    WL,
    /// White pine
    WP,
    /// Ponderosa pine
    PP,
    /// Lodgepole pine
    LP,
    /// Jeffery pine
    JP,
    /// Sugar pine
    SP,
    /// White fir
    WF,
    /// Red fir
    RF,
    /// Coastal redwood
    RW,
    /// Insence cedar
    IC,
    /// Red alder
    RA,
    /// Bigleaf maple
    BM,
    /// Black cottonwood
    CW,
    /// Quaking aspen
    AS,
}

impl Species {
    /// Every supported species, in reporting sort order.
    pub const ALL: [Species; 22] = [
        Species::DF,
        Species::WH,
        Species::RC,
        Species::SS,
        Species::ES,
        Species::SF,
        Species::GF,
        Species::NF,
        Species::WL,
        Species::WP,
        Species::PP,
        Species::LP,
        Species::JP,
        Species::SP,
        Species::WF,
        Species::RF,
        Species::RW,
        Species::IC,
        Species::RA,
        Species::BM,
        Species::CW,
        Species::AS,
    ];

    /// Two-letter species code.
    pub fn code(&self) -> &'static str {
        match self {
            Species::DF => "DF",
            Species::WH => "WH",
            Species::RC => "RC",
            Species::SS => "SS",
            Species::ES => "ES",
            Species::SF => "SF",
            Species::GF => "GF",
            Species::NF => "NF",
            Species::WL => "WL",
            Species::WP => "WP",
            Species::PP => "PP",
            Species::LP => "LP",
            Species::JP => "JP",
            Species::SP => "SP",
            Species::WF => "WF",
            Species::RF => "RF",
            Species::RW => "RW",
            Species::IC => "IC",
            Species::RA => "RA",
            Species::BM => "BM",
            Species::CW => "CW",
            Species::AS => "AS",
        }
    }

    /// Full display name, as it appears in scaling paperwork.
    pub fn name(&self) -> &'static str {
        match self {
            Species::DF => "DOUGLAS-FIR",
            Species::WH => "WESTERN HEMLOCK",
            Species::RC => "WESTERN REDCEDAR",
            Species::SS => "SITKA SPRUCE",
            Species::ES => "ENGLEMANN SPRUCE",
            Species::SF => "SILVER FIR",
            Species::GF => "GRAND FIR",
            Species::NF => "NOBLE FIR",
            Species::WL => "WESTERN LARCH",
            Species::WP => "WHITE PINE",
            Species::PP => "PONDEROSA PINE",
            Species::LP => "LODGEPOLE PINE",
            Species::JP => "JEFFERY PINE",
            Species::SP => "SUGAR PINE",
            Species::WF => "WHITE FIR",
            Species::RF => "RED FIR",
            Species::RW => "COASTAL REDWOOD",
            Species::IC => "INSENCE CEDAR",
            Species::RA => "RED ALDER",
            Species::BM => "BIGLEAF MAPLE",
            Species::CW => "BLACK COTTONWOOD",
            Species::AS => "QUAKING ASPEN",
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Species {
    type Err = CruiseError;

    /// Accepts the two-letter code or the full display name, case-insensitive
    /// and tolerant of `.`, `_`, and `-` in place of spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let looked = normalize_lookup(s);
        Species::ALL
            .iter()
            .find(|sp| looked == sp.code() || looked == normalize_lookup(sp.name()))
            .copied()
            .ok_or_else(|| CruiseError::Species(s.to_string()))
    }
}

/// `CODE - NAME` listing of every valid species, used in error messages.
pub fn code_listing() -> String {
    Species::ALL
        .iter()
        .map(|sp| format!("{} - {}", sp.code(), sp.name()))
        .collect::<Vec<_>>()
        .join("\n")
}
