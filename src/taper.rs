//! Stem taper equations.
//!
//! Each species maps to one of four published taper model families which
//! predict diameter inside bark (DIB) at any height along the stem from DBH
//! and total height. Predicted DIBs are floored to whole inches, matching
//! how scaling tables are keyed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CruiseError;
use crate::reference::Species;

/// A taper model family with its fitted coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TaperModel {
    /// Czaplewski segmented polynomial.
    Czaplewski {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        e: f64,
        f: f64,
    },
    /// Kozak (1969) quadratic form.
    Kozak1969 { a: f64, b: f64, c: f64 },
    /// Kozak (1988) variable-exponent form.
    Kozak1988 {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        e: f64,
        f: f64,
        g: f64,
        h: f64,
        i: f64,
    },
    /// Wensel logarithmic form.
    Wensel {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
        e: f64,
    },
}

impl TaperModel {
    /// The fitted model for a species.
    pub fn for_species(species: Species) -> TaperModel {
        use TaperModel::{Czaplewski, Kozak1969, Kozak1988, Wensel};
        match species {
            Species::SF => Czaplewski {
                a: 0.5,
                b: 0.06,
                c: -1.742,
                d: 0.6184,
                e: -0.8838,
                f: 94.3683,
            },
            Species::GF | Species::NF => Czaplewski {
                a: 0.59,
                b: 0.06,
                c: -1.5332,
                d: 0.56,
                e: -0.4781,
                f: 129.9282,
            },
            Species::WL => Czaplewski {
                a: 0.59,
                b: 0.06,
                c: -1.3228,
                d: 0.3905,
                e: -0.5355,
                f: 115.6905,
            },
            Species::LP => Czaplewski {
                a: 0.41,
                b: 0.06,
                c: -1.2989,
                d: 0.3693,
                e: 0.2408,
                f: 89.1781,
            },
            Species::PP => Czaplewski {
                a: 0.72,
                b: 0.06,
                c: -2.3261,
                d: 0.9514,
                e: -1.0757,
                f: 94.6991,
            },
            Species::DF => Czaplewski {
                a: 0.72,
                b: 0.12,
                c: -2.8758,
                d: 1.3458,
                e: -1.6264,
                f: 20.1315,
            },
            Species::WH => Czaplewski {
                a: 0.59,
                b: 0.06,
                c: -2.0993,
                d: 0.8635,
                e: -1.026,
                f: 91.5562,
            },
            Species::RA => Kozak1969 {
                a: 0.97576,
                b: -1.22922,
                c: 0.25347,
            },
            Species::BM => Kozak1969 {
                a: 0.95997,
                b: -1.46336,
                c: 0.50339,
            },
            Species::SS => Kozak1969 {
                a: 0.99496,
                b: -1.98993,
                c: 0.99496,
            },
            Species::ES => Kozak1969 {
                a: 0.97449,
                b: -1.42305,
                c: 0.44856,
            },
            Species::AS => Kozak1969 {
                a: 0.95806,
                b: -1.33682,
                c: 0.37877,
            },
            Species::WP => Kozak1969 {
                a: 0.96272,
                b: -1.37551,
                c: 0.41279,
            },
            Species::RC => Kozak1988 {
                a: 1.21697,
                b: 0.84256,
                c: 1.00001,
                d: 0.3,
                e: 1.55322,
                f: -0.39719,
                g: 2.11018,
                h: -1.11416,
                i: 0.0942,
            },
            Species::CW => Kozak1988 {
                a: 0.85258,
                b: 0.95297,
                c: 1.00048,
                d: 0.25,
                e: 0.73191,
                f: -0.08419,
                g: 0.19634,
                h: -0.06985,
                i: 0.14828,
            },
            Species::JP => Wensel {
                a: 0.82932,
                b: 1.50831,
                c: -4.08016,
                d: 0.047053,
                e: 0.0,
            },
            Species::SP => Wensel {
                a: 0.90051,
                b: 0.91588,
                c: -0.92964,
                d: 0.0077119,
                e: -0.0011019,
            },
            Species::WF => Wensel {
                a: 0.86039,
                b: 1.45196,
                c: -2.42273,
                d: -0.15848,
                e: 0.036947,
            },
            Species::RF => Wensel {
                a: 0.87927,
                b: 0.9135,
                c: -0.56617,
                d: -0.01448,
                e: 0.0037262,
            },
            Species::RW => Wensel {
                a: 0.955,
                b: 0.387,
                c: -0.362,
                d: -0.00581,
                e: 0.00122,
            },
            Species::IC => Wensel {
                a: 1.0,
                b: 0.3155,
                c: -0.34316,
                d: 0.0,
                e: -0.00039283,
            },
        }
    }

    /// DIB in whole inches at a stem height. Height 0 is undefined; the
    /// models are evaluated from stump height (1 ft) upward.
    pub fn dib_at(&self, dbh: f64, total_height: f64, stem_height: u32) -> u32 {
        let h = f64::from(stem_height);
        let dib = match *self {
            TaperModel::Czaplewski { a, b, c, d, e, f } => {
                let z = h / total_height;
                let z2 = z * z;
                let i1 = if z < a { 1.0 } else { 0.0 };
                let i2 = if z < b { 1.0 } else { 0.0 };
                let radicand = c * (z - 1.0)
                    + d * (z2 - 1.0)
                    + e * (a - z).powi(2) * i1
                    + f * (b - z).powi(2) * i2;
                dbh * radicand.max(0.0).sqrt()
            }
            TaperModel::Kozak1969 { a, b, c } => {
                let z = h / total_height;
                let radicand = a + b * z + c * z * z;
                dbh * radicand.max(0.0).sqrt()
            }
            TaperModel::Kozak1988 {
                a,
                b,
                c,
                d,
                e,
                f,
                g,
                h: h_coef,
                i,
            } => {
                let z = h / total_height;
                let base = (1.0 - z.sqrt()) / (1.0 - d.sqrt());
                let exponent = e * z * z
                    + f * (z + 0.001).ln()
                    + g * z.sqrt()
                    + h_coef * z.exp()
                    + i * (dbh / total_height);
                a * dbh.powf(b) * c.powf(dbh) * base.powf(exponent)
            }
            TaperModel::Wensel { a, b, c, d, e } => {
                let z = (h - 1.0) / (total_height - 1.0);
                let x = c + d * dbh + e * total_height;
                dbh * (a - x * (1.0 - z.powf(b) * (1.0 - (a / x).exp())).ln())
            }
        };
        if dib.is_finite() {
            dib.floor().max(0.0) as u32
        } else {
            // the variable-exponent form collapses to zero at the tip
            0
        }
    }
}

/// The complete integer DIB profile of one stem.
///
/// Immutable once built; a tree that changes dimensions builds a fresh
/// profile rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemProfile {
    /// Stem height (ft) -> DIB (in), covering 1..=floor(total height).
    dibs: BTreeMap<u32, u32>,
    /// DIB (in) -> stem heights (ft, ascending) sharing that DIB.
    heights_by_dib: BTreeMap<u32, Vec<u32>>,
}

impl StemProfile {
    /// Evaluate the species' taper model at every integer stem height from
    /// 1 ft (stump) to floor(total height).
    pub fn build(species: Species, dbh: f64, total_height: f64) -> StemProfile {
        let model = TaperModel::for_species(species);
        let top = total_height.floor() as u32;
        let mut dibs = BTreeMap::new();
        let mut heights_by_dib: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        for stem_height in 1..=top {
            let dib = model.dib_at(dbh, total_height, stem_height);
            dibs.insert(stem_height, dib);
            heights_by_dib.entry(dib).or_default().push(stem_height);
        }
        StemProfile { dibs, heights_by_dib }
    }

    /// Highest stem height covered by the profile.
    pub fn top_height(&self) -> u32 {
        self.dibs.keys().next_back().copied().unwrap_or(0)
    }

    /// DIB at a stem height, failing when the height is beyond the profile.
    pub fn dib_at(&self, stem_height: u32) -> Result<u32, CruiseError> {
        self.dibs
            .get(&stem_height)
            .copied()
            .ok_or(CruiseError::Profile {
                stem_height,
                profile_top: self.top_height(),
            })
    }

    /// Greatest stem height whose DIB equals `dib`. When the floored profile
    /// skips that exact value the nearest larger DIB bucket answers instead.
    pub fn height_for_dib(&self, dib: u32) -> Option<u32> {
        self.heights_by_dib
            .range(dib..)
            .next()
            .and_then(|(_, heights)| heights.last().copied())
    }

    /// Iterate (stem height, DIB) pairs from stump to tip.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.dibs.iter().map(|(h, d)| (*h, *d))
    }
}
