use serde::{Deserialize, Serialize};

use super::{normalize_lookup, Species};
use crate::error::CruiseError;

/// Commercial log grades from the Official Rules for the Log Scaling and
/// Grading Bureaus. Declaration order is value order, highest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Grade {
    /// Pole
    PL,
    /// Peeler 1
    P1,
    /// Peeler 2
    P2,
    /// Peeler 3
    P3,
    /// Special mill
    SM,
    /// Saw 1
    S1,
    /// Saw 2
    S2,
    /// Saw 3
    S3,
    /// Saw 4
    S4,
    /// Saw 5
    S5,
    /// Saw 6
    S6,
    /// Utility pulp
    UT,
    /// Camp run
    CR,
}

impl Grade {
    /// Every grade, in value order.
    pub const ALL: [Grade; 13] = [
        Grade::PL,
        Grade::P1,
        Grade::P2,
        Grade::P3,
        Grade::SM,
        Grade::S1,
        Grade::S2,
        Grade::S3,
        Grade::S4,
        Grade::S5,
        Grade::S6,
        Grade::UT,
        Grade::CR,
    ];

    /// Two-letter grade code.
    pub fn code(&self) -> &'static str {
        match self {
            Grade::PL => "PL",
            Grade::P1 => "P1",
            Grade::P2 => "P2",
            Grade::P3 => "P3",
            Grade::SM => "SM",
            Grade::S1 => "S1",
            Grade::S2 => "S2",
            Grade::S3 => "S3",
            Grade::S4 => "S4",
            Grade::S5 => "S5",
            Grade::S6 => "S6",
            Grade::UT => "UT",
            Grade::CR => "CR",
        }
    }

    /// Full display name.
    pub fn name(&self) -> &'static str {
        match self {
            Grade::PL => "POLE",
            Grade::P1 => "PEELER 1",
            Grade::P2 => "PEELER 2",
            Grade::P3 => "PEELER 3",
            Grade::SM => "SPECIAL MILL",
            Grade::S1 => "SAW 1",
            Grade::S2 => "SAW 2",
            Grade::S3 => "SAW 3",
            Grade::S4 => "SAW 4",
            Grade::S5 => "SAW 5",
            Grade::S6 => "SAW 6",
            Grade::UT => "UTILITY PULP",
            Grade::CR => "CAMP RUN",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Grade {
    type Err = CruiseError;

    /// Accepts the grade code, the reversed two-letter code (field sheets
    /// often record "MS" for SM), or the separator-tolerant display name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let looked = normalize_lookup(s);
        let reversed: String = looked.chars().rev().collect();
        Grade::ALL
            .iter()
            .find(|g| {
                looked == g.code()
                    || reversed == g.code()
                    || looked == normalize_lookup(g.name())
            })
            .copied()
            .ok_or_else(|| CruiseError::LogGrade(s.to_string()))
    }
}

/// `CODE - NAME` listing of every valid grade, used in error messages.
pub fn code_listing() -> String {
    Grade::ALL
        .iter()
        .map(|g| format!("{} - {}", g.code(), g.name()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One rung of a species' grading ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRule {
    /// Minimum top DIB in inches.
    pub min_dib: u32,
    /// Minimum log length in feet.
    pub min_length: u32,
    pub grade: Grade,
}

const fn rule(min_dib: u32, min_length: u32, grade: Grade) -> GradeRule {
    GradeRule {
        min_dib,
        min_length,
        grade,
    }
}

// Grading ladders per species, highest-value grade first. First satisfied
// rule wins.
const LADDER_DF_TYPE: [GradeRule; 6] = [
    rule(24, 17, Grade::P3),
    rule(16, 17, Grade::SM),
    rule(12, 12, Grade::S2),
    rule(6, 1, Grade::S3),
    rule(5, 1, Grade::S4),
    rule(1, 1, Grade::UT),
];

const LADDER_RC: [GradeRule; 5] = [
    rule(28, 16, Grade::S1),
    rule(20, 12, Grade::S2),
    rule(6, 1, Grade::S3),
    rule(5, 1, Grade::S4),
    rule(1, 1, Grade::UT),
];

const LADDER_SS: [GradeRule; 5] = [
    rule(24, 12, Grade::S1),
    rule(20, 12, Grade::S2),
    rule(6, 1, Grade::S3),
    rule(5, 1, Grade::S4),
    rule(1, 1, Grade::UT),
];

const LADDER_WHITE_PINE_TYPE: [GradeRule; 6] = [
    rule(24, 17, Grade::P3),
    rule(20, 16, Grade::S1),
    rule(12, 12, Grade::S2),
    rule(6, 1, Grade::S3),
    rule(5, 1, Grade::S4),
    rule(1, 1, Grade::UT),
];

const LADDER_PONDEROSA_TYPE: [GradeRule; 6] = [
    rule(24, 12, Grade::S2),
    rule(20, 16, Grade::S3),
    rule(12, 12, Grade::S4),
    rule(6, 1, Grade::S5),
    rule(5, 1, Grade::S6),
    rule(1, 1, Grade::UT),
];

const LADDER_HARDWOOD: [GradeRule; 5] = [
    rule(16, 8, Grade::S1),
    rule(12, 8, Grade::S2),
    rule(10, 8, Grade::S3),
    rule(5, 1, Grade::S4),
    rule(1, 1, Grade::UT),
];

const LADDER_CW: [GradeRule; 5] = [
    rule(24, 8, Grade::P3),
    rule(10, 8, Grade::S1),
    rule(6, 8, Grade::S2),
    rule(5, 1, Grade::S4),
    rule(1, 1, Grade::UT),
];

/// Grading ladder for a species, ordered highest-value grade first.
pub fn ladder(species: Species) -> &'static [GradeRule] {
    match species {
        Species::DF
        | Species::WH
        | Species::SF
        | Species::GF
        | Species::NF
        | Species::WL
        | Species::WF
        | Species::RF
        | Species::RW => &LADDER_DF_TYPE,
        Species::RC => &LADDER_RC,
        Species::SS => &LADDER_SS,
        Species::ES | Species::WP | Species::LP => &LADDER_WHITE_PINE_TYPE,
        Species::PP | Species::JP | Species::SP | Species::IC => &LADDER_PONDEROSA_TYPE,
        Species::RA | Species::BM | Species::AS => &LADDER_HARDWOOD,
        Species::CW => &LADDER_CW,
    }
}

/// Grade a log by walking the species' ladder in order. When defect exceeds
/// 5% and a lower rung exists, the grade steps down one rung.
pub fn grade_for(
    species: Species,
    top_dib: u32,
    length: u32,
    defect: u32,
) -> Result<Grade, CruiseError> {
    let rules = ladder(species);
    for (i, r) in rules.iter().enumerate() {
        if top_dib >= r.min_dib && length >= r.min_length {
            if defect > 5 && i + 1 < rules.len() {
                return Ok(rules[i + 1].grade);
            }
            return Ok(r.grade);
        }
    }
    Err(CruiseError::Ungradeable {
        species,
        top_dib,
        length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        for g in Grade::ALL {
            assert_eq!(g.code().parse::<Grade>().unwrap(), g);
        }
    }

    #[test]
    fn test_parse_reversed_code() {
        assert_eq!("MS".parse::<Grade>().unwrap(), Grade::SM);
        assert_eq!("3P".parse::<Grade>().unwrap(), Grade::P3);
        assert_eq!("TU".parse::<Grade>().unwrap(), Grade::UT);
    }

    #[test]
    fn test_parse_full_names() {
        assert_eq!("special mill".parse::<Grade>().unwrap(), Grade::SM);
        assert_eq!("special.mill".parse::<Grade>().unwrap(), Grade::SM);
        assert_eq!("SPECIAL_MILL".parse::<Grade>().unwrap(), Grade::SM);
        assert_eq!("camp-run".parse::<Grade>().unwrap(), Grade::CR);
        assert_eq!("utility pulp".parse::<Grade>().unwrap(), Grade::UT);
    }

    #[test]
    fn test_parse_unknown_grade() {
        let err = "Q9".parse::<Grade>().unwrap_err();
        assert!(matches!(err, CruiseError::LogGrade(_)));
        assert!("saw".parse::<Grade>().is_err());
    }

    #[test]
    fn test_ladder_order_df() {
        let rules = ladder(Species::DF);
        assert_eq!(rules[0].grade, Grade::P3);
        assert_eq!(rules.last().unwrap().grade, Grade::UT);
        // min DIBs strictly decrease down the ladder
        for pair in rules.windows(2) {
            assert!(pair[0].min_dib > pair[1].min_dib);
        }
    }

    #[test]
    fn test_grade_for_first_match_wins() {
        // 20" x 40' DF: fails P3 (needs 24"), passes SM (16" x 17')
        assert_eq!(grade_for(Species::DF, 20, 40, 0).unwrap(), Grade::SM);
        // 12" x 40' DF: S2
        assert_eq!(grade_for(Species::DF, 12, 40, 0).unwrap(), Grade::S2);
        // 5" x 40' DF: S4
        assert_eq!(grade_for(Species::DF, 5, 40, 0).unwrap(), Grade::S4);
    }

    #[test]
    fn test_grade_for_defect_steps_down() {
        assert_eq!(grade_for(Species::DF, 20, 40, 0).unwrap(), Grade::SM);
        assert_eq!(grade_for(Species::DF, 20, 40, 10).unwrap(), Grade::S2);
        // 5% is not a step-down
        assert_eq!(grade_for(Species::DF, 20, 40, 5).unwrap(), Grade::SM);
    }

    #[test]
    fn test_grade_for_defect_at_bottom_rung_stays() {
        // 1" DF only matches the UT rung; no lower rung to step to
        assert_eq!(grade_for(Species::DF, 1, 10, 50).unwrap(), Grade::UT);
    }

    #[test]
    fn test_grade_for_length_gate() {
        // 24" DF at 16' fails P3 (needs 17'), fails SM (needs 17'), lands S2
        assert_eq!(grade_for(Species::DF, 24, 16, 0).unwrap(), Grade::S2);
    }

    #[test]
    fn test_grade_for_ungradeable() {
        let err = grade_for(Species::DF, 0, 10, 0).unwrap_err();
        assert!(matches!(err, CruiseError::Ungradeable { .. }));
    }

    #[test]
    fn test_hardwood_ladder() {
        assert_eq!(grade_for(Species::RA, 16, 8, 0).unwrap(), Grade::S1);
        assert_eq!(grade_for(Species::RA, 16, 7, 0).unwrap(), Grade::S4);
    }

    #[test]
    fn test_ponderosa_ladder_tops_at_s2() {
        assert_eq!(grade_for(Species::PP, 30, 40, 0).unwrap(), Grade::S2);
    }
}
