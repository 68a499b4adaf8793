use serde::{Deserialize, Serialize};

use crate::error::CruiseError;
use crate::reference::{grade, scribner_coefficient, Grade, LengthRange, Species};
use crate::taper::StemProfile;

/// One bucked segment of a tree's stem.
///
/// A log is owned exclusively by its [`Tree`](crate::models::Tree); geometry
/// mutations go through the owning tree so the taper profile and tree totals
/// stay consistent. All volume fields are derived and read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
    number: u32,
    /// Stem height of the log's top, feet.
    stem_height: u32,
    /// Log length, feet.
    length: u32,
    /// Defect percentage, whole number 0-100.
    defect: u32,
    grade: Grade,
    species: Species,
    /// Logs per acre: the owning tree's TPA.
    lpa: f64,
    top_dib: u32,
    scribner: f64,
    gross_bf: u32,
    net_bf: u32,
    gross_cf: f64,
    net_cf: f64,
    gross_bf_ac: f64,
    net_bf_ac: f64,
    gross_cf_ac: f64,
    net_cf_ac: f64,
    length_range: LengthRange,
}

impl Log {
    /// Build a log against its tree's taper profile. Grade is computed from
    /// the species' grading ladder when not supplied.
    pub(crate) fn new(
        number: u32,
        species: Species,
        profile: &StemProfile,
        lpa: f64,
        stem_height: u32,
        length: u32,
        grade: Option<Grade>,
        defect: u32,
    ) -> Result<Log, CruiseError> {
        if length == 0 {
            return Err(CruiseError::Validation(format!(
                "Log {number}: length must be positive, got 0"
            )));
        }
        if defect > 100 {
            return Err(CruiseError::Validation(format!(
                "Log {number}: defect must be 0-100, got {defect}"
            )));
        }
        let top_dib = profile.dib_at(stem_height)?;
        let grade = match grade {
            Some(g) => g,
            None => grade::grade_for(species, top_dib, length, defect)?,
        };
        let mut log = Log {
            number,
            stem_height,
            length,
            defect,
            grade,
            species,
            lpa,
            top_dib,
            scribner: 0.0,
            gross_bf: 0,
            net_bf: 0,
            gross_cf: 0.0,
            net_cf: 0.0,
            gross_bf_ac: 0.0,
            net_bf_ac: 0.0,
            gross_cf_ac: 0.0,
            net_cf_ac: 0.0,
            length_range: LengthRange::from_length(length),
        };
        log.recompute(profile, lpa)?;
        Ok(log)
    }

    /// Refresh every derived figure from the current geometry. The assigned
    /// grade is kept; only volumes and the length range move.
    pub(crate) fn recompute(
        &mut self,
        profile: &StemProfile,
        lpa: f64,
    ) -> Result<(), CruiseError> {
        self.lpa = lpa;
        self.top_dib = profile.dib_at(self.stem_height)?;
        self.scribner = scribner_coefficient(self.top_dib, self.length)?;

        let gross_bf_raw = f64::from(self.length) * self.scribner;
        let defect_factor = 1.0 - f64::from(self.defect) / 100.0;
        self.gross_bf = gross_bf_raw.floor() as u32;
        self.net_bf = (gross_bf_raw * defect_factor).floor() as u32;

        // two-end conic rule: short logs scale by 0.67, longer logs add a foot
        let x = if self.length < 17 {
            f64::from(self.length) * 0.67
        } else {
            f64::from(self.length) + 1.0
        };
        let d = f64::from(self.top_dib) + 0.7;
        self.gross_cf = 0.005454 * x * ((2.0 * d * d + 2.0 * d) / 3.0);
        self.net_cf = self.gross_cf * defect_factor;

        self.gross_bf_ac = f64::from(self.gross_bf) * self.lpa;
        self.net_bf_ac = f64::from(self.net_bf) * self.lpa;
        self.gross_cf_ac = self.gross_cf * self.lpa;
        self.net_cf_ac = self.net_cf * self.lpa;

        self.length_range = LengthRange::from_length(self.length);
        Ok(())
    }

    /// Move the log's top, shifting the length by the same delta.
    pub(crate) fn set_stem_height(
        &mut self,
        stem_height: u32,
        profile: &StemProfile,
    ) -> Result<(), CruiseError> {
        let new_length =
            i64::from(self.length) + i64::from(stem_height) - i64::from(self.stem_height);
        if new_length < 1 {
            return Err(CruiseError::Validation(format!(
                "Log {}: moving the top to {stem_height} ft leaves a {new_length} ft log",
                self.number
            )));
        }
        self.stem_height = stem_height;
        self.length = new_length as u32;
        self.recompute(profile, self.lpa)
    }

    /// Change the length, moving the top by the same delta.
    pub(crate) fn set_length(
        &mut self,
        length: u32,
        profile: &StemProfile,
    ) -> Result<(), CruiseError> {
        if length == 0 {
            return Err(CruiseError::Validation(format!(
                "Log {}: length must be positive, got 0",
                self.number
            )));
        }
        let new_top =
            i64::from(self.stem_height) + i64::from(length) - i64::from(self.length);
        if new_top < 1 {
            return Err(CruiseError::Validation(format!(
                "Log {}: shortening to {length} ft puts the top at {new_top} ft",
                self.number
            )));
        }
        self.stem_height = new_top as u32;
        self.length = length;
        self.recompute(profile, self.lpa)
    }

    pub(crate) fn set_defect(
        &mut self,
        defect: u32,
        profile: &StemProfile,
    ) -> Result<(), CruiseError> {
        if defect > 100 {
            return Err(CruiseError::Validation(format!(
                "Log {}: defect must be 0-100, got {defect}",
                self.number
            )));
        }
        self.defect = defect;
        self.recompute(profile, self.lpa)
    }

    /// Assign a grade directly. Volumes do not depend on grade, so nothing
    /// else is recomputed.
    pub(crate) fn set_grade(&mut self, grade: Grade) {
        self.grade = grade;
    }

    pub(crate) fn set_number(&mut self, number: u32) {
        self.number = number;
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn stem_height(&self) -> u32 {
        self.stem_height
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn defect(&self) -> u32 {
        self.defect
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

    pub fn species(&self) -> Species {
        self.species
    }

    /// Logs per acre, inherited from the owning tree's TPA.
    pub fn lpa(&self) -> f64 {
        self.lpa
    }

    pub fn top_dib(&self) -> u32 {
        self.top_dib
    }

    /// Scribner coefficient applied per foot of length.
    pub fn scribner(&self) -> f64 {
        self.scribner
    }

    pub fn gross_bf(&self) -> u32 {
        self.gross_bf
    }

    pub fn net_bf(&self) -> u32 {
        self.net_bf
    }

    pub fn gross_cf(&self) -> f64 {
        self.gross_cf
    }

    pub fn net_cf(&self) -> f64 {
        self.net_cf
    }

    pub fn gross_bf_ac(&self) -> f64 {
        self.gross_bf_ac
    }

    pub fn net_bf_ac(&self) -> f64 {
        self.net_bf_ac
    }

    pub fn gross_cf_ac(&self) -> f64 {
        self.gross_cf_ac
    }

    pub fn net_cf_ac(&self) -> f64 {
        self.net_cf_ac
    }

    pub fn length_range(&self) -> LengthRange {
        self.length_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn df_profile() -> StemProfile {
        StemProfile::build(Species::DF, 18.8, 103.0)
    }

    fn make_log(stem_height: u32, length: u32, grade: Option<Grade>, defect: u32) -> Log {
        Log::new(
            1,
            Species::DF,
            &df_profile(),
            5.0,
            stem_height,
            length,
            grade,
            defect,
        )
        .unwrap()
    }

    #[test]
    fn test_top_dib_from_profile() {
        let log = make_log(42, 40, None, 0);
        assert_eq!(log.top_dib(), 12);
    }

    #[test]
    fn test_board_feet_floor() {
        // 12" top DIB -> coefficient 4.9; 40 * 4.9 = 196
        let log = make_log(42, 40, None, 0);
        assert_eq!(log.scribner(), 4.9);
        assert_eq!(log.gross_bf(), 196);
        assert_eq!(log.net_bf(), 196);
    }

    #[test]
    fn test_net_board_feet_scales_unfloored_gross() {
        // 5" top DIB -> 1.07; raw gross 42.8 -> floor 42; net floor(42.8 * 0.9) = 38
        let log = make_log(83, 40, None, 10);
        assert_eq!(log.gross_bf(), 42);
        assert_eq!(log.net_bf(), 38);
    }

    #[test]
    fn test_cubic_feet_long_log() {
        // length >= 17 -> effective length 41
        let log = make_log(42, 40, None, 0);
        let d = 12.0 + 0.7;
        let expected = 0.005454 * 41.0 * ((2.0 * d * d + 2.0 * d) / 3.0);
        assert_approx_eq!(log.gross_cf(), expected, 1e-9);
        assert_approx_eq!(log.net_cf(), expected, 1e-9);
    }

    #[test]
    fn test_cubic_feet_short_log() {
        // length < 17 -> effective length 16 * 0.67
        let log = make_log(42, 16, None, 0);
        let d = 12.0 + 0.7;
        let expected = 0.005454 * (16.0 * 0.67) * ((2.0 * d * d + 2.0 * d) / 3.0);
        assert_approx_eq!(log.gross_cf(), expected, 1e-9);
    }

    #[test]
    fn test_defect_scales_cubic_not_floored() {
        let clean = make_log(42, 40, None, 0);
        let rotten = make_log(42, 40, None, 25);
        assert_approx_eq!(rotten.net_cf(), clean.gross_cf() * 0.75, 1e-9);
        assert_approx_eq!(rotten.gross_cf(), clean.gross_cf(), 1e-9);
    }

    #[test]
    fn test_auto_grade() {
        let log = make_log(42, 40, None, 0);
        assert_eq!(log.grade(), Grade::S2);
        let upper = make_log(83, 40, None, 0);
        assert_eq!(upper.grade(), Grade::S4);
    }

    #[test]
    fn test_explicit_grade_wins() {
        let log = make_log(42, 40, Some(Grade::CR), 0);
        assert_eq!(log.grade(), Grade::CR);
    }

    #[test]
    fn test_per_acre_expansion() {
        let log = make_log(42, 40, None, 0);
        assert_approx_eq!(log.gross_bf_ac(), 196.0 * 5.0, 1e-9);
        assert_approx_eq!(log.net_cf_ac(), log.net_cf() * 5.0, 1e-9);
        assert_eq!(log.lpa(), 5.0);
    }

    #[test]
    fn test_length_range() {
        assert_eq!(make_log(42, 40, None, 0).length_range(), LengthRange::From31To40);
        assert_eq!(make_log(42, 16, None, 0).length_range(), LengthRange::From11To20);
    }

    #[test]
    fn test_stem_height_beyond_profile_fails() {
        let profile = df_profile();
        let err =
            Log::new(1, Species::DF, &profile, 5.0, 110, 40, None, 0).unwrap_err();
        assert!(matches!(err, CruiseError::Profile { stem_height: 110, .. }));
    }

    #[test]
    fn test_zero_length_rejected() {
        let profile = df_profile();
        assert!(Log::new(1, Species::DF, &profile, 5.0, 42, 0, None, 0).is_err());
    }

    #[test]
    fn test_defect_over_100_rejected() {
        let profile = df_profile();
        assert!(Log::new(1, Species::DF, &profile, 5.0, 42, 40, None, 101).is_err());
    }

    #[test]
    fn test_set_stem_height_shifts_length() {
        let profile = df_profile();
        let mut log = make_log(42, 40, None, 0);
        log.set_stem_height(38, &profile).unwrap();
        assert_eq!(log.stem_height(), 38);
        assert_eq!(log.length(), 36);
        // top DIB refreshed from the new height
        assert_eq!(log.top_dib(), profile.dib_at(38).unwrap());
    }

    #[test]
    fn test_set_length_shifts_top() {
        let profile = df_profile();
        let mut log = make_log(42, 40, None, 0);
        log.set_length(36, &profile).unwrap();
        assert_eq!(log.length(), 36);
        assert_eq!(log.stem_height(), 38);
    }

    #[test]
    fn test_geometry_mutation_keeps_grade() {
        let profile = df_profile();
        let mut log = make_log(42, 40, None, 0);
        assert_eq!(log.grade(), Grade::S2);
        log.set_stem_height(60, &profile).unwrap();
        // DIB at 60' is below the S2 gate but the assigned grade persists
        assert_eq!(log.grade(), Grade::S2);
    }

    #[test]
    fn test_mutation_to_collapsed_length_fails() {
        let profile = df_profile();
        let mut log = make_log(42, 40, None, 0);
        assert!(log.set_stem_height(2, &profile).is_err());
    }

    #[test]
    fn test_grading_monotone_in_defect() {
        // spec property: raising defect past 5% never raises the grade
        let clean = make_log(42, 40, None, 0);
        for defect in [6, 10, 25, 50] {
            let worse = make_log(42, 40, None, defect);
            assert!(worse.grade() >= clean.grade());
        }
    }

    #[test]
    fn test_log_json_roundtrip() {
        let log = make_log(42, 40, None, 5);
        let json = serde_json::to_string(&log).unwrap();
        let back: Log = serde_json::from_str(&json).unwrap();
        assert_eq!(back, log);
    }
}
