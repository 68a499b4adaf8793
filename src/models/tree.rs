use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CruiseError;
use crate::models::Log;
use crate::reference::{Grade, Species};
use crate::taper::StemProfile;

/// Parameters driving the virtual-cruise bucking heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuckingParams {
    /// Target log length, feet. Industry standard is 40.
    pub preferred_log_length: u32,
    /// Shortest log worth cutting, feet. Industry standard is 16.
    pub minimum_log_length: u32,
    /// Smallest merchantable top DIB for a utility log, inches.
    pub utility_log_dib: u32,
}

impl Default for BuckingParams {
    fn default() -> Self {
        Self {
            preferred_log_length: 40,
            minimum_log_length: 16,
            utility_log_dib: 3,
        }
    }
}

impl BuckingParams {
    /// The bucking loop terminates because every non-final cut strictly
    /// advances up the stem; that argument needs these bounds.
    fn validate(&self) -> Result<(), CruiseError> {
        if self.minimum_log_length < 1 {
            return Err(CruiseError::Validation(
                "minimum log length must be at least 1 ft".to_string(),
            ));
        }
        if self.preferred_log_length < self.minimum_log_length {
            return Err(CruiseError::Validation(format!(
                "preferred log length {} ft is shorter than the minimum {} ft",
                self.preferred_log_length, self.minimum_log_length
            )));
        }
        if self.utility_log_dib < 1 {
            return Err(CruiseError::Validation(
                "utility log DIB must be at least 1 in.".to_string(),
            ));
        }
        Ok(())
    }
}

/// One measured stem.
///
/// A tree owns its logs and every derived figure (taper profile, merch
/// limits, per-acre expansions, volume totals). Mutating a dimension or
/// bucking parameter eagerly recomputes all of it, but does not touch any
/// plot or stand that holds this tree; re-aggregation upward is the
/// caller's explicit responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    number: u32,
    /// Plot expansion factor: positive = basal area factor (variable-area
    /// sampling), negative = negative inverse of fixed plot size
    /// (1/30 ac -> -30), zero = non-contributing record.
    plot_factor: f64,
    species: Species,
    /// Diameter at breast height, inches.
    dbh: f64,
    /// Total height, feet.
    total_height: f64,
    auto_cruise: Option<BuckingParams>,

    hdr: f64,
    ba: f64,
    rd: f64,
    tpa: f64,
    ba_ac: f64,
    rd_ac: f64,
    profile: StemProfile,
    merch_dib: u32,
    merch_height: u32,
    logs: Vec<Log>,

    gross_bf: u32,
    net_bf: u32,
    gross_cf: f64,
    net_cf: f64,
    gross_bf_ac: f64,
    net_bf_ac: f64,
    gross_cf_ac: f64,
    net_cf_ac: f64,
    vbar: f64,
    cbar: f64,
}

impl Tree {
    /// Build a tree for manual bucking; add logs with [`Tree::add_log`].
    pub fn new(
        number: u32,
        plot_factor: f64,
        species: Species,
        dbh: f64,
        total_height: f64,
    ) -> Result<Tree, CruiseError> {
        Tree::build(number, plot_factor, species, dbh, total_height, None)
    }

    /// Build a tree and virtually cruise it: merch limits are derived from
    /// the taper profile and logs are bucked automatically.
    pub fn auto_cruised(
        number: u32,
        plot_factor: f64,
        species: Species,
        dbh: f64,
        total_height: f64,
        params: BuckingParams,
    ) -> Result<Tree, CruiseError> {
        Tree::build(number, plot_factor, species, dbh, total_height, Some(params))
    }

    fn build(
        number: u32,
        plot_factor: f64,
        species: Species,
        dbh: f64,
        total_height: f64,
        auto_cruise: Option<BuckingParams>,
    ) -> Result<Tree, CruiseError> {
        validate_dimensions(number, plot_factor, dbh, total_height)?;
        if let Some(params) = &auto_cruise {
            params.validate()?;
        }
        let mut tree = Tree {
            number,
            plot_factor,
            species,
            dbh,
            total_height,
            auto_cruise,
            hdr: 0.0,
            ba: 0.0,
            rd: 0.0,
            tpa: 0.0,
            ba_ac: 0.0,
            rd_ac: 0.0,
            profile: StemProfile::build(species, dbh, total_height),
            merch_dib: 0,
            merch_height: 0,
            logs: Vec::new(),
            gross_bf: 0,
            net_bf: 0,
            gross_cf: 0.0,
            net_cf: 0.0,
            gross_bf_ac: 0.0,
            net_bf_ac: 0.0,
            gross_cf_ac: 0.0,
            net_cf_ac: 0.0,
            vbar: 0.0,
            cbar: 0.0,
        };
        tree.derive_state()?;
        Ok(tree)
    }

    /// Append a log whose top sits at `stem_height`. Logs are numbered from
    /// the stump upward and their stem heights must strictly increase.
    pub fn add_log(
        &mut self,
        stem_height: u32,
        length: u32,
        grade: Option<Grade>,
        defect: u32,
    ) -> Result<(), CruiseError> {
        if let Some(last) = self.logs.last() {
            if stem_height <= last.stem_height() {
                return Err(CruiseError::Validation(format!(
                    "Tree {}: log stem heights must strictly increase \
                     ({stem_height} ft follows {} ft)",
                    self.number,
                    last.stem_height()
                )));
            }
        }
        let log = Log::new(
            self.logs.len() as u32 + 1,
            self.species,
            &self.profile,
            self.tpa,
            stem_height,
            length,
            grade,
            defect,
        )?;
        self.logs.push(log);
        self.recompute_totals();
        Ok(())
    }

    // --- mutators: every one re-derives the full taper/merch/log state ---

    pub fn set_dbh(&mut self, dbh: f64) -> Result<(), CruiseError> {
        validate_dimensions(self.number, self.plot_factor, dbh, self.total_height)?;
        self.dbh = dbh;
        self.derive_state()
    }

    pub fn set_total_height(&mut self, total_height: f64) -> Result<(), CruiseError> {
        validate_dimensions(self.number, self.plot_factor, self.dbh, total_height)?;
        self.total_height = total_height;
        self.derive_state()
    }

    pub fn set_species(&mut self, species: Species) -> Result<(), CruiseError> {
        self.species = species;
        self.derive_state()
    }

    pub fn set_plot_factor(&mut self, plot_factor: f64) -> Result<(), CruiseError> {
        validate_dimensions(self.number, plot_factor, self.dbh, self.total_height)?;
        self.plot_factor = plot_factor;
        self.derive_state()
    }

    /// Replace the bucking parameters. On an auto-cruised tree this
    /// re-buckets every log from scratch; on a manually bucked tree the
    /// parameters are rejected as meaningless.
    pub fn set_bucking_params(&mut self, params: BuckingParams) -> Result<(), CruiseError> {
        params.validate()?;
        if self.auto_cruise.is_none() {
            return Err(CruiseError::Validation(format!(
                "Tree {}: bucking parameters only apply to auto-cruised trees",
                self.number
            )));
        }
        self.auto_cruise = Some(params);
        self.derive_state()
    }

    // --- log mutators: geometry goes through the tree so ordering and
    //     totals stay consistent ---

    pub fn set_log_stem_height(
        &mut self,
        log_number: u32,
        stem_height: u32,
    ) -> Result<(), CruiseError> {
        let idx = self.log_index(log_number)?;
        self.check_log_order(idx, stem_height)?;
        self.logs[idx].set_stem_height(stem_height, &self.profile)?;
        self.recompute_totals();
        Ok(())
    }

    pub fn set_log_length(&mut self, log_number: u32, length: u32) -> Result<(), CruiseError> {
        let idx = self.log_index(log_number)?;
        let log = &self.logs[idx];
        let new_top = i64::from(log.stem_height()) + i64::from(length) - i64::from(log.length());
        if new_top < 1 {
            return Err(CruiseError::Validation(format!(
                "Tree {}: log {log_number} cannot end at {new_top} ft",
                self.number
            )));
        }
        self.check_log_order(idx, new_top as u32)?;
        self.logs[idx].set_length(length, &self.profile)?;
        self.recompute_totals();
        Ok(())
    }

    pub fn set_log_defect(&mut self, log_number: u32, defect: u32) -> Result<(), CruiseError> {
        let idx = self.log_index(log_number)?;
        self.logs[idx].set_defect(defect, &self.profile)?;
        self.recompute_totals();
        Ok(())
    }

    pub fn set_log_grade(&mut self, log_number: u32, grade: Grade) -> Result<(), CruiseError> {
        let idx = self.log_index(log_number)?;
        self.logs[idx].set_grade(grade);
        Ok(())
    }

    fn log_index(&self, log_number: u32) -> Result<usize, CruiseError> {
        if log_number == 0 || log_number as usize > self.logs.len() {
            return Err(CruiseError::Validation(format!(
                "Tree {} has no log {log_number} (logs 1..={})",
                self.number,
                self.logs.len()
            )));
        }
        Ok(log_number as usize - 1)
    }

    fn check_log_order(&self, idx: usize, new_top: u32) -> Result<(), CruiseError> {
        let below_ok = idx == 0 || self.logs[idx - 1].stem_height() < new_top;
        let above_ok = idx + 1 >= self.logs.len() || new_top < self.logs[idx + 1].stem_height();
        if below_ok && above_ok {
            Ok(())
        } else {
            Err(CruiseError::Validation(format!(
                "Tree {}: moving log {} to {new_top} ft breaks stem-height order",
                self.number,
                idx + 1
            )))
        }
    }

    /// Rebuild everything derived from the dimensions: base metrics,
    /// per-acre expansion, taper profile, merch limits, and the logs
    /// (re-bucked when auto-cruised, replayed in place when manual).
    fn derive_state(&mut self) -> Result<(), CruiseError> {
        self.hdr = self.total_height / (self.dbh / 12.0);
        self.ba = self.dbh * self.dbh * 0.005454;
        self.rd = self.ba / self.dbh.sqrt();

        let (tpa, ba_ac, rd_ac) = per_acre_expansion(self.plot_factor, self.ba, self.rd);
        self.tpa = tpa;
        self.ba_ac = ba_ac;
        self.rd_ac = rd_ac;

        self.profile = StemProfile::build(self.species, self.dbh, self.total_height);
        let form_dib = self.profile.dib_at(17)?;
        self.merch_dib = (0.40 * f64::from(form_dib)).floor() as u32;
        self.merch_height =
            self.profile
                .height_for_dib(self.merch_dib)
                .ok_or(CruiseError::Profile {
                    stem_height: 17,
                    profile_top: self.profile.top_height(),
                })?;

        let replay: Vec<(u32, u32, Grade, u32)> = self
            .logs
            .iter()
            .map(|l| (l.stem_height(), l.length(), l.grade(), l.defect()))
            .collect();
        self.logs.clear();
        self.recompute_totals();

        if self.auto_cruise.is_some() {
            self.buck()?;
        } else {
            for (stem_height, length, grade, defect) in replay {
                self.add_log(stem_height, length, Some(grade), defect)?;
            }
        }
        Ok(())
    }

    /// The virtual cruise. Starting at stump height (1 ft), cut
    /// preferred-length logs while a full one fits under the merch height,
    /// then close out at the merch height, and finally reach for a utility
    /// log down to the utility DIB when enough stem remains.
    fn buck(&mut self) -> Result<(), CruiseError> {
        let Some(params) = self.auto_cruise else {
            return Ok(());
        };
        let pref = params.preferred_log_length;
        let min = params.minimum_log_length;

        let mut cuts: Vec<u32> = vec![1];
        let mut prev = 1u32;
        loop {
            // would the next log, with its foot of trim, run past the
            // merchantable stem? then this is the last segment
            if prev + min + 3 > self.merch_height {
                if let Some(utility_height) = self.profile.height_for_dib(params.utility_log_dib)
                {
                    let remaining = i64::from(utility_height) - i64::from(prev) - 1;
                    if remaining >= i64::from(min) {
                        cuts.push(utility_height);
                    }
                }
                break;
            }
            let next = if prev + 1 + pref <= self.merch_height {
                prev + pref + 1
            } else {
                self.merch_height
            };
            cuts.push(next);
            prev = next;
        }
        debug!(tree = self.number, ?cuts, "auto-cruise cut points");

        for pair in cuts.windows(2) {
            // a foot of trim between logs; lengths round down to even feet
            let length = (pair[1] - pair[0]) / 2 * 2;
            self.add_log(pair[1], length, None, 0)?;
        }
        Ok(())
    }

    fn recompute_totals(&mut self) {
        self.gross_bf = self.logs.iter().map(Log::gross_bf).sum();
        self.net_bf = self.logs.iter().map(Log::net_bf).sum();
        self.gross_cf = self.logs.iter().map(Log::gross_cf).sum();
        self.net_cf = self.logs.iter().map(Log::net_cf).sum();

        self.gross_bf_ac = f64::from(self.gross_bf) * self.tpa;
        self.net_bf_ac = f64::from(self.net_bf) * self.tpa;
        self.gross_cf_ac = self.gross_cf * self.tpa;
        self.net_cf_ac = self.net_cf * self.tpa;

        if self.logs.is_empty() {
            self.vbar = 0.0;
            self.cbar = 0.0;
        } else {
            self.vbar = f64::from(self.net_bf) / self.ba;
            self.cbar = self.net_cf / self.ba;
        }
    }

    pub(crate) fn set_number(&mut self, number: u32) {
        self.number = number;
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn plot_factor(&self) -> f64 {
        self.plot_factor
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn dbh(&self) -> f64 {
        self.dbh
    }

    pub fn total_height(&self) -> f64 {
        self.total_height
    }

    pub fn is_auto_cruised(&self) -> bool {
        self.auto_cruise.is_some()
    }

    pub fn bucking_params(&self) -> Option<BuckingParams> {
        self.auto_cruise
    }

    /// Height-to-diameter ratio: total height over DBH in feet.
    pub fn hdr(&self) -> f64 {
        self.hdr
    }

    /// Basal area, sq ft.
    pub fn ba(&self) -> f64 {
        self.ba
    }

    /// Relative density index: BA / sqrt(DBH).
    pub fn rd(&self) -> f64 {
        self.rd
    }

    pub fn tpa(&self) -> f64 {
        self.tpa
    }

    pub fn ba_ac(&self) -> f64 {
        self.ba_ac
    }

    pub fn rd_ac(&self) -> f64 {
        self.rd_ac
    }

    pub fn profile(&self) -> &StemProfile {
        &self.profile
    }

    pub fn merch_dib(&self) -> u32 {
        self.merch_dib
    }

    pub fn merch_height(&self) -> u32 {
        self.merch_height
    }

    pub fn logs(&self) -> &[Log] {
        &self.logs
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

    /// Net board feet per square foot of basal area.
    pub fn vbar(&self) -> f64 {
        self.vbar
    }

    /// Net cubic feet per square foot of basal area.
    pub fn cbar(&self) -> f64 {
        self.cbar
    }
}

fn validate_dimensions(
    number: u32,
    plot_factor: f64,
    dbh: f64,
    total_height: f64,
) -> Result<(), CruiseError> {
    if !plot_factor.is_finite() {
        return Err(CruiseError::Validation(format!(
            "Tree {number}: plot factor must be finite, got {plot_factor}"
        )));
    }
    if !dbh.is_finite() || dbh <= 0.0 {
        return Err(CruiseError::Validation(format!(
            "Tree {number}: DBH must be positive, got {dbh}"
        )));
    }
    if !total_height.is_finite() || total_height <= 0.0 {
        return Err(CruiseError::Validation(format!(
            "Tree {number}: total height must be positive, got {total_height}"
        )));
    }
    if total_height < 17.0 {
        return Err(CruiseError::Validation(format!(
            "Tree {number}: total height {total_height} ft does not reach the 17 ft form height"
        )));
    }
    Ok(())
}

/// TPA, BA/ac, and RD/ac under the signed expansion-factor convention.
fn per_acre_expansion(plot_factor: f64, ba: f64, rd: f64) -> (f64, f64, f64) {
    if plot_factor == 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let (tpa, ba_ac) = if plot_factor > 0.0 {
        (plot_factor / ba, plot_factor)
    } else {
        (plot_factor.abs(), plot_factor.abs() * ba)
    };
    (tpa, ba_ac, tpa * rd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn reference_tree() -> Tree {
        Tree::auto_cruised(1, -30.0, Species::DF, 18.8, 103.0, BuckingParams::default())
            .unwrap()
    }

    // --- construction & validation ---

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(Tree::new(1, 40.0, Species::DF, 0.0, 100.0).is_err());
        assert!(Tree::new(1, 40.0, Species::DF, -3.0, 100.0).is_err());
        assert!(Tree::new(1, 40.0, Species::DF, 18.0, 0.0).is_err());
        assert!(Tree::new(1, 40.0, Species::DF, 18.0, f64::NAN).is_err());
    }

    #[test]
    fn test_rejects_height_below_form_height() {
        let err = Tree::new(1, 40.0, Species::DF, 18.0, 14.0).unwrap_err();
        assert!(err.to_string().contains("17 ft form height"));
    }

    #[test]
    fn test_rejects_bad_bucking_params() {
        let params = BuckingParams {
            preferred_log_length: 10,
            minimum_log_length: 16,
            utility_log_dib: 3,
        };
        assert!(Tree::auto_cruised(1, 40.0, Species::DF, 18.8, 103.0, params).is_err());
        let params = BuckingParams {
            minimum_log_length: 0,
            ..BuckingParams::default()
        };
        assert!(Tree::auto_cruised(1, 40.0, Species::DF, 18.8, 103.0, params).is_err());
    }

    // --- base metrics & expansion convention ---

    #[test]
    fn test_base_metrics() {
        let tree = reference_tree();
        assert_approx_eq!(tree.ba(), 18.8 * 18.8 * 0.005454, 1e-12);
        assert_approx_eq!(tree.rd(), tree.ba() / 18.8_f64.sqrt(), 1e-12);
        assert_approx_eq!(tree.hdr(), 103.0 / (18.8 / 12.0), 1e-12);
    }

    #[test]
    fn test_fixed_plot_expansion() {
        // -30 is a 1/30-acre fixed plot: TPA is exactly 30
        let tree = reference_tree();
        assert_eq!(tree.tpa(), 30.0);
        assert_approx_eq!(tree.ba_ac(), 30.0 * tree.ba(), 1e-9);
        assert_approx_eq!(tree.rd_ac(), 30.0 * tree.rd(), 1e-9);
    }

    #[test]
    fn test_variable_plot_expansion() {
        let tree = Tree::new(1, 40.0, Species::DF, 18.8, 103.0).unwrap();
        assert_approx_eq!(tree.tpa(), 40.0 / tree.ba(), 1e-9);
        assert_eq!(tree.ba_ac(), 40.0);
        assert_approx_eq!(tree.rd_ac(), tree.tpa() * tree.rd(), 1e-9);
    }

    #[test]
    fn test_zero_factor_contributes_nothing() {
        let tree =
            Tree::auto_cruised(1, 0.0, Species::DF, 18.8, 103.0, BuckingParams::default())
                .unwrap();
        assert_eq!(tree.tpa(), 0.0);
        assert_eq!(tree.ba_ac(), 0.0);
        assert_eq!(tree.rd_ac(), 0.0);
        assert_eq!(tree.gross_bf_ac(), 0.0);
        // per-log volumes still exist
        assert!(tree.gross_bf() > 0);
    }

    // --- merch limits ---

    #[test]
    fn test_merch_limits() {
        let tree = reference_tree();
        // form-height DIB 14 -> merch DIB floor(0.4 * 14) = 5
        assert_eq!(tree.merch_dib(), 5);
        assert_eq!(tree.merch_height(), 85);
    }

    // --- auto-cruise regression fixture ---

    #[test]
    fn test_auto_cruise_reference_fixture() {
        let tree = reference_tree();
        let logs = tree.logs();
        assert_eq!(logs.len(), 2);

        assert_eq!(logs[0].number(), 1);
        assert_eq!(logs[0].stem_height(), 42);
        assert_eq!(logs[0].length(), 40);
        assert_eq!(logs[0].top_dib(), 12);
        assert_eq!(logs[0].grade(), Grade::S2);
        assert_eq!(logs[0].gross_bf(), 196);

        assert_eq!(logs[1].number(), 2);
        assert_eq!(logs[1].stem_height(), 83);
        assert_eq!(logs[1].length(), 40);
        assert_eq!(logs[1].top_dib(), 5);
        assert_eq!(logs[1].grade(), Grade::S4);
        assert_eq!(logs[1].gross_bf(), 42);

        assert_eq!(tree.gross_bf(), 238);
        assert_eq!(tree.net_bf(), 238);
        assert_approx_eq!(tree.gross_bf_ac(), 238.0 * 30.0, 1e-9);
    }

    #[test]
    fn test_auto_cruise_final_log_within_merch() {
        for (dbh, height) in [(14.3, 105.0), (20.4, 119.0), (25.0, 117.0), (29.5, 119.0)] {
            let tree =
                Tree::auto_cruised(1, 40.0, Species::DF, dbh, height, BuckingParams::default())
                    .unwrap();
            let mut prev = 1;
            for log in tree.logs() {
                assert!(log.stem_height() > prev);
                // a foot of trim, minus up to a foot lost to even lengths
                let gap = log.stem_height() - prev - log.length();
                assert!(gap <= 2, "gap {gap} at log {}", log.number());
                assert_eq!(log.length() % 2, 0);
                prev = log.stem_height();
            }
        }
    }

    #[test]
    fn test_auto_cruise_tall_tree_cuts_preferred_lengths() {
        let tree =
            Tree::auto_cruised(1, 40.0, Species::RC, 40.5, 175.0, BuckingParams::default())
                .unwrap();
        assert!(tree.logs().len() >= 3);
        // the lower stem fills with full preferred-length cuts
        assert_eq!(tree.logs()[0].stem_height(), 42);
        assert_eq!(tree.logs()[0].length(), 40);
        assert_eq!(tree.logs()[1].stem_height(), 83);
        assert_eq!(tree.logs()[1].length(), 40);
        let mut prev = 1;
        for log in tree.logs() {
            assert!(log.stem_height() > prev);
            assert_eq!(log.length() % 2, 0);
            prev = log.stem_height();
        }
        assert!(prev <= tree.profile().top_height());
    }

    // --- manual bucking & round-trip ---

    #[test]
    fn test_manual_matches_auto_round_trip() {
        let auto = reference_tree();
        let mut manual = Tree::new(1, -30.0, Species::DF, 18.8, 103.0).unwrap();
        for log in auto.logs() {
            manual
                .add_log(log.stem_height(), log.length(), None, log.defect())
                .unwrap();
        }
        assert_eq!(manual.gross_bf(), auto.gross_bf());
        assert_eq!(manual.net_bf(), auto.net_bf());
        assert_approx_eq!(manual.gross_cf(), auto.gross_cf(), 1e-9);
        assert_approx_eq!(manual.net_cf(), auto.net_cf(), 1e-9);
        assert_approx_eq!(manual.net_bf_ac(), auto.net_bf_ac(), 1e-9);
        assert_approx_eq!(manual.vbar(), auto.vbar(), 1e-9);
    }

    #[test]
    fn test_add_log_enforces_increasing_heights() {
        let mut tree = Tree::new(1, 40.0, Species::DF, 18.8, 103.0).unwrap();
        tree.add_log(42, 40, None, 0).unwrap();
        let err = tree.add_log(42, 16, None, 0).unwrap_err();
        assert!(err.to_string().contains("strictly increase"));
        assert!(tree.add_log(30, 16, None, 0).is_err());
        tree.add_log(83, 40, None, 0).unwrap();
        assert_eq!(tree.logs().len(), 2);
    }

    #[test]
    fn test_tree_totals_sum_logs() {
        let mut tree = Tree::new(1, 40.0, Species::DF, 18.8, 103.0).unwrap();
        tree.add_log(42, 40, None, 0).unwrap();
        tree.add_log(83, 40, None, 10).unwrap();
        let logs = tree.logs();
        assert_eq!(tree.gross_bf(), logs[0].gross_bf() + logs[1].gross_bf());
        assert_eq!(tree.net_bf(), logs[0].net_bf() + logs[1].net_bf());
        assert_approx_eq!(tree.net_cf(), logs[0].net_cf() + logs[1].net_cf(), 1e-12);
        assert_approx_eq!(tree.vbar(), f64::from(tree.net_bf()) / tree.ba(), 1e-12);
        assert_approx_eq!(tree.cbar(), tree.net_cf() / tree.ba(), 1e-12);
    }

    // --- mutation & recompute ---

    #[test]
    fn test_set_dbh_rebuckets_auto_tree() {
        let mut tree = reference_tree();
        tree.set_dbh(24.5).unwrap();
        // wider tree: form-height DIB 18, merch DIB floor(0.4 * 18) = 7
        assert_eq!(tree.merch_dib(), 7);
        assert_eq!(
            tree.merch_height(),
            tree.profile().height_for_dib(7).unwrap()
        );
        assert_eq!(tree.logs()[0].top_dib(), tree.profile().dib_at(42).unwrap());
        assert!(tree.gross_bf() > 238);
    }

    #[test]
    fn test_set_height_replays_manual_logs() {
        let mut tree = Tree::new(1, 40.0, Species::DF, 18.8, 103.0).unwrap();
        tree.add_log(42, 40, None, 5).unwrap();
        let old_dib = tree.logs()[0].top_dib();
        tree.set_total_height(110.0).unwrap();
        let log = &tree.logs()[0];
        // same cut, same defect, refreshed volumes from the new profile
        assert_eq!(log.stem_height(), 42);
        assert_eq!(log.length(), 40);
        assert_eq!(log.defect(), 5);
        assert!(log.top_dib() >= old_dib);
    }

    #[test]
    fn test_shrinking_height_past_manual_log_fails() {
        let mut tree = Tree::new(1, 40.0, Species::DF, 18.8, 103.0).unwrap();
        tree.add_log(90, 40, None, 0).unwrap();
        assert!(tree.set_total_height(60.0).is_err());
    }

    #[test]
    fn test_set_species_regrades() {
        let mut tree = reference_tree();
        tree.set_species(Species::PP).unwrap();
        assert_eq!(tree.species(), Species::PP);
        for log in tree.logs() {
            // ponderosa ladder tops out at S2, so nothing grades above it
            assert!(log.grade() >= Grade::S2);
        }
    }

    #[test]
    fn test_set_plot_factor_rescales_per_acre() {
        let mut tree = reference_tree();
        let bf = tree.gross_bf();
        tree.set_plot_factor(-20.0).unwrap();
        assert_eq!(tree.tpa(), 20.0);
        assert_eq!(tree.gross_bf(), bf);
        assert_approx_eq!(tree.gross_bf_ac(), f64::from(bf) * 20.0, 1e-9);
    }

    #[test]
    fn test_set_bucking_params_rebuckets() {
        let mut tree = reference_tree();
        tree.set_bucking_params(BuckingParams {
            preferred_log_length: 20,
            minimum_log_length: 16,
            utility_log_dib: 3,
        })
        .unwrap();
        assert!(tree.logs().len() > 2);
        assert_eq!(tree.logs()[0].length(), 20);
    }

    #[test]
    fn test_set_bucking_params_on_manual_tree_fails() {
        let mut tree = Tree::new(1, 40.0, Species::DF, 18.8, 103.0).unwrap();
        assert!(tree.set_bucking_params(BuckingParams::default()).is_err());
    }

    #[test]
    fn test_log_geometry_through_tree() {
        let mut tree = Tree::new(1, 40.0, Species::DF, 18.8, 103.0).unwrap();
        tree.add_log(42, 40, None, 0).unwrap();
        tree.add_log(83, 40, None, 0).unwrap();
        let before = tree.gross_bf();
        tree.set_log_stem_height(1, 38).unwrap();
        assert_eq!(tree.logs()[0].length(), 36);
        assert!(tree.gross_bf() < before);
        // moving log 1 past log 2 is rejected
        assert!(tree.set_log_stem_height(1, 83).is_err());
        assert!(tree.set_log_stem_height(3, 90).is_err());
    }

    #[test]
    fn test_set_log_grade_and_defect() {
        let mut tree = Tree::new(1, 40.0, Species::DF, 18.8, 103.0).unwrap();
        tree.add_log(42, 40, None, 0).unwrap();
        let net_before = tree.net_bf();
        tree.set_log_defect(1, 50).unwrap();
        assert!(tree.net_bf() < net_before);
        tree.set_log_grade(1, Grade::CR).unwrap();
        assert_eq!(tree.logs()[0].grade(), Grade::CR);
    }

    #[test]
    fn test_tree_json_roundtrip() {
        let tree = reference_tree();
        let json = serde_json::to_string(&tree).unwrap();
        let back: Tree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
