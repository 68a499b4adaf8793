//! Static reference data: species, log grades, Scribner coefficients, and
//! log length ranges. All tables are immutable, process-wide constants with
//! no mutation API.

pub mod grade;
pub mod lengths;
pub mod scribner;
pub mod species;

pub use grade::{Grade, GradeRule};
pub use lengths::LengthRange;
pub use scribner::scribner_coefficient;
pub use species::Species;

/// Normalize a user-supplied reference code or display name: uppercase,
/// with `.`, `_`, and `-` treated as spaces.
pub(crate) fn normalize_lookup(input: &str) -> String {
    input
        .trim()
        .to_uppercase()
        .chars()
        .map(|c| match c {
            '.' | '_' | '-' => ' ',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_uppercases() {
        assert_eq!(normalize_lookup("df"), "DF");
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize_lookup("douglas-fir"), "DOUGLAS FIR");
        assert_eq!(normalize_lookup("DOUGLAS_FIR"), "DOUGLAS FIR");
        assert_eq!(normalize_lookup("douglas.fir"), "DOUGLAS FIR");
    }

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_lookup("  wh "), "WH");
    }
}
