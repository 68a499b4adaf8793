use serde::{Deserialize, Serialize};

/// Standard marketing bands for log length.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum LengthRange {
    UpTo10,
    From11To20,
    From21To30,
    From31To40,
    Over40,
}

impl LengthRange {
    /// Every band, shortest first.
    pub const ALL: [LengthRange; 5] = [
        LengthRange::UpTo10,
        LengthRange::From11To20,
        LengthRange::From21To30,
        LengthRange::From31To40,
        LengthRange::Over40,
    ];

    /// Band for a log length in feet.
    pub fn from_length(length: u32) -> LengthRange {
        match length {
            0..=10 => LengthRange::UpTo10,
            11..=20 => LengthRange::From11To20,
            21..=30 => LengthRange::From21To30,
            31..=40 => LengthRange::From31To40,
            _ => LengthRange::Over40,
        }
    }

    /// Display label used in merchandizing tables.
    pub fn label(&self) -> &'static str {
        match self {
            LengthRange::UpTo10 => "<= 10 feet",
            LengthRange::From11To20 => "11 - 20 feet",
            LengthRange::From21To30 => "21 - 30 feet",
            LengthRange::From31To40 => "31 - 40 feet",
            LengthRange::Over40 => "> 40 feet",
        }
    }
}

impl std::fmt::Display for LengthRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
