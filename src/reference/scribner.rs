use crate::error::CruiseError;

/// One entry of the Scribner coefficient table.
///
/// For top DIBs of 6-11 inches the published coefficient depends on the log
/// length bracket (< 16 ft, 16-31 ft, >= 32 ft).
#[derive(Debug, Clone, Copy, PartialEq)]
enum Entry {
    Fixed(f64),
    ByLength([f64; 3]),
}

use Entry::{ByLength, Fixed};

/// Scribner log-length coefficients indexed by top DIB, 0-120 inches.
/// Multiplied by log length to yield gross board feet.
const SCRIBNER: [Entry; 121] = [
    Fixed(0.0),
    Fixed(0.0),
    Fixed(0.143),
    Fixed(0.39),
    Fixed(0.676),
    Fixed(1.07),
    ByLength([1.16, 1.249, 1.57]),
    ByLength([1.4, 1.608, 1.8]),
    ByLength([1.501, 1.854, 2.2]),
    ByLength([2.084, 2.41, 2.9]),
    ByLength([3.126, 3.542, 3.815]),
    ByLength([3.749, 4.167, 4.499]),
    Fixed(4.9),
    Fixed(6.043),
    Fixed(7.14),
    Fixed(8.88),
    Fixed(10.0),
    Fixed(11.528),
    Fixed(13.29),
    Fixed(14.99),
    Fixed(17.499),
    Fixed(18.99),
    Fixed(20.88),
    Fixed(23.51),
    Fixed(25.218),
    Fixed(28.677),
    Fixed(31.249),
    Fixed(34.22),
    Fixed(36.376),
    Fixed(38.04),
    Fixed(41.06),
    Fixed(44.376),
    Fixed(45.975),
    Fixed(48.99),
    Fixed(50.0),
    Fixed(54.688),
    Fixed(57.66),
    Fixed(64.319),
    Fixed(66.731),
    Fixed(70.0),
    Fixed(75.24),
    Fixed(79.48),
    Fixed(83.91),
    Fixed(87.19),
    Fixed(92.501),
    Fixed(94.99),
    Fixed(99.075),
    Fixed(103.501),
    Fixed(107.97),
    Fixed(112.292),
    Fixed(116.99),
    Fixed(121.65),
    Fixed(126.525),
    Fixed(131.51),
    Fixed(136.51),
    Fixed(141.61),
    Fixed(146.912),
    Fixed(152.21),
    Fixed(157.71),
    Fixed(163.288),
    Fixed(168.99),
    Fixed(174.85),
    Fixed(180.749),
    Fixed(186.623),
    Fixed(193.17),
    Fixed(199.12),
    Fixed(205.685),
    Fixed(211.81),
    Fixed(218.501),
    Fixed(225.685),
    Fixed(232.499),
    Fixed(239.317),
    Fixed(246.615),
    Fixed(254.04),
    Fixed(261.525),
    Fixed(269.04),
    Fixed(276.63),
    Fixed(284.26),
    Fixed(292.5),
    Fixed(300.655),
    Fixed(308.97),
    Fixed(317.36),
    Fixed(325.79),
    Fixed(334.217),
    Fixed(343.29),
    Fixed(350.785),
    Fixed(359.12),
    Fixed(368.38),
    Fixed(376.61),
    Fixed(385.135),
    Fixed(393.98),
    Fixed(402.499),
    Fixed(410.834),
    Fixed(419.166),
    Fixed(428.38),
    Fixed(437.499),
    Fixed(446.565),
    Fixed(455.01),
    Fixed(464.15),
    Fixed(473.43),
    Fixed(482.49),
    Fixed(491.7),
    Fixed(501.7),
    Fixed(511.7),
    Fixed(521.7),
    Fixed(531.7),
    Fixed(541.7),
    Fixed(552.499),
    Fixed(562.501),
    Fixed(573.35),
    Fixed(583.35),
    Fixed(594.15),
    Fixed(604.17),
    Fixed(615.01),
    Fixed(625.89),
    Fixed(636.66),
    Fixed(648.38),
    Fixed(660.0),
    Fixed(671.7),
    Fixed(683.33),
    Fixed(695.011),
];

/// Look up the Scribner coefficient for a log's top DIB and length.
///
/// Top DIBs above 120 inches are outside the published table and are an
/// error rather than a clamp.
pub fn scribner_coefficient(top_dib: u32, length: u32) -> Result<f64, CruiseError> {
    let entry = SCRIBNER
        .get(top_dib as usize)
        .ok_or(CruiseError::ScribnerRange { dib: top_dib })?;
    Ok(match entry {
        Fixed(c) => *c,
        ByLength(brackets) => {
            if length < 16 {
                brackets[0]
            } else if length < 32 {
                brackets[1]
            } else {
                brackets[2]
            }
        }
    })
}
