//! Blood types and donor compatibility
//!
//! O- is the universal donor, AB+ the universal recipient. The donor order
//! returned by [`BloodType::compatible_donors`] is the draw preference used by
//! the blood bank: the recipient's exact type first, then substitutes from the
//! closest match towards O-.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ABO/Rh blood group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "O-")]
    ONeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "AB-")]
    AbNeg,
    #[serde(rename = "AB+")]
    AbPos,
}

impl BloodType {
    /// All eight types, in generator draw order
    pub const ALL: [BloodType; 8] = [
        BloodType::ONeg,
        BloodType::OPos,
        BloodType::ANeg,
        BloodType::APos,
        BloodType::BNeg,
        BloodType::BPos,
        BloodType::AbNeg,
        BloodType::AbPos,
    ];

    /// Donor types usable for this recipient, in draw preference order
    ///
    /// # Example
    /// ```
    /// use triage_simulator_core_rs::BloodType;
    ///
    /// let donors = BloodType::AbNeg.compatible_donors();
    /// assert_eq!(donors[0], BloodType::AbNeg);
    /// assert_eq!(*donors.last().unwrap(), BloodType::ONeg);
    /// ```
    pub fn compatible_donors(self) -> &'static [BloodType] {
        use BloodType::*;
        match self {
            ONeg => &[ONeg],
            OPos => &[OPos, ONeg],
            ANeg => &[ANeg, ONeg],
            APos => &[APos, ANeg, OPos, ONeg],
            BNeg => &[BNeg, ONeg],
            BPos => &[BPos, BNeg, OPos, ONeg],
            AbNeg => &[AbNeg, ANeg, BNeg, ONeg],
            AbPos => &[AbPos, AbNeg, APos, ANeg, BPos, BNeg, OPos, ONeg],
        }
    }

    /// True if `donor` blood may be given to a `self` recipient
    pub fn can_receive_from(self, donor: BloodType) -> bool {
        self.compatible_donors().contains(&donor)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BloodType::ONeg => "O-",
            BloodType::OPos => "O+",
            BloodType::ANeg => "A-",
            BloodType::APos => "A+",
            BloodType::BNeg => "B-",
            BloodType::BPos => "B+",
            BloodType::AbNeg => "AB-",
            BloodType::AbPos => "AB+",
        }
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BloodType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown blood type '{}'", s))
    }
}

/// Units taken from one donor type during a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodDraw {
    pub blood_type: BloodType,
    pub units: u32,
}
