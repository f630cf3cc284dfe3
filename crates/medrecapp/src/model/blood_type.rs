use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ABO/Rh blood group. Anything that is not a recognised group is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a blood type (expected A+, A-, B+, B-, AB+, AB-, O+, O- or Unknown)")]
pub struct InvalidBloodType(pub String);

impl BloodType {
    pub const ALL: [BloodType; 9] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
        BloodType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
            BloodType::Unknown => "Unknown",
        }
    }

    /// Parses free text, falling back to `Unknown` for anything unrecognised.
    ///
    /// The rejected input is handed back so the caller can report it.
    pub fn normalize(raw: &str) -> (BloodType, Option<InvalidBloodType>) {
        match raw.parse() {
            Ok(bt) => (bt, None),
            Err(e) => (BloodType::Unknown, Some(e)),
        }
    }
}

impl FromStr for BloodType {
    type Err = InvalidBloodType;

    /// Trims and uppercases before matching. Empty input is `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        if normalized.is_empty() || normalized == "UNKNOWN" {
            return Ok(BloodType::Unknown);
        }
        BloodType::ALL
            .iter()
            .find(|bt| bt.as_str() == normalized)
            .copied()
            .ok_or_else(|| InvalidBloodType(s.to_string()))
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
