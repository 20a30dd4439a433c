//! Standard 12-lead naming and the clinical stacking order

use crate::error::EcgError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The twelve leads of a standard clinical ECG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lead {
    I,
    II,
    III,
    AVR,
    AVL,
    AVF,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
}

/// Clinical order used when stacking leads, listed bottom-to-top.
pub const CANONICAL_LEAD_ORDER: [Lead; 12] = [
    Lead::V6,
    Lead::V5,
    Lead::V4,
    Lead::V3,
    Lead::V2,
    Lead::V1,
    Lead::AVF,
    Lead::AVL,
    Lead::AVR,
    Lead::III,
    Lead::II,
    Lead::I,
];

impl Lead {
    /// Conventional spelling, e.g. `aVR`
    pub fn as_str(&self) -> &'static str {
        match self {
            Lead::I => "I",
            Lead::II => "II",
            Lead::III => "III",
            Lead::AVR => "aVR",
            Lead::AVL => "aVL",
            Lead::AVF => "aVF",
            Lead::V1 => "V1",
            Lead::V2 => "V2",
            Lead::V3 => "V3",
            Lead::V4 => "V4",
            Lead::V5 => "V5",
            Lead::V6 => "V6",
        }
    }

    /// Whether a free-form channel name denotes this lead
    pub fn matches(&self, name: &str) -> bool {
        name.trim().parse::<Lead>().map_or(false, |lead| lead == *self)
    }
}

impl FromStr for Lead {
    type Err = EcgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Recording systems disagree on case ("AVR", "aVR", "avr").
        let lead = match s.trim().to_ascii_uppercase().as_str() {
            "I" => Lead::I,
            "II" => Lead::II,
            "III" => Lead::III,
            "AVR" => Lead::AVR,
            "AVL" => Lead::AVL,
            "AVF" => Lead::AVF,
            "V1" => Lead::V1,
            "V2" => Lead::V2,
            "V3" => Lead::V3,
            "V4" => Lead::V4,
            "V5" => Lead::V5,
            "V6" => Lead::V6,
            _ => {
                return Err(EcgError::UnknownLead {
                    lead: s.to_string(),
                })
            }
        };
        Ok(lead)
    }
}

impl std::fmt::Display for Lead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
