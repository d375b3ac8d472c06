//! Decision Threshold
//!
//! The faller threshold is fixed. It is not read from the bundle or from
//! configuration.

use serde::{Deserialize, Serialize};

/// Probability at or above which a participant is labelled a faller
pub const FALLER_THRESHOLD: f64 = 0.50;

/// Binary fall-status label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RiskLabel {
    NonFaller,
    Faller,
}

impl RiskLabel {
    pub fn from_probability(probability: f64) -> Self {
        if probability >= FALLER_THRESHOLD {
            RiskLabel::Faller
        } else {
            RiskLabel::NonFaller
        }
    }

    /// Predicted Fall Status code (Faller = 1, Non-faller = 0)
    pub fn code(self) -> u8 {
        match self {
            RiskLabel::NonFaller => 0,
            RiskLabel::Faller => 1,
        }
    }

    pub fn is_faller(self) -> bool {
        self == RiskLabel::Faller
    }

    pub fn name(self) -> &'static str {
        match self {
            RiskLabel::NonFaller => "Non-faller",
            RiskLabel::Faller => "Faller",
        }
    }

    /// Banner headline shown with the result
    pub fn banner(self) -> &'static str {
        match self {
            RiskLabel::NonFaller => "Low Fall Risk",
            RiskLabel::Faller => "High Fall Risk",
        }
    }
}

impl From<RiskLabel> for u8 {
    fn from(label: RiskLabel) -> Self {
        label.code()
    }
}

impl TryFrom<u8> for RiskLabel {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RiskLabel::NonFaller),
            1 => Ok(RiskLabel::Faller),
            other => Err(format!("invalid fall status code: {other}")),
        }
    }
}
