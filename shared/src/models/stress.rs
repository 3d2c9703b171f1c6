//! Stress assessment models

use serde::{Deserialize, Serialize};

use crate::types::EpochMillis;

/// Composite stress score derived from a reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StressAssessment {
    /// 0-100
    pub score: f64,
    pub trend: StressTrend,
    /// Per-dimension contributions, in evaluation order
    pub factors: Vec<StressFactor>,
}

/// A single scored dimension
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StressFactor {
    pub name: String,
    /// Signed impact, negative is beneficial
    pub impact: f64,
    pub description: String,
}

/// Direction of the score relative to the previous assessment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StressTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for StressTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StressTrend::Increasing => write!(f, "increasing"),
            StressTrend::Decreasing => write!(f, "decreasing"),
            StressTrend::Stable => write!(f, "stable"),
        }
    }
}

/// Optional wearable input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BiometricInput {
    /// Resting heart rate in bpm
    pub resting_heart_rate: f64,
}

/// Assessment as persisted for the next trend comparison
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredAssessment {
    #[serde(flatten)]
    pub assessment: StressAssessment,
    pub timestamp: EpochMillis,
}

/// Human classification of a stress score
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    /// Above 70
    QuiteStressed,
    /// 50.x - 70
    SomewhatStressed,
    /// 30.x - 50
    ALittleStressed,
    /// 30 and below
    NotVeryStressed,
}

impl StressLevel {
    pub fn from_score(score: f64) -> Self {
        if score > 70.0 {
            StressLevel::QuiteStressed
        } else if score > 50.0 {
            StressLevel::SomewhatStressed
        } else if score > 30.0 {
            StressLevel::ALittleStressed
        } else {
            StressLevel::NotVeryStressed
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StressLevel::QuiteStressed => "quite stressed",
            StressLevel::SomewhatStressed => "somewhat stressed",
            StressLevel::ALittleStressed => "a little stressed",
            StressLevel::NotVeryStressed => "not very stressed",
        }
    }
}

impl StressAssessment {
    pub fn level(&self) -> StressLevel {
        StressLevel::from_score(self.score)
    }

    /// Sum of all factor impacts before normalization
    pub fn base_score(&self) -> f64 {
        self.factors.iter().map(|f| f.impact).sum()
    }

    /// Look up a factor by name
    pub fn factor(&self, name: &str) -> Option<&StressFactor> {
        self.factors.iter().find(|f| f.name == name)
    }
}
