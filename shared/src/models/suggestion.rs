//! Recommendation models

use serde::{Deserialize, Serialize};

use crate::types::Priority;

/// A recommendation shown alongside the stress score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub timeframe: String,
    pub factors: Vec<SuggestionFactor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestionFactor {
    pub name: String,
    pub impact: i32,
}

impl SuggestionFactor {
    pub fn new(name: &str, impact: i32) -> Self {
        Self {
            name: name.to_string(),
            impact,
        }
    }
}

/// Which rule produced a suggestion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    AirPurifier,
    LimitSunExposure,
    StayHydrated,
    PollenAvoidance,
    RelaxationTechnique,
    TakeBreaks,
    MaintainRoutine,
    Forecast,
}
