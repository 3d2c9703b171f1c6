//! Common types used across the pipeline

use serde::{Deserialize, Serialize};

/// Two coordinates closer than this (in degrees, per axis) are the same place
pub const LOCATION_TOLERANCE_DEG: f64 = 0.01;

/// Milliseconds since the Unix epoch
pub type EpochMillis = i64;

pub const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// GPS coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both coordinates point at the same cached location
    pub fn same_place(&self, other: &Coordinates) -> bool {
        (self.latitude - other.latitude).abs() < LOCATION_TOLERANCE_DEG
            && (self.longitude - other.longitude).abs() < LOCATION_TOLERANCE_DEG
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// Suggestion priority
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// Age of a timestamp relative to `now`, never negative
pub fn age_millis(timestamp: EpochMillis, now: EpochMillis) -> i64 {
    (now - timestamp).max(0)
}
