//! Canonical environmental reading

use serde::{Deserialize, Serialize};

use crate::types::{age_millis, EpochMillis};

/// Highest value on the pollen ordinal scale
pub const MAX_POLLEN_LEVEL: u8 = 5;

/// A normalized environmental snapshot at a point in time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalReading {
    pub air_quality: AirQuality,
    pub weather: WeatherConditions,
    pub pollen: PollenLevels,
    pub timestamp: EpochMillis,
    /// Fields the source did not provide and that were synthesized instead
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placeholders: Vec<PlaceholderField>,
}

/// Particulate concentrations and the derived index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AirQuality {
    /// PM2.5 in μg/m³
    pub pm25: f64,
    /// PM10 in μg/m³
    pub pm10: f64,
    pub aqi: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherConditions {
    /// Air temperature in °C
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    pub uv_index: f64,
}

/// Pollen levels on a 0-5 ordinal scale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollenLevels {
    pub grass: u8,
    pub tree: u8,
    pub weed: u8,
}

impl PollenLevels {
    /// Build pollen levels, clamping each to the 0-5 scale
    pub fn new(grass: u8, tree: u8, weed: u8) -> Self {
        Self {
            grass: grass.min(MAX_POLLEN_LEVEL),
            tree: tree.min(MAX_POLLEN_LEVEL),
            weed: weed.min(MAX_POLLEN_LEVEL),
        }
    }

    /// Mean of the three pollen levels
    pub fn average(&self) -> f64 {
        (f64::from(self.grass) + f64::from(self.tree) + f64::from(self.weed)) / 3.0
    }
}

/// Reading fields that may be synthesized when the source omits them
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PlaceholderField {
    UvIndex,
    GrassPollen,
    TreePollen,
    WeedPollen,
}

impl EnvironmentalReading {
    /// Whether the reading is still inside the freshness window at `now`
    pub fn is_fresh(&self, now: EpochMillis, freshness_window_ms: i64) -> bool {
        age_millis(self.timestamp, now) < freshness_window_ms
    }

    /// Whether any field of this reading was synthesized
    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }

    pub fn aqi_category(&self) -> AqiCategory {
        AqiCategory::from_aqi(self.air_quality.aqi)
    }
}

/// EPA-style AQI bands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AqiCategory {
    /// 0-50
    Good,
    /// 51-100
    Moderate,
    /// 101-150
    UnhealthyForSensitiveGroups,
    /// 151-200
    Unhealthy,
    /// 201-300
    VeryUnhealthy,
    /// Above 300
    Hazardous,
}

impl AqiCategory {
    pub fn from_aqi(aqi: u32) -> Self {
        match aqi {
            0..=50 => AqiCategory::Good,
            51..=100 => AqiCategory::Moderate,
            101..=150 => AqiCategory::UnhealthyForSensitiveGroups,
            151..=200 => AqiCategory::Unhealthy,
            201..=300 => AqiCategory::VeryUnhealthy,
            _ => AqiCategory::Hazardous,
        }
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AqiCategory::Good => write!(f, "Good"),
            AqiCategory::Moderate => write!(f, "Moderate"),
            AqiCategory::UnhealthyForSensitiveGroups => {
                write!(f, "Unhealthy for Sensitive Groups")
            }
            AqiCategory::Unhealthy => write!(f, "Unhealthy"),
            AqiCategory::VeryUnhealthy => write!(f, "Very Unhealthy"),
            AqiCategory::Hazardous => write!(f, "Hazardous"),
        }
    }
}
