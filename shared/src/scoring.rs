//! Stress scoring
//!
//! Each environmental dimension maps to a signed impact; the impacts are
//! summed and normalized onto a 0-100 score.

use crate::models::{
    BiometricInput, EnvironmentalReading, StressAssessment, StressFactor, StressTrend,
};

/// Score of a reading with no net impact
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Score points per impact point
pub const IMPACT_SCALE: f64 = 2.5;

/// Largest score change still considered stable
pub const TREND_THRESHOLD: f64 = 5.0;

/// Resting heart rate above which the biometric factor applies
pub const ELEVATED_RESTING_HEART_RATE: f64 = 80.0;

pub const PM25_FACTOR: &str = "PM2.5 Levels";
pub const PM10_FACTOR: &str = "PM10 Levels";
pub const UV_FACTOR: &str = "UV Exposure";
pub const TEMPERATURE_FACTOR: &str = "Temperature";
pub const POLLEN_FACTOR: &str = "Pollen Levels";
pub const HEART_RATE_FACTOR: &str = "Heart Rate";

/// Impact of a single dimension with its explanation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    pub impact: f64,
    pub description: &'static str,
}

impl Impact {
    const fn new(impact: f64, description: &'static str) -> Self {
        Self {
            impact,
            description,
        }
    }

    fn into_factor(self, name: &str) -> StressFactor {
        StressFactor {
            name: name.to_string(),
            impact: self.impact,
            description: self.description.to_string(),
        }
    }
}

pub fn pm25_impact(pm25: f64) -> Impact {
    if pm25 < 12.0 {
        Impact::new(0.0, "PM2.5 levels are good and shouldn't affect your health")
    } else if pm25 < 35.4 {
        Impact::new(
            2.0,
            "Moderate PM2.5 levels may cause breathing discomfort for sensitive individuals",
        )
    } else if pm25 < 55.4 {
        Impact::new(5.0, "Unhealthy PM2.5 levels - consider limited outdoor activities")
    } else {
        Impact::new(8.0, "Very unhealthy PM2.5 levels - stay indoors if possible")
    }
}

pub fn pm10_impact(pm10: f64) -> Impact {
    if pm10 < 54.0 {
        Impact::new(0.0, "PM10 levels are good")
    } else if pm10 < 154.0 {
        Impact::new(2.0, "Moderate PM10 levels may cause respiratory irritation")
    } else if pm10 < 254.0 {
        Impact::new(5.0, "Unhealthy PM10 levels may worsen existing conditions")
    } else {
        Impact::new(8.0, "Very unhealthy PM10 levels - limit outdoor exposure")
    }
}

pub fn uv_impact(uv_index: f64) -> Impact {
    if uv_index < 3.0 {
        Impact::new(-1.0, "Low UV index - safe for outdoor activities")
    } else if uv_index < 6.0 {
        Impact::new(1.0, "Moderate UV index - wear sun protection")
    } else if uv_index < 8.0 {
        Impact::new(3.0, "High UV index - limit midday sun exposure")
    } else {
        Impact::new(6.0, "Very high UV index - avoid outdoor activities")
    }
}

pub fn temperature_impact(celsius: f64) -> Impact {
    if celsius < 15.0 {
        Impact::new(2.0, "Cold temperatures may increase stress and anxiety")
    } else if celsius < 25.0 {
        Impact::new(
            -2.0,
            "Comfortable temperature range is beneficial for mental wellbeing",
        )
    } else {
        Impact::new(3.0, "Hot temperatures may increase irritability and stress")
    }
}

/// Impact of the average pollen level
pub fn pollen_impact(average_level: f64) -> Impact {
    if average_level < 1.0 {
        Impact::new(0.0, "Low pollen counts - minimal impact on health")
    } else if average_level < 3.0 {
        Impact::new(2.0, "Moderate pollen levels may cause mild allergic reactions")
    } else {
        Impact::new(5.0, "High pollen counts may worsen allergies and affect mood")
    }
}

pub fn heart_rate_impact(biometrics: &BiometricInput) -> Impact {
    if biometrics.resting_heart_rate > ELEVATED_RESTING_HEART_RATE {
        Impact::new(10.0, "Elevated resting heart rate may indicate stress")
    } else {
        Impact::new(0.0, "Healthy resting heart rate")
    }
}

/// Map a summed impact onto the 0-100 score range
pub fn normalize_score(base_score: f64) -> f64 {
    (NEUTRAL_SCORE + base_score * IMPACT_SCALE).clamp(0.0, 100.0)
}

/// Classify a score against the previous one
pub fn classify_trend(score: f64, previous: Option<f64>) -> StressTrend {
    match previous {
        Some(prev) if score > prev + TREND_THRESHOLD => StressTrend::Increasing,
        Some(prev) if score < prev - TREND_THRESHOLD => StressTrend::Decreasing,
        _ => StressTrend::Stable,
    }
}

/// Score a reading.
///
/// `previous_score` is the score of the last persisted assessment, if any.
pub fn score_reading(
    reading: &EnvironmentalReading,
    biometrics: Option<&BiometricInput>,
    previous_score: Option<f64>,
) -> StressAssessment {
    let mut factors = vec![
        pm25_impact(reading.air_quality.pm25).into_factor(PM25_FACTOR),
        pm10_impact(reading.air_quality.pm10).into_factor(PM10_FACTOR),
        uv_impact(reading.weather.uv_index).into_factor(UV_FACTOR),
        temperature_impact(reading.weather.temperature).into_factor(TEMPERATURE_FACTOR),
        pollen_impact(reading.pollen.average()).into_factor(POLLEN_FACTOR),
    ];

    if let Some(biometrics) = biometrics {
        factors.push(heart_rate_impact(biometrics).into_factor(HEART_RATE_FACTOR));
    }

    let base_score: f64 = factors.iter().map(|f| f.impact).sum();
    let score = normalize_score(base_score);

    StressAssessment {
        score,
        trend: classify_trend(score, previous_score),
        factors,
    }
}
