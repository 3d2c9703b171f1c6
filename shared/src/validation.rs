//! Validation utilities for the wellness pipeline
//!
//! Checks the invariants of the canonical models before they are cached or
//! handed to the scoring engine.

use crate::models::{EnvironmentalReading, MAX_POLLEN_LEVEL};
use crate::normalization::compute_aqi;
use crate::types::Coordinates;

// ============================================================================
// Reading Validations
// ============================================================================

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Validate an environmental reading against the canonical schema
pub fn validate_reading(reading: &EnvironmentalReading) -> Result<(), &'static str> {
    let air = &reading.air_quality;
    if !non_negative(air.pm25) {
        return Err("PM2.5 must be a non-negative number");
    }
    if !non_negative(air.pm10) {
        return Err("PM10 must be a non-negative number");
    }
    if air.aqi > compute_aqi(Some(air.pm25), Some(air.pm10)) {
        return Err("AQI exceeds the index of its particulate concentrations");
    }

    let weather = &reading.weather;
    if !weather.temperature.is_finite() {
        return Err("Temperature must be a finite number");
    }
    validate_humidity(weather.humidity)?;
    if !non_negative(weather.uv_index) {
        return Err("UV index must be a non-negative number");
    }

    let pollen = &reading.pollen;
    if pollen.grass > MAX_POLLEN_LEVEL
        || pollen.tree > MAX_POLLEN_LEVEL
        || pollen.weed > MAX_POLLEN_LEVEL
    {
        return Err("Pollen levels must be between 0 and 5");
    }

    if reading.timestamp < 0 {
        return Err("Timestamp must not precede the epoch");
    }
    Ok(())
}

/// Validate relative humidity is a percentage
pub fn validate_humidity(humidity: f64) -> Result<(), &'static str> {
    if !non_negative(humidity) || humidity > 100.0 {
        return Err("Humidity must be between 0 and 100%");
    }
    Ok(())
}

// ============================================================================
// Location Validations
// ============================================================================

/// Validate latitude/longitude ranges
pub fn validate_coordinates(coordinates: &Coordinates) -> Result<(), &'static str> {
    if !coordinates.latitude.is_finite() || coordinates.latitude.abs() > 90.0 {
        return Err("Latitude must be between -90 and 90");
    }
    if !coordinates.longitude.is_finite() || coordinates.longitude.abs() > 180.0 {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}
