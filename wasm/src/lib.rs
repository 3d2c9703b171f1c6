//! WebAssembly module for the wellness dashboard
//!
//! Provides client-side computation for:
//! - AQI and pollen normalization
//! - Stress scoring
//! - Suggestion generation
//! - Reading validation and freshness
//!
//! Structured values cross the boundary as JSON strings.

use serde::Serialize;
use shared::{
    generate_suggestions, score_reading, validate_reading, AqiCategory, BiometricInput,
    EnvironmentalReading, EpochMillis, StressAssessment, StressLevel,
};
use wasm_bindgen::prelude::*;

fn parse<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

/// Combined AQI of PM2.5 and PM10 concentrations (µg/m³)
#[wasm_bindgen]
pub fn aqi_from_particulates(pm25: Option<f64>, pm10: Option<f64>) -> u32 {
    shared::compute_aqi(pm25, pm10)
}

/// Convert a pollen concentration (grains/m³) to the 0-5 scale
#[wasm_bindgen]
pub fn pollen_scale(concentration: f64) -> u8 {
    shared::pollen_to_scale(concentration)
}

/// Human-readable AQI band
#[wasm_bindgen]
pub fn aqi_category_label(aqi: u32) -> String {
    AqiCategory::from_aqi(aqi).to_string()
}

/// Phrase describing a stress score, e.g. "a little stressed"
#[wasm_bindgen]
pub fn stress_level_label(score: f64) -> String {
    StressLevel::from_score(score).label().to_string()
}

fn score_reading_inner(
    reading_json: &str,
    biometrics_json: Option<String>,
    previous_score: Option<f64>,
) -> Result<String, String> {
    let reading: EnvironmentalReading = parse(reading_json, "reading")?;
    let biometrics: Option<BiometricInput> = biometrics_json
        .as_deref()
        .map(|json| parse(json, "biometrics"))
        .transpose()?;

    let assessment = score_reading(&reading, biometrics.as_ref(), previous_score);
    to_json(&assessment)
}

/// Score a reading; returns the assessment as JSON
#[wasm_bindgen]
pub fn score_reading_json(
    reading_json: &str,
    biometrics_json: Option<String>,
    previous_score: Option<f64>,
) -> Result<String, JsValue> {
    score_reading_inner(reading_json, biometrics_json, previous_score)
        .map_err(|e| JsValue::from_str(&e))
}

fn suggestions_inner(reading_json: &str, assessment_json: Option<String>) -> Result<String, String> {
    let reading: EnvironmentalReading = parse(reading_json, "reading")?;
    let assessment: Option<StressAssessment> = assessment_json
        .as_deref()
        .map(|json| parse(json, "assessment"))
        .transpose()?;

    to_json(&generate_suggestions(&reading, assessment.as_ref()))
}

/// Suggestions for a reading and optional assessment, as a JSON array
#[wasm_bindgen]
pub fn suggestions_json(reading_json: &str, assessment_json: Option<String>) -> Result<String, JsValue> {
    suggestions_inner(reading_json, assessment_json).map_err(|e| JsValue::from_str(&e))
}

fn validate_inner(reading_json: &str) -> Result<(), String> {
    let reading: EnvironmentalReading = parse(reading_json, "reading")?;
    validate_reading(&reading).map_err(str::to_string)?;
    if reading.has_placeholders() {
        warn(&format!("Reading uses placeholder values for {:?}", reading.placeholders));
    }
    Ok(())
}

/// Validate a reading before caching it offline
#[wasm_bindgen]
pub fn validate_reading_json(reading_json: &str) -> Result<(), JsValue> {
    validate_inner(reading_json).map_err(|e| JsValue::from_str(&e))
}

fn is_fresh_at(reading_json: &str, now: EpochMillis, freshness_minutes: u32) -> Result<bool, String> {
    let reading: EnvironmentalReading = parse(reading_json, "reading")?;
    Ok(reading.is_fresh(now, i64::from(freshness_minutes) * 60 * 1000))
}

/// Whether a cached reading is younger than `freshness_minutes`
#[wasm_bindgen]
pub fn is_reading_fresh(reading_json: &str, freshness_minutes: u32) -> Result<bool, JsValue> {
    let now = js_sys::Date::now() as EpochMillis;
    is_fresh_at(reading_json, now, freshness_minutes).map_err(|e| JsValue::from_str(&e))
}
