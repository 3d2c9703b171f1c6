//! Stress engine integration tests
//!
//! Trend classification against the persisted assessment, and behavior when
//! no reading is available yet.

mod common;

use std::sync::Arc;

use common::*;
use proptest::prelude::*;
use shared::{
    AirQuality, BiometricInput, EnvironmentalReading, PollenLevels, StoredAssessment,
    StressTrend, WeatherConditions,
};
use wellness_pipeline::cache::{load_json, save_json, STRESS_DATA_KEY};
use wellness_pipeline::{KeyValueStore, PipelineError, PipelineResult, StressEngine};

fn reading(pm25: f64, pm10: f64, temperature: f64, uv_index: f64) -> EnvironmentalReading {
    EnvironmentalReading {
        air_quality: AirQuality {
            pm25,
            pm10,
            aqi: shared::compute_aqi(Some(pm25), Some(pm10)),
        },
        weather: WeatherConditions {
            temperature,
            humidity: 50.0,
            uv_index,
        },
        pollen: PollenLevels::new(1, 0, 0),
        timestamp: NOW,
        placeholders: Vec::new(),
    }
}

/// Scores 42.5
fn mild() -> EnvironmentalReading {
    reading(10.0, 20.0, 20.0, 2.0)
}

fn engine(harness: &Harness) -> StressEngine {
    StressEngine::new(harness.store(), harness.clock())
}

fn seed_previous(harness: &Harness, score: f64) {
    let mut previous = shared::score_reading(&mild(), None, None);
    previous.score = score;
    let stored = StoredAssessment {
        assessment: previous,
        timestamp: NOW - HOUR,
    };
    save_json(harness.store.as_ref(), STRESS_DATA_KEY, &stored).unwrap();
}

/// Store that refuses every write
struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> PipelineResult<Option<String>> {
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> PipelineResult<()> {
        Err(PipelineError::Cache(format!("{} is read-only", key)))
    }

    fn remove(&self, _key: &str) -> PipelineResult<()> {
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_no_reading_yields_no_assessment() {
    let harness = Harness::new(FakeSource::mild());
    let engine = engine(&harness);

    assert!(engine.assess(None, None).is_none());
    assert!(engine.previous().is_none());
}

#[test]
fn test_first_assessment_is_stable_and_persisted() {
    let harness = Harness::new(FakeSource::mild());
    let engine = engine(&harness);

    let assessment = engine.assess(Some(&mild()), None).unwrap();
    assert_eq!(assessment.score, 42.5);
    assert_eq!(assessment.trend, StressTrend::Stable);

    let stored: StoredAssessment = load_json(harness.store.as_ref(), STRESS_DATA_KEY)
        .unwrap()
        .unwrap();
    assert_eq!(stored.assessment, assessment);
    assert_eq!(stored.timestamp, NOW);
}

#[test]
fn test_trend_against_previous_score() {
    let harness = Harness::new(FakeSource::mild());
    let engine = engine(&harness);

    seed_previous(&harness, 30.0);
    assert_eq!(
        engine.assess(Some(&mild()), None).unwrap().trend,
        StressTrend::Increasing
    );

    seed_previous(&harness, 50.0);
    assert_eq!(
        engine.assess(Some(&mild()), None).unwrap().trend,
        StressTrend::Decreasing
    );

    // 42.5 vs 37.5: a difference of exactly 5 is not a change
    seed_previous(&harness, 37.5);
    assert_eq!(
        engine.assess(Some(&mild()), None).unwrap().trend,
        StressTrend::Stable
    );
}

#[test]
fn test_trend_follows_consecutive_assessments() {
    let harness = Harness::new(FakeSource::mild());
    let engine = engine(&harness);

    engine.assess(Some(&mild()), None).unwrap();
    let worse = engine
        .assess(Some(&reading(60.0, 300.0, 32.0, 9.0)), None)
        .unwrap();
    assert_eq!(worse.score, 100.0);
    assert_eq!(worse.trend, StressTrend::Increasing);

    let better = engine.assess(Some(&mild()), None).unwrap();
    assert_eq!(better.trend, StressTrend::Decreasing);
}

#[test]
fn test_heart_rate_factor_included() {
    let harness = Harness::new(FakeSource::mild());
    let engine = engine(&harness);
    let biometrics = BiometricInput {
        resting_heart_rate: 88.0,
    };

    let assessment = engine.assess(Some(&mild()), Some(&biometrics)).unwrap();
    assert_eq!(assessment.score, 67.5);
    assert_eq!(assessment.factors.last().unwrap().name, "Heart Rate");
}

#[test]
fn test_reset_forgets_previous() {
    let harness = Harness::new(FakeSource::mild());
    let engine = engine(&harness);
    seed_previous(&harness, 10.0);

    engine.reset().unwrap();
    assert!(engine.previous().is_none());
    assert_eq!(
        engine.assess(Some(&mild()), None).unwrap().trend,
        StressTrend::Stable
    );
}

#[test]
fn test_persist_failure_still_returns_assessment() {
    let harness = Harness::new(FakeSource::mild());
    let engine = StressEngine::new(Arc::new(ReadOnlyStore), harness.clock());

    let assessment = engine.assess(Some(&mild()), None).unwrap();
    assert_eq!(assessment.score, 42.5);
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Assessing the same reading twice yields the same score, stable
    #[test]
    fn prop_repeat_assessment_is_stable(
        pm25 in 0.0f64..200.0,
        pm10 in 0.0f64..400.0,
        temperature in -20.0f64..45.0,
        uv_index in 0.0f64..12.0,
    ) {
        let harness = Harness::new(FakeSource::mild());
        let engine = engine(&harness);
        let reading = reading(pm25, pm10, temperature, uv_index);

        let first = engine.assess(Some(&reading), None).unwrap();
        let second = engine.assess(Some(&reading), None).unwrap();

        prop_assert_eq!(first.score, second.score);
        prop_assert_eq!(second.trend, StressTrend::Stable);
        prop_assert!((0.0..=100.0).contains(&second.score));
    }
}
