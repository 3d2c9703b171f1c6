//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use shared::{Coordinates, EpochMillis, MILLIS_PER_HOUR};
use tokio::sync::Notify;
use wellness_pipeline::cache::MemoryStore;
use wellness_pipeline::config::PlaceholderPolicy;
use wellness_pipeline::external::{AirQualityResponse, WeatherResponse};
use wellness_pipeline::{
    Clock, Config, EnvironmentalFetcher, EnvironmentalSource, KeyValueStore, ManualClock,
    PipelineError, PipelineResult, WellnessPipeline,
};

/// 2024-01-01T12:30 UTC
pub const NOW: EpochMillis = 1_704_112_200_000;
pub const HOUR: i64 = MILLIS_PER_HOUR;

pub const LONDON: Coordinates = Coordinates {
    latitude: 51.5074,
    longitude: -0.1278,
};
pub const PARIS: Coordinates = Coordinates {
    latitude: 48.8566,
    longitude: 2.3522,
};

pub fn air_body(pm25: f64, pm10: f64, uv: f64) -> Value {
    json!({
        "hourly": {
            "time": ["2024-01-01T11:00", "2024-01-01T12:00", "2024-01-01T13:00"],
            "pm2_5": [1.0, pm25, 1.0],
            "pm10": [1.0, pm10, 1.0],
            "uv_index": [0.0, uv, 0.0],
            "grass_pollen": [0.0, 0.0, 0.0],
            "birch_pollen": [0.0, 2.0, 0.0],
            "ragweed_pollen": [0.0, 0.0, 0.0]
        }
    })
}

pub fn weather_body(temperature: f64, humidity: f64) -> Value {
    json!({
        "hourly": {
            "time": ["2024-01-01T11:00", "2024-01-01T12:00", "2024-01-01T13:00"],
            "temperature_2m": [15.0, temperature, 15.0],
            "relative_humidity_2m": [50.0, humidity, 50.0]
        }
    })
}

/// Data source answering from canned JSON bodies
pub struct FakeSource {
    air: Mutex<Value>,
    weather: Mutex<Value>,
    failing: AtomicBool,
    calls: AtomicUsize,
    locations: Mutex<Vec<Coordinates>>,
    /// Taken by the next air-quality request, which then waits on it
    hold: Mutex<Option<Arc<Notify>>>,
}

impl FakeSource {
    pub fn new(air: Value, weather: Value) -> Self {
        Self {
            air: Mutex::new(air),
            weather: Mutex::new(weather),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            locations: Mutex::new(Vec::new()),
            hold: Mutex::new(None),
        }
    }

    /// pm25 10, pm10 20, uv 2, 20°C
    pub fn mild() -> Self {
        Self::new(air_body(10.0, 20.0, 2.0), weather_body(20.0, 55.0))
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_air(&self, air: Value) {
        *self.air.lock().unwrap() = air;
    }

    pub fn hold_next(&self, gate: Arc<Notify>) {
        *self.hold.lock().unwrap() = Some(gate);
    }

    /// Number of air-quality requests made
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn locations(&self) -> Vec<Coordinates> {
        self.locations.lock().unwrap().clone()
    }

    fn check(&self) -> PipelineResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PipelineError::FetchFailed(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

impl EnvironmentalSource for FakeSource {
    async fn air_quality(&self, at: Coordinates) -> PipelineResult<AirQualityResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.locations.lock().unwrap().push(at);

        let gate = self.hold.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.check()?;
        let body = self.air.lock().unwrap().clone();
        serde_json::from_value(body).map_err(|e| PipelineError::MalformedResponse(e.to_string()))
    }

    async fn weather(&self, _at: Coordinates) -> PipelineResult<WeatherResponse> {
        self.check()?;
        let body = self.weather.lock().unwrap().clone();
        serde_json::from_value(body).map_err(|e| PipelineError::MalformedResponse(e.to_string()))
    }
}

pub struct Harness {
    pub source: Arc<FakeSource>,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new(source: FakeSource) -> Self {
        Self {
            source: Arc::new(source),
            store: Arc::new(MemoryStore::new()),
            clock: Arc::new(ManualClock::new(NOW)),
        }
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    pub fn fetcher(&self) -> EnvironmentalFetcher<Arc<FakeSource>> {
        EnvironmentalFetcher::new(self.source.clone(), self.store(), self.clock(), LONDON)
            .with_placeholder_policy(PlaceholderPolicy::Neutral)
    }

    pub fn pipeline(&self) -> WellnessPipeline<Arc<FakeSource>> {
        let mut config = Config::defaults().unwrap();
        config.placeholders = PlaceholderPolicy::Neutral;
        WellnessPipeline::new(self.source.clone(), self.store(), self.clock(), &config)
    }
}
