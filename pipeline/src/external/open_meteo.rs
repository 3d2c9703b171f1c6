//! Open-Meteo API client for air quality and weather data
//!
//! Both APIs return hourly series keyed by a parallel `time` array. Responses
//! are parsed into typed schemas, checked for shape, and then collapsed into a
//! single canonical reading for the current hour.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use rand::Rng;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::{
    compute_aqi, pollen_to_scale, validate_reading, AirQuality, Coordinates,
    EnvironmentalReading, EpochMillis, PlaceholderField, PollenLevels, WeatherConditions,
    MAX_POLLEN_LEVEL,
};

use crate::config::{PlaceholderPolicy, SourcesConfig};
use crate::error::{PipelineError, PipelineResult};

const AIR_QUALITY_VARIABLES: &str =
    "pm10,pm2_5,uv_index,grass_pollen,birch_pollen,ragweed_pollen";
const WEATHER_VARIABLES: &str = "temperature_2m,relative_humidity_2m";

/// Upper bound of a randomized UV placeholder
const MAX_PLACEHOLDER_UV: f64 = 11.0;

/// Hourly values; `null` entries become `None`
pub type Series = Vec<Option<f64>>;

/// Provider of raw environmental data
pub trait EnvironmentalSource: Send + Sync {
    fn air_quality(
        &self,
        at: Coordinates,
    ) -> impl Future<Output = PipelineResult<AirQualityResponse>> + Send;

    fn weather(&self, at: Coordinates) -> impl Future<Output = PipelineResult<WeatherResponse>> + Send;
}

impl<T: EnvironmentalSource> EnvironmentalSource for Arc<T> {
    fn air_quality(
        &self,
        at: Coordinates,
    ) -> impl Future<Output = PipelineResult<AirQualityResponse>> + Send {
        (**self).air_quality(at)
    }

    fn weather(&self, at: Coordinates) -> impl Future<Output = PipelineResult<WeatherResponse>> + Send {
        (**self).weather(at)
    }
}

/// Air-quality API response
#[derive(Debug, Clone, Deserialize)]
pub struct AirQualityResponse {
    pub hourly: AirQualityHourly,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirQualityHourly {
    pub time: Vec<String>,
    pub pm10: Option<Series>,
    pub pm2_5: Option<Series>,
    pub uv_index: Option<Series>,
    pub grass_pollen: Option<Series>,
    /// Used as the tree pollen signal
    pub birch_pollen: Option<Series>,
    /// Used as the weed pollen signal
    pub ragweed_pollen: Option<Series>,
}

/// Weather API response
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherResponse {
    pub hourly: WeatherHourly,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherHourly {
    pub time: Vec<String>,
    pub temperature_2m: Series,
    pub relative_humidity_2m: Series,
}

fn malformed(message: impl Into<String>) -> PipelineError {
    PipelineError::MalformedResponse(message.into())
}

fn check_series(name: &str, series: Option<&Series>, expected: usize) -> PipelineResult<()> {
    match series {
        Some(values) if values.len() != expected => Err(malformed(format!(
            "hourly.{} has {} entries, expected {}",
            name,
            values.len(),
            expected
        ))),
        _ => Ok(()),
    }
}

fn check_time(source: &str, time: &[String]) -> PipelineResult<()> {
    if time.is_empty() {
        return Err(malformed(format!("{} hourly.time is empty", source)));
    }
    Ok(())
}

impl AirQualityResponse {
    /// Check that every present series lines up with `hourly.time`
    pub fn validate(&self) -> PipelineResult<()> {
        let hourly = &self.hourly;
        check_time("air quality", &hourly.time)?;

        let expected = hourly.time.len();
        check_series("pm10", hourly.pm10.as_ref(), expected)?;
        check_series("pm2_5", hourly.pm2_5.as_ref(), expected)?;
        check_series("uv_index", hourly.uv_index.as_ref(), expected)?;
        check_series("grass_pollen", hourly.grass_pollen.as_ref(), expected)?;
        check_series("birch_pollen", hourly.birch_pollen.as_ref(), expected)?;
        check_series("ragweed_pollen", hourly.ragweed_pollen.as_ref(), expected)
    }
}

impl WeatherResponse {
    pub fn validate(&self) -> PipelineResult<()> {
        let hourly = &self.hourly;
        check_time("weather", &hourly.time)?;

        let expected = hourly.time.len();
        check_series("temperature_2m", Some(&hourly.temperature_2m), expected)?;
        check_series("relative_humidity_2m", Some(&hourly.relative_humidity_2m), expected)
    }
}

/// Parse an hourly timestamp (`YYYY-MM-DDTHH:MM`, GMT)
pub fn parse_hour(value: &str) -> PipelineResult<EpochMillis> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map(|at| at.and_utc().timestamp_millis())
        .map_err(|_| malformed(format!("invalid hourly timestamp {:?}", value)))
}

/// Index of the latest hour not after `now`.
///
/// Falls back to the earliest hour when the whole series lies in the future.
pub fn current_index(time: &[String], now: EpochMillis) -> PipelineResult<usize> {
    let mut latest_past: Option<(usize, EpochMillis)> = None;
    let mut earliest: Option<(usize, EpochMillis)> = None;

    for (index, raw) in time.iter().enumerate() {
        let at = parse_hour(raw)?;
        if at <= now && latest_past.map_or(true, |(_, best)| at > best) {
            latest_past = Some((index, at));
        }
        if earliest.map_or(true, |(_, best)| at < best) {
            earliest = Some((index, at));
        }
    }

    latest_past
        .or(earliest)
        .map(|(index, _)| index)
        .ok_or_else(|| malformed("hourly.time is empty"))
}

fn value_at(series: Option<&Series>, index: usize) -> Option<f64> {
    series.and_then(|values| values.get(index).copied().flatten())
}

fn placeholder_uv<R: Rng + ?Sized>(policy: PlaceholderPolicy, rng: &mut R) -> f64 {
    match policy {
        PlaceholderPolicy::Randomized => rng.gen_range(0.0..=MAX_PLACEHOLDER_UV),
        PlaceholderPolicy::Neutral => 0.0,
    }
}

fn placeholder_pollen<R: Rng + ?Sized>(policy: PlaceholderPolicy, rng: &mut R) -> u8 {
    match policy {
        PlaceholderPolicy::Randomized => rng.gen_range(0..=MAX_POLLEN_LEVEL),
        PlaceholderPolicy::Neutral => 0,
    }
}

/// Collapse both responses into the canonical reading for `now`
pub fn build_reading(
    air: &AirQualityResponse,
    weather: &WeatherResponse,
    now: EpochMillis,
    policy: PlaceholderPolicy,
) -> PipelineResult<EnvironmentalReading> {
    air.validate()?;
    weather.validate()?;

    let air_index = current_index(&air.hourly.time, now)?;
    let weather_index = current_index(&weather.hourly.time, now)?;

    // Sources occasionally report slightly negative concentrations
    let pm25 = value_at(air.hourly.pm2_5.as_ref(), air_index).map(|v| v.max(0.0));
    let pm10 = value_at(air.hourly.pm10.as_ref(), air_index).map(|v| v.max(0.0));

    let temperature = value_at(Some(&weather.hourly.temperature_2m), weather_index)
        .ok_or_else(|| malformed("temperature_2m is null for the current hour"))?;
    let humidity = value_at(Some(&weather.hourly.relative_humidity_2m), weather_index)
        .ok_or_else(|| malformed("relative_humidity_2m is null for the current hour"))?
        .clamp(0.0, 100.0);

    let mut rng = rand::thread_rng();
    let mut placeholders = Vec::new();

    let uv_index = match value_at(air.hourly.uv_index.as_ref(), air_index) {
        Some(uv) => uv.max(0.0),
        None => {
            placeholders.push(PlaceholderField::UvIndex);
            placeholder_uv(policy, &mut rng)
        }
    };

    let mut pollen_level = |series: Option<&Series>, field: PlaceholderField| {
        match value_at(series, air_index) {
            Some(concentration) => pollen_to_scale(concentration),
            None => {
                placeholders.push(field);
                placeholder_pollen(policy, &mut rng)
            }
        }
    };
    let grass = pollen_level(air.hourly.grass_pollen.as_ref(), PlaceholderField::GrassPollen);
    let tree = pollen_level(air.hourly.birch_pollen.as_ref(), PlaceholderField::TreePollen);
    let weed = pollen_level(air.hourly.ragweed_pollen.as_ref(), PlaceholderField::WeedPollen);

    let reading = EnvironmentalReading {
        air_quality: AirQuality {
            pm25: pm25.unwrap_or(0.0),
            pm10: pm10.unwrap_or(0.0),
            aqi: compute_aqi(pm25, pm10),
        },
        weather: WeatherConditions {
            temperature,
            humidity,
            uv_index,
        },
        pollen: PollenLevels::new(grass, tree, weed),
        timestamp: now,
        placeholders,
    };

    validate_reading(&reading).map_err(malformed)?;
    Ok(reading)
}

/// Open-Meteo API client
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Client,
    air_quality_url: String,
    weather_url: String,
}

impl OpenMeteoClient {
    /// Create a new client from the sources configuration
    pub fn new(config: &SourcesConfig) -> PipelineResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| PipelineError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            air_quality_url: config.air_quality_url.clone(),
            weather_url: config.weather_url.clone(),
        })
    }

    /// Create a new client with custom endpoints (for testing)
    pub fn with_base_urls(air_quality_url: String, weather_url: String) -> Self {
        Self {
            client: Client::new(),
            air_quality_url,
            weather_url,
        }
    }

    async fn get_hourly<T: DeserializeOwned>(
        &self,
        base_url: &str,
        variables: &str,
        at: Coordinates,
        label: &str,
    ) -> PipelineResult<T> {
        let url = format!(
            "{}?latitude={}&longitude={}&hourly={}&timezone=GMT",
            base_url, at.latitude, at.longitude, variables
        );
        tracing::debug!("Requesting {} data for {}", label, at);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PipelineError::FetchFailed(format!("{} API request failed: {}", label, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::FetchFailed(format!(
                "{} API error: {} - {}",
                label, status, body
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| malformed(format!("Failed to parse {} response: {}", label, e)))
    }
}

impl EnvironmentalSource for OpenMeteoClient {
    async fn air_quality(&self, at: Coordinates) -> PipelineResult<AirQualityResponse> {
        self.get_hourly(&self.air_quality_url, AIR_QUALITY_VARIABLES, at, "air quality")
            .await
    }

    async fn weather(&self, at: Coordinates) -> PipelineResult<WeatherResponse> {
        self.get_hourly(&self.weather_url, WEATHER_VARIABLES, at, "weather")
            .await
    }
}
