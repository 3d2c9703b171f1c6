//! Refresh cycle: fetch, score and suggest

use std::sync::Arc;

use serde::Serialize;
use shared::{
    generate_suggestions, validate_coordinates, BiometricInput, Coordinates,
    EnvironmentalReading, StressAssessment, StressLevel, Suggestion,
};

use crate::cache::{FileStore, KeyValueStore};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{Notice, PipelineError, PipelineResult};
use crate::external::{EnvironmentalSource, OpenMeteoClient};
use crate::services::fetcher::{EnvironmentalFetcher, ReadingOrigin};
use crate::services::location::{LocationCache, Locator, ResolvedLocation};
use crate::services::stress::StressEngine;

/// Everything the dashboard renders after one refresh
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub reading: Option<EnvironmentalReading>,
    pub origin: Option<ReadingOrigin>,
    pub location: Option<Coordinates>,
    pub assessment: Option<StressAssessment>,
    pub level: Option<StressLevel>,
    pub suggestions: Vec<Suggestion>,
    pub notice: Option<Notice>,
}

impl DashboardSnapshot {
    fn unavailable(notice: Notice) -> Self {
        Self {
            reading: None,
            origin: None,
            location: None,
            assessment: None,
            level: None,
            suggestions: Vec::new(),
            notice: Some(notice),
        }
    }

    pub fn is_available(&self) -> bool {
        self.reading.is_some()
    }
}

/// The complete pipeline
pub struct WellnessPipeline<S> {
    fetcher: EnvironmentalFetcher<S>,
    engine: StressEngine,
    locations: LocationCache,
}

impl WellnessPipeline<OpenMeteoClient> {
    /// Pipeline backed by Open-Meteo, a file cache and the system clock
    pub fn from_config(config: &Config) -> PipelineResult<Self> {
        let source = OpenMeteoClient::new(&config.sources)?;
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.cache.directory)?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        Ok(Self::new(source, store, clock, config))
    }
}

impl<S: EnvironmentalSource> WellnessPipeline<S> {
    pub fn new(
        source: S,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        let fetcher = EnvironmentalFetcher::new(
            source,
            store.clone(),
            clock.clone(),
            config.location.default_coordinates(),
        )
        .with_freshness_window(config.cache.freshness_window_ms())
        .with_placeholder_policy(config.placeholders);

        let locations = LocationCache::new(store.clone(), clock.clone())
            .with_window(config.cache.location_window_ms());

        Self {
            fetcher,
            engine: StressEngine::new(store, clock),
            locations,
        }
    }

    pub fn fetcher(&self) -> &EnvironmentalFetcher<S> {
        &self.fetcher
    }

    pub fn stress_engine(&self) -> &StressEngine {
        &self.engine
    }

    /// Resolve the device location, falling back to the default location
    pub async fn locate<L: Locator>(&self, locator: Option<&L>) -> ResolvedLocation {
        self.locations
            .resolve(locator, self.fetcher.default_location())
            .await
    }

    /// Run one cycle for `coordinates`, serving fresh cached data when possible
    pub async fn refresh(
        &self,
        coordinates: Option<Coordinates>,
        biometrics: Option<&BiometricInput>,
    ) -> DashboardSnapshot {
        self.run(coordinates, biometrics, false).await
    }

    /// Run one cycle, always querying the data sources
    pub async fn force_refresh(
        &self,
        coordinates: Option<Coordinates>,
        biometrics: Option<&BiometricInput>,
    ) -> DashboardSnapshot {
        self.run(coordinates, biometrics, true).await
    }

    /// Resolve the device location, then run one cycle for it
    pub async fn refresh_located<L: Locator>(
        &self,
        locator: Option<&L>,
        biometrics: Option<&BiometricInput>,
    ) -> DashboardSnapshot {
        let resolved = self.locate(locator).await;
        let mut snapshot = self.run(Some(resolved.coordinates), biometrics, false).await;

        if snapshot.notice.is_none() {
            snapshot.notice = resolved.notice.map(|err| err.to_notice());
        }
        snapshot
    }

    async fn run(
        &self,
        coordinates: Option<Coordinates>,
        biometrics: Option<&BiometricInput>,
        force: bool,
    ) -> DashboardSnapshot {
        let mut notice = None;
        let coordinates = coordinates.and_then(|c| match validate_coordinates(&c) {
            Ok(()) => Some(c),
            Err(reason) => {
                let err = PipelineError::LocationUnavailable(reason.to_string());
                tracing::warn!("Ignoring coordinates {}: {}", c, err);
                notice = Some(err.to_notice());
                None
            }
        });

        let fetched = if force {
            self.fetcher.refresh(coordinates).await
        } else {
            self.fetcher.fetch(coordinates).await
        };

        let requested = coordinates.unwrap_or(self.fetcher.default_location());
        let outcome = match fetched {
            Ok(outcome) => outcome,
            Err(PipelineError::Superseded) => match self.fetcher.latest(requested) {
                Some(outcome) => outcome,
                None => return DashboardSnapshot::unavailable(PipelineError::Superseded.to_notice()),
            },
            Err(err) => return DashboardSnapshot::unavailable(err.to_notice()),
        };

        let assessment = self.engine.assess(Some(&outcome.reading), biometrics);
        let suggestions = generate_suggestions(&outcome.reading, assessment.as_ref());

        if let Some(err) = &outcome.notice {
            notice = Some(err.to_notice());
        }

        DashboardSnapshot {
            level: assessment.as_ref().map(|a| a.level()),
            reading: Some(outcome.reading),
            origin: Some(outcome.origin),
            location: Some(outcome.location),
            assessment,
            suggestions,
            notice,
        }
    }
}
