//! Environmental data fetcher
//!
//! Serves a cached reading while it is fresh, otherwise queries both data
//! sources concurrently and caches the normalized result. When the sources
//! fail, the last cached reading is served as a degraded fallback.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use shared::{Coordinates, EnvironmentalReading, MILLIS_PER_HOUR};

use crate::cache::{load_json, save_json, CachedReading, KeyValueStore, ENVIRONMENTAL_DATA_KEY};
use crate::clock::Clock;
use crate::config::PlaceholderPolicy;
use crate::error::{PipelineError, PipelineResult};
use crate::external::{build_reading, EnvironmentalSource};

/// Default freshness window for cached readings
pub const DEFAULT_FRESHNESS_WINDOW_MS: i64 = 3 * MILLIS_PER_HOUR;

/// Where a reading came from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReadingOrigin {
    Network,
    Cache,
    StaleCache,
}

/// Result of a fetch
#[derive(Debug)]
pub struct FetchOutcome {
    pub reading: EnvironmentalReading,
    pub origin: ReadingOrigin,
    /// Location the reading belongs to
    pub location: Coordinates,
    /// Set when the reading is a degraded fallback
    pub notice: Option<PipelineError>,
}

/// Latest network fetch generation and the place it was started for
#[derive(Debug, Default)]
struct InFlight {
    generation: u64,
    location: Option<Coordinates>,
}

/// Fetcher for environmental readings
pub struct EnvironmentalFetcher<S> {
    source: S,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    default_location: Coordinates,
    freshness_window_ms: i64,
    policy: PlaceholderPolicy,
    in_flight: Mutex<InFlight>,
}

impl<S: EnvironmentalSource> EnvironmentalFetcher<S> {
    pub fn new(
        source: S,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        default_location: Coordinates,
    ) -> Self {
        Self {
            source,
            store,
            clock,
            default_location,
            freshness_window_ms: DEFAULT_FRESHNESS_WINDOW_MS,
            policy: PlaceholderPolicy::default(),
            in_flight: Mutex::new(InFlight::default()),
        }
    }

    pub fn with_freshness_window(mut self, freshness_window_ms: i64) -> Self {
        self.freshness_window_ms = freshness_window_ms;
        self
    }

    pub fn with_placeholder_policy(mut self, policy: PlaceholderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn default_location(&self) -> Coordinates {
        self.default_location
    }

    /// Fetch the reading for `location`, or the default location.
    ///
    /// A cached reading for the same place younger than the freshness window
    /// is returned without touching the network.
    pub async fn fetch(&self, location: Option<Coordinates>) -> PipelineResult<FetchOutcome> {
        let location = location.unwrap_or(self.default_location);
        let now = self.clock.now_millis();

        if let Some(entry) = self.cached() {
            if entry.matches(&location) && entry.reading.is_fresh(now, self.freshness_window_ms) {
                tracing::debug!("Serving cached reading for {}", location);
                return Ok(FetchOutcome {
                    reading: entry.reading,
                    origin: ReadingOrigin::Cache,
                    location,
                    notice: None,
                });
            }
            tracing::debug!("Cached reading is stale or for another location");
        }

        self.fetch_from_sources(location).await
    }

    /// Fetch from the sources regardless of the cache's freshness
    pub async fn refresh(&self, location: Option<Coordinates>) -> PipelineResult<FetchOutcome> {
        let location = location.unwrap_or(self.default_location);
        self.fetch_from_sources(location).await
    }

    /// Last cached reading, whatever its age or location
    pub fn cached(&self) -> Option<CachedReading> {
        match load_json::<CachedReading>(self.store.as_ref(), ENVIRONMENTAL_DATA_KEY) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("Failed to read cached reading: {}", err);
                None
            }
        }
    }

    /// Cached reading to show in place of a superseded fetch
    pub fn latest(&self, requested: Coordinates) -> Option<FetchOutcome> {
        let entry = self.cached()?;
        let fresh = entry
            .reading
            .is_fresh(self.clock.now_millis(), self.freshness_window_ms);

        Some(FetchOutcome {
            location: entry.location.unwrap_or(requested),
            reading: entry.reading,
            origin: if fresh {
                ReadingOrigin::Cache
            } else {
                ReadingOrigin::StaleCache
            },
            notice: (!fresh)
                .then(|| PipelineError::StaleCacheServed(Box::new(PipelineError::Superseded))),
        })
    }

    /// Ticket for a network fetch.
    ///
    /// Fetches for the same place share a generation; a different place
    /// starts a new one and supersedes everything in flight.
    fn take_ticket(&self, location: Coordinates) -> u64 {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let same_place = in_flight
            .location
            .map(|current| current.same_place(&location))
            .unwrap_or(false);

        if !same_place {
            in_flight.generation += 1;
            in_flight.location = Some(location);
        }
        in_flight.generation
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
            == ticket
    }

    async fn fetch_from_sources(&self, location: Coordinates) -> PipelineResult<FetchOutcome> {
        let ticket = self.take_ticket(location);
        tracing::info!("Fetching environmental data for {}", location);

        let result = match tokio::try_join!(
            self.source.air_quality(location),
            self.source.weather(location)
        ) {
            Ok((air, weather)) => build_reading(&air, &weather, self.clock.now_millis(), self.policy),
            Err(err) => Err(err),
        };

        if !self.is_current(ticket) {
            tracing::debug!("Discarding results for {}, a newer fetch started", location);
            return Err(PipelineError::Superseded);
        }

        match result {
            Ok(reading) => {
                if reading.has_placeholders() {
                    tracing::debug!("Reading uses placeholders for {:?}", reading.placeholders);
                }

                let entry = CachedReading {
                    reading,
                    location: Some(location),
                };
                if let Err(err) = save_json(self.store.as_ref(), ENVIRONMENTAL_DATA_KEY, &entry) {
                    tracing::warn!("Failed to cache reading: {}", err);
                }

                Ok(FetchOutcome {
                    reading: entry.reading,
                    origin: ReadingOrigin::Network,
                    location,
                    notice: None,
                })
            }
            Err(err) => {
                tracing::warn!("Error fetching environmental data: {}", err);
                self.fall_back(location, err)
            }
        }
    }

    fn fall_back(&self, requested: Coordinates, cause: PipelineError) -> PipelineResult<FetchOutcome> {
        match self.cached() {
            Some(entry) => {
                tracing::warn!(
                    "Serving cached reading from {} after failure",
                    entry.reading.timestamp
                );
                Ok(FetchOutcome {
                    location: entry.location.unwrap_or(requested),
                    reading: entry.reading,
                    origin: ReadingOrigin::StaleCache,
                    notice: Some(PipelineError::StaleCacheServed(Box::new(cause))),
                })
            }
            None => {
                tracing::error!("No environmental data available: {}", cause);
                Err(cause)
            }
        }
    }
}
