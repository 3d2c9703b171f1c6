//! Device location
//!
//! A resolved location is remembered for a day so the device is not asked on
//! every refresh.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{age_millis, validate_coordinates, Coordinates, EpochMillis, MILLIS_PER_HOUR};

use crate::cache::{load_json, save_json, KeyValueStore, USER_LOCATION_KEY};
use crate::clock::Clock;
use crate::error::{PipelineError, PipelineResult};

pub const DEFAULT_LOCATION_WINDOW_MS: i64 = 24 * MILLIS_PER_HOUR;

/// Source of the device's position
pub trait Locator: Send + Sync {
    fn locate(&self) -> impl Future<Output = PipelineResult<Coordinates>> + Send;
}

/// Location as stored under [`USER_LOCATION_KEY`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredLocation {
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub timestamp: EpochMillis,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Remembered,
    Located,
    Default,
}

#[derive(Debug)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub source: LocationSource,
    /// Why the default location was used
    pub notice: Option<PipelineError>,
}

pub struct LocationCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    window_ms: i64,
}

impl LocationCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            window_ms: DEFAULT_LOCATION_WINDOW_MS,
        }
    }

    pub fn with_window(mut self, window_ms: i64) -> Self {
        self.window_ms = window_ms;
        self
    }

    /// Remembered location, if still within the window
    pub fn remembered(&self) -> Option<Coordinates> {
        let stored = match load_json::<StoredLocation>(self.store.as_ref(), USER_LOCATION_KEY) {
            Ok(stored) => stored?,
            Err(err) => {
                tracing::warn!("Failed to read remembered location: {}", err);
                return None;
            }
        };

        let age = age_millis(stored.timestamp, self.clock.now_millis());
        (age < self.window_ms).then_some(stored.coordinates)
    }

    pub fn remember(&self, coordinates: Coordinates) -> PipelineResult<()> {
        let stored = StoredLocation {
            coordinates,
            timestamp: self.clock.now_millis(),
        };
        save_json(self.store.as_ref(), USER_LOCATION_KEY, &stored)
    }

    /// Resolve the location to fetch for.
    ///
    /// Prefers a fresh remembered location, then the locator. Any failure
    /// falls back to `default` with a `LocationUnavailable` notice.
    pub async fn resolve<L: Locator>(
        &self,
        locator: Option<&L>,
        default: Coordinates,
    ) -> ResolvedLocation {
        if let Some(coordinates) = self.remembered() {
            tracing::debug!("Using remembered location {}", coordinates);
            return ResolvedLocation {
                coordinates,
                source: LocationSource::Remembered,
                notice: None,
            };
        }

        let located = match locator {
            Some(locator) => locator.locate().await.and_then(|coordinates| {
                validate_coordinates(&coordinates)
                    .map(|_| coordinates)
                    .map_err(|e| PipelineError::LocationUnavailable(e.to_string()))
            }),
            None => Err(PipelineError::LocationUnavailable(
                "geolocation is not supported".to_string(),
            )),
        };

        match located {
            Ok(coordinates) => {
                if let Err(err) = self.remember(coordinates) {
                    tracing::warn!("Failed to remember location: {}", err);
                }
                ResolvedLocation {
                    coordinates,
                    source: LocationSource::Located,
                    notice: None,
                }
            }
            Err(err) => {
                tracing::warn!("Error getting location: {}", err);
                let notice = match err {
                    PipelineError::LocationUnavailable(_) => err,
                    other => PipelineError::LocationUnavailable(other.to_string()),
                };
                ResolvedLocation {
                    coordinates: default,
                    source: LocationSource::Default,
                    notice: Some(notice),
                }
            }
        }
    }
}
