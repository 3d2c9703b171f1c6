//! Local key-value cache
//!
//! The pipeline persists small JSON snapshots under fixed keys, the way a
//! browser dashboard would use local storage. Stores are injected so tests can
//! observe and seed them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::{Coordinates, EnvironmentalReading};

use crate::error::{PipelineError, PipelineResult};

pub const ENVIRONMENTAL_DATA_KEY: &str = "environmentalData";
pub const STRESS_DATA_KEY: &str = "stressData";
pub const USER_LOCATION_KEY: &str = "userLocation";

/// String key-value storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> PipelineResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> PipelineResult<()>;

    fn remove(&self, key: &str) -> PipelineResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> PipelineResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> PipelineResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> PipelineResult<()> {
        (**self).remove(key)
    }
}

/// In-process store, empty on creation
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PipelineResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| PipelineError::Cache("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> PipelineResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PipelineResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PipelineResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Directory-backed store holding one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `directory`, creating it if needed
    pub fn open(directory: impl AsRef<Path>) -> PipelineResult<Self> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> PipelineResult<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> PipelineResult<()> {
        // Write then rename so readers never see a partial file
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> PipelineResult<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Load and decode a JSON value.
///
/// An entry that no longer decodes is treated as absent.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> PipelineResult<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::warn!("Discarding unreadable cache entry {}: {}", key, err);
            Ok(None)
        }
    }
}

/// Encode and store a JSON value, replacing any previous entry
pub fn save_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> PipelineResult<()> {
    let raw = serde_json::to_string(value).map_err(|e| PipelineError::Cache(e.to_string()))?;
    store.set(key, &raw)
}

/// Reading as stored under [`ENVIRONMENTAL_DATA_KEY`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedReading {
    #[serde(flatten)]
    pub reading: EnvironmentalReading,
    /// Where the reading was taken; absent for entries written without one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinates>,
}

impl CachedReading {
    /// Whether this entry can answer a request for `location`
    pub fn matches(&self, location: &Coordinates) -> bool {
        self.location
            .map(|cached| cached.same_place(location))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{AirQuality, PollenLevels, WeatherConditions};

    fn reading() -> EnvironmentalReading {
        EnvironmentalReading {
            air_quality: AirQuality {
                pm25: 9.0,
                pm10: 18.0,
                aqi: 38,
            },
            weather: WeatherConditions {
                temperature: 17.0,
                humidity: 71.0,
                uv_index: 2.0,
            },
            pollen: PollenLevels::new(1, 2, 0),
            timestamp: 1_704_110_400_000,
            placeholders: Vec::new(),
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir =
            std::env::temp_dir().join(format!("wellness-cache-test-{}", std::process::id()));
        let store = FileStore::open(&dir).unwrap();

        store.set(STRESS_DATA_KEY, "{\"score\":40.0}").unwrap();
        assert_eq!(
            store.get(STRESS_DATA_KEY).unwrap().as_deref(),
            Some("{\"score\":40.0}")
        );
        store.remove(STRESS_DATA_KEY).unwrap();
        store.remove(STRESS_DATA_KEY).unwrap();
        assert_eq!(store.get(STRESS_DATA_KEY).unwrap(), None);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_cached_reading_is_superset_of_reading() {
        let entry = CachedReading {
            reading: reading(),
            location: Some(Coordinates::new(51.5, -0.12)),
        };
        let store = MemoryStore::new();
        save_json(&store, ENVIRONMENTAL_DATA_KEY, &entry).unwrap();

        let plain: Option<EnvironmentalReading> =
            load_json(&store, ENVIRONMENTAL_DATA_KEY).unwrap();
        assert_eq!(plain, Some(reading()));

        let cached: Option<CachedReading> = load_json(&store, ENVIRONMENTAL_DATA_KEY).unwrap();
        assert_eq!(cached, Some(entry));
    }

    #[test]
    fn test_corrupt_entry_treated_as_absent() {
        let store = MemoryStore::new();
        store.set(ENVIRONMENTAL_DATA_KEY, "{not json").unwrap();
        let cached: Option<CachedReading> = load_json(&store, ENVIRONMENTAL_DATA_KEY).unwrap();
        assert!(cached.is_none());
    }

    #[test]
    fn test_entry_without_location_never_matches() {
        let entry = CachedReading {
            reading: reading(),
            location: None,
        };
        assert!(!entry.matches(&Coordinates::new(51.5, -0.12)));
    }
}
