//! Environmental stress pipeline
//!
//! Fetches air-quality and weather data, normalizes it into a canonical
//! reading, scores it for environmental stress and derives suggestions. The
//! pure computations live in the `shared` crate; this crate owns the I/O.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod external;
pub mod services;
pub mod telemetry;

pub use cache::{FileStore, KeyValueStore, MemoryStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Notice, PipelineError, PipelineResult};
pub use external::{EnvironmentalSource, OpenMeteoClient};
pub use services::{
    DashboardSnapshot, EnvironmentalFetcher, FetchOutcome, LocationCache, Locator,
    ReadingOrigin, StressEngine, WellnessPipeline,
};
