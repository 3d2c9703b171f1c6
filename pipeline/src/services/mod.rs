//! Pipeline services

pub mod dashboard;
pub mod fetcher;
pub mod location;
pub mod stress;

pub use dashboard::{DashboardSnapshot, WellnessPipeline};
pub use fetcher::{EnvironmentalFetcher, FetchOutcome, ReadingOrigin};
pub use location::{LocationCache, LocationSource, Locator, ResolvedLocation, StoredLocation};
pub use stress::StressEngine;
