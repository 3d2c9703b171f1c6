//! Error handling for the wellness pipeline
//!
//! Every error carries a stable code and a message suitable for a user-facing
//! notification.

use serde::Serialize;
use thiserror::Error;

/// Pipeline error types
#[derive(Error, Debug)]
pub enum PipelineError {
    // Location errors
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    // Data source errors
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Soft warning: a cached reading was served in place of fresh data
    #[error("Serving cached data after failure: {0}")]
    StaleCacheServed(Box<PipelineError>),

    #[error("Fetch superseded by a newer request")]
    Superseded,

    // Local state errors
    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PipelineError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::LocationUnavailable(_) => "LOCATION_UNAVAILABLE",
            PipelineError::FetchFailed(_) => "FETCH_FAILED",
            PipelineError::MalformedResponse(_) => "MALFORMED_RESPONSE",
            PipelineError::StaleCacheServed(_) => "STALE_CACHE_SERVED",
            PipelineError::Superseded => "SUPERSEDED",
            PipelineError::Cache(_) => "CACHE_ERROR",
            PipelineError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Message for a user-visible notification
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::LocationUnavailable(_) => {
                "Your location is unavailable. Showing data for the default location.".to_string()
            }
            PipelineError::FetchFailed(_) | PipelineError::MalformedResponse(_) => {
                "Failed to fetch environmental data. Please try again later.".to_string()
            }
            PipelineError::StaleCacheServed(_) => {
                "Environmental data could not be refreshed. Showing the last saved data."
                    .to_string()
            }
            PipelineError::Superseded => "A newer update is in progress.".to_string(),
            PipelineError::Cache(_) => "Saved data could not be read or written.".to_string(),
            PipelineError::Configuration(msg) => format!("Configuration error: {}", msg),
        }
    }

    /// Whether the error is a warning attached to a usable result
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            PipelineError::StaleCacheServed(_) | PipelineError::LocationUnavailable(_)
        )
    }

    pub fn to_notice(&self) -> Notice {
        Notice {
            code: self.code().to_string(),
            message: self.user_message(),
            detail: self.to_string(),
            warning: self.is_soft(),
        }
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PipelineError::MalformedResponse(err.to_string())
        } else {
            PipelineError::FetchFailed(err.to_string())
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Cache(err.to_string())
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::Configuration(err.to_string())
    }
}

/// User-facing notification derived from an error
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notice {
    pub code: String,
    pub message: String,
    pub detail: String,
    /// Data is still shown; render as a warning rather than an error
    pub warning: bool,
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_cache_wraps_cause() {
        let err = PipelineError::StaleCacheServed(Box::new(PipelineError::FetchFailed(
            "connection refused".to_string(),
        )));
        assert_eq!(err.code(), "STALE_CACHE_SERVED");
        assert!(err.is_soft());
        assert!(err.to_string().contains("connection refused"));
        assert!(err.to_notice().warning);
    }

    #[test]
    fn test_notice_fields() {
        let notice = PipelineError::MalformedResponse("missing hourly.time".to_string()).to_notice();
        assert_eq!(notice.code, "MALFORMED_RESPONSE");
        assert_eq!(
            notice.message,
            "Failed to fetch environmental data. Please try again later."
        );
        assert!(notice.detail.contains("hourly.time"));
        assert!(!notice.warning);
    }

    #[test]
    fn test_hard_errors_not_soft() {
        assert!(!PipelineError::FetchFailed("timeout".to_string()).is_soft());
        assert!(!PipelineError::Superseded.is_soft());
    }
}
