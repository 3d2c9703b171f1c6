//! Stress scoring with persisted trend state

use std::sync::Arc;

use shared::{
    score_reading, BiometricInput, EnvironmentalReading, StoredAssessment, StressAssessment,
};

use crate::cache::{load_json, save_json, KeyValueStore, STRESS_DATA_KEY};
use crate::clock::Clock;
use crate::error::PipelineResult;

/// Scores readings and remembers the last assessment for trend comparison
pub struct StressEngine {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl StressEngine {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Assess a reading.
    ///
    /// Returns `None` without touching stored state when there is no reading
    /// yet.
    pub fn assess(
        &self,
        reading: Option<&EnvironmentalReading>,
        biometrics: Option<&BiometricInput>,
    ) -> Option<StressAssessment> {
        let reading = reading?;

        let previous = self.previous().map(|stored| stored.assessment.score);
        let assessment = score_reading(reading, biometrics, previous);
        tracing::debug!(
            "Stress score {:.1} ({}), previous {:?}",
            assessment.score,
            assessment.trend,
            previous
        );

        let stored = StoredAssessment {
            assessment: assessment.clone(),
            timestamp: self.clock.now_millis(),
        };
        if let Err(err) = save_json(self.store.as_ref(), STRESS_DATA_KEY, &stored) {
            tracing::warn!("Failed to persist stress assessment: {}", err);
        }

        Some(assessment)
    }

    /// Last persisted assessment
    pub fn previous(&self) -> Option<StoredAssessment> {
        match load_json(self.store.as_ref(), STRESS_DATA_KEY) {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!("Failed to read previous assessment: {}", err);
                None
            }
        }
    }

    /// Forget the previous assessment
    pub fn reset(&self) -> PipelineResult<()> {
        self.store.remove(STRESS_DATA_KEY)
    }
}
