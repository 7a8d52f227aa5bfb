use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Delay schedule between two polls of a job's status.
///
/// The first delay is `first_ms`; every further delay is multiplied by
/// `factor` and capped at `max_ms`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollStrategy {
    pub first_ms: u64,
    pub max_ms: u64,
    pub factor: f64,
}

impl Default for PollStrategy {
    fn default() -> Self {
        Self {
            first_ms: 500,
            max_ms: 5_000,
            factor: 1.5,
        }
    }
}

impl PollStrategy {
    /// Fixed delay between polls.
    pub fn fixed(delay_ms: u64) -> Self {
        Self {
            first_ms: delay_ms,
            max_ms: delay_ms,
            factor: 1.0,
        }
    }

    /// Delay before poll number `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let scaled = self.first_ms as f64 * self.factor.powi(attempt.min(64) as i32);
        let capped = scaled.min(self.max_ms as f64).max(0.0);
        Duration::from_millis(capped as u64)
    }

    pub fn validate(&self) -> ModelResult<()> {
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err(ModelError::Invalid(format!(
                "poll factor must be >= 1.0, got {}",
                self.factor
            )));
        }
        if self.max_ms < self.first_ms {
            return Err(ModelError::Invalid(format!(
                "poll max_ms ({}) is below first_ms ({})",
                self.max_ms, self.first_ms
            )));
        }
        Ok(())
    }
}
