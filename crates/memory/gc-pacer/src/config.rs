//! Per-run configuration

use serde::{Deserialize, Serialize};

use crate::{PacerError, PacerResult};

/// Fixed parameters of one simulation run
///
/// Shared by every cycle of the run. Field names follow the scenario file
/// format (`gamma`, `globals_bytes`, `init_live_heap`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Heap-growth factor: target ratio of heap goal to live heap (> 1)
    pub gamma: f64,

    /// Size of the global root set, scanned every cycle
    pub globals_bytes: u64,

    /// Live heap at program start, used as scan work on the bootstrap cycle
    #[serde(rename = "init_live_heap")]
    pub initial_heap: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            gamma: 2.0,
            globals_bytes: 32 << 10,
            initial_heap: 2 << 20,
        }
    }
}

impl RunConfig {
    /// Create a run configuration
    pub fn new(gamma: f64, globals_bytes: u64, initial_heap: u64) -> Self {
        Self {
            gamma,
            globals_bytes,
            initial_heap,
        }
    }

    /// Check the run invariants
    ///
    /// # Errors
    ///
    /// Returns [`PacerError::InvalidConfig`] when `gamma` is not a finite
    /// value greater than one.
    pub fn validate(&self) -> PacerResult<()> {
        if !self.gamma.is_finite() || self.gamma <= 1.0 {
            return Err(PacerError::invalid_config(format!(
                "gamma must be finite and greater than 1, got {}",
                self.gamma
            )));
        }
        Ok(())
    }
}
