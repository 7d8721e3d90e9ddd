//! Per-cycle workload measurements

use serde::{Deserialize, Serialize};

use crate::{PacerError, PacerResult};

fn unset_heap_target() -> i64 {
    -1
}

/// Workload observed during one GC cycle
///
/// Records are produced by an external generator and consumed once, in
/// order, by a pacer. Rates are dimensionless relative speeds; only their
/// ratios matter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleInput {
    /// Mutator allocation rate
    pub alloc_rate: f64,

    /// Collector scan rate
    pub scan_rate: f64,

    /// Multiplier applied to bytes that survived the previous collection
    pub growth_rate: f64,

    /// Fraction of heap bytes that contain pointers, in [0, 1]
    pub scannable_frac: f64,

    /// Goroutine-style stack bytes scanned as roots this cycle
    pub stack_bytes: u64,

    /// Explicit heap-size target; zero or negative means unset
    #[serde(rename = "heap_target", default = "unset_heap_target")]
    pub heap_target_bytes: i64,
}

impl Default for CycleInput {
    fn default() -> Self {
        Self {
            alloc_rate: 1.0,
            scan_rate: 31.0,
            growth_rate: 1.0,
            scannable_frac: 1.0,
            stack_bytes: 8192,
            heap_target_bytes: unset_heap_target(),
        }
    }
}

impl CycleInput {
    /// Heap target override in bytes, if one is set
    pub fn heap_target(&self) -> Option<u64> {
        u64::try_from(self.heap_target_bytes)
            .ok()
            .filter(|&target| target > 0)
    }

    /// Check the record against its stated constraints
    ///
    /// The pacers themselves never call this; division by a zero scan rate
    /// or a negative rate simply yields non-finite arithmetic there.
    ///
    /// # Errors
    ///
    /// Returns [`PacerError::InvalidCycle`] tagged with `index`.
    pub fn validate(&self, index: usize) -> PacerResult<()> {
        let rates = [
            ("alloc rate", self.alloc_rate),
            ("scan rate", self.scan_rate),
            ("growth rate", self.growth_rate),
        ];
        for (name, value) in rates {
            if !value.is_finite() || value < 0.0 {
                return Err(PacerError::invalid_cycle(
                    index,
                    format!("{name} must be finite and non-negative, got {value}"),
                ));
            }
        }
        if self.scan_rate == 0.0 {
            return Err(PacerError::invalid_cycle(index, "scan rate must be positive"));
        }
        if !(0.0..=1.0).contains(&self.scannable_frac) {
            return Err(PacerError::invalid_cycle(
                index,
                format!(
                    "scannable fraction must lie in [0, 1], got {}",
                    self.scannable_frac
                ),
            ));
        }
        Ok(())
    }
}

/// Validate a whole ordered workload
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate_cycles(cycles: &[CycleInput]) -> PacerResult<()> {
    cycles
        .iter()
        .enumerate()
        .try_for_each(|(index, cycle)| cycle.validate(index))
}
