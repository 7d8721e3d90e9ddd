//! State carried between cycles
//!
//! Both pacers account for scan work and survivors the same way; only their
//! control variable differs, so that lives in the pacers themselves.
//!
//! Byte arithmetic here is modular: additions and subtractions wrap and
//! fractional byte counts truncate toward zero.

use crate::{CycleInput, RunConfig};

/// Truncate a fractional byte count
#[inline]
pub(crate) fn trunc_bytes(value: f64) -> u64 {
    value as u64
}

/// Byte counts carried from the previous cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacerState {
    /// Completed cycles
    pub cycle: u64,
    /// Heap that survived the previous cycle
    pub live_bytes_last: u64,
    /// Scannable share of `live_bytes_last`
    pub live_scannable_last: u64,
    /// Bytes allocated black during the previous cycle
    pub alloc_black_last: u64,
    /// Scannable share of `alloc_black_last`
    pub alloc_black_scannable_last: u64,
}

/// What survived one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Survivors {
    pub live: u64,
    pub live_scannable: u64,
    pub black: u64,
    pub black_scannable: u64,
}

impl PacerState {
    /// Whether the next step is the first one
    pub fn is_bootstrap(&self) -> bool {
        self.cycle == 0
    }

    /// Bytes the collector must trace during this cycle
    pub(crate) fn total_scan_work(&self, run: &RunConfig, cycle: &CycleInput) -> u64 {
        let heap = if self.is_bootstrap() {
            run.initial_heap
        } else {
            trunc_bytes(self.live_scannable_last as f64 * cycle.growth_rate)
        };
        heap.wrapping_add(cycle.stack_bytes)
            .wrapping_add(run.globals_bytes)
    }

    /// Survivor accounting for a cycle that allocated `black` bytes while
    /// marking. Only bytes that survived the previous collection grow.
    pub(crate) fn survivors(&self, run: &RunConfig, cycle: &CycleInput, black: u64) -> Survivors {
        let black_scannable = trunc_bytes(black as f64 * cycle.scannable_frac);
        let (live, live_scannable) = if self.is_bootstrap() {
            let live = run.initial_heap.wrapping_add(black);
            (live, trunc_bytes(live as f64 * cycle.scannable_frac))
        } else {
            let old = self.live_bytes_last.wrapping_sub(self.alloc_black_last);
            let old_scannable = self
                .live_scannable_last
                .wrapping_sub(self.alloc_black_scannable_last);
            (
                trunc_bytes(old as f64 * cycle.growth_rate).wrapping_add(black),
                trunc_bytes(old_scannable as f64 * cycle.growth_rate)
                    .wrapping_add(black_scannable),
            )
        };
        Survivors {
            live,
            live_scannable,
            black,
            black_scannable,
        }
    }

    /// Carry survivors into the next cycle
    pub(crate) fn advance(&mut self, survivors: Survivors) {
        self.live_bytes_last = survivors.live;
        self.live_scannable_last = survivors.live_scannable;
        self.alloc_black_last = survivors.black;
        self.alloc_black_scannable_last = survivors.black_scannable;
        self.cycle += 1;
    }
}
