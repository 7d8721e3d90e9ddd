//! Per-cycle pacing decision

use serde::{Deserialize, Serialize};

/// Outcome of stepping a pacer through one cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleResult {
    /// Control value in effect when the cycle started
    pub r: f64,

    /// Bytes that survived this cycle (next cycle's live heap)
    #[serde(rename = "live")]
    pub live_bytes: u64,

    /// Scannable share of the survivors
    #[serde(rename = "scan")]
    pub live_scan_bytes: u64,

    /// Heap goal for this cycle
    #[serde(rename = "goal")]
    pub goal_bytes: u64,

    /// Collector utilization actually achieved
    #[serde(rename = "actual_u")]
    pub actual_utilization: f64,

    /// Utilization the pacer aims for
    #[serde(rename = "target_u")]
    pub target_utilization: f64,

    /// Heap size at which the cycle started
    #[serde(rename = "trigger")]
    pub trigger_point: u64,

    /// Largest heap size reached during the cycle
    #[serde(rename = "peak")]
    pub peak_bytes: u64,
}

impl CycleResult {
    /// Bytes allocated while the collection was running
    pub fn black_alloc_bytes(&self) -> u64 {
        self.peak_bytes.wrapping_sub(self.trigger_point)
    }

    /// Whether the heap grew past its goal
    pub fn overshot_goal(&self) -> bool {
        self.peak_bytes > self.goal_bytes
    }
}
