//! Run statistics

use serde::{Deserialize, Serialize};

use crate::CycleResult;

/// Summary of a sequence of pacing decisions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Cycles recorded
    pub cycles: u64,

    /// Largest peak heap seen
    pub max_peak_bytes: u64,

    /// Largest heap goal seen
    pub max_goal_bytes: u64,

    /// Most bytes allocated during a single collection
    pub max_black_alloc_bytes: u64,

    /// Sum of actual utilizations, for the mean
    total_utilization: f64,

    /// Highest actual utilization seen
    pub max_utilization: f64,

    /// Cycles whose peak heap exceeded the goal
    pub goal_overshoots: u64,

    /// Worst `peak / goal` ratio seen
    pub max_overshoot_ratio: f64,
}

impl RunStats {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarize a whole run
    pub fn from_results(results: &[CycleResult]) -> Self {
        let mut stats = Self::new();
        results.iter().for_each(|result| stats.record(result));
        stats
    }

    /// Fold one more cycle in
    pub fn record(&mut self, result: &CycleResult) {
        self.cycles += 1;
        self.max_peak_bytes = self.max_peak_bytes.max(result.peak_bytes);
        self.max_goal_bytes = self.max_goal_bytes.max(result.goal_bytes);
        self.max_black_alloc_bytes = self.max_black_alloc_bytes.max(result.black_alloc_bytes());
        self.total_utilization += result.actual_utilization;
        self.max_utilization = self.max_utilization.max(result.actual_utilization);
        if result.overshot_goal() {
            self.goal_overshoots += 1;
        }
        if result.goal_bytes > 0 {
            let ratio = result.peak_bytes as f64 / result.goal_bytes as f64;
            self.max_overshoot_ratio = self.max_overshoot_ratio.max(ratio);
        }
    }

    /// Mean actual utilization
    pub fn mean_utilization(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        self.total_utilization / self.cycles as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(goal: u64, trigger: u64, peak: u64, u: f64) -> CycleResult {
        CycleResult {
            r: 0.0,
            live_bytes: 0,
            live_scan_bytes: 0,
            goal_bytes: goal,
            actual_utilization: u,
            target_utilization: 0.25,
            trigger_point: trigger,
            peak_bytes: peak,
        }
    }

    #[test]
    fn test_empty() {
        let stats = RunStats::new();
        assert_eq!(stats.cycles, 0);
        assert_eq!(stats.mean_utilization(), 0.0);
    }

    #[test]
    fn test_aggregates() {
        let stats = RunStats::from_results(&[
            result(100, 80, 90, 0.25),
            result(200, 170, 220, 0.35),
            result(150, 140, 150, 0.30),
        ]);
        assert_eq!(stats.cycles, 3);
        assert_eq!(stats.max_peak_bytes, 220);
        assert_eq!(stats.max_goal_bytes, 200);
        assert_eq!(stats.max_black_alloc_bytes, 50);
        assert_eq!(stats.goal_overshoots, 1);
        assert!((stats.max_overshoot_ratio - 1.1).abs() < 1e-12);
        assert!((stats.mean_utilization() - 0.3).abs() < 1e-12);
        assert_eq!(stats.max_utilization, 0.35);
    }
}
