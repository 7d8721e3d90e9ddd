//! Feedback-controlled pacer
//!
//! Models the trigger as the point where the remaining runway to the goal
//! equals `r` bytes of allocation per byte of expected scan work, then lets a
//! [`FeedbackController`] pull `r` toward the ratio actually observed at the
//! 25% utilization target.

use crate::controller::{FeedbackController, PiController};
use crate::state::{PacerState, trunc_bytes};
use crate::{CycleInput, CycleResult, Pacer, PacerKind, RunConfig};

/// Smallest heap goal the controlled pacer will set
pub const CONTROLLED_HEAP_MINIMUM: u64 = 2 << 20;

/// Dedicated collector utilization; assists only kick in past this point
pub const CONTROLLED_TARGET_UTILIZATION: f64 = 0.25;

const MIN_TRIGGER_FRACTION: f64 = 0.6;
const R_MARGIN: f64 = 0.05;

/// Pacer whose extra-growth ratio `r` is corrected by a controller each cycle
#[derive(Debug, Clone)]
pub struct ControlledPacer<C = PiController> {
    run: RunConfig,
    controller: C,
    state: PacerState,
    r: f64,
}

impl ControlledPacer<PiController> {
    /// Create a pacer driven by a default-tuned PI controller
    pub fn with_default_controller(run: RunConfig) -> Self {
        Self::new(run, PiController::default())
    }
}

impl<C: FeedbackController> ControlledPacer<C> {
    /// Create a pacer that owns `controller`
    pub fn new(run: RunConfig, controller: C) -> Self {
        Self {
            run,
            controller,
            state: PacerState::default(),
            r: 0.0,
        }
    }

    /// Run configuration
    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    /// Carried byte counts
    pub fn state(&self) -> &PacerState {
        &self.state
    }

    /// Control value the next cycle will use
    pub fn r(&self) -> f64 {
        self.r
    }

    /// The injected controller
    pub fn controller(&self) -> &C {
        &self.controller
    }

    fn goal(&self, cycle: &CycleInput, roots: u64) -> u64 {
        let mut goal =
            trunc_bytes(self.state.live_bytes_last.wrapping_add(roots) as f64 * self.run.gamma);
        if let Some(target) = cycle.heap_target()
            && goal < target
        {
            goal = target;
        }
        goal.max(CONTROLLED_HEAP_MINIMUM)
    }

    /// Back-solve the trigger so that `r * expected_scan` bytes of runway
    /// remain, but always give the mutator at least 60% of the goal margin.
    fn trigger(&self, heap_goal: u64, expected_scan: u64) -> u64 {
        if self.state.is_bootstrap() {
            return heap_goal.wrapping_mul(7) / 8;
        }
        let live = self.state.live_bytes_last;
        let backwards = trunc_bytes(self.r * expected_scan as f64).wrapping_add(live);
        let trigger = live.wrapping_add(heap_goal.saturating_sub(backwards));
        let min_trigger = trunc_bytes(heap_goal.wrapping_sub(live) as f64 * MIN_TRIGGER_FRACTION)
            .wrapping_add(live);
        trigger.max(min_trigger)
    }
}

impl<C: FeedbackController> Pacer for ControlledPacer<C> {
    fn step(&mut self, cycle: &CycleInput) -> CycleResult {
        const U: f64 = CONTROLLED_TARGET_UTILIZATION;

        let roots = cycle.stack_bytes.wrapping_add(self.run.globals_bytes);
        let expected_scan = self.state.live_scannable_last.wrapping_add(roots);
        let heap_goal = self.goal(cycle, roots);
        let trigger_point = self.trigger(heap_goal, expected_scan);

        let assist_ratio = (heap_goal as f64 - trigger_point as f64) / expected_scan as f64;
        let total_scan_work = self.state.total_scan_work(&self.run, cycle);

        let mut actual_ratio = (cycle.alloc_rate * (1.0 - U)) / (cycle.scan_rate * U);
        let mut actual_u = U;
        let assisted = actual_ratio > assist_ratio;
        if assisted {
            // Assists hold growth to the runway; solve u = x / (1 + x) with
            // x = alloc_rate / (ratio * scan_rate).
            actual_ratio = assist_ratio;
            let x = cycle.alloc_rate / (actual_ratio * cycle.scan_rate);
            actual_u = x / (1.0 + x);
        }
        let peak_heap =
            trigger_point.wrapping_add(trunc_bytes(actual_ratio * total_scan_work as f64));

        let black = peak_heap.wrapping_sub(trigger_point);
        let survivors = self.state.survivors(&self.run, cycle, black);

        // Normalize observed growth per scan byte back to the target utilization.
        let r_measured = black as f64 / total_scan_work as f64 * ((1.0 - U) / (1.0 - actual_u))
            / (U / actual_u);

        let this_r = self.r;
        self.r += self.controller.next(self.r, r_measured);
        if self.r < R_MARGIN {
            self.r = R_MARGIN;
        } else if self.r > self.run.gamma - R_MARGIN {
            self.r = self.run.gamma - R_MARGIN;
        }

        log::debug!(
            "controlled gc {}: goal={} trigger={} peak={} u={:.4} assisted={} r={:.4}->{:.4} measured={:.4}",
            self.state.cycle,
            heap_goal,
            trigger_point,
            peak_heap,
            actual_u,
            assisted,
            this_r,
            self.r,
            r_measured
        );

        self.state.advance(survivors);

        CycleResult {
            r: this_r,
            live_bytes: survivors.live,
            live_scan_bytes: survivors.live_scannable,
            goal_bytes: heap_goal,
            actual_utilization: actual_u,
            target_utilization: U,
            trigger_point,
            peak_bytes: peak_heap,
        }
    }

    fn kind(&self) -> PacerKind {
        PacerKind::Controlled
    }

    fn cycles(&self) -> u64 {
        self.state.cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Controller that always returns the same correction
    struct Fixed(f64);

    impl FeedbackController for Fixed {
        fn next(&mut self, _input: f64, _setpoint: f64) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_bootstrap_trigger_is_seven_eighths() {
        let pacer = ControlledPacer::with_default_controller(RunConfig::default());
        assert_eq!(pacer.trigger(2 << 20, 40960), 1_835_008);
    }

    #[test]
    fn test_goal_includes_roots() {
        let mut pacer = ControlledPacer::with_default_controller(RunConfig::default());
        pacer.state.live_bytes_last = 10 << 20;
        let roots = 8192 + 32768;
        assert_eq!(pacer.goal(&CycleInput::default(), roots), 2 * ((10 << 20) + roots));
        // Tiny heaps are floored.
        pacer.state.live_bytes_last = 0;
        assert_eq!(
            pacer.goal(&CycleInput::default(), roots),
            CONTROLLED_HEAP_MINIMUM
        );
    }

    #[test]
    fn test_minimum_trigger_advance() {
        let mut pacer = ControlledPacer::with_default_controller(RunConfig::default());
        pacer.state.cycle = 1;
        pacer.state.live_bytes_last = 1000;
        // A huge r would trigger immediately; the floor keeps 60% of the margin.
        pacer.r = 1000.0;
        assert_eq!(pacer.trigger(2000, 100), 1600);
        // A small r triggers late.
        pacer.r = 1.0;
        assert_eq!(pacer.trigger(2000, 100), 1900);
    }

    #[test]
    fn test_r_clamped_to_gamma_margin() {
        let mut high = ControlledPacer::new(RunConfig::default(), Fixed(100.0));
        let first = high.step(&CycleInput::default());
        assert_eq!(first.r, 0.0);
        assert!((high.r() - 1.95).abs() < 1e-12);

        let mut low = ControlledPacer::new(RunConfig::default(), Fixed(-100.0));
        low.step(&CycleInput::default());
        assert_eq!(low.r(), 0.05);
    }

    #[test]
    fn test_reports_pre_update_r() {
        let mut pacer = ControlledPacer::new(RunConfig::default(), Fixed(0.5));
        let cycle = CycleInput::default();
        assert_eq!(pacer.step(&cycle).r, 0.0);
        assert_eq!(pacer.step(&cycle).r, 0.5);
        assert_eq!(pacer.step(&cycle).r, 1.0);
        assert_eq!(pacer.cycles(), 3);
    }
}
