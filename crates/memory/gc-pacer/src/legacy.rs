//! Self-tuning trigger-ratio pacer
//!
//! Starts each collection once the heap has grown by `trigger_ratio` over
//! the live heap, assumes the during-GC pacer paces assists perfectly for a
//! 30% utilization target, and nudges the trigger ratio toward the growth
//! that would have met the goal at that utilization. Heap growth past the
//! goal is bounded by a hard ceiling of 1.1x the goal, paid for with higher
//! utilization.

use crate::state::{PacerState, trunc_bytes};
use crate::{CycleInput, CycleResult, Pacer, PacerKind, RunConfig};

/// Smallest heap goal the legacy pacer will set
pub const LEGACY_HEAP_MINIMUM: u64 = 4 << 20;

const U_TARGET_DEDICATED: f64 = 0.25;
const U_TARGET_ASSIST: f64 = 0.05;

/// Utilization the legacy pacer aims for: dedicated workers plus assists
pub const LEGACY_TARGET_UTILIZATION: f64 = U_TARGET_DEDICATED + U_TARGET_ASSIST;

const BOOTSTRAP_TRIGGER_RATIO: f64 = 7.0 / 8.0;
const HARD_GOAL_FACTOR: f64 = 1.1;
const TRIGGER_GAIN: f64 = 0.5;
const MIN_TRIGGER_FRACTION: f64 = 0.6;
const MAX_TRIGGER_FRACTION: f64 = 0.95;

/// Utilization at which `alloc_rate * (1-u) / (scan_rate * u)` equals
/// `assist_ratio`, floored at the dedicated share.
fn solve_utilization(cycle: &CycleInput, assist_ratio: f64) -> f64 {
    let u = cycle.alloc_rate / (cycle.alloc_rate + cycle.scan_rate * assist_ratio);
    if u < U_TARGET_DEDICATED { U_TARGET_DEDICATED } else { u }
}

/// Heap bytes allocated per byte of scan work at utilization `u`
fn growth_per_scan(cycle: &CycleInput, u: f64) -> f64 {
    (cycle.alloc_rate * (1.0 - u)) / (cycle.scan_rate * u)
}

/// Which part of the during-GC model bounded the peak heap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regime {
    /// Expected scan work covered everything and the goal held
    Expected,
    /// More work than expected, finished under the goal at a worse utilization
    SecondPhase,
    /// Heap reached the goal; pinned to the hard ceiling
    HardCeiling,
}

/// Numbers fixed when the collection starts
struct MarkPlan {
    heap_goal: u64,
    hard_heap_goal: u64,
    trigger_point: u64,
    max_scan_work: u64,
    exp_scan_work: u64,
    total_scan_work: u64,
    u_exp: f64,
    r: f64,
}

impl MarkPlan {
    fn blend(&self, done: u64, u_worst: f64) -> f64 {
        let left = self.total_scan_work.wrapping_sub(done);
        (self.u_exp * done as f64 + u_worst * left as f64) / self.total_scan_work as f64
    }

    /// Peak and utilization once the heap has hit the goal with scan work
    /// still outstanding
    fn hard_ceiling(&self, cycle: &CycleInput) -> (u64, f64) {
        let done = trunc_bytes(self.heap_goal.wrapping_sub(self.trigger_point) as f64 / self.r);
        let est_left = self.max_scan_work.wrapping_sub(done);
        let panicked =
            self.hard_heap_goal.wrapping_sub(self.heap_goal) as f64 / est_left as f64;
        let u_worst = solve_utilization(cycle, panicked);
        (self.hard_heap_goal, self.blend(done, u_worst))
    }

    /// Peak and utilization when expected work ran out under the goal and
    /// the rest is paced against the remaining room below the ceiling
    fn second_phase(&self, cycle: &CycleInput, peak: u64) -> (u64, f64) {
        let done = self.exp_scan_work;
        let est_left = self.max_scan_work.wrapping_sub(done);
        let panicked = self.hard_heap_goal.wrapping_sub(peak) as f64 / est_left as f64;
        let u_worst = solve_utilization(cycle, panicked);
        let left = self.total_scan_work.wrapping_sub(done);
        let extra = trunc_bytes(growth_per_scan(cycle, u_worst) * left as f64);
        (peak.wrapping_add(extra), self.blend(done, u_worst))
    }

    fn run(&self, cycle: &CycleInput) -> (u64, f64, Regime) {
        let covered = self.exp_scan_work >= self.total_scan_work;
        let work = if covered {
            self.total_scan_work
        } else {
            self.exp_scan_work
        };
        let peak = self
            .trigger_point
            .wrapping_add(trunc_bytes(self.r * work as f64));
        if peak > self.heap_goal {
            let (peak, u) = self.hard_ceiling(cycle);
            (peak, u, Regime::HardCeiling)
        } else if covered {
            (peak, self.u_exp, Regime::Expected)
        } else {
            let (peak, u) = self.second_phase(cycle, peak);
            (peak, u, Regime::SecondPhase)
        }
    }
}

/// Trigger-ratio pacer with damped proportional self-correction
#[derive(Debug, Clone)]
pub struct LegacyPacer {
    run: RunConfig,
    state: PacerState,
    trigger_ratio_raw: f64,
    trigger_ratio: f64,
}

impl LegacyPacer {
    /// Create a pacer at its bootstrap state
    pub fn new(run: RunConfig) -> Self {
        Self {
            run,
            state: PacerState::default(),
            trigger_ratio_raw: BOOTSTRAP_TRIGGER_RATIO,
            trigger_ratio: BOOTSTRAP_TRIGGER_RATIO,
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

    /// Effective (clamped) trigger ratio for the next cycle
    pub fn trigger_ratio(&self) -> f64 {
        self.trigger_ratio
    }

    /// Unclamped trigger ratio the controller integrates
    pub fn trigger_ratio_raw(&self) -> f64 {
        self.trigger_ratio_raw
    }

    /// Goal from the carried live heap, and whether gamma (rather than the
    /// heap target or the minimum) decided it
    fn goal(&self, cycle: &CycleInput) -> (u64, bool) {
        let mut goal = trunc_bytes(self.state.live_bytes_last as f64 * self.run.gamma);
        let mut gamma_bound = true;
        if let Some(target) = cycle.heap_target()
            && goal < target
        {
            goal = target;
            gamma_bound = false;
        }
        if goal < LEGACY_HEAP_MINIMUM {
            goal = LEGACY_HEAP_MINIMUM;
            gamma_bound = false;
        }
        (goal, gamma_bound)
    }

    fn clamp_trigger_ratio(&mut self, next_goal: u64, gamma_bound: bool, survived: u64) {
        let margin = self.run.gamma - 1.0;
        let mut ratio = self.trigger_ratio_raw;
        if ratio < MIN_TRIGGER_FRACTION * margin {
            ratio = MIN_TRIGGER_FRACTION * margin;
        } else if gamma_bound && ratio > MAX_TRIGGER_FRACTION * margin {
            ratio = MAX_TRIGGER_FRACTION * margin;
        } else {
            let next_goal_growth = next_goal as f64 / survived as f64 - 1.0;
            if !gamma_bound && ratio > MAX_TRIGGER_FRACTION * next_goal_growth {
                ratio = MAX_TRIGGER_FRACTION * next_goal_growth;
            }
        }
        self.trigger_ratio = ratio;
    }
}

impl Pacer for LegacyPacer {
    fn step(&mut self, cycle: &CycleInput) -> CycleResult {
        let gamma = self.run.gamma;
        let bootstrap = self.state.is_bootstrap();
        let live_last = self.state.live_bytes_last;

        // Nothing below changes the carried state, so this is also the goal
        // the next cycle will open with.
        let (next_goal, gamma_bound) = self.goal(cycle);
        let mut heap_goal = next_goal;
        if bootstrap {
            self.trigger_ratio_raw = BOOTSTRAP_TRIGGER_RATIO;
            self.trigger_ratio = BOOTSTRAP_TRIGGER_RATIO;
        }

        let mut trigger_point = trunc_bytes(live_last as f64 * (1.0 + self.trigger_ratio));
        let mut max_scan_work = self.state.live_scannable_last.wrapping_add(trunc_bytes(
            trigger_point.wrapping_sub(live_last) as f64 * cycle.scannable_frac,
        ));
        let mut exp_scan_work = trunc_bytes(max_scan_work as f64 / gamma);

        // Back a live heap out of the floored goal so the bootstrap trigger
        // ratio and goal agree with each other.
        let dummy_live = trunc_bytes(heap_goal as f64 / (1.0 + self.trigger_ratio));
        if bootstrap {
            trigger_point = heap_goal;
            heap_goal = trunc_bytes(dummy_live as f64 * gamma);
            max_scan_work = dummy_live.wrapping_add(trunc_bytes(
                trigger_point.wrapping_sub(dummy_live) as f64 * cycle.scannable_frac,
            ));
            exp_scan_work = trunc_bytes(max_scan_work as f64 / gamma);
        }
        let baseline = if bootstrap { dummy_live } else { live_last };

        let total_scan_work = self.state.total_scan_work(&self.run, cycle);
        let assist_ratio_relaxed =
            heap_goal.wrapping_sub(trigger_point) as f64 / exp_scan_work as f64;
        let u_exp = solve_utilization(cycle, assist_ratio_relaxed);
        let plan = MarkPlan {
            heap_goal,
            hard_heap_goal: trunc_bytes(HARD_GOAL_FACTOR * heap_goal as f64),
            trigger_point,
            max_scan_work,
            exp_scan_work,
            total_scan_work,
            u_exp,
            r: growth_per_scan(cycle, u_exp),
        };
        let (peak_heap, u_actual, regime) = plan.run(cycle);

        let survivors = self.state.survivors(
            &self.run,
            cycle,
            peak_heap.wrapping_sub(trigger_point),
        );

        let goal_growth = heap_goal.wrapping_sub(baseline) as f64 / baseline as f64;
        let actual_growth = peak_heap as f64 / baseline as f64 - 1.0;
        let raw = self.trigger_ratio_raw;
        let delta = TRIGGER_GAIN
            * (goal_growth - raw - u_actual / LEGACY_TARGET_UTILIZATION * (actual_growth - raw));
        self.trigger_ratio_raw += delta;
        self.clamp_trigger_ratio(next_goal, gamma_bound, survivors.live);

        log::debug!(
            "legacy gc {}: goal={} trigger={} peak={} u={:.4} regime={:?} ratio={:.4}->{:.4}",
            self.state.cycle,
            heap_goal,
            trigger_point,
            peak_heap,
            u_actual,
            regime,
            raw,
            self.trigger_ratio
        );

        self.state.advance(survivors);

        CycleResult {
            r: assist_ratio_relaxed,
            live_bytes: survivors.live,
            live_scan_bytes: survivors.live_scannable,
            goal_bytes: heap_goal,
            actual_utilization: u_actual,
            target_utilization: LEGACY_TARGET_UTILIZATION,
            trigger_point,
            peak_bytes: peak_heap,
        }
    }

    fn kind(&self) -> PacerKind {
        PacerKind::Legacy
    }

    fn cycles(&self) -> u64 {
        self.state.cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(alloc_rate: f64, scan_rate: f64) -> CycleInput {
        CycleInput {
            alloc_rate,
            scan_rate,
            ..CycleInput::default()
        }
    }

    fn plan(trigger_point: u64, max: u64, exp: u64, total: u64) -> MarkPlan {
        MarkPlan {
            heap_goal: 1000,
            hard_heap_goal: 1100,
            trigger_point,
            max_scan_work: max,
            exp_scan_work: exp,
            total_scan_work: total,
            u_exp: 0.25,
            r: 1.0,
        }
    }

    #[test]
    fn test_utilization_floor() {
        // Plenty of runway: assists would idle, dedicated share still applies.
        assert_eq!(solve_utilization(&cycle(1.0, 31.0), 10.0), 0.25);
        // No runway to speak of: nearly everything goes to marking.
        assert!(solve_utilization(&cycle(1.0, 31.0), 0.001) > 0.9);
    }

    #[test]
    fn test_growth_per_scan_at_dedicated_share() {
        let ratio = growth_per_scan(&cycle(1.0, 3.0), 0.25);
        assert!((ratio - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_expected_regime() {
        let (peak, u, regime) = plan(800, 400, 300, 200).run(&cycle(1.0, 3.0));
        assert_eq!(regime, Regime::Expected);
        assert_eq!(peak, 1000);
        assert_eq!(u, 0.25);
    }

    #[test]
    fn test_second_phase_regime() {
        let (peak, u, regime) = plan(800, 400, 100, 300).run(&cycle(1.0, 3.0));
        assert_eq!(regime, Regime::SecondPhase);
        assert_eq!(peak, 900 + 133);
        assert!((u - 0.305_555_555_555_555_5).abs() < 1e-12);
    }

    #[test]
    fn test_hard_ceiling_regime() {
        let (peak, u, regime) = plan(900, 400, 200, 300).run(&cycle(1.0, 3.0));
        assert_eq!(regime, Regime::HardCeiling);
        assert_eq!(peak, 1100);
        assert!((u - 0.416_666_666_666_666_7).abs() < 1e-12);
    }

    #[test]
    fn test_bootstrap_trigger_ratio() {
        let pacer = LegacyPacer::new(RunConfig::default());
        assert_eq!(pacer.trigger_ratio(), 7.0 / 8.0);
        assert_eq!(pacer.trigger_ratio_raw(), 7.0 / 8.0);
        assert!(pacer.state().is_bootstrap());
    }

    #[test]
    fn test_goal_floor_and_target() {
        let mut pacer = LegacyPacer::new(RunConfig::default());
        assert_eq!(pacer.goal(&CycleInput::default()), (LEGACY_HEAP_MINIMUM, false));

        pacer.state.live_bytes_last = 10 << 20;
        assert_eq!(pacer.goal(&CycleInput::default()), (20 << 20, true));

        let targeted = CycleInput {
            heap_target_bytes: 64 << 20,
            ..CycleInput::default()
        };
        assert_eq!(pacer.goal(&targeted), (64 << 20, false));
    }

    #[test]
    fn test_trigger_ratio_clamps() {
        let mut pacer = LegacyPacer::new(RunConfig::default());

        pacer.trigger_ratio_raw = 0.1;
        pacer.clamp_trigger_ratio(8 << 20, true, 4 << 20);
        assert!((pacer.trigger_ratio() - 0.6).abs() < 1e-12);

        pacer.trigger_ratio_raw = 2.0;
        pacer.clamp_trigger_ratio(8 << 20, true, 4 << 20);
        assert!((pacer.trigger_ratio() - 0.95).abs() < 1e-12);

        // Target-bound: 0.95 * (64 MiB / 16 MiB - 1)
        pacer.trigger_ratio_raw = 5.0;
        pacer.clamp_trigger_ratio(64 << 20, false, 16 << 20);
        assert!((pacer.trigger_ratio() - 2.85).abs() < 1e-12);
        assert_eq!(pacer.trigger_ratio_raw(), 5.0);
    }
}
