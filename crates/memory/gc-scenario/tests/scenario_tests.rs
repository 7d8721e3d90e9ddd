//! Scenario generation and file round-trip tests

use gc_pacer::PacerKind;
use gc_scenario::{Execution, ScenarioError, generate, generators};

// ============================================================================
// Generators
// ============================================================================

#[test]
fn test_every_generator_produces_valid_scenario() {
    for name in generators() {
        let execution = generate(name, 1).unwrap();
        assert!(!execution.cycles.is_empty(), "{name} is empty");
        execution
            .validate()
            .unwrap_or_else(|e| panic!("{name} failed validation: {e}"));
    }
}

#[test]
fn test_generation_is_deterministic_per_seed() {
    for name in generators() {
        assert_eq!(generate(name, 7).unwrap(), generate(name, 7).unwrap(), "{name}");
    }
    assert_ne!(
        generate("jitter-alloc", 7).unwrap(),
        generate("jitter-alloc", 8).unwrap()
    );
}

#[test]
fn test_steady() {
    let execution = generate("steady", 0).unwrap();
    assert_eq!(execution.cycles.len(), 50);
    assert_eq!(execution.global.gamma, 2.0);
    assert_eq!(execution.global.globals_bytes, 32 << 10);
    assert_eq!(execution.global.initial_heap, 2 << 20);

    let growth: Vec<f64> = execution.cycles.iter().map(|c| c.growth_rate).collect();
    assert_eq!(growth[0], 2.0);
    assert_eq!(growth[1], 1.875);
    assert!(growth[8..].iter().all(|&g| g == 1.0));

    for cycle in &execution.cycles {
        assert_eq!(cycle.alloc_rate, 1.0);
        assert_eq!(cycle.scan_rate, 31.0);
        assert_eq!(cycle.stack_bytes, 8192);
        assert_eq!(cycle.heap_target(), None);
    }
}

#[test]
fn test_step_alloc_doubles_after_delay() {
    let execution = generate("step-alloc", 0).unwrap();
    assert_eq!(execution.cycles.len(), 100);
    assert_eq!(execution.cycles[50].alloc_rate, 1.0);
    assert_eq!(execution.cycles[51].alloc_rate, 2.0);
    assert_eq!(execution.cycles[99].alloc_rate, 2.0);

    let heavy = generate("heavy-step-alloc", 0).unwrap();
    assert_eq!(heavy.cycles[51].alloc_rate, 11.0);
}

#[test]
fn test_big_stacks_are_quantized() {
    let execution = generate("big-stacks", 0).unwrap();
    let stacks: Vec<u64> = execution.cycles.iter().map(|c| c.stack_bytes).collect();
    assert_eq!(stacks[0], 2048);
    assert_eq!(stacks[1], 2048 + (16 << 20));
    assert_eq!(stacks[8], 2048 + (128 << 20));
    assert!(stacks.iter().all(|s| s % 2048 == 0));
}

#[test]
fn test_high_gogc_growth_jump() {
    let execution = generate("high-GOGC", 3).unwrap();
    assert_eq!(execution.global.gamma, 16.0);
    let jump = execution.cycles[25].growth_rate;
    assert!((14.99..=15.01).contains(&jump), "growth at cycle 25 was {jump}");
    assert!(execution.cycles[26].growth_rate < 1.02);
    for cycle in &execution.cycles {
        assert!((4.8..=5.2).contains(&cycle.alloc_rate));
    }
}

#[test]
fn test_step_heap_target() {
    let execution = generate("step-heap-target", 0).unwrap();
    assert_eq!(execution.cycles[24].heap_target(), None);
    assert_eq!(execution.cycles[24].heap_target_bytes, -1);
    assert_eq!(execution.cycles[25].heap_target(), Some(256 << 20));
    assert_eq!(execution.cycles[49].heap_target(), Some(256 << 20));
}

#[test]
fn test_noisy_heap_targets_stay_near_two_gib() {
    let low = generate("low-noise-high-heap-target", 5).unwrap();
    for cycle in &low.cycles {
        let delta = cycle.heap_target_bytes - (2 << 30);
        assert!(delta.abs() <= 1 << 20);
    }

    let high = generate("high-noise-high-heap-target", 5).unwrap();
    for cycle in &high.cycles {
        let delta = cycle.heap_target_bytes - (2 << 30);
        assert!(delta.abs() <= 512 << 20);
    }
}

#[test]
fn test_unknown_generator_lists_choices() {
    let err = generate("steady-state", 0).unwrap_err();
    assert!(matches!(err, ScenarioError::UnknownGenerator { .. }));
    assert!(err.to_string().contains("step-heap-target"));
}

// ============================================================================
// Files
// ============================================================================

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("osc-alloc.json");

    let execution = generate("osc-alloc", 0).unwrap();
    execution.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n    \"global\": {\n        \"gamma\": 2.0"));
    assert_eq!(Execution::from_file(&path).unwrap(), execution);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Execution::from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ScenarioError::File { .. }));
    assert!(err.to_string().contains("absent.json"));
}

// ============================================================================
// Simulation
// ============================================================================

#[test]
fn test_generated_scenarios_simulate_with_every_pacer() {
    for name in generators() {
        let execution = generate(name, 11).unwrap();
        for kind in PacerKind::ALL {
            let results = execution.simulate(kind.name(), None).unwrap();
            assert_eq!(results.len(), execution.cycles.len(), "{name}/{kind}");
            for result in &results {
                assert!(result.actual_utilization.is_finite(), "{name}/{kind}");
                assert_eq!(result.target_utilization, kind.target_utilization());
            }
        }
    }
}
