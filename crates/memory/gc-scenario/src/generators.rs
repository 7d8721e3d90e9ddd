//! Named workload generators
//!
//! Each generator describes a run as a set of [`Stream`]s, one per workload
//! dimension, plus the run globals and length. [`generate`] samples them into
//! a concrete [`Execution`].

use gc_pacer::{CycleInput, RunConfig};

use crate::error::{ScenarioError, ScenarioResult};
use crate::execution::Execution;
use crate::stream::{SharedRng, Stream, shared_rng};

/// Signal description of one scenario
#[derive(Debug)]
pub struct Workload {
    /// Run globals
    pub global: RunConfig,
    /// Allocation rate per cycle
    pub alloc_rate: Stream,
    /// Scan rate per cycle
    pub scan_rate: Stream,
    /// Growth rate per cycle
    pub growth_rate: Stream,
    /// Scannable fraction per cycle
    pub scannable_frac: Stream,
    /// Stack bytes per cycle
    pub stack_bytes: Stream,
    /// Heap target per cycle; non-positive values mean unset
    pub heap_target: Stream,
    /// Number of cycles to sample
    pub length: usize,
}

impl Workload {
    /// Sample the workload into concrete cycle records
    ///
    /// Rates are floored at zero, the scannable fraction is limited to
    /// `[0, 1]`, stack bytes are rounded down to 2 KiB and the heap target to
    /// whole bytes.
    pub fn sample(self) -> Execution {
        let mut alloc_rate = self.alloc_rate.at_least(0.0);
        let mut scan_rate = self.scan_rate.at_least(0.0);
        let mut growth_rate = self.growth_rate.at_least(0.0);
        let mut scannable_frac = self.scannable_frac.limit(0.0, 1.0);
        let mut stack_bytes = self.stack_bytes.quantize(2048.0).at_least(0.0);
        let mut heap_target = self.heap_target.quantize(1.0);

        let cycles = (0..self.length)
            .map(|_| CycleInput {
                alloc_rate: alloc_rate.sample(),
                scan_rate: scan_rate.sample(),
                growth_rate: growth_rate.sample(),
                scannable_frac: scannable_frac.sample(),
                stack_bytes: stack_bytes.sample() as u64,
                heap_target_bytes: heap_target.sample() as i64,
            })
            .collect();

        Execution::new(self.global, cycles)
    }
}

type Builder = fn(&SharedRng) -> Workload;

// Kept in byte order so the listing is stable.
const GENERATORS: &[(&str, Builder)] = &[
    ("big-globals", big_globals),
    ("big-stacks", big_stacks),
    ("exceed-heap-target", exceed_heap_target),
    ("exceed-heap-target-high-GOGC", exceed_heap_target_high_gogc),
    ("heavy-jitter-alloc", heavy_jitter_alloc),
    ("heavy-step-alloc", heavy_step_alloc),
    ("heavy-step-alloc-high-heap-target", heavy_step_alloc_high_heap_target),
    ("high-GOGC", high_gogc),
    ("high-heap-target", high_heap_target),
    ("high-noise-high-heap-target", high_noise_high_heap_target),
    ("jitter-alloc", jitter_alloc),
    ("low-heap-target", low_heap_target),
    ("low-noise-high-heap-target", low_noise_high_heap_target),
    ("osc-alloc", osc_alloc),
    ("steady", steady),
    ("step-alloc", step_alloc),
    ("step-heap-target", step_heap_target),
    ("very-low-heap-target", very_low_heap_target),
];

/// Names of all registered generators, sorted
pub fn generators() -> Vec<&'static str> {
    GENERATORS.iter().map(|(name, _)| *name).collect()
}

/// Build the workload registered under `name`
pub fn workload(name: &str, rng: &SharedRng) -> ScenarioResult<Workload> {
    GENERATORS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, build)| build(rng))
        .ok_or_else(|| ScenarioError::unknown_generator(name, &generators()))
}

/// Generate the named scenario
///
/// Noise is drawn from an RNG seeded with `seed`, so the same name and seed
/// always yield the same execution.
///
/// # Errors
///
/// Returns [`ScenarioError::UnknownGenerator`] for an unregistered name.
pub fn generate(name: &str, seed: u64) -> ScenarioResult<Execution> {
    let rng = shared_rng(seed);
    let workload = workload(name, &rng)?;
    log::debug!(
        "generating scenario {name}: {} cycles, seed {seed}",
        workload.length
    );
    Ok(workload.sample())
}

const MIB: f64 = (1u64 << 20) as f64;
const GIB: f64 = (1u64 << 30) as f64;

/// Unit allocation, full scannability, 8 KiB of stacks, no heap target and a
/// growth rate settling from 2.0 to 1.0 over eight cycles
fn baseline() -> Workload {
    Workload {
        global: RunConfig::new(2.0, 32 << 10, 2 << 20),
        alloc_rate: Stream::constant(1.0),
        scan_rate: Stream::constant(31.0),
        growth_rate: settling_growth(),
        scannable_frac: Stream::constant(1.0),
        stack_bytes: Stream::constant(8192.0),
        heap_target: Stream::constant(-1.0),
        length: 50,
    }
}

fn settling_growth() -> Stream {
    Stream::constant(2.0).mix([Stream::ramp(-1.0, 8)])
}

/// Settling growth with 1% jitter and an optional one-off jump at cycle 25
fn noisy_growth(rng: &SharedRng, jump: Option<f64>) -> Stream {
    let mut parts = vec![Stream::ramp(-1.0, 8), Stream::random(0.01, rng)];
    if let Some(jump) = jump {
        parts.push(Stream::unit(jump).delay(25));
    }
    Stream::constant(2.0).mix(parts)
}

/// Growth settling from 1.5 to 1.0 over four cycles, with a jump at cycle 25
fn shallow_growth(rng: &SharedRng, jump: f64) -> Stream {
    Stream::constant(1.5).mix([
        Stream::ramp(-0.5, 4),
        Stream::random(0.01, rng),
        Stream::unit(jump).delay(25),
    ])
}

fn steady(_: &SharedRng) -> Workload {
    baseline()
}

fn step_alloc(_: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::constant(1.0).mix([Stream::ramp(1.0, 1).delay(50)]),
        length: 100,
        ..baseline()
    }
}

fn big_stacks(_: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::constant(4.0),
        stack_bytes: Stream::constant(2048.0).mix([Stream::ramp(128.0 * MIB, 8)]),
        ..baseline()
    }
}

fn big_globals(_: &SharedRng) -> Workload {
    Workload {
        global: RunConfig::new(2.0, 128 << 20, 2 << 20),
        alloc_rate: Stream::constant(4.0),
        ..baseline()
    }
}

fn osc_alloc(_: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::oscillate(0.4, 0.0, 8).offset(2.0),
        ..baseline()
    }
}

fn jitter_alloc(rng: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::random(0.4, rng).offset(4.0),
        growth_rate: noisy_growth(rng, None),
        ..baseline()
    }
}

fn high_gogc(rng: &SharedRng) -> Workload {
    Workload {
        global: RunConfig::new(16.0, 32 << 10, 2 << 20),
        alloc_rate: Stream::random(0.2, rng).offset(5.0),
        growth_rate: noisy_growth(rng, Some(14.0)),
        ..baseline()
    }
}

fn heavy_jitter_alloc(rng: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::random(1.0, rng).offset(10.0),
        growth_rate: noisy_growth(rng, None),
        ..baseline()
    }
}

fn heavy_step_alloc(_: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::constant(1.0).mix([Stream::ramp(10.0, 1).delay(50)]),
        length: 100,
        ..baseline()
    }
}

fn high_heap_target(rng: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::random(0.2, rng).offset(5.0),
        growth_rate: noisy_growth(rng, Some(14.0)),
        heap_target: Stream::constant(2.0 * GIB),
        ..baseline()
    }
}

fn low_heap_target(rng: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::random(0.1, rng).offset(4.0),
        growth_rate: shallow_growth(rng, 3.0),
        heap_target: Stream::constant(64.0 * MIB),
        ..baseline()
    }
}

fn very_low_heap_target(rng: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::random(0.1, rng).offset(4.0),
        growth_rate: Stream::constant(2.0).mix([Stream::ramp(-1.0, 20), Stream::random(0.01, rng)]),
        heap_target: Stream::constant(64.0 * MIB),
        ..baseline()
    }
}

fn step_heap_target(rng: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::random(0.1, rng).offset(4.0),
        growth_rate: noisy_growth(rng, None),
        heap_target: Stream::constant(-1.0).mix([Stream::constant(256.0 * MIB + 1.0).delay(25)]),
        ..baseline()
    }
}

fn heavy_step_alloc_high_heap_target(rng: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::constant(1.0).mix([Stream::ramp(10.0, 1).delay(25)]),
        growth_rate: noisy_growth(rng, None),
        heap_target: Stream::constant(2.0 * GIB),
        ..baseline()
    }
}

fn exceed_heap_target(rng: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::random(0.1, rng).offset(4.0),
        growth_rate: shallow_growth(rng, 6.0),
        heap_target: Stream::constant(64.0 * MIB),
        ..baseline()
    }
}

fn exceed_heap_target_high_gogc(rng: &SharedRng) -> Workload {
    Workload {
        global: RunConfig::new(16.0, 32 << 10, 2 << 20),
        alloc_rate: Stream::random(0.1, rng).offset(4.0),
        growth_rate: shallow_growth(rng, 14.0),
        heap_target: Stream::constant(64.0 * MIB),
        ..baseline()
    }
}

fn low_noise_high_heap_target(rng: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::random(0.2, rng).offset(5.0),
        growth_rate: noisy_growth(rng, Some(14.0)),
        heap_target: Stream::constant(2.0 * GIB).mix([Stream::random(MIB, rng)]),
        ..baseline()
    }
}

fn high_noise_high_heap_target(rng: &SharedRng) -> Workload {
    Workload {
        alloc_rate: Stream::random(0.2, rng).offset(5.0),
        growth_rate: noisy_growth(rng, Some(14.0)),
        heap_target: Stream::constant(2.0 * GIB).mix([Stream::random(512.0 * MIB, rng)]),
        ..baseline()
    }
}
