//! # GC Pacer Model
//!
//! A stand-alone model of how a garbage-collected runtime decides when to
//! start a collection and how hard to throttle allocation while it runs, so
//! that heap growth converges to `gamma` times the live heap.
//!
//! A run feeds per-cycle workload measurements ([`CycleInput`]) into one
//! pacer, which returns one [`CycleResult`] per cycle:
//!
//! - [`LegacyPacer`]: self-tuning trigger ratio with damped proportional
//!   correction and a 1.1x hard heap ceiling
//! - [`ControlledPacer`]: trigger back-solved from a growth ratio `r` that a
//!   [`FeedbackController`] corrects every cycle
//!
//! ## Usage
//!
//! ```
//! use gc_pacer::{CycleInput, Pacer, PacerEngine, RunConfig};
//!
//! let mut pacer = PacerEngine::new("controlled", RunConfig::default(), None)?;
//! let result = pacer.step(&CycleInput::default());
//! assert!(result.trigger_point <= result.peak_bytes);
//! # Ok::<(), gc_pacer::PacerError>(())
//! ```
//!
//! Stepping is deterministic and allocation-free; independent pacers share
//! nothing and may run on separate threads.

#![warn(missing_docs)]
#![warn(unused_imports)]

pub mod config;
pub mod controlled;
pub mod controller;
pub mod cycle;
pub mod engine;
pub mod error;
pub mod legacy;
pub mod result;
pub mod state;
pub mod stats;

pub use config::RunConfig;
pub use controlled::{CONTROLLED_HEAP_MINIMUM, CONTROLLED_TARGET_UTILIZATION, ControlledPacer};
pub use controller::{FeedbackController, PiConfig, PiController};
pub use cycle::{CycleInput, validate_cycles};
pub use engine::{Pacer, PacerEngine, PacerKind};
pub use error::{PacerError, PacerResult};
pub use legacy::{LEGACY_HEAP_MINIMUM, LEGACY_TARGET_UTILIZATION, LegacyPacer};
pub use result::CycleResult;
pub use state::PacerState;
pub use stats::RunStats;
