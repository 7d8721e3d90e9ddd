//! # GC Pacer Scenarios
//!
//! Workload descriptions for the pacer model:
//!
//! - [`Stream`]: composable per-cycle signals (constants, ramps, noise, delays)
//! - [`generate`]: named, seeded scenario generators
//! - [`Execution`]: the JSON scenario file read by the simulator
//!
//! ```
//! use gc_scenario::generate;
//!
//! let execution = generate("steady", 0)?;
//! let results = execution.simulate("controlled", None)?;
//! assert_eq!(results.len(), execution.cycles.len());
//! # Ok::<(), gc_scenario::ScenarioError>(())
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod execution;
pub mod generators;
pub mod stream;

pub use error::{ScenarioError, ScenarioResult};
pub use execution::Execution;
pub use generators::{Workload, generate, generators};
pub use stream::{SharedRng, Stream, shared_rng};
