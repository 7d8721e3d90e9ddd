//! Scenario files
//!
//! An [`Execution`] is the unit exchanged between the generator and the
//! simulator: the run globals plus the ordered cycle records, stored as JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use gc_pacer::{
    CycleInput, CycleResult, Pacer, PacerEngine, PiConfig, RunConfig, validate_cycles,
};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::error::{ScenarioError, ScenarioResult};

/// One simulated program run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    /// Workload of every cycle, in order
    pub cycles: Vec<CycleInput>,

    /// Run globals
    pub global: RunConfig,
}

impl Execution {
    /// Create an execution
    pub fn new(global: RunConfig, cycles: Vec<CycleInput>) -> Self {
        Self { cycles, global }
    }

    /// Parse an execution from JSON text
    pub fn from_json(json: &str) -> ScenarioResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load an execution from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> ScenarioResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ScenarioError::file(path, e))?;
        let execution: Self = serde_json::from_reader(BufReader::new(file))?;
        log::debug!(
            "loaded scenario {} ({} cycles)",
            path.display(),
            execution.cycles.len()
        );
        Ok(execution)
    }

    /// Serialize as JSON indented by four spaces, with a trailing newline
    pub fn write_to<W: Write>(&self, mut writer: W) -> ScenarioResult<()> {
        let mut ser =
            serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Write the execution to `path`, replacing any existing file
    pub fn save(&self, path: impl AsRef<Path>) -> ScenarioResult<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| ScenarioError::file(path, e))?;
        self.write_to(BufWriter::new(file))
    }

    /// Check the globals and every cycle record against their constraints
    pub fn validate(&self) -> ScenarioResult<()> {
        self.global.validate()?;
        validate_cycles(&self.cycles)?;
        Ok(())
    }

    /// Run every cycle through the named pacer
    ///
    /// The execution is validated first so a malformed scenario never
    /// reaches the pacer.
    pub fn simulate(
        &self,
        pacer: &str,
        controller: Option<PiConfig>,
    ) -> ScenarioResult<Vec<CycleResult>> {
        self.validate()?;
        let mut engine = PacerEngine::new(pacer, self.global, controller)?;
        Ok(engine.run(&self.cycles))
    }
}
