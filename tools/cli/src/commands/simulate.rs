//! # pacer-sim
//!
//! Run one scenario file through a named pacer and report every cycle.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use gc_pacer::{PacerKind, RunStats};
use gc_scenario::Execution;

use crate::{controller_config, output};

/// Parsed `pacer-sim` arguments
#[derive(Debug, Clone, PartialEq)]
pub struct SimulateArgs {
    /// Print the available pacers and exit
    pub list: bool,
    /// Emit JSON instead of CSV
    pub json: bool,
    /// Optional PI tuning file
    pub controller_config: Option<PathBuf>,
    /// Pacer name
    pub pacer: Option<String>,
    /// Scenario file
    pub scenario: Option<PathBuf>,
}

/// clap definition of `pacer-sim`
pub fn command() -> Command {
    Command::new("pacer-sim")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Simulate a GC pacer over a scenario file")
        .arg(
            Arg::new("list")
                .short('l')
                .help("List available pacers")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Generate JSON instead of CSV")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("controller-config")
                .long("controller-config")
                .value_name("FILE")
                .help("Controller configuration (JSON, or TOML by extension); defaults otherwise")
                .required(false),
        )
        .arg(Arg::new("pacer").value_name("PACER").help("Pacer type"))
        .arg(
            Arg::new("scenario")
                .value_name("SCENARIO")
                .help("Scenario JSON file"),
        )
}

impl SimulateArgs {
    /// Extract arguments from parsed matches
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            list: matches.get_flag("list"),
            json: matches.get_flag("json"),
            controller_config: matches
                .get_one::<String>("controller-config")
                .map(PathBuf::from),
            pacer: matches.get_one::<String>("pacer").cloned(),
            scenario: matches.get_one::<String>("scenario").map(PathBuf::from),
        }
    }
}

/// Execute `pacer-sim`, writing the report to `out`
pub fn run<W: Write>(args: &SimulateArgs, mut out: W) -> Result<()> {
    if args.list {
        for name in PacerKind::names() {
            writeln!(out, "{name}")?;
        }
        return Ok(());
    }

    let (Some(pacer), Some(scenario)) = (&args.pacer, &args.scenario) else {
        bail!("expected 2 arguments: pacer type and scenario file");
    };

    let execution = Execution::from_file(scenario)
        .with_context(|| format!("loading scenario {}", scenario.display()))?;
    let controller = args
        .controller_config
        .as_deref()
        .map(controller_config::load)
        .transpose()?;

    let results = execution.simulate(pacer, controller)?;

    let stats = RunStats::from_results(&results);
    log::info!(
        "{pacer}: {} cycles, mean utilization {:.4}, max peak/goal {:.4}, {} overshoots, max black alloc {}",
        stats.cycles,
        stats.mean_utilization(),
        stats.max_overshoot_ratio,
        stats.goal_overshoots,
        stats.max_black_alloc_bytes
    );

    if args.json {
        output::write_json(&mut out, &results).context("writing JSON results")?;
    } else {
        output::write_csv(&mut out, &execution.cycles, &results).context("writing CSV results")?;
    }
    out.flush()?;
    Ok(())
}
