//! # scenario-gen
//!
//! Write the built-in scenarios to `<name>.json` files.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use gc_scenario::{generate, generators};
use regex::Regex;

/// Parsed `scenario-gen` arguments
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    /// Print the available generators and exit
    pub list: bool,
    /// Directory receiving the scenario files
    pub output_dir: PathBuf,
    /// Only generators whose name matches
    pub filter: Option<Regex>,
    /// Seed for noisy signals
    pub seed: u64,
}

/// clap definition of `scenario-gen`
pub fn command() -> Command {
    Command::new("scenario-gen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate GC pacer scenario files")
        .arg(
            Arg::new("list")
                .short('l')
                .help("List available scenarios")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .value_name("DIR")
                .help("Where to output scenarios")
                .default_value("."),
        )
        .arg(
            Arg::new("filter")
                .long("filter")
                .value_name("REGEX")
                .help("Filter scenarios by name"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("N")
                .help("Seed for random signals")
                .value_parser(clap::value_parser!(u64))
                .default_value("0"),
        )
}

impl GenerateArgs {
    /// Extract arguments from parsed matches
    ///
    /// # Errors
    ///
    /// Fails when the filter is not a valid regular expression.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let filter = matches
            .get_one::<String>("filter")
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| Regex::new(pattern))
            .transpose()
            .context("compiling filter regexp")?;

        Ok(Self {
            list: matches.get_flag("list"),
            output_dir: matches
                .get_one::<String>("output")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            filter,
            seed: matches.get_one::<u64>("seed").copied().unwrap_or(0),
        })
    }
}

/// Execute `scenario-gen`
///
/// Returns the paths written; listing writes nothing.
pub fn run<W: Write>(args: &GenerateArgs, mut out: W) -> Result<Vec<PathBuf>> {
    let names = generators();
    if args.list {
        for name in names {
            writeln!(out, "{name}")?;
        }
        return Ok(Vec::new());
    }

    let mut written = Vec::new();
    for name in names {
        if let Some(filter) = &args.filter
            && !filter.is_match(name)
        {
            continue;
        }
        let execution = generate(name, args.seed)?;
        let path = args.output_dir.join(format!("{name}.json"));
        execution
            .save(&path)
            .with_context(|| format!("writing scenario to {}", path.display()))?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<GenerateArgs> {
        GenerateArgs::from_matches(&command().try_get_matches_from(argv)?)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["scenario-gen"]).unwrap();
        assert!(!args.list);
        assert_eq!(args.output_dir, PathBuf::from("."));
        assert!(args.filter.is_none());
        assert_eq!(args.seed, 0);
    }

    #[test]
    fn test_bad_filter() {
        let err = parse(&["scenario-gen", "--filter", "(unclosed"]).unwrap_err();
        assert!(err.to_string().contains("filter"));
    }

    #[test]
    fn test_list() {
        let mut out = Vec::new();
        let written = run(&parse(&["scenario-gen", "-l"]).unwrap(), &mut out).unwrap();
        assert!(written.is_empty());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), generators().len());
        assert!(text.lines().any(|line| line == "steady"));
    }
}
