//! # Pacer CLI
//!
//! Shared plumbing for the `pacer-sim` and `scenario-gen` binaries. Each
//! command exposes its clap definition, an argument struct parsed from the
//! matches, and a `run` function writing to any [`std::io::Write`].

pub mod commands;
pub mod controller_config;
pub mod output;

/// Initialize `env_logger`, honoring `RUST_LOG` and defaulting to warnings
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}
