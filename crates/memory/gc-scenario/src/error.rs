//! Error types for scenario handling

use std::io;
use std::path::PathBuf;

use gc_pacer::PacerError;

/// Scenario operation result type
pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// Errors raised while generating, loading or saving scenarios
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// No generator is registered under the requested name
    #[error("generator {name:?} not found (available: {available})")]
    UnknownGenerator {
        /// Requested name
        name: String,
        /// Comma-separated list of known generators
        available: String,
    },

    /// A scenario file could not be opened or written
    #[error("failed to access scenario file {}: {source}", path.display())]
    File {
        /// File that was being accessed
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// Writing to an output stream failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Scenario JSON is malformed or does not match the schema
    #[error("malformed scenario: {0}")]
    Json(#[from] serde_json::Error),

    /// The scenario parses but its contents are rejected by the pacer model
    #[error(transparent)]
    Pacer(#[from] PacerError),
}

impl ScenarioError {
    /// Create an unknown generator error
    pub fn unknown_generator(name: impl Into<String>, available: &[&str]) -> Self {
        Self::UnknownGenerator {
            name: name.into(),
            available: available.join(", "),
        }
    }

    /// Create a file access error
    pub fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}
