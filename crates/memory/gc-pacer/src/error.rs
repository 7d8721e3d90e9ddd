//! Error types for the pacer model

/// Pacer operation result type
pub type PacerResult<T> = Result<T, PacerError>;

/// Errors reported while configuring a pacer run
///
/// Stepping a pacer never fails; these only come out of construction and
/// the optional validation helpers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PacerError {
    /// No pacer is registered under the requested name
    #[error("unknown pacer type {name:?} (available: {available})")]
    UnknownPacer {
        /// Requested name
        name: String,
        /// Comma-separated list of known names
        available: String,
    },

    /// Run or controller configuration violates its constraints
    #[error("invalid pacer configuration: {0}")]
    InvalidConfig(String),

    /// A workload record violates its constraints
    #[error("invalid workload cycle {index}: {reason}")]
    InvalidCycle {
        /// Position of the record within its sequence
        index: usize,
        /// What is wrong with it
        reason: String,
    },
}

impl PacerError {
    /// Create an unknown pacer error
    pub fn unknown_pacer(name: impl Into<String>, available: &[&str]) -> Self {
        Self::UnknownPacer {
            name: name.into(),
            available: available.join(", "),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid cycle error
    pub fn invalid_cycle(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidCycle {
            index,
            reason: reason.into(),
        }
    }
}
