//! Error types.
//!
//! Construction and parsing errors (`Malformed*`), shape errors, and
//! measure preconditions (`ImproperInput`) are raised where the data is
//! consumed. Synthesis distinguishes a solver that ran out of time
//! (`SolverTimeout`) or was cancelled from a problem with no feasible
//! point (`Infeasible`).
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by this crate.
#[derive(Debug, Error)]
pub enum QifError {
    #[error("malformed distribution: {0}")]
    MalformedDistribution(String),

    #[error("malformed channel: {0}")]
    MalformedChannel(String),

    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("improper input: {0}")]
    ImproperInput(String),

    #[error("no feasible mechanism for the given constraints")]
    Infeasible,

    #[error("LP solve exceeded its time budget of {0:?}")]
    SolverTimeout(Duration),

    #[error("LP solve was cancelled")]
    Cancelled,

    #[error("LP solver failed: {0}")]
    Solver(String),

    #[error("numeric domain error: {0}")]
    NumericDomain(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, QifError>;

/// Fails with `InvalidShape` unless `expected == actual`.
pub(crate) fn check_shape(what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(QifError::InvalidShape(format!("{}: expected {}, got {}",
                                           what, expected, actual)))
    }
}
