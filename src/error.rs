//! Crate error type.
//!
//! Infeasible and timed-out requests are ordinary results; these variants are
//! for everything that should reach the caller as a failure.

use thiserror::Error;

use crate::solver::SolverError;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("solver task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RosterResult<T> = Result<T, RosterError>;
