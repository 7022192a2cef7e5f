//! Solver capability
//!
//! The two-phase search lives outside this service. `CubeSolver` is the seam
//! the request handler calls through; `ProcessSolver` is the production
//! implementation that runs an external solver program.

mod process;
#[cfg(test)]
pub(crate) mod stub;

use thiserror::Error;

use crate::cube::{CubeState, MoveParseError, MoveSequence};

pub use process::ProcessSolver;

/// Anything that can turn a validated facelet string into a move sequence
///
/// Implementations are synchronous and may block for the whole search; the
/// caller is responsible for running them off the async reactor.
pub trait CubeSolver: Send + Sync {
    fn solve(&self, state: &CubeState) -> Result<MoveSequence, SolverError>;
}

/// Failures reported by, or while talking to, the solver
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Failed to launch solver '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Solver I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Solver exited with {status}: {message}")]
    Exited { status: String, message: String },

    /// The solver refused the state, typically because it is not reachable
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    InvalidOutput(#[from] MoveParseError),

    #[error("Solver did not finish within {0} ms")]
    Timeout(u128),

    #[error("Solver task failed: {0}")]
    Internal(String),
}
