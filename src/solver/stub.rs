// In-process solver used by handler and router tests

use std::sync::Mutex;

use super::{CubeSolver, SolverError};
use crate::cube::{CubeState, MoveSequence};

/// Canned reply plus a record of every facelet string it was asked about
pub struct StubSolver {
    reply: Result<&'static str, &'static str>,
    calls: Mutex<Vec<String>>,
}

impl StubSolver {
    /// Answer every state with this move text (parsed like real solver output)
    pub fn solving(moves: &'static str) -> Self {
        Self {
            reply: Ok(moves),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Refuse every state with this message
    pub fn rejecting(message: &'static str) -> Self {
        Self {
            reply: Err(message),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CubeSolver for StubSolver {
    fn solve(&self, state: &CubeState) -> Result<MoveSequence, SolverError> {
        self.calls.lock().unwrap().push(state.as_str().to_string());
        match self.reply {
            Ok(moves) => Ok(moves.parse()?),
            Err(message) => Err(SolverError::Rejected(message.to_string())),
        }
    }
}
