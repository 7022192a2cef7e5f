//! Solve request handling
//!
//! Turns a JSON body into either `{"solution": ...}` (200) or
//! `{"error": ...}` (400). Every failure, whether the body, the facelet
//! string or the solver is at fault, takes the same 400 shape; callers tell
//! them apart by message only.

use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::cube::{CubeState, FaceletError, MoveSequence};
use crate::http;
use crate::logger;
use crate::solver::{CubeSolver, SolverError};

/// Name of the request field holding the facelet string
pub const CUBE_STATE_FIELD: &str = "cubeState";

/// Everything that can go wrong between receiving a body and having a solution
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("Request body is not valid JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error(transparent)]
    Facelets(#[from] FaceletError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

#[derive(Debug, Serialize)]
struct SolutionBody {
    solution: String,
}

/// Handle one `POST /solve` body and build the response
pub async fn handle_solve(body: &[u8], solver: Arc<dyn CubeSolver>) -> Response<Full<Bytes>> {
    match solve(body, solver).await {
        Ok(moves) => http::json_response(
            StatusCode::OK,
            &SolutionBody {
                solution: moves.to_string(),
            },
        ),
        Err(e) => {
            let message = e.to_string();
            logger::log_solve_failure(&message);
            http::build_error_response(StatusCode::BAD_REQUEST, &message)
        }
    }
}

/// Validate the body's facelet string and ask the solver for a solution
///
/// Validation short-circuits in a fixed order: JSON, length, composition.
/// The solver only ever sees strings that passed all three.
pub async fn solve(body: &[u8], solver: Arc<dyn CubeSolver>) -> Result<MoveSequence, SolveError> {
    let raw = cube_state_field(body)?;
    let state = CubeState::parse(&raw)?;
    let already_solved = state.is_solved();

    let moves = run_solver(solver, state).await?;
    if moves.is_empty() && !already_solved {
        logger::log_warning("Solver returned an empty solution for an unsolved cube");
    }
    logger::log_solve_success(moves.len(), already_solved);
    Ok(moves)
}

/// Pull `cubeState` out of the body
///
/// A missing field, a non-string field, or a non-object body all yield the
/// empty string, which then fails the length check.
fn cube_state_field(body: &[u8]) -> Result<String, SolveError> {
    let value: Value = serde_json::from_slice(body)?;
    Ok(value
        .get(CUBE_STATE_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string())
}

/// Run the blocking solver on tokio's blocking pool
async fn run_solver(
    solver: Arc<dyn CubeSolver>,
    state: CubeState,
) -> Result<MoveSequence, SolverError> {
    tokio::task::spawn_blocking(move || solver.solve(&state))
        .await
        .map_err(|e| SolverError::Internal(e.to_string()))?
}
