// Application state module
// Shared, read-only state handed to every connection

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use super::types::Config;
use crate::solver::{CubeSolver, ProcessSolver};

/// Application state
pub struct AppState {
    pub config: Config,
    pub solver: Arc<dyn CubeSolver>,
    pub active_connections: AtomicUsize,
}

impl AppState {
    /// Build state with the external solver described by the configuration
    pub fn new(config: &Config) -> Self {
        let solver = Arc::new(ProcessSolver::from_config(&config.solver));
        Self::with_solver(config, solver)
    }

    /// Build state around any solver implementation
    pub fn with_solver(config: &Config, solver: Arc<dyn CubeSolver>) -> Self {
        Self {
            config: config.clone(),
            solver,
            active_connections: AtomicUsize::new(0),
        }
    }
}
