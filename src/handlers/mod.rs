/// HTTP handlers for the tutor proxy
pub mod catalog;
pub mod practice;
pub mod solve;

use crate::solver::MathSolver;
use std::sync::Arc;

/// Shared, immutable handler state
#[derive(Clone)]
pub struct AppState {
    pub solver: Arc<MathSolver>,
}

impl AppState {
    pub fn new(solver: Arc<MathSolver>) -> Self {
        Self { solver }
    }
}
