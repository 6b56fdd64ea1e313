pub mod client;
pub mod config;
pub mod error;
pub mod formulae;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod practice;
pub mod prompt;
pub mod redis;
pub mod repository;
pub mod service;
pub mod session;
pub mod solver;
pub mod transport;

pub use crate::error::{Result, TutorError};
pub use crate::models::{AnswerRecord, InputType, QuestionRequest, Subject};
pub use crate::session::TutorSession;
pub use crate::solver::{AnswerSource, MathSolver, SolverConfig};
