use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::models::SolveResponse;

/// Message returned to callers when the upstream credential is missing.
/// The real cause is only ever logged.
pub const CONFIGURATION_ERROR_MESSAGE: &str = "API key configuration error";

#[derive(Error, Debug)]
pub enum TutorError {
    #[error("{0}")]
    Validation(String),

    #[error("API key configuration error")]
    Configuration(String),

    #[error("API request failed: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("No answer received from the model")]
    EmptyResponse,

    /// Proxy call failed as seen from the client side
    #[error("Failed to generate answer: {0}")]
    Proxy(String),

    #[error("No answer received from the server")]
    NoAnswer,

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    #[error("Pool creation error: {0}")]
    PoolCreation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, TutorError>;

impl TutorError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// HTTP status the proxy answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream {
                status: Some(code), ..
            } => StatusCode::from_u16(*code)
                .ok()
                .filter(|s| !s.is_success())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Self::Upstream { status: None, .. }
            | Self::EmptyResponse
            | Self::Proxy(_)
            | Self::NoAnswer => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TutorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(%status, "request failed: {}", self);
        } else {
            tracing::warn!(%status, "request rejected: {}", self);
        }
        (status, Json(SolveResponse::failure(self.to_string()))).into_response()
    }
}
