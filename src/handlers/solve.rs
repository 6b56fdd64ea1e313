use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use super::AppState;
use crate::error::{Result, TutorError};
use crate::models::{QuestionRequest, SolveRequest, SolveResponse};

/// `POST /solve`: one question in, `{answer}` or `{error}` out.
pub async fn solve(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SolveRequest>, JsonRejection>,
) -> Result<Json<SolveResponse>> {
    let Json(body) = payload.map_err(|e| TutorError::validation(e.body_text()))?;
    let req = QuestionRequest::from(body);

    let answer = state.solver.solve(&req).await?;
    Ok(Json(SolveResponse::success(answer)))
}
