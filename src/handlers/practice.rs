use axum::Json;
use axum::extract::State;

use super::AppState;
use crate::error::Result;
use crate::models::{PracticeRequest, SolveResponse};
use crate::practice::generate_practice_question;

/// `POST /practice`: generate a practice question, optionally on a topic.
pub async fn practice(
    State(state): State<AppState>,
    body: Option<Json<PracticeRequest>>,
) -> Result<Json<SolveResponse>> {
    let topic = body.and_then(|Json(b)| b.topic);
    let question = generate_practice_question(state.solver.as_ref(), topic.as_deref()).await?;
    Ok(Json(SolveResponse::success(question)))
}
