use crate::error::Result;
use crate::models::{InputType, QuestionRequest};
use crate::solver::AnswerSource;

/// Subject tag used for generated practice questions; not a recognized
/// subject, so the generic prefix applies.
pub const PRACTICE_SUBJECT: &str = "mathematics";

pub fn practice_prompt(topic: Option<&str>) -> String {
    let about = topic
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("about {t} "))
        .unwrap_or_default();
    format!(
        "Generate a challenging mathematics question {about}suitable for practice. The question should be clear and concise."
    )
}

pub fn practice_request(topic: Option<&str>) -> QuestionRequest {
    QuestionRequest::new(practice_prompt(topic), PRACTICE_SUBJECT, InputType::Text)
}

/// Ask any answer source for a fresh practice question.
pub async fn generate_practice_question(
    source: &dyn AnswerSource,
    topic: Option<&str>,
) -> Result<String> {
    tracing::info!(topic = topic.unwrap_or("any"), "Generating practice question");
    source.generate(&practice_request(topic)).await
}
