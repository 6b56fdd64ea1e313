//! Turns proxy results into values the UI can render without further checks.

use chrono::Utc;
use std::fmt::Display;

use crate::models::{AnswerRecord, InputType};

pub const DEFAULT_MISTAKE_MESSAGE: &str = "You may have made an error in solving for x. Check your calculations when isolating the variable.";

/// Derived correctness flags attached to an answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assessment {
    pub is_correct: Option<bool>,
    pub mistake: Option<String>,
}

/// Decides whether an answer suggests the student got it right.
pub trait CorrectnessHeuristic: Send + Sync {
    fn assess(&self, question: &str, answer: &str) -> Assessment;
}

/// Keyword guess, not a math verifier.
///
/// A question containing `=` is treated as an equation; the answer counts as
/// flagging a mistake when it mentions "mistake" or "error" anywhere,
/// including phrases like "no errors". Questions without `=` get no verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordHeuristic;

impl CorrectnessHeuristic for KeywordHeuristic {
    fn assess(&self, question: &str, answer: &str) -> Assessment {
        if !question.contains('=') {
            return Assessment::default();
        }

        let lowered = answer.to_lowercase();
        if lowered.contains("mistake") || lowered.contains("error") {
            Assessment {
                is_correct: Some(false),
                mistake: Some(DEFAULT_MISTAKE_MESSAGE.to_string()),
            }
        } else {
            Assessment {
                is_correct: Some(true),
                mistake: None,
            }
        }
    }
}

/// User-facing text for any failure. Error kinds are not distinguished.
pub fn error_message(err: impl Display) -> String {
    format!("Error: {err}. Please try again later.")
}

/// Collapse a proxy outcome into display text.
pub fn answer_text<E: Display>(result: Result<String, E>) -> String {
    match result {
        Ok(answer) => answer,
        Err(e) => {
            tracing::error!("Error generating answer: {}", e);
            error_message(e)
        }
    }
}

pub struct AnswerNormalizer {
    heuristic: Box<dyn CorrectnessHeuristic>,
}

impl Default for AnswerNormalizer {
    fn default() -> Self {
        Self::new(Box::new(KeywordHeuristic))
    }
}

impl AnswerNormalizer {
    pub fn new(heuristic: Box<dyn CorrectnessHeuristic>) -> Self {
        Self { heuristic }
    }

    pub fn assess(&self, question: &str, answer: &str) -> Assessment {
        self.heuristic.assess(question, answer)
    }

    pub fn record(
        &self,
        question: impl Into<String>,
        answer: impl Into<String>,
        subject: impl Into<String>,
        input_type: InputType,
    ) -> AnswerRecord {
        let question = question.into();
        let answer = answer.into();
        let Assessment {
            is_correct,
            mistake,
        } = self.assess(&question, &answer);

        AnswerRecord {
            question,
            answer,
            subject: subject.into(),
            input_type,
            timestamp: Utc::now(),
            is_correct,
            mistake,
        }
    }
}
