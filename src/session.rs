use std::sync::Arc;

use crate::error::{Result, TutorError};
use crate::models::{AnswerRecord, HistoryEntry, InputType, QuestionRequest, Subject};
use crate::normalize::{AnswerNormalizer, error_message};
use crate::repository::HistoryRepository;
use crate::solver::AnswerSource;

/// Largest decoded image accepted from a data URI.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Check an image data URI before it is sent anywhere.
pub fn validate_image_payload(data: &str) -> Result<()> {
    let Some(rest) = data.trim().strip_prefix("data:image/") else {
        return Err(TutorError::validation("Please upload an image file"));
    };
    let Some((_, encoded)) = rest.split_once(";base64,") else {
        return Err(TutorError::validation("Error reading image file"));
    };

    let padding = encoded.bytes().rev().take_while(|b| *b == b'=').count();
    let decoded = (encoded.len() / 4) * 3 + (encoded.len() % 4) * 3 / 4;
    if decoded.saturating_sub(padding) > MAX_IMAGE_BYTES {
        return Err(TutorError::validation(
            "File too large. Please upload an image less than 5MB.",
        ));
    }
    Ok(())
}

/// One user's question flow: ask the proxy, normalize, record history.
pub struct TutorSession {
    source: Arc<dyn AnswerSource>,
    normalizer: AnswerNormalizer,
    history: Option<Arc<dyn HistoryRepository>>,
    user_id: Option<String>,
}

impl TutorSession {
    pub fn new(source: Arc<dyn AnswerSource>) -> Self {
        Self {
            source,
            normalizer: AnswerNormalizer::default(),
            history: None,
            user_id: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: AnswerNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// History is only written when both a store and a signed-in user are set.
    pub fn with_history(mut self, history: Arc<dyn HistoryRepository>, user_id: Option<String>) -> Self {
        self.history = Some(history);
        self.user_id = user_id;
        self
    }

    /// Image input takes two passes: the first asks the model to read the
    /// problem off the image, the second answers the extracted text.
    async fn resolve_answer(&self, req: &QuestionRequest) -> Result<(String, String)> {
        if req.input_type != InputType::Image {
            let answer = self.source.generate(req).await?;
            return Ok((req.question.clone(), answer));
        }

        validate_image_payload(&req.question)?;
        tracing::info!("Processing math problem from image");
        let described = self
            .source
            .generate(&QuestionRequest {
                is_complex: true,
                ..req.clone()
            })
            .await?;

        let answer = self
            .source
            .generate(&QuestionRequest {
                question: described.clone(),
                ..req.clone()
            })
            .await?;
        Ok((described, answer))
    }

    /// Never fails: errors come back as a display string in `answer`.
    pub async fn ask(&self, req: QuestionRequest) -> AnswerRecord {
        let subject = Subject::from_tag(&req.subject).title();

        match self.resolve_answer(&req).await {
            Ok((question, answer)) => {
                let record = self.normalizer.record(question, answer, subject, req.input_type);
                self.save_history(&record).await;
                record
            }
            Err(e) => {
                tracing::error!("Error submitting question: {}", e);
                AnswerRecord {
                    question: req.question,
                    answer: error_message(e),
                    subject: subject.to_string(),
                    input_type: req.input_type,
                    timestamp: chrono::Utc::now(),
                    is_correct: None,
                    mistake: None,
                }
            }
        }
    }

    async fn save_history(&self, record: &AnswerRecord) {
        let (Some(history), Some(user_id)) = (&self.history, &self.user_id) else {
            tracing::debug!("No user logged in, not saving history");
            return;
        };

        let entry = HistoryEntry::from(record);
        if let Err(e) = history.append(user_id, &entry).await {
            tracing::warn!("Error saving math history: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockHistoryRepository;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockSource {
        answers: Mutex<Vec<Result<String>>>,
        seen: Mutex<Vec<QuestionRequest>>,
    }

    impl MockSource {
        /// Answers are handed out in order.
        fn new(mut answers: Vec<Result<String>>) -> Arc<Self> {
            answers.reverse();
            Arc::new(Self {
                answers: Mutex::new(answers),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<QuestionRequest> {
            self.seen.lock().expect("mock mutex").clone()
        }
    }

    #[async_trait]
    impl AnswerSource for MockSource {
        async fn generate(&self, req: &QuestionRequest) -> Result<String> {
            self.seen.lock().expect("mock mutex").push(req.clone());
            self.answers
                .lock()
                .expect("mock mutex")
                .pop()
                .unwrap_or_else(|| Err(TutorError::Internal("No more mock answers".to_string())))
        }
    }

    fn png_uri(payload_len: usize) -> String {
        format!("data:image/png;base64,{}", "A".repeat(payload_len))
    }

    #[tokio::test]
    async fn test_text_question_is_normalized() {
        let source = MockSource::new(vec![Ok("x = 2".to_string())]);
        let session = TutorSession::new(source.clone());

        let record = session
            .ask(QuestionRequest::new("2x + 3 = 7", "algebra", InputType::Text))
            .await;
        assert_eq!(record.answer, "x = 2");
        assert_eq!(record.subject, "Algebra");
        assert_eq!(record.is_correct, Some(true));
        assert_eq!(source.seen().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_becomes_display_string() {
        let source = MockSource::new(vec![Err(TutorError::Proxy("boom".to_string()))]);
        let session = TutorSession::new(source);

        let record = session
            .ask(QuestionRequest::new("2x + 3 = 7", "algebra", InputType::Text))
            .await;
        assert_eq!(
            record.answer,
            "Error: Failed to generate answer: boom. Please try again later."
        );
        assert_eq!(record.is_correct, None);
    }

    #[tokio::test]
    async fn test_image_takes_two_passes() {
        let source = MockSource::new(vec![
            Ok("Solve 3x = 9".to_string()),
            Ok("x = 3".to_string()),
        ]);
        let session = TutorSession::new(source.clone());

        let uri = png_uri(8);
        let record = session
            .ask(QuestionRequest::new(uri.clone(), "algebra", InputType::Image))
            .await;

        let seen = source.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].question, uri);
        assert!(seen[0].is_complex);
        assert_eq!(seen[1].question, "Solve 3x = 9");
        assert!(!seen[1].is_complex);
        assert_eq!(record.question, "Solve 3x = 9");
        assert_eq!(record.answer, "x = 3");
        assert_eq!(record.is_correct, Some(true));
    }

    #[tokio::test]
    async fn test_oversized_image_is_rejected_locally() {
        let source = MockSource::new(vec![Ok("unused".to_string())]);
        let session = TutorSession::new(source.clone());

        // 8 MiB of base64 decodes to 6 MiB
        let record = session
            .ask(QuestionRequest::new(png_uri(8 * 1024 * 1024), "geometry", InputType::Image))
            .await;
        assert!(record.answer.contains("File too large"));
        assert!(source.seen().is_empty());
    }

    #[test]
    fn test_image_payload_checks() {
        assert!(validate_image_payload(&png_uri(16)).is_ok());
        assert!(validate_image_payload("data:text/plain;base64,AAAA").is_err());
        assert!(validate_image_payload("data:image/png,rawbytes").is_err());
        assert!(validate_image_payload(&png_uri(4 * 1024 * 1024)).is_ok());
    }

    #[tokio::test]
    async fn test_history_saved_for_signed_in_user() {
        let mut repo = MockHistoryRepository::new();
        repo.expect_append()
            .withf(|user, entry| {
                user == "user-1" && entry.answer == "x = 2" && entry.is_correct == Some(true)
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let session = TutorSession::new(MockSource::new(vec![Ok("x = 2".to_string())]))
            .with_history(Arc::new(repo), Some("user-1".to_string()));
        session
            .ask(QuestionRequest::new("2x + 3 = 7", "algebra", InputType::Text))
            .await;
    }

    #[tokio::test]
    async fn test_history_skipped_without_user_or_on_failure() {
        let mut repo = MockHistoryRepository::new();
        repo.expect_append().times(0);
        let repo: Arc<dyn HistoryRepository> = Arc::new(repo);

        let anonymous = TutorSession::new(MockSource::new(vec![Ok("x = 2".to_string())]))
            .with_history(repo.clone(), None);
        anonymous
            .ask(QuestionRequest::new("2x + 3 = 7", "algebra", InputType::Text))
            .await;

        let failing = TutorSession::new(MockSource::new(vec![Err(TutorError::NoAnswer)]))
            .with_history(repo, Some("user-1".to_string()));
        failing
            .ask(QuestionRequest::new("2x + 3 = 7", "algebra", InputType::Text))
            .await;
    }

    #[tokio::test]
    async fn test_history_write_failure_is_swallowed() {
        let mut repo = MockHistoryRepository::new();
        repo.expect_append()
            .times(1)
            .returning(|_, _| Err(TutorError::Internal("redis down".to_string())));

        let session = TutorSession::new(MockSource::new(vec![Ok("A prime has two divisors.".to_string())]))
            .with_history(Arc::new(repo), Some("user-1".to_string()));
        let record = session
            .ask(QuestionRequest::new("What is a prime number?", "general", InputType::Text))
            .await;
        assert_eq!(record.answer, "A prime has two divisors.");
        assert_eq!(record.is_correct, None);
        assert_eq!(record.mistake, None);
    }
}
