use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Result, TutorError};
use crate::models::{QuestionRequest, SolveRequest, SolveResponse};
use crate::solver::AnswerSource;

/// Calls a running proxy over HTTP using the JSON wire contract.
pub struct HttpTutorClient {
    client: Client,
    solve_url: String,
    bearer_token: Option<String>,
}

impl HttpTutorClient {
    pub fn new(solve_url: impl Into<String>, bearer_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            solve_url: solve_url.into(),
            bearer_token,
        }
    }
}

/// Interpret a proxy reply. `status_ok` is whether the HTTP status was 2xx.
pub(crate) fn read_reply(status_ok: bool, body: &str) -> Result<String> {
    let reply = serde_json::from_str::<SolveResponse>(body).ok();

    if let Some(error) = reply.as_ref().and_then(|r| r.error.clone()) {
        tracing::error!("Error from solver: {}", error);
        return Err(TutorError::Proxy(error));
    }

    if !status_ok {
        let message = if body.trim().is_empty() {
            "proxy returned an error status".to_string()
        } else {
            body.to_string()
        };
        tracing::error!("Error calling solver: {}", message);
        return Err(TutorError::Proxy(message));
    }

    reply
        .and_then(|r| r.answer)
        .filter(|a| !a.is_empty())
        .ok_or(TutorError::NoAnswer)
}

#[async_trait]
impl AnswerSource for HttpTutorClient {
    async fn generate(&self, req: &QuestionRequest) -> Result<String> {
        let body = SolveRequest::from(req);

        let mut request = self.client.post(&self.solve_url).json(&body);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Error calling solver: {}", e);
            TutorError::Proxy(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TutorError::Proxy(e.to_string()))?;

        read_reply(status.is_success(), &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_is_returned() {
        assert_eq!(
            read_reply(true, r#"{"answer":"x = 2"}"#).expect("answer present"),
            "x = 2"
        );
    }

    #[test]
    fn test_error_body_wins_over_status() {
        let err = read_reply(false, r#"{"error":"Question is required"}"#).expect_err("must fail");
        assert_eq!(
            err.to_string(),
            "Failed to generate answer: Question is required"
        );

        // an error field on a 2xx reply is still an error
        let err = read_reply(true, r#"{"error":"late failure"}"#).expect_err("must fail");
        assert!(matches!(err, TutorError::Proxy(_)));
    }

    #[test]
    fn test_missing_answer_is_error() {
        for body in ["{}", r#"{"answer":""}"#, "not json"] {
            let err = read_reply(true, body).expect_err("must fail");
            assert_eq!(err.to_string(), "No answer received from the server");
        }
    }

    #[test]
    fn test_non_json_error_status() {
        let err = read_reply(false, "Bad Gateway").expect_err("must fail");
        assert_eq!(err.to_string(), "Failed to generate answer: Bad Gateway");
    }
}
