use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::GroqConfig;
use crate::error::{Result, TutorError};
use crate::models::{GroqRequest, GroqResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    /// One chat-completion call. Implementations must not retry.
    async fn chat(&self, api_key: &str, req: &GroqRequest) -> Result<GroqResponse>;
}

pub struct GroqTransport {
    client: Client,
    api_url: String,
}

impl GroqTransport {
    pub fn new(api_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TutorError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    pub fn from_config(cfg: &GroqConfig) -> Result<Self> {
        Self::new(
            cfg.api_url.clone(),
            cfg.timeout_seconds.map(Duration::from_secs),
        )
    }
}

#[async_trait]
impl Transport for GroqTransport {
    async fn chat(&self, api_key: &str, req: &GroqRequest) -> Result<GroqResponse> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(req)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Groq API: {e}");
                TutorError::upstream(None, e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(%status, "Groq API error: {}", body);
            return Err(TutorError::upstream(Some(status.as_u16()), body));
        }

        response.json::<GroqResponse>().await.map_err(|e| {
            TutorError::upstream(
                Some(status.as_u16()),
                format!("Failed to parse Groq API response: {e}"),
            )
        })
    }
}
