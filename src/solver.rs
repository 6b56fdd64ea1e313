use async_trait::async_trait;
use std::sync::Arc;

use crate::config::GroqConfig;
use crate::error::{Result, TutorError};
use crate::models::{ChatMessage, GroqRequest, QuestionRequest};
use crate::prompt::build_prompt;
use crate::transport::Transport;

/// Everything the proxy needs to talk upstream, passed in at construction.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub complex_temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "llama3-70b-8192".to_string(),
            temperature: 0.3,
            complex_temperature: 0.4,
            top_p: 0.9,
            max_tokens: 4096,
        }
    }
}

impl From<&GroqConfig> for SolverConfig {
    fn from(cfg: &GroqConfig) -> Self {
        Self {
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            complex_temperature: cfg.complex_temperature,
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
        }
    }
}

/// Anything that turns a question into answer text.
#[async_trait]
pub trait AnswerSource: Send + Sync {
    async fn generate(&self, req: &QuestionRequest) -> Result<String>;
}

/// Stateless question-answering proxy. Each call is independent.
pub struct MathSolver {
    tx: Arc<dyn Transport>,
    config: SolverConfig,
}

impl MathSolver {
    pub fn new(tx: Arc<dyn Transport>, config: SolverConfig) -> Self {
        Self { tx, config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn request_for(&self, req: &QuestionRequest) -> GroqRequest {
        let prompt = build_prompt(req);
        GroqRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::system(prompt.system), ChatMessage::user(prompt.user)],
            temperature: if req.is_complex {
                self.config.complex_temperature
            } else {
                self.config.temperature
            },
            top_p: self.config.top_p,
            max_tokens: self.config.max_tokens,
        }
    }

    pub async fn solve(&self, req: &QuestionRequest) -> Result<String> {
        if req.question.trim().is_empty() {
            return Err(TutorError::validation("Question is required"));
        }

        let api_key = match self.config.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key,
            _ => {
                tracing::error!("GROQ_API_KEY is not set");
                return Err(TutorError::Configuration(
                    "GROQ_API_KEY is not set".to_string(),
                ));
            }
        };

        let request = self.request_for(req);

        tracing::info!(
            subject = %req.subject,
            input_type = %req.input_type,
            is_complex = req.is_complex,
            "Sending request to Groq API"
        );
        tracing::debug!("Question: {}", req.question);

        let response = self.tx.chat(api_key, &request).await?;

        match response.first_content() {
            Some(answer) => {
                tracing::info!("Received answer from Groq API");
                Ok(answer.to_string())
            }
            None => {
                tracing::warn!("Groq API returned no usable content");
                Err(TutorError::EmptyResponse)
            }
        }
    }
}

#[async_trait]
impl AnswerSource for MathSolver {
    async fn generate(&self, req: &QuestionRequest) -> Result<String> {
        self.solve(req).await
    }
}
