//! Caller-side answer generation on top of [`Retriever`].
//!
//! The retrieval core stops at context assembly. This module is the thin
//! layer the command-line front end uses: render a prompt around the
//! retrieved context, send it to a chat model and pair the reply with the
//! reference URLs.

mod openai;
mod prompt;

pub use openai::OpenAiChat;
pub use prompt::{PromptTemplate, build_prompt};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{RetrievalError, Retriever};

/// Chat model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Chat completions endpoint.
    pub api_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub model: String,
    /// Sampling temperature in `[0, 2]`.
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    #[serde(flatten)]
    pub template: PromptTemplate,
    /// Text returned in place of a failed generation. `None` propagates the
    /// failure instead.
    pub fallback_answer: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            model: "gpt-3.5-turbo".into(),
            temperature: 0.5,
            max_tokens: None,
            timeout_secs: 60,
            template: PromptTemplate::default(),
            fallback_answer: Some("Could not generate an answer.".into()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    #[error("invalid generation config: {0}")]
    InvalidConfig(String),
    #[error("environment variable {0} is not set")]
    MissingApiKey(String),
    #[error("generation request failed: {0}")]
    Request(String),
    #[error("generation provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
    #[error("generation provider returned no answer text")]
    EmptyAnswer,
}

/// Messages handed to a [`GenerationProvider`].
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub system_prompt: &'a str,
    pub prompt: &'a str,
}

/// A text-generation backend.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, GenerationError>;

    fn name(&self) -> &str;
}

/// Final reply for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// URLs of the passages used as context, most similar first.
    pub references: Vec<String>,
    /// `false` when `text` is the configured fallback.
    pub generated: bool,
}

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Retrieve, prompt, generate.
pub struct Answerer {
    retriever: Arc<Retriever>,
    generator: Arc<dyn GenerationProvider>,
    template: PromptTemplate,
    fallback_answer: Option<String>,
}

impl Answerer {
    pub fn new(retriever: Arc<Retriever>, generator: Arc<dyn GenerationProvider>) -> Self {
        Self {
            retriever,
            generator,
            template: PromptTemplate::default(),
            fallback_answer: None,
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_fallback_answer(mut self, fallback: Option<String>) -> Self {
        self.fallback_answer = fallback;
        self
    }

    pub fn retriever(&self) -> &Arc<Retriever> {
        &self.retriever
    }

    /// Answer with the retriever's default `top_n`.
    pub async fn answer(&self, query: &str) -> Result<Answer, AnswerError> {
        self.answer_with_top_n(query, self.retriever.default_top_n())
            .await
    }

    /// Retrieval failures always propagate. Generation failures are replaced
    /// by the fallback answer when one is configured.
    pub async fn answer_with_top_n(&self, query: &str, top_n: usize) -> Result<Answer, AnswerError> {
        let retrieved = self.retriever.retrieve(query, top_n).await?;
        let prompt = build_prompt(query, &retrieved.context, &self.template);
        let request = GenerationRequest {
            system_prompt: &self.template.system_prompt,
            prompt: &prompt,
        };

        let (text, generated) = match self.generator.generate(&request).await {
            Ok(text) => (text, true),
            Err(err) => match &self.fallback_answer {
                Some(fallback) => {
                    warn!(
                        generator = self.generator.name(),
                        error = %err,
                        "generation failed, using fallback answer"
                    );
                    (fallback.clone(), false)
                }
                None => return Err(err.into()),
            },
        };

        Ok(Answer {
            text,
            references: retrieved.references,
            generated,
        })
    }
}
