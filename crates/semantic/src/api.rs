use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::retry::{execute_with_retry_async, RetryConfig};
use crate::{EmbeddingProvider, SemanticConfig, SemanticError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApiProviderKind {
    HuggingFace,
    OpenAI,
    Custom,
}

impl ApiProviderKind {
    pub(crate) fn from_config(cfg: &SemanticConfig) -> Self {
        match cfg.api_provider.to_ascii_lowercase().as_str() {
            "hf" | "huggingface" => ApiProviderKind::HuggingFace,
            "openai" | "gpt" => ApiProviderKind::OpenAI,
            _ => ApiProviderKind::Custom,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ApiProviderKind::HuggingFace => "hf",
            ApiProviderKind::OpenAI => "openai",
            ApiProviderKind::Custom => "custom",
        }
    }
}

/// Remote embedding endpoint reached over HTTP.
///
/// The client is built once with the configured timeout and reused for
/// every call.
#[derive(Debug, Clone)]
pub struct ApiEmbedder {
    client: reqwest::Client,
    url: String,
    provider: ApiProviderKind,
    model_name: String,
    auth_header: Option<String>,
    retry: Option<RetryConfig>,
}

impl ApiEmbedder {
    pub fn new(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        let url = cfg
            .api_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| SemanticError::InvalidConfig("api_url is required for api mode".into()))?;
        reqwest::Url::parse(url)
            .map_err(|e| SemanticError::InvalidConfig(format!("invalid api_url `{url}`: {e}")))?;
        if cfg.timeout_secs == 0 {
            return Err(SemanticError::InvalidConfig(
                "timeout_secs must be greater than zero".into(),
            ));
        }

        let timeout = Duration::from_secs(cfg.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| SemanticError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        let provider = ApiProviderKind::from_config(cfg);
        let auth_header = resolve_auth_header(cfg);
        debug!(
            provider = provider.label(),
            url,
            authenticated = auth_header.is_some(),
            "api embedder configured"
        );

        Ok(Self {
            client,
            url: url.to_string(),
            provider,
            model_name: cfg.model_name.clone(),
            auth_header,
            retry: cfg.retry_config,
        })
    }

    async fn send(&self, payload: &Value) -> Result<Value, SemanticError> {
        let mut request = self.client.post(&self.url).json(payload);
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header(reqwest::header::AUTHORIZATION, header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SemanticError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SemanticError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SemanticError::MalformedResponse(format!("invalid JSON body: {e}")))
    }
}

#[async_trait]
impl EmbeddingProvider for ApiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let payload = build_api_payload(self.provider, text, &self.model_name);

        let response = match &self.retry {
            Some(retry) => {
                let outcome = execute_with_retry_async(
                    retry,
                    |attempt| {
                        if attempt > 0 {
                            debug!(attempt, provider = self.provider.label(), "retrying embedding request");
                        }
                        self.send(&payload)
                    },
                    SemanticError::is_retryable,
                )
                .await;
                debug!(attempts = outcome.attempts, "embedding request settled");
                outcome.into_result()?
            }
            None => self.send(&payload).await?,
        };

        let vector = parse_single_embedding(response)?;
        debug!(
            provider = self.provider.label(),
            dims = vector.len(),
            "query embedded"
        );
        Ok(vector)
    }

    fn name(&self) -> &str {
        self.provider.label()
    }
}

/// Explicit header wins; otherwise read the key from the configured env var.
fn resolve_auth_header(cfg: &SemanticConfig) -> Option<String> {
    if let Some(header) = cfg.api_auth_header.as_deref().filter(|h| !h.is_empty()) {
        return Some(header.to_string());
    }
    cfg.api_key_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
        .filter(|key| !key.trim().is_empty())
        .map(|key| format!("Bearer {}", key.trim()))
}

pub(crate) fn build_api_payload(provider: ApiProviderKind, text: &str, model: &str) -> Value {
    match provider {
        ApiProviderKind::HuggingFace => json!({ "inputs": text }),
        ApiProviderKind::OpenAI => json!({ "input": text, "model": model }),
        ApiProviderKind::Custom => json!({ "text": text }),
    }
}

/// Pull the one query vector out of a provider response.
pub(crate) fn parse_single_embedding(value: Value) -> Result<Vec<f32>, SemanticError> {
    let vector = parse_embeddings_from_value(value)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            SemanticError::MalformedResponse("response did not contain embeddings".into())
        })?;
    if vector.is_empty() {
        return Err(SemanticError::EmptyVector);
    }
    Ok(vector)
}

fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }

            if let Some(Value::Array(items)) = map.remove("data") {
                return items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(mut obj) => obj
                            .remove("embedding")
                            .ok_or_else(|| {
                                SemanticError::MalformedResponse(
                                    "missing `embedding` field in data item".into(),
                                )
                            })
                            .and_then(parse_embedding_vector),
                        _ => Err(SemanticError::MalformedResponse(
                            "unexpected entry inside `data` array".into(),
                        )),
                    })
                    .collect();
            }

            Err(SemanticError::MalformedResponse(
                "unsupported API response shape".into(),
            ))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                Ok(Vec::new())
            } else if items.iter().all(|item| matches!(item, Value::Array(_))) {
                items.into_iter().map(parse_embedding_vector).collect()
            } else {
                parse_embedding_vector(Value::Array(items)).map(|vec| vec![vec])
            }
        }
        other => parse_embedding_vector(other).map(|vec| vec![vec]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, SemanticError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .filter(|f| f.is_finite())
                    .ok_or_else(|| {
                        SemanticError::MalformedResponse(format!(
                            "non-finite embedding value {num}"
                        ))
                    }),
                other => Err(SemanticError::MalformedResponse(format!(
                    "embedding entries must be numbers, got {other}"
                ))),
            })
            .collect(),
        other => Err(SemanticError::MalformedResponse(format!(
            "embedding vector must be an array, got {other}"
        ))),
    }
}
