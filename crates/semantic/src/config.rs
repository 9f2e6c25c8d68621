use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;

/// Which embedding provider to build and how to reach it.
///
/// # Example
/// ```no_run
/// use semantic::{build_provider, SemanticConfig};
///
/// let cfg = SemanticConfig {
///     api_provider: "hf".into(),
///     api_url: Some("https://router.huggingface.co/hf-inference/models/BAAI/bge-small-en-v1.5/pipeline/feature-extraction".into()),
///     api_key_env: Some("HF_TOKEN".into()),
///     dimensions: 384,
///     ..Default::default()
/// };
///
/// let provider = build_provider(&cfg).expect("valid config");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    /// `"api"` (remote HTTP) or `"stub"` (deterministic, offline).
    pub mode: String,
    /// Request/response dialect: `"openai"`, `"hf"` or `"custom"`.
    pub api_provider: String,
    /// Embedding endpoint when [`mode`](Self::mode) is `"api"`.
    pub api_url: Option<String>,
    /// Environment variable holding the API key, sent as `Bearer <key>`.
    pub api_key_env: Option<String>,
    /// Full `Authorization` header value. Takes precedence over
    /// [`api_key_env`](Self::api_key_env).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_auth_header: Option<String>,
    /// Model identifier forwarded to providers that need one.
    pub model_name: String,
    /// Width of the vectors this provider produces. Must match the corpus.
    pub dimensions: usize,
    /// Overall request timeout in seconds.
    pub timeout_secs: u64,
    /// Retry policy for API calls. `None` means a single attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_config: Option<RetryConfig>,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            mode: "api".into(),
            api_provider: "openai".into(),
            api_url: Some("https://api.openai.com/v1/embeddings".into()),
            api_key_env: Some("OPENAI_API_KEY".into()),
            api_auth_header: None,
            model_name: "text-embedding-3-small".into(),
            dimensions: 1536,
            timeout_secs: 30,
            retry_config: None,
        }
    }
}
