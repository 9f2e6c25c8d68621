//! # Query Embedding (`semantic`)
//!
//! Turns query text into a dense vector for the retrieval core. Two
//! providers ship with the crate:
//!
//! - [`ApiEmbedder`] calls a remote embedding endpoint (OpenAI, Hugging Face
//!   or a custom service) over HTTP.
//! - [`StubEmbedder`] hashes the text into a deterministic vector for offline
//!   runs and tests.
//!
//! Both sit behind the [`EmbeddingProvider`] trait so callers can inject
//! their own. A failed call always surfaces as a [`SemanticError`]; nothing
//! here substitutes a zero vector or silently switches provider.
//!
//! Retries are opt-in via [`SemanticConfig::retry_config`] and happen inside
//! [`ApiEmbedder`] only.
//!
//! ## Example
//!
//! ```no_run
//! use semantic::{build_provider, SemanticConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let cfg = SemanticConfig::default(); // OpenAI, key from OPENAI_API_KEY
//!     let provider = build_provider(&cfg).unwrap();
//!     let vector = provider.embed("Which shrine is known for autumn leaves?").await.unwrap();
//!     assert_eq!(vector.len(), cfg.dimensions);
//! }
//! ```

pub mod config;
pub mod error;
pub mod retry;
mod serde_millis;

mod api;
mod stub;

pub use crate::api::ApiEmbedder;
pub use crate::config::SemanticConfig;
pub use crate::error::SemanticError;
pub use crate::retry::RetryConfig;
pub use crate::stub::StubEmbedder;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

/// Something that can embed a query.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text` into a single vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// Build the provider selected by `cfg.mode`.
pub fn build_provider(cfg: &SemanticConfig) -> Result<Arc<dyn EmbeddingProvider>, SemanticError> {
    let provider: Arc<dyn EmbeddingProvider> = match cfg.mode.to_ascii_lowercase().as_str() {
        "api" => Arc::new(ApiEmbedder::new(cfg)?),
        "stub" => Arc::new(StubEmbedder::new(cfg.dimensions)?),
        other => {
            return Err(SemanticError::InvalidConfig(format!(
                "unknown embedding mode `{other}` (expected `api` or `stub`)"
            )))
        }
    };
    info!(
        provider = provider.name(),
        dims = cfg.dimensions,
        "embedding provider ready"
    );
    Ok(provider)
}
