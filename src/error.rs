use thiserror::Error;

use ranker::RankError;
use semantic::SemanticError;
use store::StoreError;

/// Typed failure of a retrieval call. Each variant carries the collaborator's
/// own error so callers can tell which stage failed.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The query could not be embedded, or the provider returned no usable vector.
    #[error("embedding provider failed: {0}")]
    EmbeddingProvider(#[from] SemanticError),
    /// The corpus files could not be loaded.
    #[error("corpus load failed: {0}")]
    DataLoad(#[from] StoreError),
    /// The query vector's width disagrees with the corpus.
    #[error("{0}")]
    DimensionMismatch(#[from] RankError),
}

impl RetrievalError {
    /// Stable short label, used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RetrievalError::EmbeddingProvider(_) => "embedding_provider",
            RetrievalError::DataLoad(_) => "data_load",
            RetrievalError::DimensionMismatch(_) => "dimension_mismatch",
        }
    }
}
