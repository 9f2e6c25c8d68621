use std::sync::Arc;

use ranker::{RankError, ScoredResult, rank};
use semantic::{EmbeddingProvider, SemanticError};
use serde::{Deserialize, Serialize};
use store::EmbeddingStore;
use tracing::{debug, info};

use crate::RetrievalError;
use crate::metrics::MetricsSpan;

/// Separator placed between passage bodies in [`RetrievalResult::context`].
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Single-operation request as consumed by the surrounding service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalRequest {
    pub query_text: String,
    /// Falls back to the retriever's default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
}

/// Ranked passages plus the derived context block and reference list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Bodies of the ranked passages, most similar first, separated by a blank line.
    pub context: String,
    /// URLs of the ranked passages, in the same order.
    pub references: Vec<String>,
    pub scored: Vec<ScoredResult>,
}

impl RetrievalResult {
    fn from_scored(scored: Vec<ScoredResult>) -> Self {
        let context = scored
            .iter()
            .map(|s| s.body.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);
        let references = scored.iter().map(|s| s.url.clone()).collect();
        Self {
            context,
            references,
            scored,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scored.is_empty()
    }
}

/// Ties the embedding provider, the corpus store and the ranker together.
///
/// Holds no per-request state, so one instance can be shared across tasks
/// behind an `Arc`.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<EmbeddingStore>,
    default_top_n: usize,
}

impl Retriever {
    pub const DEFAULT_TOP_N: usize = 3;

    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<EmbeddingStore>) -> Self {
        Self {
            embedder,
            store,
            default_top_n: Self::DEFAULT_TOP_N,
        }
    }

    pub fn with_default_top_n(mut self, top_n: usize) -> Self {
        self.default_top_n = top_n;
        self
    }

    pub fn default_top_n(&self) -> usize {
        self.default_top_n
    }

    pub fn store(&self) -> &Arc<EmbeddingStore> {
        &self.store
    }

    /// Answer a [`RetrievalRequest`], applying the default `top_n` when unset.
    pub async fn handle(
        &self,
        request: RetrievalRequest,
    ) -> Result<RetrievalResult, RetrievalError> {
        let top_n = request.top_n.unwrap_or(self.default_top_n);
        self.retrieve(&request.query_text, top_n).await
    }

    /// Embed `query_text`, rank the corpus against it and assemble the
    /// context block from the best `top_n` passages.
    ///
    /// The provider is called exactly once. If that call fails the corpus is
    /// not touched.
    pub async fn retrieve(
        &self,
        query_text: &str,
        top_n: usize,
    ) -> Result<RetrievalResult, RetrievalError> {
        let span = MetricsSpan::start();
        let result = self.retrieve_inner(query_text, top_n).await;
        if let Some(span) = span {
            span.record(result.as_ref().map(|r| r.scored.len()));
        }
        if let Err(err) = &result {
            debug!(kind = err.kind(), error = %err, "retrieval failed");
        }
        result
    }

    async fn retrieve_inner(
        &self,
        query_text: &str,
        top_n: usize,
    ) -> Result<RetrievalResult, RetrievalError> {
        let query = self.embedder.embed(query_text).await?;
        if query.is_empty() {
            return Err(SemanticError::EmptyVector.into());
        }

        let corpus = self.store.corpus()?;
        if query.len() != corpus.dimensions() {
            return Err(RankError::DimensionMismatch {
                expected: corpus.dimensions(),
                actual: query.len(),
                url: None,
            }
            .into());
        }

        let scored = rank(&query, corpus.records(), top_n)?;
        info!(
            provider = self.embedder.name(),
            corpus = corpus.len(),
            top_n,
            hits = scored.len(),
            "retrieved context"
        );
        Ok(RetrievalResult::from_scored(scored))
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("embedder", &self.embedder.name())
            .field("store", &self.store)
            .field("default_top_n", &self.default_top_n)
            .finish()
    }
}
