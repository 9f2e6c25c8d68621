//! # corpus-rag
//!
//! Retrieval core for question answering over a fixed, precomputed corpus.
//!
//! A query goes through three steps:
//!
//! 1. **Embed.** The query text is turned into a vector by an
//!    [`EmbeddingProvider`] (one call, no internal retries).
//! 2. **Rank.** Every document in the cached [`Corpus`] is scored by cosine
//!    similarity and the best `top_n` are kept, most similar first.
//! 3. **Assemble.** The passage bodies are joined with a blank line into a
//!    context block, and their URLs become the reference list.
//!
//! The corpus comes from two parallel files, a CSV table and a packed `f32`
//! binary, paired row-by-row (see the [`store`] crate). It is loaded once,
//! on first use, and shared read-only afterwards.
//!
//! Failures are typed: [`RetrievalError::EmbeddingProvider`],
//! [`RetrievalError::DataLoad`] or [`RetrievalError::DimensionMismatch`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use rag::{EmbeddingStore, Retriever, SemanticConfig, StoreConfig, build_provider};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let embedder = build_provider(&SemanticConfig::default())?;
//! let store = Arc::new(EmbeddingStore::new(StoreConfig::default()));
//! let retriever = Retriever::new(embedder, store);
//!
//! let result = retriever.retrieve("Which temple has the best autumn leaves?", 3).await?;
//! println!("{}", result.context);
//! for url in &result.references {
//!     println!("{url}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The [`answer`] module adds the prompt-and-generate step used by the
//! `rag` command-line tool.

pub mod answer;
pub mod config;
mod error;
mod metrics;
mod retriever;

pub use crate::config::{ConfigLoadError, RagConfig, RetrievalSettings};
pub use crate::error::RetrievalError;
pub use crate::metrics::{RetrievalMetrics, set_retrieval_metrics};
pub use crate::retriever::{CONTEXT_SEPARATOR, RetrievalRequest, RetrievalResult, Retriever};

pub use ranker::{RankError, ScoredResult, cosine_similarity, rank};
pub use semantic::{
    ApiEmbedder, EmbeddingProvider, RetryConfig, SemanticConfig, SemanticError, StubEmbedder,
    build_provider,
};
pub use store::{
    ByteOrder, Corpus, DocumentRecord, EmbeddingStore, StoreConfig, StoreError, decode_embeddings,
    encode_embeddings, load,
};
