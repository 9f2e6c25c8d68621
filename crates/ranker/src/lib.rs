//! # Similarity Ranker (`ranker`)
//!
//! Exhaustive cosine-similarity scan over a loaded corpus. Every document is
//! scored against the query, results are sorted by descending similarity and
//! the first `top_n` are returned.
//!
//! The sort is stable, so documents with equal scores keep their corpus
//! order. Scores are clamped to `[-1, 1]`, and a zero-magnitude vector on
//! either side scores `0.0` rather than dividing by zero.
//!
//! ```
//! use ranker::rank;
//! use store::DocumentRecord;
//!
//! let doc = |url: &str, embedding: Vec<f32>| DocumentRecord {
//!     url: url.into(),
//!     title: String::new(),
//!     body: String::new(),
//!     tag: None,
//!     embedding,
//! };
//! let corpus = vec![doc("x", vec![1.0, 0.0]), doc("y", vec![0.0, 1.0])];
//!
//! let hits = rank(&[1.0, 0.0], &corpus, 1).unwrap();
//! assert_eq!(hits[0].url, "x");
//! ```

mod cosine;
mod error;

pub use crate::cosine::cosine_similarity;
pub use crate::error::RankError;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use store::DocumentRecord;
use tracing::debug;

use crate::cosine::{cosine_with_norm, norm};

/// A corpus document paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub url: String,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Cosine similarity in `[-1, 1]`.
    pub similarity: f32,
}

impl ScoredResult {
    fn from_record(record: &DocumentRecord, similarity: f32) -> Self {
        Self {
            url: record.url.clone(),
            title: record.title.clone(),
            body: record.body.clone(),
            tag: record.tag.clone(),
            similarity,
        }
    }
}

/// Score every record against `query` and return the `top_n` best, most
/// similar first.
///
/// Any record whose embedding width differs from the query fails the whole
/// call, whatever `top_n` is. Otherwise an empty corpus or `top_n == 0`
/// yields an empty vector.
///
/// A document with NaN or infinite components scores `0.0`, so it ranks
/// below positive matches but above negative ones.
pub fn rank(
    query: &[f32],
    corpus: &[DocumentRecord],
    top_n: usize,
) -> Result<Vec<ScoredResult>, RankError> {
    if let Some(record) = corpus.iter().find(|r| r.embedding.len() != query.len()) {
        return Err(RankError::DimensionMismatch {
            expected: query.len(),
            actual: record.embedding.len(),
            url: Some(record.url.clone()),
        });
    }
    if top_n == 0 || corpus.is_empty() {
        return Ok(Vec::new());
    }

    let query_norm = norm(query);
    let mut scored: Vec<(usize, f32)> = corpus
        .iter()
        .enumerate()
        .map(|(idx, record)| (idx, cosine_with_norm(query, query_norm, &record.embedding)))
        .collect();

    // `sort_by` is stable: equal scores stay in corpus order.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(top_n);

    debug!(
        candidates = corpus.len(),
        returned = scored.len(),
        best = scored.first().map(|s| s.1),
        "ranked corpus"
    );

    Ok(scored
        .into_iter()
        .map(|(idx, sim)| ScoredResult::from_record(&corpus[idx], sim))
        .collect())
}
