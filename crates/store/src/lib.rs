//! # Corpus Store (`store`)
//!
//! Loads the precomputed retrieval corpus from two parallel files:
//!
//! - a **tabular file** (CSV, header row first) carrying `url`, `title`, `body`
//!   and an optional `tag` column, one row per document;
//! - a **binary file** holding the raw concatenation of 32-bit floats, `D` per
//!   document, in the same order as the CSV rows.
//!
//! There is no join key between the two. Row `i` pairs with vector `i`, so the
//! loader is strict about counts: a byte length that is not a multiple of 4, a
//! trailing partial vector, or a row/vector count disagreement all fail the
//! load with a [`StoreError`]. Nothing is truncated or padded.
//!
//! [`EmbeddingStore`] wraps [`load`] with a lazily-initialized, immutable
//! snapshot that can be shared across concurrent readers and replaced whole
//! via [`EmbeddingStore::reload`].
//!
//! ## Example
//!
//! ```no_run
//! use store::{EmbeddingStore, StoreConfig};
//!
//! let cfg = StoreConfig {
//!     table_path: "summarized_content.csv".into(),
//!     embeddings_path: "embeddings.bin".into(),
//!     dimensions: 1536,
//!     ..Default::default()
//! };
//! let store = EmbeddingStore::new(cfg);
//! let corpus = store.corpus().expect("corpus loads");
//! println!("{} documents", corpus.len());
//! ```

mod binary;
mod cache;
pub mod config;
pub mod error;
mod record;
mod table;

pub use crate::binary::{decode_embeddings, encode_embeddings};
pub use crate::cache::EmbeddingStore;
pub use crate::config::{ByteOrder, StoreConfig};
pub use crate::error::StoreError;
pub use crate::record::{Corpus, DocumentRecord};

use std::fs;
use std::time::Instant;

use tracing::debug;

use crate::table::read_rows;

/// Load the corpus described by `cfg`, pairing CSV rows with embedding chunks
/// by position.
pub fn load(cfg: &StoreConfig) -> Result<Corpus, StoreError> {
    if cfg.dimensions == 0 {
        return Err(StoreError::InvalidDimensions);
    }
    let start = Instant::now();

    let rows = read_rows(&cfg.table_path)?;

    let bytes = fs::read(&cfg.embeddings_path).map_err(|source| StoreError::Io {
        path: cfg.embeddings_path.clone(),
        source,
    })?;
    let vectors = decode_embeddings(&bytes, cfg.dimensions, cfg.byte_order)?;

    if vectors.len() != rows.len() {
        return Err(StoreError::CountMismatch {
            rows: rows.len(),
            vectors: vectors.len(),
        });
    }

    let records: Vec<DocumentRecord> = rows
        .into_iter()
        .zip(vectors)
        .map(|(row, embedding)| DocumentRecord {
            url: row.url,
            title: row.title,
            body: row.body,
            tag: row.tag,
            embedding,
        })
        .collect();

    debug!(
        documents = records.len(),
        dims = cfg.dimensions,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "corpus loaded"
    );

    Ok(Corpus::new(records, cfg.dimensions))
}
