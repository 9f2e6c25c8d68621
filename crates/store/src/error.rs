use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the corpus. Every variant is fatal to the request
/// that triggered the load; none of them are retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A source file is missing or unreadable.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The CSV could not be parsed or a row failed to deserialize.
    #[error("malformed table {path}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// The CSV header lacks a column every record needs.
    #[error("table is missing required column `{column}`")]
    MissingColumn { column: &'static str },
    /// The embeddings file ends in the middle of an `f32`.
    #[error("embeddings file length {len} is not a multiple of 4 bytes")]
    TruncatedFloat { len: usize },
    /// The embeddings file ends in the middle of a vector.
    #[error("embeddings file holds {floats} floats, not a multiple of dimension {dimensions}")]
    PartialVector { floats: usize, dimensions: usize },
    /// Rows and vectors disagree, so positional pairing would be wrong.
    #[error("table has {rows} rows but embeddings file has {vectors} vectors")]
    CountMismatch { rows: usize, vectors: usize },
    /// An in-memory record's embedding width differs from the corpus width.
    #[error("record {url} has {actual} dimensions, expected {expected}")]
    RecordWidth {
        url: String,
        expected: usize,
        actual: usize,
    },
    /// `dimensions` was configured as zero.
    #[error("embedding dimensions must be greater than zero")]
    InvalidDimensions,
}
