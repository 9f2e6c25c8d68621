use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RankError {
    /// Query and document vectors disagree on width. `url` names the
    /// offending document when one is involved.
    #[error("dimension mismatch: expected {expected}, got {actual}{}", document_suffix(.url))]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        url: Option<String>,
    },
}

fn document_suffix(url: &Option<String>) -> String {
    url.as_deref()
        .map(|u| format!(" (document {u})"))
        .unwrap_or_default()
}
