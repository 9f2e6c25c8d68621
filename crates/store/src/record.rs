use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// One retrievable passage plus its precomputed embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRecord {
    /// Unique identifier and link target.
    pub url: String,
    pub title: String,
    /// Passage text handed to the generation step as context.
    pub body: String,
    /// Category labels from the optional `tag` column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub embedding: Vec<f32>,
}

/// Immutable, fully-validated corpus snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    records: Vec<DocumentRecord>,
    dimensions: usize,
}

impl Corpus {
    /// Callers outside this crate go through [`crate::load`], which guarantees
    /// every embedding is `dimensions` long.
    pub(crate) fn new(records: Vec<DocumentRecord>, dimensions: usize) -> Self {
        Self {
            records,
            dimensions,
        }
    }

    /// Build a corpus from in-memory records, checking every embedding is
    /// `dimensions` wide.
    pub fn from_records(
        records: Vec<DocumentRecord>,
        dimensions: usize,
    ) -> Result<Self, StoreError> {
        if dimensions == 0 {
            return Err(StoreError::InvalidDimensions);
        }
        if let Some(bad) = records.iter().find(|r| r.embedding.len() != dimensions) {
            return Err(StoreError::RecordWidth {
                url: bad.url.clone(),
                expected: dimensions,
                actual: bad.embedding.len(),
            });
        }
        Ok(Self::new(records, dimensions))
    }

    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a DocumentRecord;
    type IntoIter = std::slice::Iter<'a, DocumentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
