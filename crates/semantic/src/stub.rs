use async_trait::async_trait;
use fxhash::hash64;

use crate::{EmbeddingProvider, SemanticError};

/// Deterministic, offline embedder.
///
/// Values are sinusoids of a hash of the input text, so equal text always
/// yields an equal vector. The vectors carry no meaning; this is for tests
/// and dry runs against corpora built with the same stub. It is only used
/// when configured explicitly and never stands in for a failed API call.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    dimensions: usize,
}

impl StubEmbedder {
    pub fn new(dimensions: usize) -> Result<Self, SemanticError> {
        if dimensions == 0 {
            return Err(SemanticError::InvalidConfig(
                "stub dimensions must be greater than zero".into(),
            ));
        }
        Ok(Self { dimensions })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Synchronous form of [`EmbeddingProvider::embed`], handy for building
    /// fixture corpora.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let h = hash64(text.as_bytes());
        (0..self.dimensions)
            .map(|idx| ((h >> (idx % 32)) as f32 * 0.0001 + idx as f32).sin())
            .collect()
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        Ok(self.embed_sync(text))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_has_configured_width() {
        let stub = StubEmbedder::new(384).unwrap();
        assert_eq!(stub.embed_sync("hello world").len(), 384);
    }

    #[test]
    fn stub_is_deterministic() {
        let stub = StubEmbedder::new(64).unwrap();
        assert_eq!(stub.embed_sync("same text"), stub.embed_sync("same text"));
    }

    #[test]
    fn stub_differs_by_text() {
        let stub = StubEmbedder::new(64).unwrap();
        assert_ne!(stub.embed_sync("hello"), stub.embed_sync("world"));
    }

    #[test]
    fn stub_values_in_range_and_non_zero() {
        let stub = StubEmbedder::new(128).unwrap();
        let long = "a".repeat(10_000);
        for text in ["", "Hello 世界 🌍", long.as_str()] {
            let v = stub.embed_sync(text);
            assert!(v.iter().all(|x| (-1.0..=1.0).contains(x)));
            assert!(!v.iter().all(|&x| x == 0.0));
        }
    }

    #[test]
    fn stub_zero_dimensions_rejected() {
        assert!(matches!(
            StubEmbedder::new(0),
            Err(SemanticError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn stub_trait_path_matches_sync() {
        let stub = StubEmbedder::new(8).unwrap();
        assert_eq!(stub.embed("x").await.unwrap(), stub.embed_sync("x"));
        assert_eq!(stub.name(), "stub");
    }
}
