//! YAML configuration for the retrieval core and its front end.
//!
//! Every section is optional; omitted fields take the defaults shown below.
//!
//! ```yaml
//! version: "1.0"
//! name: "shrine and temple guide"
//!
//! corpus:
//!   table_path: "summarized_content.csv"
//!   embeddings_path: "embeddings.bin"
//!   dimensions: 1536
//!   byte_order: "little"
//!
//! embedding:
//!   mode: "api"
//!   api_provider: "openai"
//!   api_url: "https://api.openai.com/v1/embeddings"
//!   api_key_env: "OPENAI_API_KEY"
//!   model_name: "text-embedding-3-small"
//!   dimensions: 1536
//!   timeout_secs: 30
//!
//! retrieval:
//!   top_n: 3
//!
//! generation:
//!   model: "gpt-3.5-turbo"
//!   temperature: 0.5
//!   knowledge_label: "Shrine and temple knowledge"
//!   fallback_answer: "Could not generate an answer."
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use semantic::{SemanticConfig, SemanticError, build_provider};
use serde::{Deserialize, Serialize};
use store::{EmbeddingStore, StoreConfig};
use thiserror::Error;

use crate::Retriever;
use crate::answer::GenerationConfig;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// On-disk corpus location and shape
    #[serde(default)]
    pub corpus: StoreConfig,

    /// Query embedding provider
    #[serde(default)]
    pub embedding: SemanticConfig,

    #[serde(default)]
    pub retrieval: RetrievalSettings,

    /// Chat model used by the front end
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalSettings {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

fn default_top_n() -> usize {
    Retriever::DEFAULT_TOP_N
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            corpus: StoreConfig::default(),
            embedding: SemanticConfig::default(),
            retrieval: RetrievalSettings::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl RagConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: RagConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        if self.corpus.dimensions == 0 {
            return Err(ConfigLoadError::Validation(
                "corpus.dimensions must be >= 1".to_string(),
            ));
        }
        if self.embedding.dimensions != self.corpus.dimensions {
            return Err(ConfigLoadError::Validation(format!(
                "embedding.dimensions ({}) must equal corpus.dimensions ({})",
                self.embedding.dimensions, self.corpus.dimensions
            )));
        }
        if !matches!(
            self.embedding.mode.to_ascii_lowercase().as_str(),
            "api" | "stub"
        ) {
            return Err(ConfigLoadError::Validation(format!(
                "embedding.mode must be \"api\" or \"stub\", got \"{}\"",
                self.embedding.mode
            )));
        }
        if self.retrieval.top_n == 0 {
            return Err(ConfigLoadError::Validation(
                "retrieval.top_n must be >= 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigLoadError::Validation(format!(
                "generation.temperature must be within [0, 2], got {}",
                self.generation.temperature
            )));
        }

        Ok(())
    }

    /// Wire a [`Retriever`] from the `corpus`, `embedding` and `retrieval`
    /// sections. The corpus itself is loaded lazily on first use.
    pub fn build_retriever(&self) -> Result<Retriever, SemanticError> {
        let embedder = build_provider(&self.embedding)?;
        let store = Arc::new(EmbeddingStore::new(self.corpus.clone()));
        Ok(Retriever::new(embedder, store).with_default_top_n(self.retrieval.top_n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use store::ByteOrder;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
corpus:
  table_path: "data/summaries.csv"
  embeddings_path: "data/vectors.bin"
  dimensions: 384
  byte_order: "big"
embedding:
  mode: "stub"
  dimensions: 384
retrieval:
  top_n: 5
"#;

        let config = RagConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name.as_deref(), Some("test config"));
        assert_eq!(config.corpus.table_path, PathBuf::from("data/summaries.csv"));
        assert_eq!(config.corpus.dimensions, 384);
        assert_eq!(config.corpus.byte_order, ByteOrder::Big);
        assert_eq!(config.embedding.mode, "stub");
        assert_eq!(config.retrieval.top_n, 5);
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config = RagConfig::from_yaml("version: \"1\"\n").unwrap();
        assert_eq!(config.corpus, StoreConfig::default());
        assert_eq!(config.embedding, SemanticConfig::default());
        assert_eq!(config.retrieval.top_n, 3);
        assert_eq!(config.generation, GenerationConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "version: \"1.0\"\nretrieval:\n  top_n: 7").unwrap();

        let config = RagConfig::from_file(file.path()).unwrap();
        assert_eq!(config.retrieval.top_n, 7);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = RagConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigLoadError::FileRead(_)));
    }

    #[test]
    fn test_unsupported_version() {
        let err = RagConfig::from_yaml("version: \"2.0\"\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = RagConfig::from_yaml("version: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigLoadError::YamlParse(_)));
    }

    #[test]
    fn test_dimension_skew_is_rejected() {
        let yaml = r#"
version: "1.0"
corpus:
  dimensions: 1536
embedding:
  dimensions: 768
"#;
        let err = RagConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("must equal corpus.dimensions"));
    }

    #[test]
    fn test_zero_top_n_is_rejected() {
        let err = RagConfig::from_yaml("version: \"1.0\"\nretrieval:\n  top_n: 0\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(_)));
    }

    #[test]
    fn test_temperature_out_of_range() {
        let err =
            RagConfig::from_yaml("version: \"1.0\"\ngeneration:\n  temperature: 3.5\n").unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_unknown_embedding_mode() {
        let err =
            RagConfig::from_yaml("version: \"1.0\"\nembedding:\n  mode: \"onnx\"\n").unwrap_err();
        assert!(err.to_string().contains("embedding.mode"));
    }

    #[test]
    fn test_embedding_mode_is_case_insensitive() {
        let yaml = "version: \"1.0\"\ncorpus:\n  dimensions: 8\nembedding:\n  mode: \"Stub\"\n  dimensions: 8\n";
        let config = RagConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.build_retriever().unwrap().default_top_n(), 3);
    }

    #[test]
    fn test_build_retriever_with_stub() {
        let config = RagConfig::from_yaml(
            "version: \"1.0\"\ncorpus:\n  dimensions: 8\nembedding:\n  mode: stub\n  dimensions: 8\nretrieval:\n  top_n: 4\n",
        )
        .unwrap();
        let retriever = config.build_retriever().unwrap();
        assert_eq!(retriever.default_top_n(), 4);
        assert!(!retriever.store().is_loaded());
    }
}
