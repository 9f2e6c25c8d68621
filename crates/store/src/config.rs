use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Byte order of the packed `f32` values in the embeddings file.
///
/// The decoder must match whatever wrote the file. Numpy's `tofile` uses the
/// platform's native order, which is little-endian on every mainstream target.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
    Native,
}

impl ByteOrder {
    pub(crate) fn is_little(self) -> bool {
        match self {
            ByteOrder::Little => true,
            ByteOrder::Big => false,
            ByteOrder::Native => cfg!(target_endian = "little"),
        }
    }
}

/// Location and shape of the on-disk corpus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// CSV with a header row; must contain `url`, `title` and `body` columns.
    #[serde(default = "default_table_path")]
    pub table_path: PathBuf,
    /// Raw concatenation of `dimensions`-length `f32` vectors, one per CSV row.
    #[serde(default = "default_embeddings_path")]
    pub embeddings_path: PathBuf,
    /// Embedding width `D` shared by every stored vector and the query.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    #[serde(default)]
    pub byte_order: ByteOrder,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            table_path: default_table_path(),
            embeddings_path: default_embeddings_path(),
            dimensions: default_dimensions(),
            byte_order: ByteOrder::default(),
        }
    }
}

fn default_table_path() -> PathBuf {
    PathBuf::from("summarized_content.csv")
}

fn default_embeddings_path() -> PathBuf {
    PathBuf::from("embeddings.bin")
}

fn default_dimensions() -> usize {
    1536
}
