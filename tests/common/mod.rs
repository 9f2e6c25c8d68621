//! Shared fixtures: a small on-disk corpus embedded with the stub provider.

#![allow(dead_code)]

use std::fs;
use std::sync::Arc;

use rag::{ByteOrder, EmbeddingStore, Retriever, StoreConfig, StubEmbedder, encode_embeddings};
use tempfile::TempDir;

pub const DIMS: usize = 16;

/// `(url, title, body)`; bodies avoid commas so the CSV needs no quoting.
pub const DOCS: &[(&str, &str, &str)] = &[
    (
        "https://example.com/kiyomizu",
        "Kiyomizu-dera",
        "A wooden stage overlooks maple trees on the hillside",
    ),
    (
        "https://example.com/fushimi",
        "Fushimi Inari",
        "Thousands of vermilion torii gates climb the mountain",
    ),
    (
        "https://example.com/kinkaku",
        "Kinkaku-ji",
        "The golden pavilion reflects in the mirror pond",
    ),
    (
        "https://example.com/ryoanji",
        "Ryoan-ji",
        "Fifteen stones sit in a raked gravel garden",
    ),
];

pub struct Fixture {
    pub dir: TempDir,
    pub config: StoreConfig,
}

/// Write [`DOCS`] as a CSV table plus a little-endian vector file.
pub fn corpus_on_disk() -> Fixture {
    let stub = StubEmbedder::new(DIMS).unwrap();
    let dir = TempDir::new().unwrap();

    let mut csv = String::from("url,title,tag,body\n");
    for (url, title, body) in DOCS {
        csv.push_str(&format!("{url},{title},,{body}\n"));
    }
    let vectors: Vec<Vec<f32>> = DOCS.iter().map(|(_, _, body)| stub.embed_sync(body)).collect();

    let table_path = dir.path().join("summarized_content.csv");
    let embeddings_path = dir.path().join("embeddings.bin");
    fs::write(&table_path, csv).unwrap();
    fs::write(&embeddings_path, encode_embeddings(&vectors, ByteOrder::Little)).unwrap();

    Fixture {
        dir,
        config: StoreConfig {
            table_path,
            embeddings_path,
            dimensions: DIMS,
            byte_order: ByteOrder::Little,
        },
    }
}

pub fn stub_retriever(fixture: &Fixture) -> Retriever {
    let store = Arc::new(EmbeddingStore::new(fixture.config.clone()));
    Retriever::new(Arc::new(StubEmbedder::new(DIMS).unwrap()), store)
}
