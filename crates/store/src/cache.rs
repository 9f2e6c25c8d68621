use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::{load, Corpus, StoreConfig, StoreError};

/// Owned, lazily-loaded corpus snapshot.
///
/// The first successful [`corpus`](Self::corpus) call parses both files; later
/// calls hand out the same `Arc<Corpus>`. The snapshot is never mutated in
/// place. [`reload`](Self::reload) builds a new corpus and swaps the whole
/// `Arc`, so readers holding the old one keep a consistent view.
#[derive(Debug)]
pub struct EmbeddingStore {
    config: StoreConfig,
    snapshot: RwLock<Option<Arc<Corpus>>>,
}

impl EmbeddingStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            snapshot: RwLock::new(None),
        }
    }

    /// Build a store around an already-loaded corpus.
    pub fn with_corpus(config: StoreConfig, corpus: Corpus) -> Self {
        Self {
            config,
            snapshot: RwLock::new(Some(Arc::new(corpus))),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Whether a snapshot is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.read().is_some()
    }

    /// Return the cached snapshot, loading it on first use.
    ///
    /// A failed load is not cached; the next call tries again.
    pub fn corpus(&self) -> Result<Arc<Corpus>, StoreError> {
        if let Some(corpus) = self.read().as_ref() {
            return Ok(Arc::clone(corpus));
        }

        let mut guard = self.write();
        // Another caller may have finished loading while we waited.
        if let Some(corpus) = guard.as_ref() {
            return Ok(Arc::clone(corpus));
        }
        let corpus = Arc::new(load(&self.config)?);
        info!(
            documents = corpus.len(),
            dims = corpus.dimensions(),
            "corpus cached"
        );
        *guard = Some(Arc::clone(&corpus));
        Ok(corpus)
    }

    /// Load a fresh snapshot and atomically replace the cached one.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self) -> Result<Arc<Corpus>, StoreError> {
        let corpus = Arc::new(load(&self.config)?);
        let previous = self.write().replace(Arc::clone(&corpus));
        info!(
            documents = corpus.len(),
            previous_documents = previous.as_ref().map(|c| c.len()),
            "corpus reloaded"
        );
        Ok(corpus)
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Arc<Corpus>>> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Arc<Corpus>>> {
        self.snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
