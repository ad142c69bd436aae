pub mod collection;
pub mod embedding;
pub mod error;
pub mod store;

pub use collection::{nearest, QueryMatch, Record};
pub use embedding::{
    cosine_similarity, EmbeddingFunction, HashingEmbedder, HuggingFaceEmbedder,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_INFERENCE_URL,
};
pub use error::{StoreError, StoreResult};
pub use store::{CollectionStore, DATABASE_FILE};

use anyhow::{Context, Result};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct VectorStoreConfig {
    pub path: PathBuf,
    pub max_collections: usize,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./vector_store"),
            max_collections: 10,
        }
    }
}

pub async fn initialize_store(
    config: &VectorStoreConfig,
    embedder: Arc<dyn EmbeddingFunction>,
) -> Result<CollectionStore> {
    let capacity = NonZeroUsize::new(config.max_collections)
        .context("vector_store.max_collections must be at least 1")?;

    let store = CollectionStore::open(&config.path, capacity, embedder)
        .await
        .with_context(|| format!("Failed to open vector store at {}", config.path.display()))?;

    Ok(store)
}

pub async fn health_check(store: &CollectionStore) -> Result<()> {
    let metadata = tokio::fs::metadata(store.root())
        .await
        .context("Vector store directory is not accessible")?;
    anyhow::ensure!(metadata.is_dir(), "Vector store path is not a directory");
    store.ping().await.context("Vector database is not answering")?;
    Ok(())
}
