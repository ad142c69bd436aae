use anyhow::{Context, Result};
use imdg_database::{
    initialize_store, EmbeddingFunction, HashingEmbedder, HuggingFaceEmbedder, VectorStoreConfig,
};
use imdg_utils::{AppConfig, EmbeddingConfig, EmbeddingProvider};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::analyzer::{AnalyzerComponents, DangerousGoodsAnalyzer};
use crate::chunking::RecursiveTextSplitter;
use crate::extraction::{extractor_from_config, TextExtractor};
use crate::gate::ContentGate;
use crate::generator::ResponseGenerator;
use crate::llm_client::{ChatModel, GroqChatClient};
use crate::metrics::Metrics;
use crate::pages::PageRenderer;
use crate::prompts::PromptLibrary;
use crate::retrieval::Retriever;
use crate::session::{SessionStore, UserTable};
use crate::uploads::UploadStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub analyzer: Arc<DangerousGoodsAnalyzer>,
    pub sessions: SessionStore,
    pub users: Arc<UserTable>,
    pub pages: Arc<PageRenderer>,
    pub metrics: Metrics,
}

impl AppState {
    /// Wires production components from configuration.
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let embedder = build_embedder(&config.embedding)?;
        let model: Arc<dyn ChatModel> =
            Arc::new(GroqChatClient::new(&config.llm).context("Failed to configure LLM client")?);
        let extractor = extractor_from_config(&config.extraction);

        Self::with_components(config, extractor, embedder, model).await
    }

    /// Wires the service around the given extractor, embedder and model.
    pub async fn with_components(
        config: AppConfig,
        extractor: Arc<dyn TextExtractor>,
        embedder: Arc<dyn EmbeddingFunction>,
        model: Arc<dyn ChatModel>,
    ) -> Result<Self> {
        config.validate()?;

        let store_config = VectorStoreConfig {
            path: PathBuf::from(&config.vector_store.path),
            max_collections: config.vector_store.max_collections,
        };
        let store = initialize_store(&store_config, embedder).await?;

        let analyzer = DangerousGoodsAnalyzer::new(AnalyzerComponents {
            extractor,
            gate: ContentGate::from_config(&config.gate),
            splitter: RecursiveTextSplitter::from_config(&config.chunking)?,
            store: Arc::new(store),
            retriever: Retriever::from_config(&config.retrieval),
            generator: ResponseGenerator::new(model, PromptLibrary::new()?),
            uploads: UploadStore::from_config(&config.storage),
            text_cache_dir: PathBuf::from(&config.storage.text_cache_dir),
        });

        let users = UserTable::from_credentials(&config.auth.users)?;
        if users.is_empty() {
            tracing::warn!("No login accounts configured");
        }

        tracing::info!(
            extractor = analyzer.extractor_name(),
            model = analyzer.model_name(),
            users = users.len(),
            require_login = config.auth.require_login,
            "Analyzer initialized"
        );

        let session_idle_hours = config.auth.session_idle_hours;
        Ok(Self {
            config: Arc::new(config),
            analyzer: Arc::new(analyzer),
            sessions: SessionStore::with_idle_timeout(chrono::Duration::hours(
                session_idle_hours,
            )),
            users: Arc::new(users),
            pages: Arc::new(PageRenderer::new()?),
            metrics: Metrics::new()?,
        })
    }
}

pub fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingFunction>> {
    let embedder: Arc<dyn EmbeddingFunction> = match config.provider {
        EmbeddingProvider::HuggingFace => Arc::new(
            HuggingFaceEmbedder::new(
                &config.api_key,
                &config.api_url,
                config.model.clone(),
                Duration::from_secs(config.timeout_seconds),
                config.batch_size,
            )
            .context("Failed to configure embedding client")?,
        ),
        EmbeddingProvider::Hashing => {
            tracing::warn!("Using local hashing embedder; retrieval quality is reduced");
            Arc::new(HashingEmbedder::new(config.dimensions))
        }
    };
    Ok(embedder)
}
