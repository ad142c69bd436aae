//! Dangerous goods analysis pipeline.
//!
//! Two flows are served:
//!
//! - retrieval: PDF → text → chunks → user collection, later fixed-query
//!   retrieval → single LLM call → records deleted;
//! - text cache: PDF → text → content gate → `<uuid>.txt`, later
//!   summarize → classify.
//!
//! Every operation is keyed by the caller's session UUID.

use imdg_database::CollectionStore;
use imdg_models::CollectionName;
use imdg_utils::{ImdgError, ImdgResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::chunking::RecursiveTextSplitter;
use crate::extraction::TextExtractor;
use crate::gate::{ContentGate, GateDecision};
use crate::generator::ResponseGenerator;
use crate::retrieval::Retriever;
use crate::uploads::UploadStore;

pub struct AnalyzerComponents {
    pub extractor: Arc<dyn TextExtractor>,
    pub gate: ContentGate,
    pub splitter: RecursiveTextSplitter,
    pub store: Arc<CollectionStore>,
    pub retriever: Retriever,
    pub generator: ResponseGenerator,
    pub uploads: UploadStore,
    pub text_cache_dir: PathBuf,
}

pub struct DangerousGoodsAnalyzer {
    extractor: Arc<dyn TextExtractor>,
    gate: ContentGate,
    splitter: RecursiveTextSplitter,
    store: Arc<CollectionStore>,
    retriever: Retriever,
    generator: ResponseGenerator,
    uploads: UploadStore,
    text_cache_dir: PathBuf,
}

impl DangerousGoodsAnalyzer {
    pub fn new(components: AnalyzerComponents) -> Self {
        let AnalyzerComponents {
            extractor,
            gate,
            splitter,
            store,
            retriever,
            generator,
            uploads,
            text_cache_dir,
        } = components;

        tracing::debug!(
            keywords = ?gate.keywords(),
            queries = retriever.queries().len(),
            upload_dir = %uploads.root().display(),
            text_cache_dir = %text_cache_dir.display(),
            "Analyzer pipeline configured"
        );

        Self {
            extractor,
            gate,
            splitter,
            store,
            retriever,
            generator,
            uploads,
            text_cache_dir,
        }
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    pub fn text_cache_path(&self, user_id: Uuid) -> PathBuf {
        self.text_cache_dir.join(format!("{}.txt", user_id))
    }

    async fn extract(&self, path: &Path) -> ImdgResult<String> {
        self.extractor.extract(path).await.map_err(|e| {
            tracing::warn!(path = %path.display(), error = %format!("{:#}", e), "Text extraction failed");
            ImdgError::document_processing(format!("{:#}", e))
        })
    }

    /// Extracts, splits and stores the document in the user's collection.
    /// Returns the number of chunks stored.
    pub async fn process_document(&self, path: &Path, user_id: Uuid) -> ImdgResult<usize> {
        let text = self.extract(path).await?;
        let chunks = self.splitter.split(&text);
        if chunks.is_empty() {
            return Err(ImdgError::document_processing(
                "No text could be extracted from the document",
            ));
        }

        let name = CollectionName::from(user_id);
        self.store.ensure_collection(&name).await?;
        let stored = self.store.add(&name, &chunks).await?;

        tracing::info!(
            user_id = %user_id,
            chunks = stored,
            extractor = self.extractor.name(),
            "Document stored in collection"
        );
        Ok(stored)
    }

    pub async fn get_relevant_chunks(&self, user_id: Uuid) -> ImdgResult<String> {
        self.retriever.build_context(&self.store, user_id).await
    }

    pub async fn get_llm_response(&self, context: &str) -> ImdgResult<String> {
        self.generator.analyze_context(context).await
    }

    /// Removes every record from the user's collection.
    pub async fn delete_documents(&self, user_id: Uuid) -> ImdgResult<usize> {
        let removed = self.store.delete_all(&CollectionName::from(user_id)).await?;
        Ok(removed)
    }

    /// Retrieval flow. Records are only deleted once the model has answered.
    pub async fn analyze(&self, user_id: Uuid) -> ImdgResult<String> {
        let context = self.get_relevant_chunks(user_id).await?;
        tracing::debug!(user_id = %user_id, context_len = context.len(), "Built retrieval context");

        let response = self.get_llm_response(&context).await?;

        let removed = self.delete_documents(user_id).await?;
        tracing::info!(user_id = %user_id, removed, "Analysis complete, documents deleted");
        Ok(response)
    }

    /// Text-cache flow, first half: gate the document and cache its text.
    /// Rejected or unreadable uploads are removed.
    pub async fn examine_document(&self, path: &Path, user_id: Uuid) -> ImdgResult<PathBuf> {
        let text = match self.extract(path).await {
            Ok(text) => text,
            Err(e) => {
                self.uploads.remove(path).await?;
                return Err(e);
            }
        };

        if let GateDecision::Rejected { missing } = self.gate.check(&text) {
            tracing::warn!(
                user_id = %user_id,
                missing = ?missing,
                "Document rejected by content gate"
            );
            self.uploads.remove(path).await?;
            return Err(ImdgError::content_rejected(
                "Dokumen yang diunggah bukan MSDS (Material Safety Data Sheet)",
            ));
        }

        tokio::fs::create_dir_all(&self.text_cache_dir).await?;
        let cache_path = self.text_cache_path(user_id);
        tokio::fs::write(&cache_path, &text).await?;

        tracing::info!(user_id = %user_id, path = %cache_path.display(), "Document text cached");
        Ok(cache_path)
    }

    /// Text-cache flow, second half: summarize then classify the cached text.
    pub async fn process_cached_document(&self, user_id: Uuid) -> ImdgResult<String> {
        let cache_path = self.text_cache_path(user_id);
        let text = match tokio::fs::read_to_string(&cache_path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ImdgError::not_found(format!(
                    "examined document for session {}",
                    user_id
                )));
            }
            Err(e) => return Err(e.into()),
        };

        self.generator.summarize_then_analyze(&text).await
    }
}
