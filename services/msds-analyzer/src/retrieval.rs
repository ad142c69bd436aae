//! Fixed-query retrieval over a user's collection.

use imdg_database::CollectionStore;
use imdg_models::CollectionName;
use imdg_utils::{ImdgError, ImdgResult, RetrievalConfig};
use uuid::Uuid;

pub const CONTEXT_HEADER: &str = "Analyze based on this following context: \n\n";

#[derive(Debug, Clone)]
pub struct Retriever {
    queries: Vec<String>,
    top_k: usize,
}

impl Retriever {
    pub fn new(queries: Vec<String>, top_k: usize) -> Self {
        Self {
            queries: queries.into_iter().filter(|q| !q.trim().is_empty()).collect(),
            top_k: top_k.max(1),
        }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(config.queries.clone(), config.top_k)
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    /// Documents retrieved per query, in query order.
    pub async fn retrieve(&self, store: &CollectionStore, user_id: Uuid) -> ImdgResult<Vec<Vec<String>>> {
        let name = CollectionName::from(user_id);

        if store.count(&name).await? == 0 {
            return Err(ImdgError::not_found(format!(
                "processed document for session {}",
                user_id
            )));
        }

        let results = store.query(&name, &self.queries, self.top_k).await?;
        Ok(results
            .into_iter()
            .map(|matches| matches.into_iter().map(|m| m.document).collect())
            .collect())
    }

    pub async fn build_context(&self, store: &CollectionStore, user_id: Uuid) -> ImdgResult<String> {
        let documents = self.retrieve(store, user_id).await?;
        Ok(format_context(&documents))
    }
}

/// Header, then one `Context i:` block per query with its documents joined by newlines.
pub fn format_context(documents: &[Vec<String>]) -> String {
    let mut context = String::from(CONTEXT_HEADER);
    for (i, docs) in documents.iter().enumerate() {
        context.push_str(&format!("Context {}:\n\n{}\n\n", i + 1, docs.join("\n")));
    }
    context
}
