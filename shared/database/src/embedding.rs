//! Embedding functions
//!
//! Collections embed their documents and query texts through an
//! [`EmbeddingFunction`]. Production deployments use the hosted Hugging Face
//! feature-extraction pipeline for a sentence-transformers model; the
//! [`HashingEmbedder`] is a deterministic local fallback.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L12-v2";
pub const DEFAULT_INFERENCE_URL: &str = "https://api-inference.huggingface.co";

#[async_trait]
pub trait EmbeddingFunction: Send + Sync {
    /// Identifier of the underlying model.
    fn model_name(&self) -> &str;

    /// Embeds every input text, preserving order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Client for the Hugging Face inference feature-extraction pipeline.
pub struct HuggingFaceEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    batch_size: usize,
}

impl HuggingFaceEmbedder {
    pub fn new(
        api_key: &str,
        base_url: &str,
        model: impl Into<String>,
        timeout: Duration,
        batch_size: usize,
    ) -> Result<Self> {
        let model = model.into();
        anyhow::ensure!(!api_key.trim().is_empty(), "missing Hugging Face API key");
        anyhow::ensure!(!model.trim().is_empty(), "missing embedding model name");
        anyhow::ensure!(batch_size > 0, "embedding batch size must be positive");

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
                .context("invalid Hugging Face API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build embedding HTTP client")?;

        let endpoint = format!(
            "{}/pipeline/feature-extraction/{}",
            base_url.trim_end_matches('/'),
            model
        );

        Ok(Self {
            client,
            endpoint,
            model,
            batch_size,
        })
    }

    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = FeatureExtractionRequest {
            inputs,
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("Failed to call embedding API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Embedding API error ({}): {}", status, error_text);
        }

        let vectors: Vec<Vec<f32>> = response
            .json()
            .await
            .context("Failed to parse embedding response")?;

        anyhow::ensure!(
            vectors.len() == inputs.len(),
            "embedding API returned {} vectors for {} inputs",
            vectors.len(),
            inputs.len()
        );
        Ok(vectors)
    }
}

#[async_trait]
impl EmbeddingFunction for HuggingFaceEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            vectors.extend(self.embed_batch(batch).await?);
        }
        Ok(vectors)
    }
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
    options: RequestOptions,
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

/// Feature-hashing bag-of-words embedder.
///
/// Lower-cased alphanumeric tokens are hashed (FNV-1a) into a fixed number of
/// buckets and the result is L2-normalised. Texts sharing words end up close
/// under cosine similarity, which is enough for offline runs and tests.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = (fnv1a(token.as_bytes()) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        // Same width as all-MiniLM-L12-v2.
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingFunction for HashingEmbedder {
    fn model_name(&self) -> &str {
        "feature-hashing"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

/// Cosine similarity of two vectors of equal length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
