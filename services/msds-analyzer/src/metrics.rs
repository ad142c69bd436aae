use anyhow::Result;
use prometheus::{IntCounter, Registry, TextEncoder};

/// Service counters, exported at `/metrics`.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub documents_processed: IntCounter,
    pub documents_rejected: IntCounter,
    pub analyses_completed: IntCounter,
    pub llm_failures: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new_custom(Some("imdg".to_string()), None)?;

        let documents_processed = IntCounter::new(
            "documents_processed_total",
            "Documents extracted and stored or cached",
        )?;
        let documents_rejected = IntCounter::new(
            "documents_rejected_total",
            "Uploads rejected by validation or the content gate",
        )?;
        let analyses_completed = IntCounter::new(
            "analyses_completed_total",
            "Successful LLM analyses",
        )?;
        let llm_failures = IntCounter::new("llm_failures_total", "Failed LLM analyses")?;

        registry.register(Box::new(documents_processed.clone()))?;
        registry.register(Box::new(documents_rejected.clone()))?;
        registry.register(Box::new(analyses_completed.clone()))?;
        registry.register(Box::new(llm_failures.clone()))?;

        Ok(Self {
            registry,
            documents_processed,
            documents_rejected,
            analyses_completed,
            llm_failures,
        })
    }

    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        encoder
            .encode_to_string(&self.registry.gather())
            .unwrap_or_else(|_| "Error encoding metrics".to_string())
    }
}
