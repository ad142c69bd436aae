use imdg_utils::{ImdgError, ImdgResult};
use std::sync::Arc;

use crate::llm_client::ChatModel;
use crate::prompts::{PromptKind, PromptLibrary};

/// Produces the model's answer for retrieved context or full document text.
///
/// Output is returned as-is; the model is instructed to answer in HTML.
pub struct ResponseGenerator {
    model: Arc<dyn ChatModel>,
    prompts: PromptLibrary,
}

impl ResponseGenerator {
    pub fn new(model: Arc<dyn ChatModel>, prompts: PromptLibrary) -> Self {
        Self { model, prompts }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Single call over a retrieved context block.
    pub async fn analyze_context(&self, context: &str) -> ImdgResult<String> {
        self.run(PromptKind::Analysis, context).await
    }

    /// Summarizes the document, then classifies the summary.
    pub async fn summarize_then_analyze(&self, text: &str) -> ImdgResult<String> {
        let summary = self.run(PromptKind::Summarize, text).await?;
        tracing::debug!(summary_len = summary.len(), "Document summarized");
        self.run(PromptKind::Classify, &summary).await
    }

    async fn run(&self, kind: PromptKind, text: &str) -> ImdgResult<String> {
        let messages = self
            .prompts
            .messages(kind, text)
            .map_err(|e| ImdgError::internal(format!("{:#}", e)))?;

        self.model.complete(&messages).await.map_err(|e| {
            tracing::error!(error = %format!("{:#}", e), prompt = ?kind, "LLM call failed");
            ImdgError::external_service("LLM", format!("{:#}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::ChatMessage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Echoes the human message, wrapped in a paragraph.
    #[derive(Default)]
    struct EchoModel {
        calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl ChatModel for EchoModel {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
            self.calls.lock().unwrap().push(messages.to_vec());
            Ok(format!("<p>{}</p>", messages[1].content.len()))
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _messages: &[ChatMessage]) -> anyhow::Result<String> {
            anyhow::bail!("rate limited")
        }
    }

    #[tokio::test]
    async fn test_two_stage_feeds_summary_into_second_call() {
        let model = Arc::new(EchoModel::default());
        let generator = ResponseGenerator::new(model.clone(), PromptLibrary::new().unwrap());

        let result = generator.summarize_then_analyze("full msds text").await.unwrap();
        assert!(result.starts_with("<p>"));

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[0][1].content.contains("full msds text"));
        let first_output = format!("<p>{}</p>", calls[0][1].content.len());
        assert!(calls[1][1].content.ends_with(&first_output));
    }

    #[tokio::test]
    async fn test_llm_failure_is_external_service_error() {
        let generator = ResponseGenerator::new(Arc::new(FailingModel), PromptLibrary::new().unwrap());
        let err = generator.analyze_context("context").await.unwrap_err();
        assert_eq!(err.http_status_code(), 502);
        assert!(err.to_string().contains("rate limited"));
    }
}
