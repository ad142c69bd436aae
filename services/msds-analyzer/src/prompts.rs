//! Prompt templates
//!
//! Handlebars templates rendered without HTML escaping; document text is
//! inserted verbatim.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde_json::json;

use crate::llm_client::ChatMessage;

const ANALYSIS_SYSTEM: &str = "You are an expert in analyzing Material Safety Data Sheets (MSDS) based on the International Maritime Dangerous Goods (IMDG) Code. Your task is to:
IMDG Classification: Identify the correct IMDG classification for the goods, including their UN number, class, and packing group.
Handling, Packaging, and Package to be used: Provide detailed guidelines on safe handling, including necessary precautions and equipment during transport. Recommend the correct packaging according to IMDG regulations, and tell the users about the type of containers, packages required, and specify the package that needs to be used.
Loading Decision: Confidently decide whether the material can be safely loaded onto a ship. Consider compatibility with other cargo, environmental risks, and overall vessel safety.
Responsibility: You are fully responsible for ensuring the correct decision is made regarding loading and storage. Any mistakes will be your responsibility.
Your response must be formatted in HTML tag so that it can be rendered neatly in the web browser and written in concise Indonesian language. Any failure to follow these instructions will have consequences.";

const ANALYSIS_HUMAN: &str = "{{text}}";

const SUMMARIZE_SYSTEM: &str =
    "You are a helpful assistant that can summarize material safety datasheet text";

const SUMMARIZE_HUMAN: &str = "summarize, shorten, and extract the key points of this material safety datasheet so that it can be analyzed based on IMDG guide, make sure your response is brief: {{text}} ";

const CLASSIFY_SYSTEM: &str = "You are a helpful assistant THAT SPEAK INDONESIAN LANGUAGE who can classify a dangerous goods, determine the packaging strategy, what needs to be used to package it, and 'DECIDE' whether or not it can be loaded in the ship based on IMDG, and dont forget to format the response using HTML tag format such as <h>, <p>, <li>, etc. it is mandatory, you will be punished if you don't format it using html tag!!!";

const CLASSIFY_HUMAN: &str = "based on this information, determine the classification, the packaging strategy to be used, and the package to be used briefly. and decide can it be loaded in the ship, it is mandatory to make the decision: \n{{text}}";

/// Named system/human template pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Retrieved context to final answer.
    Analysis,
    /// Full document text to summary.
    Summarize,
    /// Summary to final answer.
    Classify,
}

impl PromptKind {
    fn system_template(self) -> &'static str {
        match self {
            Self::Analysis => "analysis_system",
            Self::Summarize => "summarize_system",
            Self::Classify => "classify_system",
        }
    }

    fn human_template(self) -> &'static str {
        match self {
            Self::Analysis => "analysis_human",
            Self::Summarize => "summarize_human",
            Self::Classify => "classify_human",
        }
    }
}

pub struct PromptLibrary {
    handlebars: Handlebars<'static>,
}

impl PromptLibrary {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        for (name, template) in [
            ("analysis_system", ANALYSIS_SYSTEM),
            ("analysis_human", ANALYSIS_HUMAN),
            ("summarize_system", SUMMARIZE_SYSTEM),
            ("summarize_human", SUMMARIZE_HUMAN),
            ("classify_system", CLASSIFY_SYSTEM),
            ("classify_human", CLASSIFY_HUMAN),
        ] {
            handlebars
                .register_template_string(name, template)
                .with_context(|| format!("Invalid prompt template '{}'", name))?;
        }

        Ok(Self { handlebars })
    }

    /// System and human messages for `kind` with `text` substituted.
    pub fn messages(&self, kind: PromptKind, text: &str) -> Result<Vec<ChatMessage>> {
        let data = json!({ "text": text });
        let system = self
            .handlebars
            .render(kind.system_template(), &data)
            .context("Failed to render system prompt")?;
        let human = self
            .handlebars
            .render(kind.human_template(), &data)
            .context("Failed to render human prompt")?;

        Ok(vec![ChatMessage::system(system), ChatMessage::user(human)])
    }
}
