//! Keyword gate deciding whether extracted text looks like an MSDS.

use imdg_utils::{GateConfig, MatchMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Accepted,
    Rejected { missing: Vec<String> },
}

impl GateDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

#[derive(Debug, Clone)]
pub struct ContentGate {
    keywords: Vec<String>,
    match_mode: MatchMode,
}

impl ContentGate {
    pub fn new<I, S>(keywords: I, match_mode: MatchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            match_mode,
        }
    }

    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(&config.keywords, config.match_mode)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Case-insensitive substring check against every keyword.
    pub fn check(&self, text: &str) -> GateDecision {
        let lowered = text.to_lowercase();
        let missing: Vec<String> = self
            .keywords
            .iter()
            .filter(|k| !lowered.contains(k.as_str()))
            .cloned()
            .collect();

        let accepted = match self.match_mode {
            MatchMode::All => missing.is_empty(),
            MatchMode::Any => missing.len() < self.keywords.len(),
        };

        if accepted {
            GateDecision::Accepted
        } else {
            GateDecision::Rejected { missing }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imdg_utils::AppConfig;

    fn default_gate() -> ContentGate {
        ContentGate::from_config(&AppConfig::default().gate)
    }

    #[test]
    fn test_all_mode_requires_every_keyword() {
        let gate = default_gate();
        assert!(gate.check("Lembar Data Keselamatan / Safety Data Sheet").is_accepted());
        assert_eq!(
            gate.check("Material Safety Data Sheet"),
            GateDecision::Rejected {
                missing: vec!["keselamatan".to_string()]
            }
        );
        assert!(!gate.check("Invoice 2024-113").is_accepted());
    }

    #[test]
    fn test_any_mode_accepts_single_keyword() {
        let gate = ContentGate::new(["safety", "keselamatan"], MatchMode::Any);
        assert!(gate.check("material SAFETY data sheet").is_accepted());
        assert!(gate.check("lembar data keselamatan").is_accepted());
        assert!(!gate.check("quarterly report").is_accepted());
    }

    #[test]
    fn test_keywords_normalised() {
        let gate = ContentGate::new(["  Safety ", ""], MatchMode::All);
        assert_eq!(gate.keywords(), &["safety".to_string()]);
    }
}
