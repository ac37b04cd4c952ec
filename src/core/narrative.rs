//! Narrative generation sits outside the deterministic core: it only ever
//! turns finished citations into prose.

use super::citation::Citation;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NarrativeError {
    #[error("narrative generation is disabled")]
    Disabled,
    #[error("narrative backend failed: {0}")]
    Backend(String),
}

pub trait Narrator: Send + Sync {
    fn narrate(
        &self,
        prompt: &str,
        grounding: Option<&str>,
        system: Option<&str>,
    ) -> Result<String, NarrativeError>;
}

/// Which narrator the pipeline is built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeBackend {
    #[default]
    Disabled,
    /// Deterministic text assembled from the citation and its grounding
    Offline,
}

impl NarrativeBackend {
    pub fn build(self) -> Box<dyn Narrator> {
        match self {
            NarrativeBackend::Disabled => Box::new(DisabledNarrator),
            NarrativeBackend::Offline => Box::new(OfflineNarrator),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNarrator;

impl Narrator for DisabledNarrator {
    fn narrate(&self, _: &str, _: Option<&str>, _: Option<&str>) -> Result<String, NarrativeError> {
        Err(NarrativeError::Disabled)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineNarrator;

impl Narrator for OfflineNarrator {
    fn narrate(
        &self,
        prompt: &str,
        grounding: Option<&str>,
        _system: Option<&str>,
    ) -> Result<String, NarrativeError> {
        let mut text = prompt.trim().to_string();
        if let Some(grounding) = grounding.map(str::trim).filter(|g| !g.is_empty()) {
            text.push_str("\n\nInstructions:\n");
            text.push_str(grounding);
        }
        Ok(text)
    }
}

pub const SYSTEM_PROMPT: &str = "You explain individual lines of a US Form 1040 \
return. The amounts are final; do not recompute or change them. Cite the source given.";

/// Prompt asking for an explanation of one cited line.
pub fn citation_prompt(citation: &Citation) -> String {
    format!(
        "Explain {} line \"{}\" to the taxpayer.\nSource: {}\nComputation: {}",
        citation.form, citation.line, citation.source, citation.justification
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation() -> Citation {
        Citation {
            form: "1040".to_string(),
            line: "taxable income".to_string(),
            source: "Form 1040 Instructions, Line 15".to_string(),
            justification: "Taxable income: $35,400.00".to_string(),
            grounding: None,
        }
    }

    #[test]
    fn disabled_backend_refuses() {
        let narrator = NarrativeBackend::Disabled.build();
        assert_eq!(
            narrator.narrate("hi", None, None),
            Err(NarrativeError::Disabled)
        );
    }

    #[test]
    fn offline_backend_includes_grounding() {
        let narrator = NarrativeBackend::Offline.build();
        let prompt = citation_prompt(&citation());
        let text = narrator
            .narrate(&prompt, Some("Subtract line 14 from line 11."), Some(SYSTEM_PROMPT))
            .unwrap();
        assert!(text.contains("taxable income"));
        assert!(text.contains("Subtract line 14"));
    }

    #[test]
    fn offline_backend_is_deterministic() {
        let narrator = OfflineNarrator;
        let prompt = citation_prompt(&citation());
        assert_eq!(
            narrator.narrate(&prompt, None, None),
            narrator.narrate(&prompt, None, None)
        );
    }
}
