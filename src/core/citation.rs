use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Audit-trail entry linking a computed line to its authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Form that produced the line, e.g. "1040" or "schedule-se"
    pub form: String,
    /// Stable line label
    pub line: String,
    /// Authoritative source tag, e.g. "Form 1040 Instructions, Line 15"
    pub source: String,
    pub justification: String,
    /// Instruction text attached after the fact by an instruction source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding: Option<String>,
}

impl Citation {
    /// Key used when citations from several forms are merged.
    pub fn key(&self) -> String {
        format!("{} {}", self.form, self.line)
    }
}

/// Append-only citation log owned by a single unit for a single computation.
///
/// Entries cannot be removed or edited; `finish` hands them over to the
/// output record.
#[derive(Debug)]
pub struct CitationLog {
    form: &'static str,
    entries: Vec<Citation>,
}

impl CitationLog {
    pub fn new(form: &'static str) -> Self {
        CitationLog {
            form,
            entries: Vec::new(),
        }
    }

    pub fn cite(&mut self, line: &str, source: &str, justification: impl Into<String>) {
        let justification = justification.into();
        log::trace!("{} {}: {}", self.form, line, justification);
        self.entries.push(Citation {
            form: self.form.to_string(),
            line: line.to_string(),
            source: source.to_string(),
            justification,
            grounding: None,
        });
    }

    pub fn finish(self) -> Vec<Citation> {
        self.entries
    }
}

/// Collapse citations to `"form line" -> source`, later entries winning.
pub fn source_map(citations: &[Citation]) -> BTreeMap<String, String> {
    citations
        .iter()
        .map(|c| (c.key(), c.source.clone()))
        .collect()
}
