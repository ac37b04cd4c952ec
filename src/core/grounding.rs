//! Instruction lookups used to attach reference text to citations.
//!
//! Nothing here influences a computed amount.

use super::citation::Citation;
use std::fs;
use std::path::{Path, PathBuf};

/// A hit from [`InstructionSource::find_text`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub source: String,
    pub line_number: usize,
    pub text: String,
}

pub trait InstructionSource: Send + Sync {
    /// Load a named source document. Returns false if it is unavailable.
    fn open_source(&mut self, name: &str) -> bool;

    fn find_text(&self, query: &str) -> Vec<TextMatch>;

    /// Instruction text for one line of `form`, e.g. `("schedule-se", "deduction")`
    fn instructions_for_line(&self, form: &str, line: &str) -> Option<String>;
}

/// Name of the instruction document covering a citation form.
///
/// `"1040"` maps to `"i1040"`, `"schedule-se"` to `"i1040sse"`.
pub fn instruction_document(form: &str) -> String {
    match form.strip_prefix("schedule-") {
        Some(schedule) => format!("i1040s{}", schedule.replace('-', "")),
        None => format!("i{}", form.replace('-', "")),
    }
}

/// Source with no documents; every lookup misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInstructions;

impl InstructionSource for NoInstructions {
    fn open_source(&mut self, _name: &str) -> bool {
        false
    }

    fn find_text(&self, _query: &str) -> Vec<TextMatch> {
        Vec::new()
    }

    fn instructions_for_line(&self, _form: &str, _line: &str) -> Option<String> {
        None
    }
}

/// Plain-text instruction documents read from a directory.
///
/// `open_source("i1040")` loads `<dir>/i1040.txt`. Documents are split into
/// paragraphs on blank lines. A paragraph belongs to a line when the form's
/// document is the one it came from and its first line contains the line
/// label as whole words.
#[derive(Debug, Clone)]
pub struct TextInstructions {
    dir: PathBuf,
    documents: Vec<(String, String)>,
}

impl TextInstructions {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        TextInstructions {
            dir: dir.into(),
            documents: Vec::new(),
        }
    }

    /// Open every `*.txt` file in the directory, in name order.
    pub fn open_all(dir: &Path) -> std::io::Result<Self> {
        let mut names: Vec<String> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().is_some_and(|e| e == "txt") {
                    path.file_stem().map(|s| s.to_string_lossy().into_owned())
                } else {
                    None
                }
            })
            .collect();
        names.sort();

        let mut source = TextInstructions::new(dir);
        for name in names {
            source.open_source(&name);
        }
        Ok(source)
    }

    #[cfg(test)]
    fn from_documents(documents: &[(&str, &str)]) -> Self {
        TextInstructions {
            dir: PathBuf::new(),
            documents: documents
                .iter()
                .map(|(name, text)| (name.to_string(), text.to_string()))
                .collect(),
        }
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

impl InstructionSource for TextInstructions {
    fn open_source(&mut self, name: &str) -> bool {
        if self.documents.iter().any(|(n, _)| n == name) {
            return true;
        }
        let path = self.dir.join(format!("{name}.txt"));
        match fs::read_to_string(&path) {
            Ok(text) => {
                log::debug!("Loaded instructions {}", path.display());
                self.documents.push((name.to_string(), text));
                true
            }
            Err(e) => {
                log::warn!("Instructions {} unavailable: {}", path.display(), e);
                false
            }
        }
    }

    fn find_text(&self, query: &str) -> Vec<TextMatch> {
        let needle = query.to_lowercase();
        self.documents
            .iter()
            .flat_map(|(name, text)| {
                let needle = &needle;
                text.lines().enumerate().filter_map(move |(i, line)| {
                    line.to_lowercase().contains(needle).then(|| TextMatch {
                        source: name.clone(),
                        line_number: i + 1,
                        text: line.trim().to_string(),
                    })
                })
            })
            .collect()
    }

    fn instructions_for_line(&self, form: &str, line: &str) -> Option<String> {
        let document = instruction_document(form);
        let (_, text) = self.documents.iter().find(|(name, _)| *name == document)?;
        paragraphs(text)
            .into_iter()
            .find(|p| p.lines().next().is_some_and(|heading| mentions(heading, line)))
            .map(str::to_string)
    }
}

/// Case-insensitive whole-word containment: "tax" matches "Line 16 - Tax"
/// but not "Line 15 - Taxable income".
fn mentions(heading: &str, label: &str) -> bool {
    let heading = heading.to_lowercase();
    let label = label.trim().to_lowercase();
    if label.is_empty() {
        return false;
    }
    heading.match_indices(&label).any(|(start, m)| {
        let before = heading[..start].chars().next_back();
        let after = heading[start + m.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

fn paragraphs(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                out.push(text[s..end].trim());
            }
        } else {
            start.get_or_insert(offset);
            end = offset + line.len();
        }
        offset += line.len();
    }
    if let Some(s) = start {
        out.push(text[s..end].trim());
    }
    out
}

/// Attach instruction text to each citation that has some.
pub fn ground_citations(citations: Vec<Citation>, source: &dyn InstructionSource) -> Vec<Citation> {
    citations
        .into_iter()
        .map(|citation| {
            let grounding = source.instructions_for_line(&citation.form, &citation.line);
            Citation {
                grounding: grounding.or(citation.grounding),
                ..citation
            }
        })
        .collect()
}
