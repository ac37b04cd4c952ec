use crate::core::NarrativeBackend;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Settings for a [`ReturnPipeline`](crate::tax::ReturnPipeline) run.
///
/// Loaded from a JSON file; command line flags override individual fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub tax_year: i32,
    pub narrative: NarrativeBackend,
    /// Directory of plain-text instruction files used to ground citations
    pub instructions_dir: Option<PathBuf>,
    /// Run the arithmetic verifier on every computed return
    pub verify: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            tax_year: 2024,
            narrative: NarrativeBackend::Disabled,
            instructions_dir: None,
            verify: false,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(file)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
