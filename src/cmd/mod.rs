pub mod compute;
pub mod explain;
pub mod schema;
pub mod tables;
pub mod verify;

use crate::config::PipelineConfig;
use crate::core::{read_tax_input_json, TaxInput};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Read a return input document (or stdin with "-")
pub fn read_input(path: &Path) -> anyhow::Result<TaxInput> {
    let bytes = read_source(path)?;
    read_tax_input_json(io::Cursor::new(bytes))
}

/// Raw bytes of a file, or of stdin with "-"
pub fn read_source(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        read_from_stdin()
    } else {
        read_from_file(path)
    }
}

fn read_from_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    let file = File::open(path)
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path.display(), e))?;
    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}

fn read_from_stdin() -> anyhow::Result<Vec<u8>> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }
    Ok(buffer)
}

/// Load the config file if given, then apply command line overrides.
pub fn load_config(
    path: Option<&Path>,
    year: Option<i32>,
    instructions: Option<&PathBuf>,
) -> anyhow::Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(year) = year {
        config.tax_year = year;
    }
    if let Some(dir) = instructions {
        config.instructions_dir = Some(dir.clone());
    }
    Ok(config)
}
