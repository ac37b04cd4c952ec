//! Explain command - describe how one line of the return was computed

use crate::cmd::{load_config, read_input};
use crate::core::{display_amount, NarrativeBackend, NarrativeError};
use crate::tax::ReturnPipeline;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ExplainCommand {
    /// JSON return input, or "-" to read stdin
    input: PathBuf,

    /// Line label, e.g. "taxable income"
    #[arg(short, long)]
    line: String,

    /// Pipeline config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of instruction text files used to ground citations
    #[arg(long)]
    instructions: Option<PathBuf>,

    /// Narrative backend (overrides the config file)
    #[arg(long, value_enum)]
    narrative: Option<NarrativeArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NarrativeArg {
    Disabled,
    Offline,
}

impl From<NarrativeArg> for NarrativeBackend {
    fn from(arg: NarrativeArg) -> Self {
        match arg {
            NarrativeArg::Disabled => NarrativeBackend::Disabled,
            NarrativeArg::Offline => NarrativeBackend::Offline,
        }
    }
}

impl ExplainCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut config = load_config(self.config.as_deref(), None, self.instructions.as_ref())?;
        if let Some(narrative) = self.narrative {
            config.narrative = narrative.into();
        }
        let pipeline = ReturnPipeline::from_config(&config)?;
        let input = read_input(&self.input)?.validate(pipeline.year().year())?;
        let tax_return = pipeline.run(&input)?;

        let Some(citation) = tax_return.citation_for(&self.line) else {
            anyhow::bail!("No computed line labelled '{}'", self.line);
        };

        match pipeline.explain(&tax_return, &self.line) {
            Ok(text) => println!("{}", text),
            Err(NarrativeError::Disabled) => {
                log::info!("Narrative disabled, printing the citation");
                println!("{} {} ({})", citation.form, citation.line, citation.source);
                println!("{}", citation.justification);
                if let Some(grounding) = &citation.grounding {
                    println!();
                    println!("{}", grounding);
                }
            }
            Err(e) => return Err(e.into()),
        }
        if let Some(amount) = tax_return.amount(&citation.form, &citation.line) {
            println!();
            println!("Amount: {}", display_amount(amount));
        }
        Ok(())
    }
}
