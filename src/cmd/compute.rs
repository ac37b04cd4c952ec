//! Compute command - run the full return and print every line

use crate::cmd::{load_config, read_input};
use crate::core::{display_amount, Citation, LineItem};
use crate::tax::{ReturnPipeline, ReturnReport, VerificationResult};
use clap::Args;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ComputeCommand {
    /// JSON return input, or "-" to read stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Pipeline config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tax year (overrides the config file)
    #[arg(short, long)]
    year: Option<i32>,

    /// Directory of instruction text files used to ground citations
    #[arg(long)]
    instructions: Option<PathBuf>,

    /// Run the arithmetic verifier on the computed return
    #[arg(long)]
    verify: bool,

    /// Print the citation for every computed line
    #[arg(long)]
    citations: bool,

    /// Output the full report as JSON
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output line items as CSV
    #[arg(long)]
    csv: bool,
}

impl ComputeCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut config =
            load_config(self.config.as_deref(), self.year, self.instructions.as_ref())?;
        if self.verify {
            config.verify = true;
        }
        let pipeline = ReturnPipeline::from_config(&config)?;
        let input = read_input(&self.input)?;
        let report = pipeline.process(input)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else if self.csv {
            self.write_csv(&report.tax_return.line_items())?;
        } else {
            self.print_report(&report);
        }
        Ok(())
    }

    fn print_report(&self, report: &ReturnReport) {
        let tax_return = &report.tax_return;
        println!();
        println!(
            "FORM 1040 ({}, {})",
            tax_return.tax_year, tax_return.filing_status
        );
        println!();

        let rows: Vec<LineRow> = tax_return
            .line_items()
            .into_iter()
            .filter(|item| item.form == "1040" || !item.amount.is_zero())
            .map(LineRow::display)
            .collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::last()).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!();

        let form = &tax_return.form_1040;
        if form.amount_owed.is_zero() {
            println!("REFUND: {}", display_amount(form.refund));
        } else {
            println!("AMOUNT OWED: {}", display_amount(form.amount_owed));
        }

        if let Some(verification) = &report.verification {
            println!();
            print_verification(verification);
        }

        if self.citations {
            println!();
            print_citations(&tax_return.citations);
        }

        println!();
        println!("Input digest: {}", report.input_digest);
    }

    fn write_csv(&self, items: &[LineItem]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for item in items {
            wtr.serialize(LineRow::plain(item))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Row for the line item table and CSV output
#[derive(Debug, Clone, Tabled, Serialize)]
struct LineRow {
    #[tabled(rename = "Form")]
    form: String,

    #[tabled(rename = "Line")]
    line: String,

    #[tabled(rename = "Description")]
    label: String,

    #[tabled(rename = "Amount")]
    amount: String,
}

impl LineRow {
    fn display(item: LineItem) -> Self {
        LineRow {
            form: item.form.to_string(),
            line: item.number.to_string(),
            label: item.label.to_string(),
            amount: display_amount(item.amount),
        }
    }

    fn plain(item: &LineItem) -> Self {
        LineRow {
            form: item.form.to_string(),
            line: item.number.to_string(),
            label: item.label.to_string(),
            amount: format!("{:.2}", item.amount),
        }
    }
}

pub fn print_verification(result: &VerificationResult) {
    if result.passed {
        println!("\u{2713} Verification ({}) passed", result.verifier);
    } else {
        println!(
            "\u{2717} Verification ({}) failed with {} error(s):",
            result.verifier,
            result.errors.len()
        );
        for (i, error) in result.errors.iter().enumerate() {
            println!(
                "  {}. [{:?}/{:?}] {} {}: {}",
                i + 1,
                error.category,
                error.severity,
                error.form,
                error.line,
                error.message
            );
        }
    }
    for warning in &result.warnings {
        println!("\u{26A0} {}", warning);
    }
}

fn print_citations(citations: &[Citation]) {
    println!("CITATIONS");
    for citation in citations {
        println!("  [{}] {} - {}", citation.form, citation.line, citation.source);
        println!("      {}", citation.justification);
        if let Some(grounding) = &citation.grounding {
            for line in grounding.lines() {
                println!("      > {}", line);
            }
        }
    }
}
