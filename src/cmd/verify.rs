//! Verify command - re-check the arithmetic of a saved JSON report

use crate::cmd::compute::print_verification;
use crate::cmd::read_source;
use crate::tax::{ArithmeticVerifier, Form1040};
use clap::Args;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct VerifyCommand {
    /// JSON report produced by `compute --json`, or "-" to read stdin
    #[arg(default_value = "-")]
    report: PathBuf,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// The part of a saved report the verifier needs
#[derive(Debug, Deserialize)]
struct SavedReport {
    form_1040: Form1040,
}

impl VerifyCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let bytes = read_source(&self.report)?;
        let report: SavedReport = serde_json::from_slice(&bytes)?;
        let result = ArithmeticVerifier.verify(&report.form_1040);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!();
            print_verification(&result);
            println!();
        }

        // Exit with code 1 if verification failed
        if !result.passed {
            std::process::exit(1);
        }
        Ok(())
    }
}
