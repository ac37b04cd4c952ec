mod cmd;
mod config;
mod core;
mod tax;

use clap::{Parser, Subcommand};
use cmd::{
    compute::ComputeCommand, explain::ExplainCommand, schema::SchemaCommand,
    tables::TablesCommand, verify::VerifyCommand,
};

#[derive(Parser, Debug)]
#[command(name = "taxline")]
#[command(version, about = "Compute and verify a US individual income tax return")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a return from a JSON input document
    Compute(ComputeCommand),
    /// Re-check the arithmetic of a JSON report
    Verify(VerifyCommand),
    /// Explain how one line was computed
    Explain(ExplainCommand),
    /// Show the bracket tables in use
    Tables(TablesCommand),
    /// Print the JSON Schema of the input document
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Compute(cmd) => cmd.exec(),
        Command::Verify(cmd) => cmd.exec(),
        Command::Explain(cmd) => cmd.exec(),
        Command::Tables(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
