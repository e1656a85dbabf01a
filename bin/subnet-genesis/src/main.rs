//! Subnet Genesis CLI
//!
//! Synthesizes, checks and indexes subnet genesis documents from a parameter
//! file.
//!
//! Usage:
//!   subnet-genesis generate --params subnet.toml --out genesis.json --index index.json
//!   subnet-genesis check --params subnet.toml --artifacts ./bytecode
//!   subnet-genesis index --params subnet.toml --path config.feeConfig

#![allow(missing_docs)]

mod args;
mod check;
mod generate;
mod inspect;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Subnet genesis tool
#[derive(Debug, Parser)]
#[command(name = "subnet-genesis")]
#[command(about = "Synthesize and validate subnet genesis documents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the genesis document
    Generate(generate::GenerateArgs),
    /// Print the validation report; fails unless ready for submission
    Check(check::CheckArgs),
    /// Print the path index of the rendered document
    Index(inspect::IndexArgs),
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    match Cli::parse().command {
        Command::Generate(args) => args.run().await,
        Command::Check(args) => args.run().await,
        Command::Index(args) => args.run().await,
    }
}
