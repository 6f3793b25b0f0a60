use anyhow::{Context, Result};
use cgt_core::parser::parse_file;
use cgt_core::providers::{CancellationToken, NoopSplitFeed};
use cgt_core::{Transaction, pipeline, validation};
use chrono::Datelike;
use clap::Parser;
use schemars::schema_for;
use std::fs;

mod commands;
mod fx_provider;

use commands::{Commands, OutputFormat};
use fx_provider::FolderFxProvider;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Parse { file, schema } => {
            if *schema {
                let schema = schema_for!(Vec<Transaction>);
                println!("{}", serde_json::to_string_pretty(&schema)?);
                return Ok(());
            }

            if let Some(path) = file {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let transactions = parse_file(&content)?;
                println!("{}", serde_json::to_string_pretty(&transactions)?);
            }
        }
        Commands::Validate { file } => {
            let content =
                fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
            let mut transactions = parse_file(&content)?;
            let issues = validation::validate(&mut transactions);
            println!("{}", serde_json::to_string_pretty(&issues)?);
        }
        Commands::Report {
            file,
            fx_dir,
            current_year,
            format,
        } => {
            let content =
                fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
            let transactions = parse_file(&content)?;

            let fx_provider: Box<dyn cgt_core::providers::FxProvider> = match fx_dir {
                Some(dir) => Box::new(
                    FolderFxProvider::load(dir)
                        .with_context(|| format!("loading FX rates from {}", dir.display()))?,
                ),
                None => {
                    log::warn!("no --fx-dir supplied; foreign-currency transactions will fail FX resolution");
                    Box::new(FolderFxProvider::empty())
                }
            };

            let split_feed = NoopSplitFeed;
            let cancel = CancellationToken::new();
            let current_year = current_year.unwrap_or_else(|| chrono::Utc::now().date_naive().year());

            let result = pipeline::run(
                transactions,
                fx_provider.as_ref(),
                &split_feed,
                &cancel,
                current_year,
            )
            .await?;

            match format {
                OutputFormat::Plain => print!("{}", cgt_formatter_plain::format(&result)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            }
        }
    }

    Ok(())
}
