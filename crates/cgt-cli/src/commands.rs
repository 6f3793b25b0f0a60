use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a transaction file and print the decoded transactions as JSON
    Parse {
        /// Input file path
        #[arg(required_unless_present = "schema")]
        file: Option<PathBuf>,

        /// Print the JSON schema instead of parsing a file
        #[arg(long)]
        schema: bool,
    },
    /// Run the full CGT calculation and print a report
    Report {
        /// Input file path
        file: PathBuf,

        /// Directory of HMRC monthly exchange rate XML files
        #[arg(long)]
        fx_dir: Option<PathBuf>,

        /// Calendar year used for "current year" split-feed lookups
        #[arg(long)]
        current_year: Option<i32>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Parse and validate a transaction file without running the matchers
    Validate {
        /// Input file path
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}
