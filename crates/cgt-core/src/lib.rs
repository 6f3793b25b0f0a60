//! UK Capital Gains Tax computation engine.
//!
//! Turns a stream of brokerage transactions into audited disposal
//! records, Section 104 pool snapshots, and per-tax-year summaries
//! under TCGA92 S104, S105, S106A and S127.

pub mod assembler;
pub mod classifier;
pub mod config;
pub mod dsl;
pub mod error;
pub mod exemption;
pub mod formatting;
pub mod matcher;
pub mod models;
pub mod ordering;
pub mod parser;
pub mod pipeline;
pub mod providers;
pub mod tax_year;
pub mod validation;

pub use config::Config;
pub use error::CgtError;
pub use exemption::{get_dividend_allowance, get_exemption};
pub use models::*;
pub use validation::validate;
