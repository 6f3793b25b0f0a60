use pest_consume::Error as PestConsumeError;
use thiserror::Error;

/// Fatal errors. Most per-transaction problems are non-fatal and are
/// carried as [`crate::models::Issue`] values instead of aborting a run.
#[derive(Error, Debug)]
pub enum CgtError {
    #[error("pipeline cancelled")]
    Cancelled,

    #[error("parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<crate::parser::Rule>>),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("invalid tax year {0}: out of valid range (1900-2199)")]
    InvalidTaxYear(i32),

    #[error("invalid currency code '{code}': not a recognized ISO 4217 currency")]
    InvalidCurrencyCode { code: String },
}

impl From<PestConsumeError<crate::parser::Rule>> for CgtError {
    fn from(err: PestConsumeError<crate::parser::Rule>) -> Self {
        CgtError::ParseError(Box::new(err.renamed_rules(|rule| format!("{rule:?}"))))
    }
}
