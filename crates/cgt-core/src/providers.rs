//! External collaborators the pipeline consumes but never implements
//! itself: exchange rates and stock-split data.

use crate::models::{Currency, Transaction};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct FxProviderError(pub String);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxRate {
    pub rate: Decimal,
    // Whether `rate` is GBP-per-foreign-unit or foreign-units-per-GBP is
    // the provider's business; the engine always divides (see `enrich::fx`).
}

/// Resolves an exchange rate for `(date, currency)`. Implementations are
/// expected to cache internally; the engine never re-fetches a rate it
/// has already asked for within a single run.
#[async_trait]
pub trait FxProvider: Send + Sync {
    async fn get_rate(&self, date: NaiveDate, currency: Currency) -> Result<FxRate, FxProviderError>;

    /// Best-effort warmup hook; providers that can batch-fetch should
    /// override this. The default does nothing.
    async fn prefetch(&self, _transactions: &[Transaction]) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub ratio_from: u32,
    pub ratio_to: u32,
    pub name: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Error, Clone)]
#[error("{0}")]
pub struct SplitFeedError(pub String);

/// Supplies externally-sourced stock splits, queried by calendar year.
#[async_trait]
pub trait SplitFeed: Send + Sync {
    async fn fetch_splits_for_years(&self, years: &[i32]) -> Result<Vec<SplitRecord>, SplitFeedError>;
}

/// A `SplitFeed` with no external data, for callers who only trust
/// broker-reported splits.
pub struct NoopSplitFeed;

#[async_trait]
impl SplitFeed for NoopSplitFeed {
    async fn fetch_splits_for_years(&self, _years: &[i32]) -> Result<Vec<SplitRecord>, SplitFeedError> {
        Ok(Vec::new())
    }
}

/// Cooperative cancellation signal observed at the two suspension points
/// (split-feed fetch and FX resolution). Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
