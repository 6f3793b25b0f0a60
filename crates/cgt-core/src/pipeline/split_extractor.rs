//! Split extractor & auto-split reconciler.

use crate::models::{Issue, StockSplitEvent, Transaction, TransactionKind};
use crate::providers::SplitFeed;
use crate::validation::parse_split_ratio;
use chrono::Datelike;
use rust_decimal::Decimal;
use std::collections::HashSet;

const DEDUP_WINDOW_DAYS: i64 = 7;
const MAX_YEAR_SPAN: i32 = 50;

pub struct SplitExtractionOutcome {
    /// Externally-sourced splits that survived dedup, as synthetic
    /// transactions for the record (`source = "Community"`).
    pub synthetic_transactions: Vec<Transaction>,
    /// The merged, sorted broker + external split list C4 consumes.
    pub events: Vec<StockSplitEvent>,
    pub issues: Vec<Issue>,
}

fn parse_broker_event(tx: &Transaction) -> Option<StockSplitEvent> {
    if tx.ignored || tx.kind != TransactionKind::StockSplit {
        return None;
    }
    let (new, old) = parse_split_ratio(tx.ratio.as_deref()?)?;
    Some(StockSplitEvent {
        symbol: tx.symbol.clone(),
        date: tx.date,
        ratio_from: new,
        ratio_to: old,
        ratio_multiplier: Decimal::from(new) / Decimal::from(old),
        source: tx.source.clone(),
    })
}

fn year_range(transactions: &[Transaction], current_year: i32) -> Vec<i32> {
    let years: Vec<i32> = transactions
        .iter()
        .filter(|t| !t.ignored)
        .map(|t| t.date.year())
        .collect();
    let min_year = years.iter().copied().min().unwrap_or(current_year);
    let max_year = years.iter().copied().max().unwrap_or(current_year).max(current_year);
    let span = (max_year - min_year + 1).min(MAX_YEAR_SPAN);
    let start = max_year - span + 1;
    (start..=max_year).collect()
}

/// Fetch externally-sourced splits and merge them with broker-reported
/// ones, dropping external records within [`DEDUP_WINDOW_DAYS`] of a
/// broker split on the same symbol regardless of ratio.
pub async fn extract_splits(
    transactions: &[Transaction],
    feed: &dyn SplitFeed,
    current_year: i32,
) -> SplitExtractionOutcome {
    let mut issues = Vec::new();

    let broker_events: Vec<StockSplitEvent> =
        transactions.iter().filter_map(parse_broker_event).collect();

    let held_symbols: HashSet<&str> = transactions
        .iter()
        .filter(|t| !t.ignored)
        .map(|t| t.symbol.as_str())
        .collect();

    let years = year_range(transactions, current_year);

    let external_records = match feed.fetch_splits_for_years(&years).await {
        Ok(records) => records,
        Err(err) => {
            issues.push(Issue::SplitFeedFailure {
                message: err.0.clone(),
            });
            Vec::new()
        }
    };

    let mut synthetic_transactions = Vec::new();
    let mut surviving_external = Vec::new();

    for record in external_records {
        if !held_symbols.contains(record.symbol.as_str()) {
            continue;
        }
        let is_duplicate = broker_events.iter().any(|b| {
            b.symbol == record.symbol && (b.date - record.date).num_days().abs() <= DEDUP_WINDOW_DAYS
        });
        if is_duplicate {
            continue;
        }

        let id = format!("auto-split-{}-{}", record.symbol, record.date);
        synthetic_transactions.push(Transaction {
            id: id.clone(),
            source: "Community".to_string(),
            symbol: record.symbol.clone(),
            date: record.date,
            kind: TransactionKind::StockSplit,
            quantity: None,
            price: None,
            currency: crate::models::Currency::GBP,
            total: None,
            fee: None,
            ratio: Some(format!("{}:{}", record.ratio_to, record.ratio_from)),
            is_short_sell: None,
            underlying: None,
            opt_type: None,
            strike: None,
            expiration: None,
            contract_size: None,
            ignored: false,
        });

        surviving_external.push(StockSplitEvent {
            symbol: record.symbol,
            date: record.date,
            ratio_from: record.ratio_to,
            ratio_to: record.ratio_from,
            ratio_multiplier: Decimal::from(record.ratio_to) / Decimal::from(record.ratio_from),
            source: "Community".to_string(),
        });
    }

    let mut events = broker_events;
    events.extend(surviving_external);
    events.sort_by_key(|e| e.date);

    SplitExtractionOutcome {
        synthetic_transactions,
        events,
        issues,
    }
}
