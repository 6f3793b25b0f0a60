//! Ingestion-time validation: transactions that can never be carried
//! through the pipeline are flagged `ignored` here rather than failing
//! deeper stages that assume well-formed input.

use crate::models::{Issue, Transaction, TransactionKind};

/// Parse `"new:old"`. Returns `None` on anything that doesn't split into
/// two positive integers.
pub fn parse_split_ratio(raw: &str) -> Option<(u32, u32)> {
    let (new, old) = raw.split_once(':')?;
    let new: u32 = new.trim().parse().ok()?;
    let old: u32 = old.trim().parse().ok()?;
    if new == 0 || old == 0 {
        return None;
    }
    Some((new, old))
}

/// Validate and flag transactions in place, returning the issues raised.
///
/// - A `StockSplit` whose `ratio` doesn't parse is marked `ignored` and
///   reported as `InvalidSplitRatio`.
/// - An acquisition with no `price` (e.g. an RSU lapse) is marked
///   `ignored` and reported as `IncompleteAcquisition`.
pub fn validate(transactions: &mut [Transaction]) -> Vec<Issue> {
    let mut issues = Vec::new();

    for tx in transactions.iter_mut() {
        if tx.ignored {
            continue;
        }

        if tx.kind == TransactionKind::StockSplit {
            let valid = tx.ratio.as_deref().and_then(parse_split_ratio).is_some();
            if !valid {
                issues.push(Issue::InvalidSplitRatio {
                    tx_id: tx.id.clone(),
                    raw: tx.ratio.clone().unwrap_or_default(),
                });
                tx.ignored = true;
                continue;
            }
        }

        let is_acquisition_kind = matches!(
            tx.kind,
            TransactionKind::Buy | TransactionKind::OptBuyToOpen | TransactionKind::OptBuyToClose
        );
        if is_acquisition_kind && tx.price.is_none() {
            issues.push(Issue::IncompleteAcquisition {
                tx_id: tx.id.clone(),
            });
            tx.ignored = true;
        }
    }

    issues
}
