//! Split normaliser: forward-project quantities and prices onto a single
//! post-split unit so later passes never need to know about TCGA92 S127
//! share reorganisations.

use crate::models::{EnrichedTransaction, StockSplitEvent, TransactionKind};
use rust_decimal::Decimal;

/// Apply split adjustment to every non-split transaction, leaving split
/// transactions themselves at multiplier 1.
pub fn normalise(transactions: &mut [EnrichedTransaction], events: &[StockSplitEvent]) {
    for tx in transactions.iter_mut() {
        if tx.transaction.ignored || tx.transaction.kind == TransactionKind::StockSplit {
            tx.split_multiplier = Decimal::ONE;
            continue;
        }

        let future_splits: Vec<&StockSplitEvent> = events
            .iter()
            .filter(|s| s.symbol == tx.transaction.symbol && s.date > tx.transaction.date)
            .collect();

        if future_splits.is_empty() {
            tx.split_multiplier = Decimal::ONE;
            tx.split_adjusted_quantity = tx.transaction.quantity;
            tx.split_adjusted_price = tx.transaction.price;
            continue;
        }

        let cumulative: Decimal = future_splits
            .iter()
            .fold(Decimal::ONE, |acc, s| acc * s.ratio_multiplier);

        tx.split_multiplier = cumulative;
        tx.applied_splits = future_splits
            .iter()
            .map(|s| format!("{}@{}", s.symbol, s.date))
            .collect();
        tx.split_adjusted_quantity = tx.transaction.quantity.map(|q| q * cumulative);
        tx.split_adjusted_price = tx.transaction.price.map(|p| p / cumulative);
    }
}
