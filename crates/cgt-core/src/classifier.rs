//! Effective-quantity / acquisition-disposal classifier.
//!
//! A canonical view over the mixed stock/option transaction kinds so the
//! matcher stages never need to branch on `kind` themselves.

use crate::models::{EnrichedTransaction, TransactionKind};
use rust_decimal::Decimal;

/// True for transactions that add to a holding.
pub fn is_acquisition(tx: &EnrichedTransaction) -> bool {
    match tx.transaction.kind {
        TransactionKind::Buy | TransactionKind::OptBuyToOpen | TransactionKind::OptBuyToClose => {
            true
        }
        TransactionKind::OptExpired | TransactionKind::OptAssigned => {
            tx.transaction.quantity.unwrap_or(Decimal::ZERO) >= Decimal::ZERO
        }
        _ => false,
    }
}

/// True for transactions that reduce a holding.
pub fn is_disposal(tx: &EnrichedTransaction) -> bool {
    match tx.transaction.kind {
        TransactionKind::Sell | TransactionKind::OptSellToClose | TransactionKind::OptSellToOpen => {
            true
        }
        TransactionKind::OptExpired | TransactionKind::OptAssigned => {
            tx.transaction.quantity.unwrap_or(Decimal::ZERO) < Decimal::ZERO
        }
        _ => false,
    }
}

/// Absolute share/contract-equivalent quantity, preferring the
/// split-adjusted figure when one has been computed.
pub fn effective_quantity(tx: &EnrichedTransaction) -> Decimal {
    let raw = tx
        .split_adjusted_quantity
        .or(tx.transaction.quantity)
        .unwrap_or(Decimal::ZERO);
    raw.abs()
}

/// GBP price per unit, preferring the split-adjusted figure.
pub fn effective_price_gbp(tx: &EnrichedTransaction) -> Option<Decimal> {
    tx.split_adjusted_price_gbp.or(tx.price_gbp)
}
