//! The four-stage CGT matcher: short-sell, same-day, 30-day, Section 104,
//! run in that strict order so no disposal quantity is matched by a
//! later rule that an earlier rule could have claimed.

pub mod same_day;
pub mod section104;
pub mod short_sell;
pub mod thirty_day;

use crate::classifier;
use crate::models::{EnrichedTransaction, GainGroup, MatchRule, Matching, Section104Pool};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Tracks how much of each transaction's effective quantity is still
/// unclaimed as matchers run in sequence, so no quantity is double-matched.
pub struct ResidualTracker {
    remaining: HashMap<String, Decimal>,
}

impl ResidualTracker {
    pub fn new(transactions: &[EnrichedTransaction]) -> Self {
        let mut remaining = HashMap::new();
        for tx in transactions {
            if tx.transaction.ignored || tx.fx_source == "Failed" {
                continue;
            }
            if classifier::is_acquisition(tx) || classifier::is_disposal(tx) {
                remaining.insert(
                    tx.transaction.id.clone(),
                    classifier::effective_quantity(tx),
                );
            }
        }
        Self { remaining }
    }

    pub fn remaining(&self, id: &str) -> Decimal {
        self.remaining.get(id).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn consume(&mut self, id: &str, quantity: Decimal) {
        if let Some(r) = self.remaining.get_mut(id) {
            *r = (*r - quantity).max(Decimal::ZERO);
        }
    }
}

/// Build an id -> index lookup once, shared by every matcher stage.
pub fn index_by_id(transactions: &[EnrichedTransaction]) -> HashMap<String, usize> {
    transactions
        .iter()
        .enumerate()
        .map(|(i, tx)| (tx.transaction.id.clone(), i))
        .collect()
}

/// Run all four matcher stages in order and fold their output back onto
/// the transactions (`gain_group`, `match_groups`). Returns the combined
/// matching list and the final Section 104 pool snapshot.
pub fn run_all(
    transactions: &mut [EnrichedTransaction],
) -> (Vec<Matching>, HashMap<String, Section104Pool>) {
    let index = index_by_id(transactions);
    let mut residual = ResidualTracker::new(transactions);

    let mut matchings = Vec::new();
    matchings.extend(short_sell::run(transactions, &index, &mut residual));
    matchings.extend(same_day::run(transactions, &index, &mut residual));
    matchings.extend(thirty_day::run(transactions, &index, &mut residual));
    let (section104_matchings, pools) = section104::run(transactions, &index, &mut residual);
    matchings.extend(section104_matchings);

    apply_matchings(transactions, &index, &matchings);

    (matchings, pools)
}

fn gain_group_for(rule: MatchRule) -> GainGroup {
    match rule {
        MatchRule::ShortSell => GainGroup::ShortSell,
        MatchRule::SameDay => GainGroup::SameDay,
        MatchRule::ThirtyDay => GainGroup::ThirtyDay,
        MatchRule::Section104 => GainGroup::Section104,
    }
}

fn apply_matchings(
    transactions: &mut [EnrichedTransaction],
    index: &HashMap<String, usize>,
    matchings: &[Matching],
) {
    for matching in matchings {
        if let Some(&i) = index.get(&matching.disposal) {
            transactions[i].gain_group = gain_group_for(matching.rule);
            transactions[i].match_groups.push(matching.disposal.clone());
        }
        for acquisition in &matching.acquisitions {
            if let Some(&i) = index.get(&acquisition.tx_ref) {
                if transactions[i].gain_group == GainGroup::None {
                    transactions[i].gain_group = gain_group_for(matching.rule);
                }
                transactions[i].match_groups.push(matching.disposal.clone());
            }
        }
    }
}

/// Per-unit allowable cost for an acquisition leg: price + fee spread
/// across the quantity being acquired, times contract size.
pub fn cost_per_unit_gbp(tx: &EnrichedTransaction) -> Decimal {
    let price = classifier::effective_price_gbp(tx).unwrap_or(Decimal::ZERO);
    let fee = tx.fee_gbp.unwrap_or(Decimal::ZERO);
    let qty = classifier::effective_quantity(tx);
    let fee_per_unit = if qty.is_zero() {
        Decimal::ZERO
    } else {
        fee / (qty * tx.transaction.effective_contract_size())
    };
    (price + fee_per_unit) * tx.transaction.effective_contract_size()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, Transaction, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn buy(id: &str, quantity: Decimal) -> EnrichedTransaction {
        let mut tx = EnrichedTransaction::from_transaction(Transaction {
            id: id.into(),
            source: "test".into(),
            symbol: "AAPL".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            kind: TransactionKind::Buy,
            quantity: Some(quantity),
            price: Some(Decimal::from(10)),
            currency: Currency::GBP,
            total: None,
            fee: None,
            ratio: None,
            is_short_sell: None,
            underlying: None,
            opt_type: None,
            strike: None,
            expiration: None,
            contract_size: None,
            ignored: false,
        });
        tx.price_gbp = Some(Decimal::from(10));
        tx.fee_gbp = Some(Decimal::ZERO);
        tx
    }

    #[test]
    fn residual_tracker_starts_at_effective_quantity_and_floors_at_zero() {
        let txs = vec![buy("b1", Decimal::from(10))];
        let mut tracker = ResidualTracker::new(&txs);
        assert_eq!(tracker.remaining("b1"), Decimal::from(10));
        tracker.consume("b1", Decimal::from(15));
        assert_eq!(tracker.remaining("b1"), Decimal::ZERO);
    }

    #[test]
    fn unknown_id_has_zero_residual() {
        let tracker = ResidualTracker::new(&[]);
        assert_eq!(tracker.remaining("missing"), Decimal::ZERO);
    }

    #[test]
    fn residual_tracker_excludes_fx_failed_transactions() {
        let mut tx = buy("b1", Decimal::from(10));
        tx.fx_source = "Failed".into();
        tx.price_gbp = None;
        let tracker = ResidualTracker::new(&[tx]);
        assert_eq!(tracker.remaining("b1"), Decimal::ZERO);
    }

    #[test]
    fn cost_per_unit_gbp_spreads_fee_across_quantity_and_contract_size() {
        let mut tx = EnrichedTransaction::from_transaction(Transaction {
            id: "opt1".into(),
            source: "test".into(),
            symbol: "AAPL".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            kind: TransactionKind::OptBuyToOpen,
            quantity: Some(Decimal::from(2)),
            price: Some(Decimal::from(10)),
            currency: Currency::GBP,
            total: None,
            fee: Some(Decimal::from(100)),
            ratio: None,
            is_short_sell: None,
            underlying: Some("AAPL".into()),
            opt_type: None,
            strike: None,
            expiration: None,
            contract_size: Some(100),
            ignored: false,
        });
        tx.price_gbp = Some(Decimal::from(10));
        tx.fee_gbp = Some(Decimal::from(100));

        // price*contract_size + fee/qty per unit: (10*100) + (100/2) = 1050,
        // not the overcounted (10 + 100/2)*100 = 6000 the old fee/qty split produced.
        assert_eq!(cost_per_unit_gbp(&tx), dec!(1050));
    }
}
