//! Section 104 pool matcher (TCGA92 S104): whatever residual quantity
//! survives the short-sell, same-day and 30-day rules is matched against
//! a running-average cost pool per symbol.

use super::{ResidualTracker, cost_per_unit_gbp};
use crate::classifier;
use crate::models::{AcquisitionMatch, EnrichedTransaction, MatchRule, Matching, Section104Pool};
use std::collections::HashMap;

enum EventKind {
    Acquisition,
    Disposal,
}

pub fn run(
    transactions: &[EnrichedTransaction],
    _index: &HashMap<String, usize>,
    residual: &mut ResidualTracker,
) -> (Vec<Matching>, HashMap<String, Section104Pool>) {
    let mut by_symbol: HashMap<&str, Vec<(usize, EventKind)>> = HashMap::new();

    for (i, tx) in transactions.iter().enumerate() {
        if tx.transaction.ignored {
            continue;
        }
        if classifier::is_acquisition(tx) {
            by_symbol
                .entry(&tx.transaction.symbol)
                .or_default()
                .push((i, EventKind::Acquisition));
        } else if classifier::is_disposal(tx) {
            by_symbol
                .entry(&tx.transaction.symbol)
                .or_default()
                .push((i, EventKind::Disposal));
        }
    }

    let mut matchings = Vec::new();
    let mut pools = HashMap::new();

    for (symbol, mut events) in by_symbol {
        events.sort_by_key(|(i, kind)| {
            let tie = match kind {
                EventKind::Acquisition => 0,
                EventKind::Disposal => 1,
            };
            (transactions[*i].transaction.date, tie, *i)
        });

        let mut pool = Section104Pool::zero();

        for (i, kind) in &events {
            let tx = &transactions[*i];
            let id = &tx.transaction.id;
            match kind {
                EventKind::Acquisition => {
                    let qty = residual.remaining(id);
                    if qty.is_zero() {
                        continue;
                    }
                    pool.quantity += qty;
                    pool.total_cost_gbp += cost_per_unit_gbp(tx) * qty;
                    residual.consume(id, qty);
                }
                EventKind::Disposal => {
                    let qty = residual.remaining(id);
                    if qty.is_zero() {
                        continue;
                    }
                    let matched = qty.min(pool.quantity);
                    if matched.is_zero() {
                        continue;
                    }
                    let cost = pool.average_cost_gbp() * matched;

                    matchings.push(Matching {
                        disposal: id.clone(),
                        rule: MatchRule::Section104,
                        acquisitions: vec![AcquisitionMatch {
                            tx_ref: format!("pool:{symbol}"),
                            quantity_matched: matched,
                            cost_basis_gbp: cost,
                        }],
                    });

                    pool.quantity -= matched;
                    pool.total_cost_gbp -= cost;
                    residual.consume(id, matched);
                }
            }
        }

        pools.insert(symbol.to_string(), pool);
    }

    (matchings, pools)
}
