//! Short-sell matcher: FIFO cover-matching of explicit short positions.
//! Runs before same-day so an option sell-to-open covered the same day
//! doesn't fall through to the same-day rule.

use super::{ResidualTracker, cost_per_unit_gbp};
use crate::classifier;
use crate::models::{EnrichedTransaction, MatchRule, Matching, AcquisitionMatch};
use std::collections::{HashMap, VecDeque};

enum EventKind {
    Short,
    Acquisition,
}

pub fn run(
    transactions: &[EnrichedTransaction],
    _index: &HashMap<String, usize>,
    residual: &mut ResidualTracker,
) -> Vec<Matching> {
    let mut by_symbol: HashMap<&str, Vec<(usize, EventKind)>> = HashMap::new();

    for (i, tx) in transactions.iter().enumerate() {
        if tx.transaction.ignored {
            continue;
        }
        if classifier::is_disposal(tx) && tx.transaction.is_short_sell == Some(true) {
            by_symbol
                .entry(&tx.transaction.symbol)
                .or_default()
                .push((i, EventKind::Short));
        } else if classifier::is_acquisition(tx) {
            by_symbol
                .entry(&tx.transaction.symbol)
                .or_default()
                .push((i, EventKind::Acquisition));
        }
    }

    let mut matchings = Vec::new();

    for events in by_symbol.values_mut() {
        events.sort_by_key(|(i, kind)| {
            let tie = match kind {
                EventKind::Short => 0,
                EventKind::Acquisition => 1,
            };
            (transactions[*i].transaction.date, tie, *i)
        });

        let mut open_shorts: VecDeque<String> = VecDeque::new();

        for (i, kind) in events.iter() {
            let tx = &transactions[*i];
            let id = &tx.transaction.id;
            match kind {
                EventKind::Short => {
                    if residual.remaining(id) > rust_decimal::Decimal::ZERO {
                        open_shorts.push_back(id.clone());
                    }
                }
                EventKind::Acquisition => {
                    while residual.remaining(id) > rust_decimal::Decimal::ZERO {
                        let Some(short_id) = open_shorts.front().cloned() else {
                            break;
                        };
                        let short_remaining = residual.remaining(&short_id);
                        if short_remaining.is_zero() {
                            open_shorts.pop_front();
                            continue;
                        }
                        let matched = residual.remaining(id).min(short_remaining);
                        let cost = cost_per_unit_gbp(tx) * matched;

                        matchings.push(Matching {
                            disposal: short_id.clone(),
                            rule: MatchRule::ShortSell,
                            acquisitions: vec![AcquisitionMatch {
                                tx_ref: id.clone(),
                                quantity_matched: matched,
                                cost_basis_gbp: cost,
                            }],
                        });

                        residual.consume(&short_id, matched);
                        residual.consume(id, matched);

                        if residual.remaining(&short_id).is_zero() {
                            open_shorts.pop_front();
                        }
                    }
                }
            }
        }
    }

    matchings
}
