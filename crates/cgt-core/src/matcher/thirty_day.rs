//! 30-day "bed & breakfast" matcher (TCGA92 S106A): a disposal is matched
//! against acquisitions of the same symbol made in the 30 days *after*
//! it, oldest acquisition first.

use super::{ResidualTracker, cost_per_unit_gbp};
use crate::classifier;
use crate::models::{AcquisitionMatch, EnrichedTransaction, MatchRule, Matching};
use chrono::Duration;
use std::collections::HashMap;

const WINDOW_DAYS: i64 = 30;

pub fn run(
    transactions: &[EnrichedTransaction],
    _index: &HashMap<String, usize>,
    residual: &mut ResidualTracker,
) -> Vec<Matching> {
    let mut by_symbol: HashMap<&str, (Vec<usize>, Vec<usize>)> = HashMap::new();

    for (i, tx) in transactions.iter().enumerate() {
        if tx.transaction.ignored {
            continue;
        }
        let entry = by_symbol.entry(&tx.transaction.symbol).or_default();
        if classifier::is_disposal(tx) {
            entry.1.push(i);
        } else if classifier::is_acquisition(tx) {
            entry.0.push(i);
        }
    }

    let mut matchings = Vec::new();

    for (mut acquisitions, mut disposals) in by_symbol.into_values() {
        acquisitions.sort_by_key(|&i| (transactions[i].transaction.date, i));
        disposals.sort_by_key(|&i| (transactions[i].transaction.date, i));

        for &d in &disposals {
            let disposal_tx = &transactions[d];
            let disposal_id = &disposal_tx.transaction.id;
            if residual.remaining(disposal_id).is_zero() {
                continue;
            }
            let window_end = disposal_tx.transaction.date + Duration::days(WINDOW_DAYS);

            let mut legs = Vec::new();
            for &a in &acquisitions {
                if residual.remaining(disposal_id).is_zero() {
                    break;
                }
                let acq_tx = &transactions[a];
                if acq_tx.transaction.date <= disposal_tx.transaction.date
                    || acq_tx.transaction.date > window_end
                {
                    continue;
                }
                let acq_id = &acq_tx.transaction.id;
                let acq_remaining = residual.remaining(acq_id);
                if acq_remaining.is_zero() {
                    continue;
                }
                let matched = residual.remaining(disposal_id).min(acq_remaining);
                let cost = cost_per_unit_gbp(acq_tx) * matched;

                legs.push(AcquisitionMatch {
                    tx_ref: acq_id.clone(),
                    quantity_matched: matched,
                    cost_basis_gbp: cost,
                });

                residual.consume(disposal_id, matched);
                residual.consume(acq_id, matched);
            }

            if !legs.is_empty() {
                matchings.push(Matching {
                    disposal: disposal_id.clone(),
                    rule: MatchRule::ThirtyDay,
                    acquisitions: legs,
                });
            }
        }
    }

    matchings
}
