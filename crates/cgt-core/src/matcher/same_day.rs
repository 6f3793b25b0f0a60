//! Same-day matcher (TCGA92 S105): acquisitions and disposals of the
//! same symbol on the same day are matched against each other before any
//! other rule sees them.

use super::{ResidualTracker, cost_per_unit_gbp};
use crate::classifier;
use crate::models::{AcquisitionMatch, EnrichedTransaction, MatchRule, Matching};
use chrono::NaiveDate;
use std::collections::HashMap;

pub fn run(
    transactions: &[EnrichedTransaction],
    _index: &HashMap<String, usize>,
    residual: &mut ResidualTracker,
) -> Vec<Matching> {
    let mut groups: HashMap<(&str, NaiveDate), (Vec<usize>, Vec<usize>)> = HashMap::new();

    for (i, tx) in transactions.iter().enumerate() {
        if tx.transaction.ignored {
            continue;
        }
        let key = (tx.transaction.symbol.as_str(), tx.transaction.date);
        if classifier::is_acquisition(tx) {
            groups.entry(key).or_default().0.push(i);
        } else if classifier::is_disposal(tx) {
            groups.entry(key).or_default().1.push(i);
        }
    }

    let mut matchings = Vec::new();

    for (acquisitions, disposals) in groups.into_values() {
        if acquisitions.is_empty() || disposals.is_empty() {
            continue;
        }
        let mut acq_cursor = 0usize;

        for &d in &disposals {
            let disposal_id = &transactions[d].transaction.id;
            let mut legs = Vec::new();

            while residual.remaining(disposal_id) > rust_decimal::Decimal::ZERO
                && acq_cursor < acquisitions.len()
            {
                let a = acquisitions[acq_cursor];
                let acq_tx = &transactions[a];
                let acq_id = &acq_tx.transaction.id;
                let acq_remaining = residual.remaining(acq_id);
                if acq_remaining.is_zero() {
                    acq_cursor += 1;
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

                if residual.remaining(acq_id).is_zero() {
                    acq_cursor += 1;
                }
            }

            if !legs.is_empty() {
                matchings.push(Matching {
                    disposal: disposal_id.clone(),
                    rule: MatchRule::SameDay,
                    acquisitions: legs,
                });
            }
        }
    }

    matchings
}
