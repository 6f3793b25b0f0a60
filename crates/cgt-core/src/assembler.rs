//! Disposal and tax-year assembly: folds the matcher stages' output
//! back into per-disposal records and per-tax-year summaries.

use crate::classifier;
use crate::exemption::{get_dividend_allowance, get_exemption};
use crate::models::{
    DisposalRecord, EnrichedTransaction, Matching, TaxPeriod, TaxYearSummary, TransactionKind,
};
use crate::ordering;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Build one [`DisposalRecord`] per disposal transaction that matcher
/// output touched, sorted by date then symbol.
pub fn assemble_disposals(
    transactions: &[EnrichedTransaction],
    matchings: &[Matching],
) -> Vec<DisposalRecord> {
    let mut by_disposal: HashMap<&str, Vec<&Matching>> = HashMap::new();
    for m in matchings {
        by_disposal.entry(m.disposal.as_str()).or_default().push(m);
    }

    let mut disposals: Vec<DisposalRecord> = transactions
        .iter()
        .filter(|tx| !tx.transaction.ignored && classifier::is_disposal(tx))
        .filter_map(|tx| {
            let legs = by_disposal.get(tx.transaction.id.as_str());
            let effective_quantity = classifier::effective_quantity(tx);

            let tx_matchings: Vec<Matching> = legs
                .map(|ms| ms.iter().map(|m| (*m).clone()).collect())
                .unwrap_or_default();

            let matched_quantity: Decimal =
                tx_matchings.iter().map(Matching::quantity_matched).sum();
            let allowable_costs_gbp: Decimal = tx_matchings
                .iter()
                .map(Matching::total_cost_basis_gbp)
                .sum();

            let contract_size = tx.transaction.effective_contract_size();
            let price = classifier::effective_price_gbp(tx).unwrap_or(Decimal::ZERO);
            let fee = tx.fee_gbp.unwrap_or(Decimal::ZERO);
            let proceeds_gbp = effective_quantity * price * contract_size - fee;

            let unmatched_quantity = (effective_quantity - matched_quantity).max(Decimal::ZERO);
            let tax_year = tx.tax_year?;

            Some(DisposalRecord {
                id: tx.transaction.id.clone(),
                symbol: tx.transaction.symbol.clone(),
                date: tx.transaction.date,
                tax_year,
                effective_quantity,
                proceeds_gbp,
                allowable_costs_gbp,
                gain_or_loss_gbp: proceeds_gbp - allowable_costs_gbp,
                matchings: tx_matchings,
                unmatched_quantity,
                is_incomplete: !unmatched_quantity.is_zero(),
            })
        })
        .collect();

    ordering::sort_by_date_symbol(&mut disposals, |d| d.date, |d| &d.symbol);
    disposals
}

/// Build per-tax-year summaries from assembled disposals plus dividend
/// transactions, sorted descending (most recent year first).
pub fn assemble_tax_year_summaries(
    transactions: &[EnrichedTransaction],
    disposals: &[DisposalRecord],
) -> Vec<TaxYearSummary> {
    let mut years: HashMap<i32, TaxYearSummary> = HashMap::new();

    fn summary_for(
        years: &mut HashMap<i32, TaxYearSummary>,
        period: TaxPeriod,
    ) -> &mut TaxYearSummary {
        years.entry(period.start_year()).or_insert_with(move || TaxYearSummary {
            tax_year: period,
            disposal_count: 0,
            total_proceeds_gbp: Decimal::ZERO,
            total_gains_gbp: Decimal::ZERO,
            total_losses_gbp: Decimal::ZERO,
            net_gain_gbp: Decimal::ZERO,
            annual_exempt_amount: get_exemption(period.start_year()),
            taxable_gain_gbp: Decimal::ZERO,
            dividend_count: 0,
            dividend_total_gbp: Decimal::ZERO,
            dividend_allowance: get_dividend_allowance(period.start_year()),
        })
    }

    for disposal in disposals {
        let summary = summary_for(&mut years, disposal.tax_year);
        summary.disposal_count += 1;
        summary.total_proceeds_gbp += disposal.proceeds_gbp;
        if disposal.gain_or_loss_gbp > Decimal::ZERO {
            summary.total_gains_gbp += disposal.gain_or_loss_gbp;
        } else if disposal.gain_or_loss_gbp < Decimal::ZERO {
            summary.total_losses_gbp += disposal.gain_or_loss_gbp.abs();
        }
    }

    for tx in transactions {
        if tx.transaction.ignored || tx.transaction.kind != TransactionKind::Dividend {
            continue;
        }
        let Some(period) = tx.tax_year else { continue };
        let amount = tx.value_gbp.unwrap_or(Decimal::ZERO);
        let summary = summary_for(&mut years, period);
        summary.dividend_count += 1;
        summary.dividend_total_gbp += amount;
    }

    let mut summaries: Vec<TaxYearSummary> = years.into_values().collect();
    for summary in &mut summaries {
        summary.net_gain_gbp = summary.total_gains_gbp - summary.total_losses_gbp;
        summary.taxable_gain_gbp =
            (summary.net_gain_gbp - summary.annual_exempt_amount).max(Decimal::ZERO);
    }
    summaries.sort_by(|a, b| b.tax_year.cmp(&a.tax_year));
    summaries
}
