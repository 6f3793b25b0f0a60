//! End-to-end coverage through the public surface: DSL text in, a
//! [`CgtResult`] out, exercising `parse_file` + `pipeline::run` together
//! rather than any single stage in isolation.

#![allow(clippy::unwrap_used)]

use cgt_core::models::{Currency, MatchRule};
use cgt_core::parser::parse_file;
use cgt_core::providers::{CancellationToken, FxProvider, FxProviderError, FxRate, NoopSplitFeed};
use cgt_core::{CgtError, pipeline};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

struct GbpOnly;

#[async_trait]
impl FxProvider for GbpOnly {
    async fn get_rate(&self, _date: NaiveDate, _currency: Currency) -> Result<FxRate, FxProviderError> {
        Ok(FxRate { rate: Decimal::ONE })
    }
}

async fn run_dsl(dsl: &str, current_year: i32) -> cgt_core::CgtResult {
    let transactions = parse_file(dsl).unwrap();
    let cancel = CancellationToken::new();
    pipeline::run(transactions, &GbpOnly, &NoopSplitFeed, &cancel, current_year)
        .await
        .unwrap()
}

/// Per TCGA92/S106A(9), the 30-day rule is "subject to" same-day matching:
/// a later same-day acquisition reserves shares before an earlier disposal's
/// bed-and-breakfast leg can claim them.
#[tokio::test]
async fn same_day_reserves_shares_ahead_of_an_earlier_disposals_thirty_day_match() {
    let dsl = "\
2024-01-01 BUY SNAP id=buy0 qty=200 price=10.00\n\
2024-02-01 SELL SNAP id=sell1 qty=100 price=12.00\n\
2024-02-02 BUY SNAP id=buy2 qty=80 price=11.00\n\
2024-02-02 SELL SNAP id=sell2 qty=50 price=11.50\n";

    let result = run_dsl(dsl, 2024).await;
    let by_id = |id: &str| result.disposals.iter().find(|d| d.id == id).unwrap();

    let sell1 = by_id("sell1");
    assert_eq!(sell1.matchings.len(), 2);
    let thirty_day = sell1
        .matchings
        .iter()
        .find(|m| m.rule == MatchRule::ThirtyDay)
        .expect("sell1 should have a thirty-day leg");
    assert_eq!(thirty_day.quantity_matched(), dec!(30));
    let pool_leg = sell1
        .matchings
        .iter()
        .find(|m| m.rule == MatchRule::Section104)
        .expect("sell1 should fall back to the pool for the rest");
    assert_eq!(pool_leg.quantity_matched(), dec!(70));

    let sell2 = by_id("sell2");
    assert_eq!(sell2.matchings.len(), 1);
    assert_eq!(sell2.matchings[0].rule, MatchRule::SameDay);
    assert_eq!(sell2.matchings[0].quantity_matched(), dec!(50));
}

#[tokio::test]
async fn oversell_is_reported_as_an_incomplete_disposal_not_a_fatal_error() {
    let dsl = "\
2024-01-01 BUY ACME id=buy1 qty=5 price=10.00\n\
2024-06-01 SELL ACME id=sell1 qty=10 price=12.00\n";

    let result = run_dsl(dsl, 2024).await;
    let disposal = &result.disposals[0];
    assert!(disposal.is_incomplete);
    assert_eq!(disposal.unmatched_quantity, dec!(5));
    assert!(
        result
            .issues
            .iter()
            .any(|i| matches!(i, cgt_core::models::Issue::IncompleteDisposal { disposal_id, .. } if disposal_id == "sell1"))
    );
}

#[tokio::test]
async fn exemption_reduces_taxable_gain_for_the_disposal_year() {
    let dsl = "\
2024-01-01 BUY ACME id=buy1 qty=100 price=10.00\n\
2024-06-01 SELL ACME id=sell1 qty=100 price=15.00\n";

    let result = run_dsl(dsl, 2024).await;
    assert_eq!(result.tax_year_summaries.len(), 1);
    let summary = &result.tax_year_summaries[0];
    assert_eq!(summary.net_gain_gbp, dec!(500));
    assert_eq!(summary.annual_exempt_amount, dec!(3000));
    assert_eq!(summary.taxable_gain_gbp, Decimal::ZERO);
}

#[tokio::test]
async fn a_sell_with_no_prior_acquisition_is_still_an_incomplete_disposal() {
    let dsl = "2024-06-01 SELL ACME id=sell1 qty=10 price=12.00\n";
    let result = run_dsl(dsl, 2024).await;
    assert_eq!(result.disposals.len(), 1);
    assert!(result.disposals[0].is_incomplete);
    assert_eq!(result.disposals[0].unmatched_quantity, dec!(10));
}

#[tokio::test]
async fn cancellation_before_any_work_short_circuits_a_parsed_run() {
    let dsl = "2024-01-01 BUY ACME id=buy1 qty=10 price=10.00\n";
    let transactions = parse_file(dsl).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = pipeline::run(transactions, &GbpOnly, &NoopSplitFeed, &cancel, 2024).await;
    assert!(matches!(result, Err(CgtError::Cancelled)));
}
