//! Tests for cgt-formatter-plain lib.rs (plain text report formatting)

#![allow(clippy::expect_used)]

use cgt_core::{
    AcquisitionMatch, CgtResult, DisposalRecord, MatchRule, Matching, Metadata, TaxPeriod,
    TaxYearSummary,
};
use cgt_formatter_plain::format;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

fn empty_result() -> CgtResult {
    CgtResult {
        transactions: vec![],
        disposals: vec![],
        section_104_pools: HashMap::new(),
        tax_year_summaries: vec![],
        issues: vec![],
        metadata: Metadata {
            calculated_at: Utc::now(),
            total_transactions: 0,
            total_buys: 0,
            total_sells: 0,
            total_issues: 0,
        },
    }
}

#[test]
fn summary_section_lists_each_tax_year() {
    let mut result = empty_result();
    result.tax_year_summaries.push(TaxYearSummary {
        tax_year: TaxPeriod::new(2018).unwrap(),
        disposal_count: 1,
        total_proceeds_gbp: dec!(342.02),
        total_gains_gbp: Decimal::ZERO,
        total_losses_gbp: dec!(198.63),
        net_gain_gbp: dec!(-198.63),
        annual_exempt_amount: dec!(11700),
        taxable_gain_gbp: Decimal::ZERO,
        dividend_count: 0,
        dividend_total_gbp: Decimal::ZERO,
        dividend_allowance: Decimal::ZERO,
    });

    let output = format(&result);
    assert!(output.contains("2018/19"));
    assert!(output.contains("-£198.63"));
}

#[test]
fn same_day_match_is_labelled_in_tax_year_details() {
    let mut result = empty_result();
    let tax_year = TaxPeriod::new(2018).unwrap();
    result.disposals.push(DisposalRecord {
        id: "s1".into(),
        symbol: "GB00B41YBW71".into(),
        date: NaiveDate::from_ymd_opt(2018, 8, 28).unwrap(),
        tax_year,
        effective_quantity: dec!(10),
        proceeds_gbp: dec!(342.02),
        allowable_costs_gbp: dec!(540.65),
        gain_or_loss_gbp: dec!(-198.63),
        matchings: vec![Matching {
            disposal: "s1".into(),
            rule: MatchRule::SameDay,
            acquisitions: vec![AcquisitionMatch {
                tx_ref: "a1".into(),
                quantity_matched: dec!(10),
                cost_basis_gbp: dec!(540.65),
            }],
        }],
        unmatched_quantity: Decimal::ZERO,
        is_incomplete: false,
    });
    result.tax_year_summaries.push(TaxYearSummary {
        tax_year,
        disposal_count: 1,
        total_proceeds_gbp: dec!(342.02),
        total_gains_gbp: Decimal::ZERO,
        total_losses_gbp: dec!(198.63),
        net_gain_gbp: dec!(-198.63),
        annual_exempt_amount: dec!(11700),
        taxable_gain_gbp: Decimal::ZERO,
        dividend_count: 0,
        dividend_total_gbp: Decimal::ZERO,
        dividend_allowance: Decimal::ZERO,
    });

    let output = format(&result);
    assert!(output.contains("Same Day: 10 shares"));
    assert!(output.contains("Proceeds: £342.02"));
    assert!(output.contains("Result: -£198.63"));
}

#[test]
fn holdings_section_lists_open_section_104_pools() {
    let mut result = empty_result();
    result.section_104_pools.insert(
        "AAPL".into(),
        cgt_core::Section104Pool {
            quantity: dec!(25),
            total_cost_gbp: dec!(3750),
        },
    );

    let output = format(&result);
    assert!(output.contains("AAPL: 25 units at £150.00 avg cost"));
}

#[test]
fn empty_result_shows_none_for_holdings() {
    let result = empty_result();
    let output = format(&result);
    assert!(output.contains("# HOLDINGS"));
    assert!(output.contains("NONE"));
}
