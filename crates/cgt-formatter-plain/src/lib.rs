//! Plain text formatter for CGT tax reports.

use cgt_core::{CgtResult, DisposalRecord, Issue, MatchRule, Section104Pool, TransactionKind};
use cgt_format::{format_currency, format_date, format_decimal, format_tax_year};
use rust_decimal::Decimal;
use std::fmt::Write;

/// Format a `CgtResult` as plain text.
pub fn format(result: &CgtResult) -> String {
    let mut out = String::new();

    write_summary(&mut out, result);
    write_tax_year_details(&mut out, result);
    write_holdings(&mut out, result);
    write_transactions(&mut out, result);
    write_asset_events(&mut out, result);
    write_issues(&mut out, result);

    out.trim_end().to_string() + "\n"
}

fn write_summary(out: &mut String, result: &CgtResult) {
    let _ = writeln!(out, "# SUMMARY\n");
    let _ = writeln!(
        out,
        "{:<12}{:<12}{:<12}{:<14}Taxable gain",
        "Tax year", "Gain", "Proceeds", "Exemption"
    );
    let _ = writeln!(
        out,
        "=============================================================="
    );

    for year in &result.tax_year_summaries {
        let _ = writeln!(
            out,
            "{:<12}{:<12}{:<12}{:<14}{}",
            format_tax_year(year.tax_year.start_year()),
            format_currency(year.net_gain_gbp),
            format_currency(year.total_proceeds_gbp),
            format_currency(year.annual_exempt_amount),
            format_currency(year.taxable_gain_gbp)
        );
    }
}

fn write_tax_year_details(out: &mut String, result: &CgtResult) {
    let _ = writeln!(out, "\n# TAX YEAR DETAILS");

    for year in &result.tax_year_summaries {
        let _ = writeln!(out, "\n## {}\n", format_tax_year(year.tax_year.start_year()));

        let mut disposals: Vec<&DisposalRecord> = result
            .disposals
            .iter()
            .filter(|d| d.tax_year == year.tax_year)
            .collect();
        disposals.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.symbol.cmp(&b.symbol)));

        if disposals.is_empty() {
            let _ = writeln!(out, "NONE");
            continue;
        }

        for (i, disposal) in disposals.iter().enumerate() {
            format_disposal(out, i + 1, disposal);
        }

        if year.dividend_count > 0 {
            let _ = writeln!(
                out,
                "Dividends: {} totalling {} (allowance {})",
                year.dividend_count,
                format_currency(year.dividend_total_gbp),
                format_currency(year.dividend_allowance)
            );
        }
    }
}

fn write_holdings(out: &mut String, result: &CgtResult) {
    let _ = writeln!(out, "\n# HOLDINGS\n");
    let mut active: Vec<(&String, &Section104Pool)> = result
        .section_104_pools
        .iter()
        .filter(|(_, pool)| pool.quantity > Decimal::ZERO)
        .collect();
    active.sort_by(|a, b| a.0.cmp(b.0));

    if active.is_empty() {
        let _ = writeln!(out, "NONE");
    } else {
        for (symbol, pool) in active {
            let _ = writeln!(
                out,
                "{}: {} units at {} avg cost",
                symbol,
                format_decimal(pool.quantity),
                format_currency(pool.average_cost_gbp())
            );
        }
    }
}

fn write_transactions(out: &mut String, result: &CgtResult) {
    let _ = writeln!(out, "\n# TRANSACTIONS\n");
    let mut txns: Vec<_> = result
        .transactions
        .iter()
        .filter(|t| {
            !t.transaction.ignored
                && matches!(t.transaction.kind, TransactionKind::Buy | TransactionKind::Sell)
        })
        .collect();
    txns.sort_by(|a, b| {
        a.transaction
            .date
            .cmp(&b.transaction.date)
            .then_with(|| a.transaction.symbol.cmp(&b.transaction.symbol))
    });

    for t in txns {
        let tx = &t.transaction;
        let verb = match tx.kind {
            TransactionKind::Buy => "BUY",
            TransactionKind::Sell => "SELL",
            _ => unreachable!(),
        };
        let qty = tx.quantity.unwrap_or(Decimal::ZERO);
        let price = t.price_gbp.unwrap_or(Decimal::ZERO);
        let fee = t.fee_gbp.unwrap_or(Decimal::ZERO);
        let _ = writeln!(
            out,
            "{} {} {} {} @ {} ({} fees)",
            format_date(tx.date),
            verb,
            format_decimal(qty),
            tx.symbol,
            format_currency(price),
            format_currency(fee)
        );
    }
}

fn write_asset_events(out: &mut String, result: &CgtResult) {
    let mut events: Vec<_> = result
        .transactions
        .iter()
        .filter(|t| {
            !t.transaction.ignored
                && matches!(
                    t.transaction.kind,
                    TransactionKind::Dividend | TransactionKind::StockSplit
                )
        })
        .collect();
    events.sort_by(|a, b| {
        a.transaction
            .date
            .cmp(&b.transaction.date)
            .then_with(|| a.transaction.symbol.cmp(&b.transaction.symbol))
    });

    if events.is_empty() {
        return;
    }

    let _ = writeln!(out, "\n# ASSET EVENTS\n");
    for t in events {
        let tx = &t.transaction;
        match tx.kind {
            TransactionKind::Dividend => {
                let value = t.value_gbp.unwrap_or(Decimal::ZERO);
                let _ = writeln!(
                    out,
                    "{} DIVIDEND {} {}",
                    format_date(tx.date),
                    tx.symbol,
                    format_currency(value)
                );
            }
            TransactionKind::StockSplit => {
                let ratio = tx.ratio.clone().unwrap_or_default();
                let _ = writeln!(out, "{} SPLIT {} {}", format_date(tx.date), tx.symbol, ratio);
            }
            _ => {}
        }
    }
}

fn write_issues(out: &mut String, result: &CgtResult) {
    if result.issues.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n# ISSUES\n");
    for issue in &result.issues {
        let line = match issue {
            Issue::FxResolution { tx_id, message } => format!("{tx_id}: FX resolution: {message}"),
            Issue::SplitFeedFailure { message } => format!("split feed failure: {message}"),
            Issue::InvalidSplitRatio { tx_id, raw } => {
                format!("{tx_id}: invalid split ratio '{raw}'")
            }
            Issue::IncompleteDisposal {
                disposal_id,
                unmatched_quantity,
            } => format!(
                "{disposal_id}: incomplete disposal, {} units unmatched",
                format_decimal(*unmatched_quantity)
            ),
            Issue::IncompleteAcquisition { tx_id } => format!("{tx_id}: incomplete acquisition"),
        };
        let _ = writeln!(out, "{line}");
    }
}

fn format_disposal(out: &mut String, index: usize, disposal: &DisposalRecord) {
    let gain_type = if disposal.gain_or_loss_gbp >= Decimal::ZERO {
        "GAIN"
    } else {
        "LOSS"
    };

    let _ = writeln!(
        out,
        "{}) SELL {} {} on {} - {} {}",
        index,
        format_decimal(disposal.effective_quantity),
        disposal.symbol,
        format_date(disposal.date),
        gain_type,
        format_currency(disposal.gain_or_loss_gbp.abs())
    );

    for m in &disposal.matchings {
        let quantity = m.quantity_matched();
        match m.rule {
            MatchRule::ShortSell => {
                let _ = writeln!(out, "   Short cover: {} shares", format_decimal(quantity));
            }
            MatchRule::SameDay => {
                let _ = writeln!(out, "   Same Day: {} shares", format_decimal(quantity));
            }
            MatchRule::ThirtyDay => {
                let _ = writeln!(out, "   B&B (30-day): {} shares", format_decimal(quantity));
            }
            MatchRule::Section104 => {
                let cost_per_share = if quantity != Decimal::ZERO {
                    m.total_cost_basis_gbp() / quantity
                } else {
                    Decimal::ZERO
                };
                let _ = writeln!(
                    out,
                    "   Section 104: {} shares @ {}",
                    format_decimal(quantity),
                    format_currency(cost_per_share)
                );
            }
        }
    }

    let _ = writeln!(out, "   Proceeds: {}", format_currency(disposal.proceeds_gbp));
    let _ = writeln!(out, "   Cost: {}", format_currency(disposal.allowable_costs_gbp));
    if disposal.is_incomplete {
        let _ = writeln!(
            out,
            "   Unmatched: {} shares",
            format_decimal(disposal.unmatched_quantity)
        );
    }
    let _ = writeln!(out, "   Result: {}\n", format_currency(disposal.gain_or_loss_gbp));
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgt_core::{Matching, TaxPeriod};
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn empty_result() -> CgtResult {
        CgtResult {
            transactions: vec![],
            disposals: vec![],
            section_104_pools: HashMap::new(),
            tax_year_summaries: vec![],
            issues: vec![],
            metadata: cgt_core::Metadata {
                calculated_at: Utc::now(),
                total_transactions: 0,
                total_buys: 0,
                total_sells: 0,
                total_issues: 0,
            },
        }
    }

    #[test]
    fn empty_result_produces_empty_sections() {
        let result = empty_result();
        let output = format(&result);
        assert!(output.contains("# SUMMARY"));
        assert!(output.contains("# HOLDINGS"));
        assert!(output.contains("NONE"));
    }

    #[test]
    fn disposal_with_section104_match_shows_cost_per_share() {
        let mut result = empty_result();
        let tax_year = TaxPeriod::new(2018).unwrap();
        result.disposals.push(DisposalRecord {
            id: "s1".into(),
            symbol: "AAPL".into(),
            date: NaiveDate::from_ymd_opt(2018, 8, 28).unwrap(),
            tax_year,
            effective_quantity: dec!(10),
            proceeds_gbp: dec!(342.02),
            allowable_costs_gbp: dec!(540.65),
            gain_or_loss_gbp: dec!(-198.63),
            matchings: vec![Matching {
                disposal: "s1".into(),
                rule: MatchRule::Section104,
                acquisitions: vec![cgt_core::AcquisitionMatch {
                    tx_ref: "pool:AAPL".into(),
                    quantity_matched: dec!(10),
                    cost_basis_gbp: dec!(540.65),
                }],
            }],
            unmatched_quantity: Decimal::ZERO,
            is_incomplete: false,
        });
        result.tax_year_summaries.push(cgt_core::TaxYearSummary {
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
        assert!(output.contains("Section 104: 10 shares @ £54.07"));
        assert!(output.contains("Result: -£198.63"));
    }

    #[test]
    fn incomplete_disposal_notes_unmatched_quantity() {
        let mut result = empty_result();
        let tax_year = TaxPeriod::new(2020).unwrap();
        result.disposals.push(DisposalRecord {
            id: "s2".into(),
            symbol: "TSLA".into(),
            date: NaiveDate::from_ymd_opt(2020, 5, 1).unwrap(),
            tax_year,
            effective_quantity: dec!(5),
            proceeds_gbp: dec!(500),
            allowable_costs_gbp: dec!(200),
            gain_or_loss_gbp: dec!(300),
            matchings: vec![],
            unmatched_quantity: dec!(5),
            is_incomplete: true,
        });
        result.issues.push(Issue::IncompleteDisposal {
            disposal_id: "s2".into(),
            unmatched_quantity: dec!(5),
        });
        result.tax_year_summaries.push(cgt_core::TaxYearSummary {
            tax_year,
            disposal_count: 1,
            total_proceeds_gbp: dec!(500),
            total_gains_gbp: dec!(300),
            total_losses_gbp: Decimal::ZERO,
            net_gain_gbp: dec!(300),
            annual_exempt_amount: dec!(12300),
            taxable_gain_gbp: Decimal::ZERO,
            dividend_count: 0,
            dividend_total_gbp: Decimal::ZERO,
            dividend_allowance: Decimal::ZERO,
        });

        let output = format(&result);
        assert!(output.contains("Unmatched: 5 shares"));
        assert!(output.contains("# ISSUES"));
        assert!(output.contains("incomplete disposal"));
    }
}
