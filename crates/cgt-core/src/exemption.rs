//! UK Capital Gains Tax annual exemption and dividend allowance amounts.

use crate::config::Config;
use rust_decimal::Decimal;
use std::sync::OnceLock;

static CONFIG: OnceLock<Config> = OnceLock::new();

fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::load_with_overrides)
}

/// Annual exempt amount for individuals, by tax-year start. Total over all
/// years — config overrides take precedence, everything else falls back to
/// this formula, so there is no "unsupported year" case.
fn default_exemption(year: i32) -> Decimal {
    match year {
        y if y >= 2024 => Decimal::from(3000),
        2023 => Decimal::from(6000),
        2020..=2022 => Decimal::from(12300),
        2019 => Decimal::from(12000),
        2018 => Decimal::from(11700),
        2017 => Decimal::from(11300),
        2015 | 2016 => Decimal::from(11100),
        _ => Decimal::from(11000),
    }
}

/// Dividend allowance for individuals, by tax-year start.
fn default_dividend_allowance(year: i32) -> Decimal {
    match year {
        y if y >= 2024 => Decimal::from(500),
        2023 => Decimal::from(1000),
        2018..=2022 => Decimal::from(2000),
        2016 | 2017 => Decimal::from(5000),
        _ => Decimal::ZERO,
    }
}

/// Get the UK annual CGT exemption for a tax-year start, applying any
/// configured override ahead of the built-in formula.
pub fn get_exemption(year: i32) -> Decimal {
    get_config()
        .exemptions
        .get(&year)
        .copied()
        .unwrap_or_else(|| default_exemption(year))
}

/// Get the dividend allowance for a tax-year start.
pub fn get_dividend_allowance(year: i32) -> Decimal {
    get_config()
        .dividend_allowances
        .get(&year)
        .copied()
        .unwrap_or_else(|| default_dividend_allowance(year))
}
