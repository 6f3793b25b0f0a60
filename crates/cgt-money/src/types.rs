//! Supporting types for the monthly FX rate cache.

use iso_currency::Currency;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::SystemTime;

/// Lookup key for one currency's rate in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RateKey {
    pub code: Currency,
    pub year: i32,
    pub month: u32,
}

impl RateKey {
    pub fn new(code: Currency, year: i32, month: u32) -> Self {
        Self { code, year, month }
    }
}

/// Where a rate entry came from, for traceability when rates are reloaded
/// from an updated file.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSource {
    pub path: PathBuf,
    pub period: Option<String>,
    pub modified: Option<SystemTime>,
}

/// A single currency/month exchange rate, expressed as units of foreign
/// currency per one GBP (HMRC's publication convention).
#[derive(Debug, Clone, PartialEq)]
pub struct RateEntry {
    pub key: RateKey,
    pub rate_per_gbp: Decimal,
    pub source: RateSource,
    pub minor_units: u8,
    pub symbol: Option<String>,
}
