use crate::types::{RateEntry, RateKey};
use iso_currency::Currency;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct FxCache {
    rates: HashMap<RateKey, RateEntry>,
}

impl FxCache {
    pub fn new() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    pub fn insert(&mut self, entry: RateEntry) {
        self.rates.insert(entry.key.clone(), entry);
    }

    pub fn extend(&mut self, entries: Vec<RateEntry>) {
        for entry in entries {
            self.insert(entry);
        }
    }

    pub fn get(&self, currency: Currency, year: i32, month: u32) -> Option<&RateEntry> {
        let key = RateKey {
            code: currency,
            year,
            month,
        };
        self.rates.get(&key)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Check whether any rate exists for the given currency code across all cached periods.
    pub fn has_currency(&self, code: &str) -> bool {
        let code = code.trim().to_uppercase();
        let Some(currency) = Currency::from_code(&code) else {
            return false;
        };
        self.rates.keys().any(|k| k.code == currency)
    }
}
