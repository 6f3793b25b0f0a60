//! Concrete [`FxProvider`] backed by a directory of HMRC monthly exchange
//! rate XML files, loaded once at startup.

use async_trait::async_trait;
use cgt_core::providers::{FxProvider, FxProviderError, FxRate};
use cgt_core::Currency;
use cgt_money::{FxCache, RateFile};
use chrono::{Datelike, NaiveDate};
use std::fs;
use std::path::Path;

pub struct FolderFxProvider {
    cache: FxCache,
}

impl FolderFxProvider {
    /// No rates at all; every non-GBP lookup fails. Used when the caller
    /// supplies no rates directory.
    pub fn empty() -> Self {
        Self { cache: FxCache::new() }
    }

    /// Load every `.xml` file directly under `dir` into a fresh cache.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("xml") {
                continue;
            }
            let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
            let xml = fs::read_to_string(&path)?;
            files.push(RateFile {
                name: path,
                modified,
                xml,
            });
        }
        let cache = cgt_money::load_cache_from_files(files)?;
        Ok(Self { cache })
    }
}

#[async_trait]
impl FxProvider for FolderFxProvider {
    async fn get_rate(&self, date: NaiveDate, currency: Currency) -> Result<FxRate, FxProviderError> {
        self.cache
            .get(currency, date.year(), date.month())
            .map(|entry| FxRate {
                rate: entry.rate_per_gbp,
            })
            .ok_or_else(|| {
                FxProviderError(format!(
                    "no FX rate for {} in {}-{:02}",
                    currency.code(),
                    date.year(),
                    date.month()
                ))
            })
    }
}
