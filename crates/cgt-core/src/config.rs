//! Configuration management for the allowance tables.
//!
//! Provides override support over the formula-derived defaults in
//! [`crate::exemption`]: an embedded `config.toml` ships with the binary,
//! and two optional files layer on top of it.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Embedded default configuration.
static EMBEDDED_CONFIG: &str = include_str!("../data/config.toml");

/// Raw configuration as parsed from TOML (uses string keys).
#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    exemptions: HashMap<String, Decimal>,
    #[serde(default)]
    dividend_allowances: HashMap<String, Decimal>,
}

/// Allowance-table overrides, layered on top of the built-in formulas.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub exemptions: HashMap<i32, Decimal>,
    pub dividend_allowances: HashMap<i32, Decimal>,
}

impl Config {
    /// Load the embedded default configuration.
    pub fn embedded() -> Self {
        Self::from_toml(EMBEDDED_CONFIG).unwrap_or_else(|e| {
            eprintln!("Warning: failed to parse embedded config: {e}");
            Self::default()
        })
    }

    fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let raw: RawConfig = toml::from_str(content)?;
        Ok(Self {
            exemptions: parse_year_table(raw.exemptions),
            dividend_allowances: parse_year_table(raw.dividend_allowances),
        })
    }

    /// Load configuration with override support.
    ///
    /// Checks for override files in order:
    /// 1. `./config.toml` (current directory)
    /// 2. `~/.config/cgt-tool/config.toml` (user config directory)
    ///
    /// Override files are merged with embedded defaults; values from later
    /// files take precedence.
    pub fn load_with_overrides() -> Self {
        let mut config = Self::embedded();

        for path in Self::override_paths() {
            if path.exists()
                && let Ok(content) = std::fs::read_to_string(&path)
                && let Ok(override_config) = Self::from_toml(&content)
            {
                config.exemptions.extend(override_config.exemptions);
                config
                    .dividend_allowances
                    .extend(override_config.dividend_allowances);
            }
        }

        config
    }

    fn override_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];
        if let Some(home) = dirs_home() {
            paths.push(home.join(".config").join("cgt-tool").join("config.toml"));
        }
        paths
    }
}

fn parse_year_table(raw: HashMap<String, Decimal>) -> HashMap<i32, Decimal> {
    raw.into_iter()
        .filter_map(|(k, v)| k.parse::<i32>().ok().map(|year| (year, v)))
        .collect()
}

/// Get the user's home directory without an external dependency.
fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
