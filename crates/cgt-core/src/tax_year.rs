//! UK tax-year utilities (6 April to 5 April).

use crate::error::CgtError;
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A UK tax year, identified by its start year and serialized as `"YYYY/YY"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxPeriod(i32);

impl TaxPeriod {
    /// Construct from an explicit start year.
    ///
    /// # Errors
    /// Returns `CgtError::InvalidTaxYear` outside 1900-2199.
    pub fn new(start_year: i32) -> Result<Self, CgtError> {
        if !(1900..=2199).contains(&start_year) {
            return Err(CgtError::InvalidTaxYear(start_year));
        }
        Ok(Self(start_year))
    }

    /// Derive the tax year containing `date`.
    ///
    /// 6 April or later belongs to the year starting that April; earlier
    /// dates belong to the previous tax year.
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        let month = date.month();
        let day = date.day();
        if month < 4 || (month == 4 && day < 6) {
            Self(year - 1)
        } else {
            Self(year)
        }
    }

    pub fn start_year(&self) -> i32 {
        self.0
    }

    pub fn end_year(&self) -> i32 {
        self.0 + 1
    }

    /// 6 April of the start year.
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, 4, 6)
    }

    /// 5 April of the end year.
    pub fn end_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.end_year(), 4, 5)
    }

    /// The `"YYYY/YY"` label, e.g. `"2023/24"`. Wraps at the century, so
    /// a tax year starting 2099 labels as `"2099/00"`.
    pub fn label(&self) -> String {
        format!("{}/{:02}", self.0, (self.0 + 1).rem_euclid(100))
    }
}

impl std::fmt::Display for TaxPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for TaxPeriod {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for TaxPeriod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let (start_str, end_short_str) = s
            .split_once('/')
            .ok_or_else(|| serde::de::Error::custom(format!("invalid tax period '{s}'")))?;
        let start: i32 = start_str
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid start year '{start_str}'")))?;
        let end_short: i32 = end_short_str.parse().map_err(|_| {
            serde::de::Error::custom(format!("invalid end year '{end_short_str}'"))
        })?;

        let expected_end = (start + 1).rem_euclid(100);
        if end_short != expected_end {
            return Err(serde::de::Error::custom(format!(
                "tax years must be consecutive: '{s}' should end with '{expected_end:02}'"
            )));
        }

        TaxPeriod::new(start).map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for TaxPeriod {
    fn schema_name() -> String {
        "TaxPeriod".to_owned()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        let mut schema = generator.subschema_for::<String>().into_object();
        schema.metadata().description =
            Some("UK tax year in 'YYYY/YY' format (e.g. '2023/24')".to_owned());
        schema.string().pattern = Some(r"^\d{4}/\d{2}$".to_owned());
        schema.into()
    }
}
