//! Common types used across the analytics platform

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors raised when parsing a reporting month selector
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthParseError {
    #[error("month must use the YYYY-MM format, got '{0}'")]
    Format(String),

    #[error("month out of range: {0}")]
    OutOfRange(u32),
}

/// A reporting period in the form "YYYY-MM"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportingMonth {
    year: i32,
    month: u32,
}

impl ReportingMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthParseError> {
        if !(1..=12).contains(&month) {
            return Err(MonthParseError::OutOfRange(month));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// The month immediately before this one
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for ReportingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ReportingMonth {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| MonthParseError::Format(trimmed.to_string()))?;

        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(MonthParseError::Format(trimmed.to_string()));
        }

        let year: i32 = year
            .parse()
            .map_err(|_| MonthParseError::Format(trimmed.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| MonthParseError::Format(trimmed.to_string()))?;

        Self::new(year, month)
    }
}

impl Serialize for ReportingMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReportingMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Which reporting period an analysis should cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthScope {
    /// Every month present in the dataset
    All,
    /// The most recent month present in the dataset
    #[default]
    Latest,
    /// One specific month
    Month(ReportingMonth),
}

impl MonthScope {
    /// Resolve the scope against the months available in a dataset.
    ///
    /// `All` resolves to `None` (no month filter); `Latest` resolves to the
    /// greatest month, or `None` when there are no months at all.
    pub fn resolve<I>(&self, months: I) -> Option<ReportingMonth>
    where
        I: IntoIterator<Item = ReportingMonth>,
    {
        match self {
            MonthScope::All => None,
            MonthScope::Latest => months.into_iter().max(),
            MonthScope::Month(month) => Some(*month),
        }
    }

    /// Same as [`MonthScope::resolve`] but treats `All` as `Latest`.
    ///
    /// Stock-position analyses only make sense for one period.
    pub fn resolve_single<I>(&self, months: I) -> Option<ReportingMonth>
    where
        I: IntoIterator<Item = ReportingMonth>,
    {
        match self {
            MonthScope::All => MonthScope::Latest.resolve(months),
            other => other.resolve(months),
        }
    }
}

impl FromStr for MonthScope {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "latest" => Ok(MonthScope::Latest),
            "all" => Ok(MonthScope::All),
            other => other.parse().map(MonthScope::Month),
        }
    }
}

/// Unit a raw quantity is expressed in. Metric tons are canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuantityUnit {
    #[default]
    MetricTon,
    Kilogram,
}

impl QuantityUnit {
    /// Convert a quantity in this unit to metric tons
    pub fn to_metric_tons(&self, quantity: Decimal) -> Decimal {
        match self {
            QuantityUnit::MetricTon => quantity,
            QuantityUnit::Kilogram => quantity / Decimal::ONE_THOUSAND,
        }
    }
}

impl FromStr for QuantityUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mt" | "t" | "ton" | "tons" | "tonne" | "tonnes" => Ok(QuantityUnit::MetricTon),
            "kg" | "kgs" => Ok(QuantityUnit::Kilogram),
            other => Err(format!("unknown quantity unit '{}'", other)),
        }
    }
}
