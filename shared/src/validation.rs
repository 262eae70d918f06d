//! Parsing and validation utilities for raw ERP values
//!
//! Raw rows arrive as text from spreadsheets, CSV exports and REST payloads.
//! Numbers are parsed explicitly here; whether a failure becomes a zero or a
//! rejected row is decided by the caller through
//! [`CoercionPolicy`](crate::ingestion::CoercionPolicy).

use std::str::FromStr;

use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::QuantityUnit;

/// Why a raw value could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("value is empty")]
    Empty,

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("'{0}' has an unknown unit")]
    UnknownUnit(String),

    #[error("'{0}' is outside the supported range")]
    OutOfRange(String),

    #[error("'{0}' is not a recognised date")]
    InvalidDate(String),
}

// ============================================================================
// Numeric Parsing
// ============================================================================

/// Quantities are stored as NUMERIC(18,6): 12 integer and 6 fractional digits
pub const QUANTITY_SCALE: u32 = 6;
/// Amounts are stored as NUMERIC(18,2)
pub const AMOUNT_SCALE: u32 = 2;

/// Exclusive upper bound on a quantity's magnitude (10^12)
pub fn max_quantity() -> Decimal {
    Decimal::from(1_000_000_000_000i64)
}

/// Exclusive upper bound on an amount's magnitude (10^16)
pub fn max_amount() -> Decimal {
    Decimal::from(10_000_000_000_000_000i64)
}

/// Check a quantity fits the stored range and round it to the stored scale.
///
/// Sums, averages and ratios over bounded figures stay well inside the
/// `Decimal` range.
pub fn bound_quantity(value: Decimal) -> Result<Decimal, ParseError> {
    bound(value, max_quantity(), QUANTITY_SCALE)
}

/// Check an amount fits the stored range and round it to cents
pub fn bound_amount(value: Decimal) -> Result<Decimal, ParseError> {
    bound(value, max_amount(), AMOUNT_SCALE)
}

fn bound(value: Decimal, max: Decimal, scale: u32) -> Result<Decimal, ParseError> {
    if value.abs() >= max {
        return Err(ParseError::OutOfRange(value.to_string()));
    }
    Ok(value.round_dp(scale))
}

/// Split "12.5 MT" into ("12.5", "MT"). Exponents stay with the number
/// because they end in a digit.
fn split_unit(trimmed: &str) -> (&str, &str) {
    let number = trimmed.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    let unit = &trimmed[number.len()..];
    (number.trim(), unit)
}

fn parse_decimal(number: &str, raw: &str) -> Result<Decimal, ParseError> {
    let cleaned: String = number
        .chars()
        .filter(|c| *c != ',' && *c != '_' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err(ParseError::InvalidNumber(raw.to_string()));
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| ParseError::InvalidNumber(raw.to_string()))
}

/// Parse a monetary amount.
///
/// Accepts thousands separators ("1,250.5"), surrounding whitespace and
/// scientific notation. Any trailing letters make the value invalid.
pub fn parse_amount(raw: &str) -> Result<Decimal, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let (number, unit) = split_unit(trimmed);
    if !unit.is_empty() {
        return Err(ParseError::InvalidNumber(trimmed.to_string()));
    }
    bound_amount(parse_decimal(number, trimmed)?)
}

/// Parse a quantity with an optional unit suffix ("12.5 MT", "300kg").
///
/// Returns the number as written together with the unit it was written in,
/// if any. Converting to metric tons is left to the caller, which knows the
/// column's default unit.
pub fn parse_quantity(raw: &str) -> Result<(Decimal, Option<QuantityUnit>), ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let (number, suffix) = split_unit(trimmed);
    let value = parse_decimal(number, trimmed)?;
    if suffix.is_empty() {
        return Ok((value, None));
    }

    let unit = suffix
        .parse::<QuantityUnit>()
        .map_err(|_| ParseError::UnknownUnit(trimmed.to_string()))?;
    Ok((value, Some(unit)))
}

/// Parse a date in any of the formats the ERP exports use
pub fn parse_date(raw: &str) -> Result<NaiveDate, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    const FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }

    // REST payloads carry full timestamps
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    if let Some((date_part, _)) = trimmed.split_once(['T', ' ']) {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Ok(date);
        }
    }

    Err(ParseError::InvalidDate(trimmed.to_string()))
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate an ERP product code (1-32 chars: alphanumerics, spaces and "-_.")
pub fn validate_product_code(code: &str) -> Result<(), &'static str> {
    let code = code.trim();
    if code.is_empty() {
        return Err("Product code is required");
    }
    if code.len() > 32 {
        return Err("Product code must be at most 32 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ' '))
    {
        return Err("Product code contains invalid characters");
    }
    Ok(())
}
