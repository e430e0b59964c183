//! Date literals and date comparisons.
//!
//! A date literal is one of:
//!
//! - `YYYY-MM-DD` - an absolute day, resolved to local midnight
//! - `+N<unit>` / `-N<unit>` - an offset into the future / past
//! - `N<unit>` - shorthand for `-N<unit>` ("N units ago")
//!
//! where `<unit>` is `h` (hours), `d` (days), `w` (weeks), `m` (months) or
//! `y` (years). Relative literals are resolved against "now" at evaluation
//! time, never at parse time.

use std::fmt;

use chrono::{DateTime, Duration, Local, Months, NaiveDate, TimeZone};

use super::ast::ComparisonOp;
use super::error::{QueryError, QueryResult};

/// Unit of a relative date offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl DateUnit {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'h' => Some(DateUnit::Hours),
            'd' => Some(DateUnit::Days),
            'w' => Some(DateUnit::Weeks),
            'm' => Some(DateUnit::Months),
            'y' => Some(DateUnit::Years),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            DateUnit::Hours => 'h',
            DateUnit::Days => 'd',
            DateUnit::Weeks => 'w',
            DateUnit::Months => 'm',
            DateUnit::Years => 'y',
        }
    }
}

/// A validated date literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    /// A calendar day.
    Absolute(NaiveDate),
    /// A signed offset from "now"; negative is the past.
    Relative {
        /// Signed amount of `unit`s.
        amount: i64,
        /// The unit of `amount`.
        unit: DateUnit,
    },
}

impl DateValue {
    /// Parses a date literal.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidDate`] for anything outside the grammar,
    /// including impossible calendar days such as `2025-02-30`.
    pub fn parse(input: &str) -> QueryResult<Self> {
        Self::parse_absolute(input)
            .or_else(|| Self::parse_relative(input))
            .ok_or_else(|| QueryError::invalid_date(input))
    }

    /// Whether `input` has the shape of a date literal (`DDDD-DD-DD` or
    /// `[+-]?DIGITS UNIT`), without checking that it names a real date.
    pub fn has_literal_shape(input: &str) -> bool {
        has_absolute_shape(input) || split_relative(input).is_some()
    }

    fn parse_absolute(input: &str) -> Option<Self> {
        if !has_absolute_shape(input) {
            return None;
        }
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .map(DateValue::Absolute)
    }

    fn parse_relative(input: &str) -> Option<Self> {
        let (sign, number, unit) = split_relative(input)?;
        let amount: i64 = number.parse().ok()?;
        Some(DateValue::Relative {
            amount: sign * amount,
            unit,
        })
    }

    /// Resolves the literal to a point in time.
    ///
    /// Returns `None` only when the result falls outside chrono's range.
    pub fn resolve(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        match *self {
            DateValue::Absolute(date) => local_midnight(date),
            DateValue::Relative { amount, unit } => offset(now, amount, unit),
        }
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateValue::Absolute(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            DateValue::Relative { amount, unit } => {
                let sign = if *amount < 0 { '-' } else { '+' };
                write!(f, "{sign}{}{}", amount.unsigned_abs(), unit.as_char())
            }
        }
    }
}

fn local_midnight(date: NaiveDate) -> Option<DateTime<Local>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    Local.from_local_datetime(&naive).earliest()
}

fn offset(now: DateTime<Local>, amount: i64, unit: DateUnit) -> Option<DateTime<Local>> {
    let months = match unit {
        DateUnit::Hours => return now.checked_add_signed(Duration::try_hours(amount)?),
        DateUnit::Days => return now.checked_add_signed(Duration::try_days(amount)?),
        DateUnit::Weeks => return now.checked_add_signed(Duration::try_weeks(amount)?),
        DateUnit::Months => amount.unsigned_abs(),
        DateUnit::Years => amount.unsigned_abs().checked_mul(12)?,
    };
    let months = Months::new(u32::try_from(months).ok()?);
    if amount < 0 {
        now.checked_sub_months(months)
    } else {
        now.checked_add_months(months)
    }
}

fn has_absolute_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Splits `[+-]?DIGITS UNIT` into sign, digits and unit. Unsigned means "ago".
fn split_relative(input: &str) -> Option<(i64, &str, DateUnit)> {
    let (sign, rest) = match input.as_bytes().first()? {
        b'+' => (1, &input[1..]),
        b'-' => (-1, &input[1..]),
        _ => (-1, input),
    };
    let unit_char = rest.chars().last()?;
    let unit = DateUnit::from_char(unit_char)?;
    let number = &rest[..rest.len() - unit_char.len_utf8()];
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((sign, number, unit))
}

/// Parses a date stored on an item (an attribute value).
///
/// Stored values accept the literal grammar plus RFC 3339 timestamps.
pub fn parse_stored_date(value: &str, now: DateTime<Local>) -> Option<DateTime<Local>> {
    let value = value.trim();
    if let Ok(literal) = DateValue::parse(value) {
        return literal.resolve(now);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Local))
}

/// Compares `lhs op rhs`.
///
/// `=` and `!=` compare calendar days; ordering operators compare full
/// timestamps.
pub fn compare_dates(op: ComparisonOp, lhs: DateTime<Local>, rhs: DateTime<Local>) -> bool {
    match op {
        ComparisonOp::Eq | ComparisonOp::Neq => {
            let lhs = lhs.format("%Y-%m-%d").to_string();
            let rhs = rhs.format("%Y-%m-%d").to_string();
            op.compare(&lhs, &rhs)
        }
        _ => op.compare(&lhs, &rhs),
    }
}
