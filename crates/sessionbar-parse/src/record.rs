//! Single-record parsing.

use chrono::{NaiveDate, NaiveTime};
use sessionbar_types::Tick;
use thiserror::Error;

/// Number of fields a record must carry.
const FIELD_COUNT: usize = 6;

/// Added to the fractional `HHMM` time before truncation so values such as
/// `0.0930` that sit just below their decimal in binary still decode to 09:30.
const TIME_EPSILON: f64 = 0.00001;

/// Errors that can occur while parsing a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line is empty or whitespace.
    #[error("Empty record")]
    Empty,

    /// Too few fields.
    #[error("Expected 6 fields, found {0}")]
    FieldCount(usize),

    /// The date field is shorter than `YYYYMMDD`, non-numeric or not a
    /// calendar date.
    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    /// The time field is unparsable, negative or out of range.
    #[error("Invalid time '{0}'")]
    InvalidTime(String),

    /// A price field is unparsable or not strictly positive.
    #[error("Invalid {field} price '{value}'")]
    InvalidPrice {
        /// Name of the price field.
        field: &'static str,
        /// The raw field text.
        value: String,
    },
}

/// Returns the delimiter of a record: comma if one appears after the first
/// character, tab otherwise.
#[must_use]
pub fn detect_delimiter(line: &str) -> char {
    match line.find(',') {
        Some(idx) if idx > 0 => ',',
        _ => '\t',
    }
}

/// Parses a record of the form `date,time,open,high,low,close`.
///
/// Fields past the sixth are ignored.
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first field that failed.
pub fn parse_record(line: &str) -> Result<Tick, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let fields: Vec<&str> = line.split(detect_delimiter(line)).map(str::trim).collect();
    if fields.len() < FIELD_COUNT {
        return Err(ParseError::FieldCount(fields.len()));
    }

    let time = parse_time(fields[1])?;
    let open = parse_price("open", fields[2])?;
    let high = parse_price("high", fields[3])?;
    let low = parse_price("low", fields[4])?;
    let close = parse_price("close", fields[5])?;
    let date = parse_date(fields[0])?;

    Ok(Tick::new(date.and_time(time), open, high, low, close))
}

/// Parses a `YYYYMMDD` date, ignoring anything after the eighth character.
fn parse_date(field: &str) -> Result<NaiveDate, ParseError> {
    let invalid = || ParseError::InvalidDate(field.to_string());

    let digits = field.get(..8).ok_or_else(invalid)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let year = digits[0..4].parse::<i32>().map_err(|_| invalid())?;
    let month = digits[4..6].parse::<u32>().map_err(|_| invalid())?;
    let day = digits[6..8].parse::<u32>().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Parses a fractional `HHMM` time such as `0.0930` or `0.2101`.
fn parse_time(field: &str) -> Result<NaiveTime, ParseError> {
    let invalid = || ParseError::InvalidTime(field.to_string());

    let value = field.parse::<f64>().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }

    let value = value + TIME_EPSILON;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (hour, hour_minute) = ((value * 100.0) as u32, (value * 10_000.0) as u32);

    NaiveTime::from_hms_opt(hour, hour_minute % 100, 0).ok_or_else(invalid)
}

/// Parses a strictly positive price.
fn parse_price(field: &'static str, value: &str) -> Result<f64, ParseError> {
    match value.parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(ParseError::InvalidPrice {
            field,
            value: value.to_string(),
        }),
    }
}
