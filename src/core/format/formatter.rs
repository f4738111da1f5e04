//! Cell value formatting
//!
//! Rendering rules for date and number cells, plus the `ddmmyyyy` request
//! date parser. Formatting is pure and total: malformed numeric input renders
//! as zero, malformed date input passes through unchanged, and nothing here
//! ever errors on a cell value. Downstream accounting systems consume the
//! European number shape byte-for-byte, so the separators are exact.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Numeric rendering locale, fixed per job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NumberLocale {
    /// Comma decimal separator, period thousands grouping: `1.234,50`
    #[default]
    European,
    /// Period decimal separator, no grouping: `1234.50`
    Plain,
}

impl FromStr for NumberLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "european" => Ok(NumberLocale::European),
            "plain" => Ok(NumberLocale::Plain),
            other => Err(format!(
                "Invalid number locale '{other}'. Must be one of: european, plain"
            )),
        }
    }
}

/// Job-wide formatting options
///
/// One date pattern and one number locale apply to every cell of a job;
/// nothing is auto-detected per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// chrono format string used for every date cell
    pub date_pattern: String,

    /// Locale used for every number cell
    pub number_locale: NumberLocale,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            date_pattern: "%d.%m.%Y".to_string(),
            number_locale: NumberLocale::European,
        }
    }
}

/// Renders a number cell to exactly two decimal places
///
/// Absent, empty or non-numeric input is treated as zero. The sign is
/// preserved and never grouped.
pub fn format_number(raw: Option<&str>, locale: NumberLocale) -> String {
    let parsed = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    let fixed = format!("{parsed:.2}");
    match locale {
        NumberLocale::Plain => fixed,
        NumberLocale::European => europeanize(&fixed),
    }
}

/// Converts a `-?1234.50` string into `-?1.234,50`
fn europeanize(fixed: &str) -> String {
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    // `{:.2}` output always carries a decimal point
    let (int_part, dec_part) = unsigned
        .split_once('.')
        .unwrap_or((unsigned, "00"));

    let digits: Vec<u8> = int_part.bytes().collect();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit as char);
    }

    format!("{sign}{grouped},{dec_part}")
}

/// Renders a date cell with the job-wide pattern
///
/// Absent or empty input renders as the empty string. Accepts RFC 3339
/// date-times, `YYYY-MM-DDTHH:MM:SS` and plain `YYYY-MM-DD`; anything else
/// passes through unchanged so the value stays visible downstream.
pub fn format_date(raw: Option<&str>, pattern: &str) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(pattern).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return dt.format(pattern).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format(pattern).to_string();
    }

    raw.to_string()
}

/// Parses a request date parameter in `ddmmyyyy` form
///
/// The segments are checked field-by-field (`dd ≤ 31`, `mm ≤ 12`, four-digit
/// year), then validated as a real calendar date, so `29022024` (a leap day)
/// parses while `31042024` does not. Rejection happens before any query
/// executes.
///
/// # Errors
///
/// Returns a readable message describing the rejected segment.
pub fn parse_request_date(raw: &str) -> Result<NaiveDate, String> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!(
            "invalid date '{raw}': expected 8 digits in ddmmyyyy form"
        ));
    }

    let day: u32 = raw[0..2].parse().map_err(|_| format!("invalid day in '{raw}'"))?;
    let month: u32 = raw[2..4]
        .parse()
        .map_err(|_| format!("invalid month in '{raw}'"))?;
    let year: i32 = raw[4..8]
        .parse()
        .map_err(|_| format!("invalid year in '{raw}'"))?;

    if day > 31 {
        return Err(format!("invalid date '{raw}': day {day} out of range"));
    }
    if month > 12 {
        return Err(format!("invalid date '{raw}': month {month} out of range"));
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("invalid date '{raw}': not a valid calendar date"))
}
