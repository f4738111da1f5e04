//! Value resolution and formatting
//!
//! Turns raw records into fully formatted output rows: [`resolver`] picks the
//! cell value per column (display text, raw value or empty), [`formatter`]
//! renders dates and numbers with the job-wide pattern and locale.

pub mod formatter;
pub mod resolver;

pub use formatter::{format_date, format_number, parse_request_date, FormatOptions, NumberLocale};
pub use resolver::{resolve, resolve_row};
