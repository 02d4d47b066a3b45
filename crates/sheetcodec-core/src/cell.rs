//! Cell value representation.
//!
//! Provides the [`CellValue`] enum which represents the typed value of a
//! single cell in a worksheet. This is the high-level counterpart to the
//! raw XML `Cell` element from `sheetcodec-xml`.

use std::fmt;

use chrono::{Days, NaiveDate, NaiveDateTime, Timelike};

use crate::rich_text::RichTextRun;

/// Represents the value of a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// No value (empty cell).
    Empty,
    /// Boolean value.
    Bool(bool),
    /// Numeric value (integers are stored as f64 in Excel).
    Number(f64),
    /// Date/time value, stored as an Excel 1900-epoch serial day number. Only
    /// produced when reading back a number-typed cell whose style applies a
    /// date number format; writing stores it as a plain number and relies on
    /// the cell's style to make it render as a date.
    Date(f64),
    /// String value.
    String(String),
    /// Rich text value: multiple runs with independent formatting. Interned
    /// in the shared-string table alongside its plain-text fallback.
    RichString(Vec<RichTextRun>),
    /// Formula with optional cached result.
    Formula {
        expr: String,
        result: Option<Box<CellValue>>,
    },
    /// Error value (e.g. #DIV/0!, #N/A, #VALUE!).
    Error(String),
}

impl Default for CellValue {
    fn default() -> Self {
        Self::Empty
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, ""),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => {
                // Display integers without decimal point
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            CellValue::Date(serial) => {
                if *serial == serial.floor() {
                    write!(f, "{}", *serial as i64)
                } else {
                    write!(f, "{serial}")
                }
            }
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::RichString(runs) => {
                for run in runs {
                    write!(f, "{}", run.text)?;
                }
                Ok(())
            }
            CellValue::Formula { result, expr, .. } => {
                if let Some(result) = result {
                    write!(f, "{result}")
                } else {
                    write!(f, "={expr}")
                }
            }
            CellValue::Error(e) => write!(f, "{e}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(date_to_serial(d))
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::Date(datetime_to_serial(dt))
    }
}

/// The Excel 1900 date system's epoch, expressed so that
/// `epoch + serial days == date`. Using December 30, 1899 (rather than the
/// real epoch of December 31, 1899) absorbs Lotus 1-2-3's spurious leap day
/// for February 29, 1900, which Excel reproduces for backward compatibility.
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid constant date")
}

/// Convert a calendar date to its Excel serial day number.
pub fn date_to_serial(date: NaiveDate) -> f64 {
    (date - excel_epoch()).num_days() as f64
}

/// Convert a date-time to its Excel serial number (integer part is the day,
/// fractional part is the time of day).
pub fn datetime_to_serial(dt: NaiveDateTime) -> f64 {
    let day = date_to_serial(dt.date());
    let secs_since_midnight = dt.num_seconds_from_midnight() as f64 + dt.nanosecond() as f64 / 1e9;
    day + secs_since_midnight / 86_400.0
}

/// Convert an Excel serial day number back to a calendar date, discarding any
/// time-of-day fraction. Returns `None` if the serial is out of range for
/// [`NaiveDate`].
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    let days = serial.floor() as i64;
    if days < 0 {
        return None;
    }
    excel_epoch().checked_add_days(Days::new(days as u64))
}

/// Whether a built-in number format ID (per the OOXML fixed table, IDs
/// 0..164) represents a date, time, or date-time format.
pub fn is_date_num_fmt(num_fmt_id: u32) -> bool {
    matches!(num_fmt_id, 14..=22 | 45..=47)
}

/// Whether a custom number format code contains date/time placeholder
/// characters (`y`, `m`, `d`, `h`, `s`) outside of quoted literals.
pub fn is_date_format_code(code: &str) -> bool {
    let mut in_quotes = false;
    let mut prev_backslash = false;
    let mut chars = code.chars().peekable();
    while let Some(ch) = chars.next() {
        if prev_backslash {
            prev_backslash = false;
            continue;
        }
        if ch == '\\' {
            prev_backslash = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if ch == '[' {
            // Skip bracketed sections like [Red] or [$-409].
            for c2 in chars.by_ref() {
                if c2 == ']' {
                    break;
                }
            }
            continue;
        }
        if matches!(ch.to_ascii_lowercase(), 'y' | 'd' | 'h' | 's' | 'm') {
            return true;
        }
    }
    false
}
