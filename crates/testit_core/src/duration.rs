//! Human-friendly duration strings.
//!
//! Parsing accepts a number followed by an optional unit (`"20 seconds"`, `"1.5s"`, `"2 mins"`). A bare number is
//! read as milliseconds. Formatting produces the compact single-unit form used in reports (`"250ms"`, `"2s"`).

use std::fmt;
use std::time::Duration;

const SECOND_MS: f64 = 1_000.0;
const MINUTE_MS: f64 = SECOND_MS * 60.0;
const HOUR_MS: f64 = MINUTE_MS * 60.0;
const DAY_MS: f64 = HOUR_MS * 24.0;
const WEEK_MS: f64 = DAY_MS * 7.0;
const YEAR_MS: f64 = DAY_MS * 365.25;

/// Longest input accepted by [`parse_duration`].
pub const MAX_INPUT_LEN: usize = 100;

/// Why a duration string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseDurationError {
    Empty,
    TooLong(usize),
    InvalidNumber(String),
    UnknownUnit(String),
    Negative(String),
}

impl fmt::Display for ParseDurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseDurationError::Empty => write!(f, "duration string is empty"),
            ParseDurationError::TooLong(len) => {
                write!(f, "duration string is too long ({len} chars, max {MAX_INPUT_LEN})")
            }
            ParseDurationError::InvalidNumber(s) => write!(f, "invalid number in duration '{s}'"),
            ParseDurationError::UnknownUnit(u) => write!(f, "unknown duration unit '{u}'"),
            ParseDurationError::Negative(s) => write!(f, "duration '{s}' is negative"),
        }
    }
}

impl std::error::Error for ParseDurationError {}

/// Map a unit spelling to its length in milliseconds.
fn unit_ms(unit: &str) -> Option<f64> {
    let ms = match unit {
        "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => SECOND_MS,
        "m" | "min" | "mins" | "minute" | "minutes" => MINUTE_MS,
        "h" | "hr" | "hrs" | "hour" | "hours" => HOUR_MS,
        "d" | "day" | "days" => DAY_MS,
        "w" | "week" | "weeks" => WEEK_MS,
        "y" | "yr" | "yrs" | "year" | "years" => YEAR_MS,
        _ => return None,
    };
    Some(ms)
}

/// Parse a duration string such as `"20 seconds"`.
///
/// ## Parameters
/// - `input`: a number (integer or decimal) optionally followed by whitespace and a unit. Units are
///   case-insensitive.
///
/// ## Returns
/// - (`Duration`): the parsed duration, truncated to whole milliseconds.
///
/// ## Errors
/// - [`ParseDurationError`] when the input is empty, longer than [`MAX_INPUT_LEN`], negative, or has an
///   unrecognised number or unit.
///
/// ## Examples
/// ```rust
/// use std::time::Duration;
/// use testit_core::parse_duration;
/// assert_eq!(parse_duration("20 seconds"), Ok(Duration::from_secs(20)));
/// assert_eq!(parse_duration("250"), Ok(Duration::from_millis(250)));
/// assert_eq!(parse_duration("1.5h"), Ok(Duration::from_secs(5400)));
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, ParseDurationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseDurationError::Empty);
    }
    if trimmed.len() > MAX_INPUT_LEN {
        return Err(ParseDurationError::TooLong(trimmed.len()));
    }

    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let split = body
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(body.len());
    let (number, unit) = body.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| ParseDurationError::InvalidNumber(trimmed.to_string()))?;
    let unit = unit.trim_start().to_ascii_lowercase();
    let scale = unit_ms(&unit).ok_or(ParseDurationError::UnknownUnit(unit))?;

    if negative && value != 0.0 {
        return Err(ParseDurationError::Negative(trimmed.to_string()));
    }

    Ok(Duration::from_millis((value * scale) as u64))
}

/// Format a duration in the compact single-unit style used by reports.
///
/// The largest unit that fits (days, hours, minutes, seconds) is chosen and the value is rounded to the nearest
/// whole unit; anything under a second is printed in milliseconds.
///
/// ## Examples
/// ```rust
/// use std::time::Duration;
/// use testit_core::format_duration;
/// assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "2s");
/// assert_eq!(format_duration(Duration::from_secs(90 * 60)), "2h");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.as_millis() as f64;
    if ms >= DAY_MS {
        format!("{}d", (ms / DAY_MS).round())
    } else if ms >= HOUR_MS {
        format!("{}h", (ms / HOUR_MS).round())
    } else if ms >= MINUTE_MS {
        format!("{}m", (ms / MINUTE_MS).round())
    } else if ms >= SECOND_MS {
        format!("{}s", (ms / SECOND_MS).round())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
