//! Text normalization for values scraped out of portal HTML.
//!
//! Portal markup is hand-indented, so labels and values arrive with embedded
//! newlines and runs of spaces. Dates are written day-first with an optional
//! leading zero (`5/08/2023` and `05/08/2023` are the same day).

use chrono::NaiveDate;
use tracing::trace;

/// Collapse every run of whitespace to a single space and trim both ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a date against a day/month/year pattern such as `D/MM/YYYY`.
///
/// Day and month accept one or two digits regardless of how many the pattern
/// spells out. Returns `None` when the value doesn't match; callers render
/// that as an empty date via [`format_date`].
pub fn parse_lenient_date(s: &str, pattern: &str) -> Option<NaiveDate> {
    let value = normalize_whitespace(s);
    if value.is_empty() {
        return None;
    }

    let format = chrono_format(pattern);
    match NaiveDate::parse_from_str(&value, &format) {
        Ok(date) => Some(date),
        Err(e) => {
            trace!(value, pattern, error = %e, "Unparseable date");
            None
        }
    }
}

/// Render a date as `YYYY-MM-DD`, or the empty string for a missing date.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Translate a `D/MM/YYYY`-style pattern into a chrono format string.
///
/// chrono's numeric specifiers already accept unpadded input when parsing,
/// so `D` and `DD` (likewise `M` and `MM`) map to the same specifier.
fn chrono_format(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let run = chars[i..].iter().take_while(|&&x| x == c).count();

        match c {
            'D' | 'd' => out.push_str("%d"),
            'M' => out.push_str("%m"),
            'Y' | 'y' if run >= 4 => out.push_str("%Y"),
            'Y' | 'y' => out.push_str("%y"),
            '%' => {
                for _ in 0..run {
                    out.push_str("%%");
                }
            }
            other => {
                for _ in 0..run {
                    out.push(other);
                }
            }
        }

        i += run;
    }

    out
}
