//! Text, money, date and period formatting shared by all document types.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Non-ISO layouts accepted for text dates, day first.
const TEXT_DATE_FORMATS: [&str; 5] = ["%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d", "%d %B %Y", "%d %b %Y"];

/// Escape the five XML entities. Everything else passes through unchanged.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Two decimal places, no thousands separator.
///
/// Halves round away from zero (`0.125` renders `0.13`).
pub fn format_money(amount: f64) -> String {
    if rounds_to_zero(amount) {
        return "0.00".to_string();
    }
    format!("{:.2}", round_pence(amount))
}

/// Like [`format_money`], but zero or absent renders as empty text.
pub fn format_optional_money(amount: Option<f64>) -> String {
    match amount {
        Some(v) if !rounds_to_zero(v) => format_money(v),
        _ => String::new(),
    }
}

fn round_pence(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn rounds_to_zero(amount: f64) -> bool {
    round_pence(amount) == 0.0
}

/// Payment frequency code for a period type. Unknown values map to `M1`.
pub fn period_type_code(period_type: &str) -> &'static str {
    match period_type.trim().to_ascii_lowercase().as_str() {
        "weekly" => "W1",
        "fortnightly" => "W2",
        "four_weekly" => "W4",
        "monthly" => "M1",
        _ => "M1",
    }
}

/// A date supplied either as a value or as an already formatted string.
///
/// Timestamps keep the offset they were written with, so the rendered day is
/// the calendar day in that offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Date(NaiveDate),
    Timestamp(DateTime<FixedOffset>),
    Text(String),
}

impl DateValue {
    /// `YYYY-MM-DD`.
    ///
    /// Text in an unrecognised layout is emitted escaped, with a warning.
    pub fn render(&self) -> String {
        match self.as_date() {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => {
                let raw = match self {
                    Self::Text(s) => s.trim(),
                    _ => "",
                };
                warn!(date = raw, "date is not in a recognised format, emitting as given");
                escape_xml(raw)
            }
        }
    }

    /// Calendar date, when one can be determined.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Timestamp(ts) => Some(ts.date_naive()),
            Self::Text(s) => parse_text_date(s),
        }
    }
}

/// ISO dates and timestamps keep the day as written; a few day-first
/// layouts are accepted as well.
fn parse_text_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let iso_part = s.split('T').next().unwrap_or(s);
    if let Ok(d) = NaiveDate::parse_from_str(iso_part, "%Y-%m-%d") {
        return Some(d);
    }
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

impl From<NaiveDate> for DateValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<DateTime<Utc>> for DateValue {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts.fixed_offset())
    }
}

impl From<DateTime<FixedOffset>> for DateValue {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<&str> for DateValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
