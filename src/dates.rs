// 📅 Date Normalizer - one canonical date for every encoding the store emits
//
// Accepted encodings, in priority order:
// 1. [year, month, day] triple (month is 1-based)
// 2. "YYYY-MM-DD"
// 3. "YYYYMMDD"
// 4. anything a general date parser understands ("03/09/2024", "March 9, 2024", RFC 3339, ...)
//
// Failure is a tagged value. Whether to substitute a filler date is the
// caller's decision (see DateFallback).

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::error::DateNormalizationError;

// ============================================================================
// CANONICAL DATE
// ============================================================================

/// A valid calendar date. Serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalDate(NaiveDate);

impl CanonicalDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(CanonicalDate)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// `YYYY-MM-DD`
    pub fn to_iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// `[year, month, day]`, the triple shape some store endpoints return
    pub fn to_triple(&self) -> [i64; 3] {
        [self.year() as i64, self.month() as i64, self.day() as i64]
    }

    pub fn to_display(&self, format: DisplayFormat) -> String {
        match format {
            DisplayFormat::Us => self.0.format("%m/%d/%Y").to_string(),
            DisplayFormat::Iso => self.to_iso(),
            DisplayFormat::Long => self.0.format("%B %-d, %Y").to_string(),
        }
    }
}

impl From<NaiveDate> for CanonicalDate {
    fn from(date: NaiveDate) -> Self {
        CanonicalDate(date)
    }
}

impl fmt::Display for CanonicalDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso())
    }
}

impl Serialize for CanonicalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso())
    }
}

impl<'de> Deserialize<'de> for CanonicalDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        normalize_value(&value).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// DISPLAY FORMAT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayFormat {
    /// `MM/DD/YYYY`
    #[default]
    Us,
    /// `YYYY-MM-DD`
    Iso,
    /// `March 9, 2024`
    Long,
}

// ============================================================================
// INPUT SHAPES
// ============================================================================

/// Date encodings observed from the backing store
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    Triple(Vec<i64>),
    Text(String),
    Missing,
}

impl DateInput {
    /// Classify a raw JSON value. Arrays whose members are not all integers
    /// become a malformed triple rather than silently losing members.
    pub fn from_value(value: &Value) -> Result<Self, DateNormalizationError> {
        match value {
            Value::Null => Ok(DateInput::Missing),
            Value::String(s) => Ok(DateInput::Text(s.clone())),
            Value::Array(items) => {
                let parts: Option<Vec<i64>> = items.iter().map(as_whole_number).collect();
                parts
                    .map(DateInput::Triple)
                    .ok_or_else(|| DateNormalizationError::MalformedTriple(value.to_string()))
            }
            other => Err(DateNormalizationError::Unparseable(other.to_string())),
        }
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

impl From<[i64; 3]> for DateInput {
    fn from(parts: [i64; 3]) -> Self {
        DateInput::Triple(parts.to_vec())
    }
}

fn as_whole_number(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Formats tried by the general parser, after the exact shapes
const GENERAL_DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%a %b %d %Y",
];

const GENERAL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn normalize(input: &DateInput) -> Result<CanonicalDate, DateNormalizationError> {
    match input {
        DateInput::Missing => Err(DateNormalizationError::Missing),
        DateInput::Triple(parts) => normalize_triple(parts),
        DateInput::Text(text) => normalize_text(text),
    }
}

/// Normalize a raw JSON date value
pub fn normalize_value(value: &Value) -> Result<CanonicalDate, DateNormalizationError> {
    normalize(&DateInput::from_value(value)?)
}

fn normalize_triple(parts: &[i64]) -> Result<CanonicalDate, DateNormalizationError> {
    let [year, month, day] = parts else {
        return Err(DateNormalizationError::MalformedTriple(format!("{:?}", parts)));
    };
    let in_range = *year > 1900 && (1..=12).contains(month) && (1..=31).contains(day);
    if !in_range {
        return Err(DateNormalizationError::OutOfRange(parts.to_vec()));
    }

    // Range check passed, but day 31 in a 30-day month is still not a date
    i32::try_from(*year)
        .ok()
        .and_then(|y| CanonicalDate::from_ymd(y, *month as u32, *day as u32))
        .ok_or_else(|| DateNormalizationError::OutOfRange(parts.to_vec()))
}

fn normalize_text(raw: &str) -> Result<CanonicalDate, DateNormalizationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(DateNormalizationError::Missing);
    }

    let unparseable = || DateNormalizationError::Unparseable(raw.to_string());

    if is_iso_shape(text) {
        return NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(CanonicalDate)
            .map_err(|_| unparseable());
    }

    if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = text[0..4].parse().map_err(|_| unparseable())?;
        let month: u32 = text[4..6].parse().map_err(|_| unparseable())?;
        let day: u32 = text[6..8].parse().map_err(|_| unparseable())?;
        return CanonicalDate::from_ymd(year, month, day).ok_or_else(unparseable);
    }

    parse_general(text).ok_or_else(unparseable)
}

fn is_iso_shape(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
}

fn parse_general(text: &str) -> Option<CanonicalDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(CanonicalDate(dt.date_naive()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(CanonicalDate(dt.date_naive()));
    }

    for format in GENERAL_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(CanonicalDate(dt.date()));
        }
    }

    for format in GENERAL_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(CanonicalDate(date));
        }
    }

    None
}

// ============================================================================
// FALLBACK POLICY
// ============================================================================

/// What a caller does with a date that failed normalization.
///
/// `Today` reproduces the legacy "fill with today's date" behavior and is
/// only meant for display-oriented read paths. Submissions always reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFallback {
    #[default]
    Reject,
    Today,
}

impl DateFallback {
    /// Apply the policy. `today` is injected so the result stays deterministic.
    pub fn apply(
        &self,
        result: Result<CanonicalDate, DateNormalizationError>,
        today: CanonicalDate,
    ) -> Result<CanonicalDate, DateNormalizationError> {
        match (self, result) {
            (_, Ok(date)) => Ok(date),
            (DateFallback::Reject, Err(e)) => Err(e),
            (DateFallback::Today, Err(e)) => {
                tracing::warn!(error = %e, substitute = %today, "Substituting today's date for unreadable date");
                Ok(today)
            }
        }
    }
}

/// Today's date in local time
pub fn today() -> CanonicalDate {
    CanonicalDate(chrono::Local::now().date_naive())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> CanonicalDate {
        CanonicalDate::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_triple_normalizes() {
        let result = normalize(&DateInput::from([2024, 3, 9])).unwrap();
        assert_eq!(result.to_iso(), "2024-03-09");
        assert_eq!(result.to_display(DisplayFormat::Us), "03/09/2024");
    }

    #[test]
    fn test_three_encodings_agree() {
        let from_iso = normalize(&DateInput::from("2024-03-09")).unwrap();
        let from_triple = normalize(&DateInput::from([2024, 3, 9])).unwrap();
        let from_compact = normalize(&DateInput::from("20240309")).unwrap();
        assert_eq!(from_iso, from_triple);
        assert_eq!(from_triple, from_compact);
    }

    #[test]
    fn test_triple_range_checks() {
        assert!(matches!(
            normalize(&DateInput::from([1900, 1, 1])),
            Err(DateNormalizationError::OutOfRange(_))
        ));
        assert!(normalize(&DateInput::from([2024, 13, 1])).is_err());
        assert!(normalize(&DateInput::from([2024, 0, 1])).is_err());
        assert!(normalize(&DateInput::from([2024, 1, 32])).is_err());
        // In range, but not a calendar date
        assert!(normalize(&DateInput::from([2023, 2, 29])).is_err());
        assert_eq!(normalize(&DateInput::from([2024, 2, 29])).unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn test_triple_wrong_length() {
        let result = normalize(&DateInput::Triple(vec![2024, 3]));
        assert!(matches!(result, Err(DateNormalizationError::MalformedTriple(_))));
    }

    #[test]
    fn test_general_parser_formats() {
        assert_eq!(normalize(&DateInput::from("03/09/2024")).unwrap(), date(2024, 3, 9));
        assert_eq!(normalize(&DateInput::from("March 9, 2024")).unwrap(), date(2024, 3, 9));
        assert_eq!(normalize(&DateInput::from("9 Mar 2024")).unwrap(), date(2024, 3, 9));
        assert_eq!(normalize(&DateInput::from("2024-3-9")).unwrap(), date(2024, 3, 9));
        assert_eq!(normalize(&DateInput::from("2024-03-9")).unwrap(), date(2024, 3, 9));
        assert_eq!(normalize(&DateInput::from("2024-3-09 08:15")).unwrap(), date(2024, 3, 9));
        assert_eq!(
            normalize(&DateInput::from("2024-03-09T10:30:00Z")).unwrap(),
            date(2024, 3, 9)
        );
        assert_eq!(
            normalize(&DateInput::from("2024-03-09T10:30:00.000")).unwrap(),
            date(2024, 3, 9)
        );
    }

    #[test]
    fn test_failures_are_tagged() {
        assert_eq!(normalize(&DateInput::Missing), Err(DateNormalizationError::Missing));
        assert_eq!(normalize(&DateInput::from("   ")), Err(DateNormalizationError::Missing));
        assert!(matches!(
            normalize(&DateInput::from("not a date")),
            Err(DateNormalizationError::Unparseable(_))
        ));
        // ISO shape with an impossible day is not handed to the general parser
        assert!(normalize(&DateInput::from("2024-02-30")).is_err());
        assert!(normalize(&DateInput::from("20241301")).is_err());
    }

    #[test]
    fn test_normalize_json_values() {
        assert_eq!(normalize_value(&json!([2024, 3, 9])).unwrap(), date(2024, 3, 9));
        assert_eq!(normalize_value(&json!([2024.0, 3.0, 9.0])).unwrap(), date(2024, 3, 9));
        assert_eq!(normalize_value(&json!("20240309")).unwrap(), date(2024, 3, 9));
        assert_eq!(normalize_value(&Value::Null), Err(DateNormalizationError::Missing));
        assert!(matches!(
            normalize_value(&json!(["2024", 3, 9])),
            Err(DateNormalizationError::MalformedTriple(_))
        ));
        assert!(matches!(
            normalize_value(&json!(true)),
            Err(DateNormalizationError::Unparseable(_))
        ));
    }

    #[test]
    fn test_display_formats() {
        let d = date(2024, 3, 9);
        assert_eq!(d.to_display(DisplayFormat::Us), "03/09/2024");
        assert_eq!(d.to_display(DisplayFormat::Iso), "2024-03-09");
        assert_eq!(d.to_display(DisplayFormat::Long), "March 9, 2024");
        assert_eq!(d.to_triple(), [2024, 3, 9]);
    }

    #[test]
    fn test_serde_roundtrip_accepts_triples() {
        let d: CanonicalDate = serde_json::from_value(json!([2024, 12, 31])).unwrap();
        assert_eq!(serde_json::to_value(d).unwrap(), json!("2024-12-31"));
    }

    #[test]
    fn test_fallback_policy() {
        let today = date(2026, 1, 1);
        let bad = normalize(&DateInput::from("garbage"));

        assert!(DateFallback::Reject.apply(bad.clone(), today).is_err());
        assert_eq!(DateFallback::Today.apply(bad, today).unwrap(), today);

        let good = normalize(&DateInput::from("2024-03-09"));
        assert_eq!(DateFallback::Today.apply(good, today).unwrap(), date(2024, 3, 9));
    }
}
