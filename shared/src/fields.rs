//! Field reader and writer for raw records
//!
//! Column names are human-readable and have changed over time (accented vs.
//! plain spellings, renamed columns), so every read takes a list of candidate
//! keys and returns the first usable value. Readers never fail: a missing
//! column or a value of the wrong JSON type reads as absent and the mapper
//! applies its default.
//!
//! Lookup and rollup columns come back as arrays even when they hold a single
//! value; scalar readers unwrap the first element.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde_json::{Map, Number, Value};

use crate::record::FieldMap;

/// Read-only view over a raw field map
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a FieldMap,
}

impl<'a> Fields<'a> {
    pub fn new(map: &'a FieldMap) -> Self {
        Self { map }
    }

    /// First non-null value among the candidate keys
    fn lookup(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|key| self.map.get(*key))
            .find(|value| !value.is_null())
    }

    /// Like [`lookup`](Self::lookup) but unwraps single-value arrays
    fn scalar(&self, keys: &[&str]) -> Option<&'a Value> {
        match self.lookup(keys)? {
            Value::Array(items) => items.first().filter(|v| !v.is_null()),
            value => Some(value),
        }
    }

    pub fn has(&self, keys: &[&str]) -> bool {
        self.lookup(keys).is_some()
    }

    /// Non-empty text; numbers are rendered as text
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        match self.scalar(keys)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn text_or_default(&self, keys: &[&str]) -> String {
        self.text(keys).unwrap_or_default()
    }

    /// Number, also accepting formatted text such as `"14,50 €"`
    pub fn number(&self, keys: &[&str]) -> Option<f64> {
        match self.scalar(keys)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_number(s),
            _ => None,
        }
    }

    /// Whole number; fractional values are truncated
    pub fn integer(&self, keys: &[&str]) -> Option<i64> {
        match self.scalar(keys)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Value::String(s) => parse_number(s).map(|f| f.trunc() as i64),
            _ => None,
        }
    }

    /// Money amount rounded to cents
    pub fn decimal(&self, keys: &[&str]) -> Option<Decimal> {
        self.number(keys)
            .and_then(Decimal::from_f64)
            .map(|d| d.round_dp(2))
    }

    /// Checkbox or yes/no select
    pub fn flag(&self, keys: &[&str]) -> Option<bool> {
        match self.scalar(keys)? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|f| f != 0.0),
            Value::String(s) => parse_flag(s),
            _ => None,
        }
    }

    /// Linked record ids (also multi-select values); a scalar reads as one item
    pub fn links(&self, keys: &[&str]) -> Vec<String> {
        match self.lookup(keys) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn first_link(&self, keys: &[&str]) -> Option<String> {
        self.links(keys).into_iter().next()
    }

    /// Multi-select values
    pub fn strings(&self, keys: &[&str]) -> Vec<String> {
        self.links(keys)
    }

    /// URL of the first attachment
    pub fn attachment_url(&self, keys: &[&str]) -> Option<String> {
        match self.scalar(keys)? {
            Value::Object(obj) => obj.get("url").and_then(Value::as_str).map(str::to_string),
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }

    /// RFC 3339 timestamp; a plain date reads as midnight UTC
    pub fn date_time(&self, keys: &[&str]) -> Option<DateTime<Utc>> {
        let raw = self.scalar(keys)?.as_str()?;
        parse_date_time(raw)
    }

    /// Calendar date, from a plain date or the date part of a timestamp
    pub fn date(&self, keys: &[&str]) -> Option<NaiveDate> {
        let raw = self.scalar(keys)?.as_str()?.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| parse_date_time(raw).map(|dt| dt.date_naive()))
    }
}

/// Plain or French-formatted number: with a decimal comma, dots group thousands
fn parse_number(raw: &str) -> Option<f64> {
    let decimal_comma = raw.contains(',');
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€' && *c != '\u{202f}')
        .filter(|c| !(decimal_comma && *c == '.'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "oui" | "yes" | "true" | "1" | "x" => Some(true),
        "non" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc());
    if parsed.is_none() {
        tracing::debug!(value = %raw, "Ignoring unparsable date");
    }
    parsed
}

/// Builder for the `fields` object of create and update calls
///
/// Every setter ignores `None`, so optional form inputs never overwrite a
/// remote value with null.
#[derive(Debug, Clone, Default)]
pub struct FieldsBuilder {
    map: FieldMap,
}

impl FieldsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(v) = value {
            self.map.insert(key.to_string(), Value::String(v.to_string()));
        }
        self
    }

    pub fn number(mut self, key: &str, value: Option<f64>) -> Self {
        if let Some(n) = value.and_then(Number::from_f64) {
            self.map.insert(key.to_string(), Value::Number(n));
        }
        self
    }

    pub fn integer(mut self, key: &str, value: Option<i64>) -> Self {
        if let Some(v) = value {
            self.map.insert(key.to_string(), Value::Number(v.into()));
        }
        self
    }

    pub fn decimal(self, key: &str, value: Option<Decimal>) -> Self {
        self.number(key, value.and_then(|d| d.to_f64()))
    }

    pub fn flag(mut self, key: &str, value: Option<bool>) -> Self {
        if let Some(v) = value {
            self.map.insert(key.to_string(), Value::Bool(v));
        }
        self
    }

    /// Yes/no single select (`"oui"` / `"non"`)
    pub fn oui_non(self, key: &str, value: Option<bool>) -> Self {
        self.text(key, value.map(|v| if v { "oui" } else { "non" }))
    }

    /// Link to one record, written as a one-element array
    pub fn link(mut self, key: &str, record_id: Option<&str>) -> Self {
        if let Some(id) = record_id {
            self.map
                .insert(key.to_string(), Value::Array(vec![Value::String(id.to_string())]));
        }
        self
    }

    /// Links to several records; an empty list is skipped
    pub fn links(mut self, key: &str, record_ids: &[String]) -> Self {
        if !record_ids.is_empty() {
            let items = record_ids.iter().cloned().map(Value::String).collect();
            self.map.insert(key.to_string(), Value::Array(items));
        }
        self
    }

    /// Multi-select values; an empty list is skipped
    pub fn strings(self, key: &str, values: &[String]) -> Self {
        self.links(key, values)
    }

    pub fn date(self, key: &str, value: Option<NaiveDate>) -> Self {
        let formatted = value.map(|d| d.format("%Y-%m-%d").to_string());
        self.text(key, formatted.as_deref())
    }

    pub fn date_time(self, key: &str, value: Option<DateTime<Utc>>) -> Self {
        let formatted = value.map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true));
        self.text(key, formatted.as_deref())
    }

    pub fn raw(mut self, key: &str, value: Value) -> Self {
        self.map.insert(key.to_string(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn build(self) -> Map<String, Value> {
        self.map
    }
}
