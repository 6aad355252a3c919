//! Alias tables and a forgiving reader over loosely-typed JSON objects.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

/// A canonical field and the backend names it may arrive under, in order of preference.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub aliases: &'static [&'static str],
}

impl Field {
    pub const fn new(aliases: &'static [&'static str]) -> Self {
        Self { aliases }
    }
}

/// Read-only view of one backend record. Non-object values read as empty.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> Record<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self {
            fields: value.as_object(),
        }
    }

    pub fn from_map(map: &'a Map<String, Value>) -> Self {
        Self { fields: Some(map) }
    }

    /// Present, non-null values for `field`, in alias order.
    fn candidates(&self, field: &Field) -> impl Iterator<Item = &'a Value> + '_ {
        let fields = self.fields;
        let aliases: &'static [&'static str] = field.aliases;
        aliases
            .iter()
            .filter_map(move |alias| fields.and_then(|map| map.get(*alias)))
            .filter(|value| !value.is_null())
    }

    pub fn get(&self, field: &Field) -> Option<&'a Value> {
        self.candidates(field).next()
    }

    /// First alias holding a non-blank string or a number.
    pub fn text(&self, field: &Field) -> Option<String> {
        self.candidates(field).find_map(value_text)
    }

    pub fn text_or(&self, field: &Field, default: &str) -> String {
        self.text(field).unwrap_or_else(|| default.to_string())
    }

    /// First alias holding a numeric value (number or numeric string).
    pub fn number(&self, field: &Field) -> Option<f64> {
        self.candidates(field).find_map(value_number)
    }

    /// Non-negative whole count; absent, negative or non-numeric reads as 0.
    pub fn count(&self, field: &Field) -> u32 {
        self.number(field).map(to_count).unwrap_or(0)
    }

    /// Like [`Record::count`], but an array counts its elements.
    pub fn tally(&self, field: &Field) -> u32 {
        match self.get(field) {
            Some(Value::Array(items)) => items.len().min(u32::MAX as usize) as u32,
            _ => self.count(field),
        }
    }

    /// Non-negative amount; absent, negative or non-numeric reads as 0.
    pub fn amount(&self, field: &Field) -> f64 {
        match self.number(field) {
            Some(value) if value > 0.0 => value,
            _ => 0.0,
        }
    }

    pub fn nested(&self, field: &Field) -> Option<Record<'a>> {
        self.candidates(field)
            .find(|value| value.is_object())
            .map(Record::new)
    }

    pub fn array(&self, field: &Field) -> &'a [Value] {
        self.candidates(field)
            .find_map(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn datetime(&self, field: &Field) -> Option<DateTime<FixedOffset>> {
        self.candidates(field)
            .filter_map(Value::as_str)
            .find_map(parse_datetime)
    }

    pub fn datetime_utc(&self, field: &Field) -> Option<DateTime<Utc>> {
        self.datetime(field).map(|dt| dt.with_timezone(&Utc))
    }

    pub fn date(&self, field: &Field) -> Option<NaiveDate> {
        self.candidates(field)
            .filter_map(Value::as_str)
            .find_map(parse_date)
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn value_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn to_count(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else if value >= u32::MAX as f64 {
        u32::MAX
    } else {
        value.round() as u32
    }
}

/// Parses RFC 3339, naive ISO timestamps (read as UTC) and plain dates.
pub fn parse_datetime(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }

    let utc = FixedOffset::east_opt(0)?;
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return naive.and_local_timezone(utc).single();
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| naive.and_local_timezone(utc).single())
}

/// Parses a calendar date from a timestamp, a `YYYY-MM-DD` date or a `YYYY-MM` month.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Some(dt) = parse_datetime(value) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d").ok()
}
