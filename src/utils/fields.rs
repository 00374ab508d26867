//! Lookups over schemaless document fields.
//!
//! A [`FieldPath`] names one candidate location for a value. Callers keep
//! ordered slices of them and take the first candidate that holds
//! something.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static [&'static str]);

impl FieldPath {
    pub fn resolve<'a>(&self, data: &'a Map<String, Value>) -> Option<&'a Value> {
        let (first, rest) = self.0.split_first()?;
        let mut current = data.get(*first)?;
        for segment in rest {
            current = current.as_object()?.get(*segment)?;
        }
        Some(current)
    }
}

/// `null`, blank strings, empty arrays and empty objects carry no value.
/// `0` and `false` do.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Scalars rendered as text; containers are not text.
pub fn as_text(value: &Value) -> Option<String> {
    if !is_present(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Monetary amount from a number or a string such as `"R$ 1.234,56"`.
pub fn as_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

pub fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }
}

pub fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" | "sim" => Some(true),
            "false" | "nao" | "não" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    // A comma marks the decimal separator; dots are then thousands separators
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };
    normalized.parse().ok()
}

/// First candidate whose value satisfies `extract`.
pub fn first_match<T>(
    data: &Map<String, Value>,
    candidates: &[FieldPath],
    extract: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    candidates
        .iter()
        .filter_map(|path| path.resolve(data))
        .filter(|value| is_present(value))
        .find_map(extract)
}

pub fn first_text(data: &Map<String, Value>, candidates: &[FieldPath]) -> Option<String> {
    first_match(data, candidates, as_text)
}
