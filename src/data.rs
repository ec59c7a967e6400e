//! Cell values shared by every table regardless of where it was loaded from.
//!
//! Each cell carries its own tag so column-level decisions ("is this column
//! numeric?") are capability checks over cells rather than whole-column type
//! inference.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates::format_canonical;

/// Tokens that decode to a missing cell when read from delimited text.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Missing,
}

impl Value {
    /// Types one raw field read from delimited text. `true`/`false` stay text
    /// here; booleans are a column-level decision made by [`type_raw_column`].
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_missing_token(trimmed) {
            return Value::Missing;
        }
        if let Ok(parsed) = trimmed.parse::<i64>() {
            return Value::Integer(parsed);
        }
        if looks_like_float(trimmed) {
            if let Ok(parsed) = trimmed.parse::<f64>() {
                return Value::Float(parsed);
            }
        }
        Value::Text(raw.to_string())
    }

    /// Typed replacement for missing cells. Numbers keep their type; anything
    /// else, including NA-like tokens such as `N/A`, is kept as text.
    pub fn fill_value(raw: &str) -> Self {
        match Value::from_raw(raw) {
            Value::Missing => Value::Text(raw.to_string()),
            typed => typed,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Integers, floats and booleans all count as numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_) | Value::Boolean(_))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    /// Short label used in column listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Missing => "missing",
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Boolean(b) => String::from(if *b { "True" } else { "False" }),
            Value::Date(d) => format_canonical(*d),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Missing => String::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Types one column of raw delimited fields. The column is boolean only when
/// every present field reads `true` or `false`; otherwise each field is typed
/// on its own and stray `true`/`false` values remain text.
pub fn type_raw_column<S: AsRef<str>>(fields: &[S]) -> Vec<Value> {
    let mut present = fields
        .iter()
        .map(|field| field.as_ref().trim())
        .filter(|field| !is_missing_token(field))
        .peekable();
    let all_boolean = present.peek().is_some() && present.all(|field| parse_bool(field).is_some());
    fields
        .iter()
        .map(|field| {
            let raw = field.as_ref();
            match parse_bool(raw.trim()) {
                Some(flag) if all_boolean => Value::Boolean(flag),
                _ => Value::from_raw(raw),
            }
        })
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

pub fn is_missing_token(value: &str) -> bool {
    MISSING_TOKENS.contains(&value)
}

// Keeps things like "inf" or "infinity" as text; `f64::from_str` would accept them.
fn looks_like_float(value: &str) -> bool {
    let digits = value.trim_start_matches(['+', '-']);
    digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
}
