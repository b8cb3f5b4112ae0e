//! PHP literal rendering for attribute values.
//!
//! A [`Value`] is one attribute of one row, already cast according to the
//! model. Its [`Display`](std::fmt::Display) implementation writes a PHP
//! expression that evaluates back to the same value:
//!
//! ```
//! use seeder_gen::Value;
//!
//! let value = Value::Mapping(vec![("a".to_string(), Value::Int(1))]);
//! assert_eq!(value.to_string(), r#"["a" => 1, ]"#);
//! ```
use std::fmt::{self, Write};

/// A single attribute value of a database row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Rendered quoted, the same way a decimal column comes back from PDO.
    Float(f64),
    Text(String),
    /// Date or time value, holding the raw pre-cast representation read from
    /// the database. Re-formatting a parsed date would drift across timezones.
    Temporal(String),
    Sequence(Vec<Value>),
    /// Ordered key/value entries of an associative array or object.
    Mapping(Vec<(String, Value)>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temporal(raw) => write_single_quoted(f, raw),
            Self::Sequence(items) => write_structured(
                f,
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), item)),
            ),
            Self::Mapping(entries) => {
                write_structured(f, entries.iter().map(|(key, item)| (key.clone(), item)))
            }
            Self::Bool(true) => f.write_str("true"),
            Self::Bool(false) => f.write_str("false"),
            Self::Int(number) => write!(f, "{number}"),
            Self::Null => f.write_str("null"),
            Self::Float(number) => write_single_quoted(f, &number.to_string()),
            Self::Text(text) => write_single_quoted(f, text),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(flag) => Self::Bool(*flag),
            serde_json::Value::Number(number) => number.as_i64().map_or_else(
                || {
                    number
                        .as_f64()
                        .map_or_else(|| Self::Text(number.to_string()), Self::Float)
                },
                Self::Int,
            ),
            serde_json::Value::String(text) => Self::Text(text.clone()),
            serde_json::Value::Array(items) => Self::Sequence(items.iter().map(Self::from).collect()),
            serde_json::Value::Object(entries) => Self::Mapping(
                entries
                    .iter()
                    .map(|(key, item)| (key.clone(), Self::from(item)))
                    .collect(),
            ),
        }
    }
}

/// Quote `text` as a single-quoted PHP string literal.
#[must_use]
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    // writing into a String cannot fail
    let _ = write_single_quoted(&mut out, text);
    out
}

fn write_single_quoted<W: Write>(out: &mut W, text: &str) -> fmt::Result {
    out.write_char('\'')?;
    for ch in text.chars() {
        if matches!(ch, '\\' | '\'') {
            out.write_char('\\')?;
        }
        out.write_char(ch)?;
    }
    out.write_char('\'')
}

fn write_double_quoted<W: Write>(out: &mut W, text: &str) -> fmt::Result {
    out.write_char('"')?;
    for ch in text.chars() {
        if matches!(ch, '\\' | '"' | '$') {
            out.write_char('\\')?;
        }
        out.write_char(ch)?;
    }
    out.write_char('"')
}

// `["key" => value, ...]`, every entry closed by `, `
fn write_structured<'a, W, I>(out: &mut W, entries: I) -> fmt::Result
where
    W: Write,
    I: Iterator<Item = (String, &'a Value)>,
{
    out.write_char('[')?;
    for (key, item) in entries {
        write_double_quoted(out, &key)?;
        write!(out, " => {item}, ")?;
    }
    out.write_char(']')
}
