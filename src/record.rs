//! # Records
//!
//! Rows read from the database and the [`RecordSource`] capability that
//! reads them.
use async_trait::async_trait;
use seeder_gen::Value;
use serde_json::Value as Json;

use crate::{
    registry::{Cast, ModelSchema, PivotRelation},
    Result,
};

/// Snapshot of one row: column name to raw value, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeBag {
    columns: Vec<(String, Json)>,
}

/// Rows of one table in query order.
pub type RecordSet = Vec<AttributeBag>;

impl AttributeBag {
    #[must_use]
    pub fn new(columns: Vec<(String, Json)>) -> Self {
        Self { columns }
    }

    /// Columns of a JSON object row. Anything else yields an empty bag.
    #[must_use]
    pub fn from_json(row: Json) -> Self {
        match row {
            Json::Object(map) => Self::new(map.into_iter().collect()),
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Json> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Json)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Cast attributes ready for rendering, leaving out `excluded` columns.
    #[must_use]
    pub fn attributes(&self, schema: Option<&ModelSchema>, excluded: &[&str]) -> Vec<(String, Value)> {
        self.iter()
            .filter(|(column, _)| !excluded.contains(column))
            .map(|(column, raw)| {
                let cast = schema.and_then(|schema| schema.cast(column));
                (column.to_string(), cast_value(raw, cast))
            })
            .collect()
    }
}

/// Record ordering requested on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ordering {
    pub by: Option<String>,
    pub by_desc: Option<String>,
}

/// Reads records of models and join tables, bypassing any query scope.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Every row of the model's table.
    async fn records(&self, schema: &ModelSchema, order: &Ordering) -> Result<RecordSet>;

    /// Join table rows whose `foreign_pivot_key` equals `parent_key`.
    async fn pivot_rows(&self, pivot: &PivotRelation, parent_key: &Json) -> Result<RecordSet>;
}

/// Interpret a raw column value according to its cast.
///
/// A cast that does not fit the raw value falls back to the value as read.
/// Decimals read as text stay text, keeping their precision.
#[must_use]
pub fn cast_value(raw: &Json, cast: Option<&Cast>) -> Value {
    match (cast, raw) {
        (_, Json::Null) => Value::Null,
        (Some(Cast::Temporal), Json::String(text)) => Value::Temporal(text.clone()),
        (Some(Cast::Temporal), Json::Number(number)) => Value::Temporal(number.to_string()),
        (Some(Cast::Json), Json::String(text)) => serde_json::from_str::<Json>(text)
            .map_or_else(|_| Value::Text(text.clone()), |parsed| Value::from(&parsed)),
        (Some(Cast::Json), Json::Array(_) | Json::Object(_)) => Value::from(raw),
        (Some(Cast::Bool), Json::Number(number)) => number
            .as_i64()
            .map_or_else(|| Value::from(raw), |flag| Value::Bool(flag != 0)),
        (Some(Cast::Bool), Json::String(text)) => match text.as_str() {
            "1" | "true" => Value::Bool(true),
            "0" | "false" | "" => Value::Bool(false),
            _ => Value::Text(text.clone()),
        },
        (Some(Cast::Int), Json::String(text)) => text
            .trim()
            .parse::<i64>()
            .map_or_else(|_| Value::Text(text.clone()), Value::Int),
        (Some(Cast::Int), Json::Bool(flag)) => Value::Int(i64::from(*flag)),
        (Some(Cast::Float), Json::Number(number)) => number
            .as_f64()
            .map_or_else(|| Value::from(raw), Value::Float),
        _ => Value::from(raw),
    }
}
