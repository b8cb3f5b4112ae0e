//! # Test Utilities Module
//!
//! An in-memory [`RecordSource`] to exercise generation without a database.
//!
//! ```rust
//! use model_seeder::testing::MemoryRecordSource;
//! use serde_json::json;
//!
//! let source = MemoryRecordSource::default()
//!     .with_table("users", vec![json!({"id": 1, "name": "Ada"})])
//!     .with_table("role_user", vec![json!({"user_id": 1, "role_id": 2})])
//!     .failing("posts");
//! ```
use std::{
    cmp::Ordering as CmpOrdering,
    collections::{BTreeMap, BTreeSet},
};

use async_trait::async_trait;
use serde_json::Value as Json;

use crate::{
    record::{AttributeBag, Ordering, RecordSet, RecordSource},
    registry::{ModelSchema, PivotRelation},
    Error, Result,
};

/// Tables held in memory, rows kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordSource {
    tables: BTreeMap<String, Vec<Json>>,
    failing: BTreeSet<String>,
}

impl MemoryRecordSource {
    #[must_use]
    pub fn with_table(mut self, table: &str, rows: Vec<Json>) -> Self {
        self.tables.insert(table.to_string(), rows);
        self
    }

    /// Make every read of `table` fail.
    #[must_use]
    pub fn failing(mut self, table: &str) -> Self {
        self.failing.insert(table.to_string());
        self
    }

    fn rows(&self, table: &str) -> Result<Vec<Json>> {
        if self.failing.contains(table) {
            return Err(Error::Message(format!("no such table: {table}")));
        }
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }
}

fn compare(left: Option<&Json>, right: Option<&Json>) -> CmpOrdering {
    match (left, right) {
        (Some(Json::Number(l)), Some(Json::Number(r))) => l
            .as_f64()
            .partial_cmp(&r.as_f64())
            .unwrap_or(CmpOrdering::Equal),
        (Some(Json::String(l)), Some(Json::String(r))) => l.cmp(r),
        (Some(Json::Bool(l)), Some(Json::Bool(r))) => l.cmp(r),
        (None | Some(Json::Null), Some(_)) => CmpOrdering::Less,
        (Some(_), None | Some(Json::Null)) => CmpOrdering::Greater,
        _ => CmpOrdering::Equal,
    }
}

#[async_trait]
impl RecordSource for MemoryRecordSource {
    async fn records(&self, schema: &ModelSchema, order: &Ordering) -> Result<RecordSet> {
        let mut rows = self.rows(&schema.table)?;
        if let Some(column) = &order.by {
            rows.sort_by(|a, b| compare(a.get(column), b.get(column)));
        }
        if let Some(column) = &order.by_desc {
            rows.sort_by(|a, b| compare(b.get(column), a.get(column)));
        }
        Ok(rows.into_iter().map(AttributeBag::from_json).collect())
    }

    async fn pivot_rows(&self, pivot: &PivotRelation, parent_key: &Json) -> Result<RecordSet> {
        if parent_key.is_null() {
            return Ok(vec![]);
        }
        Ok(self
            .rows(&pivot.table)?
            .into_iter()
            .filter(|row| row.get(&pivot.foreign_pivot_key) == Some(parent_key))
            .map(AttributeBag::from_json)
            .collect())
    }
}
