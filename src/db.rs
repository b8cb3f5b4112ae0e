//! # Database Operations
//!
//! Connection setup and the [`RecordSource`] that reads rows straight from the
//! tables, so no model scope ever filters them.

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Alias, Asterisk, Expr, Order, Query, SelectStatement},
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbConn,
    FromQueryResult, JsonValue, Statement,
};
use tracing::info;

use crate::{
    config,
    record::{AttributeBag, Ordering, RecordSet, RecordSource},
    registry::{ModelSchema, PivotRelation},
    Result,
};

/// Establish a connection to the database using the provided configuration
/// settings.
///
/// # Errors
///
/// Returns [`crate::Error::DB`] if an error occurs during the database
/// connection establishment.
pub async fn connect(config: &config::Database) -> Result<DbConn> {
    let mut opt = ConnectOptions::new(&config.uri);
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_millis(config.connect_timeout))
        .idle_timeout(Duration::from_millis(config.idle_timeout))
        .sqlx_logging(config.enable_logging);

    if let Some(acquire_timeout) = config.acquire_timeout {
        opt.acquire_timeout(Duration::from_millis(acquire_timeout));
    }

    Ok(Database::connect(opt).await?)
}

fn select_records(table: &str, order: &Ordering) -> SelectStatement {
    let mut query = Query::select();
    query.column(Asterisk).from(Alias::new(table));
    if let Some(column) = &order.by {
        query.order_by(Alias::new(column), Order::Asc);
    }
    if let Some(column) = &order.by_desc {
        query.order_by(Alias::new(column), Order::Desc);
    }
    query
}

fn select_pivot_rows(pivot: &PivotRelation, parent_key: sea_orm::Value) -> SelectStatement {
    let mut query = Query::select();
    query
        .column(Asterisk)
        .from(Alias::new(&pivot.table))
        .and_where(Expr::col(Alias::new(&pivot.foreign_pivot_key)).eq(parent_key));
    query
}

/// Bind value for a parent key read from a row. `None` for keys that can
/// never match a join table row.
fn key_value(raw: &JsonValue) -> Option<sea_orm::Value> {
    match raw {
        JsonValue::Number(number) => number
            .as_i64()
            .map(sea_orm::Value::from)
            .or_else(|| number.as_f64().map(sea_orm::Value::from)),
        JsonValue::String(text) => Some(sea_orm::Value::from(text.clone())),
        JsonValue::Bool(flag) => Some(sea_orm::Value::from(*flag)),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

/// Reads records through a `sea-orm` connection.
#[derive(Debug, Clone)]
pub struct DbRecordSource {
    db: DatabaseConnection,
}

impl DbRecordSource {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn build(&self, query: &SelectStatement) -> Statement {
        let backend: DbBackend = self.db.get_database_backend();
        backend.build(query)
    }

    async fn fetch(&self, stmt: Statement) -> Result<RecordSet> {
        let rows = JsonValue::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows.into_iter().map(AttributeBag::from_json).collect())
    }
}

#[async_trait]
impl RecordSource for DbRecordSource {
    async fn records(&self, schema: &ModelSchema, order: &Ordering) -> Result<RecordSet> {
        let stmt = self.build(&select_records(&schema.table, order));
        info!(model = %schema.class_name, table = %schema.table, "fetching records");
        self.fetch(stmt).await
    }

    async fn pivot_rows(&self, pivot: &PivotRelation, parent_key: &JsonValue) -> Result<RecordSet> {
        let Some(key) = key_value(parent_key) else {
            return Ok(vec![]);
        };
        let stmt = self.build(&select_pivot_rows(pivot, key));
        self.fetch(stmt).await
    }
}
