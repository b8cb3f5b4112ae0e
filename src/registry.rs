//! # Model Registry
//!
//! Table, cast and many-to-many metadata for every model, built once from the
//! configuration. Models without an entry follow Eloquent's naming
//! conventions.
use std::collections::BTreeMap;

use cruet::{case::snake::to_snake_case, Inflector};

use crate::{
    config::{self, ModelEntry, PivotEntry},
    discovery::ModelDescriptor,
};

/// Columns Eloquent casts to dates on every model.
pub const DEFAULT_DATE_COLUMNS: &[&str] = &["created_at", "updated_at", "deleted_at"];

const DEFAULT_PARENT_KEY: &str = "id";

/// How a raw column value is interpreted before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cast {
    /// `date`, `datetime`, `timestamp` and their immutable variants
    Temporal,
    /// `array`, `json`, `object`, `collection`
    Json,
    Bool,
    Int,
    /// `float`, `double`, `real`, `decimal`
    Float,
    /// Custom cast classes and anything else, rendered as read
    Custom(String),
}

impl From<&str> for Cast {
    fn from(input: &str) -> Self {
        // `datetime:Y-m-d`, `decimal:2`
        let kind = input.split(':').next().unwrap_or_default();
        match kind {
            "date" | "datetime" | "immutable_date" | "immutable_datetime" | "timestamp" => {
                Self::Temporal
            }
            "array" | "json" | "object" | "collection" => Self::Json,
            "bool" | "boolean" => Self::Bool,
            "int" | "integer" => Self::Int,
            "float" | "double" | "real" | "decimal" => Self::Float,
            _ => Self::Custom(input.to_string()),
        }
    }
}

/// A many-to-many relation of a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotRelation {
    /// Relation accessor name, e.g. `roles`
    pub relation: String,
    /// Join table
    pub table: String,
    /// Laravel connection name for generated inserts
    pub connection: String,
    /// Join table column pointing at the parent model
    pub foreign_pivot_key: String,
    /// Join table column pointing at the related model
    pub related_pivot_key: String,
    /// Parent column referenced by `foreign_pivot_key`
    pub parent_key: String,
}

/// Everything the generator needs to know about one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSchema {
    pub class_name: String,
    pub table: String,
    pub casts: BTreeMap<String, Cast>,
    pub pivots: Vec<PivotRelation>,
}

impl ModelSchema {
    #[must_use]
    pub fn cast(&self, column: &str) -> Option<&Cast> {
        self.casts.get(column)
    }
}

/// Table name of a model class, e.g. `BlogPost` → `blog_posts`.
#[must_use]
pub fn table_name(class_name: &str) -> String {
    to_snake_case(class_name).to_plural()
}

/// Join table of two models, e.g. `User` and `Role` → `role_user`.
#[must_use]
pub fn joining_table(parent: &str, related: &str) -> String {
    let mut segments = [to_snake_case(parent), to_snake_case(related)];
    segments.sort();
    segments.join("_")
}

/// Join table column referencing a model, e.g. `BlogPost` → `blog_post_id`.
#[must_use]
pub fn foreign_key(class_name: &str) -> String {
    format!("{}_id", to_snake_case(class_name))
}

/// Registry of model schemas keyed by class name or fully qualified class
/// name.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: BTreeMap<String, ModelEntry>,
    default_connection: String,
}

impl ModelRegistry {
    #[must_use]
    pub fn new(entries: BTreeMap<String, ModelEntry>, default_connection: impl Into<String>) -> Self {
        Self {
            entries,
            default_connection: default_connection.into(),
        }
    }

    /// Build the registry from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &config::Config) -> Self {
        let connection = config
            .seeder
            .connection
            .clone()
            .unwrap_or_else(|| config.database.connection_name().to_string());
        Self::new(config.seeder.models.clone(), connection)
    }

    fn entry(&self, model: &ModelDescriptor) -> Option<&ModelEntry> {
        self.entries
            .get(&model.fqcn())
            .or_else(|| self.entries.get(&model.class_name))
    }

    /// Schema of a discovered model.
    #[must_use]
    pub fn schema(&self, model: &ModelDescriptor) -> ModelSchema {
        let entry = self.entry(model).cloned().unwrap_or_default();

        let mut casts = DEFAULT_DATE_COLUMNS
            .iter()
            .map(|column| ((*column).to_string(), Cast::Temporal))
            .collect::<BTreeMap<_, _>>();
        for (column, cast) in &entry.casts {
            casts.insert(column.clone(), Cast::from(cast.as_str()));
        }

        let pivots = entry
            .pivots
            .iter()
            .map(|(relation, pivot)| self.pivot_relation(&model.class_name, relation, pivot))
            .collect();

        ModelSchema {
            class_name: model.class_name.clone(),
            table: entry
                .table
                .unwrap_or_else(|| table_name(&model.class_name)),
            casts,
            pivots,
        }
    }

    fn pivot_relation(&self, parent: &str, relation: &str, pivot: &PivotEntry) -> PivotRelation {
        PivotRelation {
            relation: relation.to_string(),
            table: pivot
                .table
                .clone()
                .unwrap_or_else(|| joining_table(parent, &pivot.related)),
            connection: pivot
                .connection
                .clone()
                .unwrap_or_else(|| self.default_connection.clone()),
            foreign_pivot_key: pivot
                .foreign_pivot_key
                .clone()
                .unwrap_or_else(|| foreign_key(parent)),
            related_pivot_key: pivot
                .related_pivot_key
                .clone()
                .unwrap_or_else(|| foreign_key(&pivot.related)),
            parent_key: pivot
                .parent_key
                .clone()
                .unwrap_or_else(|| DEFAULT_PARENT_KEY.to_string()),
        }
    }
}
