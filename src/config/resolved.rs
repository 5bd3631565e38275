//! Resolved model: declarations validated and flattened for runtime use.

use crate::config::{HttpMethod, InputField};
use crate::error::{AppError, ConfigError};
use std::collections::HashMap;

/// Direction of a related-include: to_one (we have FK to them, or they hold a one-to-one FK to
/// us) or to_many (they have a many-to-one FK to us).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncludeDirection {
    ToOne,
    ToMany,
}

/// A relation that list queries may join and hydrate into each record.
#[derive(Clone, Debug)]
pub struct IncludeSpec {
    /// API name of the include: our relation field for to_one, the other table's name for to_many.
    pub name: String,
    pub direction: IncludeDirection,
    /// Declared name of the related table (for lookup in model).
    pub related_table: String,
    /// Our column used in the join (our FK for to_one; our PK for to_many).
    pub our_key_column: String,
    /// Their column used in the join (their PK for to_one; their FK for to_many).
    pub their_key_column: String,
}

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    /// Database column (snake_case).
    pub name: String,
    /// Name used by clients in bodies, query strings and sort specs (camelCase).
    pub api_name: String,
    pub is_pk: bool,
    /// Whether the column has a DB default (e.g. gen_random_uuid(), NOW()).
    pub has_default: bool,
    /// PostgreSQL type name for SQL casts (e.g. "timestamptz") when binding string values.
    pub pg_type: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ResolvedTable {
    /// Declared name (e.g. "movieActors").
    pub name: String,
    pub schema_name: String,
    /// Database table name (e.g. "movie_actors").
    pub table_name: String,
    pub pk_column: String,
    pub columns: Vec<ColumnInfo>,
    pub includes: Vec<IncludeSpec>,
}

impl ResolvedTable {
    /// Look up a column by API name, falling back to the raw column name.
    pub fn column(&self, field: &str) -> Option<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.api_name == field)
            .or_else(|| self.columns.iter().find(|c| c.name == field))
    }

    /// Resolve a client-supplied field to its column, or fail with `InvalidField`.
    pub fn require_column(&self, field: &str) -> Result<&ColumnInfo, AppError> {
        if field.is_empty() {
            return Err(self.invalid_field(field));
        }
        self.column(field).ok_or_else(|| self.invalid_field(field))
    }

    pub fn include(&self, name: &str) -> Option<&IncludeSpec> {
        self.includes.iter().find(|i| i.name == name)
    }

    pub fn invalid_field(&self, field: &str) -> AppError {
        AppError::InvalidField {
            table: self.name.clone(),
            field: field.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedWorkflow {
    pub name: String,
    pub feature: String,
    pub method: HttpMethod,
    /// Full route, `/{tag}{path}` without a trailing slash.
    pub route: String,
    pub input: Vec<InputField>,
}

#[derive(Clone, Debug)]
pub struct ResolvedModel {
    pub tables: Vec<ResolvedTable>,
    pub table_by_name: HashMap<String, ResolvedTable>,
    pub workflows: Vec<ResolvedWorkflow>,
    pub workflow_by_name: HashMap<String, ResolvedWorkflow>,
}

impl ResolvedModel {
    pub fn table(&self, name: &str) -> Result<&ResolvedTable, AppError> {
        self.table_by_name.get(name).ok_or_else(|| {
            AppError::Config(ConfigError::MissingReference {
                kind: "table",
                id: name.to_string(),
            })
        })
    }

    pub fn workflow(&self, name: &str) -> Result<&ResolvedWorkflow, AppError> {
        self.workflow_by_name
            .get(name)
            .ok_or_else(|| AppError::Config(ConfigError::UnknownWorkflow(name.to_string())))
    }
}
