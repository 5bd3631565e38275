//! Statement execution against PostgreSQL: save, patch, list and count.

use crate::config::ResolvedTable;
use crate::error::AppError;
use crate::sql::{insert, update, PgBindValue, QueryBuf};
use serde_json::Value;
use sqlx::PgPool;
use std::collections::HashMap;

pub struct CrudService;

impl CrudService {
    /// Insert one row from API-named fields. Returns the new id.
    pub async fn save(
        pool: &PgPool,
        table: &ResolvedTable,
        fields: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let values = Self::to_columns(table, fields)?;
        let q = insert(table, &values);
        let row = Self::query_optional(pool, &q)
            .await?
            .ok_or_else(|| AppError::Db(sqlx::Error::RowNotFound))?;
        Self::pk_of(table, row)
    }

    /// Update only the supplied API-named fields of the row with `id`. `None` when no such row.
    pub async fn patch(
        pool: &PgPool,
        table: &ResolvedTable,
        id: &Value,
        fields: &HashMap<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let values = Self::to_columns(table, fields)?;
        let q = update(table, id, &values);
        match Self::query_optional(pool, &q).await? {
            Some(row) => Ok(Some(Self::pk_of(table, row)?)),
            None => Ok(None),
        }
    }

    pub async fn query_many(pool: &PgPool, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    pub async fn query_count(pool: &PgPool, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let n = query.fetch_one(pool).await?;
        Ok(n.max(0) as u64)
    }

    async fn query_optional(pool: &PgPool, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    /// Map API field names (`categoryId`) to column names (`category_id`).
    fn to_columns(
        table: &ResolvedTable,
        fields: &HashMap<String, Value>,
    ) -> Result<HashMap<String, Value>, AppError> {
        fields
            .iter()
            .map(|(k, v)| {
                let column = table.require_column(k)?;
                Ok((column.name.clone(), v.clone()))
            })
            .collect()
    }

    fn pk_of(table: &ResolvedTable, row: Value) -> Result<Value, AppError> {
        match row {
            Value::Object(mut map) => map
                .remove(&table.pk_column)
                .ok_or_else(|| AppError::Db(sqlx::Error::ColumnNotFound(table.pk_column.clone()))),
            _ => Err(AppError::Db(sqlx::Error::RowNotFound)),
        }
    }
}

pub(crate) fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        let v = cell_to_value(row, name);
        map.insert(name.to_string(), v);
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<serde_json::Value>, _>(name) {
        return j;
    }
    Value::Null
}
