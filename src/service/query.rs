//! [`QueryBuilder`] over one resolved table, executed with sqlx.

use crate::config::{ResolvedModel, ResolvedTable};
use crate::error::AppError;
use crate::query::{OrderDirection, QueryBuilder};
use crate::service::hydrate::hydrate;
use crate::service::CrudService;
use crate::sql::{count, select_list, JoinSelect, OrderTerm, QueryBuf, SelectParts};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

pub struct TableQuery<'a> {
    pool: &'a PgPool,
    model: &'a ResolvedModel,
    table: &'a ResolvedTable,
    order: Vec<OrderTerm>,
    joins: Vec<JoinSelect<'a>>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<'a> TableQuery<'a> {
    pub fn new(pool: &'a PgPool, model: &'a ResolvedModel, table: &str) -> Result<Self, AppError> {
        Ok(TableQuery {
            pool,
            model,
            table: model.table(table)?,
            order: Vec::new(),
            joins: Vec::new(),
            limit: None,
            offset: None,
        })
    }

    pub fn table(&self) -> &'a ResolvedTable {
        self.table
    }

    /// Join a declared relation by its include name. Joining the same include twice is a no-op.
    pub fn include(&mut self, name: &str) -> Result<&mut Self, AppError> {
        let table = self.table;
        let include = table.include(name).ok_or_else(|| table.invalid_field(name))?;
        if self.joins.iter().any(|j| j.include.name == include.name) {
            return Ok(self);
        }
        let related = self.model.table(&include.related_table)?;
        self.joins.push(JoinSelect { include, related });
        Ok(self)
    }

    fn parts(&self) -> SelectParts<'_> {
        SelectParts {
            table: self.table,
            order: &self.order,
            joins: &self.joins,
            limit: self.limit,
            offset: self.offset,
        }
    }

    pub fn to_select_sql(&self) -> QueryBuf {
        select_list(&self.parts())
    }

    pub fn to_count_sql(&self) -> QueryBuf {
        count(&self.parts())
    }
}

#[async_trait]
impl<'a> QueryBuilder for TableQuery<'a> {
    fn order_by(&mut self, field: &str, direction: OrderDirection) -> Result<&mut Self, AppError> {
        let column = self.table.require_column(field)?.name.clone();
        self.order.push(OrderTerm { column, direction });
        Ok(self)
    }

    fn limit(&mut self, n: u64) -> &mut Self {
        self.limit = Some(n);
        self
    }

    fn offset(&mut self, n: u64) -> &mut Self {
        self.offset = Some(n);
        self
    }

    async fn get_count(&self) -> Result<u64, AppError> {
        CrudService::query_count(self.pool, &self.to_count_sql()).await
    }

    async fn execute(&self) -> Result<Vec<Value>, AppError> {
        let rows = CrudService::query_many(self.pool, &self.to_select_sql()).await?;
        Ok(hydrate(self.table, &self.joins, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{app_config, resolve};
    use crate::query::{deferred_join_pagination, handle_order_by, PaginationRequest};
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/studio")
            .unwrap()
    }

    #[tokio::test]
    async fn order_by_maps_api_names_to_columns() {
        let pool = lazy_pool();
        let model = resolve(&app_config("public")).unwrap();
        let mut q = TableQuery::new(&pool, &model, "movies").unwrap();
        handle_order_by(&mut q, "title,-releaseDate").unwrap();
        let sql = q.to_select_sql().sql;
        assert!(sql.ends_with(
            "ORDER BY main.\"title\" ASC, main.\"release_date\" DESC, main.\"id\" ASC"
        ));
    }

    #[tokio::test]
    async fn unknown_order_field_fails_before_sql() {
        let pool = lazy_pool();
        let model = resolve(&app_config("public")).unwrap();
        let mut q = TableQuery::new(&pool, &model, "movies").unwrap();
        let err = handle_order_by(&mut q, "title,rating").err().unwrap();
        assert!(matches!(err, AppError::InvalidField { ref field, .. } if field == "rating"));
        let err = handle_order_by(&mut q, "title,").err().unwrap();
        assert!(matches!(err, AppError::InvalidField { ref field, .. } if field.is_empty()));
    }

    #[tokio::test]
    async fn pagination_window_lands_in_id_subquery() {
        let pool = lazy_pool();
        let model = resolve(&app_config("public")).unwrap();
        let mut q = TableQuery::new(&pool, &model, "categories").unwrap();
        q.include("tasks").unwrap();
        deferred_join_pagination::<_, Value>(&mut q, PaginationRequest::new(10, 3, 95)).unwrap();
        let sql = q.to_select_sql().sql;
        assert!(sql.contains("ORDER BY main.\"id\" ASC LIMIT 10 OFFSET 20) page"), "{}", sql);
        assert_eq!(q.to_count_sql().sql, "SELECT COUNT(*) FROM \"public\".\"categories\" main");
    }

    #[tokio::test]
    async fn huge_page_number_offset_stays_a_bigint() {
        let pool = lazy_pool();
        let model = resolve(&app_config("public")).unwrap();
        let mut q = TableQuery::new(&pool, &model, "actors").unwrap();
        deferred_join_pagination::<_, Value>(&mut q, PaginationRequest::new(100, 100_000_000_000_000_000, 5))
            .unwrap();
        let sql = q.to_select_sql().sql;
        assert!(sql.contains("LIMIT 100 OFFSET 9223372036854775807"), "{}", sql);
    }

    #[tokio::test]
    async fn unknown_include_is_invalid_field() {
        let pool = lazy_pool();
        let model = resolve(&app_config("public")).unwrap();
        let mut q = TableQuery::new(&pool, &model, "tasks").unwrap();
        assert!(q.include("category").is_ok());
        assert!(q.include("category").is_ok());
        assert_eq!(q.joins.len(), 1);
        assert!(matches!(q.include("owner"), Err(AppError::InvalidField { .. })));
    }
}
