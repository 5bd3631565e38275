//! Builds parameterized SELECT, COUNT, INSERT and UPDATE from the resolved model.

use crate::config::{ColumnInfo, IncludeSpec, ResolvedTable};
use crate::query::OrderDirection;
use serde_json::Value;
use std::collections::HashMap;

pub const MAIN_ALIAS: &str = "main";
const PAGE_ALIAS: &str = "page";

/// Separator between include name and column in joined column aliases (`tasks__title`).
pub const INCLUDE_SEPARATOR: &str = "__";

/// Quote identifier for PostgreSQL (safe: only from config).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(table: &ResolvedTable) -> String {
    format!("{}.{}", quoted(&table.schema_name), quoted(&table.table_name))
}

fn join_alias(index: usize) -> String {
    format!("j{}", index)
}

pub fn include_column_alias(include: &str, column: &str) -> String {
    format!("{}{}{}", include, INCLUDE_SEPARATOR, column)
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }

    /// Push a value and return its placeholder, cast to the column type when it has one.
    fn placeholder(&mut self, column: &ColumnInfo, v: Value) -> String {
        let n = self.push_param(v);
        column
            .pg_type
            .as_deref()
            .map(|t| format!("${}::{}", n, t))
            .unwrap_or_else(|| format!("${}", n))
    }
}

/// One include joined into a list query.
#[derive(Clone, Copy)]
pub struct JoinSelect<'a> {
    pub include: &'a IncludeSpec,
    pub related: &'a ResolvedTable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: String,
    pub direction: OrderDirection,
}

/// Everything a list query is made of. `limit`/`offset` count entities, not joined rows.
pub struct SelectParts<'a> {
    pub table: &'a ResolvedTable,
    pub order: &'a [OrderTerm],
    pub joins: &'a [JoinSelect<'a>],
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// `alias."col" AS "col"`, or `AS "include__col"` for joined tables.
fn select_column_list(table: &ResolvedTable, alias: &str, include: Option<&str>) -> Vec<String> {
    table
        .columns
        .iter()
        .map(|c| {
            let as_name = match include {
                Some(inc) => include_column_alias(inc, &c.name),
                None => c.name.clone(),
            };
            format!("{}.{} AS {}", alias, quoted(&c.name), quoted(&as_name))
        })
        .collect()
}

/// ORDER BY the requested terms, then the primary key so pages are stable.
fn order_clause(table: &ResolvedTable, order: &[OrderTerm]) -> String {
    let mut terms: Vec<String> = order
        .iter()
        .map(|t| format!("{}.{} {}", MAIN_ALIAS, quoted(&t.column), t.direction.as_sql()))
        .collect();
    if !order.iter().any(|t| t.column == table.pk_column) {
        terms.push(format!("{}.{} ASC", MAIN_ALIAS, quoted(&table.pk_column)));
    }
    format!(" ORDER BY {}", terms.join(", "))
}

fn limit_offset_clause(limit: Option<u64>, offset: Option<u64>) -> String {
    let limit_clause = limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let offset_clause = offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();
    format!("{}{}", limit_clause, offset_clause)
}

/// SELECT list. Without joins this is a plain ORDER BY/LIMIT/OFFSET over the table.
///
/// With joins and a window, the window is decided on primary keys alone in a subquery, and the
/// joins are applied only to the ids it returns:
/// `SELECT … FROM (SELECT main.id FROM t main ORDER BY … LIMIT n OFFSET m) page
///  JOIN t main ON main.id = page.id LEFT JOIN … ORDER BY …`.
pub fn select_list(parts: &SelectParts<'_>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(parts.table);
    let pk = quoted(&parts.table.pk_column);

    let mut select_parts = select_column_list(parts.table, MAIN_ALIAS, None);
    for (i, join) in parts.joins.iter().enumerate() {
        select_parts.extend(select_column_list(
            join.related,
            &join_alias(i),
            Some(&join.include.name),
        ));
    }

    let order = order_clause(parts.table, parts.order);
    let window = limit_offset_clause(parts.limit, parts.offset);
    let windowed = parts.limit.is_some() || parts.offset.is_some();

    let (from, tail) = if parts.joins.is_empty() {
        (format!("{} {}", table, MAIN_ALIAS), format!("{}{}", order, window))
    } else if windowed {
        let page = format!(
            "SELECT {m}.{pk} FROM {table} {m}{order}{window}",
            m = MAIN_ALIAS,
            pk = pk,
            table = table,
            order = order,
            window = window
        );
        (
            format!(
                "({page}) {p} JOIN {table} {m} ON {m}.{pk} = {p}.{pk}",
                page = page,
                p = PAGE_ALIAS,
                table = table,
                m = MAIN_ALIAS,
                pk = pk
            ),
            order.clone(),
        )
    } else {
        (format!("{} {}", table, MAIN_ALIAS), order.clone())
    };

    let joins: String = parts
        .joins
        .iter()
        .enumerate()
        .map(|(i, join)| {
            let alias = join_alias(i);
            format!(
                " LEFT JOIN {} {} ON {}.{} = {}.{}",
                qualified_table(join.related),
                alias,
                alias,
                quoted(&join.include.their_key_column),
                MAIN_ALIAS,
                quoted(&join.include.our_key_column)
            )
        })
        .collect();

    q.sql = format!("SELECT {} FROM {}{}{}", select_parts.join(", "), from, joins, tail);
    q
}

/// COUNT of entities: no joins, no order, no window.
pub fn count(parts: &SelectParts<'_>) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COUNT(*) FROM {} {}", qualified_table(parts.table), MAIN_ALIAS);
    q
}

/// INSERT from a map of column name to value. PK and defaulted columns are omitted when absent
/// so the database fills them. Returns the new primary key.
pub fn insert(table: &ResolvedTable, values: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in &table.columns {
        let val = values.get(&c.name).cloned();
        if val.is_none() && c.has_default {
            continue;
        }
        let val = val.unwrap_or(Value::Null);
        placeholders.push(q.placeholder(c, val));
        cols.push(quoted(&c.name));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(table),
        cols.join(", "),
        placeholders.join(", "),
        quoted(&table.pk_column)
    );
    q
}

/// UPDATE by id: SET only the columns present in `values`, and `updated_at = NOW()`.
/// Returns the primary key, or no row when the id does not exist.
pub fn update(table: &ResolvedTable, id: &Value, values: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in &table.columns {
        if c.is_pk || c.name == "created_at" || c.name == "updated_at" {
            continue;
        }
        let Some(v) = values.get(&c.name) else { continue };
        let rhs = q.placeholder(c, v.clone());
        sets.push(format!("{} = {}", quoted(&c.name), rhs));
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));

    let pk_col = table.columns.iter().find(|c| c.is_pk);
    let id_ph = match pk_col {
        Some(c) => q.placeholder(c, id.clone()),
        None => format!("${}", q.push_param(id.clone())),
    };
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        qualified_table(table),
        sets.join(", "),
        quoted(&table.pk_column),
        id_ph,
        quoted(&table.pk_column)
    );
    q
}
