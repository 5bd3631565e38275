//! Collapse joined rows into one record per entity.

use crate::config::{IncludeDirection, ResolvedTable};
use crate::sql::{include_column_alias, JoinSelect};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Group `rows` by the main table's primary key, in first-seen order, and nest each include:
/// to_one as an object (or null), to_many as an array without duplicate related ids.
///
/// Output keys are API names (`releaseDate`, `categoryId`).
pub fn hydrate(table: &ResolvedTable, joins: &[JoinSelect<'_>], rows: Vec<Value>) -> Vec<Value> {
    let mut records: Vec<Map<String, Value>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Value::Object(row) = row else { continue };
        let Some(pk) = row.get(&table.pk_column).filter(|v| !v.is_null()) else {
            continue;
        };
        let key = pk.to_string();
        let slot = match index.get(&key).copied() {
            Some(i) => i,
            None => {
                records.push(main_record(table, joins, &row));
                index.insert(key, records.len() - 1);
                records.len() - 1
            }
        };
        let record = &mut records[slot];
        for join in joins {
            let Some(related) = related_record(join, &row) else { continue };
            attach(record, join, related);
        }
    }

    records.into_iter().map(Value::Object).collect()
}

fn main_record(table: &ResolvedTable, joins: &[JoinSelect<'_>], row: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for c in &table.columns {
        out.insert(c.api_name.clone(), row.get(&c.name).cloned().unwrap_or(Value::Null));
    }
    for join in joins {
        let empty = match join.include.direction {
            IncludeDirection::ToOne => Value::Null,
            IncludeDirection::ToMany => Value::Array(Vec::new()),
        };
        out.insert(join.include.name.clone(), empty);
    }
    out
}

/// The related entity carried by `row`, or `None` when the LEFT JOIN found no match.
fn related_record(join: &JoinSelect<'_>, row: &Map<String, Value>) -> Option<Map<String, Value>> {
    let name = &join.include.name;
    let pk_alias = include_column_alias(name, &join.related.pk_column);
    if row.get(&pk_alias).map_or(true, Value::is_null) {
        return None;
    }
    let mut out = Map::new();
    for c in &join.related.columns {
        let alias = include_column_alias(name, &c.name);
        out.insert(c.api_name.clone(), row.get(&alias).cloned().unwrap_or(Value::Null));
    }
    Some(out)
}

fn attach(record: &mut Map<String, Value>, join: &JoinSelect<'_>, related: Map<String, Value>) {
    let pk = join
        .related
        .column(&join.related.pk_column)
        .map(|c| c.api_name.as_str())
        .unwrap_or("id");
    match record.get_mut(&join.include.name) {
        Some(Value::Array(items)) => {
            let seen = items.iter().any(|item| item.get(pk) == related.get(pk));
            if !seen {
                items.push(Value::Object(related));
            }
        }
        Some(slot) if slot.is_null() => *slot = Value::Object(related),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{app_config, resolve, ResolvedModel};
    use serde_json::json;

    fn model() -> ResolvedModel {
        resolve(&app_config("public")).unwrap()
    }

    fn category_row(id: &str, task: Option<(&str, &str)>) -> Value {
        let (task_id, title, category_id) = match task {
            Some((i, t)) => (json!(i), json!(t), json!(id)),
            None => (Value::Null, Value::Null, Value::Null),
        };
        json!({
            "id": id,
            "name": "Work",
            "created_at": "2024-01-01T00:00:00+00:00",
            "updated_at": "2024-01-01T00:00:00+00:00",
            "tasks__id": task_id,
            "tasks__title": title,
            "tasks__description": null,
            "tasks__category_id": category_id,
            "tasks__created_at": null,
            "tasks__updated_at": null,
        })
    }

    #[test]
    fn joined_rows_collapse_per_entity() {
        let model = model();
        let categories = model.table("categories").unwrap();
        let joins = [JoinSelect {
            include: categories.include("tasks").unwrap(),
            related: model.table("tasks").unwrap(),
        }];
        let rows = vec![
            category_row("c1", Some(("t1", "a"))),
            category_row("c1", Some(("t2", "b"))),
            category_row("c2", None),
            category_row("c1", Some(("t1", "a"))),
        ];
        let out = hydrate(categories, &joins, rows);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["id"], "c1");
        assert_eq!(out[0]["createdAt"], "2024-01-01T00:00:00+00:00");
        let tasks = out[0]["tasks"].as_array().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1]["title"], "b");
        assert_eq!(tasks[1]["categoryId"], "c1");
        assert_eq!(out[1]["tasks"], json!([]));
    }

    #[test]
    fn to_one_include_is_object_or_null() {
        let model = model();
        let tasks = model.table("tasks").unwrap();
        let joins = [JoinSelect {
            include: tasks.include("category").unwrap(),
            related: model.table("categories").unwrap(),
        }];
        let rows = vec![
            json!({ "id": "t1", "title": "a", "category_id": "c1", "category__id": "c1", "category__name": "Work" }),
            json!({ "id": "t2", "title": "b", "category_id": null, "category__id": null, "category__name": null }),
        ];
        let out = hydrate(tasks, &joins, rows);
        assert_eq!(out[0]["category"]["name"], "Work");
        assert_eq!(out[1]["category"], Value::Null);
        assert_eq!(out[1]["description"], Value::Null);
    }

    #[test]
    fn no_joins_maps_columns_to_api_names() {
        let model = model();
        let movies = model.table("movies").unwrap();
        let rows = vec![json!({ "id": "m1", "title": "Heat", "release_date": "1995-12-15T00:00:00+00:00" })];
        let out = hydrate(movies, &[], rows);
        assert_eq!(out[0]["releaseDate"], "1995-12-15T00:00:00+00:00");
        assert!(out[0].get("release_date").is_none());
    }
}
