//! Build the resolved model from declarations.

use crate::case::{to_camel_case, to_snake_case};
use crate::config::resolved::{
    ColumnInfo, IncludeDirection, IncludeSpec, ResolvedModel, ResolvedTable, ResolvedWorkflow,
};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use std::collections::HashMap;

/// Route for a workflow: `/{tag}{path}` with no trailing slash ("/actors", "/actors/archive").
pub fn route_path(tag: &str, path: &str) -> String {
    let tag = tag.trim_matches('/');
    let path = path.trim_end_matches('/');
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        format!("/{}", tag)
    } else {
        format!("/{}/{}", tag, path)
    }
}

/// Column name for a declared field: relations store `<name>_id`.
fn column_name(field: &FieldConfig) -> String {
    match field.kind {
        FieldKind::Relation { .. } => format!("{}_id", to_snake_case(&field.name)),
        _ => to_snake_case(&field.name),
    }
}

fn column_pg_type(kind: &FieldKind) -> Option<String> {
    match kind {
        FieldKind::Datetime => Some("timestamptz".into()),
        FieldKind::Relation { .. } => Some("uuid".into()),
        FieldKind::ShortText | FieldKind::LongText | FieldKind::Url => None,
    }
}

/// Build resolved model from app config (validates first).
pub fn resolve(config: &AppConfig) -> Result<ResolvedModel, ConfigError> {
    validate(config)?;

    let declared: Vec<&TableConfig> = config.features.iter().flat_map(|f| f.tables.iter()).collect();

    let mut tables = Vec::new();
    let mut table_by_name = HashMap::new();
    for table in &declared {
        let mut columns = vec![ColumnInfo {
            name: "id".into(),
            api_name: "id".into(),
            is_pk: true,
            has_default: true,
            pg_type: Some("uuid".into()),
        }];
        for f in &table.fields {
            let name = column_name(f);
            columns.push(ColumnInfo {
                api_name: to_camel_case(&name),
                name,
                is_pk: false,
                has_default: false,
                pg_type: column_pg_type(&f.kind),
            });
        }
        for name in ["created_at", "updated_at"] {
            columns.push(ColumnInfo {
                name: name.to_string(),
                api_name: to_camel_case(name),
                is_pk: false,
                has_default: true,
                pg_type: Some("timestamptz".into()),
            });
        }

        let resolved = ResolvedTable {
            name: table.name.clone(),
            schema_name: config.schema.clone(),
            table_name: to_snake_case(&table.name),
            pk_column: "id".into(),
            columns,
            includes: build_includes_for_table(table, &declared),
        };
        table_by_name.insert(resolved.name.clone(), resolved.clone());
        tables.push(resolved);
    }

    let mut workflows = Vec::new();
    let mut workflow_by_name = HashMap::new();
    for feature in &config.features {
        for w in &feature.workflows {
            let resolved = ResolvedWorkflow {
                name: w.name.clone(),
                feature: feature.name.clone(),
                method: w.trigger.method,
                route: route_path(&w.tag, &w.trigger.path),
                input: w.trigger.input.clone(),
            };
            workflow_by_name.insert(resolved.name.clone(), resolved.clone());
            workflows.push(resolved);
        }
    }

    tracing::debug!(tables = tables.len(), workflows = workflows.len(), "model resolved");
    Ok(ResolvedModel {
        tables,
        table_by_name,
        workflows,
        workflow_by_name,
    })
}

/// Includes for `ours`: each of our relations to a declared table (to_one), and each declared
/// relation pointing at us (to_many, or to_one when the relation is one-to-one).
/// Relations to external tables are not joinable. First declaration wins on a name clash.
fn build_includes_for_table(ours: &TableConfig, declared: &[&TableConfig]) -> Vec<IncludeSpec> {
    let is_declared = |name: &str| declared.iter().any(|t| t.name == name);
    let mut includes: Vec<IncludeSpec> = Vec::new();
    let mut push = |spec: IncludeSpec| {
        if !includes.iter().any(|i| i.name == spec.name) {
            includes.push(spec);
        }
    };

    for f in &ours.fields {
        if let FieldKind::Relation { references, .. } = &f.kind {
            if is_declared(references) {
                push(IncludeSpec {
                    name: f.name.clone(),
                    direction: IncludeDirection::ToOne,
                    related_table: references.clone(),
                    our_key_column: column_name(f),
                    their_key_column: "id".into(),
                });
            }
        }
    }

    for other in declared {
        for f in &other.fields {
            if let FieldKind::Relation {
                references,
                relationship,
            } = &f.kind
            {
                if *references != ours.name {
                    continue;
                }
                let direction = match relationship {
                    Relationship::ManyToOne => IncludeDirection::ToMany,
                    Relationship::OneToOne => IncludeDirection::ToOne,
                };
                push(IncludeSpec {
                    name: other.name.clone(),
                    direction,
                    related_table: other.name.clone(),
                    our_key_column: "id".into(),
                    their_key_column: column_name(f),
                });
            }
        }
    }
    includes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::app_config;

    fn model() -> ResolvedModel {
        resolve(&app_config("public")).expect("builtin config resolves")
    }

    #[test]
    fn route_path_joins_tag_and_path() {
        assert_eq!(route_path("actors", "/"), "/actors");
        assert_eq!(route_path("/actors/", ""), "/actors");
        assert_eq!(route_path("actors", "/archive/"), "/actors/archive");
    }

    #[test]
    fn tables_get_snake_case_names_and_implicit_columns() {
        let model = model();
        let t = model.table("movieActors").unwrap();
        assert_eq!(t.table_name, "movie_actors");
        let names: Vec<&str> = t.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["id", "actor_id", "movie_id", "created_at", "updated_at"]);
        assert_eq!(t.column("actorId").map(|c| c.name.as_str()), Some("actor_id"));
    }

    #[test]
    fn api_names_resolve_to_columns() {
        let model = model();
        let movies = model.table("movies").unwrap();
        let c = movies.column("releaseDate").unwrap();
        assert_eq!(c.name, "release_date");
        assert_eq!(c.pg_type.as_deref(), Some("timestamptz"));
        assert!(movies.column("release_date").is_some());
        assert!(movies.column("rating").is_none());
    }

    #[test]
    fn includes_cover_both_directions() {
        let model = model();
        let tasks = model.table("tasks").unwrap();
        let category = tasks.include("category").unwrap();
        assert_eq!(category.direction, IncludeDirection::ToOne);
        assert_eq!(category.our_key_column, "category_id");
        assert_eq!(category.their_key_column, "id");

        let categories = model.table("categories").unwrap();
        let tasks_inc = categories.include("tasks").unwrap();
        assert_eq!(tasks_inc.direction, IncludeDirection::ToMany);
        assert_eq!(tasks_inc.our_key_column, "id");
        assert_eq!(tasks_inc.their_key_column, "category_id");
    }

    #[test]
    fn one_to_one_reverse_is_to_one() {
        let model = model();
        let movies = model.table("movies").unwrap();
        assert_eq!(movies.include("movieTrailers").unwrap().direction, IncludeDirection::ToOne);
        assert_eq!(movies.include("movieActors").unwrap().direction, IncludeDirection::ToMany);
    }

    #[test]
    fn external_tables_are_not_joinable() {
        let model = model();
        let collection = model.table("collection").unwrap();
        assert!(collection.include("user").is_none());
        assert!(collection.include("movie").is_some());
        assert!(model.table("users").is_err());
    }

    #[test]
    fn workflows_are_indexed_by_name() {
        let model = model();
        let wf = model.workflow("ListActorsWorkflow").unwrap();
        assert_eq!(wf.route, "/actors");
        assert_eq!(wf.method, HttpMethod::Get);
        assert_eq!(wf.feature, "movies");
        assert!(model.workflow("DeleteEverythingWorkflow").is_err());
        assert_eq!(model.workflows.len(), 8);
    }
}
