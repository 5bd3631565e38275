//! Config validation: referential integrity, unique names and unique routes.

use crate::config::{route_path, AppConfig, FieldKind};
use crate::error::ConfigError;
use std::collections::HashSet;

/// Columns every table gets implicitly; declaring them as fields is an error.
pub const RESERVED_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.schema.trim().is_empty() {
        return Err(ConfigError::Validation("schema name must not be empty".into()));
    }

    let mut table_names: HashSet<&str> = HashSet::new();
    for name in &config.external_tables {
        if !table_names.insert(name.as_str()) {
            return Err(ConfigError::DuplicateTable(name.clone()));
        }
    }
    for feature in &config.features {
        for t in &feature.tables {
            if !table_names.insert(t.name.as_str()) {
                return Err(ConfigError::DuplicateTable(t.name.clone()));
            }
        }
    }

    for feature in &config.features {
        for t in &feature.tables {
            let mut field_names = HashSet::new();
            for f in &t.fields {
                if f.name.is_empty() || RESERVED_FIELDS.contains(&f.name.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "table {}: invalid field name '{}'",
                        t.name, f.name
                    )));
                }
                if !field_names.insert(f.name.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "table {}: duplicate field '{}'",
                        t.name, f.name
                    )));
                }
                if let FieldKind::Relation { references, .. } = &f.kind {
                    if !table_names.contains(references.as_str()) {
                        return Err(ConfigError::MissingReference {
                            kind: "table",
                            id: format!("{} (from {}.{})", references, t.name, f.name),
                        });
                    }
                }
            }
        }
    }

    let mut workflow_names = HashSet::new();
    let mut routes = HashSet::new();
    for feature in &config.features {
        for w in &feature.workflows {
            if !workflow_names.insert(w.name.as_str()) {
                return Err(ConfigError::DuplicateWorkflow(w.name.clone()));
            }
            let path = route_path(&w.tag, &w.trigger.path);
            if !routes.insert((w.trigger.method, path.clone())) {
                return Err(ConfigError::DuplicateRoute {
                    method: w.trigger.method.as_str().to_string(),
                    path,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{app_config, FieldConfig, FeatureConfig, HttpMethod, Relationship, TableConfig, WorkflowConfig};

    fn config_with(tables: Vec<TableConfig>, workflows: Vec<WorkflowConfig>) -> AppConfig {
        AppConfig {
            schema: "public".into(),
            external_tables: vec!["users".into()],
            features: vec![FeatureConfig {
                name: "test".into(),
                tables,
                workflows,
            }],
        }
    }

    #[test]
    fn builtin_features_are_valid() {
        assert!(validate(&app_config("public")).is_ok());
    }

    #[test]
    fn relation_to_unknown_table_is_rejected() {
        let config = config_with(
            vec![TableConfig::new(
                "favoriteMusic",
                vec![FieldConfig::relation("movie", "moviesMusic", Relationship::ManyToOne)],
            )],
            vec![],
        );
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingReference { kind: "table", .. }));
        assert!(err.to_string().contains("moviesMusic"));
    }

    #[test]
    fn relation_to_external_table_is_allowed() {
        let config = config_with(
            vec![TableConfig::new(
                "collection",
                vec![FieldConfig::relation("user", "users", Relationship::ManyToOne)],
            )],
            vec![],
        );
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn duplicate_table_is_rejected() {
        let config = config_with(
            vec![
                TableConfig::new("actors", vec![]),
                TableConfig::new("actors", vec![]),
            ],
            vec![],
        );
        assert!(matches!(validate(&config), Err(ConfigError::DuplicateTable(t)) if t == "actors"));
    }

    #[test]
    fn reserved_field_is_rejected() {
        let config = config_with(
            vec![TableConfig::new("actors", vec![FieldConfig::short_text("id")])],
            vec![],
        );
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn same_route_and_method_twice_is_rejected() {
        let config = config_with(
            vec![],
            vec![
                WorkflowConfig::http("A", "actors", HttpMethod::Get, "/", vec![]),
                WorkflowConfig::http("B", "actors", HttpMethod::Get, "", vec![]),
            ],
        );
        assert!(matches!(validate(&config), Err(ConfigError::DuplicateRoute { .. })));
    }

    #[test]
    fn same_route_different_method_is_fine() {
        let config = config_with(
            vec![],
            vec![
                WorkflowConfig::http("A", "actors", HttpMethod::Get, "/", vec![]),
                WorkflowConfig::http("B", "actors", HttpMethod::Post, "/", vec![]),
            ],
        );
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn duplicate_workflow_name_is_rejected() {
        let config = config_with(
            vec![],
            vec![
                WorkflowConfig::http("A", "actors", HttpMethod::Get, "/", vec![]),
                WorkflowConfig::http("A", "movies", HttpMethod::Get, "/", vec![]),
            ],
        );
        assert!(matches!(validate(&config), Err(ConfigError::DuplicateWorkflow(_))));
    }
}
