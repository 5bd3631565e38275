//! Built-in features: the movie catalogue and the task manager.

use crate::config::types::*;
use serde_json::json;

pub const MAX_PAGE_SIZE: f64 = 100.0;

/// Declarations served by this crate, in the given schema.
pub fn app_config(schema: &str) -> AppConfig {
    AppConfig {
        schema: schema.to_string(),
        external_tables: vec!["users".into()],
        features: vec![movies_feature(), task_manager_feature()],
    }
}

pub fn movies_feature() -> FeatureConfig {
    use Relationship::{ManyToOne, OneToOne};

    let tables = vec![
        TableConfig::new(
            "actors",
            vec![FieldConfig::short_text("name"), FieldConfig::short_text("photo")],
        ),
        TableConfig::new(
            "directors",
            vec![FieldConfig::short_text("name"), FieldConfig::short_text("photo")],
        ),
        TableConfig::new(
            "movies",
            vec![
                FieldConfig::short_text("title"),
                FieldConfig::long_text("description"),
                FieldConfig::url("poster"),
                FieldConfig::datetime("releaseDate"),
            ],
        ),
        TableConfig::new(
            "movieActors",
            vec![
                FieldConfig::relation("actor", "actors", ManyToOne),
                FieldConfig::relation("movie", "movies", ManyToOne),
            ],
        ),
        TableConfig::new(
            "movieDirectors",
            vec![
                FieldConfig::relation("creator", "directors", ManyToOne),
                FieldConfig::relation("movie", "movies", ManyToOne),
            ],
        ),
        TableConfig::new(
            "movieMusic",
            vec![
                FieldConfig::short_text("title"),
                FieldConfig::short_text("url"),
                FieldConfig::relation("movie", "movies", ManyToOne),
            ],
        ),
        TableConfig::new(
            "movieTrailers",
            vec![
                FieldConfig::short_text("url"),
                FieldConfig::relation("movie", "movies", OneToOne),
            ],
        ),
        TableConfig::new(
            "collection",
            vec![
                FieldConfig::relation("movie", "movies", ManyToOne),
                FieldConfig::relation("user", "users", ManyToOne),
            ],
        ),
        TableConfig::new(
            "favoriteActors",
            vec![
                FieldConfig::relation("actor", "actors", ManyToOne),
                FieldConfig::relation("user", "users", ManyToOne),
            ],
        ),
        TableConfig::new(
            "favoriteDirectors",
            vec![
                FieldConfig::relation("director", "directors", ManyToOne),
                FieldConfig::relation("user", "users", ManyToOne),
            ],
        ),
        TableConfig::new(
            "favoriteMovies",
            vec![
                FieldConfig::relation("movie", "movies", ManyToOne),
                FieldConfig::relation("user", "users", ManyToOne),
            ],
        ),
        TableConfig::new(
            "favoriteMusic",
            vec![
                FieldConfig::relation("movie", "movieMusic", ManyToOne),
                FieldConfig::relation("user", "users", ManyToOne),
            ],
        ),
    ];

    let workflows = vec![
        WorkflowConfig::http(
            "ListMoviesWorkflow",
            "list",
            HttpMethod::Get,
            "/",
            vec![
                InputField::query("limit", ValidationRule::integer().minimum(1.0).optional()),
                InputField::query("offset", ValidationRule::integer().minimum(0.0).optional()),
                InputField::query("orderBy", ValidationRule::string().min_length(1).optional()),
                InputField::query("include", ValidationRule::string().min_length(1).optional()),
            ],
        ),
        WorkflowConfig::http(
            "AddActorWorkflow",
            "actors",
            HttpMethod::Post,
            "/",
            vec![
                InputField::body("name", ValidationRule::string().trim().min_length(1)),
                InputField::body("photo", ValidationRule::url()),
            ],
        ),
        WorkflowConfig::http(
            "UpdateActorWorkflow",
            "actors",
            HttpMethod::Patch,
            "/",
            vec![
                InputField::body("id", ValidationRule::uuid()),
                InputField::body("name", ValidationRule::string().trim().min_length(1).optional()),
                InputField::body("photo", ValidationRule::url().optional()),
            ],
        ),
        WorkflowConfig::http(
            "ListActorsWorkflow",
            "actors",
            HttpMethod::Get,
            "/",
            vec![
                InputField::query(
                    "pageSize",
                    ValidationRule::integer()
                        .minimum(1.0)
                        .maximum(MAX_PAGE_SIZE)
                        .default_value(json!(100)),
                ),
                InputField::query(
                    "pageNo",
                    ValidationRule::integer().minimum(1.0).default_value(json!(1)),
                ),
                InputField::query("orderBy", ValidationRule::string().min_length(1).optional()),
            ],
        ),
    ];

    FeatureConfig {
        name: "movies".into(),
        tables,
        workflows,
    }
}

pub fn task_manager_feature() -> FeatureConfig {
    let tables = vec![
        TableConfig::new("categories", vec![FieldConfig::short_text("name")]),
        TableConfig::new(
            "tasks",
            vec![
                FieldConfig::short_text("title"),
                FieldConfig::long_text("description"),
                FieldConfig::relation("category", "categories", Relationship::ManyToOne),
            ],
        ),
    ];

    let task_body = || {
        vec![
            InputField::body("title", ValidationRule::string().trim().min_length(1)),
            InputField::body("description", ValidationRule::string().trim()),
            InputField::body("categoryId", ValidationRule::uuid()),
        ]
    };

    let workflows = vec![
        WorkflowConfig::http(
            "AddCategoryWorkflow",
            "category",
            HttpMethod::Post,
            "/",
            vec![InputField::body("name", ValidationRule::string().trim().min_length(1))],
        ),
        WorkflowConfig::http("AddTaskWorkflow", "tasks", HttpMethod::Post, "/", task_body()),
        WorkflowConfig::http(
            "UpdateTaskWorkflow",
            "tasks",
            HttpMethod::Put,
            "/",
            std::iter::once(InputField::body("id", ValidationRule::uuid()))
                .chain(task_body())
                .collect(),
        ),
        WorkflowConfig::http(
            "ListTasksWorkflow",
            "tasks",
            HttpMethod::Get,
            "/",
            vec![
                InputField::query(
                    "pageSize",
                    ValidationRule::integer().minimum(1.0).maximum(MAX_PAGE_SIZE),
                ),
                InputField::query("pageNo", ValidationRule::integer().minimum(1.0)),
                InputField::query("orderBy", ValidationRule::string().min_length(1).optional()),
                InputField::query("include", ValidationRule::string().min_length(1).optional()),
            ],
        ),
    ];

    FeatureConfig {
        name: "task-manager".into(),
        tables,
        workflows,
    }
}
