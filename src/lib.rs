//! Studio API: declared CRUD workflows over PostgreSQL, with multi-field ordering and
//! deferred-join pagination.

pub mod case;
pub mod config;
pub mod error;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod workflows;

pub use config::{app_config, resolve, AppConfig, ResolvedModel, ResolvedTable};
pub use error::{AppError, ConfigError};
pub use query::{
    deferred_join_pagination, handle_order_by, paginate, parse_order, OrderClause, OrderDirection,
    OrderSpec, PageWindow, PaginationMetadata, PaginationRequest, QueryBuilder,
};
pub use routes::{common_routes, workflow_routes};
pub use service::{CrudService, TableQuery};
pub use settings::Settings;
pub use state::AppState;
