//! Workflow handlers and the name → handler registry the router is built from.

mod input;
pub mod movies;
pub mod task_manager;

pub use input::WorkflowInput;

use crate::config::HttpMethod;
use crate::error::AppError;
use crate::query::OrderSpec;
use crate::service::TableQuery;
use crate::state::AppState;
use axum::routing::{on, MethodFilter, MethodRouter};

/// Separator between include names in the `include` input.
pub const INCLUDE_SEPARATOR: char = ',';

pub fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Delete => MethodFilter::DELETE,
    }
}

/// Handler for a declared workflow, bound to its trigger method. `None` for names with no
/// implementation.
pub fn handler(name: &str, method: HttpMethod) -> Option<MethodRouter<AppState>> {
    let filter = method_filter(method);
    let router = match name {
        "ListMoviesWorkflow" => on(filter, movies::list_movies),
        "AddActorWorkflow" => on(filter, movies::add_actor),
        "UpdateActorWorkflow" => on(filter, movies::update_actor),
        "ListActorsWorkflow" => on(filter, movies::list_actors),
        "AddCategoryWorkflow" => on(filter, task_manager::add_category),
        "AddTaskWorkflow" => on(filter, task_manager::add_task),
        "UpdateTaskWorkflow" => on(filter, task_manager::update_task),
        "ListTasksWorkflow" => on(filter, task_manager::list_tasks),
        _ => return None,
    };
    Some(router)
}

/// Apply the optional `orderBy` and `include` inputs to a list query.
pub(crate) fn apply_list_inputs(q: &mut TableQuery<'_>, input: &WorkflowInput) -> Result<(), AppError> {
    if let Some(raw) = input.str("orderBy") {
        OrderSpec::parse_for(raw, q.table())?.apply(q)?;
    }
    if let Some(raw) = input.str("include") {
        for name in raw.split(INCLUDE_SEPARATOR) {
            q.include(name)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{app_config, resolve};

    #[test]
    fn every_declared_workflow_has_a_handler() {
        let model = resolve(&app_config("public")).unwrap();
        for w in &model.workflows {
            assert!(handler(&w.name, w.method).is_some(), "{}", w.name);
        }
        assert!(handler("ArchiveMoviesWorkflow", HttpMethod::Post).is_none());
    }
}
