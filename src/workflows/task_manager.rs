//! Task manager workflows: categories and tasks.

use crate::error::AppError;
use crate::query::{deferred_join_pagination, PaginationRequest, QueryBuilder};
use crate::response::{success_id, success_page};
use crate::service::{CrudService, TableQuery};
use crate::state::AppState;
use crate::workflows::{apply_list_inputs, WorkflowInput};
use axum::{
    body::Bytes,
    extract::{Query, State},
    response::IntoResponse,
};
use serde_json::Value;
use std::collections::HashMap;

pub async fn add_category(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let workflow = state.model.workflow("AddCategoryWorkflow")?;
    let input = WorkflowInput::extract(workflow, &body, &query)?;
    let categories = state.model.table("categories")?;
    let id = CrudService::save(&state.pool, categories, &input.into_values()).await?;
    Ok(success_id(id, true))
}

pub async fn add_task(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let workflow = state.model.workflow("AddTaskWorkflow")?;
    let input = WorkflowInput::extract(workflow, &body, &query)?;
    let tasks = state.model.table("tasks")?;
    let id = CrudService::save(&state.pool, tasks, &input.into_values()).await?;
    tracing::debug!(workflow = %workflow.name, id = %id, "task added");
    Ok(success_id(id, true))
}

/// PUT /tasks: every task field is required, the row must exist.
pub async fn update_task(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let workflow = state.model.workflow("UpdateTaskWorkflow")?;
    let (id, fields) = WorkflowInput::extract(workflow, &body, &query)?.split_id()?;
    let tasks = state.model.table("tasks")?;
    let id = CrudService::patch(&state.pool, tasks, &id, &fields)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("task {}", id)))?;
    Ok(success_id(id, false))
}

/// GET /tasks: one page of tasks, optionally ordered and with `category` joined.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let workflow = state.model.workflow("ListTasksWorkflow")?;
    let input = WorkflowInput::extract(workflow, &[], &query)?;
    let page_size = input.require_i64("pageSize")?;
    let page_no = input.require_i64("pageNo")?;

    let mut q = TableQuery::new(&state.pool, &state.model, "tasks")?;
    apply_list_inputs(&mut q, &input)?;
    let total_count = q.get_count().await?;
    let finish = deferred_join_pagination::<_, Value>(
        &mut q,
        PaginationRequest::new(page_size, page_no, total_count),
    )?;
    let records = q.execute().await?;
    Ok(success_page(finish(&records), records))
}
