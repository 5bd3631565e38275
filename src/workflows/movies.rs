//! Movie catalogue workflows: list movies, add/update/list actors.

use crate::error::AppError;
use crate::query::{deferred_join_pagination, PaginationRequest, QueryBuilder};
use crate::response::{success_data, success_id, success_page};
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

/// GET /list: movies with optional `limit`, `offset`, `orderBy` and `include`.
pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let workflow = state.model.workflow("ListMoviesWorkflow")?;
    let input = WorkflowInput::extract(workflow, &[], &query)?;

    let mut q = TableQuery::new(&state.pool, &state.model, "movies")?;
    apply_list_inputs(&mut q, &input)?;
    if let Some(n) = input.u64("limit") {
        q.limit(n);
    }
    if let Some(n) = input.u64("offset") {
        q.offset(n);
    }
    let data = q.execute().await?;
    Ok(success_data(data))
}

pub async fn add_actor(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let workflow = state.model.workflow("AddActorWorkflow")?;
    let input = WorkflowInput::extract(workflow, &body, &query)?;
    let actors = state.model.table("actors")?;
    let id = CrudService::save(&state.pool, actors, &input.into_values()).await?;
    tracing::debug!(workflow = %workflow.name, id = %id, "actor added");
    Ok(success_id(id, true))
}

/// PATCH /actors: writes only the supplied fields.
pub async fn update_actor(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let workflow = state.model.workflow("UpdateActorWorkflow")?;
    let (id, fields) = WorkflowInput::extract(workflow, &body, &query)?.split_id()?;
    let actors = state.model.table("actors")?;
    let id = CrudService::patch(&state.pool, actors, &id, &fields)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("actor {}", id)))?;
    Ok(success_id(id, false))
}

/// GET /actors: one page of actors with its metadata.
pub async fn list_actors(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let workflow = state.model.workflow("ListActorsWorkflow")?;
    let input = WorkflowInput::extract(workflow, &[], &query)?;
    let page_size = input.require_i64("pageSize")?;
    let page_no = input.require_i64("pageNo")?;

    let mut q = TableQuery::new(&state.pool, &state.model, "actors")?;
    apply_list_inputs(&mut q, &input)?;
    let total_count = q.get_count().await?;
    let finish = deferred_join_pagination::<_, Value>(
        &mut q,
        PaginationRequest::new(page_size, page_no, total_count),
    )?;
    let records = q.execute().await?;
    Ok(success_page(finish(&records), records))
}
