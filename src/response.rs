//! Standard response envelope helpers.

use crate::query::PaginationMetadata;
use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// One page of records with its metadata.
#[derive(Serialize)]
pub struct PageEnvelope<T> {
    pub meta: PaginationMetadata,
    pub records: Vec<T>,
}

#[derive(Serialize)]
pub struct IdEnvelope<T> {
    pub id: T,
}

pub fn success_data<T: Serialize>(data: T) -> (StatusCode, Json<DataEnvelope<T>>) {
    (StatusCode::OK, Json(DataEnvelope { data }))
}

pub fn success_page<T: Serialize>(
    meta: PaginationMetadata,
    records: Vec<T>,
) -> (StatusCode, Json<PageEnvelope<T>>) {
    (StatusCode::OK, Json(PageEnvelope { meta, records }))
}

/// `201 Created` for inserts, `200 OK` for updates.
pub fn success_id<T: Serialize>(id: T, created: bool) -> (StatusCode, Json<IdEnvelope<T>>) {
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(IdEnvelope { id }))
}
