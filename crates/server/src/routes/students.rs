use axum::{extract::{Path, State}, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use models::student::{NewStudent, Student, UpdateStudent};
use service::student::filter::StudentFilter;

use crate::errors::ApiError;
use crate::extract::{JsonBody, QueryParams};
use crate::state::AppState;

/// List filters. Parameter names keep the capitalised form clients already use.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "Age")]
    pub age: Option<i64>,
}

impl From<ListQuery> for StudentFilter {
    fn from(q: ListQuery) -> Self {
        Self { country: q.country, min_age: q.age }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedId {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct StudentCollection {
    pub data: Vec<Student>,
}

#[derive(Debug, Serialize)]
pub struct Empty {}

#[utoipa::path(
    post, path = "/students", tag = "students",
    request_body = crate::openapi::NewStudentDoc,
    responses(
        (status = 201, description = "Student created", body = crate::openapi::CreatedIdDoc),
        (status = 422, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 500, description = "Store unavailable", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewStudent>,
) -> Result<(StatusCode, Json<CreatedId>), ApiError> {
    let id = state.students.create(input).await?;
    Ok((StatusCode::CREATED, Json(CreatedId { id: id.to_string() })))
}

#[utoipa::path(
    get, path = "/students", tag = "students",
    params(
        ("Country" = Option<String>, Query, description = "Exact, case-sensitive country match"),
        ("Age" = Option<i64>, Query, description = "Minimum age (inclusive)")
    ),
    responses(
        (status = 200, description = "Students, at most the retrieval cap", body = crate::openapi::StudentCollectionDoc),
        (status = 422, description = "Invalid query parameter", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    QueryParams(q): QueryParams<ListQuery>,
) -> Result<Json<StudentCollection>, ApiError> {
    let data = state.students.list(q.into()).await?;
    info!(count = data.len(), "list students");
    Ok(Json(StudentCollection { data }))
}

#[utoipa::path(
    get, path = "/students/{id}", tag = "students",
    params(("id" = String, Path, description = "Student id (24 hex chars)")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::StudentDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Student>, ApiError> {
    Ok(Json(state.students.get(&id).await?))
}

#[utoipa::path(
    patch, path = "/students/{id}", tag = "students",
    params(("id" = String, Path, description = "Student id (24 hex chars)")),
    request_body = crate::openapi::UpdateStudentDoc,
    responses(
        (status = 204, description = "Updated (or nothing to change)"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc),
        (status = 422, description = "Validation Error", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UpdateStudent>,
) -> Result<StatusCode, ApiError> {
    state.students.update(&id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete, path = "/students/{id}", tag = "students",
    params(("id" = String, Path, description = "Student id (24 hex chars)")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Empty>, ApiError> {
    state.students.delete(&id).await?;
    Ok(Json(Empty {}))
}
