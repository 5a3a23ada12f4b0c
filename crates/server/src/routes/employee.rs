use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::JsonApiError;
use crate::multipart::{employee_form, read_form};
use crate::routes::{parse_id, success, Envelope};
use crate::state::ServerState;
use service::employee::domain::{Employee, EmployeeChanges};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct EmployeeQuery {
    /// Return a single employee instead of the full list.
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedEmployee {
    pub id: i32,
    pub documents_removed: usize,
}

#[utoipa::path(
    get, path = "/employee", tag = "employee",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "All employees, or one when `id` is given"),
        (status = 400, description = "Malformed id", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 404, description = "Employee not found", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<EmployeeQuery>) -> Result<Response, JsonApiError> {
    if let Some(raw) = q.id.as_deref() {
        let employee = state.employees.get(parse_id(raw, "id")?).await?;
        return Ok(success("Employee retrieved successfully", employee).into_response());
    }
    let all = state.employees.list().await?;
    Ok(success("Employees retrieved successfully", all).into_response())
}

#[utoipa::path(
    get, path = "/employee/{id}", tag = "employee",
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee", body = crate::openapi::EmployeeDoc),
        (status = 404, description = "Employee not found", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Envelope<Employee>>, JsonApiError> {
    let employee = state.employees.get(parse_id(&id, "id")?).await?;
    Ok(success("Employee retrieved successfully", employee))
}

#[utoipa::path(
    post, path = "/employee", tag = "employee",
    request_body(content = crate::openapi::EmployeeCreateForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Employee created; failed attachments are listed in `failedUploads`"),
        (status = 400, description = "Missing name or phone number, malformed form, or a request body larger than 16 times the per-file size limit plus 1 MiB (the whole form is rejected; smaller oversized files are reported in `failedUploads`)", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 422, description = "A fail-closed category could not be stored", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 500, description = "Employee could not be created", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, JsonApiError> {
    let multipart = multipart.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    let form = read_form(multipart, state.max_file_size).await?;
    let (employee, attachments) = employee_form(form)?;
    let report = state.uploads.create_with_attachments(employee, attachments).await?;
    let message = if report.failed_uploads.is_empty() {
        "Employee created successfully".to_string()
    } else {
        format!("Employee created; {} document(s) failed to upload", report.failed_uploads.len())
    };
    Ok((StatusCode::CREATED, success(&message, report)).into_response())
}

#[utoipa::path(
    put, path = "/employee/{id}", tag = "employee",
    params(("id" = i32, Path, description = "Employee id")),
    request_body = crate::openapi::EmployeeUpdateDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::EmployeeDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 404, description = "Employee not found", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<EmployeeChanges>, JsonRejection>,
) -> Result<Json<Envelope<Employee>>, JsonApiError> {
    let id = parse_id(&id, "id")?;
    let Json(changes) = payload.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    let updated = state.employees.update(id, changes).await?;
    info!(employee_id = id, "employee_updated");
    Ok(success("Employee updated successfully", updated))
}

#[utoipa::path(
    delete, path = "/employee/{id}", tag = "employee",
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee and its documents removed"),
        (status = 404, description = "Employee not found", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Envelope<DeletedEmployee>>, JsonApiError> {
    let id = parse_id(&id, "id")?;
    let documents_removed = state.employees.delete(id).await?;
    Ok(success("Employee deleted successfully", DeletedEmployee { id, documents_removed }))
}
