use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::JsonApiError;
use crate::multipart::{document_form, read_form};
use crate::routes::{parse_id, success, Envelope};
use crate::state::ServerState;
use service::document::domain::{Document, DocumentDetail, DocumentDownload, UploadedDocument};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDocumentsQuery {
    pub employee_id: Option<String>,
}

impl EmployeeDocumentsQuery {
    fn employee_id(&self) -> Result<i32, JsonApiError> {
        let raw = self.employee_id.as_deref().ok_or_else(|| JsonApiError::bad_request("employeeId is required"))?;
        parse_id(raw, "employeeId")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFiles {
    pub employee_id: i32,
    pub keys: Vec<String>,
}

#[utoipa::path(
    post, path = "/document", tag = "document",
    request_body(content = crate::openapi::DocumentUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Stored and recorded", body = crate::openapi::UploadedDocumentDoc),
        (status = 400, description = "Missing employeeId or file, file over the per-file size limit, or a request body larger than 16 times that limit plus 1 MiB", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 404, description = "Employee not found", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 502, description = "Object store rejected the upload", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn upload(
    State(state): State<ServerState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Envelope<UploadedDocument>>), JsonApiError> {
    let multipart = multipart.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    let form = read_form(multipart, state.max_file_size).await?;
    let (employee_id, attachment) = document_form(form)?;
    let doc = state.uploads.attach_document(employee_id, attachment).await?;
    Ok((StatusCode::CREATED, success("Document uploaded successfully", UploadedDocument::from(&doc))))
}

#[utoipa::path(
    get, path = "/document", tag = "document",
    params(EmployeeDocumentsQuery),
    responses(
        (status = 200, description = "Documents of the employee, newest first", body = [crate::openapi::DocumentDoc]),
        (status = 400, description = "Missing employeeId", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 404, description = "Employee not found", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<EmployeeDocumentsQuery>,
) -> Result<Json<Envelope<Vec<Document>>>, JsonApiError> {
    let docs = state.documents.list_for_employee(q.employee_id()?).await?;
    Ok(success("Documents retrieved successfully", docs))
}

#[utoipa::path(
    get, path = "/document/downloadByEmployeeId", tag = "document",
    params(EmployeeDocumentsQuery),
    responses(
        (status = 200, description = "Download links, newest first"),
        (status = 400, description = "Missing employeeId", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 404, description = "Employee not found", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn downloads(
    State(state): State<ServerState>,
    Query(q): Query<EmployeeDocumentsQuery>,
) -> Result<Json<Envelope<Vec<DocumentDownload>>>, JsonApiError> {
    let links = state.documents.downloads_for_employee(q.employee_id()?).await?;
    Ok(success("Document links retrieved successfully", links))
}

#[utoipa::path(
    get, path = "/document/storedByEmployeeId", tag = "document",
    params(EmployeeDocumentsQuery),
    responses(
        (status = 200, description = "Object keys under the employee's folder"),
        (status = 404, description = "Employee not found", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 502, description = "Object store unreachable", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn stored_files(
    State(state): State<ServerState>,
    Query(q): Query<EmployeeDocumentsQuery>,
) -> Result<Json<Envelope<StoredFiles>>, JsonApiError> {
    let employee_id = q.employee_id()?;
    let keys = state.documents.stored_files_for_employee(employee_id).await?;
    Ok(success("Stored files retrieved successfully", StoredFiles { employee_id, keys }))
}

#[utoipa::path(
    get, path = "/document/{id}", tag = "document",
    params(("id" = i32, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document with its owner"),
        (status = 404, description = "Document not found", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Envelope<DocumentDetail>>, JsonApiError> {
    let detail = state.documents.get(parse_id(&id, "id")?).await?;
    Ok(success("Document retrieved successfully", detail))
}

#[utoipa::path(
    delete, path = "/document/{id}", tag = "document",
    params(("id" = i32, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document removed"),
        (status = 404, description = "Document not found", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Envelope<Document>>, JsonApiError> {
    let removed = state.documents.delete(parse_id(&id, "id")?).await?;
    Ok(success("Document deleted successfully", removed))
}
