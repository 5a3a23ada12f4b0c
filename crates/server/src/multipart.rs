//! Multipart form parsing with a per-file size cap.

use std::collections::HashMap;

use axum::extract::multipart::{Field, Multipart};
use chrono::NaiveDate;
use tracing::debug;

use crate::errors::JsonApiError;
use service::document::DocumentCategory;
use service::employee::domain::NewEmployee;
use service::upload::Attachment;

/// File field names accepted on employee creation.
pub const EMPLOYEE_FILE_FIELDS: [(&str, DocumentCategory); 4] = [
    ("identityProof", DocumentCategory::IdentityProof),
    ("taxId", DocumentCategory::TaxId),
    ("bankDetails", DocumentCategory::Bank),
    ("otherDocuments", DocumentCategory::Other),
];

pub fn category_for_field(field: &str) -> Option<DocumentCategory> {
    EMPLOYEE_FILE_FIELDS.iter().find(|(name, _)| *name == field).map(|(_, c)| *c)
}

#[derive(Debug)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    /// Read error (including "too large") instead of bytes.
    pub payload: Result<Vec<u8>, String>,
}

#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<FilePart>,
}

impl MultipartForm {
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }
}

/// Read a file part chunk by chunk, giving up once it exceeds `limit`.
async fn read_capped(field: &mut Field<'_>, limit: usize) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                if buf.len() + chunk.len() > limit {
                    return Err(format!("file exceeds the {limit} byte limit"));
                }
                buf.extend_from_slice(&chunk);
            }
            Ok(None) => return Ok(buf),
            Err(e) => return Err(format!("failed to read file: {e}")),
        }
    }
}

pub async fn read_form(mut multipart: Multipart, max_file_size: usize) -> Result<MultipartForm, JsonApiError> {
    let mut form = MultipartForm::default();
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::bad_request(format!("Invalid multipart request: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        match file_name {
            Some(file_name) => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let payload = read_capped(&mut field, max_file_size).await;
                debug!(field = %name, file_name = %file_name, ok = payload.is_ok(), "file part read");
                form.files.push(FilePart { field: name, file_name, content_type, payload });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| JsonApiError::bad_request(format!("Invalid field {name}: {e}")))?;
                form.fields.insert(name, value);
            }
        }
    }
    Ok(form)
}

/// Split an employee creation form into the employee fields and attachments.
pub fn employee_form(form: MultipartForm) -> Result<(NewEmployee, Vec<Attachment>), JsonApiError> {
    let date_of_birth = match form.text("dateOfBirth") {
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| JsonApiError::bad_request("dateOfBirth must be YYYY-MM-DD"))?,
        ),
        None => None,
    };
    let employee = NewEmployee {
        name: form.text("name").unwrap_or_default(),
        phone_number: form.text("phoneNumber").unwrap_or_default(),
        location: form.text("location"),
        date_of_birth,
        uan: form.text("uan"),
        remark: form.text("remark"),
    };

    let mut attachments = Vec::with_capacity(form.files.len());
    for part in form.files {
        let category = category_for_field(&part.field)
            .ok_or_else(|| JsonApiError::bad_request(format!("Unexpected file field '{}'", part.field)))?;
        attachments.push(Attachment {
            category,
            file_name: part.file_name,
            mime_type: part.content_type,
            payload: part.payload,
        });
    }
    Ok((employee, attachments))
}

/// Single-document upload: `employeeId`, `file`, optional `documentType`.
pub fn document_form(mut form: MultipartForm) -> Result<(i32, Attachment), JsonApiError> {
    let employee_id = form.text("employeeId");
    let file_index = form.files.iter().position(|f| f.field == "file");
    let (Some(employee_id), Some(file_index)) = (employee_id, file_index) else {
        return Err(JsonApiError::bad_request("employeeId and file are required"));
    };
    let employee_id: i32 = employee_id
        .parse()
        .map_err(|_| JsonApiError::bad_request("employeeId must be an integer"))?;
    let category = match form.text("documentType") {
        Some(tag) => tag.parse::<DocumentCategory>().map_err(|e| JsonApiError::bad_request(e.to_string()))?,
        None => DocumentCategory::Other,
    };

    let part = form.files.swap_remove(file_index);
    let payload = part.payload.map_err(JsonApiError::bad_request)?;
    Ok((
        employee_id,
        Attachment { category, file_name: part.file_name, mime_type: part.content_type, payload: Ok(payload) },
    ))
}
