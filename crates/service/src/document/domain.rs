use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use models::document::DocumentCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i32,
    pub employee_id: i32,
    pub file_name: String,
    pub original_file_name: String,
    pub mime_type: String,
    pub file_size: Option<i64>,
    pub storage_object_key: String,
    pub storage_url: String,
    pub document_type: DocumentCategory,
    pub created_at: DateTime<Utc>,
}

impl From<models::document::Model> for Document {
    fn from(m: models::document::Model) -> Self {
        Self {
            id: m.id,
            employee_id: m.employee_id,
            file_name: m.file_name,
            original_file_name: m.original_file_name,
            mime_type: m.mime_type,
            file_size: m.file_size,
            storage_object_key: m.storage_object_key,
            storage_url: m.storage_url,
            document_type: m.document_type,
            created_at: m.created_at.with_timezone(&Utc),
        }
    }
}

/// Download listing entry: just enough to render a link.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDownload {
    pub id: i32,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: Option<i64>,
    pub document_type: DocumentCategory,
    pub url: String,
}

impl From<Document> for DocumentDownload {
    fn from(d: Document) -> Self {
        Self {
            id: d.id,
            file_name: d.original_file_name,
            mime_type: d.mime_type,
            file_size: d.file_size,
            document_type: d.document_type,
            url: d.storage_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSummary {
    pub id: i32,
    pub name: String,
}

/// A document together with its owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: Document,
    pub employee: EmployeeSummary,
}

/// Response body of a single-document upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub document_id: i32,
    pub file_name: String,
    pub file_size: Option<i64>,
    pub mime_type: String,
    pub document_type: DocumentCategory,
    pub storage_url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&Document> for UploadedDocument {
    fn from(d: &Document) -> Self {
        Self {
            document_id: d.id,
            file_name: d.file_name.clone(),
            file_size: d.file_size,
            mime_type: d.mime_type.clone(),
            document_type: d.document_type,
            storage_url: d.storage_url.clone(),
            uploaded_at: d.created_at,
        }
    }
}
