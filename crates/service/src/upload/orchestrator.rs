use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::policy::UploadPolicy;
use crate::document::domain::Document;
use crate::document::repository::DocumentRepository;
use crate::employee::domain::{Employee, NewEmployee};
use crate::employee::repository::EmployeeRepository;
use crate::errors::ServiceError;
use crate::storage::{stored_file_name, FolderLayout, ObjectStore};
use configs::FailureMode;
use models::document::{DocumentCategory, DocumentInput};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// One file received from the client. `payload` carries the read error when
/// the part could not be read (e.g. it exceeded the size limit).
#[derive(Debug, Clone)]
pub struct Attachment {
    pub category: DocumentCategory,
    pub file_name: String,
    pub mime_type: String,
    pub payload: Result<Vec<u8>, String>,
}

/// Step at which an attachment failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStage {
    Read,
    Store,
    Verify,
    Record,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFailure {
    pub category: DocumentCategory,
    pub file_name: String,
    pub stage: UploadStage,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub employee: Employee,
    pub documents: Vec<Document>,
    pub failed_uploads: Vec<UploadFailure>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("{category} attachment failed; employee creation was rolled back")]
    Rejected { category: DocumentCategory, failures: Vec<UploadFailure> },
}

pub struct UploadOrchestrator {
    employees: Arc<dyn EmployeeRepository>,
    documents: Arc<dyn DocumentRepository>,
    store: Arc<dyn ObjectStore>,
    layout: FolderLayout,
    policy: UploadPolicy,
}

impl UploadOrchestrator {
    pub fn new(
        employees: Arc<dyn EmployeeRepository>,
        documents: Arc<dyn DocumentRepository>,
        store: Arc<dyn ObjectStore>,
        layout: FolderLayout,
        policy: UploadPolicy,
    ) -> Self {
        Self { employees, documents, store, layout, policy }
    }

    /// Create the employee, then upload and record every attachment in
    /// category order (identity proof, tax id, bank, other), file order
    /// within a category.
    #[instrument(skip_all, fields(attachments = attachments.len()))]
    pub async fn create_with_attachments(&self, new: NewEmployee, attachments: Vec<Attachment>) -> Result<UploadReport, UploadError> {
        let input = new.into_input()?;
        let employee = self.employees.create(input).await?;
        debug!(employee_id = employee.id, "employee created");
        let folder = self.layout.employee_folder(employee.id, &employee.name);

        let mut documents = Vec::new();
        let mut failures = Vec::new();
        let mut pending = attachments;
        for category in DocumentCategory::ALL {
            let (batch, rest): (Vec<_>, Vec<_>) = pending.into_iter().partition(|a| a.category == category);
            pending = rest;
            for attachment in batch {
                let file_name = attachment.file_name.clone();
                match self.upload_attachment(employee.id, &folder, attachment).await {
                    Ok(doc) => documents.push(doc),
                    Err((stage, err)) => {
                        warn!(employee_id = employee.id, %category, file_name = %file_name, ?stage, reason = %err, "attachment failed");
                        failures.push(UploadFailure { category, file_name, stage, reason: err.to_string() });
                        if self.policy.mode_for(category) == FailureMode::FailClosed {
                            self.compensate(&employee, &documents).await;
                            return Err(UploadError::Rejected { category, failures });
                        }
                    }
                }
            }
        }

        if failures.is_empty() {
            info!(employee_id = employee.id, uploaded = documents.len(), "employee created with attachments");
        } else {
            warn!(employee_id = employee.id, uploaded = documents.len(), failed = failures.len(), "employee created with failed attachments");
        }
        Ok(UploadReport { employee, documents, failed_uploads: failures })
    }

    /// Single-file upload for an existing employee; any failure is fatal.
    #[instrument(skip(self, attachment), fields(file_name = %attachment.file_name))]
    pub async fn attach_document(&self, employee_id: i32, attachment: Attachment) -> Result<Document, ServiceError> {
        let employee = self.employees
            .find_by_id(employee_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("employee"))?;
        let folder = self.folder_for(&employee).await?;
        let doc = self.upload_attachment(employee.id, &folder, attachment).await.map_err(|(_, e)| e)?;
        info!(employee_id, document_id = doc.id, "document uploaded");
        Ok(doc)
    }

    /// Folder already holding the employee's documents, so a rename does not
    /// split their files across two folders.
    async fn folder_for(&self, employee: &Employee) -> Result<String, ServiceError> {
        let existing = self.documents
            .list_by_employee(employee.id)
            .await?
            .iter()
            .find_map(|d| self.layout.folder_of(employee.id, &d.storage_object_key));
        Ok(existing.unwrap_or_else(|| self.layout.employee_folder(employee.id, &employee.name)))
    }

    async fn upload_attachment(&self, employee_id: i32, folder: &str, attachment: Attachment) -> Result<Document, (UploadStage, ServiceError)> {
        let Attachment { category, file_name, mime_type, payload } = attachment;
        let body = payload.map_err(|reason| (UploadStage::Read, ServiceError::Validation(reason)))?;
        let file_size = body.len() as i64;
        let mime_type = if mime_type.trim().is_empty() { DEFAULT_MIME_TYPE.to_string() } else { mime_type };
        let stored_name = stored_file_name(&file_name);
        let key = format!("{folder}{stored_name}");

        let stored = self.store
            .put_object(&key, body, &mime_type)
            .await
            .map_err(|e| (UploadStage::Store, ServiceError::from(e)))?;
        let (Some(key), Some(url)) = (stored.key, stored.url) else {
            return Err((UploadStage::Verify, ServiceError::UpstreamStorage("object store returned no key or url".into())));
        };

        let input = DocumentInput {
            employee_id,
            file_name: stored_name,
            original_file_name: file_name,
            mime_type,
            file_size: Some(file_size),
            storage_object_key: key.clone(),
            storage_url: url,
            document_type: category,
        };
        match self.documents.create(input).await {
            Ok(doc) => Ok(doc),
            Err(e) => {
                if let Err(cleanup) = self.store.delete_object(&key).await {
                    debug!(%key, reason = %cleanup, "orphaned object left in store");
                }
                Err((UploadStage::Record, e))
            }
        }
    }

    /// Best-effort undo of a fail-closed creation.
    async fn compensate(&self, employee: &Employee, documents: &[Document]) {
        for doc in documents {
            if let Err(e) = self.store.delete_object(&doc.storage_object_key).await {
                warn!(employee_id = employee.id, document_id = doc.id, reason = %e, "compensation: object not removed");
            }
        }
        if let Err(e) = self.documents.delete_by_employee(employee.id).await {
            warn!(employee_id = employee.id, reason = %e, "compensation: documents not removed");
        }
        match self.employees.delete(employee.id).await {
            Ok(_) => info!(employee_id = employee.id, "employee creation rolled back"),
            Err(e) => warn!(employee_id = employee.id, reason = %e, "compensation: employee not removed"),
        }
    }
}
