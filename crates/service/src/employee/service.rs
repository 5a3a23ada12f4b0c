use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::domain::{Employee, EmployeeChanges};
use super::repository::EmployeeRepository;
use crate::document::repository::DocumentRepository;
use crate::errors::ServiceError;
use crate::storage::ObjectStore;

/// Employee reads, updates and deletion. Creation with attachments lives in
/// [`crate::upload::UploadOrchestrator`].
pub struct EmployeeService {
    employees: Arc<dyn EmployeeRepository>,
    documents: Arc<dyn DocumentRepository>,
    store: Arc<dyn ObjectStore>,
}

impl EmployeeService {
    pub fn new(employees: Arc<dyn EmployeeRepository>, documents: Arc<dyn DocumentRepository>, store: Arc<dyn ObjectStore>) -> Self {
        Self { employees, documents, store }
    }

    pub async fn list(&self) -> Result<Vec<Employee>, ServiceError> { self.employees.list().await }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<Employee, ServiceError> {
        self.employees.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("employee"))
    }

    #[instrument(skip(self, changes))]
    pub async fn update(&self, id: i32, changes: EmployeeChanges) -> Result<Employee, ServiceError> {
        if changes.is_empty() {
            return Err(ServiceError::Validation("no fields to update".into()));
        }
        changes.validate()?;
        self.employees
            .update(id, &changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("employee"))
    }

    /// Delete the employee with all document rows, then remove their stored
    /// objects. Returns how many documents went with it.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<usize, ServiceError> {
        self.get(id).await?;
        let removed = self.documents.delete_by_employee(id).await?;
        if !self.employees.delete(id).await? {
            return Err(ServiceError::not_found("employee"));
        }
        for doc in &removed {
            if let Err(e) = self.store.delete_object(&doc.storage_object_key).await {
                warn!(employee_id = id, document_id = doc.id, reason = %e, "stored object not removed");
            }
        }
        info!(employee_id = id, documents = removed.len(), "employee_deleted");
        Ok(removed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::repository::mock::MockDocumentRepository;
    use crate::employee::repository::mock::MockEmployeeRepository;
    use crate::storage::InMemoryObjectStore;
    use models::document::{DocumentCategory, DocumentInput};
    use models::employee::EmployeeInput;

    fn input(name: &str) -> EmployeeInput {
        EmployeeInput { name: name.into(), phone_number: "9876543210".into(), location: "Pune".into(), ..Default::default() }
    }

    #[tokio::test]
    async fn delete_cascades_documents_and_objects() {
        let employees = Arc::new(MockEmployeeRepository::default());
        let documents = Arc::new(MockDocumentRepository::default());
        let store = Arc::new(InMemoryObjectStore::default());
        let svc = EmployeeService::new(employees.clone(), documents.clone(), store.clone());

        let emp = employees.create(input("Asha Rao")).await.unwrap();
        for i in 0..3 {
            let key = format!("employees/{}_Asha_Rao/{i}.pdf", emp.id);
            let stored = store.put_object(&key, vec![1], "application/pdf").await.unwrap();
            documents
                .create(DocumentInput {
                    employee_id: emp.id,
                    file_name: format!("{i}.pdf"),
                    original_file_name: format!("{i}.pdf"),
                    mime_type: "application/pdf".into(),
                    file_size: Some(1),
                    storage_object_key: key,
                    storage_url: stored.url.unwrap(),
                    document_type: DocumentCategory::Bank,
                })
                .await
                .unwrap();
        }

        assert_eq!(svc.delete(emp.id).await.unwrap(), 3);
        assert!(documents.list_by_employee(emp.id).await.unwrap().is_empty());
        assert!(store.keys().is_empty());
        assert!(matches!(svc.get(emp.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(emp.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_applies_partial_changes() {
        let employees = Arc::new(MockEmployeeRepository::default());
        let svc = EmployeeService::new(employees.clone(), Arc::new(MockDocumentRepository::default()), Arc::new(InMemoryObjectStore::default()));
        let emp = employees.create(input("Asha Rao")).await.unwrap();

        let changes = EmployeeChanges { location: Some("Mumbai".into()), ..Default::default() };
        let updated = svc.update(emp.id, changes).await.unwrap();
        assert_eq!(updated.location, "Mumbai");
        assert_eq!(updated.name, "Asha Rao");

        assert!(svc.update(emp.id, EmployeeChanges::default()).await.unwrap_err().is_validation());
        let bad = EmployeeChanges { phone_number: Some("call me".into()), ..Default::default() };
        assert!(svc.update(emp.id, bad).await.unwrap_err().is_validation());
        let missing = EmployeeChanges { name: Some("X".into()), ..Default::default() };
        assert!(matches!(svc.update(999, missing).await, Err(ServiceError::NotFound(_))));
    }
}
