use std::sync::Arc;

use tracing::{instrument, warn};

use super::domain::{Document, DocumentDetail, DocumentDownload, EmployeeSummary};
use super::repository::DocumentRepository;
use crate::employee::domain::Employee;
use crate::employee::repository::EmployeeRepository;
use crate::errors::ServiceError;
use crate::storage::{FolderLayout, ObjectStore};

/// Document retrieval, listing and removal.
pub struct DocumentService {
    employees: Arc<dyn EmployeeRepository>,
    documents: Arc<dyn DocumentRepository>,
    store: Arc<dyn ObjectStore>,
    layout: FolderLayout,
}

impl DocumentService {
    pub fn new(
        employees: Arc<dyn EmployeeRepository>,
        documents: Arc<dyn DocumentRepository>,
        store: Arc<dyn ObjectStore>,
        layout: FolderLayout,
    ) -> Self {
        Self { employees, documents, store, layout }
    }

    async fn employee(&self, employee_id: i32) -> Result<Employee, ServiceError> {
        self.employees
            .find_by_id(employee_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("employee"))
    }

    /// Full metadata, newest first.
    #[instrument(skip(self))]
    pub async fn list_for_employee(&self, employee_id: i32) -> Result<Vec<Document>, ServiceError> {
        self.employee(employee_id).await?;
        self.documents.list_by_employee(employee_id).await
    }

    /// Download projection, newest first.
    #[instrument(skip(self))]
    pub async fn downloads_for_employee(&self, employee_id: i32) -> Result<Vec<DocumentDownload>, ServiceError> {
        let docs = self.list_for_employee(employee_id).await?;
        Ok(docs.into_iter().map(DocumentDownload::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, document_id: i32) -> Result<DocumentDetail, ServiceError> {
        let document = self.documents
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("document"))?;
        let owner = self.employee(document.employee_id).await?;
        Ok(DocumentDetail { document, employee: EmployeeSummary { id: owner.id, name: owner.name } })
    }

    /// Remove the record, then the stored object. A failed object delete is
    /// logged and leaves an orphan behind.
    #[instrument(skip(self))]
    pub async fn delete(&self, document_id: i32) -> Result<Document, ServiceError> {
        let document = self.documents
            .find_by_id(document_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("document"))?;
        if !self.documents.delete(document_id).await? {
            return Err(ServiceError::not_found("document"));
        }
        if let Err(e) = self.store.delete_object(&document.storage_object_key).await {
            warn!(document_id, key = %document.storage_object_key, reason = %e, "stored object not removed");
        }
        Ok(document)
    }

    /// Object keys of the employee, read from the store itself. Listed by the
    /// id-scoped prefix so files stored before a rename are still found.
    #[instrument(skip(self))]
    pub async fn stored_files_for_employee(&self, employee_id: i32) -> Result<Vec<String>, ServiceError> {
        let employee = self.employee(employee_id).await?;
        let prefix = self.layout.employee_prefix(employee.id);
        Ok(self.store.list_prefix(&prefix).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::repository::mock::MockDocumentRepository;
    use crate::employee::repository::mock::MockEmployeeRepository;
    use crate::storage::InMemoryObjectStore;
    use models::document::{DocumentCategory, DocumentInput};
    use crate::employee::domain::EmployeeChanges;
    use models::employee::EmployeeInput;

    struct Fixture {
        employees: Arc<MockEmployeeRepository>,
        documents: Arc<MockDocumentRepository>,
        store: Arc<InMemoryObjectStore>,
        svc: DocumentService,
    }

    fn fixture() -> Fixture {
        let employees = Arc::new(MockEmployeeRepository::default());
        let documents = Arc::new(MockDocumentRepository::default());
        let store = Arc::new(InMemoryObjectStore::default());
        let svc = DocumentService::new(employees.clone(), documents.clone(), store.clone(), FolderLayout::new("employees"));
        Fixture { employees, documents, store, svc }
    }

    async fn seed(f: &Fixture, n: usize) -> (Employee, Vec<Document>) {
        let emp = f.employees
            .create(EmployeeInput { name: "Asha Rao".into(), phone_number: "9876543210".into(), location: "Pune".into(), ..Default::default() })
            .await
            .unwrap();
        let mut docs = vec![];
        for i in 0..n {
            let key = f.svc.layout.object_key(emp.id, &emp.name, &format!("{i}_scan.pdf"));
            let stored = f.store.put_object(&key, vec![0; 4], "application/pdf").await.unwrap();
            docs.push(
                f.documents
                    .create(DocumentInput {
                        employee_id: emp.id,
                        file_name: format!("{i}_scan.pdf"),
                        original_file_name: "scan.pdf".into(),
                        mime_type: "application/pdf".into(),
                        file_size: Some(4),
                        storage_object_key: key,
                        storage_url: stored.url.unwrap(),
                        document_type: DocumentCategory::Other,
                    })
                    .await
                    .unwrap(),
            );
        }
        (emp, docs)
    }

    #[tokio::test]
    async fn listings_are_newest_first() {
        let f = fixture();
        let (emp, docs) = seed(&f, 3).await;
        let listed: Vec<i32> = f.svc.list_for_employee(emp.id).await.unwrap().iter().map(|d| d.id).collect();
        let expected: Vec<i32> = docs.iter().rev().map(|d| d.id).collect();
        assert_eq!(listed, expected);

        let downloads = f.svc.downloads_for_employee(emp.id).await.unwrap();
        assert_eq!(downloads[0].id, expected[0]);
        assert_eq!(downloads[0].file_name, "scan.pdf");
    }

    #[tokio::test]
    async fn unknown_employee_is_not_found() {
        let f = fixture();
        assert!(matches!(f.svc.list_for_employee(99).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(f.svc.stored_files_for_employee(99).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn get_includes_owner_and_delete_removes_object() {
        let f = fixture();
        let (emp, docs) = seed(&f, 1).await;
        let detail = f.svc.get(docs[0].id).await.unwrap();
        assert_eq!(detail.employee, EmployeeSummary { id: emp.id, name: "Asha Rao".into() });

        let removed = f.svc.delete(docs[0].id).await.unwrap();
        assert!(f.store.keys().iter().all(|k| k != &removed.storage_object_key));
        assert!(f.documents.is_empty());
        assert!(matches!(f.svc.get(docs[0].id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn stored_files_lists_employee_folder() {
        let f = fixture();
        let (emp, _) = seed(&f, 2).await;
        let keys = f.svc.stored_files_for_employee(emp.id).await.unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.starts_with("employees/1_Asha_Rao/")));
    }

    #[tokio::test]
    async fn stored_files_survive_rename() {
        let f = fixture();
        let (emp, _) = seed(&f, 1).await;
        let other = f.employees
            .create(EmployeeInput { name: "Other".into(), phone_number: "9876543210".into(), location: "Pune".into(), ..Default::default() })
            .await
            .unwrap();
        f.store.put_object(&f.svc.layout.object_key(other.id, &other.name, "x_b.pdf"), vec![1], "application/pdf").await.unwrap();

        let changes = EmployeeChanges { name: Some("Asha Kumar".into()), ..Default::default() };
        f.employees.update(emp.id, &changes).await.unwrap().unwrap();

        let keys = f.svc.stored_files_for_employee(emp.id).await.unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("employees/1_Asha_Rao/"));
    }
}
