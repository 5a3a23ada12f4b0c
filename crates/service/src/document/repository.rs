use async_trait::async_trait;

use super::domain::Document;
use crate::errors::ServiceError;
use models::document::DocumentInput;

/// Repository abstraction for document metadata.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<Document>, ServiceError>;
    /// Newest first (`created_at` desc, `id` desc).
    async fn list_by_employee(&self, employee_id: i32) -> Result<Vec<Document>, ServiceError>;
    async fn create(&self, input: DocumentInput) -> Result<Document, ServiceError>;
    async fn delete(&self, id: i32) -> Result<bool, ServiceError>;
    /// Remove every document of an employee, returning what was removed.
    async fn delete_by_employee(&self, employee_id: i32) -> Result<Vec<Document>, ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockDocumentRepository {
        rows: Mutex<BTreeMap<i32, Document>>,
        failing_names: Mutex<HashSet<String>>,
    }

    impl MockDocumentRepository {
        /// Inserts for a document with this original file name fail.
        pub fn fail_inserts_for(&self, original_file_name: impl Into<String>) {
            self.failing_names.lock().unwrap_or_else(|p| p.into_inner()).insert(original_file_name.into());
        }

        pub fn len(&self) -> usize { self.rows.lock().unwrap_or_else(|p| p.into_inner()).len() }

        pub fn is_empty(&self) -> bool { self.len() == 0 }
    }

    fn newest_first(mut docs: Vec<Document>) -> Vec<Document> {
        docs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        docs
    }

    #[async_trait]
    impl DocumentRepository for MockDocumentRepository {
        async fn find_by_id(&self, id: i32) -> Result<Option<Document>, ServiceError> {
            Ok(self.rows.lock().unwrap_or_else(|p| p.into_inner()).get(&id).cloned())
        }

        async fn list_by_employee(&self, employee_id: i32) -> Result<Vec<Document>, ServiceError> {
            let rows = self.rows.lock().unwrap_or_else(|p| p.into_inner());
            Ok(newest_first(rows.values().filter(|d| d.employee_id == employee_id).cloned().collect()))
        }

        async fn create(&self, input: DocumentInput) -> Result<Document, ServiceError> {
            if self.failing_names.lock().unwrap_or_else(|p| p.into_inner()).contains(&input.original_file_name) {
                return Err(ServiceError::Db(format!("simulated insert failure for {}", input.original_file_name)));
            }
            let mut rows = self.rows.lock().unwrap_or_else(|p| p.into_inner());
            let id = rows.keys().next_back().copied().unwrap_or(0) + 1;
            let doc = Document {
                id,
                employee_id: input.employee_id,
                file_name: input.file_name,
                original_file_name: input.original_file_name,
                mime_type: input.mime_type,
                file_size: input.file_size,
                storage_object_key: input.storage_object_key,
                storage_url: input.storage_url,
                document_type: input.document_type,
                created_at: Utc::now(),
            };
            rows.insert(id, doc.clone());
            Ok(doc)
        }

        async fn delete(&self, id: i32) -> Result<bool, ServiceError> {
            Ok(self.rows.lock().unwrap_or_else(|p| p.into_inner()).remove(&id).is_some())
        }

        async fn delete_by_employee(&self, employee_id: i32) -> Result<Vec<Document>, ServiceError> {
            let mut rows = self.rows.lock().unwrap_or_else(|p| p.into_inner());
            let ids: Vec<i32> = rows.values().filter(|d| d.employee_id == employee_id).map(|d| d.id).collect();
            Ok(ids.into_iter().filter_map(|id| rows.remove(&id)).collect())
        }
    }
}
