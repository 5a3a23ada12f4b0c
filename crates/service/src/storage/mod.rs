//! Blob storage behind [`ObjectStore`].
//!
//! Objects live under one folder per employee:
//! `{root}/{employee_id}_{name with whitespace runs replaced by '_'}/`.
//! The folder is named once, from the name at the first upload; a later
//! rename keeps using it. Lookups go by the id-scoped prefix `{root}/{id}_`.

use async_trait::async_trait;
use thiserror::Error;

pub mod s3;
pub mod memory;

pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object store request failed: {0}")]
    Request(String),
    #[error("object store misconfigured: {0}")]
    Config(String),
}

/// What the store reports back after an upload. Either field may be absent
/// when the backend responds without it; callers treat that as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: Option<String>,
    pub url: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<StoredObject, StorageError>;
    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;
    /// Keys under `prefix`, in store order.
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
    async fn health_check(&self) -> Result<(), StorageError>;
    fn bucket(&self) -> &str;
}

/// Builds object keys for employee documents.
#[derive(Debug, Clone)]
pub struct FolderLayout {
    root: String,
}

impl FolderLayout {
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        Self { root: root.trim_matches('/').to_string() }
    }

    /// Folder prefix for one employee, with a trailing slash.
    pub fn employee_folder(&self, employee_id: i32, employee_name: &str) -> String {
        let name = folder_safe_name(employee_name);
        if self.root.is_empty() {
            format!("{employee_id}_{name}/")
        } else {
            format!("{}/{employee_id}_{name}/", self.root)
        }
    }

    pub fn object_key(&self, employee_id: i32, employee_name: &str, stored_file_name: &str) -> String {
        format!("{}{}", self.employee_folder(employee_id, employee_name), stored_file_name)
    }

    /// Prefix shared by every folder of this employee, whatever name it was
    /// created under. `{root}/1_` cannot match `{root}/12_`.
    pub fn employee_prefix(&self, employee_id: i32) -> String {
        if self.root.is_empty() {
            format!("{employee_id}_")
        } else {
            format!("{}/{employee_id}_", self.root)
        }
    }

    /// Folder of an existing object key when it belongs to this employee.
    pub fn folder_of(&self, employee_id: i32, key: &str) -> Option<String> {
        let (folder, _) = key.rsplit_once('/')?;
        let folder = format!("{folder}/");
        let rest = folder.strip_prefix(&self.employee_prefix(employee_id))?;
        (!rest.is_empty() && rest.matches('/').count() == 1).then_some(folder)
    }
}

/// Collapse whitespace runs to `_`; path separators would split the folder.
fn folder_safe_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace(['/', '\\'], "_")
}

/// Last path component of a client-supplied file name, restricted to
/// `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() { "file".to_string() } else { cleaned.to_string() }
}

/// Unique stored name: short random prefix plus the sanitized original.
pub fn stored_file_name(original: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", &id[..12], sanitize_file_name(original))
}
