use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ObjectStore, StorageError, StoredObject};

/// Object store kept in process memory, with switches to simulate backend
/// failures. Used by tests and local runs without a bucket.
pub struct InMemoryObjectStore {
    bucket: String,
    objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
    failing_patterns: Mutex<Vec<String>>,
    omit_urls: AtomicBool,
    offline: AtomicBool,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self { Self::new("memory") }
}

impl InMemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(BTreeMap::new()),
            failing_patterns: Mutex::new(Vec::new()),
            omit_urls: AtomicBool::new(false),
            offline: AtomicBool::new(false),
        }
    }

    /// Uploads whose key contains `pattern` fail.
    pub fn fail_uploads_matching(&self, pattern: impl Into<String>) {
        self.failing_patterns.lock().unwrap_or_else(|p| p.into_inner()).push(pattern.into());
    }

    /// Report successful uploads without a URL.
    pub fn omit_urls(&self, omit: bool) { self.omit_urls.store(omit, Ordering::SeqCst); }

    /// Every call fails while offline.
    pub fn set_offline(&self, offline: bool) { self.offline.store(offline, Ordering::SeqCst); }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap_or_else(|p| p.into_inner()).keys().cloned().collect()
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.lock().unwrap_or_else(|p| p.into_inner()).get(key).map(|(_, ct)| ct.clone())
    }

    fn ensure_online(&self) -> Result<(), StorageError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Request("store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<StoredObject, StorageError> {
        self.ensure_online()?;
        let failing = self.failing_patterns.lock().unwrap_or_else(|p| p.into_inner());
        if failing.iter().any(|p| key.contains(p.as_str())) {
            return Err(StorageError::Request(format!("simulated upload failure for {key}")));
        }
        drop(failing);
        self.objects
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_string(), (body, content_type.to_string()));
        let url = (!self.omit_urls.load(Ordering::SeqCst)).then(|| format!("memory://{}/{}", self.bucket, key));
        Ok(StoredObject { key: Some(key.to_string()), url })
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.ensure_online()?;
        self.objects.lock().unwrap_or_else(|p| p.into_inner()).remove(key);
        Ok(())
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.ensure_online()?;
        let objects = self.objects.lock().unwrap_or_else(|p| p.into_inner());
        Ok(objects.keys().filter(|k| k.starts_with(prefix)).cloned().collect())
    }

    async fn health_check(&self) -> Result<(), StorageError> { self.ensure_online() }

    fn bucket(&self) -> &str { &self.bucket }
}
