use std::collections::HashMap;

use configs::{FailureMode, UploadConfig};
use models::document::DocumentCategory;

use crate::errors::ServiceError;

/// Failure handling per document category.
#[derive(Debug, Clone, Default)]
pub struct UploadPolicy {
    default_mode: FailureMode,
    overrides: HashMap<DocumentCategory, FailureMode>,
}

impl UploadPolicy {
    pub fn fail_open() -> Self { Self::default() }

    pub fn with_default(mut self, mode: FailureMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn with_override(mut self, category: DocumentCategory, mode: FailureMode) -> Self {
        self.overrides.insert(category, mode);
        self
    }

    pub fn mode_for(&self, category: DocumentCategory) -> FailureMode {
        self.overrides.get(&category).copied().unwrap_or(self.default_mode)
    }

    pub fn from_config(cfg: &UploadConfig) -> Result<Self, ServiceError> {
        let mut policy = Self::default().with_default(cfg.default_mode);
        for (tag, mode) in &cfg.category_modes {
            let category: DocumentCategory = tag.parse()?;
            policy = policy.with_override(category, *mode);
        }
        Ok(policy)
    }
}
