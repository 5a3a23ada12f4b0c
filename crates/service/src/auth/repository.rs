use async_trait::async_trait;

use super::domain::{AdminUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction over the admin credential table.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Case-insensitive lookup by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Credentials>, AuthError>;
    async fn create(&self, email: &str, password_hash: String) -> Result<AdminUser, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAdminRepository {
        admins: Mutex<HashMap<String, Credentials>>, // key: lowercased email
    }

    #[async_trait]
    impl AdminRepository for MockAdminRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<Credentials>, AuthError> {
            let admins = self.admins.lock().unwrap_or_else(|p| p.into_inner());
            Ok(admins.get(&email.trim().to_lowercase()).cloned())
        }

        async fn create(&self, email: &str, password_hash: String) -> Result<AdminUser, AuthError> {
            let mut admins = self.admins.lock().unwrap_or_else(|p| p.into_inner());
            let key = email.trim().to_lowercase();
            if admins.contains_key(&key) {
                return Err(AuthError::Repository(format!("admin {key} already exists")));
            }
            let admin = AdminUser { id: admins.len() as i32 + 1, email: key.clone() };
            admins.insert(key, Credentials { admin: admin.clone(), password_hash });
            Ok(admin)
        }
    }
}
