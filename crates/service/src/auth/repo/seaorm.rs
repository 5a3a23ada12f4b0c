use sea_orm::DatabaseConnection;

use crate::auth::domain::{AdminUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AdminRepository;
use models::errors::ModelError;

pub struct SeaOrmAdminRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAdminRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_credentials(m: models::admin::Model) -> Credentials {
    Credentials { admin: AdminUser { id: m.id, email: m.email }, password_hash: m.password_hash }
}

#[async_trait::async_trait]
impl AdminRepository for SeaOrmAdminRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credentials>, AuthError> {
        let res = models::admin::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_credentials))
    }

    async fn create(&self, email: &str, password_hash: String) -> Result<AdminUser, AuthError> {
        let created = models::admin::create(&self.db, email, password_hash)
            .await
            .map_err(|e| match e {
                ModelError::Validation(msg) => AuthError::Validation(msg),
                ModelError::Db(msg) => AuthError::Repository(msg),
            })?;
        Ok(to_credentials(created).admin)
    }
}
