use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;
use tracing::{info, debug, instrument};

use super::domain::{AdminUser, AuthIdentity, AuthSession, LoginInput};
use super::errors::AuthError;
use super::repository::AdminRepository;
use super::token::{TokenCodec, TokenKind};

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::HashError(e.to_string()))?
        .to_string())
}

/// Auth business service independent of web framework
pub struct AuthService<R: AdminRepository + ?Sized = dyn AdminRepository> {
    repo: Arc<R>,
    codec: Arc<TokenCodec>,
}

impl<R: AdminRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, codec: Arc<TokenCodec>) -> Self { Self { repo, codec } }

    pub fn codec(&self) -> &TokenCodec { &self.codec }

    /// Authenticate an admin and issue an access/refresh token pair.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, TokenCodec, repository::mock::MockAdminRepository};
    /// use service::auth::domain::LoginInput;
    /// use std::sync::Arc;
    /// let codec = TokenCodec::new(
    ///     "access-secret-0123456789abcdefghijklmnop",
    ///     "refresh-secret-0123456789abcdefghijklmnop",
    ///     chrono::Duration::days(7),
    ///     chrono::Duration::days(30),
    /// ).unwrap();
    /// let svc = AuthService::new(Arc::new(MockAdminRepository::default()), Arc::new(codec));
    /// tokio_test::block_on(svc.ensure_admin("admin@example.com", "Passw0rd!")).unwrap();
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "admin@example.com".into(), password: "Passw0rd!".into() })).unwrap();
    /// assert_eq!(session.user.email, "admin@example.com");
    /// assert_ne!(session.access_token, session.refresh_token);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("email and password are required".into()));
        }

        let cred = self.repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            debug!(admin_id = cred.admin.id, "password mismatch");
            return Err(AuthError::Unauthorized);
        }

        let identity = AuthIdentity::from(&cred.admin);
        let access_token = self.codec.sign(&identity, TokenKind::Access)?;
        let refresh_token = self.codec.sign(&identity, TokenKind::Refresh)?;
        info!(admin_id = cred.admin.id, "admin_logged_in");
        Ok(AuthSession { user: cred.admin, access_token, refresh_token })
    }

    /// Create the admin when no account with `email` exists yet.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<AdminUser, AuthError> {
        if let Some(existing) = self.repo.find_by_email(email).await? {
            debug!(admin_id = existing.admin.id, "admin already present");
            return Ok(existing.admin);
        }
        if password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        let admin = self.repo.create(email, hash_password(password)?).await?;
        info!(admin_id = admin.id, email = %admin.email, "admin_seeded");
        Ok(admin)
    }
}
