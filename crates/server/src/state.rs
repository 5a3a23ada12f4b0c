use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration as TimeDuration;

use crate::errors::StartupError;
use service::auth::repository::AdminRepository;
use service::auth::{AuthService, TokenCodec, TokenKind};
use service::document::repository::DocumentRepository;
use service::document::DocumentService;
use service::employee::repository::EmployeeRepository;
use service::employee::EmployeeService;
use service::storage::{FolderLayout, ObjectStore};
use service::upload::{UploadOrchestrator, UploadPolicy};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Storage backends the server is wired against.
pub struct Components {
    pub admins: Arc<dyn AdminRepository>,
    pub employees: Arc<dyn EmployeeRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub store: Arc<dyn ObjectStore>,
}

/// Attributes of the two session cookies.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub secure: bool,
    access_max_age: TimeDuration,
    refresh_max_age: TimeDuration,
}

impl CookieSettings {
    pub fn new(secure: bool, codec: &TokenCodec) -> Self {
        Self {
            secure,
            access_max_age: TimeDuration::seconds(codec.ttl(TokenKind::Access).num_seconds()),
            refresh_max_age: TimeDuration::seconds(codec.ttl(TokenKind::Refresh).num_seconds()),
        }
    }

    fn name(kind: TokenKind) -> &'static str {
        match kind {
            TokenKind::Access => ACCESS_COOKIE,
            TokenKind::Refresh => REFRESH_COOKIE,
        }
    }

    fn build(&self, kind: TokenKind, value: String, max_age: TimeDuration) -> Cookie<'static> {
        // Browsers drop SameSite=None cookies that are not Secure.
        let same_site = if self.secure { SameSite::None } else { SameSite::Lax };
        Cookie::build((Self::name(kind), value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(same_site)
            .max_age(max_age)
            .build()
    }

    pub fn issue(&self, kind: TokenKind, token: String) -> Cookie<'static> {
        let max_age = match kind {
            TokenKind::Access => self.access_max_age,
            TokenKind::Refresh => self.refresh_max_age,
        };
        self.build(kind, token, max_age)
    }

    pub fn expire(&self, kind: TokenKind) -> Cookie<'static> {
        self.build(kind, String::new(), TimeDuration::seconds(0))
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService>,
    pub employees: Arc<EmployeeService>,
    pub documents: Arc<DocumentService>,
    pub uploads: Arc<UploadOrchestrator>,
    pub store: Arc<dyn ObjectStore>,
    pub cookies: CookieSettings,
    pub max_file_size: usize,
}

impl ServerState {
    pub fn new(components: Components, cfg: &configs::AppConfig) -> Result<Self, StartupError> {
        let codec = TokenCodec::from_config(&cfg.auth).map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
        let policy = UploadPolicy::from_config(&cfg.upload).map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
        let layout = FolderLayout::new(cfg.storage.root_prefix.clone());
        let cookies = CookieSettings::new(cfg.auth.cookie_secure, &codec);

        let Components { admins, employees, documents, store } = components;
        Ok(Self {
            auth: Arc::new(AuthService::new(admins, Arc::new(codec))),
            employees: Arc::new(EmployeeService::new(employees.clone(), documents.clone(), store.clone())),
            documents: Arc::new(DocumentService::new(employees.clone(), documents.clone(), store.clone(), layout.clone())),
            uploads: Arc::new(UploadOrchestrator::new(employees, documents, store.clone(), layout, policy)),
            store,
            cookies,
            max_file_size: cfg.upload.max_file_size_bytes,
        })
    }
}
