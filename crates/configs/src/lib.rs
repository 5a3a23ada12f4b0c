use std::collections::BTreeMap;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

/// Minimum accepted length for token signing secrets, in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Upper bound for token lifetimes, in days.
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Category tags accepted as keys of `[upload.category_modes]`.
pub const KNOWN_CATEGORIES: [&str; 4] = ["identity-proof", "tax-id", "bank", "other"];

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

/// Token secrets, lifetimes and cookie policy.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub access_secret: String,
    #[serde(default)]
    pub refresh_secret: String,
    #[serde(default = "default_access_ttl_days")]
    pub access_ttl_days: i64,
    #[serde(default = "default_refresh_ttl_days")]
    pub refresh_ttl_days: i64,
    /// `Secure` flag on session cookies; only disable for plain-http local runs.
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    /// Admin seeded at startup when both are present.
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

fn default_access_ttl_days() -> i64 { 7 }
fn default_refresh_ttl_days() -> i64 { 30 }
fn default_true() -> bool { true }

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_ttl_days: default_access_ttl_days(),
            refresh_ttl_days: default_refresh_ttl_days(),
            cookie_secure: true,
            admin_email: None,
            admin_password: None,
        }
    }
}

/// S3-compatible object store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub region: Option<String>,
    /// Custom endpoint (MinIO, R2, LocalStack ...).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Base used to build object URLs; defaults to the virtual-hosted S3 URL.
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// Prefix under which every employee folder lives.
    #[serde(default = "default_root_prefix")]
    pub root_prefix: String,
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_root_prefix() -> String { "employees".into() }

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: None,
            endpoint: None,
            public_base_url: None,
            root_prefix: default_root_prefix(),
            force_path_style: false,
        }
    }
}

/// What a failed attachment does to the surrounding employee creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailureMode {
    #[default]
    FailOpen,
    FailClosed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: usize,
    #[serde(default)]
    pub default_mode: FailureMode,
    /// Per-category overrides keyed by category tag (e.g. `tax-id = "fail-closed"`).
    #[serde(default)]
    pub category_modes: BTreeMap<String, FailureMode>,
}

fn default_max_file_size() -> usize { 10 * 1024 * 1024 }

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
            default_mode: FailureMode::FailOpen,
            category_modes: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> { vec!["http://localhost:3000".into()] }

impl Default for CorsConfig {
    fn default() -> Self { Self { allowed_origins: default_allowed_origins() } }
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`); fall back to a pure environment
    /// configuration when the file is missing. Always normalized and validated.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        self.storage.normalize_from_env();
        self.storage.validate()?;
        self.upload.validate()?;
        self.cors.normalize_from_env();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if let Some(host) = env_opt("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = env_opt("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Some(url) = env_opt("DATABASE_URL") {
                self.url = url;
            }
        }
        if self.max_connections == 0 {
            self.max_connections = default_max_connections();
        }
        if self.min_connections == 0 {
            self.min_connections = default_min_connections();
        }
        if self.connect_timeout_secs == 0 {
            self.connect_timeout_secs = default_connect_timeout();
        }
        if self.acquire_timeout_secs == 0 {
            self.acquire_timeout_secs = default_acquire_timeout();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.access_secret.is_empty() {
            if let Some(s) = env_opt("JWT_ACCESS_SECRET") { self.access_secret = s; }
        }
        if self.refresh_secret.is_empty() {
            if let Some(s) = env_opt("JWT_REFRESH_SECRET") { self.refresh_secret = s; }
        }
        if let Some(flag) = env_opt("COOKIE_SECURE") {
            self.cookie_secure = !matches!(flag.to_ascii_lowercase().as_str(), "0" | "false" | "no");
        }
        if self.admin_email.is_none() { self.admin_email = env_opt("ADMIN_EMAIL"); }
        if self.admin_password.is_none() { self.admin_password = env_opt("ADMIN_PASSWORD"); }
    }

    pub fn validate(&self) -> Result<()> {
        if self.access_secret.len() < MIN_SECRET_LENGTH {
            return Err(anyhow!("auth.access_secret must be at least {MIN_SECRET_LENGTH} bytes"));
        }
        if self.refresh_secret.len() < MIN_SECRET_LENGTH {
            return Err(anyhow!("auth.refresh_secret must be at least {MIN_SECRET_LENGTH} bytes"));
        }
        if self.access_secret == self.refresh_secret {
            return Err(anyhow!("auth.access_secret and auth.refresh_secret must differ"));
        }
        if self.access_ttl_days <= 0 || self.refresh_ttl_days <= 0 {
            return Err(anyhow!("token lifetimes must be positive"));
        }
        if self.access_ttl_days > MAX_TOKEN_TTL_DAYS || self.refresh_ttl_days > MAX_TOKEN_TTL_DAYS {
            return Err(anyhow!("token lifetimes must be at most {MAX_TOKEN_TTL_DAYS} days"));
        }
        if self.admin_email.is_some() != self.admin_password.is_some() {
            return Err(anyhow!("auth.admin_email and auth.admin_password must be set together"));
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        if self.bucket.is_empty() {
            if let Some(b) = env_opt("S3_BUCKET") { self.bucket = b; }
        }
        if self.region.is_none() { self.region = env_opt("S3_REGION"); }
        if self.endpoint.is_none() { self.endpoint = env_opt("S3_ENDPOINT"); }
        if self.public_base_url.is_none() { self.public_base_url = env_opt("S3_PUBLIC_BASE_URL"); }
        if let Some(root) = env_opt("STORAGE_ROOT") { self.root_prefix = root; }
        self.root_prefix = self.root_prefix.trim_matches('/').to_string();
        if self.endpoint.is_some() && env_opt("S3_FORCE_PATH_STYLE").is_some() {
            self.force_path_style = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let b = self.bucket.trim();
        if b.len() < 3 || b.len() > 63 {
            return Err(anyhow!("storage.bucket must be 3..=63 characters"));
        }
        if !b.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.') {
            return Err(anyhow!("storage.bucket may only contain lowercase letters, digits, '-' and '.'"));
        }
        if self.root_prefix.is_empty() {
            return Err(anyhow!("storage.root_prefix must not be empty"));
        }
        Ok(())
    }
}

impl UploadConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow!("upload.max_file_size_bytes must be positive"));
        }
        if let Some(unknown) = self.category_modes.keys().find(|k| !KNOWN_CATEGORIES.contains(&k.as_str())) {
            return Err(anyhow!("upload.category_modes: unknown category '{unknown}'"));
        }
        Ok(())
    }
}

impl CorsConfig {
    pub fn normalize_from_env(&mut self) {
        if let Some(origins) = env_opt("CORS_ORIGIN") {
            self.allowed_origins = origins.split(',').map(|o| o.trim().to_string()).filter(|o| !o.is_empty()).collect();
        }
    }
}
