use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::{Components, ServerState};
use service::auth::repo::seaorm::SeaOrmAdminRepository;
use service::document::repo::seaorm::SeaOrmDocumentRepository;
use service::employee::repo::seaorm::SeaOrmEmployeeRepository;
use service::storage::S3ObjectStore;

/// CORS for the configured browser origins; cookies require credentials.
pub fn build_cors(cfg: &configs::CorsConfig) -> Result<CorsLayer, StartupError> {
    let origins = cfg
        .allowed_origins
        .iter()
        .map(|o| HeaderValue::from_str(o.trim()).map_err(|_| StartupError::InvalidConfig(format!("invalid CORS origin '{o}'"))))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]))
}

/// Create the configured admin when both seed variables are present.
async fn seed_admin(state: &ServerState, cfg: &configs::AuthConfig) -> Result<(), StartupError> {
    match (&cfg.admin_email, &cfg.admin_password) {
        (Some(email), Some(password)) => {
            state
                .auth
                .ensure_admin(email, password)
                .await
                .map_err(|e| StartupError::InvalidConfig(format!("admin seed failed: {e}")))?;
        }
        _ => info!("no admin seed configured"),
    }
    Ok(())
}

/// Serve `app` until `shutdown` resolves, letting in-flight requests finish.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = configs::AppConfig::load_and_validate()?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;
    info!("database migrations applied");

    let store = S3ObjectStore::from_config(&cfg.storage)
        .await
        .map_err(|e| StartupError::Storage(e.to_string()))?;

    let components = Components {
        admins: Arc::new(SeaOrmAdminRepository::new(db.clone())),
        employees: Arc::new(SeaOrmEmployeeRepository::new(db.clone())),
        documents: Arc::new(SeaOrmDocumentRepository::new(db.clone())),
        store: Arc::new(store),
    };
    let state = ServerState::new(components, &cfg)?;
    seed_admin(&state, &cfg.auth).await?;

    if !cfg.auth.cookie_secure {
        warn!("session cookies are not marked Secure; use only for local development");
    }

    let app = routes::build_router(state, build_cors(&cfg.cors)?);
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, bucket = %cfg.storage.bucket, "server listening");

    serve(listener, app, common::utils::shutdown::shutdown_signal()).await?;

    info!("http server stopped; closing database pool");
    db.close().await?;
    Ok(())
}
