#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use configs::{AppConfig, FailureMode};
use server::{build_router, Components, ServerState};
use service::auth::repository::mock::MockAdminRepository;
use service::document::repository::mock::MockDocumentRepository;
use service::employee::repository::mock::MockEmployeeRepository;
use service::storage::InMemoryObjectStore;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

pub const ACCESS_SECRET: &str = "access-secret-for-tests-0123456789abcdef";
pub const REFRESH_SECRET: &str = "refresh-secret-for-tests-0123456789abcdef";

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.auth.access_secret = ACCESS_SECRET.into();
    cfg.auth.refresh_secret = REFRESH_SECRET.into();
    cfg.auth.cookie_secure = false;
    cfg.storage.bucket = "memory".into();
    cfg.upload.max_file_size_bytes = 1024;
    cfg
}

pub fn fail_closed_config(category: &str) -> AppConfig {
    let mut cfg = test_config();
    cfg.upload.category_modes.insert(category.into(), FailureMode::FailClosed);
    cfg
}

/// Router wired to in-memory backends, with handles for inspecting them.
pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
    pub employees: Arc<MockEmployeeRepository>,
    pub documents: Arc<MockDocumentRepository>,
    pub store: Arc<InMemoryObjectStore>,
}

impl TestApp {
    pub async fn new() -> Self { Self::with_config(test_config()).await }

    pub async fn with_config(cfg: AppConfig) -> Self {
        let employees = Arc::new(MockEmployeeRepository::default());
        let documents = Arc::new(MockDocumentRepository::default());
        let store = Arc::new(InMemoryObjectStore::default());
        let components = Components {
            admins: Arc::new(MockAdminRepository::default()),
            employees: employees.clone(),
            documents: documents.clone(),
            store: store.clone(),
        };
        let state = ServerState::new(components, &cfg).expect("test state");
        state.auth.ensure_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await.expect("seed admin");
        let router = build_router(state.clone(), CorsLayer::very_permissive());
        Self { router, state, employees, documents, store }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.expect("router is infallible")
    }

    /// Log in and return the `Cookie` header value carrying both tokens.
    pub async fn login_cookies(&self) -> String {
        let resp = self.send(json_request("POST", "/auth/login", &serde_json::json!({
            "email": ADMIN_EMAIL,
            "password": ADMIN_PASSWORD,
        }))).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let access = set_cookie(&resp, "accessToken").expect("access cookie");
        let refresh = set_cookie(&resp, "refreshToken").expect("refresh cookie");
        format!("accessToken={access}; refreshToken={refresh}")
    }
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("json body")))
        .expect("request")
}

pub fn get_with_cookies(uri: &str, cookies: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookies)
        .body(Body::empty())
        .expect("request")
}

pub fn request_with_cookies(method: &str, uri: &str, cookies: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookies)
        .body(Body::empty())
        .expect("request")
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Raw `Set-Cookie` header for `name`, if the response sets one.
pub fn set_cookie_header(resp: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(str::to_string)
}

/// Value of the cookie `name` set by the response.
pub fn set_cookie(resp: &Response<Body>, name: &str) -> Option<String> {
    let raw = set_cookie_header(resp, name)?;
    let pair = raw.split(';').next()?;
    pair.split_once('=').map(|(_, v)| v.to_string())
}

/// Hand-built `multipart/form-data` body.
pub struct MultipartBody {
    boundary: String,
    buf: Vec<u8>,
}

impl Default for MultipartBody {
    fn default() -> Self { Self::new() }
}

impl MultipartBody {
    pub fn new() -> Self {
        Self { boundary: "----employee-docs-test-boundary".into(), buf: Vec::new() }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.buf.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.buf.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n").as_bytes(),
        );
        self.buf.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, method: &str, uri: &str, cookies: &str) -> Request<Body> {
        self.buf.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", self.boundary))
            .header(header::COOKIE, cookies)
            .body(Body::from(self.buf))
            .expect("request")
    }
}

/// Create an employee through the API and return its id.
pub async fn create_employee(app: &TestApp, cookies: &str, name: &str) -> i64 {
    let req = MultipartBody::new()
        .text("name", name)
        .text("phoneNumber", "9876543210")
        .into_request("POST", "/employee", cookies);
    let resp = app.send(req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    body["data"]["employee"]["id"].as_i64().expect("employee id")
}
