use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::info;

use crate::errors::JsonApiError;
use crate::routes::{success, Envelope};
use crate::state::ServerState;
use service::auth::domain::{AdminUser, AuthIdentity, LoginInput};
use service::auth::TokenKind;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutput {
    pub message: String,
    pub user: AdminUser,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageOutput {
    pub message: String,
}

#[utoipa::path(
    post, path = "/auth/login", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Logged in; both session cookies set", body = crate::openapi::LoginResponseDoc),
        (status = 400, description = "Missing email or password", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 401, description = "Invalid credentials", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let Json(input) = payload.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    let session = state.auth.login(input).await?;

    let jar = jar
        .add(state.cookies.issue(TokenKind::Access, session.access_token.clone()))
        .add(state.cookies.issue(TokenKind::Refresh, session.refresh_token.clone()));
    let out = LoginOutput {
        message: "Login successful".into(),
        user: session.user,
        access_token: session.access_token,
        refresh_token: session.refresh_token,
    };
    Ok((jar, Json(out)))
}

#[utoipa::path(
    post, path = "/auth/logout", tag = "auth",
    responses((status = 200, description = "Session cookies cleared"))
)]
pub async fn logout(State(state): State<ServerState>, jar: CookieJar) -> (CookieJar, Json<MessageOutput>) {
    let jar = jar
        .add(state.cookies.expire(TokenKind::Access))
        .add(state.cookies.expire(TokenKind::Refresh));
    info!("admin_logged_out");
    (jar, Json(MessageOutput { message: "Logged out successfully".into() }))
}

#[utoipa::path(
    get, path = "/auth/me", tag = "auth",
    responses(
        (status = 200, description = "Identity of the current session"),
        (status = 401, description = "No valid session")
    )
)]
pub async fn me(Extension(identity): Extension<AuthIdentity>) -> Json<Envelope<AuthIdentity>> {
    success("Session is valid", identity)
}
