use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, warn};

use crate::errors::session_error;
use crate::state::{ServerState, ACCESS_COOKIE, REFRESH_COOKIE};
use service::auth::session::{evaluate_session, SessionOutcome};
use service::auth::TokenKind;

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Admit requests with a valid session, silently rotating an expired access
/// token when the refresh token is still good. The verified
/// [`service::auth::domain::AuthIdentity`] is placed in request extensions.
pub async fn require_session(State(state): State<ServerState>, jar: CookieJar, mut req: Request, next: Next) -> Response {
    let access = jar
        .get(ACCESS_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| bearer_token(req.headers()));
    let refresh = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());

    match evaluate_session(state.auth.codec(), access.as_deref(), refresh.as_deref()) {
        SessionOutcome::Admitted(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        SessionOutcome::Rotated { identity, access_token } => {
            info!(subject_id = identity.subject_id, "access token rotated");
            req.extensions_mut().insert(identity);
            let response = next.run(req).await;
            let jar = CookieJar::new().add(state.cookies.issue(TokenKind::Access, access_token));
            (jar, response).into_response()
        }
        SessionOutcome::Rejected(rejection) => {
            warn!(
                path = %req.uri().path(),
                reason = rejection.kind.as_str(),
                state = ?rejection.state,
                "session rejected"
            );
            let mut jar = CookieJar::new();
            if rejection.clear_access {
                jar = jar.add(state.cookies.expire(TokenKind::Access));
            }
            if rejection.clear_refresh {
                jar = jar.add(state.cookies.expire(TokenKind::Refresh));
            }
            (jar, session_error(StatusCode::UNAUTHORIZED, rejection.message)).into_response()
        }
        SessionOutcome::Failed(reason) => {
            error!(%reason, "session evaluation failed");
            session_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
