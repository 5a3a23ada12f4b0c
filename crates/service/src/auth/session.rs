//! Dual-token session evaluation.
//!
//! [`evaluate_session`] is a pure function of the two presented tokens; the
//! HTTP middleware only applies the resulting cookie changes.

use tracing::debug;

use super::domain::AuthIdentity;
use super::token::{TokenCodec, TokenError, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoToken,
    AccessValid,
    AccessExpiredRefreshValid,
    AccessExpiredRefreshInvalid,
    AccessInvalid,
}

/// Rejection subtype, used for logging only; every rejection is a 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectKind {
    Missing,
    Expired,
    Invalid,
    MalformedPayload,
}

impl RejectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectKind::Missing => "missing",
            RejectKind::Expired => "expired",
            RejectKind::Invalid => "invalid",
            RejectKind::MalformedPayload => "malformed_payload",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: RejectKind,
    pub state: SessionState,
    pub message: &'static str,
    pub clear_access: bool,
    pub clear_refresh: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Access token valid; nothing to change.
    Admitted(AuthIdentity),
    /// Access token expired, refresh token valid: a new access token was minted.
    Rotated { identity: AuthIdentity, access_token: String },
    Rejected(Rejection),
    /// Minting the replacement token failed.
    Failed(String),
}

impl SessionOutcome {
    pub fn state(&self) -> Option<SessionState> {
        match self {
            SessionOutcome::Admitted(_) => Some(SessionState::AccessValid),
            SessionOutcome::Rotated { .. } => Some(SessionState::AccessExpiredRefreshValid),
            SessionOutcome::Rejected(r) => Some(r.state),
            SessionOutcome::Failed(_) => None,
        }
    }

    pub fn identity(&self) -> Option<&AuthIdentity> {
        match self {
            SessionOutcome::Admitted(identity) | SessionOutcome::Rotated { identity, .. } => Some(identity),
            _ => None,
        }
    }
}

fn reject(kind: RejectKind, state: SessionState, message: &'static str, clear_access: bool, clear_refresh: bool) -> SessionOutcome {
    SessionOutcome::Rejected(Rejection { kind, state, message, clear_access, clear_refresh })
}

/// Evaluate the presented access token, falling back to the refresh token
/// when (and only when) the access token is expired. The refresh token is
/// never rotated.
pub fn evaluate_session(codec: &TokenCodec, access: Option<&str>, refresh: Option<&str>) -> SessionOutcome {
    let Some(access) = access.filter(|t| !t.is_empty()) else {
        return reject(RejectKind::Missing, SessionState::NoToken, "Unauthorized", false, false);
    };

    match codec.verify(access, TokenKind::Access) {
        Ok(claims) => {
            return match claims.identity() {
                Some(identity) => SessionOutcome::Admitted(identity),
                None => reject(
                    RejectKind::MalformedPayload,
                    SessionState::AccessInvalid,
                    "Invalid access token payload",
                    false,
                    false,
                ),
            };
        }
        Err(TokenError::Invalid(reason)) => {
            debug!(%reason, "access token rejected");
            return reject(RejectKind::Invalid, SessionState::AccessInvalid, "Invalid access token", false, false);
        }
        Err(TokenError::Expired) => {}
    }

    let Some(refresh) = refresh.filter(|t| !t.is_empty()) else {
        return reject(
            RejectKind::Missing,
            SessionState::AccessExpiredRefreshInvalid,
            "Missing refresh token",
            true,
            false,
        );
    };

    let claims = match codec.verify(refresh, TokenKind::Refresh) {
        Ok(claims) => claims,
        Err(e) => {
            let kind = match e {
                TokenError::Expired => RejectKind::Expired,
                TokenError::Invalid(_) => RejectKind::Invalid,
            };
            return reject(kind, SessionState::AccessExpiredRefreshInvalid, "Invalid refresh token", true, true);
        }
    };

    let Some(identity) = claims.identity() else {
        return reject(
            RejectKind::MalformedPayload,
            SessionState::AccessExpiredRefreshInvalid,
            "Invalid refresh token payload",
            true,
            false,
        );
    };

    match codec.sign(&identity, TokenKind::Access) {
        Ok(access_token) => SessionOutcome::Rotated { identity, access_token },
        Err(e) => SessionOutcome::Failed(e.to_string()),
    }
}
