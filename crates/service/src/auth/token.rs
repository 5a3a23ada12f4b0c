use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::AuthIdentity;
use super::errors::AuthError;

/// Which secret and TTL a token is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT payload. Identity fields are optional on the wire so that a token
/// with a valid signature but an incomplete payload can be told apart from
/// a forged one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<i64>,
    pub iat: i64,
    pub exp: i64,
    pub kind: TokenKind,
}

impl SessionClaims {
    /// Identity when both subject id and a non-empty email are present.
    pub fn identity(&self) -> Option<AuthIdentity> {
        let subject_id = self.sub?;
        let email = self.email.as_deref().filter(|e| !e.trim().is_empty())?;
        Some(AuthIdentity { subject_id, email: email.to_string(), department: self.department })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KeyPair {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

/// Signs and verifies the two token kinds, each with its own secret.
pub struct TokenCodec {
    access: KeyPair,
    refresh: KeyPair,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(access_secret: &str, refresh_secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Result<Self, AuthError> {
        for (name, secret) in [("access", access_secret), ("refresh", refresh_secret)] {
            if secret.len() < configs::MIN_SECRET_LENGTH {
                return Err(AuthError::Validation(format!(
                    "{name} secret must be at least {} bytes",
                    configs::MIN_SECRET_LENGTH
                )));
            }
        }
        if access_secret == refresh_secret {
            return Err(AuthError::Validation("access and refresh secrets must differ".into()));
        }
        if access_ttl <= Duration::zero() || refresh_ttl <= Duration::zero() {
            return Err(AuthError::Validation("token ttl must be positive".into()));
        }
        if access_ttl.num_days() > configs::MAX_TOKEN_TTL_DAYS || refresh_ttl.num_days() > configs::MAX_TOKEN_TTL_DAYS {
            return Err(AuthError::Validation(format!(
                "token ttl must be at most {} days",
                configs::MAX_TOKEN_TTL_DAYS
            )));
        }
        Ok(Self { access: KeyPair::new(access_secret, access_ttl), refresh: KeyPair::new(refresh_secret, refresh_ttl) })
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Result<Self, AuthError> {
        let days = |n: i64| {
            Duration::try_days(n).ok_or_else(|| AuthError::Validation(format!("token ttl of {n} days is out of range")))
        };
        Self::new(&cfg.access_secret, &cfg.refresh_secret, days(cfg.access_ttl_days)?, days(cfg.refresh_ttl_days)?)
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    pub fn ttl(&self, kind: TokenKind) -> Duration { self.keys(kind).ttl }

    /// Issue a token of `kind` for `identity`, expiring `ttl(kind)` from now.
    pub fn sign(&self, identity: &AuthIdentity, kind: TokenKind) -> Result<String, AuthError> {
        let iat = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: Some(identity.subject_id),
            email: Some(identity.email.clone()),
            department: identity.department,
            iat,
            exp: iat + self.ttl(kind).num_seconds(),
            kind,
        };
        self.sign_claims(&claims)
    }

    /// Sign an arbitrary payload with the secret of `claims.kind`.
    pub fn sign_claims(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.keys(claims.kind).encoding)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Verify signature, structure, strict expiry and kind.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.required_spec_claims.insert("exp".to_string());

        let data = decode::<SessionClaims>(token, &self.keys(kind).decoding, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })?;

        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }
        if data.claims.kind != kind {
            return Err(TokenError::Invalid("token kind mismatch".into()));
        }
        Ok(data.claims)
    }
}
