use serde::{Deserialize, Serialize};

/// Login input. Missing fields deserialize as empty and fail validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Admin as exposed to clients; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i32,
    pub email: String,
}

/// Stored credentials (hashed)
#[derive(Debug, Clone)]
pub struct Credentials {
    pub admin: AdminUser,
    pub password_hash: String,
}

/// Identity carried by a verified session and attached to the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthIdentity {
    pub subject_id: i32,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<i64>,
}

impl From<&AdminUser> for AuthIdentity {
    fn from(user: &AdminUser) -> Self {
        Self { subject_id: user.id, email: user.email.clone(), department: None }
    }
}

/// Login result: both tokens are returned and set as cookies by the HTTP layer.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: AdminUser,
    pub access_token: String,
    pub refresh_token: String,
}
