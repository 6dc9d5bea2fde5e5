//! Session and role models backing the admin guard.

use serde::Serialize;

/// Role name that grants access to the admin surface.
pub const ROLE_ADMIN: &str = "admin";

/// A live sign-in session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: Option<String>,
}

/// The authenticated admin attached to guarded requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminIdentity {
    pub user_id: String,
    pub role: String,
    /// `None` for sessions that never expire
    pub expires_at: Option<String>,
    #[serde(skip)]
    pub token: String,
}
