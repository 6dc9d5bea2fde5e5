//! Session-based admin guard.
//!
//! Every admin route runs behind [`admin_guard`], which resolves the caller's
//! session token and requires the admin role before any handler runs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{AdminIdentity, ROLE_ADMIN};

/// Header carrying a session token when no bearer token is sent.
pub const SESSION_HEADER: &str = "x-session-token";

/// User id granted the bootstrap admin session.
pub const BOOTSTRAP_ADMIN_USER: &str = "admin";

/// Read the session token from `Authorization: Bearer` or `x-session-token`.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "));

    bearer
        .or_else(|| headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Resolve a token to an admin identity.
///
/// A live session whose user lacks the admin role is signed out.
pub async fn resolve_admin(repo: &Repository, token: &str) -> Result<AdminIdentity, AppError> {
    let session = repo
        .get_session(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not signed in".to_string()))?;

    match repo.user_role(&session.user_id).await? {
        Some(role) if role == ROLE_ADMIN => Ok(AdminIdentity {
            user_id: session.user_id,
            role,
            expires_at: session.expires_at,
            token: session.token,
        }),
        _ => {
            repo.delete_session(token).await?;
            tracing::warn!("Signed out non-admin user {}", session.user_id);
            Err(AppError::Unauthorized("Admin role required".to_string()))
        }
    }
}

/// Middleware guarding the admin router.
pub async fn admin_guard(
    State(repo): State<Arc<Repository>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers()) else {
        return AppError::Unauthorized("Missing session token".to_string()).into_response();
    };

    match resolve_admin(&repo, &token).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Sign a session out. Returns whether it was live.
pub async fn sign_out(repo: &Repository, identity: &AdminIdentity) -> Result<bool, AppError> {
    let removed = repo.delete_session(&identity.token).await?;
    tracing::info!("Signed out admin {}", identity.user_id);
    Ok(removed)
}

/// Make sure the built-in admin user can sign in with the configured token.
pub async fn ensure_bootstrap_admin(repo: &Repository, token: &str) -> Result<(), AppError> {
    repo.set_user_role(BOOTSTRAP_ADMIN_USER, ROLE_ADMIN).await?;
    repo.upsert_session(token, BOOTSTRAP_ADMIN_USER, None).await?;
    tracing::info!("Bootstrap admin session ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use axum::http::HeaderValue;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .unwrap();
        (Repository::new(pool), temp_dir)
    }

    #[test]
    fn test_extract_token_prefers_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("from-header"));
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn test_extract_token_ignores_blank_and_other_schemes() {
        let mut headers = HeaderMap::new();
        assert!(extract_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_token(&headers).is_none());

        headers.insert(SESSION_HEADER, HeaderValue::from_static("  "));
        assert!(extract_token(&headers).is_none());
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let (repo, _dir) = repo().await;
        let err = resolve_admin(&repo, "nope").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_identity_carries_session_expiry() {
        let (repo, _dir) = repo().await;
        repo.set_user_role("u1", ROLE_ADMIN).await.unwrap();
        repo.upsert_session("t1", "u1", Some("2999-01-01T00:00:00.000000Z"))
            .await
            .unwrap();

        let identity = resolve_admin(&repo, "t1").await.unwrap();
        assert_eq!(identity.expires_at.as_deref(), Some("2999-01-01T00:00:00.000000Z"));
    }

    #[tokio::test]
    async fn test_non_admin_session_is_signed_out() {
        let (repo, _dir) = repo().await;
        repo.set_user_role("u1", "editor").await.unwrap();
        repo.upsert_session("t1", "u1", None).await.unwrap();

        assert!(resolve_admin(&repo, "t1").await.is_err());
        assert!(repo.get_session("t1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_admin_resolves() {
        let (repo, _dir) = repo().await;
        ensure_bootstrap_admin(&repo, "secret").await.unwrap();
        // Idempotent across restarts.
        ensure_bootstrap_admin(&repo, "secret").await.unwrap();

        let identity = resolve_admin(&repo, "secret").await.unwrap();
        assert_eq!(identity.user_id, BOOTSTRAP_ADMIN_USER);
        assert_eq!(identity.role, ROLE_ADMIN);
        assert!(identity.expires_at.is_none());

        assert!(sign_out(&repo, &identity).await.unwrap());
        assert!(resolve_admin(&repo, "secret").await.is_err());
    }
}
