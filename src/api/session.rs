//! Admin session and dashboard endpoints.

use axum::{extract::State, Extension};
use serde::Serialize;

use super::{success, ApiResult};
use crate::auth;
use crate::models::{AdminIdentity, PostCounts};
use crate::AppState;

/// Figures shown on the admin landing page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub published: PostCounts,
    pub pending_edits: usize,
    /// Tickets still pending or processing
    pub open_tickets: i64,
}

/// GET /api/admin/session - The signed-in admin.
pub async fn current_session(
    Extension(identity): Extension<AdminIdentity>,
) -> ApiResult<AdminIdentity> {
    success(identity)
}

/// POST /api/admin/logout - Sign the current session out.
pub async fn logout(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
) -> ApiResult<bool> {
    success(auth::sign_out(&state.repo, &identity).await?)
}

/// GET /api/admin/dashboard
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    let published = state.repo.count_published().await?;
    let pending_edits = state.repo.posts_with_drafts().await?.len();
    let open_tickets = state.tickets.open_count().await?;

    success(DashboardSummary {
        published,
        pending_edits,
        open_tickets,
    })
}
