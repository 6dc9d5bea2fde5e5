//! Public wishlist API endpoints.

use axum::extract::{Path, State};
use serde::Deserialize;

use super::{success, ApiJson, ApiQuery, ApiResult};
use crate::models::{PublicTicket, SubmitTicketRequest, TicketOptions};
use crate::AppState;

/// Query parameters for the public wall of recent tickets.
#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

/// GET /api/wishlist - Latest tickets, without contact details.
pub async fn list_recent_tickets(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RecentQuery>,
) -> ApiResult<Vec<PublicTicket>> {
    let limit = params
        .limit
        .unwrap_or(state.config.default_page_size)
        .clamp(1, state.config.max_page_size);

    success(state.tickets.list_recent(limit).await?)
}

/// POST /api/wishlist - Submit a new ticket.
pub async fn submit_ticket(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SubmitTicketRequest>,
) -> ApiResult<PublicTicket> {
    let ticket = state.tickets.submit(&request).await?;
    success(ticket.into())
}

/// GET /api/wishlist/{id} - A single ticket, without contact details.
pub async fn get_public_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PublicTicket> {
    success(state.tickets.get_public(&id).await?)
}

/// GET /api/wishlist/options - Display labels for every ticket enum.
pub async fn ticket_options() -> ApiResult<TicketOptions> {
    success(TicketOptions::table())
}
