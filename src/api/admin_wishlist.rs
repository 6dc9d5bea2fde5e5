//! Admin wishlist API endpoints: ticket desk, notes and batch actions.

use axum::extract::{Path, State};
use serde::Deserialize;

use super::{success, ApiJson, ApiQuery, ApiResult};
use crate::models::{
    AddNoteRequest, BatchDeleteRequest, BatchResult, BatchStatusRequest, PageQuery, Pagination,
    ReplyRequest, SetTicketPriorityRequest, SetTicketStatusRequest, Ticket, TicketCategory,
    TicketDetail, TicketFilter, TicketListing, TicketNote, TicketPriority, TicketStatus,
};
use crate::AppState;

/// Query parameters for the admin ticket table.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListQuery {
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    #[serde(default)]
    pub category: Option<TicketCategory>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// GET /api/admin/wishlist - Filtered page plus unfiltered stats.
pub async fn list_tickets(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<TicketListQuery>,
) -> ApiResult<TicketListing> {
    let pagination = Pagination::resolve(
        &PageQuery {
            page: params.page,
            page_size: params.page_size,
        },
        &state.config,
    );
    let filter = TicketFilter {
        status: params.status,
        priority: params.priority,
        category: params.category,
        q: params.q,
    };

    success(state.tickets.list(&filter, pagination).await?)
}

/// GET /api/admin/wishlist/{id} - A ticket with its notes.
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TicketDetail> {
    success(state.tickets.get(&id).await?)
}

/// DELETE /api/admin/wishlist/{id}
pub async fn delete_ticket(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.tickets.delete(&id).await?;
    success(())
}

/// PUT /api/admin/wishlist/{id}/status
pub async fn set_ticket_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<SetTicketStatusRequest>,
) -> ApiResult<Ticket> {
    success(state.tickets.set_status(&id, request.status).await?)
}

/// PUT /api/admin/wishlist/{id}/priority
pub async fn set_ticket_priority(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<SetTicketPriorityRequest>,
) -> ApiResult<Ticket> {
    success(state.tickets.set_priority(&id, request.priority).await?)
}

/// POST /api/admin/wishlist/{id}/reply - Reply and complete the ticket.
pub async fn reply_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<ReplyRequest>,
) -> ApiResult<Ticket> {
    success(state.tickets.reply(&id, &request.reply).await?)
}

/// GET /api/admin/wishlist/{id}/notes - Notes, newest first.
pub async fn list_ticket_notes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<TicketNote>> {
    success(state.tickets.list_notes(&id).await?)
}

/// POST /api/admin/wishlist/{id}/notes
pub async fn add_ticket_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<AddNoteRequest>,
) -> ApiResult<TicketNote> {
    success(state.tickets.add_note(&id, &request.content).await?)
}

/// DELETE /api/admin/wishlist/notes/{noteId}
pub async fn delete_ticket_note(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
) -> ApiResult<()> {
    state.tickets.delete_note(&note_id).await?;
    success(())
}

/// PUT /api/admin/wishlist/batch/status
pub async fn batch_set_ticket_status(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BatchStatusRequest>,
) -> ApiResult<BatchResult> {
    success(
        state
            .tickets
            .batch_set_status(&request.ids, request.status)
            .await?,
    )
}

/// POST /api/admin/wishlist/batch/delete
pub async fn batch_delete_tickets(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BatchDeleteRequest>,
) -> ApiResult<BatchResult> {
    success(state.tickets.batch_delete(&request.ids).await?)
}
