//! Admin post API endpoints: the editor and its draft workflow.

use axum::extract::{Path, State};

use super::{success, ApiJson, ApiQuery, ApiResult};
use crate::models::{
    AdminPostRow, CreatePostRequest, EditorView, Page, PageQuery, Pagination, Post, PostDraft,
    PostFields, SetPostStatusRequest,
};
use crate::AppState;

/// GET /api/admin/posts - Every post with its pending-edit flag.
pub async fn list_all_posts(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PageQuery>,
) -> ApiResult<Page<AdminPostRow>> {
    let pagination = Pagination::resolve(&params, &state.config);
    success(state.drafts.list_all(pagination).await?)
}

/// POST /api/admin/posts - Create a new post.
pub async fn create_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePostRequest>,
) -> ApiResult<Post> {
    success(state.drafts.create_new(&request).await?)
}

/// GET /api/admin/posts/{id} - Load a post into the editor.
pub async fn load_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<EditorView> {
    success(state.drafts.load(&id).await?)
}

/// DELETE /api/admin/posts/{id} - Delete a post and its draft.
pub async fn delete_post(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.drafts.delete(&id).await?;
    success(())
}

/// PUT /api/admin/posts/{id}/draft - Save unpublished edits.
pub async fn save_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(fields): ApiJson<PostFields>,
) -> ApiResult<PostDraft> {
    success(state.drafts.save_draft(&id, &fields).await?)
}

/// DELETE /api/admin/posts/{id}/draft - Throw away unpublished edits.
pub async fn discard_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<bool> {
    success(state.drafts.discard_draft(&id).await?)
}

/// POST /api/admin/posts/{id}/publish - Publish the submitted fields.
pub async fn publish_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(fields): ApiJson<PostFields>,
) -> ApiResult<Post> {
    success(state.drafts.publish(&id, &fields).await?)
}

/// PUT /api/admin/posts/{id}/status - Publish or unpublish without editing.
pub async fn set_post_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<SetPostStatusRequest>,
) -> ApiResult<Post> {
    success(state.drafts.set_status(&id, request.status).await?)
}
