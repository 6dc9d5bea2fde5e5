//! Public post API endpoints. Only published posts are visible here.

use axum::extract::{Path, State};
use serde::Deserialize;

use super::{success, ApiQuery, ApiResult};
use crate::errors::AppError;
use crate::models::{
    AdjacentPosts, Page, PageQuery, Pagination, Post, PostCounts, PostKind, PostQuery, PostStatus,
};
use crate::AppState;

/// Query parameters for the public post listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListQuery {
    #[serde(default, alias = "type")]
    pub kind: Option<PostKind>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// GET /api/posts - List published posts, newest first.
pub async fn list_published_posts(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<PostListQuery>,
) -> ApiResult<Page<Post>> {
    let pagination = Pagination::resolve(
        &PageQuery {
            page: params.page,
            page_size: params.page_size,
        },
        &state.config,
    );
    let query = PostQuery {
        status: Some(PostStatus::Published),
        kind: params.kind,
        category_id: params.category_id.filter(|c| !c.trim().is_empty()),
        text: None,
    };

    let (posts, total) = state
        .repo
        .list_posts(&query, pagination.limit(), pagination.offset())
        .await?;
    success(Page::new(posts, total, pagination))
}

/// GET /api/posts/counts - Published totals per kind.
pub async fn published_counts(State(state): State<AppState>) -> ApiResult<PostCounts> {
    success(state.repo.count_published().await?)
}

/// GET /api/posts/{idOrSlug} - Render a published post and count the view.
pub async fn get_published_post(
    State(state): State<AppState>,
    Path(id_or_slug): Path<String>,
) -> ApiResult<Post> {
    let mut post = state
        .repo
        .get_published_post(&id_or_slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id_or_slug)))?;

    // A failed counter update should not hide the post.
    match state.repo.increment_view_count(&post.id).await {
        Ok(()) => post.view_count += 1,
        Err(e) => tracing::warn!("Failed to count view for post {}: {}", post.id, e),
    }

    success(post)
}

/// GET /api/posts/{id}/adjacent - Older and newer published posts of the same kind.
pub async fn adjacent_posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<AdjacentPosts> {
    let post = state
        .repo
        .get_published_post(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

    let (prev, next) = state.repo.adjacent_posts(&post).await?;
    success(AdjacentPosts { prev, next })
}
