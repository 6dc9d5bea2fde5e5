//! Search API endpoints.

use axum::extract::State;
use serde::Deserialize;

use super::{success, ApiQuery, ApiResult};
use crate::models::{Page, PageQuery, Pagination, Post, PostQuery, PostStatus};
use crate::AppState;

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// GET /api/search - Substring search over published titles, excerpts and bodies.
///
/// A blank query yields an empty page rather than every post.
pub async fn search_posts(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> ApiResult<Page<Post>> {
    let pagination = Pagination::resolve(
        &PageQuery {
            page: params.page,
            page_size: params.page_size,
        },
        &state.config,
    );

    let Some(text) = params
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
    else {
        return success(Page::empty(pagination));
    };

    let query = PostQuery {
        status: Some(PostStatus::Published),
        text: Some(text),
        ..PostQuery::default()
    };
    let (posts, total) = state
        .repo
        .list_posts(&query, pagination.limit(), pagination.offset())
        .await?;

    success(Page::new(posts, total, pagination))
}
