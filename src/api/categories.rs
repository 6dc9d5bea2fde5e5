//! Category API endpoints.

use axum::extract::State;

use super::{success, ApiQuery, ApiResult};
use crate::models::{Category, CategoryQuery};
use crate::AppState;

/// GET /api/categories - List categories, optionally for one content kind.
pub async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<CategoryQuery>,
) -> ApiResult<Vec<Category>> {
    success(state.repo.list_categories(params.kind).await?)
}
