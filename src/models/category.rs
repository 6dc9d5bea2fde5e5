//! Category model. Categories are maintained outside the admin workflows.

use serde::{Deserialize, Serialize};

use super::PostKind;

/// A content category; each belongs to exactly one content kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub kind: PostKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub sort_order: i64,
    pub created_at: String,
}

/// Query parameters for listing categories.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: Option<PostKind>,
}
