//! Post model: published articles and videos plus their draft shadows.

use serde::{Deserialize, Serialize};

/// Content kind; a category belongs to exactly one kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    #[default]
    Article,
    Video,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Article => "article",
            PostKind::Video => "video",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "article" => Some(PostKind::Article),
            "video" => Some(PostKind::Video),
            _ => None,
        }
    }
}

/// Publication status of the canonical record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

/// The editable field set shared by a post and its draft shadow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostFields {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: PostKind,
    /// Embed URL; only meaningful for videos
    #[serde(default)]
    pub video_url: Option<String>,
    /// Link to the original channel post; only meaningful for videos
    #[serde(default)]
    pub external_link: Option<String>,
}

impl PostFields {
    /// Trim text and turn blank optional values into `None`.
    pub fn normalized(&self) -> Self {
        fn opt(v: &Option<String>) -> Option<String> {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }

        Self {
            title: self.title.trim().to_string(),
            slug: self.slug.trim().to_string(),
            excerpt: opt(&self.excerpt),
            // Body text keeps its markdown whitespace; only blank bodies collapse.
            content: self
                .content
                .clone()
                .filter(|c| !c.trim().is_empty()),
            cover_image: opt(&self.cover_image),
            category_id: opt(&self.category_id),
            kind: self.kind,
            video_url: opt(&self.video_url),
            external_link: opt(&self.external_link),
        }
    }
}

/// A canonical, publicly visible post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(flatten)]
    pub fields: PostFields,
    pub status: PostStatus,
    pub view_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Unpublished edits shadowing exactly one post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    pub id: String,
    pub post_id: String,
    #[serde(flatten)]
    pub fields: PostFields,
    pub updated_at: String,
}

/// Editing state of a post as seen by the admin editor.
///
/// Collapses the post status and the presence of a draft shadow into one value.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum EditorState {
    Published {
        fields: PostFields,
    },
    Draft {
        fields: PostFields,
    },
    PendingEdit {
        status: PostStatus,
        current: PostFields,
        pending: PostFields,
        pending_updated_at: String,
    },
}

impl EditorState {
    pub fn from_parts(post: &Post, draft: Option<&PostDraft>) -> Self {
        match (draft, post.status) {
            (Some(draft), status) => EditorState::PendingEdit {
                status,
                current: post.fields.clone(),
                pending: draft.fields.clone(),
                pending_updated_at: draft.updated_at.clone(),
            },
            (None, PostStatus::Published) => EditorState::Published {
                fields: post.fields.clone(),
            },
            (None, PostStatus::Draft) => EditorState::Draft {
                fields: post.fields.clone(),
            },
        }
    }

    /// Fields the editor form should show: the pending edit when one exists.
    pub fn editable(&self) -> &PostFields {
        match self {
            EditorState::Published { fields } | EditorState::Draft { fields } => fields,
            EditorState::PendingEdit { pending, .. } => pending,
        }
    }

    pub fn has_pending_edit(&self) -> bool {
        matches!(self, EditorState::PendingEdit { .. })
    }
}

/// Result of loading a post into the admin editor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub post: Post,
    pub editable: PostFields,
    pub state: EditorState,
}

/// Row of the admin post table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminPostRow {
    #[serde(flatten)]
    pub post: Post,
    pub has_pending_edit: bool,
}

/// Minimal reference used for previous/next navigation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostLink {
    pub id: String,
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjacentPosts {
    pub prev: Option<PostLink>,
    pub next: Option<PostLink>,
}

/// Published totals per content kind.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCounts {
    pub articles: i64,
    pub videos: i64,
}

/// Conjunctive filter over the posts table.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub status: Option<PostStatus>,
    pub kind: Option<PostKind>,
    pub category_id: Option<String>,
    /// Case-insensitive substring matched against title, excerpt and content
    pub text: Option<String>,
}

/// Request body for creating a new post.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(flatten)]
    pub fields: PostFields,
    #[serde(default)]
    pub status: PostStatus,
}

/// Request body for directly toggling a post's status.
#[derive(Debug, Clone, Deserialize)]
pub struct SetPostStatusRequest {
    pub status: PostStatus,
}
