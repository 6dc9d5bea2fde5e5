//! Draft reconciliation for posts.
//!
//! A post may carry one draft shadow holding unpublished edits. Saving
//! overwrites the shadow, publishing promotes the submitted fields into the
//! post and drops the shadow. The public side never reads shadows.

use tracing::{info, warn};
use validator::ValidateUrl;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{
    AdminPostRow, CreatePostRequest, EditorState, EditorView, Page, Pagination, Post, PostDraft,
    PostFields, PostKind, PostQuery, PostStatus,
};

/// Admin-side editing workflow for posts.
#[derive(Clone)]
pub struct DraftWorkflow {
    repo: Repository,
}

impl DraftWorkflow {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Load a post into the editor. Shadow fields win when a shadow exists.
    pub async fn load(&self, id: &str) -> Result<EditorView, AppError> {
        let post = self.require_post(id).await?;
        let draft = self.repo.get_draft(id).await?;

        let state = EditorState::from_parts(&post, draft.as_ref());
        let editable = state.editable().clone();

        Ok(EditorView {
            post,
            editable,
            state,
        })
    }

    /// Create or overwrite the draft shadow. The post itself is untouched.
    pub async fn save_draft(&self, id: &str, fields: &PostFields) -> Result<PostDraft, AppError> {
        self.require_post(id).await?;

        let draft = self.repo.upsert_draft(id, &fields.normalized()).await?;
        info!("Saved draft for post {}", id);
        Ok(draft)
    }

    /// Promote the submitted fields into the post and mark it published.
    ///
    /// The shadow delete runs after the post update as a separate statement.
    /// If it fails the published post stands and the orphaned shadow is
    /// overwritten by the next save.
    pub async fn publish(&self, id: &str, fields: &PostFields) -> Result<Post, AppError> {
        let fields = fields.normalized();
        validate_post_fields(&fields)?;

        let post = self
            .repo
            .update_post(id, &fields, PostStatus::Published)
            .await?;
        info!("Published post {}", id);

        if let Err(e) = self.repo.delete_draft(id).await {
            warn!("Failed to clear draft for post {} after publish: {}", id, e);
        }

        Ok(post)
    }

    /// Insert a new post with the requested status and no shadow.
    pub async fn create_new(&self, req: &CreatePostRequest) -> Result<Post, AppError> {
        let fields = req.fields.normalized();
        validate_post_fields(&fields)?;

        let post = self.repo.insert_post(&fields, req.status).await?;
        info!("Created post {} ({})", post.id, post.status.as_str());
        Ok(post)
    }

    /// Drop the shadow without touching the post. Returns whether one existed.
    pub async fn discard_draft(&self, id: &str) -> Result<bool, AppError> {
        self.require_post(id).await?;

        let removed = self.repo.delete_draft(id).await?;
        if removed {
            info!("Discarded draft for post {}", id);
        }
        Ok(removed)
    }

    /// Every post regardless of status, flagged when a shadow is pending.
    pub async fn list_all(&self, pagination: Pagination) -> Result<Page<AdminPostRow>, AppError> {
        let (posts, total) = self
            .repo
            .list_posts(&PostQuery::default(), pagination.limit(), pagination.offset())
            .await?;
        let pending = self.repo.posts_with_drafts().await?;

        let rows = posts
            .into_iter()
            .map(|post| {
                let has_pending_edit = pending.contains(&post.id);
                AdminPostRow {
                    post,
                    has_pending_edit,
                }
            })
            .collect();

        Ok(Page::new(rows, total, pagination))
    }

    /// Toggle publication directly, leaving any shadow in place.
    pub async fn set_status(&self, id: &str, status: PostStatus) -> Result<Post, AppError> {
        let post = self.repo.set_post_status(id, status).await?;
        info!("Set post {} status to {}", id, status.as_str());
        Ok(post)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.repo.delete_post(id).await?;
        info!("Deleted post {}", id);
        Ok(())
    }

    async fn require_post(&self, id: &str) -> Result<Post, AppError> {
        self.repo
            .get_post(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))
    }
}

/// Required-field and URL checks applied before a post is written.
///
/// Expects normalized fields: blank optionals are already `None`.
pub fn validate_post_fields(fields: &PostFields) -> Result<(), AppError> {
    if fields.title.is_empty() {
        return Err(AppError::invalid("title", "请输入标题"));
    }
    if fields.slug.is_empty() {
        return Err(AppError::invalid("slug", "请输入链接标识"));
    }
    if fields.category_id.is_none() {
        return Err(AppError::invalid("categoryId", "请选择分类"));
    }
    if fields.cover_image.is_none() {
        return Err(AppError::invalid("coverImage", "请输入封面图片 URL"));
    }
    if fields.excerpt.is_none() {
        return Err(AppError::invalid("excerpt", "请输入摘要"));
    }
    if fields.content.is_none() {
        let message = match fields.kind {
            PostKind::Video => "请输入视频描述",
            PostKind::Article => "请输入文章内容",
        };
        return Err(AppError::invalid("content", message));
    }

    let urls = [
        ("coverImage", &fields.cover_image, "封面图片 URL 格式不正确"),
        ("videoUrl", &fields.video_url, "视频嵌入链接格式不正确"),
        ("externalLink", &fields.external_link, "视频号链接格式不正确"),
    ];
    for (field, value, message) in urls {
        if let Some(url) = value {
            if !url.validate_url() {
                return Err(AppError::invalid(field, message));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn workflow() -> (DraftWorkflow, Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .unwrap();
        let repo = Repository::new(pool);
        (DraftWorkflow::new(repo.clone()), repo, temp_dir)
    }

    fn fields(title: &str) -> PostFields {
        PostFields {
            title: title.to_string(),
            slug: "test".to_string(),
            excerpt: Some("e".to_string()),
            content: Some("c".to_string()),
            cover_image: Some("https://x.com/a.jpg".to_string()),
            category_id: Some("c1".to_string()),
            kind: PostKind::Article,
            video_url: None,
            external_link: None,
        }
    }

    fn create(title: &str, status: PostStatus) -> CreatePostRequest {
        CreatePostRequest {
            fields: fields(title),
            status,
        }
    }

    #[tokio::test]
    async fn test_save_draft_twice_keeps_one_shadow() {
        let (drafts, repo, _dir) = workflow().await;
        let post = drafts.create_new(&create("测试", PostStatus::Published)).await.unwrap();

        let first = drafts.save_draft(&post.id, &fields("改")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = drafts.save_draft(&post.id, &fields("改")).await.unwrap();

        assert_eq!(repo.count_drafts(&post.id).await.unwrap(), 1);
        assert_eq!(first.id, second.id);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.fields, fields("改"));

        let stored = repo.get_post(&post.id).await.unwrap().unwrap();
        assert_eq!(stored.fields.title, "测试");
        assert_eq!(stored.status, PostStatus::Published);
    }

    #[tokio::test]
    async fn test_load_prefers_shadow_fields() {
        let (drafts, _repo, _dir) = workflow().await;
        let post = drafts.create_new(&create("测试", PostStatus::Published)).await.unwrap();

        let view = drafts.load(&post.id).await.unwrap();
        assert!(matches!(view.state, EditorState::Published { .. }));
        assert_eq!(view.editable.title, "测试");

        drafts.save_draft(&post.id, &fields("测试2")).await.unwrap();
        let view = drafts.load(&post.id).await.unwrap();
        assert!(view.state.has_pending_edit());
        assert_eq!(view.editable.title, "测试2");
        assert_eq!(view.post.fields.title, "测试");
    }

    #[tokio::test]
    async fn test_create_save_publish_scenario() {
        let (drafts, repo, _dir) = workflow().await;

        let post = drafts.create_new(&create("测试", PostStatus::Draft)).await.unwrap();
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(repo.count_drafts(&post.id).await.unwrap(), 0);

        drafts.save_draft(&post.id, &fields("测试2")).await.unwrap();
        let published = drafts.publish(&post.id, &fields("测试2")).await.unwrap();
        assert_eq!(published.status, PostStatus::Published);

        let view = drafts.load(&post.id).await.unwrap();
        assert_eq!(view.editable.title, "测试2");
        assert_eq!(view.post.status, PostStatus::Published);
        assert!(matches!(view.state, EditorState::Published { .. }));
        assert_eq!(repo.count_drafts(&post.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_publish_without_shadow_succeeds() {
        let (drafts, _repo, _dir) = workflow().await;
        let post = drafts.create_new(&create("测试", PostStatus::Draft)).await.unwrap();

        let published = drafts.publish(&post.id, &fields("新")).await.unwrap();
        assert_eq!(published.fields.title, "新");
        assert_eq!(published.status, PostStatus::Published);
    }

    #[tokio::test]
    async fn test_publish_stands_when_shadow_delete_fails() {
        let (drafts, repo, _dir) = workflow().await;
        let post = drafts.create_new(&create("a", PostStatus::Draft)).await.unwrap();
        drafts.save_draft(&post.id, &fields("b")).await.unwrap();

        sqlx::query(
            "CREATE TRIGGER block_draft_delete BEFORE DELETE ON post_drafts BEGIN SELECT RAISE(FAIL, 'draft delete blocked'); END",
        )
        .execute(repo.pool())
        .await
        .unwrap();

        let published = drafts.publish(&post.id, &fields("b")).await.unwrap();
        assert_eq!(published.status, PostStatus::Published);
        assert_eq!(published.fields.title, "b");

        // The orphaned shadow is left behind and still shows as a pending edit.
        assert_eq!(repo.count_drafts(&post.id).await.unwrap(), 1);
        let view = drafts.load(&post.id).await.unwrap();
        assert!(view.state.has_pending_edit());
        assert_eq!(view.post.status, PostStatus::Published);
    }

    #[tokio::test]
    async fn test_missing_post_is_not_found() {
        let (drafts, _repo, _dir) = workflow().await;

        assert!(matches!(drafts.load("nope").await, Err(AppError::NotFound(_))));
        assert!(matches!(
            drafts.save_draft("nope", &fields("x")).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            drafts.publish("nope", &fields("x")).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_and_malformed_fields() {
        let (drafts, repo, _dir) = workflow().await;

        let mut req = create("  ", PostStatus::Draft);
        let err = drafts.create_new(&req).await.unwrap_err();
        assert_eq!(err.field(), Some("title"));

        req.fields.title = "ok".to_string();
        req.fields.kind = PostKind::Video;
        req.fields.content = Some("   ".to_string());
        let err = drafts.create_new(&req).await.unwrap_err();
        assert_eq!(err.field(), Some("content"));
        assert_eq!(err.message(), "请输入视频描述");

        req.fields.content = Some("c".to_string());
        req.fields.cover_image = Some("not a url".to_string());
        let err = drafts.create_new(&req).await.unwrap_err();
        assert_eq!(err.field(), Some("coverImage"));

        req.fields.cover_image = Some("https://x.com/a.jpg".to_string());
        req.fields.video_url = Some("player/123".to_string());
        let err = drafts.create_new(&req).await.unwrap_err();
        assert_eq!(err.field(), Some("videoUrl"));

        let (posts, total) = repo.list_posts(&PostQuery::default(), 10, 0).await.unwrap();
        assert!(posts.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_discard_and_list_flags_pending_edits() {
        let (drafts, _repo, _dir) = workflow().await;
        let a = drafts.create_new(&create("A", PostStatus::Published)).await.unwrap();
        let mut other = create("B", PostStatus::Draft);
        other.fields.slug = "b".to_string();
        let b = drafts.create_new(&other).await.unwrap();

        drafts.save_draft(&a.id, &fields("A2")).await.unwrap();
        let page = drafts.list_all(Pagination::new(1, 10)).await.unwrap();
        assert_eq!(page.total, 2);
        let flag = |id: &str| page.items.iter().find(|r| r.post.id == id).unwrap().has_pending_edit;
        assert!(flag(&a.id));
        assert!(!flag(&b.id));

        assert!(drafts.discard_draft(&a.id).await.unwrap());
        assert!(!drafts.discard_draft(&a.id).await.unwrap());
        let view = drafts.load(&a.id).await.unwrap();
        assert_eq!(view.editable.title, "A");
    }

    // Concurrent saves race; whichever statement lands last is kept.
    #[tokio::test]
    async fn test_concurrent_saves_are_last_write_wins() {
        let (drafts, repo, _dir) = workflow().await;
        let post = drafts.create_new(&create("测试", PostStatus::Published)).await.unwrap();

        let (left_fields, right_fields) = (fields("left"), fields("right"));
        let (left, right) = tokio::join!(
            drafts.save_draft(&post.id, &left_fields),
            drafts.save_draft(&post.id, &right_fields),
        );
        left.unwrap();
        right.unwrap();

        assert_eq!(repo.count_drafts(&post.id).await.unwrap(), 1);
        let title = drafts.load(&post.id).await.unwrap().editable.title;
        assert!(title == "left" || title == "right");
    }

    #[test]
    fn test_validate_accepts_complete_video() {
        let mut f = fields("视频");
        f.kind = PostKind::Video;
        f.video_url = Some("https://player.example.com/embed/1".to_string());
        f.external_link = Some("https://channels.example.com/post/1".to_string());
        assert!(validate_post_fields(&f).is_ok());
    }
}
