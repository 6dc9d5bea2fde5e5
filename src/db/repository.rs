//! Database repository for CRUD operations.
//!
//! Every mutation is a single statement; the workflows above rely on
//! statement-level atomicity only.

use std::collections::HashSet;

use chrono::{SecondsFormat, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Category, NewTicket, Post, PostCounts, PostDraft, PostFields, PostKind, PostLink, PostQuery,
    PostStatus, Session, Ticket, TicketCategory, TicketFilter, TicketNote, TicketPriority,
    TicketStats, TicketStatus,
};

const POST_COLUMNS: &str = "id, title, slug, excerpt, content, cover_image, category_id, type, \
     video_url, external_link, status, view_count, created_at, updated_at";

const DRAFT_COLUMNS: &str = "id, post_id, title, slug, excerpt, content, cover_image, category_id, \
     type, video_url, external_link, updated_at";

const TICKET_COLUMNS: &str = "id, title, content, category, status, priority, contact_name, \
     contact_phone, contact_email, admin_reply, replied_at, created_at";

/// Current time as a fixed-width RFC 3339 string, so text order is time order.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== CATEGORY OPERATIONS ====================

    /// List categories in display order, optionally for one content kind.
    pub async fn list_categories(&self, kind: Option<PostKind>) -> Result<Vec<Category>, AppError> {
        let rows = match kind {
            Some(kind) => {
                sqlx::query(
                    "SELECT id, name, slug, type, icon, sort_order, created_at FROM categories WHERE type = ? ORDER BY sort_order, name",
                )
                .bind(kind.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT id, name, slug, type, icon, sort_order, created_at FROM categories ORDER BY sort_order, name",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.iter().map(category_from_row).collect())
    }

    // ==================== POST OPERATIONS ====================

    /// List posts matching a filter, newest first, with the total match count.
    pub async fn list_posts(
        &self,
        query: &PostQuery,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Post>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts");
        push_post_filter(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        qb.push(POST_COLUMNS).push(" FROM posts");
        push_post_filter(&mut qb, query);
        qb.push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok((rows.iter().map(post_from_row).collect(), total))
    }

    /// Get a post by ID.
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(post_from_row))
    }

    /// Get a published post by ID or slug. An ID match wins over a slug match.
    pub async fn get_published_post(&self, id_or_slug: &str) -> Result<Option<Post>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE (id = ? OR slug = ?) AND status = 'published' \
             ORDER BY CASE WHEN id = ? THEN 0 ELSE 1 END LIMIT 1",
            POST_COLUMNS
        ))
        .bind(id_or_slug)
        .bind(id_or_slug)
        .bind(id_or_slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(post_from_row))
    }

    /// Insert a new post.
    pub async fn insert_post(
        &self,
        fields: &PostFields,
        status: PostStatus,
    ) -> Result<Post, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query(
            r#"INSERT INTO posts (
                id, title, slug, excerpt, content, cover_image, category_id, type,
                video_url, external_link, status, view_count, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)"#,
        )
        .bind(&id)
        .bind(&fields.title)
        .bind(&fields.slug)
        .bind(&fields.excerpt)
        .bind(&fields.content)
        .bind(&fields.cover_image)
        .bind(&fields.category_id)
        .bind(fields.kind.as_str())
        .bind(&fields.video_url)
        .bind(&fields.external_link)
        .bind(status.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Post {
            id,
            fields: fields.clone(),
            status,
            view_count: 0,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Overwrite a post's editable fields and status in one statement.
    pub async fn update_post(
        &self,
        id: &str,
        fields: &PostFields,
        status: PostStatus,
    ) -> Result<Post, AppError> {
        let row = sqlx::query(&format!(
            r#"UPDATE posts SET
                title = ?, slug = ?, excerpt = ?, content = ?, cover_image = ?, category_id = ?,
                type = ?, video_url = ?, external_link = ?, status = ?, updated_at = ?
            WHERE id = ?
            RETURNING {}"#,
            POST_COLUMNS
        ))
        .bind(&fields.title)
        .bind(&fields.slug)
        .bind(&fields.excerpt)
        .bind(&fields.content)
        .bind(&fields.cover_image)
        .bind(&fields.category_id)
        .bind(fields.kind.as_str())
        .bind(&fields.video_url)
        .bind(&fields.external_link)
        .bind(status.as_str())
        .bind(timestamp())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(post_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))
    }

    /// Set only the status of a post.
    pub async fn set_post_status(&self, id: &str, status: PostStatus) -> Result<Post, AppError> {
        let row = sqlx::query(&format!(
            "UPDATE posts SET status = ?, updated_at = ? WHERE id = ? RETURNING {}",
            POST_COLUMNS
        ))
        .bind(status.as_str())
        .bind(timestamp())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(post_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))
    }

    /// Count one view. Not deduplicated: concurrent renders may each count.
    pub async fn increment_view_count(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a post. Its draft shadow goes with it by cascade.
    pub async fn delete_post(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Post {} not found", id)));
        }

        Ok(())
    }

    /// Older and newer published neighbours of the same kind.
    pub async fn adjacent_posts(
        &self,
        post: &Post,
    ) -> Result<(Option<PostLink>, Option<PostLink>), AppError> {
        let prev = sqlx::query(
            "SELECT id, slug, title FROM posts WHERE type = ? AND status = 'published' AND created_at < ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(post.fields.kind.as_str())
        .bind(&post.created_at)
        .fetch_optional(&self.pool)
        .await?;

        let next = sqlx::query(
            "SELECT id, slug, title FROM posts WHERE type = ? AND status = 'published' AND created_at > ? ORDER BY created_at ASC LIMIT 1",
        )
        .bind(post.fields.kind.as_str())
        .bind(&post.created_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok((
            prev.as_ref().map(link_from_row),
            next.as_ref().map(link_from_row),
        ))
    }

    /// Published totals per kind.
    pub async fn count_published(&self) -> Result<PostCounts, AppError> {
        let row = sqlx::query(
            r#"SELECT
                COUNT(CASE WHEN type = 'article' THEN 1 END) AS articles,
                COUNT(CASE WHEN type = 'video' THEN 1 END) AS videos
            FROM posts WHERE status = 'published'"#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(PostCounts {
            articles: row.get("articles"),
            videos: row.get("videos"),
        })
    }

    // ==================== DRAFT OPERATIONS ====================

    /// Get the draft shadow of a post, if any.
    pub async fn get_draft(&self, post_id: &str) -> Result<Option<PostDraft>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM post_drafts WHERE post_id = ?",
            DRAFT_COLUMNS
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(draft_from_row))
    }

    /// Create or wholesale overwrite the draft shadow keyed on `post_id`.
    pub async fn upsert_draft(
        &self,
        post_id: &str,
        fields: &PostFields,
    ) -> Result<PostDraft, AppError> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO post_drafts (
                id, post_id, title, slug, excerpt, content, cover_image, category_id, type,
                video_url, external_link, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(post_id) DO UPDATE SET
                title = excluded.title,
                slug = excluded.slug,
                excerpt = excluded.excerpt,
                content = excluded.content,
                cover_image = excluded.cover_image,
                category_id = excluded.category_id,
                type = excluded.type,
                video_url = excluded.video_url,
                external_link = excluded.external_link,
                updated_at = excluded.updated_at
            RETURNING {}"#,
            DRAFT_COLUMNS
        ))
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(post_id)
        .bind(&fields.title)
        .bind(&fields.slug)
        .bind(&fields.excerpt)
        .bind(&fields.content)
        .bind(&fields.cover_image)
        .bind(&fields.category_id)
        .bind(fields.kind.as_str())
        .bind(&fields.video_url)
        .bind(&fields.external_link)
        .bind(timestamp())
        .fetch_one(&self.pool)
        .await?;

        Ok(draft_from_row(&row))
    }

    /// Delete the draft shadow of a post. Returns whether one existed.
    pub async fn delete_draft(&self, post_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM post_drafts WHERE post_id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// IDs of every post that currently has a draft shadow.
    pub async fn posts_with_drafts(&self) -> Result<HashSet<String>, AppError> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT post_id FROM post_drafts")
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[cfg(test)]
    pub async fn count_drafts(&self, post_id: &str) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_drafts WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // ==================== TICKET OPERATIONS ====================

    /// Insert a new ticket as pending with no admin fields set.
    pub async fn insert_ticket(&self, ticket: &NewTicket) -> Result<Ticket, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query(
            r#"INSERT INTO wishlist (
                id, title, content, category, status, priority,
                contact_name, contact_phone, contact_email, admin_reply, replied_at, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, NULL, ?)"#,
        )
        .bind(&id)
        .bind(&ticket.title)
        .bind(&ticket.content)
        .bind(ticket.category.as_str())
        .bind(TicketStatus::Pending.as_str())
        .bind(ticket.priority.as_str())
        .bind(&ticket.contact_name)
        .bind(&ticket.contact_phone)
        .bind(&ticket.contact_email)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(Ticket {
            id,
            title: ticket.title.clone(),
            content: ticket.content.clone(),
            category: ticket.category,
            status: TicketStatus::Pending,
            priority: ticket.priority,
            contact_name: ticket.contact_name.clone(),
            contact_phone: ticket.contact_phone.clone(),
            contact_email: ticket.contact_email.clone(),
            admin_reply: None,
            replied_at: None,
            created_at: now,
        })
    }

    /// Get a ticket by ID.
    pub async fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM wishlist WHERE id = ?",
            TICKET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(ticket_from_row))
    }

    /// Most recent tickets, newest first.
    pub async fn recent_tickets(&self, limit: i64) -> Result<Vec<Ticket>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM wishlist ORDER BY created_at DESC, rowid DESC LIMIT ?",
            TICKET_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(ticket_from_row).collect())
    }

    /// List tickets matching a filter, newest first, with the total match count.
    pub async fn list_tickets(
        &self,
        filter: &TicketFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Ticket>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM wishlist");
        push_ticket_filter(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        qb.push(TICKET_COLUMNS).push(" FROM wishlist");
        push_ticket_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok((rows.iter().map(ticket_from_row).collect(), total))
    }

    /// Status breakdown over the whole ticket table.
    pub async fn ticket_stats(&self) -> Result<TicketStats, AppError> {
        let row = sqlx::query(
            r#"SELECT
                COUNT(*) AS total,
                COUNT(CASE WHEN status = 'pending' THEN 1 END) AS pending,
                COUNT(CASE WHEN status = 'processing' THEN 1 END) AS processing,
                COUNT(CASE WHEN status = 'completed' THEN 1 END) AS completed,
                COUNT(CASE WHEN status = 'rejected' THEN 1 END) AS rejected,
                COUNT(CASE WHEN priority = 'urgent' AND status <> 'completed' THEN 1 END) AS urgent_open
            FROM wishlist"#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(TicketStats {
            total: row.get("total"),
            pending: row.get("pending"),
            processing: row.get("processing"),
            completed: row.get("completed"),
            rejected: row.get("rejected"),
            urgent_open: row.get("urgent_open"),
        })
    }

    /// Tickets still waiting on the desk (pending or processing).
    pub async fn count_open_tickets(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM wishlist WHERE status IN ('pending', 'processing')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Set only the status of a ticket.
    pub async fn set_ticket_status(
        &self,
        id: &str,
        status: TicketStatus,
    ) -> Result<Ticket, AppError> {
        let row = sqlx::query(&format!(
            "UPDATE wishlist SET status = ? WHERE id = ? RETURNING {}",
            TICKET_COLUMNS
        ))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(ticket_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", id)))
    }

    /// Set only the priority of a ticket.
    pub async fn set_ticket_priority(
        &self,
        id: &str,
        priority: TicketPriority,
    ) -> Result<Ticket, AppError> {
        let row = sqlx::query(&format!(
            "UPDATE wishlist SET priority = ? WHERE id = ? RETURNING {}",
            TICKET_COLUMNS
        ))
        .bind(priority.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(ticket_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", id)))
    }

    /// Store an admin reply and complete the ticket in the same statement.
    pub async fn reply_ticket(&self, id: &str, reply: &str) -> Result<Ticket, AppError> {
        let row = sqlx::query(&format!(
            "UPDATE wishlist SET admin_reply = ?, replied_at = ?, status = ? WHERE id = ? RETURNING {}",
            TICKET_COLUMNS
        ))
        .bind(reply)
        .bind(timestamp())
        .bind(TicketStatus::Completed.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(ticket_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", id)))
    }

    /// Delete a ticket. Its notes go with it by cascade.
    pub async fn delete_ticket(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM wishlist WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Ticket {} not found", id)));
        }

        Ok(())
    }

    /// `UPDATE … WHERE id IN (…)` in one statement. Returns rows affected.
    pub async fn batch_set_ticket_status(
        &self,
        ids: &[String],
        status: TicketStatus,
    ) -> Result<u64, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE wishlist SET status = ");
        qb.push_bind(status.as_str());
        qb.push(" WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// `DELETE … WHERE id IN (…)` in one statement. Returns rows affected.
    pub async fn batch_delete_tickets(&self, ids: &[String]) -> Result<u64, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new("DELETE FROM wishlist WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    // ==================== NOTE OPERATIONS ====================

    /// Append a note to a ticket.
    pub async fn insert_note(&self, ticket_id: &str, content: &str) -> Result<TicketNote, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query(
            "INSERT INTO wishlist_notes (id, wishlist_id, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(ticket_id)
        .bind(content)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(TicketNote {
            id,
            ticket_id: ticket_id.to_string(),
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Notes of a ticket, newest first.
    pub async fn list_notes(&self, ticket_id: &str) -> Result<Vec<TicketNote>, AppError> {
        let rows = sqlx::query(
            "SELECT id, wishlist_id, content, created_at FROM wishlist_notes WHERE wishlist_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    /// Delete a single note.
    pub async fn delete_note(&self, note_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM wishlist_notes WHERE id = ?")
            .bind(note_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Note {} not found", note_id)));
        }

        Ok(())
    }

    // ==================== SESSION OPERATIONS ====================

    /// Resolve a session token that has not expired.
    pub async fn get_session(&self, token: &str) -> Result<Option<Session>, AppError> {
        let row = sqlx::query(
            "SELECT token, user_id, expires_at FROM sessions WHERE token = ? AND (expires_at IS NULL OR expires_at > ?)",
        )
        .bind(token)
        .bind(timestamp())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| Session {
            token: row.get("token"),
            user_id: row.get("user_id"),
            expires_at: row.get("expires_at"),
        }))
    }

    /// Create or refresh a session token for a user.
    pub async fn upsert_session(
        &self,
        token: &str,
        user_id: &str,
        expires_at: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)
            ON CONFLICT(token) DO UPDATE SET user_id = excluded.user_id, expires_at = excluded.expires_at"#,
        )
        .bind(token)
        .bind(user_id)
        .bind(timestamp())
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Remove a session. Returns whether it existed.
    pub async fn delete_session(&self, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Role assigned to a user, if any.
    pub async fn user_role(&self, user_id: &str) -> Result<Option<String>, AppError> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    /// Assign a role to a user, replacing any previous one.
    pub async fn set_user_role(&self, user_id: &str, role: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES (?, ?) ON CONFLICT(user_id) DO UPDATE SET role = excluded.role",
        )
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// Helper functions for filters and row conversion

/// Wrap user text as a `LIKE` substring pattern with wildcards escaped.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_post_filter(qb: &mut QueryBuilder<'_, Sqlite>, query: &PostQuery) {
    let mut sep = " WHERE ";

    if let Some(status) = query.status {
        qb.push(sep).push("status = ").push_bind(status.as_str());
        sep = " AND ";
    }
    if let Some(kind) = query.kind {
        qb.push(sep).push("type = ").push_bind(kind.as_str());
        sep = " AND ";
    }
    if let Some(category_id) = &query.category_id {
        qb.push(sep).push("category_id = ").push_bind(category_id.clone());
        sep = " AND ";
    }
    if let Some(text) = query.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(text);
        qb.push(sep)
            .push("(title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR excerpt LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR content LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

fn push_ticket_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &TicketFilter) {
    let mut sep = " WHERE ";

    if let Some(status) = filter.status {
        qb.push(sep).push("status = ").push_bind(status.as_str());
        sep = " AND ";
    }
    if let Some(priority) = filter.priority {
        qb.push(sep).push("priority = ").push_bind(priority.as_str());
        sep = " AND ";
    }
    if let Some(category) = filter.category {
        qb.push(sep).push("category = ").push_bind(category.as_str());
        sep = " AND ";
    }
    if let Some(text) = filter.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(text);
        qb.push(sep)
            .push("(title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR content LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

fn category_from_row(row: &sqlx::sqlite::SqliteRow) -> Category {
    let kind: String = row.get("type");
    Category {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        kind: PostKind::parse(&kind).unwrap_or_default(),
        icon: row.get("icon"),
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
    }
}

fn fields_from_row(row: &sqlx::sqlite::SqliteRow) -> PostFields {
    let kind: String = row.get("type");
    PostFields {
        title: row.get("title"),
        slug: row.get("slug"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        cover_image: row.get("cover_image"),
        category_id: row.get("category_id"),
        kind: PostKind::parse(&kind).unwrap_or_default(),
        video_url: row.get("video_url"),
        external_link: row.get("external_link"),
    }
}

fn post_from_row(row: &sqlx::sqlite::SqliteRow) -> Post {
    let status: String = row.get("status");
    Post {
        id: row.get("id"),
        fields: fields_from_row(row),
        status: PostStatus::parse(&status).unwrap_or_default(),
        view_count: row.get("view_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn draft_from_row(row: &sqlx::sqlite::SqliteRow) -> PostDraft {
    PostDraft {
        id: row.get("id"),
        post_id: row.get("post_id"),
        fields: fields_from_row(row),
        updated_at: row.get("updated_at"),
    }
}

fn link_from_row(row: &sqlx::sqlite::SqliteRow) -> PostLink {
    PostLink {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
    }
}

fn ticket_from_row(row: &sqlx::sqlite::SqliteRow) -> Ticket {
    let category: String = row.get("category");
    let status: String = row.get("status");
    let priority: String = row.get("priority");
    Ticket {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        category: TicketCategory::parse(&category).unwrap_or_default(),
        status: TicketStatus::parse(&status).unwrap_or_default(),
        priority: TicketPriority::parse(&priority).unwrap_or_default(),
        contact_name: row.get("contact_name"),
        contact_phone: row.get("contact_phone"),
        contact_email: row.get("contact_email"),
        admin_reply: row.get("admin_reply"),
        replied_at: row.get("replied_at"),
        created_at: row.get("created_at"),
    }
}

fn note_from_row(row: &sqlx::sqlite::SqliteRow) -> TicketNote {
    TicketNote {
        id: row.get("id"),
        ticket_id: row.get("wishlist_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}
