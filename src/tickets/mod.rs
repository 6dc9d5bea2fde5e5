//! Wishlist ticket lifecycle.
//!
//! Status moves freely between any two values; priority is an independent
//! axis. Replies complete a ticket in the same update that stores them.

use tracing::info;
use validator::ValidateEmail;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::{
    BatchResult, NewTicket, Page, Pagination, PublicTicket, SubmitTicketRequest, Ticket,
    TicketDetail, TicketFilter, TicketListing, TicketNote, TicketPriority, TicketStatus,
};

pub const TITLE_MAX_CHARS: usize = 100;
pub const CONTENT_MIN_CHARS: usize = 10;
pub const CONTENT_MAX_CHARS: usize = 1000;

/// Ticket desk operations shared by the public form and the admin views.
#[derive(Clone)]
pub struct TicketWorkflow {
    repo: Repository,
}

impl TicketWorkflow {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    // ==================== PUBLIC ====================

    /// Accept a citizen submission as a pending ticket.
    pub async fn submit(&self, req: &SubmitTicketRequest) -> Result<Ticket, AppError> {
        let ticket = validate_submission(req)?;
        let ticket = self.repo.insert_ticket(&ticket).await?;
        info!("Submitted ticket {} ({})", ticket.id, ticket.category.as_str());
        Ok(ticket)
    }

    pub async fn list_recent(&self, limit: u32) -> Result<Vec<PublicTicket>, AppError> {
        let tickets = self.repo.recent_tickets(i64::from(limit)).await?;
        Ok(tickets.into_iter().map(PublicTicket::from).collect())
    }

    pub async fn get_public(&self, id: &str) -> Result<PublicTicket, AppError> {
        Ok(self.require_ticket(id).await?.into())
    }

    // ==================== ADMIN ====================

    /// Filtered page plus stats over every ticket.
    pub async fn list(
        &self,
        filter: &TicketFilter,
        pagination: Pagination,
    ) -> Result<TicketListing, AppError> {
        let (items, total) = self
            .repo
            .list_tickets(filter, pagination.limit(), pagination.offset())
            .await?;
        let stats = self.repo.ticket_stats().await?;

        Ok(TicketListing {
            page: Page::new(items, total, pagination),
            stats,
        })
    }

    pub async fn get(&self, id: &str) -> Result<TicketDetail, AppError> {
        let ticket = self.require_ticket(id).await?;
        let notes = self.repo.list_notes(id).await?;
        Ok(TicketDetail { ticket, notes })
    }

    pub async fn set_status(&self, id: &str, status: TicketStatus) -> Result<Ticket, AppError> {
        let ticket = self.repo.set_ticket_status(id, status).await?;
        info!("Set ticket {} status to {}", id, status.as_str());
        Ok(ticket)
    }

    pub async fn set_priority(
        &self,
        id: &str,
        priority: TicketPriority,
    ) -> Result<Ticket, AppError> {
        let ticket = self.repo.set_ticket_priority(id, priority).await?;
        info!("Set ticket {} priority to {}", id, priority.as_str());
        Ok(ticket)
    }

    /// Store the reply and mark the ticket completed.
    pub async fn reply(&self, id: &str, text: &str) -> Result<Ticket, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::invalid("reply", "请输入回复内容"));
        }

        let ticket = self.repo.reply_ticket(id, text).await?;
        info!("Replied to ticket {}", id);
        Ok(ticket)
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.repo.delete_ticket(id).await?;
        info!("Deleted ticket {}", id);
        Ok(())
    }

    pub async fn add_note(&self, id: &str, text: &str) -> Result<TicketNote, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::invalid("content", "请输入备注内容"));
        }
        self.require_ticket(id).await?;

        let note = self.repo.insert_note(id, text).await?;
        info!("Added note {} to ticket {}", note.id, id);
        Ok(note)
    }

    pub async fn list_notes(&self, id: &str) -> Result<Vec<TicketNote>, AppError> {
        self.require_ticket(id).await?;
        self.repo.list_notes(id).await
    }

    pub async fn delete_note(&self, note_id: &str) -> Result<(), AppError> {
        self.repo.delete_note(note_id).await?;
        info!("Deleted note {}", note_id);
        Ok(())
    }

    /// One `UPDATE … WHERE id IN (…)`. Unknown ids are skipped by the store.
    pub async fn batch_set_status(
        &self,
        ids: &[String],
        status: TicketStatus,
    ) -> Result<BatchResult, AppError> {
        require_ids(ids)?;

        let affected = self.repo.batch_set_ticket_status(ids, status).await?;
        info!(
            "Batch set {} of {} tickets to {}",
            affected,
            ids.len(),
            status.as_str()
        );
        Ok(BatchResult {
            requested: ids.len(),
            affected,
        })
    }

    /// One `DELETE … WHERE id IN (…)`.
    pub async fn batch_delete(&self, ids: &[String]) -> Result<BatchResult, AppError> {
        require_ids(ids)?;

        let affected = self.repo.batch_delete_tickets(ids).await?;
        info!("Batch deleted {} of {} tickets", affected, ids.len());
        Ok(BatchResult {
            requested: ids.len(),
            affected,
        })
    }

    /// Tickets still pending or processing.
    pub async fn open_count(&self) -> Result<i64, AppError> {
        self.repo.count_open_tickets().await
    }

    async fn require_ticket(&self, id: &str) -> Result<Ticket, AppError> {
        self.repo
            .get_ticket(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", id)))
    }
}

fn require_ids(ids: &[String]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Err(AppError::invalid("ids", "请选择至少一条记录"));
    }
    Ok(())
}

fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Trim and check a public submission, producing the row to insert.
pub fn validate_submission(req: &SubmitTicketRequest) -> Result<NewTicket, AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::invalid("title", "请输入标题"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::invalid(
            "title",
            format!("标题不能超过{}个字", TITLE_MAX_CHARS),
        ));
    }

    let content = req.content.trim();
    if content.is_empty() {
        return Err(AppError::invalid("content", "请输入详细内容"));
    }
    let content_chars = content.chars().count();
    if content_chars < CONTENT_MIN_CHARS {
        return Err(AppError::invalid(
            "content",
            format!("详细内容至少需要{}个字", CONTENT_MIN_CHARS),
        ));
    }
    if content_chars > CONTENT_MAX_CHARS {
        return Err(AppError::invalid(
            "content",
            format!("详细内容不能超过{}个字", CONTENT_MAX_CHARS),
        ));
    }

    let contact_email = blank_to_none(&req.contact_email);
    if let Some(email) = &contact_email {
        if !email.validate_email() {
            return Err(AppError::invalid("contactEmail", "邮箱格式不正确"));
        }
    }

    Ok(NewTicket {
        title: title.to_string(),
        content: content.to_string(),
        category: req.category.unwrap_or_default(),
        priority: req.priority.unwrap_or_default(),
        contact_name: blank_to_none(&req.contact_name),
        contact_phone: blank_to_none(&req.contact_phone),
        contact_email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::TicketCategory;
    use tempfile::TempDir;

    async fn workflow() -> (TicketWorkflow, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .unwrap();
        (TicketWorkflow::new(Repository::new(pool)), temp_dir)
    }

    fn request(title: &str, content: &str) -> SubmitTicketRequest {
        SubmitTicketRequest {
            title: title.to_string(),
            content: content.to_string(),
            ..SubmitTicketRequest::default()
        }
    }

    async fn submit(tickets: &TicketWorkflow, title: &str) -> Ticket {
        tickets
            .submit(&request(title, "这是一条足够长的测试内容"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_then_reply_scenario() {
        let (tickets, _dir) = workflow().await;

        let ticket = tickets
            .submit(&request("路灯不亮", "小区东门路灯连续三天不亮，请尽快检修"))
            .await
            .unwrap();
        assert_eq!(ticket.status, TicketStatus::Pending);
        assert_eq!(ticket.priority, TicketPriority::Medium);
        assert_eq!(ticket.category, TicketCategory::Renovation);
        assert!(ticket.admin_reply.is_none());
        assert!(ticket.replied_at.is_none());

        let replied = tickets
            .reply(&ticket.id, "已联系物业，预计周五修复")
            .await
            .unwrap();
        assert_eq!(replied.status, TicketStatus::Completed);
        assert_eq!(replied.admin_reply.as_deref(), Some("已联系物业，预计周五修复"));
        assert!(replied.replied_at.is_some());
    }

    #[tokio::test]
    async fn test_short_content_creates_nothing() {
        let (tickets, _dir) = workflow().await;

        let err = tickets.submit(&request("x", "short")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.field(), Some("content"));

        let listing = tickets
            .list(&TicketFilter::default(), Pagination::new(1, 20))
            .await
            .unwrap();
        assert_eq!(listing.stats.total, 0);
    }

    #[test]
    fn test_submission_limits_and_contacts() {
        let long_title = "长".repeat(TITLE_MAX_CHARS + 1);
        let err = validate_submission(&request(&long_title, "这是一条足够长的测试内容")).unwrap_err();
        assert_eq!(err.field(), Some("title"));

        let long_content = "字".repeat(CONTENT_MAX_CHARS + 1);
        let err = validate_submission(&request("t", &long_content)).unwrap_err();
        assert_eq!(err.field(), Some("content"));

        // Ten CJK characters meet the minimum even though they are 30 bytes.
        assert!(validate_submission(&request("t", "一二三四五六七八九十")).is_ok());

        let mut req = request("  t  ", "这是一条足够长的测试内容");
        req.contact_email = Some("not-an-email".to_string());
        assert_eq!(
            validate_submission(&req).unwrap_err().field(),
            Some("contactEmail")
        );

        req.contact_email = Some("  ".to_string());
        req.contact_phone = Some(" 13800000000 ".to_string());
        let ticket = validate_submission(&req).unwrap();
        assert_eq!(ticket.title, "t");
        assert!(ticket.contact_email.is_none());
        assert_eq!(ticket.contact_phone.as_deref(), Some("13800000000"));
    }

    #[tokio::test]
    async fn test_blank_reply_is_rejected() {
        let (tickets, _dir) = workflow().await;
        let ticket = submit(&tickets, "a").await;

        let err = tickets.reply(&ticket.id, "   ").await.unwrap_err();
        assert_eq!(err.field(), Some("reply"));
        assert!(matches!(
            tickets.reply("missing", "ok").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_status_moves_freely_and_priority_is_independent() {
        let (tickets, _dir) = workflow().await;
        let ticket = submit(&tickets, "a").await;

        tickets.reply(&ticket.id, "done").await.unwrap();
        let reopened = tickets
            .set_status(&ticket.id, TicketStatus::Pending)
            .await
            .unwrap();
        assert_eq!(reopened.status, TicketStatus::Pending);
        assert_eq!(reopened.admin_reply.as_deref(), Some("done"));

        let urgent = tickets
            .set_priority(&ticket.id, TicketPriority::Urgent)
            .await
            .unwrap();
        assert_eq!(urgent.priority, TicketPriority::Urgent);
        assert_eq!(urgent.status, TicketStatus::Pending);
    }

    #[tokio::test]
    async fn test_batch_status_then_filtered_list() {
        let (tickets, _dir) = workflow().await;
        let a = submit(&tickets, "a").await;
        let b = submit(&tickets, "b").await;
        let c = submit(&tickets, "c").await;
        submit(&tickets, "d").await;

        let ids = vec![a.id.clone(), b.id.clone(), c.id.clone()];
        let result = tickets
            .batch_set_status(&ids, TicketStatus::Processing)
            .await
            .unwrap();
        assert_eq!(result.requested, 3);
        assert_eq!(result.affected, 3);

        let filter = TicketFilter {
            status: Some(TicketStatus::Processing),
            ..TicketFilter::default()
        };
        let listing = tickets.list(&filter, Pagination::new(1, 20)).await.unwrap();
        let mut found: Vec<String> = listing.page.items.iter().map(|t| t.id.clone()).collect();
        found.sort();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(found, expected);

        assert!(matches!(
            tickets.batch_delete(&[]).await,
            Err(AppError::Validation { .. })
        ));
        let deleted = tickets.batch_delete(&ids).await.unwrap();
        assert_eq!(deleted.affected, 3);
        assert_eq!(tickets.open_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stats_ignore_active_filter() {
        let (tickets, _dir) = workflow().await;
        for title in ["p1", "p2", "p3"] {
            submit(&tickets, title).await;
        }
        for title in ["c1", "c2"] {
            let t = submit(&tickets, title).await;
            tickets.set_status(&t.id, TicketStatus::Completed).await.unwrap();
        }

        let filter = TicketFilter {
            status: Some(TicketStatus::Completed),
            ..TicketFilter::default()
        };
        let listing = tickets.list(&filter, Pagination::new(1, 20)).await.unwrap();
        assert_eq!(listing.page.items.len(), 2);
        assert_eq!(listing.page.total, 2);
        assert_eq!(listing.stats.pending, 3);
        assert_eq!(listing.stats.completed, 2);
        assert_eq!(listing.stats.total, 5);
    }

    #[tokio::test]
    async fn test_list_text_filter_and_paging() {
        let (tickets, _dir) = workflow().await;
        submit(&tickets, "Street light out").await;
        submit(&tickets, "Broken bench").await;
        let newest = submit(&tickets, "Another LIGHT issue").await;

        let filter = TicketFilter {
            q: Some("light".to_string()),
            ..TicketFilter::default()
        };
        let listing = tickets.list(&filter, Pagination::new(1, 1)).await.unwrap();
        assert_eq!(listing.page.total, 2);
        assert_eq!(listing.page.items.len(), 1);
        assert_eq!(listing.page.items[0].id, newest.id);

        let second = tickets.list(&filter, Pagination::new(2, 1)).await.unwrap();
        assert_eq!(second.page.items[0].title, "Street light out");
    }

    #[tokio::test]
    async fn test_notes_are_newest_first_and_cascade() {
        let (tickets, _dir) = workflow().await;
        let ticket = submit(&tickets, "a").await;

        let first = tickets.add_note(&ticket.id, "called owner").await.unwrap();
        let second = tickets.add_note(&ticket.id, "visited site").await.unwrap();

        let detail = tickets.get(&ticket.id).await.unwrap();
        assert_eq!(detail.notes.len(), 2);
        assert_eq!(detail.notes[0].id, second.id);

        tickets.delete_note(&first.id).await.unwrap();
        assert_eq!(tickets.list_notes(&ticket.id).await.unwrap().len(), 1);
        assert!(matches!(
            tickets.delete_note(&first.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            tickets.add_note("missing", "x").await,
            Err(AppError::NotFound(_))
        ));

        tickets.delete(&ticket.id).await.unwrap();
        assert!(matches!(tickets.get(&ticket.id).await, Err(AppError::NotFound(_))));
    }
}
