//! Wishlist ticket model: citizen requests, their lifecycle enums and admin notes.

use serde::{Deserialize, Serialize};

/// Subject area of a ticket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    #[default]
    #[serde(rename = "old_renovation", alias = "renovation")]
    Renovation,
    Municipal,
    Cooperation,
    Other,
}

/// Lifecycle status. Any status may move to any other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Rejected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TicketCategory {
    pub const ALL: [TicketCategory; 4] = [
        TicketCategory::Renovation,
        TicketCategory::Municipal,
        TicketCategory::Cooperation,
        TicketCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketCategory::Renovation => "old_renovation",
            TicketCategory::Municipal => "municipal",
            TicketCategory::Cooperation => "cooperation",
            TicketCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "old_renovation" | "renovation" => Some(TicketCategory::Renovation),
            "municipal" => Some(TicketCategory::Municipal),
            "cooperation" => Some(TicketCategory::Cooperation),
            "other" => Some(TicketCategory::Other),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketCategory::Renovation => "小区旧改",
            TicketCategory::Municipal => "市政工程",
            TicketCategory::Cooperation => "本地合作",
            TicketCategory::Other => "其他",
        }
    }

    pub fn tone(&self) -> &'static str {
        match self {
            TicketCategory::Renovation => "orange",
            TicketCategory::Municipal => "blue",
            TicketCategory::Cooperation => "green",
            TicketCategory::Other => "gray",
        }
    }
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 4] = [
        TicketStatus::Pending,
        TicketStatus::Processing,
        TicketStatus::Completed,
        TicketStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Processing => "processing",
            TicketStatus::Completed => "completed",
            TicketStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TicketStatus::Pending),
            "processing" => Some(TicketStatus::Processing),
            "completed" => Some(TicketStatus::Completed),
            "rejected" => Some(TicketStatus::Rejected),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "待处理",
            TicketStatus::Processing => "处理中",
            TicketStatus::Completed => "已完成",
            TicketStatus::Rejected => "已拒绝",
        }
    }

    pub fn tone(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "yellow",
            TicketStatus::Processing => "blue",
            TicketStatus::Completed => "green",
            TicketStatus::Rejected => "red",
        }
    }
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 4] = [
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
        TicketPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(TicketPriority::Low),
            "medium" => Some(TicketPriority::Medium),
            "high" => Some(TicketPriority::High),
            "urgent" => Some(TicketPriority::Urgent),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TicketPriority::Low => "低",
            TicketPriority::Medium => "中",
            TicketPriority::High => "高",
            TicketPriority::Urgent => "紧急",
        }
    }

    pub fn tone(&self) -> &'static str {
        match self {
            TicketPriority::Low => "gray",
            TicketPriority::Medium => "blue",
            TicketPriority::High => "orange",
            TicketPriority::Urgent => "red",
        }
    }
}

/// One entry of the shared enum display table.
#[derive(Debug, Clone, Serialize)]
pub struct EnumOption {
    pub value: &'static str,
    pub label: &'static str,
    pub tone: &'static str,
}

/// Display table for every ticket enum, shared by all views.
#[derive(Debug, Clone, Serialize)]
pub struct TicketOptions {
    pub categories: Vec<EnumOption>,
    pub statuses: Vec<EnumOption>,
    pub priorities: Vec<EnumOption>,
}

impl TicketOptions {
    pub fn table() -> Self {
        Self {
            categories: TicketCategory::ALL
                .iter()
                .map(|c| EnumOption {
                    value: c.as_str(),
                    label: c.label(),
                    tone: c.tone(),
                })
                .collect(),
            statuses: TicketStatus::ALL
                .iter()
                .map(|s| EnumOption {
                    value: s.as_str(),
                    label: s.label(),
                    tone: s.tone(),
                })
                .collect(),
            priorities: TicketPriority::ALL
                .iter()
                .map(|p| EnumOption {
                    value: p.as_str(),
                    label: p.label(),
                    tone: p.tone(),
                })
                .collect(),
        }
    }
}

/// A citizen-submitted wishlist ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: TicketCategory,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub admin_reply: Option<String>,
    pub replied_at: Option<String>,
    pub created_at: String,
}

/// Public projection of a ticket: no phone, email or priority.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTicket {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: TicketCategory,
    pub status: TicketStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replied_at: Option<String>,
    pub created_at: String,
}

impl From<Ticket> for PublicTicket {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            title: t.title,
            content: t.content,
            category: t.category,
            status: t.status,
            contact_name: t.contact_name,
            admin_reply: t.admin_reply,
            replied_at: t.replied_at,
            created_at: t.created_at,
        }
    }
}

/// Internal admin annotation on a ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketNote {
    pub id: String,
    pub ticket_id: String,
    pub content: String,
    pub created_at: String,
}

/// A ticket together with its note thread, newest note first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub notes: Vec<TicketNote>,
}

/// Validated values for a new ticket row.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub content: String,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

/// Request body for the public submission form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTicketRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<TicketCategory>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

/// Conjunctive filter for the admin ticket table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketFilter {
    #[serde(default)]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    pub priority: Option<TicketPriority>,
    #[serde(default)]
    pub category: Option<TicketCategory>,
    /// Case-insensitive substring matched against title or content
    #[serde(default)]
    pub q: Option<String>,
}

/// Summary tiles, always computed over every ticket.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: i64,
    pub pending: i64,
    pub processing: i64,
    pub completed: i64,
    pub rejected: i64,
    /// Urgent tickets that are not yet completed
    pub urgent_open: i64,
}

/// Filtered page of tickets plus the unfiltered summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListing {
    #[serde(flatten)]
    pub page: super::Page<Ticket>,
    pub stats: TicketStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetTicketStatusRequest {
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetTicketPriorityRequest {
    pub priority: TicketPriority,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyRequest {
    #[serde(default)]
    pub reply: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddNoteRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchStatusRequest {
    pub ids: Vec<String>,
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<String>,
}

/// Outcome of a batch call: rows the store reported as affected.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub requested: usize,
    pub affected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renovation_accepts_both_spellings() {
        let a: TicketCategory = serde_json::from_str("\"old_renovation\"").unwrap();
        let b: TicketCategory = serde_json::from_str("\"renovation\"").unwrap();
        assert_eq!(a, TicketCategory::Renovation);
        assert_eq!(b, TicketCategory::Renovation);
        assert_eq!(
            serde_json::to_string(&TicketCategory::Renovation).unwrap(),
            "\"old_renovation\""
        );
    }

    #[test]
    fn test_as_str_round_trips_through_parse() {
        for s in TicketStatus::ALL {
            assert_eq!(TicketStatus::parse(s.as_str()), Some(s));
        }
        for p in TicketPriority::ALL {
            assert_eq!(TicketPriority::parse(p.as_str()), Some(p));
        }
        for c in TicketCategory::ALL {
            assert_eq!(TicketCategory::parse(c.as_str()), Some(c));
        }
    }

    #[test]
    fn test_options_table_covers_every_value() {
        let table = TicketOptions::table();
        assert_eq!(table.statuses.len(), 4);
        assert_eq!(table.priorities.len(), 4);
        assert_eq!(table.categories.len(), 4);
        assert_eq!(table.statuses[0].label, "待处理");
        assert_eq!(table.priorities[3].value, "urgent");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(TicketPriority::default(), TicketPriority::Medium);
        assert_eq!(TicketStatus::default(), TicketStatus::Pending);
    }

    #[test]
    fn test_public_projection_drops_contact_details() {
        let ticket = Ticket {
            id: "t1".to_string(),
            title: "路灯不亮".to_string(),
            content: "小区东门路灯连续三天不亮".to_string(),
            category: TicketCategory::Municipal,
            status: TicketStatus::Pending,
            priority: TicketPriority::High,
            contact_name: Some("王先生".to_string()),
            contact_phone: Some("13800000000".to_string()),
            contact_email: Some("wang@example.com".to_string()),
            admin_reply: None,
            replied_at: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };
        let json = serde_json::to_value(PublicTicket::from(ticket)).unwrap();
        assert!(json.get("contactPhone").is_none());
        assert!(json.get("contactEmail").is_none());
        assert!(json.get("priority").is_none());
        assert_eq!(json["contactName"], "王先生");
    }
}
