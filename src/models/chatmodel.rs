// models/chatmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "chat_status", rename_all = "snake_case")]
pub enum ChatStatus {
    Active,
    Converted,
}

impl ChatStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ChatStatus::Active => "active",
            ChatStatus::Converted => "converted",
        }
    }
}

/// An informal pre-commitment thread between a client and (optionally) a
/// professional. A chat converts to at most one reservation; the row survives
/// conversion as an audit trail with `reservation_id` back-filled.
#[derive(Debug, Serialize, Clone, Deserialize, sqlx::FromRow)]
pub struct Chat {
    pub id: Uuid,
    pub client_id: Uuid,
    pub professional_id: Option<Uuid>,
    pub status: ChatStatus,
    pub reservation_id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Exactly one of `chat_id` / `reservation_id` is set at creation time.
/// After conversion both may be set: `reservation_id` is back-filled while
/// `chat_id` is retained for audit.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}
