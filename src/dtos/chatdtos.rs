use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::servicemodel::ServiceCategory;

#[derive(Debug, Serialize, Deserialize)]
pub struct StartChatDto {
    pub professional_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SendMessageDto {
    #[validate(length(min = 1, max = 4000, message = "Message must be between 1 and 4000 characters"))]
    pub content: String,
}

/// Details the client supplies when promoting a chat into a reservation.
/// Everything is optional; missing fields fall back to chat-derived defaults.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct ConvertChatDto {
    pub category: Option<ServiceCategory>,

    #[validate(length(min = 1, max = 100, message = "Service name must be between 1 and 100 characters"))]
    pub service_name: Option<String>,

    #[validate(length(min = 10, max = 2000, message = "Description must be between 10 and 2000 characters"))]
    pub description: Option<String>,

    pub location: Option<String>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub client_notes: Option<String>,
}
