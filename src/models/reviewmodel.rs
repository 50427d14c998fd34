use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One review per reservation, written by the reservation's client after
/// completion. `reservation_id` carries a UNIQUE index.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Review {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub client_id: Uuid,
    pub professional_id: Option<Uuid>,
    pub rating: i32,
    pub comment: String,
    pub created_at: Option<DateTime<Utc>>,
}
