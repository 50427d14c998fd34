use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "service_category", rename_all = "snake_case")]
pub enum ServiceCategory {
    Plumbing,
    Electrical,
    Cleaning,
    Painting,
    Carpentry,
    Gardening,
    ApplianceRepair,
    Hvac,
    PestControl,
    Locksmith,
    Moving,
    Other,
}

impl ServiceCategory {
    pub fn to_str(&self) -> &str {
        match self {
            ServiceCategory::Plumbing => "plumbing",
            ServiceCategory::Electrical => "electrical",
            ServiceCategory::Cleaning => "cleaning",
            ServiceCategory::Painting => "painting",
            ServiceCategory::Carpentry => "carpentry",
            ServiceCategory::Gardening => "gardening",
            ServiceCategory::ApplianceRepair => "appliance_repair",
            ServiceCategory::Hvac => "hvac",
            ServiceCategory::PestControl => "pest_control",
            ServiceCategory::Locksmith => "locksmith",
            ServiceCategory::Moving => "moving",
            ServiceCategory::Other => "other",
        }
    }
}

/// Status of a client's open service request.
///
/// `InProcess` marks synthetic requests minted by chat conversion — they
/// bypassed open bidding and carry no outgoing transitions of their own.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InProcess,
    Accepted,
    Cancelled,
}

impl RequestStatus {
    pub fn to_str(&self) -> &str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProcess => "in_process",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "reservation_status", rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    Accepted,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub fn to_str(&self) -> &str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Accepted => "accepted",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub client_id: Uuid,
    pub category: ServiceCategory,
    pub description: String,
    pub location: String,
    pub preferred_date: Option<DateTime<Utc>>,
    pub status: RequestStatus,
    pub created_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
    pub updated_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: Uuid,
    /// None when the reservation was minted by chat conversion without a
    /// surviving request link.
    pub service_request_id: Option<Uuid>,
    pub client_id: Uuid,
    /// Set at creation and never reassigned. None only for chat conversions
    /// whose counterpart was unknown.
    pub professional_id: Option<Uuid>,
    pub professional_name: Option<String>,
    pub service_name: String,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub location: String,
    pub client_notes: Option<String>,
    pub status: ReservationStatus,
    pub created_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
    pub updated_at: Option<DateTime<Utc>>, // Database has DEFAULT NOW(), can be NULL
}
