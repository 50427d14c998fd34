use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::servicemodel::*;

//Service request DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateServiceRequestDto {
    pub category: ServiceCategory,

    #[validate(length(min = 10, max = 2000, message = "Description must be between 10 and 2000 characters"))]
    pub description: String,

    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,

    pub preferred_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct RequestFilterDto {
    pub status: Option<RequestStatus>,
    pub category: Option<ServiceCategory>,
}

#[derive(Debug, Deserialize)]
pub struct ReservationFilterDto {
    pub status: Option<ReservationStatus>,
}

//Review DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubmitReviewDto {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub comment: String,
}

//Dashboard aggregates
#[derive(Debug, Serialize)]
pub struct ClientDashboard {
    pub pending_requests: Vec<ServiceRequest>,
    pub in_process_requests: Vec<ServiceRequest>,
    pub active_reservations: Vec<Reservation>,
    pub completed_reservations: Vec<Reservation>,
    pub cancelled_reservations: Vec<Reservation>,
    /// How long clients should wait before re-polling, from configuration.
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct ProfessionalDashboard {
    pub open_requests: Vec<ServiceRequest>,
    pub upcoming_reservations: Vec<Reservation>,
    pub completed_reservations: Vec<Reservation>,
    pub refresh_interval_secs: u64,
}

//Response wrappers
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}
