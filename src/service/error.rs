use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::error::HttpError;

/// Failure taxonomy of the engagement lifecycle. Lost races (`Conflict`,
/// `RequestAlreadyAccepted`) and replayed operations (`AlreadyConverted`,
/// `AlreadyReviewed`) are expected, recoverable conditions; the caller should
/// re-fetch rather than blind-retry.
#[derive(Error, Debug)]
pub enum EngagementError {
    #[error("Invalid transition for {entity} {id}: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        id: Uuid,
        from: &'static str,
        to: &'static str,
    },

    #[error("Service request {0} was already accepted by another professional")]
    RequestAlreadyAccepted(Uuid),

    #[error("Concurrent update lost on {entity} {id}; re-fetch before deciding again")]
    Conflict { entity: &'static str, id: Uuid },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("User {user_id} is not allowed to perform this action on {entity} {id}")]
    Forbidden {
        user_id: Uuid,
        entity: &'static str,
        id: Uuid,
    },

    #[error("Chat {chat_id} was already converted")]
    AlreadyConverted {
        chat_id: Uuid,
        reservation_id: Option<Uuid>,
    },

    #[error("Reservation {0} has already been reviewed")]
    AlreadyReviewed(Uuid),

    #[error("Reservation {0} is not completed")]
    NotCompleted(Uuid),

    #[error("Rating {0} is out of range, expected 1 to 5")]
    InvalidRating(i32),

    #[error("Chat {0} has no messages and cannot be converted")]
    EmptyChat(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl EngagementError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EngagementError::NotFound { .. } => StatusCode::NOT_FOUND,

            EngagementError::Forbidden { .. } => StatusCode::FORBIDDEN,

            EngagementError::InvalidTransition { .. }
            | EngagementError::RequestAlreadyAccepted(_)
            | EngagementError::Conflict { .. }
            | EngagementError::AlreadyConverted { .. }
            | EngagementError::AlreadyReviewed(_)
            | EngagementError::NotCompleted(_) => StatusCode::CONFLICT,

            EngagementError::InvalidRating(_) | EngagementError::EmptyChat(_) => {
                StatusCode::BAD_REQUEST
            }

            EngagementError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EngagementError> for HttpError {
    fn from(error: EngagementError) -> Self {
        let status = error.status_code();
        HttpError::new(error.to_string(), status)
    }
}
