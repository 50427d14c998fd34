// service/review_service.rs
use std::sync::Arc;

use uuid::Uuid;

use super::error::EngagementError;
use crate::db::reviewdb::ReviewExt;
use crate::db::servicedb::ServiceExt;
use crate::models::reviewmodel::Review;
use crate::models::servicemodel::ReservationStatus;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// One review per completed reservation, written by its client. This is the
/// single canonical rating entry point.
#[derive(Debug)]
pub struct ReviewService<S> {
    store: Arc<S>,
}

impl<S> Clone for ReviewService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S> ReviewService<S>
where
    S: ServiceExt + ReviewExt + Send + Sync,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn submit_review(
        &self,
        reservation_id: Uuid,
        client_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<Review, EngagementError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(EngagementError::InvalidRating(rating));
        }

        let reservation = self
            .store
            .get_reservation(reservation_id)
            .await?
            .ok_or(EngagementError::NotFound {
                entity: "reservation",
                id: reservation_id,
            })?;

        if reservation.client_id != client_id {
            return Err(EngagementError::Forbidden {
                user_id: client_id,
                entity: "reservation",
                id: reservation_id,
            });
        }

        if reservation.status != ReservationStatus::Completed {
            return Err(EngagementError::NotCompleted(reservation_id));
        }

        if self
            .store
            .get_review_by_reservation(reservation_id)
            .await?
            .is_some()
        {
            return Err(EngagementError::AlreadyReviewed(reservation_id));
        }

        let created = self
            .store
            .create_review(
                reservation_id,
                client_id,
                reservation.professional_id,
                rating,
                comment,
            )
            .await;

        match created {
            Ok(review) => {
                tracing::info!(
                    reservation_id = %reservation_id,
                    rating,
                    "review submitted"
                );
                Ok(review)
            }
            Err(err) => {
                // The UNIQUE index on reservation_id is the last line of
                // defense against a concurrent duplicate slipping past the
                // read above.
                if self
                    .store
                    .get_review_by_reservation(reservation_id)
                    .await?
                    .is_some()
                {
                    Err(EngagementError::AlreadyReviewed(reservation_id))
                } else {
                    Err(EngagementError::Database(err))
                }
            }
        }
    }

    pub async fn reviews_for_professional(
        &self,
        professional_id: Uuid,
    ) -> Result<Vec<Review>, EngagementError> {
        Ok(self
            .store
            .list_reviews_for_professional(professional_id)
            .await?)
    }
}
