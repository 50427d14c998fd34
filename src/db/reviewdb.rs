// db/reviewdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::reviewmodel::Review;

const REVIEW_COLUMNS: &str = r#"
    id, reservation_id, client_id, professional_id, rating, comment, created_at
"#;

#[async_trait]
pub trait ReviewExt {
    /// Insert a review. `reservation_id` carries a UNIQUE index, so a
    /// concurrent duplicate surfaces as a unique-violation database error.
    async fn create_review(
        &self,
        reservation_id: Uuid,
        client_id: Uuid,
        professional_id: Option<Uuid>,
        rating: i32,
        comment: String,
    ) -> Result<Review, Error>;

    async fn get_review_by_reservation(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<Review>, Error>;

    async fn list_reviews_for_professional(
        &self,
        professional_id: Uuid,
    ) -> Result<Vec<Review>, Error>;
}

#[async_trait]
impl ReviewExt for DBClient {
    async fn create_review(
        &self,
        reservation_id: Uuid,
        client_id: Uuid,
        professional_id: Option<Uuid>,
        rating: i32,
        comment: String,
    ) -> Result<Review, Error> {
        sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (reservation_id, client_id, professional_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(reservation_id)
        .bind(client_id)
        .bind(professional_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_review_by_reservation(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<Review>, Error> {
        sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE reservation_id = $1
            "#
        ))
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_reviews_for_professional(
        &self,
        professional_id: Uuid,
    ) -> Result<Vec<Review>, Error> {
        sqlx::query_as::<_, Review>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE professional_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await
    }
}
