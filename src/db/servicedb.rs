// db/servicedb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::servicemodel::*;

const REQUEST_COLUMNS: &str = r#"
    id, client_id, category, description, location, preferred_date,
    status, created_at, updated_at
"#;

const RESERVATION_COLUMNS: &str = r#"
    id, service_request_id, client_id, professional_id, professional_name,
    service_name, scheduled_start, scheduled_end, location, client_notes,
    status, created_at, updated_at
"#;

/// Entity-store operations for service requests and reservations.
///
/// Status mutation happens exclusively through the `try_transition_*`
/// conditional updates: a `false` return means the expected prior status no
/// longer held (a lost race or an illegal move) and the caller must re-fetch
/// to find out which.
#[async_trait]
pub trait ServiceExt {
    async fn create_service_request(
        &self,
        client_id: Uuid,
        category: ServiceCategory,
        description: String,
        location: String,
        preferred_date: Option<DateTime<Utc>>,
        status: RequestStatus,
    ) -> Result<ServiceRequest, Error>;

    async fn get_service_request(&self, request_id: Uuid)
        -> Result<Option<ServiceRequest>, Error>;

    /// Atomic `UPDATE ... WHERE id AND status = expected`. Returns whether a
    /// row was updated.
    async fn try_transition_request(
        &self,
        request_id: Uuid,
        expected: RequestStatus,
        new: RequestStatus,
    ) -> Result<bool, Error>;

    async fn list_requests_by_client(
        &self,
        client_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ServiceRequest>, Error>;

    async fn list_open_requests(
        &self,
        category: Option<ServiceCategory>,
    ) -> Result<Vec<ServiceRequest>, Error>;

    #[allow(clippy::too_many_arguments)]
    async fn create_reservation(
        &self,
        service_request_id: Option<Uuid>,
        client_id: Uuid,
        professional_id: Option<Uuid>,
        professional_name: Option<String>,
        service_name: String,
        scheduled_start: Option<DateTime<Utc>>,
        scheduled_end: Option<DateTime<Utc>>,
        location: String,
        client_notes: Option<String>,
    ) -> Result<Reservation, Error>;

    async fn get_reservation(&self, reservation_id: Uuid)
        -> Result<Option<Reservation>, Error>;

    async fn try_transition_reservation(
        &self,
        reservation_id: Uuid,
        expected: ReservationStatus,
        new: ReservationStatus,
    ) -> Result<bool, Error>;

    async fn list_reservations_for_client(
        &self,
        client_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, Error>;

    async fn list_reservations_for_professional(
        &self,
        professional_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, Error>;
}

#[async_trait]
impl ServiceExt for DBClient {
    async fn create_service_request(
        &self,
        client_id: Uuid,
        category: ServiceCategory,
        description: String,
        location: String,
        preferred_date: Option<DateTime<Utc>>,
        status: RequestStatus,
    ) -> Result<ServiceRequest, Error> {
        sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            INSERT INTO service_requests
            (client_id, category, description, location, preferred_date, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(client_id)
        .bind(category)
        .bind(description)
        .bind(location)
        .bind(preferred_date)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_service_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<ServiceRequest>, Error> {
        sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM service_requests
            WHERE id = $1
            "#
        ))
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn try_transition_request(
        &self,
        request_id: Uuid,
        expected: RequestStatus,
        new: RequestStatus,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE service_requests
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(request_id)
        .bind(expected)
        .bind(new)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_requests_by_client(
        &self,
        client_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ServiceRequest>, Error> {
        sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM service_requests
            WHERE client_id = $1 AND ($2::request_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(client_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_open_requests(
        &self,
        category: Option<ServiceCategory>,
    ) -> Result<Vec<ServiceRequest>, Error> {
        sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS}
            FROM service_requests
            WHERE status = 'pending'::request_status
              AND ($1::service_category IS NULL OR category = $1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_reservation(
        &self,
        service_request_id: Option<Uuid>,
        client_id: Uuid,
        professional_id: Option<Uuid>,
        professional_name: Option<String>,
        service_name: String,
        scheduled_start: Option<DateTime<Utc>>,
        scheduled_end: Option<DateTime<Utc>>,
        location: String,
        client_notes: Option<String>,
    ) -> Result<Reservation, Error> {
        sqlx::query_as::<_, Reservation>(&format!(
            r#"
            INSERT INTO reservations
            (service_request_id, client_id, professional_id, professional_name,
             service_name, scheduled_start, scheduled_end, location, client_notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {RESERVATION_COLUMNS}
            "#
        ))
        .bind(service_request_id)
        .bind(client_id)
        .bind(professional_id)
        .bind(professional_name)
        .bind(service_name)
        .bind(scheduled_start)
        .bind(scheduled_end)
        .bind(location)
        .bind(client_notes)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_reservation(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<Reservation>, Error> {
        sqlx::query_as::<_, Reservation>(&format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM reservations
            WHERE id = $1
            "#
        ))
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn try_transition_reservation(
        &self,
        reservation_id: Uuid,
        expected: ReservationStatus,
        new: ReservationStatus,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(reservation_id)
        .bind(expected)
        .bind(new)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_reservations_for_client(
        &self,
        client_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, Error> {
        sqlx::query_as::<_, Reservation>(&format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM reservations
            WHERE client_id = $1 AND ($2::reservation_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(client_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_reservations_for_professional(
        &self,
        professional_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, Error> {
        sqlx::query_as::<_, Reservation>(&format!(
            r#"
            SELECT {RESERVATION_COLUMNS}
            FROM reservations
            WHERE professional_id = $1 AND ($2::reservation_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(professional_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await
    }
}
