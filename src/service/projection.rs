// service/projection.rs
use std::sync::Arc;

use uuid::Uuid;

use super::error::EngagementError;
use crate::db::servicedb::ServiceExt;
use crate::dtos::servicedtos::{ClientDashboard, ProfessionalDashboard};
use crate::models::servicemodel::*;

/// Read-side projections: pure status filters over the committed entity set.
/// No caching — every call re-reads, and the advertised refresh interval is
/// the configured polling bound, not a staleness guarantee.
#[derive(Debug)]
pub struct ProjectionService<S> {
    store: Arc<S>,
    refresh_interval_secs: u64,
}

impl<S> Clone for ProjectionService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            refresh_interval_secs: self.refresh_interval_secs,
        }
    }
}

impl<S> ProjectionService<S>
where
    S: ServiceExt + Send + Sync,
{
    pub fn new(store: Arc<S>, refresh_interval_secs: u64) -> Self {
        Self {
            store,
            refresh_interval_secs,
        }
    }

    pub async fn requests_for_client(
        &self,
        client_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ServiceRequest>, EngagementError> {
        Ok(self.store.list_requests_by_client(client_id, status).await?)
    }

    pub async fn open_requests(
        &self,
        category: Option<ServiceCategory>,
    ) -> Result<Vec<ServiceRequest>, EngagementError> {
        Ok(self.store.list_open_requests(category).await?)
    }

    pub async fn reservations_for_client(
        &self,
        client_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, EngagementError> {
        Ok(self
            .store
            .list_reservations_for_client(client_id, status)
            .await?)
    }

    pub async fn reservations_for_professional(
        &self,
        professional_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, EngagementError> {
        Ok(self
            .store
            .list_reservations_for_professional(professional_id, status)
            .await?)
    }

    pub async fn client_dashboard(
        &self,
        client_id: Uuid,
    ) -> Result<ClientDashboard, EngagementError> {
        let pending_requests = self
            .store
            .list_requests_by_client(client_id, Some(RequestStatus::Pending))
            .await?;
        let in_process_requests = self
            .store
            .list_requests_by_client(client_id, Some(RequestStatus::InProcess))
            .await?;

        let mut active_reservations = self
            .store
            .list_reservations_for_client(client_id, Some(ReservationStatus::Pending))
            .await?;
        active_reservations.extend(
            self.store
                .list_reservations_for_client(client_id, Some(ReservationStatus::Accepted))
                .await?,
        );

        let completed_reservations = self
            .store
            .list_reservations_for_client(client_id, Some(ReservationStatus::Completed))
            .await?;
        let cancelled_reservations = self
            .store
            .list_reservations_for_client(client_id, Some(ReservationStatus::Cancelled))
            .await?;

        Ok(ClientDashboard {
            pending_requests,
            in_process_requests,
            active_reservations,
            completed_reservations,
            cancelled_reservations,
            refresh_interval_secs: self.refresh_interval_secs,
        })
    }

    pub async fn professional_dashboard(
        &self,
        professional_id: Uuid,
    ) -> Result<ProfessionalDashboard, EngagementError> {
        let open_requests = self.store.list_open_requests(None).await?;

        let mut upcoming_reservations = self
            .store
            .list_reservations_for_professional(professional_id, Some(ReservationStatus::Pending))
            .await?;
        upcoming_reservations.extend(
            self.store
                .list_reservations_for_professional(
                    professional_id,
                    Some(ReservationStatus::Accepted),
                )
                .await?,
        );

        let completed_reservations = self
            .store
            .list_reservations_for_professional(
                professional_id,
                Some(ReservationStatus::Completed),
            )
            .await?;

        Ok(ProfessionalDashboard {
            open_requests,
            upcoming_reservations,
            completed_reservations,
            refresh_interval_secs: self.refresh_interval_secs,
        })
    }
}
