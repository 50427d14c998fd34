// service/engagement.rs
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::error::EngagementError;
use super::state_machine;
use crate::db::servicedb::ServiceExt;
use crate::db::userdb::UserExt;
use crate::dtos::servicedtos::CreateServiceRequestDto;
use crate::models::servicemodel::*;
use crate::models::usermodel::UserRole;

/// Applies the engagement state machine to service requests and reservations,
/// and resolves the multi-professional acceptance race.
///
/// Generic over the store so the identical logic runs against Postgres in
/// production and the in-memory store in tests.
#[derive(Debug)]
pub struct EngagementService<S> {
    store: Arc<S>,
}

// not derived: the store only needs to be shared, not Clone itself
impl<S> Clone for EngagementService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

/// Outcome of `accept_request`. `reservation` is `None` only in the
/// recognized partial-failure state: the request was marked accepted but the
/// reservation insert failed. That state is flagged for an external
/// reconciliation sweep instead of being retried inline (a blind retry could
/// double-create) or rolled back (another actor may have observed ACCEPTED).
#[derive(Debug, Serialize)]
pub struct AcceptRequestResult {
    pub request: ServiceRequest,
    pub reservation: Option<Reservation>,
    pub needs_reconciliation: bool,
}

impl<S> EngagementService<S>
where
    S: ServiceExt + UserExt + Send + Sync,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn create_request(
        &self,
        client_id: Uuid,
        data: CreateServiceRequestDto,
    ) -> Result<ServiceRequest, EngagementError> {
        let request = self
            .store
            .create_service_request(
                client_id,
                data.category,
                data.description,
                data.location,
                data.preferred_date,
                RequestStatus::Pending,
            )
            .await?;

        tracing::info!(request_id = %request.id, client_id = %client_id, "service request created");
        Ok(request)
    }

    /// Award a pending request to exactly one professional.
    ///
    /// Ordering matters: the conditional transition happens first and gates
    /// reservation creation. Every concurrent caller that loses the
    /// single-row update gets `RequestAlreadyAccepted`.
    pub async fn accept_request(
        &self,
        request_id: Uuid,
        professional_id: Uuid,
    ) -> Result<AcceptRequestResult, EngagementError> {
        let professional = self
            .store
            .get_user(professional_id)
            .await?
            .ok_or(EngagementError::NotFound {
                entity: "user",
                id: professional_id,
            })?;

        if professional.role != UserRole::Professional {
            return Err(EngagementError::Forbidden {
                user_id: professional_id,
                entity: "service request",
                id: request_id,
            });
        }

        let request = self
            .store
            .get_service_request(request_id)
            .await?
            .ok_or(EngagementError::NotFound {
                entity: "service request",
                id: request_id,
            })?;

        if request.status == RequestStatus::Accepted {
            return Err(EngagementError::RequestAlreadyAccepted(request_id));
        }
        state_machine::check_request_transition(
            request_id,
            request.status,
            RequestStatus::Accepted,
        )?;

        let won = self
            .store
            .try_transition_request(request_id, RequestStatus::Pending, RequestStatus::Accepted)
            .await?;

        if !won {
            // Lost the race. Re-fetch to report what actually happened.
            let current = self.store.get_service_request(request_id).await?;
            return Err(match current.map(|r| r.status) {
                Some(RequestStatus::Accepted) => {
                    EngagementError::RequestAlreadyAccepted(request_id)
                }
                _ => EngagementError::Conflict {
                    entity: "service request",
                    id: request_id,
                },
            });
        }

        let accepted = ServiceRequest {
            status: RequestStatus::Accepted,
            ..request
        };

        // The request is committed as accepted; a failure past this point
        // leaves an accepted request with no reservation. Surface it flagged.
        let reservation = self
            .store
            .create_reservation(
                Some(request_id),
                accepted.client_id,
                Some(professional_id),
                Some(professional.name.clone()),
                accepted.category.to_str().to_owned(),
                accepted.preferred_date,
                None,
                accepted.location.clone(),
                None,
            )
            .await;

        match reservation {
            Ok(reservation) => {
                tracing::info!(
                    request_id = %request_id,
                    reservation_id = %reservation.id,
                    professional_id = %professional_id,
                    "service request accepted"
                );
                Ok(AcceptRequestResult {
                    request: accepted,
                    reservation: Some(reservation),
                    needs_reconciliation: false,
                })
            }
            Err(err) => {
                tracing::error!(
                    request_id = %request_id,
                    professional_id = %professional_id,
                    error = %err,
                    "request accepted but reservation creation failed; needs reconciliation"
                );
                Ok(AcceptRequestResult {
                    request: accepted,
                    reservation: None,
                    needs_reconciliation: true,
                })
            }
        }
    }

    pub async fn cancel_request(
        &self,
        request_id: Uuid,
        client_id: Uuid,
    ) -> Result<ServiceRequest, EngagementError> {
        let request = self
            .store
            .get_service_request(request_id)
            .await?
            .ok_or(EngagementError::NotFound {
                entity: "service request",
                id: request_id,
            })?;

        if request.client_id != client_id {
            return Err(EngagementError::Forbidden {
                user_id: client_id,
                entity: "service request",
                id: request_id,
            });
        }

        state_machine::check_request_transition(
            request_id,
            request.status,
            RequestStatus::Cancelled,
        )?;

        let won = self
            .store
            .try_transition_request(request_id, request.status, RequestStatus::Cancelled)
            .await?;

        if !won {
            // A professional's acceptance landed between our read and write.
            return Err(EngagementError::Conflict {
                entity: "service request",
                id: request_id,
            });
        }

        tracing::info!(request_id = %request_id, "service request cancelled");
        Ok(ServiceRequest {
            status: RequestStatus::Cancelled,
            ..request
        })
    }

    pub async fn accept_reservation(
        &self,
        reservation_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Reservation, EngagementError> {
        self.transition_reservation(
            reservation_id,
            professional_id,
            ReservationActor::Professional,
            ReservationStatus::Accepted,
        )
        .await
    }

    pub async fn complete_reservation(
        &self,
        reservation_id: Uuid,
        professional_id: Uuid,
    ) -> Result<Reservation, EngagementError> {
        self.transition_reservation(
            reservation_id,
            professional_id,
            ReservationActor::Professional,
            ReservationStatus::Completed,
        )
        .await
    }

    /// Either party may cancel a non-terminal reservation. Cancellation does
    /// not cascade: messages and reviews stay untouched, and any linked
    /// service request keeps its own status.
    pub async fn cancel_reservation(
        &self,
        reservation_id: Uuid,
        user_id: Uuid,
    ) -> Result<Reservation, EngagementError> {
        self.transition_reservation(
            reservation_id,
            user_id,
            ReservationActor::EitherParty,
            ReservationStatus::Cancelled,
        )
        .await
    }

    async fn transition_reservation(
        &self,
        reservation_id: Uuid,
        user_id: Uuid,
        actor: ReservationActor,
        target: ReservationStatus,
    ) -> Result<Reservation, EngagementError> {
        let reservation = self
            .store
            .get_reservation(reservation_id)
            .await?
            .ok_or(EngagementError::NotFound {
                entity: "reservation",
                id: reservation_id,
            })?;

        let allowed = match actor {
            ReservationActor::Professional => reservation.professional_id == Some(user_id),
            ReservationActor::EitherParty => {
                reservation.client_id == user_id
                    || reservation.professional_id == Some(user_id)
            }
        };
        if !allowed {
            return Err(EngagementError::Forbidden {
                user_id,
                entity: "reservation",
                id: reservation_id,
            });
        }

        state_machine::check_reservation_transition(reservation_id, reservation.status, target)?;

        let won = self
            .store
            .try_transition_reservation(reservation_id, reservation.status, target)
            .await?;

        if !won {
            return Err(EngagementError::Conflict {
                entity: "reservation",
                id: reservation_id,
            });
        }

        tracing::info!(
            reservation_id = %reservation_id,
            status = target.to_str(),
            "reservation transitioned"
        );
        Ok(Reservation {
            status: target,
            ..reservation
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum ReservationActor {
    Professional,
    EitherParty,
}
