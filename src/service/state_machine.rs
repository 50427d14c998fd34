//! Legal transitions for the engagement lifecycle.
//!
//! Three graphs, one rule: once an entity reaches a terminal status nothing
//! moves it again. The tables here are consulted before every conditional
//! update; the conditional update itself (status = expected) is what makes
//! the decision hold under races.

use uuid::Uuid;

use super::error::EngagementError;
use crate::models::chatmodel::ChatStatus;
use crate::models::servicemodel::{RequestStatus, ReservationStatus};

/// Service requests: pending -> accepted (matching resolver) or
/// pending -> cancelled (client). `InProcess` requests are minted terminal.
pub fn request_can_transition(from: RequestStatus, to: RequestStatus) -> bool {
    matches!(
        (from, to),
        (RequestStatus::Pending, RequestStatus::Accepted)
            | (RequestStatus::Pending, RequestStatus::Cancelled)
    )
}

/// Reservations: pending -> accepted -> completed, with cancellation allowed
/// from either non-terminal status.
pub fn reservation_can_transition(from: ReservationStatus, to: ReservationStatus) -> bool {
    matches!(
        (from, to),
        (ReservationStatus::Pending, ReservationStatus::Accepted)
            | (ReservationStatus::Pending, ReservationStatus::Cancelled)
            | (ReservationStatus::Accepted, ReservationStatus::Completed)
            | (ReservationStatus::Accepted, ReservationStatus::Cancelled)
    )
}

/// Chats only ever move active -> converted, once.
pub fn chat_can_transition(from: ChatStatus, to: ChatStatus) -> bool {
    matches!((from, to), (ChatStatus::Active, ChatStatus::Converted))
}

pub fn check_request_transition(
    request_id: Uuid,
    from: RequestStatus,
    to: RequestStatus,
) -> Result<(), EngagementError> {
    if request_can_transition(from, to) {
        Ok(())
    } else {
        Err(EngagementError::InvalidTransition {
            entity: "service request",
            id: request_id,
            from: from.to_str_static(),
            to: to.to_str_static(),
        })
    }
}

pub fn check_reservation_transition(
    reservation_id: Uuid,
    from: ReservationStatus,
    to: ReservationStatus,
) -> Result<(), EngagementError> {
    if reservation_can_transition(from, to) {
        Ok(())
    } else {
        Err(EngagementError::InvalidTransition {
            entity: "reservation",
            id: reservation_id,
            from: from.to_str_static(),
            to: to.to_str_static(),
        })
    }
}

// &'static str status names so InvalidTransition can carry them without
// allocation.
impl RequestStatus {
    fn to_str_static(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProcess => "in_process",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl ReservationStatus {
    fn to_str_static(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Accepted => "accepted",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST_STATUSES: [RequestStatus; 4] = [
        RequestStatus::Pending,
        RequestStatus::InProcess,
        RequestStatus::Accepted,
        RequestStatus::Cancelled,
    ];

    const RESERVATION_STATUSES: [ReservationStatus; 4] = [
        ReservationStatus::Pending,
        ReservationStatus::Accepted,
        ReservationStatus::Completed,
        ReservationStatus::Cancelled,
    ];

    #[test]
    fn request_graph_only_leaves_pending() {
        for from in REQUEST_STATUSES {
            for to in REQUEST_STATUSES {
                let legal = request_can_transition(from, to);
                let expected = from == RequestStatus::Pending
                    && (to == RequestStatus::Accepted || to == RequestStatus::Cancelled);
                assert_eq!(legal, expected, "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn reservation_terminal_statuses_are_final() {
        for to in RESERVATION_STATUSES {
            assert!(!reservation_can_transition(ReservationStatus::Completed, to));
            assert!(!reservation_can_transition(ReservationStatus::Cancelled, to));
        }
    }

    #[test]
    fn reservation_happy_path_and_cancellations() {
        assert!(reservation_can_transition(
            ReservationStatus::Pending,
            ReservationStatus::Accepted
        ));
        assert!(reservation_can_transition(
            ReservationStatus::Accepted,
            ReservationStatus::Completed
        ));
        assert!(reservation_can_transition(
            ReservationStatus::Pending,
            ReservationStatus::Cancelled
        ));
        assert!(reservation_can_transition(
            ReservationStatus::Accepted,
            ReservationStatus::Cancelled
        ));
        // no skipping straight to completed
        assert!(!reservation_can_transition(
            ReservationStatus::Pending,
            ReservationStatus::Completed
        ));
    }

    #[test]
    fn chat_converts_exactly_one_way() {
        assert!(chat_can_transition(ChatStatus::Active, ChatStatus::Converted));
        assert!(!chat_can_transition(ChatStatus::Converted, ChatStatus::Active));
        assert!(!chat_can_transition(ChatStatus::Converted, ChatStatus::Converted));
    }
}
