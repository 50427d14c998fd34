// Lifecycle tests over the in-memory store. The services are generic over the
// store traits, so everything exercised here is the same logic the Postgres
// client runs in production.
use std::sync::Arc;

use futures::future::join_all;
use uuid::Uuid;

use homematch::db::memory::MemoryStore;
use homematch::db::servicedb::ServiceExt;
use homematch::db::userdb::UserExt;
use homematch::dtos::chatdtos::ConvertChatDto;
use homematch::dtos::servicedtos::CreateServiceRequestDto;
use homematch::models::servicemodel::*;
use homematch::models::usermodel::{User, UserRole};
use homematch::service::chat_service::ChatService;
use homematch::service::engagement::EngagementService;
use homematch::service::error::EngagementError;
use homematch::service::projection::ProjectionService;
use homematch::service::review_service::ReviewService;

struct Harness {
    store: Arc<MemoryStore>,
    engagement: EngagementService<MemoryStore>,
    chats: ChatService<MemoryStore>,
    reviews: ReviewService<MemoryStore>,
    projections: ProjectionService<MemoryStore>,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            engagement: EngagementService::new(store.clone()),
            chats: ChatService::new(store.clone()),
            reviews: ReviewService::new(store.clone()),
            projections: ProjectionService::new(store.clone(), 15),
            store,
        }
    }

    async fn client(&self, name: &str) -> User {
        self.store
            .create_user(
                name.to_string(),
                format!("{name}@example.com"),
                UserRole::Client,
            )
            .await
            .unwrap()
    }

    async fn professional(&self, name: &str) -> User {
        self.store
            .create_user(
                name.to_string(),
                format!("{name}@example.com"),
                UserRole::Professional,
            )
            .await
            .unwrap()
    }

    async fn pending_request(&self, client_id: Uuid) -> ServiceRequest {
        self.engagement
            .create_request(
                client_id,
                CreateServiceRequestDto {
                    category: ServiceCategory::Plumbing,
                    description: "Kitchen sink is leaking under the cabinet".to_string(),
                    location: "Calle Mayor 12, Madrid".to_string(),
                    preferred_date: None,
                },
            )
            .await
            .unwrap()
    }

    /// Drive a reservation to completed through the normal path.
    async fn completed_reservation(&self, client_id: Uuid, professional_id: Uuid) -> Reservation {
        let request = self.pending_request(client_id).await;
        let accepted = self
            .engagement
            .accept_request(request.id, professional_id)
            .await
            .unwrap();
        let reservation = accepted.reservation.unwrap();
        self.engagement
            .accept_reservation(reservation.id, professional_id)
            .await
            .unwrap();
        self.engagement
            .complete_reservation(reservation.id, professional_id)
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn accept_request_awards_to_single_professional() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let pro = h.professional("pablo").await;
    let request = h.pending_request(client.id).await;

    let result = h.engagement.accept_request(request.id, pro.id).await.unwrap();

    assert!(!result.needs_reconciliation);
    assert_eq!(result.request.status, RequestStatus::Accepted);

    let reservation = result.reservation.expect("reservation created");
    assert_eq!(reservation.service_request_id, Some(request.id));
    assert_eq!(reservation.professional_id, Some(pro.id));
    assert_eq!(reservation.status, ReservationStatus::Pending);
}

#[tokio::test]
async fn concurrent_accepts_produce_exactly_one_reservation() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let request = h.pending_request(client.id).await;

    let mut pros = Vec::new();
    for i in 0..8 {
        pros.push(h.professional(&format!("pro{i}")).await);
    }

    let tasks = pros.iter().map(|pro| {
        let engagement = h.engagement.clone();
        let request_id = request.id;
        let pro_id = pro.id;
        tokio::spawn(async move { engagement.accept_request(request_id, pro_id).await })
    });
    let outcomes: Vec<_> = join_all(tasks).await.into_iter().map(|r| r.unwrap()).collect();

    let mut winners = 0;
    let mut losers = 0;
    for outcome in outcomes {
        match outcome {
            Ok(result) => {
                assert!(result.reservation.is_some());
                winners += 1;
            }
            Err(EngagementError::RequestAlreadyAccepted(id)) => {
                assert_eq!(id, request.id);
                losers += 1;
            }
            Err(other) => panic!("unexpected outcome: {other}"),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(losers, 7);

    let stored = h.store.get_service_request(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, RequestStatus::Accepted);

    let reservations = h
        .store
        .list_reservations_for_client(client.id, None)
        .await
        .unwrap();
    assert_eq!(reservations.len(), 1);
}

#[tokio::test]
async fn terminal_request_statuses_are_immutable() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let pro = h.professional("pablo").await;

    let request = h.pending_request(client.id).await;
    h.engagement.cancel_request(request.id, client.id).await.unwrap();

    // no re-opening: neither a second cancel nor an acceptance may land
    assert!(matches!(
        h.engagement.cancel_request(request.id, client.id).await,
        Err(EngagementError::InvalidTransition { .. })
    ));
    assert!(matches!(
        h.engagement.accept_request(request.id, pro.id).await,
        Err(EngagementError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn cancel_request_requires_owner() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let intruder = h.client("iris").await;
    let request = h.pending_request(client.id).await;

    assert!(matches!(
        h.engagement.cancel_request(request.id, intruder.id).await,
        Err(EngagementError::Forbidden { .. })
    ));
}

#[tokio::test]
async fn accept_request_rejects_non_professionals() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let other_client = h.client("iris").await;
    let request = h.pending_request(client.id).await;

    assert!(matches!(
        h.engagement.accept_request(request.id, other_client.id).await,
        Err(EngagementError::Forbidden { .. })
    ));
}

#[tokio::test]
async fn reservation_follows_pending_accepted_completed() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let pro = h.professional("pablo").await;

    let reservation = h.completed_reservation(client.id, pro.id).await;
    assert_eq!(reservation.status, ReservationStatus::Completed);

    // completed is terminal
    assert!(matches!(
        h.engagement.cancel_reservation(reservation.id, client.id).await,
        Err(EngagementError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn reservation_cannot_skip_to_completed() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let pro = h.professional("pablo").await;
    let request = h.pending_request(client.id).await;

    let accepted = h.engagement.accept_request(request.id, pro.id).await.unwrap();
    let reservation = accepted.reservation.unwrap();

    assert!(matches!(
        h.engagement.complete_reservation(reservation.id, pro.id).await,
        Err(EngagementError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn reservation_transitions_check_the_actor() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let pro = h.professional("pablo").await;
    let stranger = h.professional("saul").await;
    let request = h.pending_request(client.id).await;

    let accepted = h.engagement.accept_request(request.id, pro.id).await.unwrap();
    let reservation = accepted.reservation.unwrap();

    // only the assigned professional accepts or completes
    assert!(matches!(
        h.engagement.accept_reservation(reservation.id, stranger.id).await,
        Err(EngagementError::Forbidden { .. })
    ));
    assert!(matches!(
        h.engagement.accept_reservation(reservation.id, client.id).await,
        Err(EngagementError::Forbidden { .. })
    ));

    // either party may cancel, strangers may not
    assert!(matches!(
        h.engagement.cancel_reservation(reservation.id, stranger.id).await,
        Err(EngagementError::Forbidden { .. })
    ));
    let cancelled = h
        .engagement
        .cancel_reservation(reservation.id, client.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, ReservationStatus::Cancelled);
}

#[tokio::test]
async fn convert_chat_promotes_messages_and_is_idempotent() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let pro = h.professional("pablo").await;

    let chat = h.chats.start_chat(client.id, Some(pro.id)).await.unwrap();
    h.chats
        .send_chat_message(chat.id, client.id, "Can you paint my hallway?".to_string())
        .await
        .unwrap();
    h.chats
        .send_chat_message(chat.id, pro.id, "Sure, Thursday works".to_string())
        .await
        .unwrap();

    let converted = h
        .chats
        .convert_chat(chat.id, client.id, ConvertChatDto::default())
        .await
        .unwrap();

    assert_eq!(converted.request.status, RequestStatus::InProcess);
    assert_eq!(converted.reservation.professional_id, Some(pro.id));
    assert_eq!(converted.messages_reparented, 2);

    // messages now answer on the reservation thread, chat ids retained
    let messages = h
        .chats
        .list_reservation_messages(converted.reservation.id, client.id)
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.chat_id == Some(chat.id)));

    // replay returns the original reservation id, creates nothing
    match h
        .chats
        .convert_chat(chat.id, client.id, ConvertChatDto::default())
        .await
    {
        Err(EngagementError::AlreadyConverted {
            chat_id,
            reservation_id,
        }) => {
            assert_eq!(chat_id, chat.id);
            assert_eq!(reservation_id, Some(converted.reservation.id));
        }
        other => panic!("expected AlreadyConverted, got {other:?}"),
    }

    let reservations = h
        .store
        .list_reservations_for_client(client.id, None)
        .await
        .unwrap();
    assert_eq!(reservations.len(), 1);
}

#[tokio::test]
async fn concurrent_conversions_create_one_reservation() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let pro = h.professional("pablo").await;

    let chat = h.chats.start_chat(client.id, Some(pro.id)).await.unwrap();
    h.chats
        .send_chat_message(chat.id, client.id, "Deal at the quoted price".to_string())
        .await
        .unwrap();

    let tasks = (0..4).map(|_| {
        let chats = h.chats.clone();
        let chat_id = chat.id;
        let client_id = client.id;
        tokio::spawn(async move {
            chats
                .convert_chat(chat_id, client_id, ConvertChatDto::default())
                .await
        })
    });
    let outcomes: Vec<_> = join_all(tasks).await.into_iter().map(|r| r.unwrap()).collect();

    let winners = outcomes.iter().filter(|o| o.is_ok()).count();
    assert_eq!(winners, 1);
    for outcome in &outcomes {
        if let Err(err) = outcome {
            assert!(matches!(err, EngagementError::AlreadyConverted { .. }));
        }
    }

    let reservations = h
        .store
        .list_reservations_for_client(client.id, None)
        .await
        .unwrap();
    assert_eq!(reservations.len(), 1);
}

#[tokio::test]
async fn empty_chat_cannot_be_converted() {
    let h = Harness::new();
    let client = h.client("carla").await;

    let chat = h.chats.start_chat(client.id, None).await.unwrap();

    assert!(matches!(
        h.chats
            .convert_chat(chat.id, client.id, ConvertChatDto::default())
            .await,
        Err(EngagementError::EmptyChat(_))
    ));

    let reservations = h
        .store
        .list_reservations_for_client(client.id, None)
        .await
        .unwrap();
    assert!(reservations.is_empty());
}

#[tokio::test]
async fn convert_chat_requires_the_chat_client() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let pro = h.professional("pablo").await;

    let chat = h.chats.start_chat(client.id, Some(pro.id)).await.unwrap();
    h.chats
        .send_chat_message(chat.id, client.id, "When could you come by?".to_string())
        .await
        .unwrap();

    // the professional side cannot force the promotion
    assert!(matches!(
        h.chats
            .convert_chat(chat.id, pro.id, ConvertChatDto::default())
            .await,
        Err(EngagementError::Forbidden { .. })
    ));
}

#[tokio::test]
async fn converted_chat_rejects_new_chat_messages() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let pro = h.professional("pablo").await;

    let chat = h.chats.start_chat(client.id, Some(pro.id)).await.unwrap();
    h.chats
        .send_chat_message(chat.id, client.id, "Agreed, book it".to_string())
        .await
        .unwrap();
    let converted = h
        .chats
        .convert_chat(chat.id, client.id, ConvertChatDto::default())
        .await
        .unwrap();

    match h
        .chats
        .send_chat_message(chat.id, pro.id, "One more thing".to_string())
        .await
    {
        Err(EngagementError::AlreadyConverted { reservation_id, .. }) => {
            assert_eq!(reservation_id, Some(converted.reservation.id));
        }
        other => panic!("expected AlreadyConverted, got {other:?}"),
    }
}

#[tokio::test]
async fn review_requires_completed_reservation() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let pro = h.professional("pablo").await;
    let request = h.pending_request(client.id).await;

    let accepted = h.engagement.accept_request(request.id, pro.id).await.unwrap();
    let reservation = accepted.reservation.unwrap();

    // pending reservation: rating value is irrelevant
    assert!(matches!(
        h.reviews
            .submit_review(reservation.id, client.id, 5, "Great".to_string())
            .await,
        Err(EngagementError::NotCompleted(_))
    ));
}

#[tokio::test]
async fn review_is_owner_only_and_range_checked() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let intruder = h.client("iris").await;
    let pro = h.professional("pablo").await;

    let reservation = h.completed_reservation(client.id, pro.id).await;

    assert!(matches!(
        h.reviews
            .submit_review(reservation.id, intruder.id, 5, "Nice".to_string())
            .await,
        Err(EngagementError::Forbidden { .. })
    ));
    assert!(matches!(
        h.reviews
            .submit_review(reservation.id, client.id, 0, "Bad".to_string())
            .await,
        Err(EngagementError::InvalidRating(0))
    ));
    assert!(matches!(
        h.reviews
            .submit_review(reservation.id, client.id, 6, "Too good".to_string())
            .await,
        Err(EngagementError::InvalidRating(6))
    ));
}

#[tokio::test]
async fn second_review_is_rejected_and_original_preserved() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let pro = h.professional("pablo").await;

    let reservation = h.completed_reservation(client.id, pro.id).await;

    let review = h
        .reviews
        .submit_review(reservation.id, client.id, 5, "Spotless work".to_string())
        .await
        .unwrap();
    assert_eq!(review.rating, 5);

    assert!(matches!(
        h.reviews
            .submit_review(reservation.id, client.id, 3, "Changed my mind".to_string())
            .await,
        Err(EngagementError::AlreadyReviewed(_))
    ));

    let reviews = h.reviews.reviews_for_professional(pro.id).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating, 5);
    assert_eq!(reviews[0].comment, "Spotless work");
}

#[tokio::test]
async fn cancellation_does_not_cascade() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let pro = h.professional("pablo").await;
    let request = h.pending_request(client.id).await;

    let accepted = h.engagement.accept_request(request.id, pro.id).await.unwrap();
    let reservation = accepted.reservation.unwrap();

    h.chats
        .send_reservation_message(reservation.id, client.id, "Gate code is 4412".to_string())
        .await
        .unwrap();

    h.engagement
        .cancel_reservation(reservation.id, pro.id)
        .await
        .unwrap();

    // messages survive the cancellation, and the request keeps its own status
    let messages = h
        .chats
        .list_reservation_messages(reservation.id, client.id)
        .await
        .unwrap();
    assert_eq!(messages.len(), 1);

    let stored_request = h
        .store
        .get_service_request(request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_request.status, RequestStatus::Accepted);
}

#[tokio::test]
async fn dashboards_reflect_committed_state() {
    let h = Harness::new();
    let client = h.client("carla").await;
    let pro = h.professional("pablo").await;

    // one open request, one completed engagement
    h.pending_request(client.id).await;
    h.completed_reservation(client.id, pro.id).await;

    let dashboard = h.projections.client_dashboard(client.id).await.unwrap();
    assert_eq!(dashboard.pending_requests.len(), 1);
    assert_eq!(dashboard.completed_reservations.len(), 1);
    assert!(dashboard.active_reservations.is_empty());
    assert_eq!(dashboard.refresh_interval_secs, 15);

    let pro_dashboard = h.projections.professional_dashboard(pro.id).await.unwrap();
    assert_eq!(pro_dashboard.open_requests.len(), 1);
    assert_eq!(pro_dashboard.completed_reservations.len(), 1);
}
