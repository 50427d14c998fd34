// db/memory.rs
//
// In-memory implementation of the store traits. Backs the lifecycle
// integration tests; a single mutex over all tables makes every conditional
// update atomic, which is exactly the discipline the Postgres implementation
// gets from single-row UPDATE ... WHERE status = expected.
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Error;
use uuid::Uuid;

use super::chatdb::ChatExt;
use super::reviewdb::ReviewExt;
use super::servicedb::ServiceExt;
use super::userdb::UserExt;
use crate::models::chatmodel::*;
use crate::models::reviewmodel::Review;
use crate::models::servicemodel::*;
use crate::models::usermodel::{User, UserRole};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    requests: HashMap<Uuid, ServiceRequest>,
    reservations: HashMap<Uuid, Reservation>,
    chats: HashMap<Uuid, Chat>,
    messages: Vec<Message>,
    // keyed by reservation_id, the unique column
    reviews: HashMap<Uuid, Review>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> Option<DateTime<Utc>> {
        Some(Utc::now())
    }
}

#[async_trait]
impl UserExt for MemoryStore {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.get(&user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(
        &self,
        name: String,
        email: String,
        role: UserRole,
    ) -> Result<User, Error> {
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            role,
            created_at: Self::now(),
        };
        let mut tables = self.tables.lock().unwrap();
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ServiceExt for MemoryStore {
    async fn create_service_request(
        &self,
        client_id: Uuid,
        category: ServiceCategory,
        description: String,
        location: String,
        preferred_date: Option<DateTime<Utc>>,
        status: RequestStatus,
    ) -> Result<ServiceRequest, Error> {
        let request = ServiceRequest {
            id: Uuid::new_v4(),
            client_id,
            category,
            description,
            location,
            preferred_date,
            status,
            created_at: Self::now(),
            updated_at: Self::now(),
        };
        let mut tables = self.tables.lock().unwrap();
        tables.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn get_service_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<ServiceRequest>, Error> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.requests.get(&request_id).cloned())
    }

    async fn try_transition_request(
        &self,
        request_id: Uuid,
        expected: RequestStatus,
        new: RequestStatus,
    ) -> Result<bool, Error> {
        let mut tables = self.tables.lock().unwrap();
        match tables.requests.get_mut(&request_id) {
            Some(request) if request.status == expected => {
                request.status = new;
                request.updated_at = Self::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_requests_by_client(
        &self,
        client_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ServiceRequest>, Error> {
        let tables = self.tables.lock().unwrap();
        let mut requests: Vec<ServiceRequest> = tables
            .requests
            .values()
            .filter(|r| r.client_id == client_id)
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn list_open_requests(
        &self,
        category: Option<ServiceCategory>,
    ) -> Result<Vec<ServiceRequest>, Error> {
        let tables = self.tables.lock().unwrap();
        let mut requests: Vec<ServiceRequest> = tables
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Pending)
            .filter(|r| category.map_or(true, |c| r.category == c))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
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
        let reservation = Reservation {
            id: Uuid::new_v4(),
            service_request_id,
            client_id,
            professional_id,
            professional_name,
            service_name,
            scheduled_start,
            scheduled_end,
            location,
            client_notes,
            status: ReservationStatus::Pending,
            created_at: Self::now(),
            updated_at: Self::now(),
        };
        let mut tables = self.tables.lock().unwrap();
        tables.reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn get_reservation(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<Reservation>, Error> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.reservations.get(&reservation_id).cloned())
    }

    async fn try_transition_reservation(
        &self,
        reservation_id: Uuid,
        expected: ReservationStatus,
        new: ReservationStatus,
    ) -> Result<bool, Error> {
        let mut tables = self.tables.lock().unwrap();
        match tables.reservations.get_mut(&reservation_id) {
            Some(reservation) if reservation.status == expected => {
                reservation.status = new;
                reservation.updated_at = Self::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_reservations_for_client(
        &self,
        client_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, Error> {
        let tables = self.tables.lock().unwrap();
        let mut reservations: Vec<Reservation> = tables
            .reservations
            .values()
            .filter(|r| r.client_id == client_id)
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reservations)
    }

    async fn list_reservations_for_professional(
        &self,
        professional_id: Uuid,
        status: Option<ReservationStatus>,
    ) -> Result<Vec<Reservation>, Error> {
        let tables = self.tables.lock().unwrap();
        let mut reservations: Vec<Reservation> = tables
            .reservations
            .values()
            .filter(|r| r.professional_id == Some(professional_id))
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reservations)
    }
}

#[async_trait]
impl ChatExt for MemoryStore {
    async fn create_chat(
        &self,
        client_id: Uuid,
        professional_id: Option<Uuid>,
    ) -> Result<Chat, Error> {
        let chat = Chat {
            id: Uuid::new_v4(),
            client_id,
            professional_id,
            status: ChatStatus::Active,
            reservation_id: None,
            created_at: Self::now(),
        };
        let mut tables = self.tables.lock().unwrap();
        tables.chats.insert(chat.id, chat.clone());
        Ok(chat)
    }

    async fn get_chat(&self, chat_id: Uuid) -> Result<Option<Chat>, Error> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.chats.get(&chat_id).cloned())
    }

    async fn list_chats_for_user(&self, user_id: Uuid) -> Result<Vec<Chat>, Error> {
        let tables = self.tables.lock().unwrap();
        let mut chats: Vec<Chat> = tables
            .chats
            .values()
            .filter(|c| c.client_id == user_id || c.professional_id == Some(user_id))
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(chats)
    }

    async fn try_mark_chat_converted(&self, chat_id: Uuid) -> Result<bool, Error> {
        let mut tables = self.tables.lock().unwrap();
        match tables.chats.get_mut(&chat_id) {
            Some(chat) if chat.status == ChatStatus::Active => {
                chat.status = ChatStatus::Converted;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_chat_reservation(
        &self,
        chat_id: Uuid,
        reservation_id: Uuid,
    ) -> Result<(), Error> {
        let mut tables = self.tables.lock().unwrap();
        match tables.chats.get_mut(&chat_id) {
            Some(chat) => {
                chat.reservation_id = Some(reservation_id);
                Ok(())
            }
            None => Err(Error::RowNotFound),
        }
    }

    async fn create_chat_message(
        &self,
        chat_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, Error> {
        let message = Message {
            id: Uuid::new_v4(),
            chat_id: Some(chat_id),
            reservation_id: None,
            sender_id,
            content,
            created_at: Self::now(),
        };
        let mut tables = self.tables.lock().unwrap();
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn create_reservation_message(
        &self,
        reservation_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, Error> {
        let message = Message {
            id: Uuid::new_v4(),
            chat_id: None,
            reservation_id: Some(reservation_id),
            sender_id,
            content,
            created_at: Self::now(),
        };
        let mut tables = self.tables.lock().unwrap();
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn list_chat_messages(&self, chat_id: Uuid) -> Result<Vec<Message>, Error> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.chat_id == Some(chat_id))
            .cloned()
            .collect())
    }

    async fn list_reservation_messages(
        &self,
        reservation_id: Uuid,
    ) -> Result<Vec<Message>, Error> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.reservation_id == Some(reservation_id))
            .cloned()
            .collect())
    }

    async fn count_chat_messages(&self, chat_id: Uuid) -> Result<i64, Error> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .messages
            .iter()
            .filter(|m| m.chat_id == Some(chat_id))
            .count() as i64)
    }

    async fn reparent_chat_messages(
        &self,
        chat_id: Uuid,
        reservation_id: Uuid,
    ) -> Result<u64, Error> {
        let mut tables = self.tables.lock().unwrap();
        let mut reparented = 0;
        for message in tables
            .messages
            .iter_mut()
            .filter(|m| m.chat_id == Some(chat_id))
        {
            message.reservation_id = Some(reservation_id);
            reparented += 1;
        }
        Ok(reparented)
    }
}

#[async_trait]
impl ReviewExt for MemoryStore {
    async fn create_review(
        &self,
        reservation_id: Uuid,
        client_id: Uuid,
        professional_id: Option<Uuid>,
        rating: i32,
        comment: String,
    ) -> Result<Review, Error> {
        let mut tables = self.tables.lock().unwrap();
        if tables.reviews.contains_key(&reservation_id) {
            // Stand-in for the UNIQUE index on reviews.reservation_id.
            return Err(Error::Protocol(format!(
                "duplicate review for reservation {reservation_id}"
            )));
        }
        let review = Review {
            id: Uuid::new_v4(),
            reservation_id,
            client_id,
            professional_id,
            rating,
            comment,
            created_at: Self::now(),
        };
        tables.reviews.insert(reservation_id, review.clone());
        Ok(review)
    }

    async fn get_review_by_reservation(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<Review>, Error> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.reviews.get(&reservation_id).cloned())
    }

    async fn list_reviews_for_professional(
        &self,
        professional_id: Uuid,
    ) -> Result<Vec<Review>, Error> {
        let tables = self.tables.lock().unwrap();
        let mut reviews: Vec<Review> = tables
            .reviews
            .values()
            .filter(|r| r.professional_id == Some(professional_id))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }
}
