// service/chat_service.rs
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::error::EngagementError;
use crate::db::chatdb::ChatExt;
use crate::db::servicedb::ServiceExt;
use crate::db::userdb::UserExt;
use crate::dtos::chatdtos::ConvertChatDto;
use crate::models::chatmodel::*;
use crate::models::servicemodel::*;
use crate::models::usermodel::UserRole;

/// Informal chats and their one-way promotion into reservations.
#[derive(Debug)]
pub struct ChatService<S> {
    store: Arc<S>,
}

impl<S> Clone for ChatService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConvertChatResult {
    pub request: ServiceRequest,
    pub reservation: Reservation,
    pub messages_reparented: u64,
}

impl<S> ChatService<S>
where
    S: ChatExt + ServiceExt + UserExt + Send + Sync,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn start_chat(
        &self,
        client_id: Uuid,
        professional_id: Option<Uuid>,
    ) -> Result<Chat, EngagementError> {
        if let Some(professional_id) = professional_id {
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
                    entity: "chat",
                    id: client_id,
                });
            }
        }

        let chat = self.store.create_chat(client_id, professional_id).await?;
        tracing::info!(chat_id = %chat.id, client_id = %client_id, "chat started");
        Ok(chat)
    }

    pub async fn list_chats(&self, user_id: Uuid) -> Result<Vec<Chat>, EngagementError> {
        Ok(self.store.list_chats_for_user(user_id).await?)
    }

    pub async fn send_chat_message(
        &self,
        chat_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, EngagementError> {
        let chat = self.require_participant(chat_id, sender_id).await?;

        if chat.status == ChatStatus::Converted {
            // Post-conversion traffic belongs on the reservation thread.
            return Err(EngagementError::AlreadyConverted {
                chat_id,
                reservation_id: chat.reservation_id,
            });
        }

        Ok(self
            .store
            .create_chat_message(chat_id, sender_id, content)
            .await?)
    }

    pub async fn list_chat_messages(
        &self,
        chat_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Message>, EngagementError> {
        self.require_participant(chat_id, user_id).await?;
        Ok(self.store.list_chat_messages(chat_id).await?)
    }

    pub async fn send_reservation_message(
        &self,
        reservation_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, EngagementError> {
        self.require_reservation_party(reservation_id, sender_id)
            .await?;
        Ok(self
            .store
            .create_reservation_message(reservation_id, sender_id, content)
            .await?)
    }

    pub async fn list_reservation_messages(
        &self,
        reservation_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Message>, EngagementError> {
        self.require_reservation_party(reservation_id, user_id)
            .await?;
        Ok(self.store.list_reservation_messages(reservation_id).await?)
    }

    /// Promote a chat into a formal reservation plus a synthetic `in_process`
    /// service request for reporting uniformity.
    ///
    /// The chat is claimed first via the conditional active -> converted
    /// update; only the claim winner creates entities, so replays and races
    /// can never produce a second reservation. Losers get `AlreadyConverted`
    /// carrying the original reservation id.
    pub async fn convert_chat(
        &self,
        chat_id: Uuid,
        client_id: Uuid,
        data: ConvertChatDto,
    ) -> Result<ConvertChatResult, EngagementError> {
        let chat = self
            .store
            .get_chat(chat_id)
            .await?
            .ok_or(EngagementError::NotFound {
                entity: "chat",
                id: chat_id,
            })?;

        if chat.client_id != client_id {
            return Err(EngagementError::Forbidden {
                user_id: client_id,
                entity: "chat",
                id: chat_id,
            });
        }

        if chat.status == ChatStatus::Converted {
            return Err(EngagementError::AlreadyConverted {
                chat_id,
                reservation_id: chat.reservation_id,
            });
        }

        // An empty chat is noise, not an engagement.
        if self.store.count_chat_messages(chat_id).await? == 0 {
            return Err(EngagementError::EmptyChat(chat_id));
        }

        let claimed = self.store.try_mark_chat_converted(chat_id).await?;
        if !claimed {
            let current = self.store.get_chat(chat_id).await?;
            return Err(EngagementError::AlreadyConverted {
                chat_id,
                reservation_id: current.and_then(|c| c.reservation_id),
            });
        }

        // Claim is committed; entity creation below is the second half of the
        // saga. A failure here leaves a converted chat without a reservation,
        // which the error log flags for reconciliation.
        let result = self.create_converted_entities(&chat, data).await;
        if let Err(err) = &result {
            tracing::error!(
                chat_id = %chat_id,
                error = %err,
                "chat claimed for conversion but entity creation failed; needs reconciliation"
            );
        }
        result
    }

    async fn create_converted_entities(
        &self,
        chat: &Chat,
        data: ConvertChatDto,
    ) -> Result<ConvertChatResult, EngagementError> {
        let category = data.category.unwrap_or(ServiceCategory::Other);
        let service_name = data
            .service_name
            .unwrap_or_else(|| category.to_str().to_owned());

        let professional_name = match chat.professional_id {
            Some(id) => self.store.get_user(id).await?.map(|u| u.name),
            None => None,
        };

        let request = self
            .store
            .create_service_request(
                chat.client_id,
                category,
                data.description
                    .unwrap_or_else(|| "Agreed over chat".to_owned()),
                data.location.clone().unwrap_or_default(),
                data.scheduled_start,
                RequestStatus::InProcess,
            )
            .await?;

        let reservation = self
            .store
            .create_reservation(
                Some(request.id),
                chat.client_id,
                chat.professional_id,
                professional_name,
                service_name,
                data.scheduled_start,
                data.scheduled_end,
                data.location.unwrap_or_default(),
                data.client_notes,
            )
            .await?;

        self.store
            .set_chat_reservation(chat.id, reservation.id)
            .await?;

        let messages_reparented = self
            .store
            .reparent_chat_messages(chat.id, reservation.id)
            .await?;

        tracing::info!(
            chat_id = %chat.id,
            reservation_id = %reservation.id,
            messages_reparented,
            "chat converted to reservation"
        );

        Ok(ConvertChatResult {
            request,
            reservation,
            messages_reparented,
        })
    }

    async fn require_participant(
        &self,
        chat_id: Uuid,
        user_id: Uuid,
    ) -> Result<Chat, EngagementError> {
        let chat = self
            .store
            .get_chat(chat_id)
            .await?
            .ok_or(EngagementError::NotFound {
                entity: "chat",
                id: chat_id,
            })?;

        if chat.client_id != user_id && chat.professional_id != Some(user_id) {
            return Err(EngagementError::Forbidden {
                user_id,
                entity: "chat",
                id: chat_id,
            });
        }
        Ok(chat)
    }

    async fn require_reservation_party(
        &self,
        reservation_id: Uuid,
        user_id: Uuid,
    ) -> Result<Reservation, EngagementError> {
        let reservation = self
            .store
            .get_reservation(reservation_id)
            .await?
            .ok_or(EngagementError::NotFound {
                entity: "reservation",
                id: reservation_id,
            })?;

        if reservation.client_id != user_id && reservation.professional_id != Some(user_id) {
            return Err(EngagementError::Forbidden {
                user_id,
                entity: "reservation",
                id: reservation_id,
            });
        }
        Ok(reservation)
    }
}
