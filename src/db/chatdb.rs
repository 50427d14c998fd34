// db/chatdb.rs
use async_trait::async_trait;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::chatmodel::*;

const CHAT_COLUMNS: &str = r#"
    id, client_id, professional_id, status, reservation_id, created_at
"#;

const MESSAGE_COLUMNS: &str = r#"
    id, chat_id, reservation_id, sender_id, content, created_at
"#;

#[async_trait]
pub trait ChatExt {
    async fn create_chat(
        &self,
        client_id: Uuid,
        professional_id: Option<Uuid>,
    ) -> Result<Chat, Error>;

    async fn get_chat(&self, chat_id: Uuid) -> Result<Option<Chat>, Error>;

    async fn list_chats_for_user(&self, user_id: Uuid) -> Result<Vec<Chat>, Error>;

    /// Conditional claim of the chat for conversion (active -> converted).
    /// Exactly one caller ever sees `true` for a given chat.
    async fn try_mark_chat_converted(&self, chat_id: Uuid) -> Result<bool, Error>;

    /// Back-fill the reservation produced by conversion onto the chat row.
    async fn set_chat_reservation(
        &self,
        chat_id: Uuid,
        reservation_id: Uuid,
    ) -> Result<(), Error>;

    async fn create_chat_message(
        &self,
        chat_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, Error>;

    async fn create_reservation_message(
        &self,
        reservation_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, Error>;

    async fn list_chat_messages(&self, chat_id: Uuid) -> Result<Vec<Message>, Error>;

    async fn list_reservation_messages(
        &self,
        reservation_id: Uuid,
    ) -> Result<Vec<Message>, Error>;

    async fn count_chat_messages(&self, chat_id: Uuid) -> Result<i64, Error>;

    /// Set `reservation_id` on every message of the chat, keeping `chat_id`
    /// in place for audit. Returns the number of messages re-parented.
    async fn reparent_chat_messages(
        &self,
        chat_id: Uuid,
        reservation_id: Uuid,
    ) -> Result<u64, Error>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn create_chat(
        &self,
        client_id: Uuid,
        professional_id: Option<Uuid>,
    ) -> Result<Chat, Error> {
        sqlx::query_as::<_, Chat>(&format!(
            r#"
            INSERT INTO chats (client_id, professional_id)
            VALUES ($1, $2)
            RETURNING {CHAT_COLUMNS}
            "#
        ))
        .bind(client_id)
        .bind(professional_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_chat(&self, chat_id: Uuid) -> Result<Option<Chat>, Error> {
        sqlx::query_as::<_, Chat>(&format!(
            r#"
            SELECT {CHAT_COLUMNS}
            FROM chats
            WHERE id = $1
            "#
        ))
        .bind(chat_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_chats_for_user(&self, user_id: Uuid) -> Result<Vec<Chat>, Error> {
        sqlx::query_as::<_, Chat>(&format!(
            r#"
            SELECT {CHAT_COLUMNS}
            FROM chats
            WHERE client_id = $1 OR professional_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn try_mark_chat_converted(&self, chat_id: Uuid) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE chats
            SET status = 'converted'::chat_status
            WHERE id = $1 AND status = 'active'::chat_status
            "#,
        )
        .bind(chat_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_chat_reservation(
        &self,
        chat_id: Uuid,
        reservation_id: Uuid,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE chats
            SET reservation_id = $2
            WHERE id = $1
            "#,
        )
        .bind(chat_id)
        .bind(reservation_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create_chat_message(
        &self,
        chat_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            INSERT INTO messages (chat_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(chat_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_reservation_message(
        &self,
        reservation_id: Uuid,
        sender_id: Uuid,
        content: String,
    ) -> Result<Message, Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            INSERT INTO messages (reservation_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(reservation_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_chat_messages(&self, chat_id: Uuid) -> Result<Vec<Message>, Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE chat_id = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn list_reservation_messages(
        &self,
        reservation_id: Uuid,
    ) -> Result<Vec<Message>, Error> {
        sqlx::query_as::<_, Message>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE reservation_id = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn count_chat_messages(&self, chat_id: Uuid) -> Result<i64, Error> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM messages WHERE chat_id = $1
            "#,
        )
        .bind(chat_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    async fn reparent_chat_messages(
        &self,
        chat_id: Uuid,
        reservation_id: Uuid,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET reservation_id = $2
            WHERE chat_id = $1
            "#,
        )
        .bind(chat_id)
        .bind(reservation_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
