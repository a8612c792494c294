//! Message records as consumed from the external chat source.
//!
//! Records are created upstream — optimistically when the local user sends,
//! or when a remote event arrives — and mutated in place afterwards
//! (send-status transitions, edits, deletion marks). They are never removed
//! from the loaded window, only marked deleted.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Stable unique identifier for a message. Assigned by the chat service, or
/// generated locally for optimistic entries.
pub type MessageId = String;

/// Kind tag for a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Plain text authored by a participant.
    Text,
    /// HTML-bodied message authored by a participant.
    Html,
    /// System event: participants joined the conversation.
    ParticipantsAdded,
    /// System event: participants left or were removed.
    ParticipantsRemoved,
    /// System event: the conversation topic changed.
    TopicUpdated,
}

impl MessageKind {
    /// Whether this kind carries participant-authored content.
    #[must_use]
    pub fn is_content(self) -> bool {
        matches!(self, Self::Text | Self::Html)
    }

    /// Whether this kind renders as a system event line.
    #[must_use]
    pub fn is_system(self) -> bool {
        !self.is_content()
    }
}

/// Delivery lifecycle of a locally originated message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    /// Accepted locally, not yet acknowledged by the service.
    Pending,
    /// Acknowledged by the service.
    Sent,
    /// The service rejected the message or the send timed out.
    Failed,
}

/// A single message in the loaded conversation window.
///
/// Messages are totally ordered by `created_on` within a conversation; list
/// presentation relies on that order matching index order. `send_status` is
/// only meaningful when `is_local` is true and `kind` is [`MessageKind::Text`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender_id: String,
    pub sender_name: String,
    pub created_on: DateTime<Utc>,
    pub kind: MessageKind,
    /// Body text; `None` once the message is deleted.
    pub content: Option<String>,
    pub deleted_on: Option<DateTime<Utc>>,
    pub edited_on: Option<DateTime<Utc>>,
    pub send_status: Option<SendStatus>,
    pub is_local: bool,
}

impl ChatMessage {
    /// Create an optimistic local text entry with a fresh id and a `Pending`
    /// send status.
    #[must_use]
    pub fn local_text(
        sender_id: String,
        sender_name: String,
        content: String,
        created_on: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender_id,
            sender_name,
            created_on,
            kind: MessageKind::Text,
            content: Some(content),
            deleted_on: None,
            edited_on: None,
            send_status: Some(SendStatus::Pending),
            is_local: true,
        }
    }

    /// Day-of-year of creation, used for date-header boundaries between rows.
    #[must_use]
    pub fn day_of_year(&self) -> u32 {
        self.created_on.ordinal()
    }

    /// Whether the message has been deleted upstream.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_on.is_some()
    }

    /// Whether the message has non-blank body text.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}
