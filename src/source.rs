//! External chat source boundary: paged history access, push events, and
//! tolerant decoding of push payloads.

#[cfg(test)]
#[path = "source_test.rs"]
mod source_test;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::model::{ChatMessage, MessageId, MessageKind};

/// Error returned by [`ChatSource::fetch_older`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The chat service rejected or failed the request.
    #[error("chat service request failed: {reason}")]
    Service { reason: String },
    /// The source is no longer connected.
    #[error("chat source disconnected")]
    Disconnected,
}

/// Push notification from the chat source.
#[derive(Clone, Debug)]
pub enum ChatEvent {
    /// A new message was appended to the conversation.
    MessageAdded(ChatMessage),
    /// An existing message changed in place (send status, edit, delete).
    MessageUpdated(ChatMessage),
}

/// Paged history access to the external chat source.
///
/// `before` is the id of the oldest loaded message; `None` requests the
/// newest page. Pages come back ordered oldest-first, matching the
/// conversation's creation-timestamp order.
pub trait ChatSource: Send + Sync {
    /// Fetch the page of messages older than `before`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the service fails the request or the
    /// source is disconnected.
    fn fetch_older(
        &self,
        before: Option<MessageId>,
        page_size: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, FetchError>> + Send;
}

/// Decode a push payload into a message.
///
/// Payloads follow the chat service's event JSON. Unknown or missing
/// secondary fields fall back to defaults; a payload without an id or a
/// parseable timestamp is dropped (`None`) rather than surfaced as an error.
#[must_use]
pub fn message_from_value(data: &Value) -> Option<ChatMessage> {
    let id = data.get("id").and_then(Value::as_str)?.to_owned();

    let created_on = data
        .get("created_on")
        .or_else(|| data.get("ts"))
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<DateTime<Utc>>().ok())?;

    let sender_id = data
        .get("sender_id")
        .and_then(Value::as_str)
        .or_else(|| data.get("from").and_then(Value::as_str))
        .unwrap_or("unknown")
        .to_owned();

    let sender_name = data
        .get("sender_name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();

    let kind = data
        .get("type")
        .or_else(|| data.get("kind"))
        .and_then(|v| serde_json::from_value::<MessageKind>(v.clone()).ok())
        .unwrap_or(MessageKind::Text);

    let content = data
        .get("content")
        .or_else(|| data.get("message"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);

    Some(ChatMessage {
        id,
        sender_id,
        sender_name,
        created_on,
        kind,
        content,
        deleted_on: parse_timestamp(data, "deleted_on"),
        edited_on: parse_timestamp(data, "edited_on"),
        send_status: data
            .get("send_status")
            .and_then(|v| serde_json::from_value(v.clone()).ok()),
        is_local: data.get("is_local").and_then(Value::as_bool).unwrap_or(false),
    })
}

fn parse_timestamp(data: &Value, key: &str) -> Option<DateTime<Utc>> {
    data.get(key)
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<DateTime<Utc>>().ok())
}
