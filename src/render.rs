//! Per-row rendering decisions for the message list.
//!
//! Each row is decided from `(message, previous_or_none)` alone: date-header
//! boundaries, consecutive-sender grouping, and which sub-template the row
//! renders with. Template dispatch is a match over the message kind, not a
//! view hierarchy.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::model::{ChatMessage, MessageKind};

/// Presentation flags computed for one row from the row above it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowFlags {
    /// A date header is rendered above the row.
    pub show_date_header: bool,
    /// The row continues a run from the same sender.
    pub is_consecutive: bool,
    /// The sender's display name is rendered (remote, non-consecutive rows).
    pub show_username: bool,
    /// The creation time is rendered (non-consecutive rows).
    pub show_time: bool,
}

/// Which sub-template a row renders with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Template {
    /// A message bubble with body text.
    TextBubble,
    /// A centered system event line (participants, topic).
    SystemEvent,
    /// Nothing visible (deleted or empty content).
    Hidden,
}

/// Compute presentation flags for `message` given the row above it.
///
/// The first row in the list always gets a date header and is never
/// consecutive.
#[must_use]
pub fn row_flags(message: &ChatMessage, previous: Option<&ChatMessage>) -> RowFlags {
    let show_date_header =
        previous.is_none_or(|prev| prev.day_of_year() != message.day_of_year());
    let is_consecutive = previous.is_some_and(|prev| prev.sender_id == message.sender_id);

    RowFlags {
        show_date_header,
        is_consecutive,
        show_username: !message.is_local && !is_consecutive,
        show_time: !is_consecutive,
    }
}

/// Select the row template, first match wins.
///
/// Deleted or empty-content text/html messages are suppressed entirely — no
/// visible bubble, regardless of kind.
#[must_use]
pub fn select_template(message: &ChatMessage) -> Template {
    match message.kind {
        MessageKind::Text | MessageKind::Html => {
            if message.is_deleted() || !message.has_content() {
                Template::Hidden
            } else {
                Template::TextBubble
            }
        }
        MessageKind::ParticipantsAdded
        | MessageKind::ParticipantsRemoved
        | MessageKind::TopicUpdated => Template::SystemEvent,
    }
}

/// Human-readable date header label, e.g. `"August 23"`.
#[must_use]
pub fn date_header_label(message: &ChatMessage) -> String {
    message.created_on.format("%B %-d").to_string()
}
