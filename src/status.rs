//! Send-status decoration for locally originated text messages.

#[cfg(test)]
#[path = "status_test.rs"]
mod status_test;

use crate::model::{ChatMessage, MessageKind, SendStatus};

/// Icon identifier the host maps to its asset set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusIcon {
    /// Outbound, not yet acknowledged.
    Sending,
    /// Acknowledged by the service.
    SendSuccess,
    /// Rejected or timed out.
    SendFailed,
}

/// Tint the host maps to its palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTint {
    Primary,
    Danger,
}

/// Resolved send-status indicator for one row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusIndicator {
    pub icon: StatusIcon,
    pub tint: StatusTint,
}

/// Derive the indicator for a row.
///
/// Only the newest local text message in the list shows an indicator; the
/// caller supplies that list-level fact as `is_newest_local_text`. Remote
/// rows, system rows, and rows without a send status never show one.
#[must_use]
pub fn status_indicator(
    message: &ChatMessage,
    is_newest_local_text: bool,
) -> Option<StatusIndicator> {
    if !message.is_local || message.kind != MessageKind::Text || !is_newest_local_text {
        return None;
    }

    let indicator = match message.send_status? {
        SendStatus::Pending => StatusIndicator {
            icon: StatusIcon::Sending,
            tint: StatusTint::Primary,
        },
        SendStatus::Sent => StatusIndicator {
            icon: StatusIcon::SendSuccess,
            tint: StatusTint::Primary,
        },
        SendStatus::Failed => StatusIndicator {
            icon: StatusIcon::SendFailed,
            tint: StatusTint::Danger,
        },
    };

    Some(indicator)
}
