//! Embeddable composite surface: the list controller plus an observable
//! snapshot the host binds to.
//!
//! Every event handler forwards to the controller and then republishes a
//! [`PanelSnapshot`] through a [`Signal`], notifying subscribers
//! synchronously. Per-row queries (flags, indicators, message data) go
//! through [`ChatPanel::controller`] — they are pure reads and don't belong
//! in the snapshot.

#[cfg(test)]
#[path = "panel_test.rs"]
mod panel_test;

use std::time::Instant;

use crate::list::{ListAction, ListConfig, ListState, MessageListController};
use crate::model::{ChatMessage, MessageId};
use crate::scroll::ScrollSample;
use crate::signal::Signal;
use crate::source::ChatEvent;

/// Host-facing view of the panel after the latest event.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanelSnapshot {
    /// Number of messages in the loaded window.
    pub message_count: usize,
    pub state: ListState,
    pub pinned_to_bottom: bool,
    pub show_jump_to_new_messages: bool,
    /// Label for the jump affordance, e.g. `"3 new messages"`.
    pub jump_label: String,
    /// Initial page still loading.
    pub show_activity_indicator: bool,
    /// Newest remote message the user has seen; the host posts a read
    /// receipt for it.
    pub read_receipt_candidate: Option<MessageId>,
}

/// The embeddable chat panel surface.
pub struct ChatPanel {
    controller: MessageListController,
    snapshot: Signal<PanelSnapshot>,
}

impl ChatPanel {
    #[must_use]
    pub fn new(config: ListConfig) -> Self {
        let controller = MessageListController::new(config);
        let snapshot = Signal::new(snapshot_of(&controller));
        Self { controller, snapshot }
    }

    /// Register a snapshot listener; called immediately, then synchronously
    /// after every event that changes the snapshot.
    pub fn subscribe(&mut self, f: impl FnMut(&PanelSnapshot) + Send + 'static) {
        self.snapshot.subscribe(f);
    }

    #[must_use]
    pub fn snapshot(&self) -> &PanelSnapshot {
        self.snapshot.get()
    }

    /// Read access to the controller for per-row queries.
    #[must_use]
    pub fn controller(&self) -> &MessageListController {
        &self.controller
    }

    // --- Events, forwarded to the controller ---

    pub fn load_initial(&mut self, messages: Vec<ChatMessage>) -> Vec<ListAction> {
        let actions = self.controller.load_initial(messages);
        self.publish();
        actions
    }

    pub fn handle_scroll(&mut self, sample: ScrollSample, now: Instant) -> Vec<ListAction> {
        let actions = self.controller.handle_scroll(sample, now);
        self.publish();
        actions
    }

    pub fn handle_settle_elapsed(&mut self, now: Instant) -> Vec<ListAction> {
        let actions = self.controller.handle_settle_elapsed(now);
        self.publish();
        actions
    }

    pub fn handle_event(&mut self, event: ChatEvent) -> Vec<ListAction> {
        let actions = match event {
            ChatEvent::MessageAdded(message) => self.controller.handle_message_added(message),
            ChatEvent::MessageUpdated(message) => self.controller.handle_message_updated(message),
        };
        self.publish();
        actions
    }

    pub fn handle_fetch_result(
        &mut self,
        generation: u64,
        result: Result<Vec<ChatMessage>, crate::source::FetchError>,
    ) -> Vec<ListAction> {
        let actions = self.controller.handle_fetch_result(generation, result);
        self.publish();
        actions
    }

    pub fn jump_to_new_messages(&mut self) -> Vec<ListAction> {
        let actions = self.controller.jump_to_new_messages();
        self.publish();
        actions
    }

    /// Tear down: later events, including in-flight fetch completions, are
    /// no-ops.
    pub fn deactivate(&mut self) {
        self.controller.deactivate();
    }

    /// Deadline for the pending settle evaluation, if any.
    #[must_use]
    pub fn settle_deadline(&self) -> Option<Instant> {
        self.controller.settle_deadline()
    }

    fn publish(&mut self) {
        let next = snapshot_of(&self.controller);
        if *self.snapshot.get() != next {
            self.snapshot.set(next);
        }
    }
}

fn snapshot_of(controller: &MessageListController) -> PanelSnapshot {
    PanelSnapshot {
        message_count: controller.messages().len(),
        state: controller.state(),
        pinned_to_bottom: controller.is_pinned_to_bottom(),
        show_jump_to_new_messages: controller.show_jump_to_new_messages(),
        jump_label: controller.jump_to_new_messages_label(),
        show_activity_indicator: controller.show_activity_indicator(),
        read_receipt_candidate: controller.read_receipt_candidate().cloned(),
    }
}
