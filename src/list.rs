//! Message list controller: paged history window, scroll pinning, and the
//! jump-to-new-messages affordance.
//!
//! DESIGN
//! ======
//! Event-in, actions-out: handlers mutate controller state and return
//! [`ListAction`]s for the host to apply (start a fetch, move the scroll
//! position, re-anchor after a prepend). All mutation happens on the host's
//! event thread. The only concurrency concern is a fetch completing late —
//! after the panel was torn down or after a newer fetch started — which is
//! rejected by generation instead of cancelled.
//!
//! At most one fetch is in flight, guarded by [`ListState::Loading`]; a
//! scroll that would trigger another fetch while one is pending is a no-op.
//! A fetch failure returns the controller to `Idle` untouched; retry happens
//! on the next scroll that crosses the trigger threshold.

#[cfg(test)]
#[path = "list_test.rs"]
mod list_test;

use std::time::{Duration, Instant};

use crate::model::{ChatMessage, MessageId, MessageKind};
use crate::render::{RowFlags, row_flags};
use crate::scroll::{ScrollSample, ScrollTracker};
use crate::source::FetchError;
use crate::status::{StatusIndicator, status_indicator};

const DEFAULT_FETCH_TRIGGER_THRESHOLD: f64 = 200.0;
const DEFAULT_NEAR_BOTTOM_TOLERANCE: f64 = 24.0;
const DEFAULT_SETTLE_WINDOW_MS: u64 = 200;
const DEFAULT_PAGE_SIZE: usize = 50;

/// Tuning knobs for the list controller.
#[derive(Clone, Copy, Debug)]
pub struct ListConfig {
    /// Distance from the top of the content below which the next older page
    /// is requested.
    pub fetch_trigger_threshold: f64,
    /// Distance from the bottom within which the view counts as pinned.
    pub near_bottom_tolerance: f64,
    /// Quiet period after the last scroll sample before the gesture counts
    /// as settled.
    pub settle_window: Duration,
    /// Number of messages requested per older page.
    pub page_size: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            fetch_trigger_threshold: DEFAULT_FETCH_TRIGGER_THRESHOLD,
            near_bottom_tolerance: DEFAULT_NEAR_BOTTOM_TOLERANCE,
            settle_window: Duration::from_millis(DEFAULT_SETTLE_WINDOW_MS),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListConfig {
    /// Build from environment overrides, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fetch_trigger_threshold: env_parse(
                "CHATPANEL_FETCH_TRIGGER_THRESHOLD",
                defaults.fetch_trigger_threshold,
            ),
            near_bottom_tolerance: env_parse(
                "CHATPANEL_NEAR_BOTTOM_TOLERANCE",
                defaults.near_bottom_tolerance,
            ),
            settle_window: Duration::from_millis(env_parse(
                "CHATPANEL_SETTLE_WINDOW_MS",
                DEFAULT_SETTLE_WINDOW_MS,
            )),
            page_size: env_parse("CHATPANEL_PAGE_SIZE", defaults.page_size),
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Scroll/fetch state of the loaded window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListState {
    /// Nothing in flight; the view rests away from the bottom.
    Idle,
    /// An older-page fetch is in flight.
    Loading,
    /// The user scrolled recently; waiting for the settle window to elapse.
    ScrollSettling,
    /// The view is anchored to the newest message.
    #[default]
    PinnedToBottom,
}

/// Actions returned from event handlers for the host to apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListAction {
    /// Request the page of messages older than `before_id` from the source.
    /// `generation` identifies the fetch for completion matching.
    FetchOlder {
        before_id: Option<MessageId>,
        page_size: usize,
        generation: u64,
    },
    /// Move the viewport so `index` is the last visible row.
    ScrollToIndex(usize),
    /// Keep the pre-fetch anchor row visually fixed after `prepended` rows
    /// were inserted above it.
    PreserveAnchor { prepended: usize },
}

/// Controller for the loaded window of an externally paginated conversation.
pub struct MessageListController {
    config: ListConfig,
    messages: Vec<ChatMessage>,
    state: ListState,
    tracker: ScrollTracker,
    unread_count: usize,
    fetch_generation: u64,
    pinned_before_fetch: bool,
    history_exhausted: bool,
    initial_loaded: bool,
    active: bool,
    newest_local_text: Option<MessageId>,
    read_receipt_candidate: Option<MessageId>,
}

impl MessageListController {
    #[must_use]
    pub fn new(config: ListConfig) -> Self {
        Self {
            tracker: ScrollTracker::new(config.settle_window, config.near_bottom_tolerance),
            config,
            messages: Vec::new(),
            state: ListState::PinnedToBottom,
            unread_count: 0,
            fetch_generation: 0,
            pinned_before_fetch: false,
            history_exhausted: false,
            initial_loaded: false,
            active: true,
            newest_local_text: None,
            read_receipt_candidate: None,
        }
    }

    // --- Event handlers ---

    /// Seed the window with the initial (newest) history page and anchor the
    /// view to the bottom.
    pub fn load_initial(&mut self, messages: Vec<ChatMessage>) -> Vec<ListAction> {
        self.messages = messages;
        self.initial_loaded = true;
        self.state = ListState::PinnedToBottom;
        self.recompute_newest_local_text();
        self.mark_read_up_to_newest();

        match self.last_index() {
            Some(last) => vec![ListAction::ScrollToIndex(last)],
            None => Vec::new(),
        }
    }

    /// Record a scroll sample. Restarts the settle timer and, when the view
    /// is near the loaded top boundary, starts an older-page fetch.
    pub fn handle_scroll(&mut self, sample: ScrollSample, now: Instant) -> Vec<ListAction> {
        if !self.active {
            return Vec::new();
        }

        self.tracker.record_at(sample, now);
        if self.state != ListState::Loading {
            self.state = ListState::ScrollSettling;
        }

        if !self.should_fetch() {
            return Vec::new();
        }

        self.pinned_before_fetch = self.tracker.is_near_bottom();
        self.fetch_generation += 1;
        self.state = ListState::Loading;
        tracing::debug!(
            generation = self.fetch_generation,
            loaded = self.messages.len(),
            "older-page fetch triggered"
        );

        vec![ListAction::FetchOlder {
            before_id: self.messages.first().map(|m| m.id.clone()),
            page_size: self.config.page_size,
            generation: self.fetch_generation,
        }]
    }

    /// Apply a fetch completion. Stale completions — wrong generation, no
    /// fetch pending, or the controller deactivated — are no-ops.
    pub fn handle_fetch_result(
        &mut self,
        generation: u64,
        result: Result<Vec<ChatMessage>, FetchError>,
    ) -> Vec<ListAction> {
        if !self.active || self.state != ListState::Loading || generation != self.fetch_generation
        {
            tracing::debug!(generation, "ignoring stale fetch completion");
            return Vec::new();
        }

        match result {
            Ok(page) => {
                if page.is_empty() {
                    self.history_exhausted = true;
                }
                let prepended = page.len();
                self.messages.splice(0..0, page);
                self.recompute_newest_local_text();
                self.state = if self.pinned_before_fetch {
                    ListState::PinnedToBottom
                } else {
                    ListState::Idle
                };

                if prepended > 0 {
                    vec![ListAction::PreserveAnchor { prepended }]
                } else {
                    Vec::new()
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "older-page fetch failed");
                self.state = ListState::Idle;
                Vec::new()
            }
        }
    }

    /// Apply a new-message push event.
    pub fn handle_message_added(&mut self, message: ChatMessage) -> Vec<ListAction> {
        if !self.active {
            return Vec::new();
        }

        if message.is_local && message.kind == MessageKind::Text {
            self.newest_local_text = Some(message.id.clone());
        }
        self.messages.push(message);

        if self.state == ListState::PinnedToBottom {
            self.mark_read_up_to_newest();
            match self.last_index() {
                Some(last) => vec![ListAction::ScrollToIndex(last)],
                None => Vec::new(),
            }
        } else {
            self.unread_count += 1;
            Vec::new()
        }
    }

    /// Apply an in-place update (send status, edit, delete) by id. Unknown
    /// ids are dropped.
    pub fn handle_message_updated(&mut self, message: ChatMessage) -> Vec<ListAction> {
        if !self.active {
            return Vec::new();
        }

        if let Some(existing) = self.messages.iter_mut().find(|m| m.id == message.id) {
            *existing = message;
            self.recompute_newest_local_text();
        }
        Vec::new()
    }

    /// Evaluate the settle timer. When the gesture has settled, near-bottom
    /// proximity decides pinned vs idle; a pending fetch defers the decision
    /// to its completion.
    pub fn handle_settle_elapsed(&mut self, now: Instant) -> Vec<ListAction> {
        if !self.active || !self.tracker.is_settled_at(now) {
            return Vec::new();
        }
        self.tracker.clear_settle();

        if self.state == ListState::Loading {
            return Vec::new();
        }

        if self.tracker.is_near_bottom() {
            self.state = ListState::PinnedToBottom;
            self.unread_count = 0;
            self.mark_read_up_to_newest();
        } else {
            self.state = ListState::Idle;
        }
        Vec::new()
    }

    /// The user tapped the jump-to-new-messages affordance.
    pub fn jump_to_new_messages(&mut self) -> Vec<ListAction> {
        if !self.active {
            return Vec::new();
        }

        self.unread_count = 0;
        self.state = ListState::PinnedToBottom;
        self.mark_read_up_to_newest();

        match self.last_index() {
            Some(last) => vec![ListAction::ScrollToIndex(last)],
            None => Vec::new(),
        }
    }

    /// The host view is being torn down; every later event (including an
    /// in-flight fetch completion) becomes a no-op.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    // --- Queries ---

    /// The loaded message window, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn state(&self) -> ListState {
        self.state
    }

    #[must_use]
    pub fn is_pinned_to_bottom(&self) -> bool {
        self.state == ListState::PinnedToBottom
    }

    /// Whether the jump-to-new-messages affordance is visible.
    #[must_use]
    pub fn show_jump_to_new_messages(&self) -> bool {
        self.unread_count > 0 && self.state != ListState::PinnedToBottom
    }

    /// Label for the jump affordance, carrying the unread count.
    #[must_use]
    pub fn jump_to_new_messages_label(&self) -> String {
        match self.unread_count {
            1 => "1 new message".to_owned(),
            n => format!("{n} new messages"),
        }
    }

    /// Whether the host should show a full-screen activity indicator (the
    /// initial page has not arrived yet).
    #[must_use]
    pub fn show_activity_indicator(&self) -> bool {
        !self.initial_loaded
    }

    /// Presentation flags for the row at `index`.
    #[must_use]
    pub fn row_flags_at(&self, index: usize) -> Option<RowFlags> {
        let message = self.messages.get(index)?;
        let previous = index.checked_sub(1).and_then(|i| self.messages.get(i));
        Some(row_flags(message, previous))
    }

    /// Send-status indicator for the row at `index`, applying the
    /// newest-local-text-message visibility rule.
    #[must_use]
    pub fn status_indicator_at(&self, index: usize) -> Option<StatusIndicator> {
        let message = self.messages.get(index)?;
        let is_newest = self.newest_local_text.as_ref() == Some(&message.id);
        status_indicator(message, is_newest)
    }

    /// Newest remote message the user has seen; the host posts a read
    /// receipt for it.
    #[must_use]
    pub fn read_receipt_candidate(&self) -> Option<&MessageId> {
        self.read_receipt_candidate.as_ref()
    }

    /// Deadline for the pending settle evaluation, if any.
    #[must_use]
    pub fn settle_deadline(&self) -> Option<Instant> {
        self.tracker.settle_deadline()
    }

    /// Generation of the most recently issued fetch.
    #[must_use]
    pub fn fetch_generation(&self) -> u64 {
        self.fetch_generation
    }

    // --- Internal ---

    fn should_fetch(&self) -> bool {
        self.initial_loaded
            && !self.history_exhausted
            && self.state != ListState::Loading
            && !self.messages.is_empty()
            && self.tracker.distance_from_top() < self.config.fetch_trigger_threshold
    }

    fn last_index(&self) -> Option<usize> {
        self.messages.len().checked_sub(1)
    }

    fn recompute_newest_local_text(&mut self) {
        self.newest_local_text = self
            .messages
            .iter()
            .rev()
            .find(|m| m.is_local && m.kind == MessageKind::Text)
            .map(|m| m.id.clone());
    }

    /// The bottom of the list is on screen: every remote message up to the
    /// newest counts as read.
    fn mark_read_up_to_newest(&mut self) {
        if let Some(newest_remote) = self.messages.iter().rev().find(|m| !m.is_local) {
            self.read_receipt_candidate = Some(newest_remote.id.clone());
        }
    }
}
