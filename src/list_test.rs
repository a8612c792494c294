use chrono::{DateTime, TimeZone, Utc};

use super::*;
use crate::model::SendStatus;
use crate::render::{Template, select_template};
use crate::status::{StatusIcon, StatusTint};

const BASE: i64 = 1_700_000_000;

// =============================================================
// Helpers
// =============================================================

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn remote(id: &str, sender: &str, secs: i64) -> ChatMessage {
    ChatMessage {
        id: id.to_owned(),
        sender_id: sender.to_owned(),
        sender_name: sender.to_owned(),
        created_on: ts(secs),
        kind: MessageKind::Text,
        content: Some("hello".to_owned()),
        deleted_on: None,
        edited_on: None,
        send_status: None,
        is_local: false,
    }
}

fn local_pending(id: &str, secs: i64) -> ChatMessage {
    let mut msg = remote(id, "me", secs);
    msg.is_local = true;
    msg.send_status = Some(SendStatus::Pending);
    msg
}

fn test_config() -> ListConfig {
    ListConfig {
        fetch_trigger_threshold: 100.0,
        near_bottom_tolerance: 24.0,
        settle_window: Duration::from_millis(200),
        page_size: 10,
    }
}

fn controller_with(messages: Vec<ChatMessage>) -> MessageListController {
    let mut controller = MessageListController::new(test_config());
    controller.load_initial(messages);
    controller
}

/// Near the loaded top boundary, far from the bottom.
fn top_sample() -> ScrollSample {
    ScrollSample { offset: 50.0, content_height: 1000.0, viewport_height: 300.0 }
}

/// Middle of the content: no fetch trigger, not near the bottom.
fn middle_sample() -> ScrollSample {
    ScrollSample { offset: 400.0, content_height: 1000.0, viewport_height: 300.0 }
}

/// At the very bottom of the content.
fn bottom_sample() -> ScrollSample {
    ScrollSample { offset: 700.0, content_height: 1000.0, viewport_height: 300.0 }
}

fn fetch_actions(actions: &[ListAction]) -> Vec<&ListAction> {
    actions
        .iter()
        .filter(|a| matches!(a, ListAction::FetchOlder { .. }))
        .collect()
}

fn settle_scrolled(controller: &mut MessageListController, sample: ScrollSample) {
    let t0 = Instant::now();
    controller.handle_scroll(sample, t0);
    controller.handle_settle_elapsed(t0 + Duration::from_millis(250));
}

// =============================================================
// Initial load
// =============================================================

#[test]
fn load_initial_pins_and_scrolls_to_last() {
    let mut controller = MessageListController::new(test_config());
    assert!(controller.show_activity_indicator());

    let actions =
        controller.load_initial(vec![remote("m1", "a", BASE), remote("m2", "b", BASE + 60)]);
    assert_eq!(actions, vec![ListAction::ScrollToIndex(1)]);
    assert_eq!(controller.state(), ListState::PinnedToBottom);
    assert!(!controller.show_activity_indicator());
}

#[test]
fn load_initial_empty_has_no_scroll_target() {
    let mut controller = MessageListController::new(test_config());
    assert!(controller.load_initial(Vec::new()).is_empty());
    assert!(controller.is_pinned_to_bottom());
}

// =============================================================
// Fetch triggering
// =============================================================

#[test]
fn scroll_near_top_triggers_older_fetch() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE), remote("m2", "b", BASE)]);
    let actions = controller.handle_scroll(top_sample(), Instant::now());

    assert_eq!(
        actions,
        vec![ListAction::FetchOlder {
            before_id: Some("m1".to_owned()),
            page_size: 10,
            generation: 1,
        }]
    );
    assert_eq!(controller.state(), ListState::Loading);
}

#[test]
fn scroll_away_from_top_does_not_fetch() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE)]);
    let actions = controller.handle_scroll(middle_sample(), Instant::now());
    assert!(fetch_actions(&actions).is_empty());
    assert_eq!(controller.state(), ListState::ScrollSettling);
}

#[test]
fn scroll_while_loading_is_a_noop_fetch() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE)]);
    controller.handle_scroll(top_sample(), Instant::now());
    assert_eq!(controller.state(), ListState::Loading);

    // Still loading: a second near-top scroll must not start another fetch.
    let actions = controller.handle_scroll(top_sample(), Instant::now());
    assert!(actions.is_empty());
    assert_eq!(controller.state(), ListState::Loading);
    assert_eq!(controller.fetch_generation(), 1);
}

#[test]
fn empty_window_does_not_fetch() {
    let mut controller = controller_with(Vec::new());
    let actions = controller.handle_scroll(top_sample(), Instant::now());
    assert!(fetch_actions(&actions).is_empty());
}

// =============================================================
// Fetch completion
// =============================================================

#[test]
fn fetch_result_prepends_preserving_order() {
    let mut controller = controller_with(vec![remote("m3", "a", BASE + 120)]);
    controller.handle_scroll(top_sample(), Instant::now());

    let page = vec![remote("m1", "a", BASE), remote("m2", "b", BASE + 60)];
    let actions = controller.handle_fetch_result(1, Ok(page));

    assert_eq!(actions, vec![ListAction::PreserveAnchor { prepended: 2 }]);
    let ids: Vec<&str> = controller.messages().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m1", "m2", "m3"]);
    assert_eq!(controller.state(), ListState::Idle);
}

#[test]
fn fetch_result_repins_when_user_was_at_bottom() {
    let mut controller = controller_with(vec![remote("m2", "a", BASE)]);
    // Short content: near the top trigger and near the bottom at once.
    let sample = ScrollSample { offset: 10.0, content_height: 320.0, viewport_height: 300.0 };
    controller.handle_scroll(sample, Instant::now());
    assert_eq!(controller.state(), ListState::Loading);

    controller.handle_fetch_result(1, Ok(vec![remote("m1", "a", BASE - 60)]));
    assert_eq!(controller.state(), ListState::PinnedToBottom);
}

#[test]
fn stale_generation_completion_is_ignored() {
    let mut controller = controller_with(vec![remote("m2", "a", BASE)]);
    controller.handle_scroll(top_sample(), Instant::now());

    let actions = controller.handle_fetch_result(99, Ok(vec![remote("m1", "a", BASE - 60)]));
    assert!(actions.is_empty());
    assert_eq!(controller.messages().len(), 1);
    assert_eq!(controller.state(), ListState::Loading);
}

#[test]
fn completion_without_pending_fetch_is_ignored() {
    let mut controller = controller_with(vec![remote("m2", "a", BASE)]);
    let actions = controller.handle_fetch_result(0, Ok(vec![remote("m1", "a", BASE - 60)]));
    assert!(actions.is_empty());
    assert_eq!(controller.messages().len(), 1);
}

#[test]
fn completion_after_deactivate_is_ignored() {
    let mut controller = controller_with(vec![remote("m2", "a", BASE)]);
    controller.handle_scroll(top_sample(), Instant::now());
    controller.deactivate();

    let actions = controller.handle_fetch_result(1, Ok(vec![remote("m1", "a", BASE - 60)]));
    assert!(actions.is_empty());
    assert_eq!(controller.messages().len(), 1);
}

#[test]
fn fetch_failure_returns_to_idle_and_allows_retry() {
    let mut controller = controller_with(vec![remote("m2", "a", BASE)]);
    controller.handle_scroll(top_sample(), Instant::now());

    let actions =
        controller.handle_fetch_result(1, Err(FetchError::Service { reason: "503".into() }));
    assert!(actions.is_empty());
    assert_eq!(controller.state(), ListState::Idle);
    assert_eq!(controller.messages().len(), 1);

    // A later scroll near the top re-triggers the fetch.
    let actions = controller.handle_scroll(top_sample(), Instant::now());
    assert_eq!(fetch_actions(&actions).len(), 1);
    assert_eq!(controller.fetch_generation(), 2);
}

#[test]
fn empty_page_exhausts_history() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE)]);
    controller.handle_scroll(top_sample(), Instant::now());
    let actions = controller.handle_fetch_result(1, Ok(Vec::new()));
    assert!(actions.is_empty());

    let actions = controller.handle_scroll(top_sample(), Instant::now());
    assert!(fetch_actions(&actions).is_empty());
}

// =============================================================
// New message arrival
// =============================================================

#[test]
fn new_message_while_pinned_scrolls_to_new_last_index() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE)]);
    assert!(controller.is_pinned_to_bottom());

    let actions = controller.handle_message_added(remote("m2", "b", BASE + 60));
    assert_eq!(actions, vec![ListAction::ScrollToIndex(1)]);
    assert!(!controller.show_jump_to_new_messages());
}

#[test]
fn new_message_while_unpinned_shows_affordance_only() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE)]);
    settle_scrolled(&mut controller, middle_sample());
    assert_eq!(controller.state(), ListState::Idle);

    let actions = controller.handle_message_added(remote("m2", "b", BASE + 60));
    assert!(actions.is_empty());
    assert!(controller.show_jump_to_new_messages());
    assert_eq!(controller.jump_to_new_messages_label(), "1 new message");

    controller.handle_message_added(remote("m3", "b", BASE + 120));
    assert_eq!(controller.jump_to_new_messages_label(), "2 new messages");
}

#[test]
fn jump_action_scrolls_clears_and_pins() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE)]);
    settle_scrolled(&mut controller, middle_sample());
    controller.handle_message_added(remote("m2", "b", BASE + 60));

    let actions = controller.jump_to_new_messages();
    assert_eq!(actions, vec![ListAction::ScrollToIndex(1)]);
    assert!(!controller.show_jump_to_new_messages());
    assert!(controller.is_pinned_to_bottom());
}

// =============================================================
// Settle evaluation
// =============================================================

#[test]
fn settle_before_deadline_is_a_noop() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE)]);
    let t0 = Instant::now();
    controller.handle_scroll(middle_sample(), t0);
    controller.handle_settle_elapsed(t0 + Duration::from_millis(50));
    assert_eq!(controller.state(), ListState::ScrollSettling);
}

#[test]
fn settle_near_bottom_pins_and_clears_unread() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE)]);
    settle_scrolled(&mut controller, middle_sample());
    controller.handle_message_added(remote("m2", "b", BASE + 60));
    assert!(controller.show_jump_to_new_messages());

    settle_scrolled(&mut controller, bottom_sample());
    assert!(controller.is_pinned_to_bottom());
    assert!(!controller.show_jump_to_new_messages());
}

#[test]
fn settle_away_from_bottom_goes_idle() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE)]);
    settle_scrolled(&mut controller, middle_sample());
    assert_eq!(controller.state(), ListState::Idle);
}

// =============================================================
// Per-row queries
// =============================================================

#[test]
fn row_flags_use_previous_row() {
    let controller =
        controller_with(vec![remote("m1", "a", BASE), remote("m2", "a", BASE + 60)]);
    let first = controller.row_flags_at(0).unwrap();
    let second = controller.row_flags_at(1).unwrap();
    assert!(first.show_date_header);
    assert!(!second.show_date_header);
    assert!(second.is_consecutive);
    assert!(controller.row_flags_at(2).is_none());
}

#[test]
fn status_indicator_moves_to_newer_local_text() {
    let mut controller = controller_with(vec![local_pending("m1", BASE)]);
    assert!(controller.status_indicator_at(0).is_some());

    controller.handle_message_added(local_pending("m2", BASE + 60));
    assert!(controller.status_indicator_at(0).is_none());
    assert!(controller.status_indicator_at(1).is_some());
}

#[test]
fn message_update_transitions_send_status_in_place() {
    let mut controller = controller_with(vec![local_pending("m1", BASE)]);

    let mut failed = local_pending("m1", BASE);
    failed.send_status = Some(SendStatus::Failed);
    controller.handle_message_updated(failed);

    let indicator = controller.status_indicator_at(0).unwrap();
    assert_eq!(indicator.icon, StatusIcon::SendFailed);
    assert_eq!(indicator.tint, StatusTint::Danger);
}

#[test]
fn message_update_with_unknown_id_is_dropped() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE)]);
    controller.handle_message_updated(remote("ghost", "a", BASE));
    assert_eq!(controller.messages().len(), 1);
    assert_eq!(controller.messages()[0].id, "m1");
}

#[test]
fn message_update_deletion_hides_template() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE)]);

    let mut deleted = remote("m1", "a", BASE);
    deleted.deleted_on = Some(ts(BASE + 10));
    deleted.content = None;
    controller.handle_message_updated(deleted);

    assert_eq!(select_template(&controller.messages()[0]), Template::Hidden);
}

// =============================================================
// Read receipts
// =============================================================

#[test]
fn read_receipt_follows_newest_remote_while_pinned() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE)]);
    assert_eq!(controller.read_receipt_candidate().map(String::as_str), Some("m1"));

    controller.handle_message_added(remote("m2", "b", BASE + 60));
    assert_eq!(controller.read_receipt_candidate().map(String::as_str), Some("m2"));
}

#[test]
fn read_receipt_holds_while_scrolled_away() {
    let mut controller = controller_with(vec![remote("m1", "a", BASE)]);
    settle_scrolled(&mut controller, middle_sample());

    controller.handle_message_added(remote("m2", "b", BASE + 60));
    assert_eq!(controller.read_receipt_candidate().map(String::as_str), Some("m1"));

    controller.jump_to_new_messages();
    assert_eq!(controller.read_receipt_candidate().map(String::as_str), Some("m2"));
}

// =============================================================
// Config
// =============================================================

#[test]
fn config_defaults_are_sane() {
    let config = ListConfig::default();
    assert!(config.fetch_trigger_threshold > 0.0);
    assert!(config.near_bottom_tolerance > 0.0);
    assert!(config.page_size > 0);
    assert!(config.settle_window > Duration::ZERO);
}
