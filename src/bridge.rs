//! Tokio glue between the chat source and the panel.
//!
//! One task owns the panel and is the single place its state mutates. Host
//! inputs (scroll samples, push events, taps) arrive on an mpsc queue; fetch
//! completions are funneled back through the same task tagged with their
//! generation, so a completion that lands after the user scrolled away or
//! after shutdown is a no-op rather than a race. Snapshots go out over a
//! `watch` channel, one-shot actions (scroll targets, anchor fixes) over an
//! mpsc channel.

#[cfg(test)]
#[path = "bridge_test.rs"]
mod bridge_test;

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, watch};

use crate::list::{ListAction, ListConfig};
use crate::model::ChatMessage;
use crate::panel::{ChatPanel, PanelSnapshot};
use crate::scroll::ScrollSample;
use crate::source::{ChatEvent, ChatSource, FetchError};

/// Input accepted by the panel task.
#[derive(Debug)]
pub enum PanelInput {
    /// Initial history page from the host.
    InitialMessages(Vec<ChatMessage>),
    /// Scroll sample from the host view.
    Scroll(ScrollSample),
    /// Push event from the chat source.
    Chat(ChatEvent),
    /// The user tapped the jump-to-new-messages affordance.
    JumpToNewMessages,
    /// The view is being torn down.
    Shutdown,
}

/// Handle held by the host while the panel task runs.
pub struct PanelHandle {
    input_tx: mpsc::UnboundedSender<PanelInput>,
    snapshot_rx: watch::Receiver<PanelSnapshot>,
    action_rx: mpsc::UnboundedReceiver<ListAction>,
}

impl PanelHandle {
    /// Queue an input for the panel task.
    ///
    /// Returns `false` if the task has already shut down.
    pub fn send(&self, input: PanelInput) -> bool {
        self.input_tx.send(input).is_ok()
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> PanelSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Wait until the snapshot changes. Returns `false` once the panel task
    /// has shut down.
    pub async fn changed(&mut self) -> bool {
        self.snapshot_rx.changed().await.is_ok()
    }

    /// Next one-shot action for the host to apply, or `None` after shutdown.
    pub async fn next_action(&mut self) -> Option<ListAction> {
        self.action_rx.recv().await
    }
}

/// Spawn the panel event loop on the current tokio runtime.
pub fn spawn_panel<S>(source: Arc<S>, config: ListConfig) -> PanelHandle
where
    S: ChatSource + 'static,
{
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (action_tx, action_rx) = mpsc::unbounded_channel();

    let mut panel = ChatPanel::new(config);
    let (snapshot_tx, snapshot_rx) = watch::channel(panel.snapshot().clone());
    panel.subscribe(move |snapshot| {
        let _ = snapshot_tx.send(snapshot.clone());
    });

    tokio::spawn(panel_loop(panel, source, input_rx, action_tx));

    PanelHandle { input_tx, snapshot_rx, action_rx }
}

async fn panel_loop<S>(
    mut panel: ChatPanel,
    source: Arc<S>,
    mut input_rx: mpsc::UnboundedReceiver<PanelInput>,
    action_tx: mpsc::UnboundedSender<ListAction>,
) where
    S: ChatSource + 'static,
{
    type FetchCompletion = (u64, Result<Vec<ChatMessage>, FetchError>);
    let (fetch_tx, mut fetch_rx) = mpsc::unbounded_channel::<FetchCompletion>();

    loop {
        let settle_deadline = panel.settle_deadline();

        let actions = tokio::select! {
            maybe_input = input_rx.recv() => {
                let Some(input) = maybe_input else { break };
                match input {
                    PanelInput::InitialMessages(messages) => panel.load_initial(messages),
                    PanelInput::Scroll(sample) => panel.handle_scroll(sample, Instant::now()),
                    PanelInput::Chat(event) => panel.handle_event(event),
                    PanelInput::JumpToNewMessages => panel.jump_to_new_messages(),
                    PanelInput::Shutdown => break,
                }
            }
            Some((generation, result)) = fetch_rx.recv() => {
                panel.handle_fetch_result(generation, result)
            }
            () = sleep_until_deadline(settle_deadline), if settle_deadline.is_some() => {
                panel.handle_settle_elapsed(Instant::now())
            }
        };

        for action in actions {
            match action {
                ListAction::FetchOlder { before_id, page_size, generation } => {
                    let source = Arc::clone(&source);
                    let fetch_tx = fetch_tx.clone();
                    tokio::spawn(async move {
                        let result = source.fetch_older(before_id, page_size).await;
                        let _ = fetch_tx.send((generation, result));
                    });
                }
                other => {
                    if action_tx.send(other).is_err() {
                        tracing::debug!("action receiver dropped");
                    }
                }
            }
        }
    }

    panel.deactivate();
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}
