//! Headless presentation logic for an embeddable chat message panel.
//!
//! The panel consumes an external chat source (paged history plus a push
//! stream of message events) and exposes everything a host UI needs to render
//! a message list: per-row presentation flags, send-status decoration, scroll
//! pinning, and a "jump to new messages" affordance. No rendering happens
//! here; hosts bind to [`panel::PanelSnapshot`] updates and apply the
//! [`list::ListAction`]s the controller emits.
//!
//! Layering, leaves first: `model` (message records) → `render` / `status`
//! (per-row decisions) → `scroll` (debounced scroll tracking) → `list` (the
//! paging / pinning state machine) → `panel` (observable composite surface)
//! → `bridge` (tokio event loop around a [`source::ChatSource`]).

pub mod bridge;
pub mod diagnostics;
pub mod list;
pub mod model;
pub mod panel;
pub mod render;
pub mod scroll;
pub mod signal;
pub mod source;
pub mod status;
