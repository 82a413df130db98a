//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The live view
//! owns the data; this store only mirrors what the components render.

use leptos::prelude::*;
use reactive_stores::Store;

use live_view::domain::{HistoryEntry, Task};
use live_view::projection::Board;

/// Notice shown in the banner until dismissed or timed out
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u32,
    pub message: String,
}

/// Rendered console state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct ConsoleState {
    /// Task board projected from the latest snapshot
    pub board: Board<Task>,
    pub tasks_loading: bool,
    pub tasks_error: Option<String>,
    /// Activity log after filtering
    pub history: Vec<HistoryEntry>,
    pub history_loading: bool,
    pub history_error: Option<String>,
    pub notices: Vec<Notice>,
    pub next_notice_id: u32,
}

/// Type alias for the store
pub type ConsoleStore = Store<ConsoleState>;

/// Get the console store from context
pub fn use_console_store() -> ConsoleStore {
    expect_context::<ConsoleStore>()
}

// ========================
// Store Helper Functions
// ========================

pub fn store_set_board(store: &ConsoleStore, board: Board<Task>, loading: bool, error: Option<String>) {
    store.board().set(board);
    store.tasks_loading().set(loading);
    store.tasks_error().set(error);
}

pub fn store_set_history(store: &ConsoleStore, entries: Vec<HistoryEntry>, loading: bool, error: Option<String>) {
    store.history().set(entries);
    store.history_loading().set(loading);
    store.history_error().set(error);
}

/// Queue a notice, returning its id
pub fn store_push_notice(store: &ConsoleStore, message: String) -> u32 {
    let id = store.next_notice_id().get_untracked();
    store.next_notice_id().set(id + 1);
    store.notices().write().push(Notice { id, message });
    id
}

pub fn store_dismiss_notice(store: &ConsoleStore, id: u32) {
    store.notices().write().retain(|notice| notice.id != id);
}

// ========================
// Readers
// ========================

pub fn board(store: &ConsoleStore) -> Board<Task> {
    store.board().get()
}

pub fn tasks_status(store: &ConsoleStore) -> (bool, Option<String>) {
    (store.tasks_loading().get(), store.tasks_error().get())
}

pub fn history(store: &ConsoleStore) -> Vec<HistoryEntry> {
    store.history().get()
}

pub fn history_status(store: &ConsoleStore) -> (bool, Option<String>) {
    (store.history_loading().get(), store.history_error().get())
}

pub fn notices(store: &ConsoleStore) -> Vec<Notice> {
    store.notices().get()
}
