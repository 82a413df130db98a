//! Application Context
//!
//! Shared state provided via Leptos Context API.

use chrono::NaiveDate;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use live_view::console::{Console, Dispatch, TaskIntent};
use live_view::domain::{Scope, Task};
use live_view::projection::TypeFilter;

use crate::store::{store_dismiss_notice, store_push_notice, store_set_board, store_set_history, ConsoleStore};

/// How long a notice stays up
const NOTICE_MS: u32 = 5_000;

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    console: StoredValue<Console, LocalStorage>,
    store: ConsoleStore,
    /// Bumped when the history filter changes - read
    pub filter_version: ReadSignal<u32>,
    set_filter_version: WriteSignal<u32>,
}

impl AppContext {
    pub fn new(console: StoredValue<Console, LocalStorage>, store: ConsoleStore) -> Self {
        let (filter_version, set_filter_version) = signal(0u32);
        Self {
            console,
            store,
            filter_version,
            set_filter_version,
        }
    }

    pub fn scope(&self) -> Option<Scope> {
        self.console.with_value(|c| c.scope().cloned())
    }

    pub fn user_name(&self) -> String {
        self.console
            .with_value(|c| c.session().map(|s| s.name.clone()))
            .unwrap_or_default()
    }

    pub fn can_create(&self) -> bool {
        self.console.with_value(|c| c.tasks.can_create())
    }

    pub fn can_edit(&self, task: &Task) -> bool {
        self.console.with_value(|c| c.tasks.can_edit(task))
    }

    /// Run a board intent; local rejections become notices
    pub fn dispatch(&self, intent: TaskIntent) -> Option<Dispatch> {
        let result = self.console.try_update_value(|c| c.tasks.dispatch(intent))?;
        match result {
            Ok(dispatch) => Some(dispatch),
            Err(e) => {
                log::warn!("[APP] {}", e);
                self.notify(e.to_string());
                None
            }
        }
    }

    pub fn history_filter_date(&self) -> Option<NaiveDate> {
        self.console.with_value(|c| c.history.filter().date)
    }

    pub fn history_filter_type(&self) -> TypeFilter {
        self.console.with_value(|c| c.history.filter().broadcast_type)
    }

    pub fn history_filter_active(&self) -> bool {
        self.console.with_value(|c| c.history.filter().is_active())
    }

    pub fn shows_branch_column(&self) -> bool {
        self.console.with_value(|c| c.history.shows_branch_column())
    }

    pub fn set_history_date(&self, date: Option<NaiveDate>) {
        self.console.update_value(|c| c.history.set_date(date));
        self.refresh_history();
    }

    pub fn set_history_type(&self, broadcast_type: TypeFilter) {
        self.console.update_value(|c| c.history.set_type(broadcast_type));
        self.refresh_history();
    }

    pub fn clear_history_filters(&self) {
        self.console.update_value(|c| c.history.clear_filters());
        self.refresh_history();
    }

    /// Re-project the board into the store
    pub fn refresh_tasks(&self) {
        let Some((board, live)) = self.console.try_with_value(|c| (c.tasks.board(), c.tasks.live())) else {
            return;
        };
        store_set_board(
            &self.store,
            board,
            live.is_loading,
            live.error.map(|e| e.to_string()),
        );
    }

    /// Re-filter the activity log into the store
    pub fn refresh_history(&self) {
        let Some((entries, live)) = self.console.try_with_value(|c| (c.history.entries(), c.history.live())) else {
            return;
        };
        store_set_history(
            &self.store,
            entries,
            live.is_loading,
            live.error.map(|e| e.to_string()),
        );
        self.set_filter_version.update(|v| *v += 1);
    }

    /// Show a notice and dismiss it after a while
    pub fn notify(&self, message: String) {
        let store = self.store;
        let id = store_push_notice(&store, message);
        spawn_local(async move {
            TimeoutFuture::new(NOTICE_MS).await;
            store_dismiss_notice(&store, id);
        });
    }

    pub fn dismiss(&self, id: u32) {
        store_dismiss_notice(&self.store, id);
    }

    pub fn close(&self) {
        self.console.update_value(|c| c.close());
    }
}
