//! NAVIGA Console Frontend App
//!
//! Opens the live views for the cached session and mirrors them into the
//! store while the page is mounted.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use tokio::sync::broadcast::error::RecvError;

use live_view::console::Console;

use crate::commands::{BridgeCollection, BridgeTransport, LeptosSpawner};
use crate::components::{ErrorBanner, HistoryLogView, TaskBoardView};
use crate::context::AppContext;
use crate::session::{load_config, BrowserSession};
use crate::store::{ConsoleState, ConsoleStore};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tab {
    Tasks,
    History,
}

#[component]
pub fn App() -> impl IntoView {
    let config = load_config();
    let console = Console::open(
        &config,
        &BrowserSession,
        Rc::new(BridgeCollection),
        Rc::new(BridgeTransport),
        Rc::new(LeptosSpawner),
    );

    let mut tasks_rx = console.tasks.watch();
    let mut history_rx = console.history.watch();
    let mut errors_rx = console.errors.subscribe();

    let store: ConsoleStore = Store::new(ConsoleState::default());
    let ctx = AppContext::new(StoredValue::new_local(console), store);
    provide_context(store);
    provide_context(ctx);

    // Mirror task snapshots
    spawn_local(async move {
        loop {
            let _ = tasks_rx.borrow_and_update();
            ctx.refresh_tasks();
            if tasks_rx.changed().await.is_err() {
                break;
            }
        }
    });

    // Mirror history snapshots
    spawn_local(async move {
        loop {
            let _ = history_rx.borrow_and_update();
            ctx.refresh_history();
            if history_rx.changed().await.is_err() {
                break;
            }
        }
    });

    // Failed writes
    spawn_local(async move {
        loop {
            match errors_rx.recv().await {
                Ok(error) => ctx.notify(error.to_string()),
                Err(RecvError::Lagged(skipped)) => log::warn!("[APP] Missed {} error notices", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    on_cleanup(move || ctx.close());

    let (tab, set_tab) = signal(Tab::Tasks);
    let scope_label = ctx
        .scope()
        .map(|scope| scope.label().to_string())
        .unwrap_or_else(|| "-".to_string());

    view! {
        <div class="app-layout">
            <header class="title-bar">
                <h1>"NAVIGA"</h1>
                <span class="session">{ctx.user_name()} " · " {scope_label}</span>
                <nav class="tabs">
                    <button
                        class=move || if tab.get() == Tab::Tasks { "tab active" } else { "tab" }
                        on:click=move |_| set_tab.set(Tab::Tasks)
                    >
                        "Tugas"
                    </button>
                    <button
                        class=move || if tab.get() == Tab::History { "tab active" } else { "tab" }
                        on:click=move |_| set_tab.set(Tab::History)
                    >
                        "Riwayat Broadcast"
                    </button>
                </nav>
            </header>

            <ErrorBanner />

            // Both stay mounted; the board's drag handlers live on the document
            <main class="main-content">
                <section class:hidden=move || tab.get() != Tab::Tasks>
                    <TaskBoardView />
                </section>
                <section class:hidden=move || tab.get() != Tab::History>
                    <HistoryLogView />
                </section>
            </main>
        </div>
    }
}
