//! Error Banner Component
//!
//! Notices for rejected actions and failed writes. Each one dismisses
//! itself after a few seconds.

use leptos::prelude::*;

use crate::context::AppContext;
use crate::store::{self, use_console_store, Notice};

#[component]
pub fn ErrorBanner() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let console_store = use_console_store();

    view! {
        <div class="notice-stack">
            <For
                each=move || store::notices(&console_store)
                key=|notice: &Notice| notice.id
                children=move |notice: Notice| {
                    let id = notice.id;
                    view! {
                        <div class="notice" role="alert">
                            <span class="notice-text">{notice.message}</span>
                            <button class="notice-close" on:click=move |_| ctx.dismiss(id)>"×"</button>
                        </div>
                    }
                }
            />
        </div>
    }
}
