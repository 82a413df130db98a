//! History Log Component
//!
//! Broadcast activity table with day and type filters.

use leptos::prelude::*;

use live_view::domain::{BroadcastType, HistoryEntry, TemplateTone};
use live_view::projection::TypeFilter;
use live_view::validation::parse_history_date;

use crate::context::AppContext;
use crate::store::{self, use_console_store};

fn tone_class(tone: TemplateTone) -> &'static str {
    match tone {
        TemplateTone::Auction => "template-badge auction",
        TemplateTone::Overdue => "template-badge overdue",
        TemplateTone::Reminder => "template-badge reminder",
    }
}

#[component]
pub fn HistoryLogView() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let console_store = use_console_store();
    let show_branch = ctx.shows_branch_column();

    let date_value = move || {
        ctx.filter_version.get();
        ctx.history_filter_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };
    let type_value = move || {
        ctx.filter_version.get();
        ctx.history_filter_type().value()
    };
    let filter_active = move || {
        ctx.filter_version.get();
        ctx.history_filter_active()
    };

    let on_date = move |ev: web_sys::Event| match parse_history_date(&event_target_value(&ev)) {
        Ok(date) => ctx.set_history_date(date),
        Err(e) => ctx.notify(e.to_string()),
    };
    let on_type = move |ev: web_sys::Event| match TypeFilter::parse(&event_target_value(&ev)) {
        Ok(filter) => ctx.set_history_type(filter),
        Err(e) => ctx.notify(e.to_string()),
    };

    view! {
        <div class="history-log">
            <div class="history-filters">
                <input type="date" prop:value=date_value on:change=on_date />
                <select prop:value=type_value on:change=on_type>
                    <option value="all">"Semua Tipe"</option>
                    {BroadcastType::ALL
                        .iter()
                        .map(|t| view! { <option value=t.label()>{t.label()}</option> })
                        .collect_view()}
                </select>
                <Show when=filter_active>
                    <button class="clear-filters" on:click=move |_| ctx.clear_history_filters()>
                        "Hapus Filter"
                    </button>
                </Show>
            </div>

            <Show when=move || store::history_status(&console_store).0>
                <p class="loading">"Memuat riwayat..."</p>
            </Show>
            {move || store::history_status(&console_store).1.map(|e| view! { <p class="live-error">{e}</p> })}

            <table class="history-table">
                <thead>
                    <tr>
                        <th>"Waktu"</th>
                        <th>"Nasabah"</th>
                        <th>"Tipe"</th>
                        <th>"Status"</th>
                        <th>"Template"</th>
                        <th>"Admin"</th>
                        {show_branch.then(|| view! { <th>"Cabang"</th> })}
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || store::history(&console_store)
                        key=|entry: &HistoryEntry| entry.id.clone()
                        children=move |entry: HistoryEntry| view! { <HistoryRow entry=entry show_branch=show_branch /> }
                    />
                </tbody>
            </table>
            <Show when=move || store::history(&console_store).is_empty() && !store::history_status(&console_store).0>
                <p class="empty">"Tidak ada riwayat untuk filter ini."</p>
            </Show>
        </div>
    }
}

#[component]
fn HistoryRow(entry: HistoryEntry, show_branch: bool) -> impl IntoView {
    let when = entry
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%d %b %Y %H:%M")
        .to_string();
    let identifier = entry.customer_identifier().map(str::to_string);
    let tone = tone_class(entry.template_tone());
    let branch = entry.upc.to_string();

    view! {
        <tr>
            <td>{when}</td>
            <td>
                <span class="customer-name">{entry.customer_name.clone()}</span>
                {identifier.map(|id| view! { <span class="customer-id">{id}</span> })}
            </td>
            <td>{entry.broadcast_type.label()}</td>
            <td>{entry.status.label()}</td>
            <td><span class=tone>{entry.template.clone()}</span></td>
            <td>{entry.admin_user.clone()}</td>
            {show_branch.then(|| view! { <td>{branch}</td> })}
        </tr>
    }
}
