//! Task Details Component
//!
//! Side panel for the selected card. Every change is written field by
//! field; the panel re-renders from the next snapshot.

use leptos::prelude::*;

use live_view::console::TaskIntent;
use live_view::domain::{Task, TaskPatch};
use live_view::validation::parse_due_date;

use crate::components::DeleteConfirmButton;
use crate::context::AppContext;
use crate::store::{self, use_console_store};

#[component]
pub fn TaskDetails(
    selected: ReadSignal<Option<String>>,
    set_selected: WriteSignal<Option<String>>,
) -> impl IntoView {
    let console_store = use_console_store();

    // Closes by itself when the task disappears from the snapshot
    let current = move || {
        let id = selected.get()?;
        store::board(&console_store).record(&id).cloned()
    };

    view! {
        {move || current().map(|task| view! { <TaskPanel task=task set_selected=set_selected /> })}
    }
}

#[component]
fn TaskPanel(task: Task, set_selected: WriteSignal<Option<String>>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let can_edit = ctx.can_edit(&task);
    let id = task.id.clone();
    let (new_label, set_new_label) = signal(String::new());

    let update = {
        let id = id.clone();
        move |patch: TaskPatch| {
            ctx.dispatch(TaskIntent::Update {
                task_id: id.clone(),
                patch,
            });
        }
    };

    let on_title = {
        let update = update.clone();
        move |ev: web_sys::Event| {
            update(TaskPatch {
                title: Some(event_target_value(&ev)),
                ..Default::default()
            })
        }
    };

    let on_description = {
        let update = update.clone();
        move |ev: web_sys::Event| {
            let text = event_target_value(&ev);
            let description = if text.trim().is_empty() { None } else { Some(text) };
            update(TaskPatch {
                description: Some(description),
                ..Default::default()
            })
        }
    };

    let on_due_date = {
        let update = update.clone();
        move |ev: web_sys::Event| match parse_due_date(&event_target_value(&ev)) {
            Ok(due_date) => update(TaskPatch {
                due_date: Some(due_date),
                ..Default::default()
            }),
            Err(e) => ctx.notify(e.to_string()),
        }
    };

    let add_label = {
        let id = id.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            let intent = TaskIntent::AddLabel {
                task_id: id.clone(),
                label: new_label.get_untracked(),
            };
            if ctx.dispatch(intent).is_some() {
                set_new_label.set(String::new());
            }
        }
    };

    let delete = {
        let id = id.clone();
        Callback::new(move |_: ()| {
            if ctx.dispatch(TaskIntent::Delete { task_id: id.clone() }).is_some() {
                set_selected.set(None);
            }
        })
    };

    let due_value = task
        .due_date
        .map(|d| d.with_timezone(&chrono::Local).format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let branch = task.upc.to_string();
    let delete_title = task.title.clone();

    view! {
        <aside class="task-details">
            <header>
                <input
                    class="task-title-input"
                    value=task.title.clone()
                    readonly=!can_edit
                    on:change=on_title
                />
                <button class="close-btn" on:click=move |_| set_selected.set(None)>"×"</button>
            </header>
            <p class="task-branch">
                "Tugas untuk " {branch}
                {(!can_edit).then(|| " (Hanya lihat)")}
            </p>

            <label>"Deskripsi"</label>
            <textarea
                placeholder="Tambahkan deskripsi lebih detail..."
                readonly=!can_edit
                prop:value=task.description.clone().unwrap_or_default()
                on:change=on_description
            />

            <label>"Batas Waktu"</label>
            <input type="date" value=due_value disabled=!can_edit on:change=on_due_date />

            <label>"Label"</label>
            <div class="task-labels">
                {task
                    .labels
                    .iter()
                    .map(|label| {
                        let remove_id = id.clone();
                        let remove_label = label.clone();
                        view! {
                            <span class="label-badge">
                                {label.clone()}
                                <Show when=move || can_edit>
                                    <button
                                        class="label-remove"
                                        on:click={
                                            let remove_id = remove_id.clone();
                                            let remove_label = remove_label.clone();
                                            move |_| {
                                                ctx.dispatch(TaskIntent::RemoveLabel {
                                                    task_id: remove_id.clone(),
                                                    label: remove_label.clone(),
                                                });
                                            }
                                        }
                                    >
                                        "×"
                                    </button>
                                </Show>
                            </span>
                        }
                    })
                    .collect_view()}
            </div>

            <Show when=move || can_edit>
                <form class="label-add-form" on:submit=add_label.clone()>
                    <input
                        type="text"
                        placeholder="Label baru..."
                        prop:value=move || new_label.get()
                        on:input=move |ev| set_new_label.set(event_target_value(&ev))
                    />
                    <button type="submit">"+"</button>
                </form>
                <DeleteConfirmButton task_title=delete_title.clone() on_confirm=delete />
            </Show>
        </aside>
    }
}
