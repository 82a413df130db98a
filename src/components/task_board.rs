//! Task Board Component
//!
//! Kanban columns with mouse drag-and-drop between them.
//! Uses leptos-dragdrop; a drop only issues the status write, the card
//! moves when the next snapshot arrives.

use leptos::prelude::*;

use live_view::console::{Dispatch, TaskIntent};
use live_view::domain::{Task, TaskDraft};
use live_view::DropOutcome;

use crate::components::TaskDetails;
use crate::context::AppContext;
use crate::store::{self, use_console_store};

use leptos_dragdrop::*;

#[component]
pub fn TaskBoardView() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let console_store = use_console_store();

    let dnd = create_dnd_signals();
    let (selected, set_selected) = signal(None::<String>);

    bind_global_handlers(
        dnd,
        move |task_id| {
            ctx.dispatch(TaskIntent::BeginDrag { task_id });
        },
        move |task_id, target| {
            let destination = target.map(|t| t.column_id().to_string());
            log::debug!("[DND] Drop {} on {:?}", task_id, destination);
            if let Some(Dispatch::Dropped(DropOutcome::Denied { .. })) =
                ctx.dispatch(TaskIntent::Drop { destination })
            {
                ctx.notify("Anda hanya dapat memindahkan tugas cabang Anda sendiri.".to_string());
            }
        },
    );

    let columns = move || {
        store::board(&console_store)
            .ordered_columns()
            .map(|c| (c.id.clone(), c.title.clone()))
            .collect::<Vec<_>>()
    };

    view! {
        <div class="task-board">
            <Show when=move || store::tasks_status(&console_store).0>
                <p class="loading">"Memuat tugas..."</p>
            </Show>
            {move || store::tasks_status(&console_store).1.map(|e| view! { <p class="live-error">{e}</p> })}
            <div class="board-columns">
                <For
                    each=columns
                    key=|(id, title)| (id.clone(), title.clone())
                    children=move |(column_id, title)| {
                        view! {
                            <BoardColumn
                                column_id=column_id
                                title=title
                                dnd=dnd
                                set_selected=set_selected
                            />
                        }
                    }
                />
            </div>
            <TaskDetails selected=selected set_selected=set_selected />
        </div>
    }
}

/// One column: header, cards and the add form
#[component]
fn BoardColumn(
    column_id: String,
    title: String,
    dnd: DndSignals,
    set_selected: WriteSignal<Option<String>>,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let console_store = use_console_store();

    let cards_column = column_id.clone();
    let cards = move || {
        store::board(&console_store)
            .cards(&cards_column)
            .into_iter()
            .cloned()
            .collect::<Vec<Task>>()
    };
    let count = {
        let cards = cards.clone();
        move || cards().len()
    };

    let on_mouseenter = make_on_column_mouseenter(dnd, column_id.clone());
    let on_mouseleave = make_on_mouseleave(dnd);
    let target_id = column_id.clone();
    let column_class = move || {
        if dnd.is_target(&target_id) {
            "board-column drop-target"
        } else {
            "board-column"
        }
    };

    view! {
        <section class=column_class on:mouseenter=on_mouseenter on:mouseleave=on_mouseleave>
            <header class="column-header">
                <h2>{title}</h2>
                <span class="column-count">{count}</span>
            </header>
            <div class="column-cards">
                <For
                    each=cards
                    key=|task| {
                        (
                            task.id.clone(),
                            task.title.clone(),
                            task.description.clone(),
                            task.due_date,
                            task.labels.clone(),
                        )
                    }
                    children=move |task| view! { <TaskCard task=task dnd=dnd set_selected=set_selected /> }
                />
            </div>
            <Show when=move || ctx.can_create()>
                <NewTaskForm column_id=column_id.clone() />
            </Show>
        </section>
    }
}

#[component]
fn TaskCard(task: Task, dnd: DndSignals, set_selected: WriteSignal<Option<String>>) -> impl IntoView {
    let id = task.id.clone();
    let on_mousedown = make_on_mousedown(dnd, id.clone());
    let drag_id = id.clone();
    let card_class = move || {
        if dnd.is_dragging(&drag_id) {
            "task-card dragging"
        } else {
            "task-card"
        }
    };
    let due = task.due_date.map(|d| d.with_timezone(&chrono::Local).format("%d %b %Y").to_string());

    view! {
        <article
            class=card_class
            on:mousedown=on_mousedown
            on:click=move |_| {
                // A drag ends with a click on the card; ignore it
                if !dnd.drag_just_ended_read.get_untracked() {
                    set_selected.set(Some(id.clone()));
                }
            }
        >
            <h3 class="task-title">{task.title.clone()}</h3>
            {due.map(|d| view! { <span class="task-due">{d}</span> })}
            <div class="task-labels">
                {task.labels.iter().map(|label| view! { <span class="label-badge">{label.clone()}</span> }).collect_view()}
            </div>
        </article>
    }
}

/// Title-only quick add; details are edited afterwards
#[component]
fn NewTaskForm(column_id: String) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let (new_title, set_new_title) = signal(String::new());

    let create_task = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let intent = TaskIntent::Create {
            column_id: column_id.clone(),
            draft: TaskDraft::new(new_title.get_untracked()),
        };
        if ctx.dispatch(intent).is_some() {
            set_new_title.set(String::new());
        }
    };

    view! {
        <form class="new-task-form" on:submit=create_task>
            <input
                type="text"
                placeholder="Tambah tugas..."
                prop:value=move || new_title.get()
                on:input=move |ev| set_new_title.set(event_target_value(&ev))
            />
            <button type="submit">"+"</button>
        </form>
    }
}
