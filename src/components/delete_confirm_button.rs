//! Delete Task Button
//!
//! Two-step delete for the details panel. The write is only issued after
//! the second click.

use leptos::prelude::*;

/// Shows "Hapus tugas", then asks for confirmation with the task title
#[component]
pub fn DeleteConfirmButton(
    #[prop(into)] task_title: String,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let (armed, set_armed) = signal(false);
    let prompt = format!("Hapus \"{}\" untuk semua admin cabang?", task_title);

    view! {
        {move || {
            if armed.get() {
                view! {
                    <div class="task-delete-confirm" role="alertdialog">
                        <p class="task-delete-prompt">{prompt.clone()}</p>
                        <button
                            class="task-delete-yes"
                            on:click=move |_| {
                                set_armed.set(false);
                                on_confirm.run(());
                            }
                        >
                            "Ya, hapus"
                        </button>
                        <button class="task-delete-no" on:click=move |_| set_armed.set(false)>
                            "Batal"
                        </button>
                    </div>
                }
                    .into_any()
            } else {
                view! {
                    <button class="task-delete" on:click=move |_| set_armed.set(true)>
                        "Hapus tugas"
                    </button>
                }
                    .into_any()
            }
        }}
    }
}
