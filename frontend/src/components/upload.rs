//! Workflow panel: picker, file inputs, title, process and clear buttons.
//!
//! Inputs a workflow does not use are disabled. Processing posts everything
//! to the backend and starts the browser download of the returned workbook.

use leptos::html::Input;
use leptos::*;
use web_sys::File;

use super::logs::add_log;
use crate::services::{process_files, trigger_download, ProcessInput};
use crate::{LogEntry, LogLevel, Workflow, BACKEND_URL, SOURCE_ACCEPT, WORKBOOK_ACCEPT};

/// Outcome message shown under the buttons.
#[derive(Clone, Debug, PartialEq)]
enum Status {
    Idle,
    Working(String),
    Done(String),
    Failed(String),
}

fn selected_files(input: NodeRef<Input>) -> Vec<File> {
    input
        .get_untracked()
        .and_then(|el| el.files())
        .map(|list| (0..list.length()).filter_map(|i| list.get(i)).collect())
        .unwrap_or_default()
}

fn reset_input(input: NodeRef<Input>) {
    if let Some(el) = input.get_untracked() {
        el.set_value("");
    }
}

#[component]
pub fn WorkflowPanel(
    workflow: ReadSignal<Workflow>,
    set_workflow: WriteSignal<Workflow>,
    set_logs: WriteSignal<Vec<LogEntry>>,
) -> impl IntoView {
    let (title, set_title) = create_signal(String::new());
    let (status, set_status) = create_signal(Status::Idle);
    let is_working = move || matches!(status.get(), Status::Working(_));

    let workbook_input = create_node_ref::<Input>();
    let primary_input = create_node_ref::<Input>();
    let secondary_input = create_node_ref::<Input>();

    let on_workflow_change = move |ev: web_sys::Event| {
        let value = event_target_value(&ev);
        match value.parse::<Workflow>() {
            Ok(selected) => set_workflow.set(selected),
            Err(e) => log::warn!("{}", e),
        }
    };

    let on_process = move |_| {
        let current = workflow.get_untracked();
        let input = ProcessInput {
            workflow: current,
            title: title.get_untracked(),
            workbook: selected_files(workbook_input).into_iter().next().filter(|_| current.uses_workbook()),
            primary: if current.uses_primary() { selected_files(primary_input) } else { Vec::new() },
            secondary: if current.uses_secondary() { selected_files(secondary_input) } else { Vec::new() },
        };

        if let Err(e) = input.validate() {
            set_status.set(Status::Failed(e.to_string()));
            return;
        }

        set_status.set(Status::Working(format!("⏳ Running {}...", current.value())));
        add_log(set_logs, LogLevel::Info, &format!("📤 Sending files for {}...", current.value()));

        spawn_local(async move {
            match process_files(&input, BACKEND_URL).await {
                Ok(workbook) => {
                    let size_kb = workbook.bytes.len() as f64 / 1024.0;
                    match trigger_download(&workbook) {
                        Ok(()) => {
                            add_log(
                                set_logs,
                                LogLevel::Success,
                                &format!("✅ {} downloaded ({:.1} KB)", workbook.file_name, size_kb),
                            );
                            set_status.set(Status::Done(format!("Saved {}", workbook.file_name)));
                        }
                        Err(e) => {
                            add_log(set_logs, LogLevel::Error, &format!("❌ {}", e));
                            set_status.set(Status::Failed(e.to_string()));
                        }
                    }
                }
                Err(e) => {
                    add_log(set_logs, LogLevel::Error, &format!("❌ {}", e));
                    set_status.set(Status::Failed(e.to_string()));
                }
            }
        });
    };

    let on_clear = move |_| {
        reset_input(workbook_input);
        reset_input(primary_input);
        reset_input(secondary_input);
        set_title.set(String::new());
        set_status.set(Status::Idle);
        set_logs.set(Vec::new());
    };

    view! {
        <div class="upload-section">
            <label class="field">
                <span class="field-label">"Workflow"</span>
                <select on:change=on_workflow_change prop:disabled=is_working>
                    {Workflow::ALL
                        .into_iter()
                        .map(|w| view! {
                            <option value=w.value() selected=move || workflow.get() == w>
                                {w.label()}
                            </option>
                        })
                        .collect_view()}
                </select>
            </label>

            <label class="field" class:disabled=move || !workflow.get().uses_workbook()>
                <span class="field-label">"Excel workbook"</span>
                <input
                    type="file"
                    accept=WORKBOOK_ACCEPT
                    node_ref=workbook_input
                    prop:disabled=move || !workflow.get().uses_workbook()
                />
            </label>

            <label class="field" class:disabled=move || !workflow.get().uses_primary()>
                <span class="field-label">"Main CSV/TXT files"</span>
                <input
                    type="file"
                    accept=SOURCE_ACCEPT
                    multiple=true
                    node_ref=primary_input
                    prop:disabled=move || !workflow.get().uses_primary()
                />
            </label>

            <label class="field" class:disabled=move || !workflow.get().uses_secondary()>
                <span class="field-label">"EOD CSV/TXT files"</span>
                <input
                    type="file"
                    accept=SOURCE_ACCEPT
                    multiple=true
                    node_ref=secondary_input
                    prop:disabled=move || !workflow.get().uses_secondary()
                />
            </label>

            <label class="field">
                <span class="field-label">"Output title"</span>
                <input
                    type="text"
                    placeholder=move || workflow.get().default_title()
                    prop:value=move || title.get()
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                />
            </label>

            <div class="actions">
                <button class="upload-button" on:click=on_process prop:disabled=is_working>
                    "Process"
                </button>
                <button class="logs-clear" on:click=on_clear prop:disabled=is_working>
                    "Clear"
                </button>
            </div>

            {move || match status.get() {
                Status::Idle => view! { <div></div> }.into_view(),
                Status::Working(msg) => view! { <div class="upload-hint">{msg}</div> }.into_view(),
                Status::Done(msg) => view! { <div class="success-message">{msg}</div> }.into_view(),
                Status::Failed(msg) => view! { <div class="error-message">{msg}</div> }.into_view(),
            }}
        </div>
    }
}
