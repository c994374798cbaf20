//! Header and page introduction.

use leptos::*;

use crate::Workflow;

#[component]
pub fn Header(
    /// Currently selected workflow
    workflow: ReadSignal<Workflow>,
) -> impl IntoView {
    view! {
        <header>
            <div class="header-left">
                <a href="#" class="logo">"SALESBOOK"</a>
                <span class="badge">{move || workflow.get().value()}</span>
            </div>
        </header>
        <div class="hero">
            <h1>"POS exports to Excel"</h1>
            <p class="subtitle">
                "Turn daily transaction files (CSV/TXT) into one workbook, "
                "one sheet per business date, with net sales and totals beside the data."
            </p>
        </div>
    }
}
