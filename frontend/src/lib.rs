//! Salesbook - Frontend Rust/Leptos Application
//!
//! A WebAssembly page for turning POS transaction exports into Excel
//! workbooks through the salesbook backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Header (title, selected workflow)                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MainContent                                                 │
//! │  ├── WorkflowPanel (inputs, process, clear)                  │
//! │  └── LogsPanel (SSE)                                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Footer                                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`] - Common types (Workflow, LogEntry, AppError)
//! - [`components`] - UI components
//! - [`services`] - Backend communication and downloads

use leptos::*;
use leptos_meta::*;
use leptos_router::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod components;
pub mod config;
pub mod services;
pub mod types;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::*;

// Types
pub use types::{
    // Logs
    LogEntry, LogLevel,
    // Workflows
    Workflow,
    // API
    ErrorBody,
    // Errors
    AppError, AppResult,
};

// Components
pub use components::*;

// Services
pub use services::*;

// =============================================================================
// Application
// =============================================================================

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="Salesbook"/>
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=MainContent/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn MainContent() -> impl IntoView {
    let (workflow, set_workflow) = create_signal(Workflow::default());
    let (logs, set_logs) = create_signal(Vec::<LogEntry>::new());

    // Initialize SSE connection ONCE at app startup
    init_sse_logs(set_logs);

    view! {
        <Header workflow=workflow/>

        <div class="container">
            <WorkflowPanel workflow=workflow set_workflow=set_workflow set_logs=set_logs/>
            <LogsPanel logs=logs set_logs=set_logs/>
        </div>

        <Footer/>
    }
}
