//! Footer component

use leptos::*;

use crate::BACKEND_URL;

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer>
            <div>
                "Salesbook v" {env!("CARGO_PKG_VERSION")} " • Powered by "
                <span class="rust-badge">"🦀 Rust + Leptos"</span>
            </div>
            <div class="footer-links">
                <a href=format!("{}/health", BACKEND_URL) class="footer-link" target="_blank">"Backend status"</a>
            </div>
        </footer>
    }
}
