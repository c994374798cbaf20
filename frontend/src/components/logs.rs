//! Real-time log streaming using Server-Sent Events (SSE).
//!
//! Connects to the backend's `/api/logs` endpoint and displays
//! processing logs in real-time with auto-scroll support.

use leptos::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{EventSource, MessageEvent};

use crate::{LogEntry, LogLevel, BACKEND_URL, MAX_LOG_ENTRIES};

/// Request animation frame helper for smooth scrolling
fn request_animation_frame(f: impl FnOnce() + 'static) {
    let closure = Closure::once(f);
    let Some(window) = web_sys::window() else {
        return;
    };
    if window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .is_ok()
    {
        closure.forget();
    }
}

fn local_time(timestamp: Option<&str>) -> String {
    timestamp
        .and_then(|t| chrono::DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&chrono::Local))
        .unwrap_or_else(chrono::Local::now)
        .format("%H:%M:%S")
        .to_string()
}

/// Parse an SSE payload from the backend into a display entry
pub fn parse_sse_log(json: &str) -> Option<LogEntry> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    let level = match value.get("level")?.as_str()? {
        "success" => LogLevel::Success,
        "warning" => LogLevel::Warning,
        "error" => LogLevel::Error,
        _ => LogLevel::Info,
    };
    let message = value.get("message")?.as_str()?.to_string();
    let indent = value
        .get("indent")
        .and_then(|i| i.as_u64())
        .map(|i| i.min(u8::MAX as u64) as u8)
        .unwrap_or(0);

    Some(LogEntry {
        level,
        message,
        indent,
        timestamp: local_time(value.get("timestamp").and_then(|t| t.as_str())),
    })
}

/// Append an entry, dropping the oldest beyond the cap.
pub fn push_log(set_logs: WriteSignal<Vec<LogEntry>>, entry: LogEntry) {
    set_logs.update(|logs| {
        logs.push(entry);
        if logs.len() > MAX_LOG_ENTRIES {
            let excess = logs.len() - MAX_LOG_ENTRIES;
            logs.drain(..excess);
        }
    });
}

/// Log a message produced by the page itself.
pub fn add_log(set_logs: WriteSignal<Vec<LogEntry>>, level: LogLevel, message: &str) {
    push_log(
        set_logs,
        LogEntry {
            level,
            message: message.to_string(),
            indent: 0,
            timestamp: local_time(None),
        },
    );
    log::info!("{}", message);
}

/// Start SSE connection to receive real-time logs
/// Should be called ONCE at app startup
pub fn init_sse_logs(set_logs: WriteSignal<Vec<LogEntry>>) {
    let sse_url = format!("{}/api/logs", BACKEND_URL);

    let event_source = match EventSource::new(&sse_url) {
        Ok(es) => es,
        Err(e) => {
            log::error!("Failed to create EventSource: {:?}", e);
            return;
        }
    };

    let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Some(entry) = event.data().as_string().and_then(|data| parse_sse_log(&data)) {
            push_log(set_logs, entry);
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    event_source.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    let onopen = Closure::wrap(Box::new(move |_: web_sys::Event| {
        log::info!("📡 SSE connected to logs stream");
    }) as Box<dyn FnMut(web_sys::Event)>);
    event_source.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    onopen.forget();

    let onerror = Closure::wrap(Box::new(move |_: web_sys::Event| {
        log::warn!("SSE connection error - will auto-reconnect");
    }) as Box<dyn FnMut(web_sys::Event)>);
    event_source.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    // Lives for the whole page
    std::mem::forget(event_source);

    log::info!("📡 SSE log stream initialized");
}

/// Real-time logs panel component (display only, SSE is initialized elsewhere)
#[component]
pub fn LogsPanel(
    logs: ReadSignal<Vec<LogEntry>>,
    set_logs: WriteSignal<Vec<LogEntry>>,
) -> impl IntoView {
    let logs_container = create_node_ref::<leptos::html::Div>();

    // Keep the newest entry in view
    create_effect(move |_| {
        let _ = logs.get();
        if let Some(container) = logs_container.get() {
            request_animation_frame(move || {
                container.set_scroll_top(container.scroll_height());
            });
        }
    });

    view! {
        <div class="logs-panel">
            <div class="logs-header">
                <span class="logs-title">"📋 Processing Logs"</span>
                <button
                    class="logs-clear"
                    on:click=move |_| set_logs.set(vec![])
                >
                    "Clear"
                </button>
            </div>
            <div class="logs-content" node_ref=logs_container>
                <Show
                    when=move || !logs.get().is_empty()
                    fallback=|| view! { <div class="log-entry log-info">"No activity yet."</div> }
                >
                    <For
                        each=move || logs.get().into_iter().enumerate()
                        key=|(i, entry)| (*i, entry.timestamp.clone())
                        children=move |(_, entry)| {
                            let padding = format!("padding-left: {}em", entry.indent as u32 * 2);
                            view! {
                                <div class=format!("log-entry {}", entry.level.css_class()) style=padding>
                                    <span class="log-time">"[" {entry.timestamp.clone()} "] "</span>
                                    {entry.message.clone()}
                                </div>
                            }
                        }
                    />
                </Show>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_entry() {
        let entry = parse_sse_log(
            r#"{"level":"success","message":"Loaded 2 sheet(s)","indent":1,"timestamp":"2024-01-15T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(entry.level, LogLevel::Success);
        assert_eq!(entry.message, "Loaded 2 sheet(s)");
        assert_eq!(entry.indent, 1);
        assert_eq!(entry.timestamp.len(), 8);
    }

    #[test]
    fn test_unknown_level_is_info() {
        let entry = parse_sse_log(r#"{"level":"debug","message":"x"}"#).unwrap();
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.indent, 0);
    }

    #[test]
    fn test_invalid_payload() {
        assert!(parse_sse_log("keep-alive").is_none());
        assert!(parse_sse_log(r#"{"level":"info"}"#).is_none());
    }
}
