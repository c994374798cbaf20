//! HTTP server for the salesbook API.
//!
//! The browser page uploads files here and receives the finished workbook.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                              |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/health`         | Health check                             |
//! | POST   | `/api/process`    | Run a workflow, respond with XLSX bytes  |
//! | GET    | `/api/logs`       | SSE stream for real-time logs            |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{
    content_disposition, error_response, status_for, ProcessForm, ProcessSummary, JOB_ID_HEADER,
    XLSX_CONTENT_TYPE,
};
use crate::config::{LayoutOptions, ServerConfig};
use crate::error::{PipelineError, ServerError, ServerResult};
use crate::transform::pipeline::assemble;

type ApiError = (StatusCode, Json<Value>);

/// Build the application router.
pub fn router(config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([
            header::CONTENT_TYPE,
            header::CONTENT_DISPOSITION,
            HeaderName::from_static(JOB_ID_HEADER),
        ]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/process", post(process))
        .route("/api/logs", get(sse_logs))
        .with_state(LayoutOptions::default())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes()))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> ServerResult<()> {
    let app = router(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 Salesbook server running on http://localhost:{}", config.port);
    println!("   POST /api/process - Run a workflow (max upload {} MB)", config.max_upload_mb);
    println!("   GET  /api/logs    - SSE log stream");
    println!("   GET  /health      - Health check");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "salesbook",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "process": "POST /api/process",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip the entries they missed
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn reject(err: ServerError) -> ApiError {
    let status = status_for(&err);
    let message = match &err {
        ServerError::Pipeline(PipelineError::Input(input)) => input.to_string(),
        other => other.to_string(),
    };
    log_error(message.clone());
    (status, Json(error_response(&message)))
}

async fn read_form(multipart: &mut Multipart) -> ServerResult<ProcessForm> {
    let mut form = ProcessForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(|s| s.to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
        form.push_field(&name, file_name, data.to_vec())?;
    }

    Ok(form)
}

/// Run a workflow on the uploaded files
async fn process(State(layout): State<LayoutOptions>, mut multipart: Multipart) -> Result<Response, ApiError> {
    let form = read_form(&mut multipart).await.map_err(reject)?;
    let request = form
        .into_request(layout)
        .map_err(|e| reject(PipelineError::from(e).into()))?;

    println!("\n{}", "=".repeat(70));
    println!(
        "📄 NEW REQUEST: {} ({} main, {} EOD, workbook: {})",
        request.workflow,
        request.primary.len(),
        request.secondary.len(),
        if request.base_workbook.is_some() { "yes" } else { "no" }
    );
    println!("{}\n", "=".repeat(70));

    // Assembly is CPU-bound
    let output = tokio::task::spawn_blocking(move || assemble(request))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_response(&format!("Worker failed: {}", e))),
            )
        })?
        .map_err(|e| reject(e.into()))?;

    let summary = ProcessSummary::from(output.report);
    log_info(format!(
        "📊 Job {}: {} sheet(s), {} bytes",
        summary.job_id,
        summary.report.sheets.len(),
        output.bytes.len()
    ));

    let disposition = HeaderValue::from_str(&content_disposition(&output.file_name)).map_err(|e| {
        reject(ServerError::BadRequest(format!("Invalid file name: {}", e)))
    })?;
    let job_id = HeaderValue::from_str(&summary.job_id)
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"));

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
        (header::CONTENT_DISPOSITION, disposition),
        (HeaderName::from_static(JOB_ID_HEADER), job_id),
    ];

    Ok((headers, output.bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;
    use crate::workbook::load_from_bytes;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "salesbook-test-boundary";

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (name, file_name, content) in parts {
            body.push_str(&format!("--{}\r\n", BOUNDARY));
            match file_name {
                Some(f) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
                    name, f
                )),
                None => body.push_str(&format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body
    }

    fn process_request(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/process")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(&ServerConfig::default());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_process_returns_workbook() {
        let app = router(&ServerConfig::default());
        let body = multipart_body(&[
            ("workflow", None, "convert"),
            ("title", None, "Daily"),
            ("primary", Some("store.csv"), "TRN_DATE,2024-01-15\nCASH,100"),
        ]);

        let response = app.oneshot(process_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Daily.xlsx\""
        );
        assert!(response.headers().contains_key(JOB_ID_HEADER));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let workbook = load_from_bytes(&bytes).unwrap();
        let sheet = workbook.get("2024-01-15").unwrap();
        assert_eq!(sheet.value(2, 2), Some(&CellValue::Number(100.0)));
    }

    #[tokio::test]
    async fn test_missing_input_is_bad_request() {
        let app = router(&ServerConfig::default());
        let body = multipart_body(&[("workflow", None, "combine")]);

        let response = app.oneshot(process_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "Upload main CSV/TXT files first.");
    }

    #[tokio::test]
    async fn test_unreadable_workbook_is_unprocessable() {
        let app = router(&ServerConfig::default());
        let body = multipart_body(&[
            ("workflow", None, "update"),
            ("workbook", Some("book.xlsx"), "not a workbook"),
        ]);

        let response = app.oneshot(process_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
