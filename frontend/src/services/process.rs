//! HTTP service for running a workflow on the backend and saving the result.

use gloo_net::http::Request;
use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, File, FormData, HtmlAnchorElement, Url, Window};

use crate::{AppError, AppResult, ErrorBody, Workflow, DOWNLOAD_URL_TTL_MS, MAX_FILE_SIZE, XLSX_MIME};

/// Files and options picked on the page.
#[derive(Clone, Debug, Default)]
pub struct ProcessInput {
    pub workflow: Workflow,
    pub title: String,
    pub workbook: Option<File>,
    pub primary: Vec<File>,
    pub secondary: Vec<File>,
}

/// Workbook returned by the backend.
#[derive(Clone, Debug)]
pub struct ProcessedWorkbook {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub job_id: Option<String>,
}

impl ProcessInput {
    /// Check required inputs and file sizes before anything is sent.
    pub fn validate(&self) -> AppResult<()> {
        check_required(
            self.workflow,
            !self.primary.is_empty(),
            !self.secondary.is_empty(),
            self.workbook.is_some(),
        )?;

        let files = self.workbook.iter().chain(&self.primary).chain(&self.secondary);
        for file in files {
            if file.size() > MAX_FILE_SIZE {
                return Err(AppError::Validation(format!(
                    "{} exceeds the {} MB limit",
                    file.name(),
                    MAX_FILE_SIZE / (1024.0 * 1024.0)
                )));
            }
        }
        Ok(())
    }
}

/// Required-input rules, with the same messages the backend uses.
pub fn check_required(
    workflow: Workflow,
    has_primary: bool,
    has_secondary: bool,
    has_workbook: bool,
) -> AppResult<()> {
    let missing = match workflow {
        Workflow::Convert | Workflow::Combine if !has_primary => Some("Upload main CSV/TXT files first."),
        Workflow::Merge | Workflow::Update | Workflow::Manage if !has_workbook => {
            Some("Please upload an Excel file first.")
        }
        Workflow::Merge if !has_secondary => Some("Please upload CSV/TXT files to append."),
        _ => None,
    };
    match missing {
        Some(msg) => Err(AppError::Validation(msg.to_string())),
        None => Ok(()),
    }
}

/// `<title>.xlsx`, or the workflow default for a blank title.
pub fn fallback_file_name(workflow: Workflow, title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        format!("{}.xlsx", workflow.default_title())
    } else {
        format!("{}.xlsx", title)
    }
}

/// Extract the file name from a `Content-Disposition` header.
///
/// Prefers the RFC 5987 `filename*` parameter.
pub fn file_name_from_disposition(header: &str) -> Option<String> {
    let params: Vec<&str> = header.split(';').map(str::trim).collect();

    let extended = params
        .iter()
        .find_map(|p| p.strip_prefix("filename*="))
        .and_then(|v| v.strip_prefix("UTF-8''"))
        .and_then(percent_decode);
    if extended.is_some() {
        return extended;
    }

    params
        .iter()
        .find_map(|p| p.strip_prefix("filename="))
        .map(|v| v.trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

fn js_error(context: &'static str) -> impl Fn(JsValue) -> AppError {
    move |e| AppError::Network(format!("{}: {:?}", context, e))
}

/// Post the selected files to the backend and collect the workbook.
pub async fn process_files(input: &ProcessInput, backend_url: &str) -> AppResult<ProcessedWorkbook> {
    input.validate()?;

    let form_data = FormData::new().map_err(js_error("Failed to create FormData"))?;
    form_data
        .append_with_str("workflow", input.workflow.value())
        .map_err(js_error("Failed to append workflow"))?;
    if !input.title.trim().is_empty() {
        form_data
            .append_with_str("title", input.title.trim())
            .map_err(js_error("Failed to append title"))?;
    }
    if let Some(workbook) = &input.workbook {
        form_data
            .append_with_blob_and_filename("workbook", workbook, &workbook.name())
            .map_err(js_error("Failed to append workbook"))?;
    }
    for (field, files) in [("primary", &input.primary), ("secondary", &input.secondary)] {
        for file in files {
            form_data
                .append_with_blob_and_filename(field, file, &file.name())
                .map_err(js_error("Failed to append file"))?;
        }
    }

    let url = format!("{}/api/process", backend_url);
    let response = Request::post(&url)
        .body(form_data)
        .map_err(|e| AppError::Network(format!("Failed to build request: {}", e)))?
        .send()
        .await
        .map_err(|e| AppError::Network(format!("HTTP request failed: {}", e)))?;

    if !response.ok() {
        let status = response.status();
        let text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        return Err(AppError::Server { status, message });
    }

    let headers = response.headers();
    let file_name = headers
        .get("content-disposition")
        .and_then(|v| file_name_from_disposition(&v))
        .unwrap_or_else(|| fallback_file_name(input.workflow, &input.title));
    let job_id = headers.get("x-job-id");

    let bytes = response
        .binary()
        .await
        .map_err(|e| AppError::Network(format!("Failed to read response: {}", e)))?;

    Ok(ProcessedWorkbook {
        file_name,
        bytes,
        job_id,
    })
}

/// Hand the workbook to the browser as a file download.
pub fn trigger_download(workbook: &ProcessedWorkbook) -> AppResult<()> {
    let download_error = |e: JsValue| AppError::Download(format!("{:?}", e));

    let parts = Array::new();
    parts.push(&Uint8Array::from(workbook.bytes.as_slice()));
    let options = BlobPropertyBag::new();
    options.set_type(XLSX_MIME);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(download_error)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(download_error)?;

    let window = web_sys::window().ok_or_else(|| AppError::Download("No window available".to_string()))?;
    let document = window
        .document()
        .ok_or_else(|| AppError::Download("No document available".to_string()))?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(download_error)?
        .dyn_into()
        .map_err(|_| AppError::Download("Failed to create link".to_string()))?;
    anchor.set_href(&url);
    anchor.set_download(&workbook.file_name);
    anchor.click();

    revoke_later(&window, url)
}

/// Release the object URL once the browser has had time to start the download.
fn revoke_later(window: &Window, url: String) -> AppResult<()> {
    let revoke = Closure::once(move || {
        if let Err(e) = Url::revoke_object_url(&url) {
            log::warn!("Failed to revoke download URL: {:?}", e);
        }
    });
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            revoke.as_ref().unchecked_ref(),
            DOWNLOAD_URL_TTL_MS,
        )
        .map_err(|e| AppError::Download(format!("{:?}", e)))?;
    revoke.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_inputs() {
        assert!(check_required(Workflow::Convert, true, false, false).is_ok());
        assert_eq!(
            check_required(Workflow::Combine, false, true, false),
            Err(AppError::Validation("Upload main CSV/TXT files first.".into()))
        );
        assert_eq!(
            check_required(Workflow::Merge, false, true, false),
            Err(AppError::Validation("Please upload an Excel file first.".into()))
        );
        assert_eq!(
            check_required(Workflow::Merge, false, false, true),
            Err(AppError::Validation("Please upload CSV/TXT files to append.".into()))
        );
        assert!(check_required(Workflow::Manage, false, false, true).is_ok());
        assert!(check_required(Workflow::Update, true, true, false).is_err());
    }

    #[test]
    fn test_fallback_file_name() {
        assert_eq!(fallback_file_name(Workflow::Combine, "  "), "Final_Excel.xlsx");
        assert_eq!(fallback_file_name(Workflow::Merge, " Jan "), "Jan.xlsx");
    }

    #[test]
    fn test_file_name_from_disposition() {
        assert_eq!(
            file_name_from_disposition("attachment; filename=\"Final_Excel.xlsx\"").as_deref(),
            Some("Final_Excel.xlsx")
        );
        assert_eq!(
            file_name_from_disposition("attachment; filename=\"A_o.xlsx\"; filename*=UTF-8''A%C3%B1o.xlsx")
                .as_deref(),
            Some("Año.xlsx")
        );
        assert_eq!(file_name_from_disposition("attachment"), None);
        assert_eq!(file_name_from_disposition("attachment; filename=\"\""), None);
    }

    #[test]
    fn test_download_url_outlives_click() {
        // URL stays valid well past the click
        assert!(DOWNLOAD_URL_TTL_MS >= 10_000);
    }

    #[test]
    fn test_percent_decode_rejects_truncated_escape() {
        assert_eq!(percent_decode("abc%2"), None);
        assert_eq!(percent_decode("a%20b").as_deref(), Some("a b"));
    }
}
