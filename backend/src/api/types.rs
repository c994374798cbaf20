//! REST API types for the processing endpoint.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::LayoutOptions;
use crate::error::{InputError, PipelineError, ServerError, ServerResult, WorkbookError};
use crate::models::SourceFile;
use crate::transform::pipeline::{AssemblyReport, AssemblyRequest, Workflow};

/// MIME type of the generated workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Header carrying the job id of a processed request.
pub const JOB_ID_HEADER: &str = "x-job-id";

/// Fields collected from a `POST /api/process` multipart form.
#[derive(Debug, Default)]
pub struct ProcessForm {
    pub workflow: Option<String>,
    pub title: Option<String>,
    pub workbook: Option<Vec<u8>>,
    pub primary: Vec<SourceFile>,
    pub secondary: Vec<SourceFile>,
}

impl ProcessForm {
    /// Record one multipart field.
    ///
    /// Empty file parts (an untouched file input) are skipped.
    pub fn push_field(&mut self, name: &str, file_name: Option<String>, data: Vec<u8>) -> ServerResult<()> {
        match name {
            "workflow" => self.workflow = Some(String::from_utf8_lossy(&data).into_owned()),
            "title" => self.title = Some(String::from_utf8_lossy(&data).into_owned()),
            "workbook" => {
                if !data.is_empty() {
                    self.workbook = Some(data);
                }
            }
            "primary" | "secondary" => {
                if data.is_empty() && file_name.as_deref().unwrap_or("").is_empty() {
                    return Ok(());
                }
                let file = SourceFile::new(file_name.unwrap_or_else(|| format!("{}.csv", name)), data);
                if name == "primary" {
                    self.primary.push(file);
                } else {
                    self.secondary.push(file);
                }
            }
            other => return Err(ServerError::BadRequest(format!("Unexpected field '{}'", other))),
        }
        Ok(())
    }

    pub fn into_request(self, layout: LayoutOptions) -> Result<AssemblyRequest, InputError> {
        let workflow: Workflow = self.workflow.as_deref().unwrap_or_default().parse()?;

        let mut request = AssemblyRequest::new(workflow)
            .with_primary(self.primary)
            .with_secondary(self.secondary)
            .with_layout(layout);
        if let Some(title) = self.title {
            request = request.with_title(title);
        }
        if let Some(bytes) = self.workbook {
            request = request.with_base_workbook(bytes);
        }
        Ok(request)
    }
}

/// Summary of a processed request, logged and returned as headers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSummary {
    pub job_id: String,
    pub status: String,
    #[serde(flatten)]
    pub report: AssemblyReport,
}

impl From<AssemblyReport> for ProcessSummary {
    fn from(report: AssemblyReport) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: "ready".to_string(),
            report,
        }
    }
}

/// HTTP status for a failed request.
///
/// Missing input is the caller's fault, an unreadable workbook is
/// unprocessable, and a failed save is ours.
pub fn status_for(err: &ServerError) -> StatusCode {
    match err {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Pipeline(PipelineError::Input(_)) => StatusCode::BAD_REQUEST,
        ServerError::Pipeline(PipelineError::Workbook(
            WorkbookError::Open(_) | WorkbookError::ReadSheet { .. },
        )) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `Content-Disposition` value for a download.
///
/// Non-ASCII titles are sent as an RFC 5987 `filename*` parameter next to
/// an ASCII fallback.
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .map(|c| if c == '"' || c == '\\' { '_' } else { c })
        .collect();

    if fallback == file_name {
        return format!("attachment; filename=\"{}\"", fallback);
    }

    let encoded: String = file_name
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect();
    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", fallback, encoded)
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "fileName": null,
        "sheets": []
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_collects_fields() {
        let mut form = ProcessForm::default();
        form.push_field("workflow", None, b"combine".to_vec()).unwrap();
        form.push_field("title", None, b"Week 3".to_vec()).unwrap();
        form.push_field("primary", Some("a.csv".into()), b"a,1".to_vec()).unwrap();
        form.push_field("primary", Some("b.csv".into()), b"b,2".to_vec()).unwrap();
        form.push_field("secondary", Some("e.csv".into()), b"e".to_vec()).unwrap();

        let request = form.into_request(LayoutOptions::default()).unwrap();
        assert_eq!(request.workflow, Workflow::Combine);
        assert_eq!(request.file_name(), "Week 3.xlsx");
        assert_eq!(request.primary.len(), 2);
        assert_eq!(request.primary[1].name, "b.csv");
        assert_eq!(request.secondary.len(), 1);
        assert!(request.base_workbook.is_none());
    }

    #[test]
    fn test_empty_file_parts_are_skipped() {
        let mut form = ProcessForm::default();
        form.push_field("workbook", Some(String::new()), Vec::new()).unwrap();
        form.push_field("primary", Some(String::new()), Vec::new()).unwrap();

        assert!(form.workbook.is_none());
        assert!(form.primary.is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut form = ProcessForm::default();
        let err = form.push_field("matrix", None, Vec::new()).unwrap_err();
        assert_eq!(status_for(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_or_unknown_workflow() {
        let err = ProcessForm::default().into_request(LayoutOptions::default()).unwrap_err();
        assert_eq!(err, InputError::UnknownWorkflow(String::new()));

        let form = ProcessForm {
            workflow: Some("export".into()),
            ..Default::default()
        };
        assert!(form.into_request(LayoutOptions::default()).is_err());
    }

    #[test]
    fn test_status_mapping() {
        let missing = ServerError::from(PipelineError::from(InputError::MissingWorkbook));
        assert_eq!(status_for(&missing), StatusCode::BAD_REQUEST);

        let unreadable = ServerError::from(PipelineError::from(WorkbookError::ReadSheet {
            sheet: "Jan".into(),
            message: "broken".into(),
        }));
        assert_eq!(status_for(&unreadable), StatusCode::UNPROCESSABLE_ENTITY);

        let save = ServerError::from(PipelineError::from(WorkbookError::OutOfRange { row: 0, col: 1 }));
        assert_eq!(status_for(&save), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("Final_Excel.xlsx"),
            "attachment; filename=\"Final_Excel.xlsx\""
        );
        assert_eq!(
            content_disposition("Año.xlsx"),
            "attachment; filename=\"A_o.xlsx\"; filename*=UTF-8''A%C3%B1o.xlsx"
        );
        assert!(content_disposition("a\"b.xlsx").contains("filename=\"a_b.xlsx\""));
    }

    #[test]
    fn test_error_response_shape() {
        let body = error_response("Upload main CSV/TXT files first.");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "Upload main CSV/TXT files first.");
        assert!(body["jobId"].as_str().unwrap().len() == 36);
    }
}
