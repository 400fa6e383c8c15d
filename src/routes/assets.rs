use askama::Template;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::error::{AppError, failure};
use crate::state::SharedState;

pub const DOWNLOAD_NAME: &str = "contact_submissions.xlsx";
const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Template)]
#[template(path = "submission_download.html")]
struct SubmissionDownloadTemplate {
    download_url: &'static str,
    summary: String,
}

pub async fn download_submissions(State(state): State<SharedState>) -> Result<Response, AppError> {
    let bytes = state
        .store
        .snapshot()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read submission log: {e}")))?
        .ok_or_else(|| AppError::NotFound("No submissions found".to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

pub async fn download_page(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    let summary = match state.store.row_count().await {
        Ok(0) => "No submissions have been recorded yet.".to_string(),
        Ok(1) => "1 submission recorded.".to_string(),
        Ok(count) => format!("{count} submissions recorded."),
        Err(e) => {
            tracing::warn!("Could not count submissions: {e}");
            "The submission log could not be read. It will be recreated on the next submission."
                .to_string()
        }
    };

    let template = SubmissionDownloadTemplate {
        download_url: "/download-submissions",
        summary,
    };
    template
        .render()
        .map(Html)
        .map_err(|e| AppError::Internal(format!("Template error: {e}")))
}

/// Read-only passthrough to the deployment root. `/` resolves to
/// `index.html`. Dotfiles such as `.env` are never served.
pub async fn serve_static(State(state): State<SharedState>, req: Request) -> Response {
    if is_hidden(req.uri().path()) {
        return failure(StatusCode::NOT_FOUND, "Not found");
    }

    ServeDir::new(&state.config.site_root)
        .oneshot(req)
        .await
        .into_response()
}

fn is_hidden(path: &str) -> bool {
    path.split('/').any(|segment| {
        let lower = segment.to_ascii_lowercase();
        lower.starts_with('.') || lower.starts_with("%2e")
    })
}
