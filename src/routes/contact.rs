use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::Json;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::state::SharedState;
use crate::submission::{Submission, parser};

const INVALID_BODY: &str = "Invalid request body";

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Contact service is running" }))
}

pub async fn send_email(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    tracing::debug!("Contact submission: {} bytes, content-type {:?}", body.len(), content_type);

    let parsed = if content_type.is_some_and(|ct| ct.contains("multipart/form-data")) {
        parser::parse_multipart(&headers, body).await
    } else {
        parser::parse_body(content_type, &body)
    };

    let form = parsed.map_err(|e| {
        tracing::debug!("Rejected contact body: {e}");
        AppError::BadRequest(INVALID_BODY.to_string())
    })?;

    let submission = Submission::from_form(form)?;

    // The log is best-effort; only the email decides the response.
    match state.store.record(&submission).await {
        Ok(rows) => tracing::info!("Saved submission from {} ({rows} in log)", submission.email),
        Err(e) => tracing::error!(
            "Error saving submission to {}: {e}",
            state.store.path().display()
        ),
    }

    state.notifier.send(&submission).await?;

    Ok(Json(json!({ "success": true, "message": "Email sent successfully!" })))
}

/// Bare OPTIONS without CORS preflight headers; real preflights are answered
/// by the CORS layer before reaching this.
pub async fn send_email_options() -> StatusCode {
    StatusCode::OK
}
