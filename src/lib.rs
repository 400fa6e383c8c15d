pub mod config;
pub mod error;
pub mod state;
pub mod routes;
pub mod notify;
pub mod store;
pub mod submission;

use std::any::Any;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::middleware;
use axum::response::Response;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{UNEXPECTED_MESSAGE, failure};
use crate::notify::SmtpNotifier;
use crate::state::{AppState, SharedState};

pub fn build_app(config: Config) -> Router {
    tracing::info!(
        "SMTP relay {}:{} (STARTTLS {}), notifications to {}",
        config.smtp.host,
        config.smtp.port,
        if config.smtp.secure { "required" } else { "disabled" },
        config.smtp.recipient
    );
    if !config.smtp.is_complete() {
        tracing::warn!("SMTP configuration is incomplete; notifications will fail");
    }

    let notifier = Arc::new(SmtpNotifier::new(config.smtp.clone()));
    let state: SharedState = Arc::new(AppState::new(config, notifier));
    build_router(state)
}

pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(routes::contact_routes())
        .merge(routes::asset_routes())
        .fallback(routes::assets::serve_static)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(middleware::map_response(reject_oversized))
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Give the body-limit rejection the same JSON shape as every other error.
async fn reject_oversized(response: Response) -> Response {
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        failure(StatusCode::PAYLOAD_TOO_LARGE, "Request body is too large")
    } else {
        response
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Unexpected error: {detail}");

    failure(StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED_MESSAGE)
}
