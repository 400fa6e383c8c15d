pub mod assets;
pub mod contact;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn contact_routes() -> Router<SharedState> {
    Router::new()
        .route("/test", get(contact::health))
        .route(
            "/send-email",
            post(contact::send_email).options(contact::send_email_options),
        )
        // Path used by the bundled frontend script
        .route(
            "/api/send-email",
            post(contact::send_email).options(contact::send_email_options),
        )
}

pub fn asset_routes() -> Router<SharedState> {
    Router::new()
        .route("/download-submissions", get(assets::download_submissions))
        .route("/download/submission", get(assets::download_page))
}
