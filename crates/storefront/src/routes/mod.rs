//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to the wizard
//!
//! # Order wizard
//! GET  /order                  - Current step
//! POST /order/image            - Upload image (multipart, field "image")
//! POST /order/size             - Select size (form: size, intent)
//! POST /order/details          - Save details (form: details fields, intent)
//! POST /order/next             - Next step
//! POST /order/back             - Previous step
//! POST /order/submit           - Send the order
//! ```
//!
//! `intent` is `save` (stay on the step) or `next` (save, then advance).

pub mod order;
pub mod views;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the order wizard routes router.
///
/// `max_upload_bytes` caps the image upload body; other forms keep axum's
/// default limit.
pub fn order_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(order::show))
        .route(
            "/image",
            post(order::upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/size", post(order::select_size))
        .route("/details", post(order::save_details))
        .route("/next", post(order::next))
        .route("/back", post(order::back))
        .route("/submit", post(order::submit))
}

/// Create all routes for the storefront.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(order::index))
        .nest("/order", order_routes(max_upload_bytes))
}
