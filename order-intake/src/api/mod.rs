//! API routes for order-intake

pub mod health;
pub mod orders;

use axum::Router;
use axum::routing::{get, post};
use http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// CORS for the browser checkout
///
/// `*` allows any origin; anything else must be a single valid origin.
pub fn cors_layer(allow_origin: &str) -> CorsLayer {
    let origin = match allow_origin.trim() {
        "*" => AllowOrigin::any(),
        origin => match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!(origin, "Invalid CORS_ALLOW_ORIGIN, allowing any origin");
                AllowOrigin::any()
            }
        },
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Build the application router with middleware and state
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allow_origin);

    Router::new()
        .route("/orders", post(orders::submit_order))
        .route("/health", get(health::health_check))
        // CORS - answers preflight before routing
        .layer(cors)
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
