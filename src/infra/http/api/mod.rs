pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::infra::http::RouterState;
use crate::infra::http::middleware::{log_responses, set_request_context};

pub fn build_api_router(state: RouterState) -> Router<RouterState> {
    Router::new()
        .route("/api/chat-settings", get(handlers::chat_settings))
        .route("/api/clear-cache", get(handlers::clear_cache))
        .route(
            "/api/get-all-product-names",
            get(handlers::product_names),
        )
        .route("/api/refresh-products", post(handlers::refresh_products))
        .route("/api/navigation", get(handlers::navigation))
        .route("/api/cart", post(handlers::price_cart))
        .route("/api/test-connection", get(handlers::test_connection))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
