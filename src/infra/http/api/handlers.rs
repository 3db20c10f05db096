use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header::CACHE_CONTROL};
use axum::response::{IntoResponse, Response};
use tracing::info;

use crate::application::error::ErrorReport;
use crate::domain::cart::Cart;
use crate::infra::http::public::public_max_age;
use crate::presentation::views::{ClearCacheView, ProductNamesView, RefreshView};

use super::error::ApiError;
use super::models::CartRequest;
use super::state::ApiState;

const CHAT_SETTINGS_MAX_AGE: u32 = 300;
const PRODUCT_NAMES_MAX_AGE: u32 = 300;
const NAVIGATION_MAX_AGE: u32 = 600;

pub async fn chat_settings(State(state): State<ApiState>) -> Response {
    let settings = state.catalog.chat_settings().await;
    with_cache_control(Json(settings).into_response(), public_max_age(CHAT_SETTINGS_MAX_AGE))
}

pub async fn clear_cache(State(state): State<ApiState>) -> Response {
    let cleared = state.content.invalidate_all();
    info!(
        target = "storefront::http::api::clear_cache",
        cleared = ?cleared,
        "caches cleared"
    );
    let body = ClearCacheView {
        success: true,
        message: "All caches cleared".to_string(),
        cleared,
    };
    no_store(Json(body).into_response())
}

pub async fn product_names(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let products = state.catalog.product_names().await.map_err(|err| {
        ApiError::upstream(
            "infra::http::api::product_names",
            "Failed to fetch products",
            &err,
        )
    })?;

    let body = ProductNamesView {
        success: true,
        count: products.len(),
        products,
    };
    Ok(with_cache_control(
        Json(body).into_response(),
        public_max_age(PRODUCT_NAMES_MAX_AGE),
    ))
}

pub async fn refresh_products(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let count = state.catalog.refresh_products().await.map_err(|err| {
        ApiError::upstream(
            "infra::http::api::refresh_products",
            "Failed to refresh products",
            &err,
        )
    })?;

    info!(
        target = "storefront::http::api::refresh_products",
        count, "product cache refreshed"
    );
    let body = RefreshView {
        success: true,
        message: format!("Refreshed {count} products"),
        count,
    };
    Ok(no_store(Json(body).into_response()))
}

pub async fn navigation(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let view = state.chrome.navigation().await.map_err(|err| {
        ApiError::upstream(
            "infra::http::api::navigation",
            "Failed to load navigation",
            &err,
        )
    })?;
    Ok(with_cache_control(
        Json(view).into_response(),
        public_max_age(NAVIGATION_MAX_AGE),
    ))
}

pub async fn price_cart(
    State(state): State<ApiState>,
    payload: Result<Json<CartRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    const SOURCE: &str = "infra::http::api::price_cart";

    let Json(request) =
        payload.map_err(|rejection| ApiError::bad_request(SOURCE, rejection.body_text()))?;
    let mut cart = Cart::from_pairs(
        request
            .items
            .into_iter()
            .map(|item| (item.product_id, item.quantity)),
    )
    .map_err(|err| ApiError::domain(SOURCE, &err))?;
    for change in request.changes {
        cart.apply(change.into())
            .map_err(|err| ApiError::domain(SOURCE, &err))?;
    }

    let view = state
        .cart
        .price(&cart)
        .await
        .map_err(|err| ApiError::upstream(SOURCE, "Failed to price cart", &err))?;
    Ok(no_store(Json(view).into_response()))
}

pub async fn test_connection(State(state): State<ApiState>) -> Response {
    let report = state.catalog.test_connection().await;
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let failures: Vec<String> = report
        .probes
        .iter()
        .filter_map(|probe| {
            probe
                .error
                .as_ref()
                .map(|error| format!("{}: {error}", probe.name))
        })
        .collect();

    let mut response = no_store((status, Json(report)).into_response());
    if !failures.is_empty() {
        ErrorReport {
            source: "infra::http::api::test_connection",
            status,
            messages: failures,
        }
        .attach(&mut response);
    }
    response
}

fn with_cache_control(mut response: Response, value: String) -> Response {
    if let Ok(value) = HeaderValue::from_str(&value) {
        response.headers_mut().insert(CACHE_CONTROL, value);
    }
    response
}

fn no_store(response: Response) -> Response {
    with_cache_control(response, "no-store".to_string())
}
