use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{
        StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{application::sitemap::SitemapService, domain::sitemap::SitemapDocument};

use super::{
    RouterState,
    middleware::{log_responses, set_request_context},
};

/// Revalidation window for sitemap documents.
const SITEMAP_MAX_AGE: u32 = 3600;
/// Revalidation window for robots.txt.
const ROBOTS_MAX_AGE: u32 = 3600;

#[derive(Clone)]
pub struct HttpState {
    pub sitemap: Arc<SitemapService>,
}

pub fn build_router(state: RouterState) -> Router<RouterState> {
    Router::new()
        .route("/sitemap-index.xml", get(sitemap_index))
        .route("/sitemap-static.xml", get(sitemap_static))
        .route("/sitemap-tools.xml", get(sitemap_tools))
        .route("/sitemap-packages.xml", get(sitemap_packages))
        .route("/sitemap-blog.xml", get(sitemap_blog))
        .route("/sitemap-pages.xml", get(sitemap_pages))
        .route("/sitemap-products.xml", get(sitemap_products))
        .route("/robots.txt", get(robots_txt))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn sitemap_index(State(state): State<HttpState>) -> Response {
    xml_response(state.sitemap.index_xml())
}

async fn sitemap_static(State(state): State<HttpState>) -> Response {
    sitemap_document(&state, SitemapDocument::Static).await
}

async fn sitemap_tools(State(state): State<HttpState>) -> Response {
    sitemap_document(&state, SitemapDocument::Tools).await
}

async fn sitemap_packages(State(state): State<HttpState>) -> Response {
    sitemap_document(&state, SitemapDocument::Packages).await
}

async fn sitemap_blog(State(state): State<HttpState>) -> Response {
    sitemap_document(&state, SitemapDocument::Blog).await
}

async fn sitemap_pages(State(state): State<HttpState>) -> Response {
    sitemap_document(&state, SitemapDocument::Pages).await
}

async fn sitemap_products(State(state): State<HttpState>) -> Response {
    sitemap_document(&state, SitemapDocument::Products).await
}

async fn sitemap_document(state: &HttpState, document: SitemapDocument) -> Response {
    xml_response(state.sitemap.document_xml(document).await)
}

async fn robots_txt(State(state): State<HttpState>) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CACHE_CONTROL, public_max_age(ROBOTS_MAX_AGE))
        .body(Body::from(state.sitemap.robots_txt()))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn xml_response(body: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/xml; charset=utf-8")
        .header(CACHE_CONTROL, public_max_age(SITEMAP_MAX_AGE))
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

pub(super) fn public_max_age(seconds: u32) -> String {
    format!("public, max-age={seconds}, must-revalidate")
}
