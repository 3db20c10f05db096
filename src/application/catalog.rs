//! Catalog endpoints and backend diagnostics.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Value, json};
use tracing::warn;

use crate::application::content::ContentService;
use crate::application::error::error_chain;
use crate::application::source::{FetchError, Freshness, RemoteCollection};
use crate::presentation::views::{ConnectionReportView, ProbeView, ProductNameView};

const SOURCE: &str = "application::catalog::CatalogService";

#[derive(Clone)]
pub struct CatalogService {
    content: Arc<ContentService>,
}

impl CatalogService {
    pub fn new(content: Arc<ContentService>) -> Self {
        Self { content }
    }

    pub async fn product_names(&self) -> Result<Vec<ProductNameView>, FetchError> {
        let products = self.content.all_products().await?;
        Ok(products
            .iter()
            .map(|product| ProductNameView {
                id: product.id,
                name: product.title.clone(),
                slug: product.slug.clone(),
            })
            .collect())
    }

    /// Refetch the catalog and return the number of products now cached.
    pub async fn refresh_products(&self) -> Result<usize, FetchError> {
        let products = self.content.refresh_products().await?;
        Ok(products.len())
    }

    /// Chat widget settings, or the disabled default when the backend is
    /// unavailable.
    pub async fn chat_settings(&self) -> Value {
        match self.content.chat_settings().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!(
                    target = SOURCE,
                    error = %err,
                    "chat settings unavailable, serving defaults"
                );
                default_chat_settings()
            }
        }
    }

    /// Probe every backend resource directly, bypassing the cache.
    pub async fn test_connection(&self) -> ConnectionReportView {
        let source = self.content.source();
        let (pages, posts, products, navigation, chat) = futures::join!(
            probe("pages", async {
                source
                    .fetch_list(RemoteCollection::Pages, Freshness::NoCache)
                    .await
                    .map(|items| Some(items.len()))
            }),
            probe("posts", async {
                source
                    .fetch_list(RemoteCollection::Posts, Freshness::NoCache)
                    .await
                    .map(|items| Some(items.len()))
            }),
            probe("products", async {
                source
                    .fetch_list(RemoteCollection::Products, Freshness::NoCache)
                    .await
                    .map(|items| Some(items.len()))
            }),
            probe("navigation", async {
                source
                    .fetch_navigation(Freshness::NoCache)
                    .await
                    .map(|entries| Some(entries.len()))
            }),
            probe("chat_settings", async {
                source
                    .fetch_chat_settings(Freshness::NoCache)
                    .await
                    .map(|_| None)
            }),
        );

        let probes = vec![pages, posts, products, navigation, chat];
        ConnectionReportView {
            success: probes.iter().all(|probe| probe.ok),
            probes,
        }
    }
}

pub fn default_chat_settings() -> Value {
    json!({ "enabled": false })
}

async fn probe(
    name: &'static str,
    request: impl Future<Output = Result<Option<usize>, FetchError>>,
) -> ProbeView {
    let started = Instant::now();
    let result = request.await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(count) => ProbeView {
            name,
            ok: true,
            elapsed_ms,
            count,
            error: None,
            chain: Vec::new(),
        },
        Err(err) => ProbeView {
            name,
            ok: false,
            elapsed_ms,
            count: None,
            error: Some(err.to_string()),
            chain: error_chain(&err),
        },
    }
}
