use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, warn};

use crate::application::source::{ContentSource, FetchError, Freshness, RemoteCollection};
use crate::cache::{CacheName, CacheStore};
use crate::domain::content::ContentItem;
use crate::domain::navigation::{NavigationItem, build_tree};

const SOURCE: &str = "application::content::ContentService";

/// Backend reads, with navigation and the product catalog served through
/// the process cache.
#[derive(Clone)]
pub struct ContentService {
    source: Arc<dyn ContentSource>,
    cache: Arc<CacheStore>,
}

impl ContentService {
    pub fn new(source: Arc<dyn ContentSource>, cache: Arc<CacheStore>) -> Self {
        Self { source, cache }
    }

    pub fn source(&self) -> &Arc<dyn ContentSource> {
        &self.source
    }

    pub async fn navigation(&self) -> Result<Arc<Vec<NavigationItem>>, FetchError> {
        if let Some(entry) = self.cache.navigation() {
            return Ok(entry.value);
        }

        debug!(target = SOURCE, cache = %CacheName::Navigation, "cache miss, fetching menu");
        let entries = observe("menu", self.source.fetch_navigation(Freshness::NoCache)).await?;
        Ok(self.cache.set_navigation(build_tree(entries)).value)
    }

    pub async fn all_products(&self) -> Result<Arc<Vec<ContentItem>>, FetchError> {
        if let Some(entry) = self.cache.all_products() {
            return Ok(entry.value);
        }

        debug!(target = SOURCE, cache = %CacheName::AllProducts, "cache miss, fetching products");
        self.load_products().await
    }

    /// Fetch the catalog again, bypassing intermediaries, and replace the
    /// cached copy. A failed fetch leaves the cached copy in place.
    pub async fn refresh_products(&self) -> Result<Arc<Vec<ContentItem>>, FetchError> {
        self.load_products().await
    }

    /// Cached products carrying the category slug `category`.
    pub async fn products_in(&self, category: &str) -> Result<Vec<ContentItem>, FetchError> {
        let products = self.all_products().await?;
        Ok(products
            .iter()
            .filter(|item| item.in_category(category))
            .cloned()
            .collect())
    }

    pub async fn posts(&self) -> Result<Vec<ContentItem>, FetchError> {
        self.fetch(RemoteCollection::Posts).await
    }

    pub async fn pages(&self) -> Result<Vec<ContentItem>, FetchError> {
        self.fetch(RemoteCollection::Pages).await
    }

    pub async fn chat_settings(&self) -> Result<serde_json::Value, FetchError> {
        observe(
            "chat_settings",
            self.source.fetch_chat_settings(Freshness::NoCache),
        )
        .await
    }

    pub fn invalidate_all(&self) -> Vec<CacheName> {
        self.cache.invalidate_all()
    }

    async fn fetch(&self, collection: RemoteCollection) -> Result<Vec<ContentItem>, FetchError> {
        observe(
            collection.as_str(),
            self.source.fetch_list(collection, Freshness::Default),
        )
        .await
    }

    async fn load_products(&self) -> Result<Arc<Vec<ContentItem>>, FetchError> {
        let products = observe(
            RemoteCollection::Products.as_str(),
            self.source
                .fetch_list(RemoteCollection::Products, Freshness::NoCache),
        )
        .await?;
        Ok(self.cache.set_all_products(products).value)
    }
}

/// Record latency and failures of one upstream call.
async fn observe<T>(
    resource: &'static str,
    request: impl Future<Output = Result<T, FetchError>>,
) -> Result<T, FetchError> {
    let started = Instant::now();
    let result = request.await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;

    histogram!("storefront_upstream_fetch_ms", "resource" => resource).record(elapsed_ms);
    if let Err(err) = &result {
        counter!(
            "storefront_upstream_error_total",
            "resource" => resource,
            "kind" => err.code()
        )
        .increment(1);
        warn!(
            target = SOURCE,
            resource,
            error = %err,
            elapsed_ms,
            "upstream fetch failed"
        );
    }
    result
}
