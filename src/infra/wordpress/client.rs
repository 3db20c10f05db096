use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{CACHE_CONTROL, PRAGMA},
};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::application::source::{ContentSource, FetchError, Freshness, RemoteCollection};
use crate::config::WordPressSettings;
use crate::domain::content::ContentItem;
use crate::domain::navigation::MenuEntry;
use crate::infra::error::InfraError;

use super::models::{WcProduct, WpContent, WpMenuItem};

const PAGES_PATH: &str = "wp-json/wp/v2/pages";
const POSTS_PATH: &str = "wp-json/wp/v2/posts";
const PRODUCTS_PATH: &str = "wp-json/wc/v3/products";
const MENU_ITEMS_PATH: &str = "wp-json/wp/v2/menu-items";
const CHAT_SETTINGS_PATH: &str = "wp-json/faditools/v1/chat-settings";
const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";
const CONTENT_FIELDS: &str = "id,slug,status,title,date_gmt,modified_gmt";

/// Connection details for the WordPress/WooCommerce backend.
#[derive(Debug, Clone)]
pub struct WordPressConfig {
    pub base_url: Option<Url>,
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub navigation_menu: String,
    pub per_page: u32,
    pub max_pages: u32,
}

impl From<&WordPressSettings> for WordPressConfig {
    fn from(settings: &WordPressSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            consumer_key: settings.consumer_key.clone(),
            consumer_secret: settings.consumer_secret.clone(),
            navigation_menu: settings.navigation_menu.clone(),
            per_page: settings.per_page.get(),
            max_pages: settings.max_pages.get(),
        }
    }
}

/// REST client for the WordPress and WooCommerce APIs.
///
/// Missing connection details are reported per call as
/// `FetchError::Configuration`, so the service starts without a backend.
#[derive(Clone, Debug)]
pub struct WordPressClient {
    http: Client,
    config: WordPressConfig,
}

impl WordPressClient {
    pub fn new(mut config: WordPressConfig) -> Result<Self, InfraError> {
        if let Some(base) = config.base_url.as_mut()
            && !base.path().ends_with('/')
        {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        config.per_page = config.per_page.max(1);
        config.max_pages = config.max_pages.max(1);

        let http = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn user_agent() -> &'static str {
        concat!("storefront/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.config.base_url.as_ref()
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let base = self
            .config
            .base_url
            .as_ref()
            .ok_or_else(|| FetchError::configuration("WordPress base URL is not configured"))?;
        base.join(path).map_err(|err| {
            FetchError::configuration(format!("invalid endpoint `{path}` for {base}: {err}"))
        })
    }

    fn woocommerce_credentials(&self) -> Result<[(&'static str, String); 2], FetchError> {
        let key = non_blank(self.config.consumer_key.as_deref());
        let secret = non_blank(self.config.consumer_secret.as_deref());
        match (key, secret) {
            (Some(key), Some(secret)) => Ok([
                ("consumer_key", key.to_string()),
                ("consumer_secret", secret.to_string()),
            ]),
            _ => Err(FetchError::configuration(
                "WooCommerce consumer key and secret are required",
            )),
        }
    }

    /// Fetch every page of a list endpoint.
    #[instrument(skip(self, query))]
    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        freshness: Freshness,
    ) -> Result<Vec<T>, FetchError> {
        let per_page = self.config.per_page;
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let mut url = self.endpoint(path)?;
            {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in query {
                    pairs.append_pair(key, value);
                }
                pairs.append_pair("per_page", &per_page.to_string());
                pairs.append_pair("page", &page.to_string());
            }

            let response = self.send(url, freshness).await?;
            let total_pages = total_pages(&response);
            let batch: Vec<T> = read_json(response).await?;
            let received = batch.len();
            items.extend(batch);
            debug!(page, received, ?total_pages, "fetched page");

            let more = match total_pages {
                Some(total) => page < total,
                None => u32::try_from(received).is_ok_and(|count| count >= per_page),
            };
            if !more || received == 0 {
                break;
            }
            if page >= self.config.max_pages {
                warn!(
                    max_pages = self.config.max_pages,
                    "page ceiling reached, remaining pages skipped"
                );
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    async fn send(&self, url: Url, freshness: Freshness) -> Result<Response, FetchError> {
        let shown = redacted(&url);
        let mut request = self.http.get(url);
        if freshness == Freshness::NoCache {
            request = request
                .header(CACHE_CONTROL, "no-cache, no-store, must-revalidate")
                .header(PRAGMA, "no-cache");
        }

        let response = request
            .send()
            .await
            .map_err(|err| FetchError::network(&shown, err.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(status.as_u16(), shown));
        }
        Ok(response)
    }
}

#[async_trait]
impl ContentSource for WordPressClient {
    async fn fetch_list(
        &self,
        collection: RemoteCollection,
        freshness: Freshness,
    ) -> Result<Vec<ContentItem>, FetchError> {
        match collection {
            RemoteCollection::Pages | RemoteCollection::Posts => {
                let path = if collection == RemoteCollection::Pages {
                    PAGES_PATH
                } else {
                    POSTS_PATH
                };
                let query = [("_fields", CONTENT_FIELDS.to_string())];
                let items: Vec<WpContent> = self.list(path, &query, freshness).await?;
                Ok(items.into_iter().map(ContentItem::from).collect())
            }
            RemoteCollection::Products => {
                let credentials = self.woocommerce_credentials()?;
                let items: Vec<WcProduct> =
                    self.list(PRODUCTS_PATH, &credentials, freshness).await?;
                Ok(items.into_iter().map(ContentItem::from).collect())
            }
        }
    }

    async fn fetch_navigation(&self, freshness: Freshness) -> Result<Vec<MenuEntry>, FetchError> {
        let query = [("menus", self.config.navigation_menu.clone())];
        let items: Vec<WpMenuItem> = self.list(MENU_ITEMS_PATH, &query, freshness).await?;
        Ok(items.into_iter().map(MenuEntry::from).collect())
    }

    async fn fetch_chat_settings(
        &self,
        freshness: Freshness,
    ) -> Result<serde_json::Value, FetchError> {
        let url = self.endpoint(CHAT_SETTINGS_PATH)?;
        let response = self.send(url, freshness).await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    let shown = redacted(response.url());
    let bytes = response
        .bytes()
        .await
        .map_err(|err| FetchError::network(&shown, err.without_url()))?;
    serde_json::from_slice(&bytes).map_err(|err| FetchError::parse(shown, err.to_string()))
}

fn total_pages(response: &Response) -> Option<u32> {
    response
        .headers()
        .get(TOTAL_PAGES_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// The URL without its query string, which may carry API credentials.
fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    shown.set_query(None);
    shown.to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
