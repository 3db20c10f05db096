//! Sitemap service for the sitemap documents and robots.txt.
//!
//! Fetch failures travel as `FetchError` through `fetched_entries` and are
//! only collapsed into an empty section when a document is rendered, so every
//! endpoint answers with a well-formed document.

use std::collections::HashSet;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::application::content::ContentService;
use crate::application::source::FetchError;
use crate::config::SiteSettings;
use crate::domain::content::{ContentItem, ContentKind};
use crate::domain::sitemap::{
    SitemapDocument, SitemapEntry, index_xml, page_url, project, project_slugs, static_entries,
    urlset_xml,
};

const SOURCE: &str = "application::sitemap::SitemapService";

/// Site-level inputs to sitemap generation.
#[derive(Debug, Clone)]
pub struct SitemapConfig {
    pub site_url: String,
    pub tools_category: String,
    pub packages_category: String,
    pub popular_tools: Vec<String>,
}

impl From<&SiteSettings> for SitemapConfig {
    fn from(settings: &SiteSettings) -> Self {
        Self {
            site_url: settings.public_url.as_str().trim_end_matches('/').to_string(),
            tools_category: settings.tools_category.clone(),
            packages_category: settings.packages_category.clone(),
            popular_tools: settings.popular_tools.clone(),
        }
    }
}

#[derive(Clone)]
pub struct SitemapService {
    content: Arc<ContentService>,
    config: SitemapConfig,
}

impl SitemapService {
    pub fn new(content: Arc<ContentService>, config: SitemapConfig) -> Self {
        Self { content, config }
    }

    pub fn index_xml(&self) -> String {
        index_xml(&self.config.site_url, OffsetDateTime::now_utc())
    }

    /// Render one category sitemap. Never fails; a failed fetch leaves its
    /// section empty.
    pub async fn document_xml(&self, document: SitemapDocument) -> String {
        let now = OffsetDateTime::now_utc();
        let mut entries = self.curated_entries(document, now);

        match self.fetched_entries(document, now).await {
            Ok(fetched) => {
                let listed: HashSet<String> =
                    entries.iter().map(|entry| entry.loc.clone()).collect();
                entries.extend(
                    fetched
                        .into_iter()
                        .filter(|entry| !listed.contains(&entry.loc)),
                );
            }
            Err(err) => {
                warn!(
                    target = SOURCE,
                    document = document.file_name(),
                    error = %err,
                    error_kind = err.code(),
                    "serving sitemap without upstream entries"
                );
            }
        }

        urlset_xml(&entries)
    }

    pub fn robots_txt(&self) -> String {
        let sitemap_url = page_url(&self.config.site_url, "sitemap-index.xml");
        format!("User-agent: *\nAllow: /\nSitemap: {sitemap_url}\n")
    }

    /// Entries that do not depend on the backend.
    pub fn curated_entries(
        &self,
        document: SitemapDocument,
        now: OffsetDateTime,
    ) -> Vec<SitemapEntry> {
        match document {
            SitemapDocument::Static => static_entries(&self.config.site_url, now),
            SitemapDocument::Tools => project_slugs(
                ContentKind::PopularTool,
                &self.config.popular_tools,
                &self.config.site_url,
                now,
            ),
            SitemapDocument::Packages
            | SitemapDocument::Blog
            | SitemapDocument::Pages
            | SitemapDocument::Products => Vec::new(),
        }
    }

    /// Entries projected from backend content.
    pub async fn fetched_entries(
        &self,
        document: SitemapDocument,
        now: OffsetDateTime,
    ) -> Result<Vec<SitemapEntry>, FetchError> {
        let fetched: Vec<ContentItem>;
        let catalog: Arc<Vec<ContentItem>>;
        let (kind, items): (ContentKind, &[ContentItem]) = match document {
            SitemapDocument::Static => return Ok(Vec::new()),
            SitemapDocument::Tools => {
                fetched = self.content.products_in(&self.config.tools_category).await?;
                (ContentKind::Tool, fetched.as_slice())
            }
            SitemapDocument::Packages => {
                fetched = self
                    .content
                    .products_in(&self.config.packages_category)
                    .await?;
                (ContentKind::Package, fetched.as_slice())
            }
            SitemapDocument::Blog => {
                fetched = self.content.posts().await?;
                (ContentKind::Post, fetched.as_slice())
            }
            SitemapDocument::Pages => {
                fetched = self.content.pages().await?;
                (ContentKind::WordPressPage, fetched.as_slice())
            }
            SitemapDocument::Products => {
                catalog = self.content.all_products().await?;
                (ContentKind::Product, catalog.as_slice())
            }
        };

        let entries = project(kind, items, &self.config.site_url, now);
        debug!(
            target = SOURCE,
            kind = kind.as_str(),
            fetched = items.len(),
            listed = entries.len(),
            "projected sitemap entries"
        );
        Ok(entries)
    }
}
