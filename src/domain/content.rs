//! Remote content items and the kinds that govern how they are shaped.

use time::OffsetDateTime;

/// Publication status as reported by WordPress and WooCommerce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentStatus {
    Publish,
    Future,
    Draft,
    Pending,
    Private,
    Trash,
    Other(String),
}

impl ContentStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "publish" => Self::Publish,
            "future" => Self::Future,
            "draft" => Self::Draft,
            "pending" => Self::Pending,
            "private" => Self::Private,
            "trash" => Self::Trash,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Publish)
    }
}

/// A page, post or product fetched from the backend.
///
/// Tools and packages are products distinguished by category, so a single
/// record shape covers every remote kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub status: ContentStatus,
    pub created_at: Option<OffsetDateTime>,
    pub modified_at: Option<OffsetDateTime>,
    /// Category slugs; empty for pages and posts.
    pub categories: Vec<String>,
    pub price: Option<String>,
}

impl ContentItem {
    pub fn in_category(&self, category: &str) -> bool {
        self.categories.iter().any(|slug| slug == category)
    }

    /// Last modification time, falling back to creation time.
    pub fn last_modified(&self) -> Option<OffsetDateTime> {
        self.modified_at.or(self.created_at)
    }

    /// Path segment identifying the item: its slug, or the numeric id when the
    /// slug is blank.
    pub fn path_segment(&self) -> String {
        let slug = self.slug.trim();
        if slug.is_empty() {
            self.id.to_string()
        } else {
            slug.to_string()
        }
    }
}

/// Category of content governing sitemap shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    StaticPage,
    Tool,
    PopularTool,
    Package,
    Post,
    Product,
    WordPressPage,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::StaticPage => "static_page",
            ContentKind::Tool => "tool",
            ContentKind::PopularTool => "popular_tool",
            ContentKind::Package => "package",
            ContentKind::Post => "post",
            ContentKind::Product => "product",
            ContentKind::WordPressPage => "wordpress_page",
        }
    }
}
