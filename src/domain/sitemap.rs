//! Sitemap entries, per-kind shaping rules and sitemaps.org XML output.

use std::fmt;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use super::content::{ContentItem, ContentKind};

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl ChangeFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
        }
    }
}

/// Crawl priority, always within `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Priority(f32);

impl Priority {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(0.5);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub last_modified: OffsetDateTime,
    pub change_frequency: ChangeFrequency,
    pub priority: Priority,
}

/// Fixed shaping rules for one content kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindRules {
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
    /// Keep only published items with a non-empty slug.
    pub published_only: bool,
    /// Path prefix under the site root, without trailing slash.
    pub path_prefix: &'static str,
}

const KIND_RULES: [(ContentKind, KindRules); 7] = [
    (
        ContentKind::StaticPage,
        KindRules {
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.6,
            published_only: false,
            path_prefix: "",
        },
    ),
    (
        ContentKind::Tool,
        KindRules {
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.8,
            published_only: false,
            path_prefix: "/tools",
        },
    ),
    (
        ContentKind::PopularTool,
        KindRules {
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.9,
            published_only: false,
            path_prefix: "/tools",
        },
    ),
    (
        ContentKind::Package,
        KindRules {
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.8,
            published_only: false,
            path_prefix: "/packages",
        },
    ),
    (
        ContentKind::Post,
        KindRules {
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.5,
            published_only: true,
            path_prefix: "/blog",
        },
    ),
    (
        ContentKind::Product,
        KindRules {
            change_frequency: ChangeFrequency::Weekly,
            priority: 0.7,
            published_only: false,
            path_prefix: "/product",
        },
    ),
    (
        ContentKind::WordPressPage,
        KindRules {
            change_frequency: ChangeFrequency::Monthly,
            priority: 0.6,
            published_only: true,
            path_prefix: "",
        },
    ),
];

impl ContentKind {
    /// Shaping rules for this kind. Static pages use the per-page table in
    /// [`STATIC_PAGES`]; their entry here is the fallback.
    pub fn rules(self) -> KindRules {
        KIND_RULES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, rules)| *rules)
            .unwrap_or(KIND_RULES[0].1)
    }
}

/// A fixed storefront route listed in the static sitemap.
#[derive(Debug, Clone, Copy)]
pub struct StaticPage {
    pub path: &'static str,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

pub const STATIC_PAGES: [StaticPage; 7] = [
    StaticPage {
        path: "/",
        change_frequency: ChangeFrequency::Daily,
        priority: 1.0,
    },
    StaticPage {
        path: "/tools",
        change_frequency: ChangeFrequency::Daily,
        priority: 0.9,
    },
    StaticPage {
        path: "/packages",
        change_frequency: ChangeFrequency::Weekly,
        priority: 0.9,
    },
    StaticPage {
        path: "/blog",
        change_frequency: ChangeFrequency::Daily,
        priority: 0.8,
    },
    StaticPage {
        path: "/about",
        change_frequency: ChangeFrequency::Weekly,
        priority: 0.7,
    },
    StaticPage {
        path: "/contact",
        change_frequency: ChangeFrequency::Weekly,
        priority: 0.7,
    },
    StaticPage {
        path: "/cart",
        change_frequency: ChangeFrequency::Weekly,
        priority: 0.6,
    },
];

/// Project remote items of `kind` into sitemap entries, preserving order.
pub fn project(
    kind: ContentKind,
    items: &[ContentItem],
    site_url: &str,
    now: OffsetDateTime,
) -> Vec<SitemapEntry> {
    let rules = kind.rules();
    items
        .iter()
        .filter(|item| {
            !rules.published_only || (item.status.is_published() && !item.slug.trim().is_empty())
        })
        .map(|item| SitemapEntry {
            loc: item_url(site_url, rules.path_prefix, &item.path_segment()),
            last_modified: item.last_modified().unwrap_or(now),
            change_frequency: rules.change_frequency,
            priority: Priority::new(rules.priority),
        })
        .collect()
}

/// Entries for curated slugs, which carry no item data of their own.
pub fn project_slugs(
    kind: ContentKind,
    slugs: &[String],
    site_url: &str,
    now: OffsetDateTime,
) -> Vec<SitemapEntry> {
    let rules = kind.rules();
    slugs
        .iter()
        .map(|slug| slug.trim())
        .filter(|slug| !slug.is_empty())
        .map(|slug| SitemapEntry {
            loc: item_url(site_url, rules.path_prefix, slug),
            last_modified: now,
            change_frequency: rules.change_frequency,
            priority: Priority::new(rules.priority),
        })
        .collect()
}

pub fn static_entries(site_url: &str, now: OffsetDateTime) -> Vec<SitemapEntry> {
    STATIC_PAGES
        .iter()
        .map(|page| SitemapEntry {
            loc: page_url(site_url, page.path),
            last_modified: now,
            change_frequency: page.change_frequency,
            priority: Priority::new(page.priority),
        })
        .collect()
}

/// Absolute URL for a path below the site root.
pub fn page_url(site_url: &str, path: &str) -> String {
    let base = site_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

fn item_url(site_url: &str, prefix: &str, segment: &str) -> String {
    let base = site_url.trim_end_matches('/');
    format!("{base}{prefix}/{segment}")
}

/// The category sitemaps referenced from the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapDocument {
    Static,
    Tools,
    Packages,
    Blog,
    Pages,
    Products,
}

impl SitemapDocument {
    pub const ALL: [SitemapDocument; 6] = [
        SitemapDocument::Static,
        SitemapDocument::Tools,
        SitemapDocument::Packages,
        SitemapDocument::Blog,
        SitemapDocument::Pages,
        SitemapDocument::Products,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            SitemapDocument::Static => "sitemap-static.xml",
            SitemapDocument::Tools => "sitemap-tools.xml",
            SitemapDocument::Packages => "sitemap-packages.xml",
            SitemapDocument::Blog => "sitemap-blog.xml",
            SitemapDocument::Pages => "sitemap-pages.xml",
            SitemapDocument::Products => "sitemap-products.xml",
        }
    }
}

/// Serialize entries as a `<urlset>` document.
pub fn urlset_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(&format!("<urlset xmlns=\"{SITEMAP_NAMESPACE}\">\n"));
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", xml_escape(&entry.loc)));
        if let Ok(lastmod) = entry.last_modified.format(&Rfc3339) {
            xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
        }
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            entry.change_frequency.as_str()
        ));
        xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Serialize a `<sitemapindex>` pointing at every category sitemap.
pub fn index_xml(site_url: &str, generated_at: OffsetDateTime) -> String {
    let lastmod = generated_at.format(&Rfc3339).ok();
    let mut xml = String::from(XML_DECLARATION);
    xml.push_str(&format!("<sitemapindex xmlns=\"{SITEMAP_NAMESPACE}\">\n"));
    for document in SitemapDocument::ALL {
        xml.push_str("  <sitemap>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            xml_escape(&page_url(site_url, document.file_name()))
        ));
        if let Some(lastmod) = lastmod.as_deref() {
            xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
        }
        xml.push_str("  </sitemap>\n");
    }
    xml.push_str("</sitemapindex>\n");
    xml
}

fn xml_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::ContentStatus;

    const SITE: &str = "https://shop.example/";

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_718_000_000).expect("timestamp")
    }

    fn item(id: u64, slug: &str, status: ContentStatus) -> ContentItem {
        ContentItem {
            id,
            slug: slug.to_string(),
            title: format!("Item {id}"),
            status,
            created_at: None,
            modified_at: None,
            categories: Vec::new(),
            price: None,
        }
    }

    #[test]
    fn unpublished_and_slugless_items_are_filtered_for_pages() {
        let items = vec![
            item(1, "about-us", ContentStatus::Publish),
            item(2, "draft-page", ContentStatus::Draft),
            item(3, "", ContentStatus::Publish),
            item(4, "private", ContentStatus::Private),
        ];
        for kind in [ContentKind::WordPressPage, ContentKind::Post] {
            let entries = project(kind, &items, SITE, now());
            assert_eq!(entries.len(), 1, "kind {kind:?}");
            assert!(entries[0].loc.ends_with("/about-us"));
        }
    }

    #[test]
    fn product_kinds_keep_every_item() {
        let items = vec![
            item(1, "seo-audit", ContentStatus::Draft),
            item(2, "", ContentStatus::Other("unknown".into())),
        ];
        let entries = project(ContentKind::Tool, &items, SITE, now());
        let locs: Vec<&str> = entries.iter().map(|e| e.loc.as_str()).collect();
        assert_eq!(
            locs,
            vec!["https://shop.example/tools/seo-audit", "https://shop.example/tools/2"]
        );
    }

    #[test]
    fn rules_are_fixed_per_kind_regardless_of_content() {
        let mut items = vec![item(1, "a", ContentStatus::Publish)];
        items[0].title = "Priority 1.0 daily".to_string();

        let expected = [
            (ContentKind::Tool, ChangeFrequency::Weekly, 0.8),
            (ContentKind::PopularTool, ChangeFrequency::Weekly, 0.9),
            (ContentKind::Package, ChangeFrequency::Weekly, 0.8),
            (ContentKind::Post, ChangeFrequency::Weekly, 0.5),
            (ContentKind::WordPressPage, ChangeFrequency::Monthly, 0.6),
            (ContentKind::Product, ChangeFrequency::Weekly, 0.7),
        ];
        for (kind, frequency, priority) in expected {
            let entries = project(kind, &items, SITE, now());
            assert_eq!(entries[0].change_frequency, frequency, "kind {kind:?}");
            assert_eq!(entries[0].priority, Priority::new(priority), "kind {kind:?}");
        }
    }

    #[test]
    fn every_kind_has_rules() {
        let kinds = [
            ContentKind::StaticPage,
            ContentKind::Tool,
            ContentKind::PopularTool,
            ContentKind::Package,
            ContentKind::Post,
            ContentKind::Product,
            ContentKind::WordPressPage,
        ];
        for kind in kinds {
            let rules = kind.rules();
            assert!((0.0..=1.0).contains(&rules.priority));
        }
    }

    #[test]
    fn last_modified_falls_back_to_created_then_now() {
        let created = OffsetDateTime::from_unix_timestamp(1_600_000_000).expect("timestamp");
        let modified = OffsetDateTime::from_unix_timestamp(1_650_000_000).expect("timestamp");

        let mut with_both = item(1, "a", ContentStatus::Publish);
        with_both.created_at = Some(created);
        with_both.modified_at = Some(modified);
        let mut created_only = item(2, "b", ContentStatus::Publish);
        created_only.created_at = Some(created);
        let neither = item(3, "c", ContentStatus::Publish);

        let entries = project(
            ContentKind::Post,
            &[with_both, created_only, neither],
            SITE,
            now(),
        );
        assert_eq!(entries[0].last_modified, modified);
        assert_eq!(entries[1].last_modified, created);
        assert_eq!(entries[2].last_modified, now());
    }

    #[test]
    fn static_pages_use_their_own_table() {
        let entries = static_entries(SITE, now());
        assert_eq!(entries.len(), STATIC_PAGES.len());
        assert_eq!(entries[0].loc, "https://shop.example/");
        assert_eq!(entries[0].priority, Priority::new(1.0));
        assert_eq!(entries[0].change_frequency, ChangeFrequency::Daily);
        for entry in &entries {
            assert!((0.6..=1.0).contains(&entry.priority.value()));
        }
    }

    #[test]
    fn curated_slugs_skip_blanks() {
        let slugs = vec!["keyword-planner".to_string(), " ".to_string()];
        let entries = project_slugs(ContentKind::PopularTool, &slugs, SITE, now());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].loc, "https://shop.example/tools/keyword-planner");
        assert_eq!(entries[0].priority.to_string(), "0.9");
    }

    #[test]
    fn urlset_serializes_entries_and_escapes() {
        let entries = vec![SitemapEntry {
            loc: "https://shop.example/search?q=a&b=<c>".to_string(),
            last_modified: now(),
            change_frequency: ChangeFrequency::Weekly,
            priority: Priority::new(0.8),
        }];
        let xml = urlset_xml(&entries);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset"));
        assert!(xml.contains("<loc>https://shop.example/search?q=a&amp;b=&lt;c&gt;</loc>"));
        assert!(xml.contains("<lastmod>2024-06-10T06:13:20Z</lastmod>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn empty_urlset_is_still_a_document() {
        let xml = urlset_xml(&[]);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n</urlset>\n"
        );
    }

    #[test]
    fn index_lists_all_category_sitemaps() {
        let xml = index_xml(SITE, now());
        assert_eq!(xml.matches("<sitemap>").count(), 6);
        for document in SitemapDocument::ALL {
            let loc = format!("<loc>https://shop.example/{}</loc>", document.file_name());
            assert!(xml.contains(&loc), "missing {loc}");
        }
        assert_eq!(xml.matches("<lastmod>2024-06-10T06:13:20Z</lastmod>").count(), 6);
    }

    #[test]
    fn priority_is_clamped() {
        assert_eq!(Priority::new(1.7).value(), 1.0);
        assert_eq!(Priority::new(-0.2).value(), 0.0);
        assert_eq!(Priority::new(f32::NAN).value(), 0.5);
    }
}
