//! Wire shapes of the WordPress and WooCommerce REST responses.

use quick_xml::escape::{resolve_html5_entity, unescape_with};
use serde::Deserialize;
use time::{OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339};

use crate::domain::content::{ContentItem, ContentStatus};
use crate::domain::navigation::MenuEntry;

#[derive(Debug, Default, Deserialize)]
pub struct Rendered {
    #[serde(default)]
    pub rendered: String,
}

/// A `wp/v2` page or post.
#[derive(Debug, Deserialize)]
pub struct WpContent {
    pub id: u64,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub date_gmt: Option<String>,
    #[serde(default)]
    pub modified_gmt: Option<String>,
}

impl From<WpContent> for ContentItem {
    fn from(wire: WpContent) -> Self {
        ContentItem {
            id: wire.id,
            slug: wire.slug,
            title: decode_entities(&wire.title.rendered),
            status: ContentStatus::parse(&wire.status),
            created_at: wire.date_gmt.as_deref().and_then(parse_gmt),
            modified_at: wire.modified_gmt.as_deref().and_then(parse_gmt),
            categories: Vec::new(),
            price: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WcCategory {
    #[serde(default)]
    pub slug: String,
}

/// A `wc/v3` product.
#[derive(Debug, Deserialize)]
pub struct WcProduct {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub date_created_gmt: Option<String>,
    #[serde(default)]
    pub date_modified_gmt: Option<String>,
    #[serde(default)]
    pub categories: Vec<WcCategory>,
    #[serde(default)]
    pub price: Option<String>,
}

impl From<WcProduct> for ContentItem {
    fn from(wire: WcProduct) -> Self {
        ContentItem {
            id: wire.id,
            slug: wire.slug,
            title: decode_entities(&wire.name),
            status: ContentStatus::parse(&wire.status),
            created_at: wire.date_created_gmt.as_deref().and_then(parse_gmt),
            modified_at: wire.date_modified_gmt.as_deref().and_then(parse_gmt),
            categories: wire
                .categories
                .into_iter()
                .map(|category| category.slug)
                .filter(|slug| !slug.is_empty())
                .collect(),
            price: wire.price.filter(|price| !price.trim().is_empty()),
        }
    }
}

/// A `wp/v2/menu-items` entry.
#[derive(Debug, Deserialize)]
pub struct WpMenuItem {
    pub id: u64,
    #[serde(default)]
    pub title: Rendered,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub parent: u64,
    #[serde(default)]
    pub menu_order: i64,
}

impl From<WpMenuItem> for MenuEntry {
    fn from(wire: WpMenuItem) -> Self {
        MenuEntry {
            id: wire.id,
            parent: wire.parent,
            order: wire.menu_order,
            label: decode_entities(&wire.title.rendered),
            url: wire.url,
        }
    }
}

/// Parse a `*_gmt` timestamp (`2024-01-02T03:04:05`), accepting RFC 3339 too.
pub fn parse_gmt(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let format =
        time::macros::format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    PrimitiveDateTime::parse(raw, format)
        .map(PrimitiveDateTime::assume_utc)
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339))
        .ok()
}

/// Longest `&name;` sequence worth resolving, delimiters included.
const MAX_ENTITY_LEN: usize = 40;

/// Decode the HTML entities WordPress emits in rendered titles. Unknown or
/// malformed references are kept verbatim.
pub fn decode_entities(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('&') {
        output.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let decoded = candidate
            .find(';')
            .filter(|end| *end <= MAX_ENTITY_LEN)
            .and_then(|end| {
                unescape_with(&candidate[..=end], resolve_html5_entity)
                    .ok()
                    .map(|text| (text, end))
            });

        match decoded {
            Some((text, end)) => {
                output.push_str(&text);
                rest = &candidate[end + 1..];
            }
            None => {
                output.push('&');
                rest = &candidate[1..];
            }
        }
    }

    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gmt_dates_are_utc() {
        let parsed = parse_gmt("2024-06-10T06:13:20").expect("gmt timestamp");
        assert_eq!(parsed.unix_timestamp(), 1_718_000_000);

        let rfc = parse_gmt("2024-06-10T08:13:20+02:00").expect("rfc3339 timestamp");
        assert_eq!(rfc.unix_timestamp(), 1_718_000_000);

        assert_eq!(parse_gmt(""), None);
        assert_eq!(parse_gmt("yesterday"), None);
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(
            decode_entities("Tips &amp; Tricks &#8211; Part&nbsp;2"),
            "Tips & Tricks \u{2013} Part\u{a0}2"
        );
        assert_eq!(decode_entities("It&#x2019;s"), "It\u{2019}s");
        assert_eq!(decode_entities("AT&T; R&D"), "AT&T; R&D");
        assert_eq!(decode_entities("trailing &"), "trailing &");
        assert_eq!(decode_entities("Caf&eacute; &euro;5"), "Caf\u{e9} \u{20ac}5");
        assert_eq!(decode_entities("&bogus; &#xZZ;"), "&bogus; &#xZZ;");
    }

    #[test]
    fn product_wire_maps_categories_and_price() {
        let wire: WcProduct = serde_json::from_value(serde_json::json!({
            "id": 12,
            "name": "SEO &amp; Audit",
            "slug": "seo-audit",
            "status": "publish",
            "date_created_gmt": "2024-01-02T03:04:05",
            "date_modified_gmt": null,
            "categories": [{ "id": 3, "slug": "tools" }, { "id": 4, "slug": "" }],
            "price": ""
        }))
        .expect("product json");

        let item = ContentItem::from(wire);
        assert_eq!(item.title, "SEO & Audit");
        assert_eq!(item.categories, vec!["tools".to_string()]);
        assert_eq!(item.price, None);
        assert!(item.created_at.is_some());
        assert_eq!(item.modified_at, None);
    }

    #[test]
    fn content_wire_tolerates_missing_fields() {
        let wire: WpContent =
            serde_json::from_value(serde_json::json!({ "id": 5 })).expect("minimal json");
        let item = ContentItem::from(wire);
        assert_eq!(item.slug, "");
        assert_eq!(item.status, ContentStatus::Other(String::new()));
    }
}
