use std::sync::Arc;

use url::Url;

use crate::application::content::ContentService;
use crate::application::source::FetchError;
use crate::domain::navigation::NavigationItem;
use crate::presentation::views::{NavigationLinkView, NavigationView};

/// Site navigation as presented to the storefront.
#[derive(Clone)]
pub struct ChromeService {
    content: Arc<ContentService>,
    backend: Option<Url>,
}

impl ChromeService {
    /// `backend` is the WordPress origin; links pointing at it are rewritten
    /// to site-relative paths.
    pub fn new(content: Arc<ContentService>, backend: Option<Url>) -> Self {
        Self { content, backend }
    }

    pub async fn navigation(&self) -> Result<NavigationView, FetchError> {
        let items = self.content.navigation().await?;
        let entries = items
            .iter()
            .map(|item| map_navigation_item(item, self.backend.as_ref()))
            .collect();
        Ok(NavigationView { entries })
    }
}

fn map_navigation_item(item: &NavigationItem, backend: Option<&Url>) -> NavigationLinkView {
    let children = item
        .children
        .iter()
        .map(|child| map_navigation_item(child, backend))
        .collect();

    match classify(&item.url, backend) {
        Destination::Internal(href) => NavigationLinkView {
            label: item.label.clone(),
            href,
            target: None,
            rel: None,
            children,
        },
        Destination::External(href) => NavigationLinkView {
            label: item.label.clone(),
            href,
            target: Some("_blank"),
            rel: Some("noopener noreferrer"),
            children,
        },
    }
}

enum Destination {
    Internal(String),
    External(String),
}

fn classify(raw: &str, backend: Option<&Url>) -> Destination {
    let raw = raw.trim();
    if raw.is_empty() {
        return Destination::Internal("/".to_string());
    }
    if raw.starts_with('/') || raw.starts_with('#') {
        return Destination::Internal(raw.to_string());
    }

    let Ok(url) = Url::parse(raw) else {
        return Destination::Internal(raw.to_string());
    };
    if !matches!(url.scheme(), "http" | "https") {
        return Destination::External(raw.to_string());
    }

    let same_host = backend
        .and_then(|backend| backend.host_str())
        .zip(url.host_str())
        .is_some_and(|(backend, link)| backend.eq_ignore_ascii_case(link));
    if !same_host {
        return Destination::External(raw.to_string());
    }

    let mut href = url.path().to_string();
    if let Some(query) = url.query() {
        href.push('?');
        href.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        href.push('#');
        href.push_str(fragment);
    }
    Destination::Internal(href)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(label: &str, url: &str, children: Vec<NavigationItem>) -> NavigationItem {
        NavigationItem {
            id: 0,
            label: label.to_string(),
            url: url.to_string(),
            children,
        }
    }

    fn backend() -> Url {
        Url::parse("https://cms.shop.example/").expect("backend url")
    }

    #[test]
    fn backend_links_become_relative() {
        let link = map_navigation_item(
            &item("Tools", "https://cms.shop.example/tools/?sort=new#top", Vec::new()),
            Some(&backend()),
        );
        assert_eq!(link.href, "/tools/?sort=new#top");
        assert_eq!(link.target, None);
        assert_eq!(link.rel, None);
    }

    #[test]
    fn foreign_links_open_in_a_new_tab() {
        let link = map_navigation_item(
            &item("Docs", "https://docs.example.org/guide", Vec::new()),
            Some(&backend()),
        );
        assert_eq!(link.href, "https://docs.example.org/guide");
        assert_eq!(link.target, Some("_blank"));
        assert_eq!(link.rel, Some("noopener noreferrer"));
    }

    #[test]
    fn children_are_mapped_recursively() {
        let tree = item(
            "Shop",
            "/shop",
            vec![item("Sale", "https://CMS.shop.example/sale", Vec::new())],
        );
        let link = map_navigation_item(&tree, Some(&backend()));
        assert_eq!(link.href, "/shop");
        assert_eq!(link.children[0].href, "/sale");
    }

    #[test]
    fn without_a_backend_every_absolute_link_is_external() {
        let link = map_navigation_item(&item("Home", "https://cms.shop.example/", Vec::new()), None);
        assert_eq!(link.target, Some("_blank"));
    }

    #[test]
    fn blank_urls_point_home() {
        let link = map_navigation_item(&item("Home", "  ", Vec::new()), None);
        assert_eq!(link.href, "/");
    }
}
