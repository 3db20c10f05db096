use std::collections::HashMap;
use std::sync::Arc;

use crate::application::content::ContentService;
use crate::application::source::FetchError;
use crate::domain::cart::Cart;
use crate::domain::content::ContentItem;
use crate::presentation::views::{CartLineView, CartView};

/// Prices client carts against the cached catalog.
#[derive(Clone)]
pub struct CartService {
    content: Arc<ContentService>,
}

impl CartService {
    pub fn new(content: Arc<ContentService>) -> Self {
        Self { content }
    }

    pub async fn price(&self, cart: &Cart) -> Result<CartView, FetchError> {
        if cart.is_empty() {
            return Ok(price_cart(cart, &[]));
        }
        let products = self.content.all_products().await?;
        Ok(price_cart(cart, &products))
    }
}

fn price_cart(cart: &Cart, products: &[ContentItem]) -> CartView {
    let by_id: HashMap<u64, &ContentItem> =
        products.iter().map(|product| (product.id, product)).collect();

    let mut lines = Vec::with_capacity(cart.lines().len());
    let mut unknown_products = Vec::new();
    let mut subtotal: Option<i64> = None;

    for line in cart.lines() {
        let Some(product) = by_id.get(&line.product_id) else {
            unknown_products.push(line.product_id);
            continue;
        };

        let quantity = line.quantity.get();
        let unit_cents = product.price.as_deref().and_then(parse_cents);
        let line_cents = unit_cents.and_then(|unit| unit.checked_mul(i64::from(quantity)));
        if let Some(cents) = line_cents {
            subtotal = Some(subtotal.unwrap_or(0).saturating_add(cents));
        }

        lines.push(CartLineView {
            product_id: product.id,
            name: product.title.clone(),
            slug: product.slug.clone(),
            quantity,
            unit_price: unit_cents.map(format_cents),
            line_total: line_cents.map(format_cents),
        });
    }

    CartView {
        lines,
        total_quantity: cart.total_quantity(),
        subtotal: subtotal.map(format_cents),
        unknown_products,
    }
}

/// Parse a decimal price such as `"19.9"` or `"1200"` into cents.
///
/// Digits past the second decimal place must be zero.
fn parse_cents(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    if fraction.len() > 2 && fraction[2..].bytes().any(|b| b != b'0') {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut cents_text: String = fraction.chars().take(2).collect();
    while cents_text.len() < 2 {
        cents_text.push('0');
    }
    let cents: i64 = cents_text.parse().ok()?;
    whole.checked_mul(100)?.checked_add(cents)
}

fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::application::source::{ContentSource, Freshness, RemoteCollection};
    use crate::cache::CacheStore;
    use crate::domain::content::ContentStatus;
    use crate::domain::navigation::MenuEntry;

    struct Offline;

    #[async_trait]
    impl ContentSource for Offline {
        async fn fetch_list(
            &self,
            _collection: RemoteCollection,
            _freshness: Freshness,
        ) -> Result<Vec<ContentItem>, FetchError> {
            Err(FetchError::configuration("no backend"))
        }

        async fn fetch_navigation(
            &self,
            _freshness: Freshness,
        ) -> Result<Vec<MenuEntry>, FetchError> {
            Err(FetchError::configuration("no backend"))
        }

        async fn fetch_chat_settings(
            &self,
            _freshness: Freshness,
        ) -> Result<serde_json::Value, FetchError> {
            Err(FetchError::configuration("no backend"))
        }
    }

    fn offline_service() -> CartService {
        let content = ContentService::new(Arc::new(Offline), Arc::new(CacheStore::new()));
        CartService::new(Arc::new(content))
    }

    fn product(id: u64, price: Option<&str>) -> ContentItem {
        ContentItem {
            id,
            slug: format!("product-{id}"),
            title: format!("Product {id}"),
            status: ContentStatus::Publish,
            created_at: None,
            modified_at: None,
            categories: Vec::new(),
            price: price.map(str::to_string),
        }
    }

    #[test]
    fn prices_are_parsed_to_cents() {
        assert_eq!(parse_cents("19.99"), Some(1999));
        assert_eq!(parse_cents("19.9"), Some(1990));
        assert_eq!(parse_cents("1200"), Some(120_000));
        assert_eq!(parse_cents(".5"), Some(50));
        assert_eq!(parse_cents("4.5000"), Some(450));
        assert_eq!(parse_cents("4.505"), None);
        assert_eq!(parse_cents(""), None);
        assert_eq!(parse_cents("-3"), None);
        assert_eq!(parse_cents("free"), None);
    }

    #[test]
    fn cart_lines_are_priced_and_summed() {
        let cart = Cart::from_pairs([(1, 2), (2, 1), (1, 1)]).expect("valid cart");
        let view = price_cart(&cart, &[product(1, Some("10.50")), product(2, Some("3"))]);

        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.lines[0].quantity, 3);
        assert_eq!(view.lines[0].line_total.as_deref(), Some("31.50"));
        assert_eq!(view.subtotal.as_deref(), Some("34.50"));
        assert_eq!(view.total_quantity, 4);
        assert!(view.unknown_products.is_empty());
    }

    #[test]
    fn unknown_and_unpriced_products_do_not_fail_the_cart() {
        let cart = Cart::from_pairs([(1, 1), (9, 2)]).expect("valid cart");
        let view = price_cart(&cart, &[product(1, Some(""))]);

        assert_eq!(view.unknown_products, vec![9]);
        assert_eq!(view.lines[0].unit_price, None);
        assert_eq!(view.subtotal, None);
    }

    #[tokio::test]
    async fn empty_cart_is_priced_without_the_catalog() {
        let view = offline_service()
            .price(&Cart::new())
            .await
            .expect("empty cart needs no backend");
        assert!(view.lines.is_empty());
        assert_eq!(view.total_quantity, 0);
        assert_eq!(view.subtotal, None);
    }

    #[tokio::test]
    async fn non_empty_cart_needs_the_catalog() {
        let cart = Cart::from_pairs([(1, 1)]).expect("valid cart");
        let err = offline_service().price(&cart).await.expect_err("backend offline");
        assert_eq!(err.code(), "configuration");
    }
}
