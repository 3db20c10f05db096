//! Process-wide cache slots for navigation and catalog data.
//!
//! Slots are filled lazily by the content service and emptied only by
//! explicit invalidation. There is no TTL and no size bound; the cached
//! collections are bounded by what the backend publishes.

use std::sync::{Arc, RwLock};

use metrics::counter;
use time::OffsetDateTime;

use crate::domain::content::ContentItem;
use crate::domain::navigation::NavigationItem;

use super::keys::CacheName;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// A cached value together with the time it was fetched upstream.
#[derive(Debug)]
pub struct CacheEntry<T> {
    pub value: Arc<T>,
    pub fetched_at: OffsetDateTime,
}

impl<T> Clone for CacheEntry<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            fetched_at: self.fetched_at,
        }
    }
}

type Slot<T> = RwLock<Option<CacheEntry<T>>>;

/// Keyed in-memory slots shared by every request handler.
///
/// Locks are held only long enough to clone or replace an `Arc`, never across
/// an upstream fetch.
#[derive(Default)]
pub struct CacheStore {
    navigation: Slot<Vec<NavigationItem>>,
    all_products: Slot<Vec<ContentItem>>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigation(&self) -> Option<CacheEntry<Vec<NavigationItem>>> {
        read_slot(&self.navigation, CacheName::Navigation)
    }

    pub fn set_navigation(&self, items: Vec<NavigationItem>) -> CacheEntry<Vec<NavigationItem>> {
        write_slot(&self.navigation, items)
    }

    pub fn all_products(&self) -> Option<CacheEntry<Vec<ContentItem>>> {
        read_slot(&self.all_products, CacheName::AllProducts)
    }

    pub fn set_all_products(&self, items: Vec<ContentItem>) -> CacheEntry<Vec<ContentItem>> {
        write_slot(&self.all_products, items)
    }

    /// Drop the entry for `name`. Returns whether an entry was present.
    pub fn invalidate(&self, name: CacheName) -> bool {
        let removed = match name {
            CacheName::Navigation => clear_slot(&self.navigation),
            CacheName::AllProducts => clear_slot(&self.all_products),
        };
        if removed {
            counter!("storefront_cache_invalidate_total", "cache" => name.as_str()).increment(1);
        }
        removed
    }

    /// Drop every entry, returning the names that held a value.
    pub fn invalidate_all(&self) -> Vec<CacheName> {
        CacheName::ALL
            .into_iter()
            .filter(|name| self.invalidate(*name))
            .collect()
    }
}

fn read_slot<T>(slot: &Slot<T>, name: CacheName) -> Option<CacheEntry<T>> {
    let entry = rw_read(slot, SOURCE, "read").clone();
    if entry.is_some() {
        counter!("storefront_cache_hit_total", "cache" => name.as_str()).increment(1);
    } else {
        counter!("storefront_cache_miss_total", "cache" => name.as_str()).increment(1);
    }
    entry
}

fn write_slot<T>(slot: &Slot<T>, value: T) -> CacheEntry<T> {
    let entry = CacheEntry {
        value: Arc::new(value),
        fetched_at: OffsetDateTime::now_utc(),
    };
    *rw_write(slot, SOURCE, "write") = Some(entry.clone());
    entry
}

fn clear_slot<T>(slot: &Slot<T>) -> bool {
    rw_write(slot, SOURCE, "clear").take().is_some()
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use super::*;
    use crate::domain::content::ContentStatus;

    fn product(id: u64) -> ContentItem {
        ContentItem {
            id,
            slug: format!("product-{id}"),
            title: format!("Product {id}"),
            status: ContentStatus::Publish,
            created_at: None,
            modified_at: None,
            categories: Vec::new(),
            price: Some("10.00".to_string()),
        }
    }

    #[test]
    fn slots_start_empty() {
        let store = CacheStore::new();
        assert!(store.navigation().is_none());
        assert!(store.all_products().is_none());
    }

    #[test]
    fn set_then_read_shares_value() {
        let store = CacheStore::new();
        let written = store.set_all_products(vec![product(1), product(2)]);

        let cached = store.all_products().expect("cached products");
        assert!(Arc::ptr_eq(&written.value, &cached.value));
        assert_eq!(cached.value.len(), 2);
        assert_eq!(cached.fetched_at, written.fetched_at);
    }

    #[test]
    fn invalidate_reports_presence() {
        let store = CacheStore::new();
        assert!(!store.invalidate(CacheName::Navigation));

        store.set_navigation(Vec::new());
        assert!(store.invalidate(CacheName::Navigation));
        assert!(store.navigation().is_none());
    }

    #[test]
    fn invalidate_all_is_idempotent() {
        let store = CacheStore::new();
        store.set_all_products(vec![product(1)]);

        assert_eq!(store.invalidate_all(), vec![CacheName::AllProducts]);
        assert!(store.invalidate_all().is_empty());
        assert!(store.all_products().is_none());
    }

    #[test]
    fn store_recovers_from_poisoned_lock() {
        let store = CacheStore::new();

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store
                .all_products
                .write()
                .expect("all_products lock should be acquired");
            panic!("poison all_products lock");
        }));

        store.set_all_products(vec![product(3)]);
        assert!(store.all_products().is_some());
    }
}
