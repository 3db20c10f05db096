//! Storefront cache.
//!
//! A single object cache for data that is expensive to fetch from the
//! backend and read on most requests:
//!
//! - `navigation`: the assembled menu tree
//! - `all-products`: the full WooCommerce product list
//!
//! Entries live until `invalidate`/`invalidate_all` or process exit. Concurrent
//! misses are not coalesced: every caller that observes an empty slot fetches
//! upstream and the last writer wins.

mod keys;
mod lock;
mod store;

pub use keys::CacheName;
pub use store::{CacheEntry, CacheStore};
