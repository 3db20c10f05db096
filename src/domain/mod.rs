//! Domain layer types and invariants.

pub mod cart;
pub mod content;
pub mod error;
pub mod navigation;
pub mod sitemap;
