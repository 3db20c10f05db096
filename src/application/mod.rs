//! Application services layer.

pub mod cart;
pub mod catalog;
pub mod chrome;
pub mod content;
pub mod error;
pub mod sitemap;
pub mod source;
