//! WordPress and WooCommerce REST adapter.

mod client;
mod models;

pub use client::{WordPressClient, WordPressConfig};
