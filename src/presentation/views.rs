//! JSON-facing view models.

use serde::Serialize;

use crate::cache::CacheName;

#[derive(Debug, Clone, Serialize)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavigationLinkView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductNameView {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductNamesView {
    pub success: bool,
    pub count: usize,
    pub products: Vec<ProductNameView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshView {
    pub success: bool,
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheView {
    pub success: bool,
    pub message: String,
    pub cleared: Vec<CacheName>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total_quantity: u64,
    /// Sum of priced lines, absent when no line could be priced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<String>,
    pub unknown_products: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product_id: u64,
    pub name: String,
    pub slug: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_total: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReportView {
    pub success: bool,
    pub probes: Vec<ProbeView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeView {
    pub name: &'static str,
    pub ok: bool,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,
}
