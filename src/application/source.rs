//! Seam between application services and the remote content backend.

use std::error::Error as StdError;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::content::ContentItem;
use crate::domain::navigation::MenuEntry;

pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("configuration error: {message}")]
    Configuration { message: String },
    #[error("request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: BoxError,
    },
    #[error("backend answered {url} with HTTP {status}")]
    HttpStatus { status: u16, url: String },
    #[error("malformed response from {url}: {message}")]
    Parse { url: String, message: String },
}

impl FetchError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn network(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Network {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    pub fn parse(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            FetchError::Configuration { .. } => "configuration",
            FetchError::Network { .. } => "network",
            FetchError::HttpStatus { .. } => "http_status",
            FetchError::Parse { .. } => "parse",
        }
    }
}

/// Remote collections that can be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteCollection {
    Pages,
    Posts,
    Products,
}

impl RemoteCollection {
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteCollection::Pages => "pages",
            RemoteCollection::Posts => "posts",
            RemoteCollection::Products => "products",
        }
    }
}

/// Whether intermediaries between us and the backend may serve cached copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    #[default]
    Default,
    NoCache,
}

/// Read-only access to backend content.
///
/// Each call is independent: a failure for one collection says nothing
/// about the others.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_list(
        &self,
        collection: RemoteCollection,
        freshness: Freshness,
    ) -> Result<Vec<ContentItem>, FetchError>;

    async fn fetch_navigation(&self, freshness: Freshness) -> Result<Vec<MenuEntry>, FetchError>;

    async fn fetch_chat_settings(
        &self,
        freshness: Freshness,
    ) -> Result<serde_json::Value, FetchError>;
}
