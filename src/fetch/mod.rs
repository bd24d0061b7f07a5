// src/fetch/mod.rs
// =============================================================================
// This module defines how pages are fetched.
//
// The crawl engine doesn't care whether a page comes from a plain HTTP
// client or a headless browser. It only talks to the PageFetcher trait:
// give it a URL and a time budget, get back the page body or a FetchError.
//
// Submodules:
// - http: PageFetcher over reqwest (checks Content-Type before accepting)
//
// Besides pages, a fetcher can hand back plain text documents (robots.txt,
// sitemaps) for the sitemap discovery step.
//
// Errors are returned as values, never panics, and always keep the
// underlying cause so it can be logged.
// =============================================================================

mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

// Boxed cause of a transport failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// A page that was fetched and is worth parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Where the body actually came from, after redirects
    pub final_url: Url,
    pub content_type: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {source}")]
    Network {
        #[source]
        source: BoxError,
    },

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("unsupported content type '{0}'")]
    UnsupportedContentType(String),
}

impl FetchError {
    pub fn network(source: impl Into<BoxError>) -> Self {
        FetchError::Network {
            source: source.into(),
        }
    }

    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Timeout(_) => FetchErrorKind::Timeout,
            FetchError::Network { .. } => FetchErrorKind::Network,
            FetchError::HttpStatus(_) => FetchErrorKind::HttpStatus,
            FetchError::UnsupportedContentType(_) => FetchErrorKind::UnsupportedContentType,
        }
    }
}

/// Category of a fetch failure, as it appears in crawl output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Timeout,
    Network,
    HttpStatus,
    UnsupportedContentType,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    // Fetches `url`, giving up after `timeout`
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError>;

    // Fetches any text document, whatever its content type
    async fn fetch_text(&self, url: &Url, timeout: Duration) -> Result<String, FetchError>;
}
