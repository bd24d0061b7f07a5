// src/fetch/http.rs
// =============================================================================
// PageFetcher over a plain HTTP client.
//
// Key functionality:
// - GET the page, following up to 5 redirects, and report where it ended up
// - Non-2xx status codes are failures
// - Only HTML responses are accepted (checked via the Content-Type header,
//   before the body is downloaded)
// - reqwest errors are mapped onto FetchError, keeping the original error
// =============================================================================

use super::{FetchError, FetchedPage, PageFetcher};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

const MAX_REDIRECTS: usize = 5;

// Content types we know how to pull links out of
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    // Client is cheap to clone and pools connections internally
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self { client })
    }

    // GET with the time budget applied; anything but 2xx is an error
    async fn get(&self, url: &Url, timeout: Duration) -> Result<Response, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| categorize_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedPage, FetchError> {
        let response = self.get(url, timeout).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        // Relative links on the page are relative to this, not to `url`
        let mut final_url = response.url().clone();
        final_url.set_fragment(None);

        let body = response
            .text()
            .await
            .map_err(|e| categorize_error(e, timeout))?;

        if final_url != *url {
            debug!(%url, %final_url, "followed redirect");
        }
        debug!(%url, bytes = body.len(), "fetched page");
        Ok(FetchedPage {
            final_url,
            content_type,
            body,
        })
    }

    async fn fetch_text(&self, url: &Url, timeout: Duration) -> Result<String, FetchError> {
        self.get(url, timeout)
            .await?
            .text()
            .await
            .map_err(|e| categorize_error(e, timeout))
    }
}

fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    HTML_CONTENT_TYPES.iter().any(|t| content_type.contains(t))
}

// Categorizes reqwest errors
//
// Timeouts get their own variant; everything else (DNS, refused
// connections, TLS, redirect loops, broken bodies) is a network error with
// the reqwest error attached as the source.
fn categorize_error(error: reqwest::Error, timeout: Duration) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(timeout)
    } else {
        FetchError::network(error)
    }
}
