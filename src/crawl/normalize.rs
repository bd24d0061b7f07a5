// src/crawl/normalize.rs
// =============================================================================
// This module turns raw href strings into canonical absolute URLs.
//
// Two URLs that point at the same page must compare equal, otherwise the
// visited set can't do its job. The `url` crate already does most of the
// canonical work for us when it parses:
// - lowercases the scheme and host
// - drops default ports (:80 for http, :443 for https)
// - resolves "." and ".." path segments
// - percent-encodes characters that need it
//
// On top of that we:
// - reject empty hrefs and non-web schemes (mailto:, javascript:, tel:, ...)
// - strip the #fragment, since it never changes which page is fetched
// =============================================================================

use thiserror::Error;
use url::Url;

// Why a link reference could not become a crawlable URL
//
// These are recoverable: the engine skips the single href and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedUrl {
    /// The href was empty or only whitespace
    #[error("empty link reference")]
    Empty,

    /// Resolved fine, but not something we can fetch over HTTP
    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),

    /// Not a valid URL reference at all
    #[error("invalid URL '{href}': {source}")]
    Invalid {
        href: String,
        #[source]
        source: url::ParseError,
    },
}

// Resolves `href` against the page it was found on
//
// Handles every form a browser would:
//   base = "https://example.com/a/b"
//   "c"                  -> https://example.com/a/c
//   "../x"               -> https://example.com/x
//   "/root"              -> https://example.com/root
//   "?q=1"               -> https://example.com/a/b?q=1
//   "//cdn.example.com/" -> https://cdn.example.com/
//   "#top"               -> https://example.com/a/b
pub fn normalize(base: &Url, href: &str) -> Result<Url, MalformedUrl> {
    let href = href.trim();
    if href.is_empty() {
        return Err(MalformedUrl::Empty);
    }

    let url = base.join(href).map_err(|source| MalformedUrl::Invalid {
        href: href.to_string(),
        source,
    })?;

    canonicalize(url)
}

// Parses the seed URL given by the user
//
// The seed has no page to be relative to, so it must be absolute.
pub fn normalize_seed(seed: &str) -> Result<Url, MalformedUrl> {
    let seed = seed.trim();
    if seed.is_empty() {
        return Err(MalformedUrl::Empty);
    }

    let url = Url::parse(seed).map_err(|source| MalformedUrl::Invalid {
        href: seed.to_string(),
        source,
    })?;

    canonicalize(url)
}

fn canonicalize(mut url: Url) -> Result<Url, MalformedUrl> {
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(MalformedUrl::UnsupportedScheme(other.to_string())),
    }

    url.set_fragment(None);
    Ok(url)
}
