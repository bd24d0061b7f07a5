// src/crawl/scope.rs
// =============================================================================
// This module decides which URLs belong to the site we're mapping.
//
// A URL is in scope when:
// 1. Its origin (scheme + host + port) equals the seed's origin
// 2. Its path starts with the configured path prefix
//
// Out-of-scope links are never crawled and never recorded as edges.
//
// Optionally, links to obvious non-page files (images, PDFs, archives...)
// can be treated as out of scope too. This is off unless asked for.
// =============================================================================

use url::Url;

// File extensions that are never HTML pages
const ASSET_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico",
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    ".zip", ".rar", ".tar", ".gz",
    ".mp4", ".avi", ".mov", ".wmv",
    ".mp3", ".wav", ".ogg",
    ".css", ".js", ".json", ".xml",
    ".woff", ".woff2", ".ttf", ".eot",
];

// True iff `candidate` has origin `root_origin` and its path starts with
// `path_prefix`
//
// root_origin is the serialized form, e.g. "https://example.com" or
// "http://localhost:8080"
pub fn in_scope(candidate: &Url, root_origin: &str, path_prefix: &str) -> bool {
    candidate.origin().ascii_serialization() == root_origin
        && candidate.path().starts_with(path_prefix)
}

// The scope of one crawl run, fixed at startup from the seed URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    origin: String,
    path_prefix: String,
    skip_assets: bool,
}

impl Scope {
    // Builds the scope for a crawl rooted at `seed`
    //
    // A prefix without a leading slash gets one; an empty prefix means
    // "the whole origin".
    pub fn new(seed: &Url, path_prefix: &str) -> Self {
        let path_prefix = if path_prefix.starts_with('/') {
            path_prefix.to_string()
        } else {
            format!("/{}", path_prefix)
        };

        Self {
            origin: seed.origin().ascii_serialization(),
            path_prefix,
            skip_assets: false,
        }
    }

    pub fn with_asset_filter(mut self, skip_assets: bool) -> Self {
        self.skip_assets = skip_assets;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    pub fn contains(&self, candidate: &Url) -> bool {
        if !in_scope(candidate, &self.origin, &self.path_prefix) {
            return false;
        }
        !(self.skip_assets && is_asset(candidate))
    }
}

fn is_asset(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_same_origin_under_prefix() {
        let scope = Scope::new(&url("https://example.com/a"), "/a");
        assert!(scope.contains(&url("https://example.com/a")));
        assert!(scope.contains(&url("https://example.com/a/b")));
        assert!(scope.contains(&url("https://example.com/a/b?page=2")));
    }

    #[test]
    fn test_outside_prefix() {
        let scope = Scope::new(&url("https://example.com/a"), "/a");
        assert!(!scope.contains(&url("https://example.com/outside")));
        assert!(!scope.contains(&url("https://example.com/")));
    }

    #[test]
    fn test_origin_mismatch() {
        let scope = Scope::new(&url("https://example.com/a"), "/");
        assert!(!scope.contains(&url("https://other.com/a")));
        assert!(!scope.contains(&url("http://example.com/a")));
        assert!(!scope.contains(&url("https://example.com:8443/a")));
        assert!(!scope.contains(&url("https://sub.example.com/a")));
    }

    #[test]
    fn test_prefix_gets_leading_slash() {
        let scope = Scope::new(&url("https://example.com/"), "docs");
        assert_eq!(scope.path_prefix(), "/docs");
        assert!(scope.contains(&url("https://example.com/docs/intro")));

        let whole_site = Scope::new(&url("https://example.com/"), "");
        assert_eq!(whole_site.path_prefix(), "/");
    }

    #[test]
    fn test_in_scope_with_port() {
        let candidate = url("http://localhost:8080/a/b");
        assert!(in_scope(&candidate, "http://localhost:8080", "/a"));
        assert!(!in_scope(&candidate, "http://localhost", "/a"));
    }

    #[test]
    fn test_asset_filter_is_opt_in() {
        let seed = url("https://example.com/");
        let pdf = url("https://example.com/files/Report.PDF");

        assert!(Scope::new(&seed, "/").contains(&pdf));
        assert!(!Scope::new(&seed, "/").with_asset_filter(true).contains(&pdf));
        assert!(Scope::new(&seed, "/")
            .with_asset_filter(true)
            .contains(&url("https://example.com/files/report.html")));
    }
}
