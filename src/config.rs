// src/config.rs
// =============================================================================
// Crawl settings, independent of where they came from.
//
// The CLI (src/cli.rs) parses flags and environment variables and turns them
// into a CrawlOptions value. The engine only ever sees CrawlOptions.
// =============================================================================

use clap::ValueEnum;
use std::time::Duration;

pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Order in which discovered pages are visited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TraversalMode {
    /// Stack discipline: the newest page's links are explored first
    #[default]
    #[value(alias = "dfs")]
    DepthFirst,
    /// Queue discipline: all pages at depth N before any at depth N+1
    #[value(alias = "bfs")]
    BreadthFirst,
}

// Tunable knobs for one crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Only paths starting with this are in scope ("/" = whole origin)
    pub path_prefix: String,
    /// Deepest page to fetch, seed = 1
    pub max_depth: usize,
    /// Hard ceiling on fetch attempts; None = unbounded
    pub max_pages: Option<usize>,
    pub mode: TraversalMode,
    /// Record title/description for every fetched page
    pub collect_metadata: bool,
    /// Per-fetch time budget
    pub fetch_timeout: Duration,
    /// Fetches allowed in flight at once (1 = strictly sequential)
    pub concurrency: usize,
    /// Treat links to images, documents etc. as out of scope
    pub skip_assets: bool,
    /// Also start from the URLs listed in the site's sitemaps
    pub use_sitemap: bool,
}

impl CrawlOptions {
    // Converts a page ceiling as a user would write it
    //
    // Zero or negative means "fetch nothing".
    pub fn page_limit(max_pages: Option<i64>) -> Option<usize> {
        max_pages.map(|n| usize::try_from(n).unwrap_or(0))
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            path_prefix: "/".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_pages: None,
            mode: TraversalMode::default(),
            collect_metadata: false,
            fetch_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            concurrency: DEFAULT_CONCURRENCY,
            skip_assets: false,
            use_sitemap: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CrawlOptions::default();
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.max_pages, None);
        assert_eq!(options.mode, TraversalMode::DepthFirst);
        assert_eq!(options.concurrency, 1);
        assert_eq!(options.path_prefix, "/");
        assert!(!options.use_sitemap);
    }

    #[test]
    fn test_page_limit_clamps_negative() {
        assert_eq!(CrawlOptions::page_limit(None), None);
        assert_eq!(CrawlOptions::page_limit(Some(25)), Some(25));
        assert_eq!(CrawlOptions::page_limit(Some(0)), Some(0));
        assert_eq!(CrawlOptions::page_limit(Some(-4)), Some(0));
    }

    #[test]
    fn test_mode_parses_names_and_aliases() {
        assert_eq!(
            TraversalMode::from_str("depth-first", false).unwrap(),
            TraversalMode::DepthFirst
        );
        assert_eq!(
            TraversalMode::from_str("bfs", false).unwrap(),
            TraversalMode::BreadthFirst
        );
    }
}
