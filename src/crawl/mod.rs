// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Depth-first (default) or breadth-first traversal from a seed URL
// - Stays inside the seed's origin and a path prefix
// - Configurable depth limit and page ceiling
// - Never fetches the same page twice
// - Records every in-scope link as a (from, to) edge
// - Optionally starts from the pages listed in the site's sitemaps
// - Can be stopped from outside and still hands back what it found
//
// Submodules, leaf first:
// - normalize: href -> canonical absolute URL
// - scope: is this URL part of the site we're mapping?
// - frontier: pages waiting to be fetched + pages already visited
// - sink: collects edges, page metadata and failures
// - sitemap: extra start pages from sitemap.xml / robots.txt
// - engine: the crawl loop itself
// =============================================================================

mod engine;
mod frontier;
mod normalize;
mod scope;
mod sink;
mod sitemap;

// Re-export what the rest of the application uses
pub use engine::{CrawlEngine, CrawlError};
pub use sink::{CrawlResult, Edge, FetchFailure, PageRecord, Termination};
