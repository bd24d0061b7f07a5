// src/crawl/sink.rs
// =============================================================================
// The result sink collects everything a crawl produces:
// - edges: one (from, to) record per in-scope link found on a fetched page
// - pages: title/description per fetched page (metadata mode only)
// - failures: one record per page that could not be fetched
//
// It is append-only. Nothing is deduplicated: if ten pages link to /about,
// there are ten edges pointing at /about.
// =============================================================================

use crate::fetch::{FetchError, FetchErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::Url;

// A directed link from a fetched page to an in-scope URL it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: Url,
    pub to: Url,
}

// Metadata of one successfully fetched page
//
// Serialized with the column names of the tabular export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(rename = "URL")]
    pub url: Url,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
}

// A page that was taken from the frontier but couldn't be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub url: Url,
    pub depth: usize,
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchFailure {
    pub fn new(url: Url, depth: usize, error: &FetchError) -> Self {
        Self {
            url,
            depth,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Why the crawl loop stopped. All of these are normal completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Nothing left to fetch
    FrontierExhausted,
    /// The page ceiling was hit; unvisited entries were dropped
    PageBoundReached,
    /// Stopped from outside (Ctrl-C); the result holds what was found so far
    Interrupted,
}

// Everything a finished crawl hands back to the caller
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    pub seed: Url,
    pub edges: Vec<Edge>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<PageRecord>,
    pub failures: Vec<FetchFailure>,
    /// Fetch attempts made, failed ones included
    pub pages_fetched: usize,
    pub termination: Termination,
}

impl CrawlResult {
    // Sorted, unique list of every in-scope URL the crawl knows about
    // (the seed plus every edge target)
    pub fn discovered_urls(&self) -> BTreeSet<&Url> {
        std::iter::once(&self.seed)
            .chain(self.edges.iter().map(|edge| &edge.to))
            .collect()
    }
}

#[derive(Debug, Default)]
pub struct ResultSink {
    edges: Vec<Edge>,
    pages: Vec<PageRecord>,
    failures: Vec<FetchFailure>,
}

impl ResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn record_page(&mut self, page: PageRecord) {
        self.pages.push(page);
    }

    pub fn record_failure(&mut self, failure: FetchFailure) {
        self.failures.push(failure);
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // Consumes the sink; the returned result is the only thing that outlives
    // the crawl run
    pub fn export(self, seed: Url, pages_fetched: usize, termination: Termination) -> CrawlResult {
        CrawlResult {
            seed,
            edges: self.edges,
            pages: self.pages,
            failures: self.failures,
            pages_fetched,
            termination,
        }
    }
}
