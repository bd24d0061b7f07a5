// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every crawl option can also come from a LINKMAP_* environment variable,
// which is handy in CI where flags are awkward to thread through.
// =============================================================================

use crate::config::{
    CrawlOptions, TraversalMode, DEFAULT_CONCURRENCY, DEFAULT_MAX_DEPTH, DEFAULT_TIMEOUT_MS,
};
use crate::export::OutputFormat;
use clap::builder::RangedU64ValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "linkmap",
    version,
    about = "Map the internal link graph of a website",
    long_about = "linkmap crawls a website from a seed URL, staying on the same origin and \
                  under a path prefix, and records every internal link as a (from, to) edge. \
                  Optionally it also collects each page's title and meta description."
)]
pub struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and output its link graph
    ///
    /// Example: linkmap crawl https://example.com/docs --path-prefix /docs --max-depth 2
    Crawl(CrawlArgs),

    /// Convert a JSON array of objects (e.g. saved edges or pages) to CSV
    ///
    /// Example: linkmap convert results.json --output results.csv
    Convert {
        /// JSON file to read
        input: PathBuf,

        /// CSV file to write (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// URL to start crawling from (e.g., https://example.com/things-to-do)
    pub seed_url: String,

    /// Only follow links whose path starts with this (default: whole site)
    #[arg(long, env = "LINKMAP_PATH_PREFIX", default_value = "/")]
    pub path_prefix: String,

    /// Maximum crawl depth
    ///
    /// Depth 1 = just the seed page (its links are still recorded)
    /// Depth 2 = seed page + the pages it links to
    #[arg(long, env = "LINKMAP_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Stop after this many fetches (0 or negative = fetch nothing)
    #[arg(long, env = "LINKMAP_MAX_PAGES", allow_negative_numbers = true)]
    pub max_pages: Option<i64>,

    /// Traversal order
    #[arg(long, value_enum, env = "LINKMAP_MODE", default_value_t = TraversalMode::DepthFirst)]
    pub mode: TraversalMode,

    /// Also collect each page's title and meta description
    #[arg(long)]
    pub metadata: bool,

    /// Per-page fetch timeout in milliseconds
    #[arg(long, env = "LINKMAP_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Number of pages fetched at the same time
    #[arg(
        long,
        env = "LINKMAP_CONCURRENCY",
        default_value_t = DEFAULT_CONCURRENCY,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub concurrency: usize,

    /// Ignore links to images, documents, archives and other non-page files
    #[arg(long)]
    pub skip_assets: bool,

    /// Also start from the pages listed in sitemap.xml and robots.txt
    #[arg(long)]
    pub sitemap: bool,

    /// User-Agent header sent with every request
    #[arg(long, env = "LINKMAP_USER_AGENT", default_value = concat!("linkmap/", env!("CARGO_PKG_VERSION")))]
    pub user_agent: String,

    /// How to print the edge list
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Write the edge list to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write page metadata here (CSV, or JSON for a .json file). Implies --metadata
    #[arg(long)]
    pub pages_output: Option<PathBuf>,
}

impl CrawlArgs {
    // Converts the parsed flags into engine options
    pub fn options(&self) -> CrawlOptions {
        CrawlOptions {
            path_prefix: self.path_prefix.clone(),
            max_depth: self.max_depth,
            max_pages: CrawlOptions::page_limit(self.max_pages),
            mode: self.mode,
            collect_metadata: self.metadata || self.pages_output.is_some(),
            fetch_timeout: Duration::from_millis(self.timeout_ms),
            concurrency: self.concurrency,
            skip_assets: self.skip_assets,
            use_sitemap: self.sitemap,
        }
    }
}
