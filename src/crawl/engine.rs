// src/crawl/engine.rs
// =============================================================================
// The crawl engine ties everything together.
//
// How it works:
// 1. Normalize the seed URL and put it in the frontier at depth 1 (with
//    --sitemap, the in-scope pages listed in the site's sitemaps go in at
//    depth 1 too, after the seed)
// 2. Take the next entry from the frontier
//    - deeper than max_depth? drop it
//    - already visited? drop it
//    - page ceiling reached? stop starting fetches
// 3. Fetch the page (with a timeout). A failed fetch is recorded and the
//    crawl moves on; its links are never explored
// 4. Extract the raw hrefs, normalize each one against the URL the page was
//    actually served from (after redirects, or its <base href>)
// 5. For every in-scope link: record an edge, offer it to the frontier at
//    depth + 1
// 6. Repeat until the frontier is empty and nothing is in flight
//
// Concurrency:
// - With concurrency = 1 exactly one fetch runs at a time, so the visiting
//   order is fully deterministic
// - With concurrency = N up to N fetches run at once. This loop is the only
//   code that touches the frontier, the visited set, the page counter and
//   the result sink; fetch futures only fetch. Checking and marking happen
//   here, before a fetch starts, so two fetches can never target the same
//   URL and the page ceiling can't be overshot
// - Once the ceiling is hit, or the stop future completes (Ctrl-C), no new
//   fetch is started, but fetches already in flight are allowed to finish
//   and their links are still recorded
// =============================================================================

use super::frontier::{Frontier, FrontierEntry};
use super::normalize::{normalize, normalize_seed, MalformedUrl};
use super::scope::Scope;
use super::sink::{CrawlResult, Edge, FetchFailure, PageRecord, ResultSink, Termination};
use super::sitemap;
use crate::config::CrawlOptions;
use crate::extract::LinkExtractor;
use crate::fetch::{FetchError, FetchedPage, PageFetcher};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, info, trace, warn};
use url::Url;

// The only way a crawl can fail as a whole
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid seed URL '{seed}': {source}")]
    InvalidSeed {
        seed: String,
        #[source]
        source: MalformedUrl,
    },
}

pub struct CrawlEngine<F, E> {
    fetcher: F,
    extractor: E,
    options: CrawlOptions,
}

impl<F, E> CrawlEngine<F, E>
where
    F: PageFetcher,
    E: LinkExtractor,
{
    pub fn new(fetcher: F, extractor: E, options: CrawlOptions) -> Self {
        Self {
            fetcher,
            extractor,
            options,
        }
    }

    // Crawls from `seed` and returns everything that was found
    //
    // When `stop` completes the crawl winds down early and the partial
    // result comes back with `Termination::Interrupted`. Pass
    // `std::future::pending()` to never stop early.
    //
    // Individual pages failing never make this return an error; only a seed
    // that isn't a valid absolute http(s) URL does.
    pub async fn run<S>(&self, seed: &str, stop: S) -> Result<CrawlResult, CrawlError>
    where
        S: Future<Output = ()>,
    {
        let seed_url = normalize_seed(seed).map_err(|source| CrawlError::InvalidSeed {
            seed: seed.to_string(),
            source,
        })?;

        let scope = Scope::new(&seed_url, &self.options.path_prefix)
            .with_asset_filter(self.options.skip_assets);
        let max_depth = self.options.max_depth;
        let page_limit = self.options.max_pages.unwrap_or(usize::MAX);
        let workers = self.options.concurrency.max(1);

        info!(
            seed = %seed_url,
            origin = scope.origin(),
            prefix = scope.path_prefix(),
            max_depth,
            max_pages = ?self.options.max_pages,
            mode = ?self.options.mode,
            workers,
            "starting crawl"
        );

        // Frontier and sink live only as long as this run
        let mut frontier = Frontier::new(self.options.mode);
        let mut sink = ResultSink::new();
        let mut pages_fetched = 0usize;
        let mut page_bound_hit = false;
        let mut interrupted = false;
        let mut in_flight = FuturesUnordered::new();

        let roots = if self.options.use_sitemap {
            self.sitemap_roots(&seed_url, &scope).await
        } else {
            Vec::new()
        };
        frontier.offer_roots(FrontierEntry::seed(seed_url.clone()), roots);

        tokio::pin!(stop);

        loop {
            // Top up the in-flight fetches from the frontier
            while !page_bound_hit && !interrupted && in_flight.len() < workers {
                let Some(entry) = frontier.take_next() else {
                    break;
                };

                if entry.depth > max_depth {
                    trace!(url = %entry.url, depth = entry.depth, "beyond max depth, dropped");
                    continue;
                }

                if frontier.is_visited(&entry.url) {
                    continue;
                }

                if pages_fetched >= page_limit {
                    info!(pages_fetched, "page limit reached, not starting new fetches");
                    page_bound_hit = true;
                    break;
                }

                frontier.mark_visited(&entry.url);
                pages_fetched += 1;

                debug!(
                    url = %entry.url,
                    depth = entry.depth,
                    found_on = ?entry.origin_url.as_ref().map(|u| u.as_str()),
                    "crawling"
                );
                in_flight.push(self.fetch_entry(entry));
            }

            // Nothing running and nothing left to start: we're done
            if in_flight.is_empty() {
                break;
            }

            let next = if interrupted {
                in_flight.next().await
            } else {
                tokio::select! {
                    biased;
                    _ = &mut stop => {
                        warn!(
                            in_flight = in_flight.len(),
                            "interrupted, finishing fetches already in flight"
                        );
                        interrupted = true;
                        continue;
                    }
                    next = in_flight.next() => next,
                }
            };

            let Some((entry, outcome)) = next else {
                break;
            };

            self.process_page(entry, outcome, &scope, &mut frontier, &mut sink);
        }

        let termination = if interrupted {
            Termination::Interrupted
        } else if page_bound_hit {
            Termination::PageBoundReached
        } else {
            Termination::FrontierExhausted
        };

        if !frontier.is_empty() {
            info!(left = frontier.len(), "unvisited entries left in the frontier");
        }
        info!(
            pages_fetched,
            visited = frontier.visited_count(),
            edges = sink.edge_count(),
            ?termination,
            "crawl finished"
        );

        Ok(sink.export(seed_url, pages_fetched, termination))
    }

    // In-scope pages listed in the site's sitemaps, as depth-1 entries
    async fn sitemap_roots(&self, seed: &Url, scope: &Scope) -> Vec<FrontierEntry> {
        let listed = sitemap::discover(&self.fetcher, seed, self.options.fetch_timeout).await;
        let total = listed.len();
        let roots: Vec<_> = listed
            .into_iter()
            .filter(|url| scope.contains(url))
            .map(FrontierEntry::seed)
            .collect();

        info!(listed = total, in_scope = roots.len(), "sitemap pages added to the frontier");
        roots
    }

    // Fetches one entry, enforcing the timeout whatever the fetcher does
    async fn fetch_entry(
        &self,
        entry: FrontierEntry,
    ) -> (FrontierEntry, Result<FetchedPage, FetchError>) {
        let timeout = self.options.fetch_timeout;
        let fetch = self.fetcher.fetch(&entry.url, timeout);
        let outcome = match tokio::time::timeout(timeout, fetch).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(FetchError::Timeout(timeout)),
        };
        (entry, outcome)
    }

    fn process_page(
        &self,
        entry: FrontierEntry,
        outcome: Result<FetchedPage, FetchError>,
        scope: &Scope,
        frontier: &mut Frontier,
        sink: &mut ResultSink,
    ) {
        let page = match outcome {
            Ok(page) => page,
            Err(error) => {
                warn!(url = %entry.url, depth = entry.depth, %error, "failed to fetch page");
                sink.record_failure(FetchFailure::new(entry.url, entry.depth, &error));
                return;
            }
        };

        // Relative links are relative to where the body came from
        let served_from = page.final_url;
        if served_from != entry.url {
            if !scope.contains(&served_from) {
                info!(
                    url = %entry.url,
                    redirected_to = %served_from,
                    "redirected out of scope, links ignored"
                );
                return;
            }
            // The redirect target was fetched as part of this page
            frontier.mark_visited(&served_from);
        }

        let extraction = self
            .extractor
            .extract(&page.body, self.options.collect_metadata);

        if let Some(meta) = extraction.meta {
            sink.record_page(PageRecord {
                url: entry.url.clone(),
                title: meta.title,
                description: meta.description,
            });
        }

        let base = match extraction.base_href.as_deref() {
            Some(href) => match normalize(&served_from, href) {
                Ok(base) => base,
                Err(e) => {
                    trace!(page = %entry.url, href = %href, error = %e, "ignoring <base href>");
                    served_from
                }
            },
            None => served_from,
        };

        let mut children = Vec::new();
        for href in &extraction.links {
            let target = match normalize(&base, href) {
                Ok(url) => url,
                Err(e) => {
                    trace!(page = %entry.url, href = %href, error = %e, "skipping link");
                    continue;
                }
            };

            if !scope.contains(&target) {
                continue;
            }

            // Edges record discovery, so they're kept even for visited targets
            sink.record_edge(Edge {
                from: entry.url.clone(),
                to: target.clone(),
            });
            children.push(FrontierEntry::discovered(target, entry.depth + 1, entry.url.clone()));
        }

        let in_scope = children.len();
        let queued = frontier.offer_all(children);
        debug!(
            url = %entry.url,
            content_type = %page.content_type,
            links = extraction.links.len(),
            in_scope,
            queued,
            pending = frontier.len(),
            "processed page"
        );
    }
}
