// src/crawl/frontier.rs
// =============================================================================
// The frontier holds every URL we've discovered but not fetched yet, plus the
// set of URLs we have already taken for fetching.
//
// Rules:
// - A URL can sit in the frontier at most once (offer() rejects duplicates)
// - A URL that was already visited is never offered again
// - A URL is marked visited when it is taken for fetching, not when it is
//   discovered
//
// Traversal order depends on the mode:
// - DepthFirst: pop from the back (stack)
// - BreadthFirst: pop from the front (queue)
//
// Depth-first is stack order, not strict recursive order. A URL that is
// still queued keeps its place when another page links to it again, so it
// can come out after links that were pushed later.
// =============================================================================

use crate::config::TraversalMode;
use std::collections::{HashSet, VecDeque};
use url::Url;

// One page waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    /// Fetch hops from the seed, seed = 1
    pub depth: usize,
    /// Page the link was found on (None for the seed)
    pub origin_url: Option<Url>,
}

impl FrontierEntry {
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            depth: 1,
            origin_url: None,
        }
    }

    pub fn discovered(url: Url, depth: usize, found_on: Url) -> Self {
        Self {
            url,
            depth,
            origin_url: Some(found_on),
        }
    }
}

#[derive(Debug)]
pub struct Frontier {
    mode: TraversalMode,
    pending: VecDeque<FrontierEntry>,
    // Mirrors `pending` for O(1) "already queued?" checks
    queued: HashSet<Url>,
    visited: HashSet<Url>,
}

impl Frontier {
    pub fn new(mode: TraversalMode) -> Self {
        Self {
            mode,
            pending: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
        }
    }

    // Adds an entry unless its URL is already visited or already queued
    //
    // Returns whether the entry was accepted.
    pub fn offer(&mut self, entry: FrontierEntry) -> bool {
        if !self.accepts(&entry.url) {
            return false;
        }
        self.queued.insert(entry.url.clone());
        self.pending.push_back(entry);
        true
    }

    // Offers all links found on one page, in document order
    //
    // In depth-first mode they are stacked in reverse so that the first newly
    // accepted link on the page is the first one taken. Links that were
    // already queued are left where they are.
    //
    // Returns how many were accepted.
    pub fn offer_all(&mut self, entries: Vec<FrontierEntry>) -> usize {
        let mut accepted = Vec::with_capacity(entries.len());
        for entry in entries {
            if self.accepts(&entry.url) {
                self.queued.insert(entry.url.clone());
                accepted.push(entry);
            }
        }

        let count = accepted.len();
        match self.mode {
            TraversalMode::DepthFirst => self.pending.extend(accepted.into_iter().rev()),
            TraversalMode::BreadthFirst => self.pending.extend(accepted),
        }
        count
    }

    // Queues the seed plus extra start pages (sitemap entries) so that the
    // seed is always taken first and the extras follow in their own order
    pub fn offer_roots(&mut self, seed: FrontierEntry, extra: Vec<FrontierEntry>) -> usize {
        let extra: Vec<_> = extra.into_iter().filter(|e| e.url != seed.url).collect();
        match self.mode {
            TraversalMode::DepthFirst => {
                // Under the seed on the stack
                let accepted = self.offer_all(extra);
                usize::from(self.offer(seed)) + accepted
            }
            TraversalMode::BreadthFirst => {
                let seed_accepted = usize::from(self.offer(seed));
                seed_accepted + self.offer_all(extra)
            }
        }
    }

    pub fn take_next(&mut self) -> Option<FrontierEntry> {
        let entry = match self.mode {
            TraversalMode::DepthFirst => self.pending.pop_back(),
            TraversalMode::BreadthFirst => self.pending.pop_front(),
        }?;
        self.queued.remove(&entry.url);
        Some(entry)
    }

    // Check-and-set in one step: returns false if the URL was already visited
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.clone())
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    fn accepts(&self, url: &Url) -> bool {
        !self.visited.contains(url) && !self.queued.contains(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://example.com").unwrap().join(path).unwrap()
    }

    fn child(path: &str) -> FrontierEntry {
        FrontierEntry::discovered(url(path), 2, url("/"))
    }

    fn drain(frontier: &mut Frontier) -> Vec<String> {
        std::iter::from_fn(|| frontier.take_next())
            .map(|e| e.url.path().to_string())
            .collect()
    }

    #[test]
    fn test_offer_rejects_queued_duplicate() {
        let mut frontier = Frontier::new(TraversalMode::DepthFirst);
        assert!(frontier.offer(child("/a")));
        assert!(!frontier.offer(child("/a")));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_offer_rejects_visited() {
        let mut frontier = Frontier::new(TraversalMode::BreadthFirst);
        assert!(frontier.mark_visited(&url("/a")));
        assert!(!frontier.offer(child("/a")));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_mark_visited_only_once() {
        let mut frontier = Frontier::new(TraversalMode::DepthFirst);
        assert!(frontier.mark_visited(&url("/a")));
        assert!(!frontier.mark_visited(&url("/a")));
        assert!(frontier.is_visited(&url("/a")));
        assert_eq!(frontier.visited_count(), 1);
    }

    #[test]
    fn test_taken_url_can_be_offered_until_visited() {
        // Visitation is recorded by the engine, not by take_next
        let mut frontier = Frontier::new(TraversalMode::DepthFirst);
        frontier.offer(child("/a"));
        let entry = frontier.take_next().unwrap();
        assert!(frontier.offer(child("/a")));

        frontier.take_next();
        frontier.mark_visited(&entry.url);
        assert!(!frontier.offer(child("/a")));
    }

    #[test]
    fn test_depth_first_is_lifo() {
        let mut frontier = Frontier::new(TraversalMode::DepthFirst);
        frontier.offer(child("/1"));
        frontier.offer(child("/2"));
        frontier.offer(child("/3"));
        assert_eq!(drain(&mut frontier), vec!["/3", "/2", "/1"]);
    }

    #[test]
    fn test_breadth_first_is_fifo() {
        let mut frontier = Frontier::new(TraversalMode::BreadthFirst);
        frontier.offer(child("/1"));
        frontier.offer(child("/2"));
        frontier.offer(child("/3"));
        assert_eq!(drain(&mut frontier), vec!["/1", "/2", "/3"]);
    }

    #[test]
    fn test_offer_all_keeps_document_order() {
        let links = || vec![child("/1"), child("/2"), child("/2"), child("/3")];

        let mut dfs = Frontier::new(TraversalMode::DepthFirst);
        assert_eq!(dfs.offer_all(links()), 3);
        assert_eq!(drain(&mut dfs), vec!["/1", "/2", "/3"]);

        let mut bfs = Frontier::new(TraversalMode::BreadthFirst);
        assert_eq!(bfs.offer_all(links()), 3);
        assert_eq!(drain(&mut bfs), vec!["/1", "/2", "/3"]);
    }

    #[test]
    fn test_depth_first_descends_before_siblings() {
        let mut frontier = Frontier::new(TraversalMode::DepthFirst);
        frontier.offer_all(vec![child("/a"), child("/b")]);

        let first = frontier.take_next().unwrap();
        assert_eq!(first.url.path(), "/a");

        // /a's own children come out before its sibling /b
        frontier.offer_all(vec![
            FrontierEntry::discovered(url("/a/1"), 3, first.url.clone()),
            FrontierEntry::discovered(url("/a/2"), 3, first.url.clone()),
        ]);
        assert_eq!(drain(&mut frontier), vec!["/a/1", "/a/2", "/b"]);
    }

    #[test]
    fn test_depth_first_keeps_queued_link_in_place() {
        let mut frontier = Frontier::new(TraversalMode::DepthFirst);
        frontier.offer_all(vec![child("/a"), child("/b")]);
        let first = frontier.take_next().unwrap();

        // /a links to /b again; /b is not moved above /c
        let accepted = frontier.offer_all(vec![
            FrontierEntry::discovered(url("/b"), 3, first.url.clone()),
            FrontierEntry::discovered(url("/c"), 3, first.url.clone()),
        ]);
        assert_eq!(accepted, 1);
        assert_eq!(drain(&mut frontier), vec!["/c", "/b"]);
    }

    #[test]
    fn test_roots_start_with_seed() {
        let roots = || {
            (
                FrontierEntry::seed(url("/")),
                vec![
                    FrontierEntry::seed(url("/x")),
                    FrontierEntry::seed(url("/")),
                    FrontierEntry::seed(url("/y")),
                ],
            )
        };

        for mode in [TraversalMode::DepthFirst, TraversalMode::BreadthFirst] {
            let mut frontier = Frontier::new(mode);
            let (seed, extra) = roots();
            assert_eq!(frontier.offer_roots(seed, extra), 3);
            assert_eq!(drain(&mut frontier), vec!["/", "/x", "/y"]);
        }
    }

    #[test]
    fn test_seed_entry() {
        let entry = FrontierEntry::seed(url("/"));
        assert_eq!(entry.depth, 1);
        assert_eq!(entry.origin_url, None);
    }
}
