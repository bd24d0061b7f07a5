// src/crawl/sitemap.rs
// =============================================================================
// Finds extra start pages in a site's sitemaps (opt-in with --sitemap).
//
// Where we look:
// - /sitemap.xml, /sitemap_index.xml, /sitemap-index.xml
// - every "Sitemap:" line in /robots.txt
//
// A <urlset> lists pages; a <sitemapindex> lists more sitemaps, which are
// read too (up to MAX_SITEMAPS documents in total). Missing or broken
// sitemaps are skipped quietly; most sites don't have all of them.
//
// Only the URL list is read. Nothing here looks at robots.txt rules.
// =============================================================================

use super::normalize::normalize;
use crate::fetch::{FetchError, PageFetcher};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tracing::{debug, info, trace, warn};
use url::Url;

/// Well-known sitemap locations, relative to the site root
pub const SITEMAP_PATHS: &[&str] = &["/sitemap.xml", "/sitemap_index.xml", "/sitemap-index.xml"];

// Upper bound on sitemap documents read per crawl (index files can nest)
const MAX_SITEMAPS: usize = 50;

// The <loc> entries of one sitemap document
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Sitemap {
    /// True for a <sitemapindex>, whose locs are other sitemaps
    pub is_index: bool,
    pub locs: Vec<String>,
}

// Reads every <loc> out of a sitemap, ignoring namespaces
//
// Malformed XML stops the read; whatever was found before that is kept.
pub fn parse_sitemap(xml: &str) -> Sitemap {
    let mut sitemap = Sitemap::default();
    let mut in_loc = false;
    let mut current = String::new();

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"sitemapindex" => sitemap.is_index = true,
                b"loc" => {
                    in_loc = true;
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_loc => {
                if let Ok(text) = e.unescape() {
                    current.push_str(&text);
                }
            }
            Ok(Event::CData(e)) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                let loc = current.trim();
                if !loc.is_empty() {
                    sitemap.locs.push(loc.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(error) => {
                debug!(%error, "stopped reading malformed sitemap");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    sitemap
}

// Values of the "Sitemap:" lines in a robots.txt (case-insensitive key)
pub fn robots_sitemaps(robots: &str) -> Vec<String> {
    robots
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("sitemap")
                .then(|| value.trim().to_string())
        })
        .filter(|value| !value.is_empty())
        .collect()
}

// Collects the page URLs listed in the sitemaps of `seed`'s site
//
// Returned in the order they were listed, without duplicates. Scope is the
// caller's business; off-site and out-of-prefix entries are returned too.
pub async fn discover<F: PageFetcher>(fetcher: &F, seed: &Url, timeout: Duration) -> Vec<Url> {
    let mut pending: VecDeque<Url> = SITEMAP_PATHS
        .iter()
        .filter_map(|path| seed.join(path).ok())
        .collect();

    if let Ok(robots_url) = seed.join("/robots.txt") {
        match fetch_document(fetcher, &robots_url, timeout).await {
            Ok(robots) => {
                for listed in robots_sitemaps(&robots) {
                    match normalize(&robots_url, &listed) {
                        Ok(url) => pending.push_back(url),
                        Err(e) => trace!(sitemap = %listed, error = %e, "skipping sitemap entry"),
                    }
                }
            }
            Err(error) => debug!(url = %robots_url, %error, "no robots.txt"),
        }
    }

    let mut read = HashSet::new();
    let mut seen_pages = HashSet::new();
    let mut pages = Vec::new();

    while let Some(sitemap_url) = pending.pop_front() {
        if read.contains(&sitemap_url) {
            continue;
        }
        if read.len() >= MAX_SITEMAPS {
            warn!(limit = MAX_SITEMAPS, "too many sitemaps, ignoring the rest");
            break;
        }
        read.insert(sitemap_url.clone());

        let xml = match fetch_document(fetcher, &sitemap_url, timeout).await {
            Ok(xml) => xml,
            Err(error) => {
                debug!(url = %sitemap_url, %error, "sitemap not available");
                continue;
            }
        };

        let sitemap = parse_sitemap(&xml);
        debug!(
            url = %sitemap_url,
            index = sitemap.is_index,
            entries = sitemap.locs.len(),
            "read sitemap"
        );

        for loc in sitemap.locs {
            let url = match normalize(&sitemap_url, &loc) {
                Ok(url) => url,
                Err(e) => {
                    trace!(loc = %loc, error = %e, "skipping sitemap entry");
                    continue;
                }
            };
            if sitemap.is_index {
                pending.push_back(url);
            } else if seen_pages.insert(url.clone()) {
                pages.push(url);
            }
        }
    }

    info!(sitemaps = read.len(), pages = pages.len(), "sitemap discovery finished");
    pages
}

// fetch_text with the same hard time budget the engine puts on pages
async fn fetch_document<F: PageFetcher>(
    fetcher: &F,
    url: &Url,
    timeout: Duration,
) -> Result<String, FetchError> {
    match tokio::time::timeout(timeout, fetcher.fetch_text(url, timeout)).await {
        Ok(outcome) => outcome,
        Err(_elapsed) => Err(FetchError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchedPage;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    // Serves text documents from a map; every other URL is a 404
    #[derive(Default)]
    struct Documents {
        docs: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl Documents {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.docs.insert(url.to_string(), body.to_string());
            self
        }
    }

    #[async_trait]
    impl PageFetcher for Documents {
        async fn fetch(&self, _url: &Url, _timeout: Duration) -> Result<FetchedPage, FetchError> {
            Err(FetchError::HttpStatus(404))
        }

        async fn fetch_text(&self, url: &Url, _timeout: Duration) -> Result<String, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.docs
                .get(url.as_str())
                .cloned()
                .ok_or(FetchError::HttpStatus(404))
        }
    }

    fn seed() -> Url {
        Url::parse("https://example.com/blog/").unwrap()
    }

    #[test]
    fn test_parse_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc> https://example.com/a?x=1&amp;y=2 </loc><lastmod>2024-01-01</lastmod></url>
              <url><loc><![CDATA[https://example.com/b]]></loc></url>
              <url><loc></loc></url>
            </urlset>"#;

        let sitemap = parse_sitemap(xml);
        assert!(!sitemap.is_index);
        assert_eq!(
            sitemap.locs,
            vec!["https://example.com/a?x=1&y=2", "https://example.com/b"]
        );
    }

    #[test]
    fn test_parse_index_with_prefixed_names() {
        let xml = r#"<sm:sitemapindex xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
              <sm:sitemap><sm:loc>https://example.com/posts.xml</sm:loc></sm:sitemap>
            </sm:sitemapindex>"#;

        let sitemap = parse_sitemap(xml);
        assert!(sitemap.is_index);
        assert_eq!(sitemap.locs, vec!["https://example.com/posts.xml"]);
    }

    #[test]
    fn test_parse_malformed_keeps_what_was_read() {
        let xml = "<urlset><url><loc>https://example.com/a</loc></url><url><loc>oops</url>";
        assert_eq!(parse_sitemap(xml).locs, vec!["https://example.com/a"]);
        assert_eq!(parse_sitemap("not xml at all"), Sitemap::default());
    }

    #[test]
    fn test_robots_sitemap_lines() {
        let robots = "User-agent: *\n\
                      Disallow: /private\n\
                      Sitemap: https://example.com/one.xml\n\
                      sitemap:/two.xml\n\
                      SITEMAP:   \n";
        assert_eq!(
            robots_sitemaps(robots),
            vec!["https://example.com/one.xml", "/two.xml"]
        );
    }

    #[tokio::test]
    async fn test_discover_reads_wellknown_robots_and_indexes() {
        let docs = Documents::default()
            .with(
                "https://example.com/sitemap.xml",
                "<urlset><url><loc>https://example.com/blog/a</loc></url>\
                 <url><loc>/blog/b#top</loc></url></urlset>",
            )
            .with("https://example.com/robots.txt", "Sitemap: /index.xml\n")
            .with(
                "https://example.com/index.xml",
                "<sitemapindex><sitemap><loc>/posts.xml</loc></sitemap>\
                 <sitemap><loc>/sitemap.xml</loc></sitemap></sitemapindex>",
            )
            .with(
                "https://example.com/posts.xml",
                "<urlset><url><loc>https://example.com/blog/a</loc></url>\
                 <url><loc>https://other.com/c</loc></url>\
                 <url><loc>mailto:me@example.com</loc></url></urlset>",
            );

        let pages = discover(&docs, &seed(), Duration::from_secs(1)).await;

        let pages: Vec<&str> = pages.iter().map(Url::as_str).collect();
        assert_eq!(
            pages,
            vec![
                "https://example.com/blog/a",
                "https://example.com/blog/b",
                "https://other.com/c"
            ]
        );

        // Each sitemap is read once, even when an index points back at it
        let requested = docs.requested.lock().unwrap().clone();
        let sitemap_reads = requested
            .iter()
            .filter(|u| u.as_str() == "https://example.com/sitemap.xml")
            .count();
        assert_eq!(sitemap_reads, 1);
        assert_eq!(requested[0], "https://example.com/robots.txt");
    }

    #[tokio::test]
    async fn test_discover_without_sitemaps_is_empty() {
        let docs = Documents::default();
        let pages = discover(&docs, &seed(), Duration::from_secs(1)).await;

        assert!(pages.is_empty());
        assert_eq!(docs.requested.lock().unwrap().len(), 1 + SITEMAP_PATHS.len());
    }
}
