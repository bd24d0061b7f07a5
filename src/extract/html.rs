// src/extract/html.rs
// =============================================================================
// This module extracts links and metadata from HTML pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// What we pull out:
// - every <a href="..."> value, untouched
// - the first <base href="...">, which changes what relative links mean
// - the <title> text (or the first <h1> when there's no usable title)
// - <meta name="description" content="...">
// =============================================================================

use super::{Extraction, LinkExtractor, PageMeta};
use scraper::{ElementRef, Html, Selector};

pub struct HtmlLinkExtractor {
    links: Selector,
    base: Selector,
    title: Selector,
    heading: Selector,
    description: Selector,
}

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        // These selectors are constants and known to be valid, so a failure
        // here is a programmer error
        Self {
            links: Selector::parse("a[href]").expect("valid link selector"),
            base: Selector::parse("base[href]").expect("valid base selector"),
            title: Selector::parse("title").expect("valid title selector"),
            heading: Selector::parse("h1").expect("valid heading selector"),
            description: Selector::parse(r#"meta[name="description"]"#)
                .expect("valid description selector"),
        }
    }

    fn links_in(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.links)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect()
    }

    fn base_in(&self, document: &Html) -> Option<String> {
        document
            .select(&self.base)
            .next()
            .and_then(|element| element.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string)
    }

    fn meta_in(&self, document: &Html) -> PageMeta {
        let title = first_text(document, &self.title)
            .or_else(|| first_text(document, &self.heading))
            .unwrap_or_default();

        let description = document
            .select(&self.description)
            .next()
            .and_then(|element| element.value().attr("content"))
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty());

        PageMeta { title, description }
    }
}

impl Default for HtmlLinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, body: &str) -> Vec<String> {
        self.links_in(&Html::parse_document(body))
    }

    fn extract_meta(&self, body: &str) -> PageMeta {
        self.meta_in(&Html::parse_document(body))
    }

    fn extract(&self, body: &str, with_meta: bool) -> Extraction {
        let document = Html::parse_document(body);
        Extraction {
            links: self.links_in(&document),
            base_href: self.base_in(&document),
            meta: with_meta.then(|| self.meta_in(&document)),
        }
    }
}

// Trimmed text of the first element matching `selector`, if non-empty
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|element: ElementRef| element.text().collect::<String>())
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_hrefs_in_document_order() {
        let html = r##"
            <a href="https://www.rust-lang.org">Rust</a>
            <a href="/docs">Docs</a>
            <a href="../about">About</a>
            <a href="#top">Top</a>
            <a href="mailto:test@example.com">Email</a>
            <a>No href</a>
        "##;
        let links = HtmlLinkExtractor::new().extract_links(html);
        assert_eq!(
            links,
            vec![
                "https://www.rust-lang.org",
                "/docs",
                "../about",
                "#top",
                "mailto:test@example.com"
            ]
        );
    }

    #[test]
    fn test_base_href() {
        let extractor = HtmlLinkExtractor::new();

        let html = r#"<html><head><base href="https://cdn.example.com/v2/">
            <base href="/ignored/"></head><body><a href="guide">Guide</a></body></html>"#;
        let extraction = extractor.extract(html, false);
        assert_eq!(extraction.base_href.as_deref(), Some("https://cdn.example.com/v2/"));
        assert_eq!(extraction.links, vec!["guide"]);

        let without = extractor.extract(r#"<base target="_blank"><a href="/x">x</a>"#, false);
        assert_eq!(without.base_href, None);
    }

    #[test]
    fn test_title_and_description() {
        let html = r#"<html><head>
            <title>  Things to do
               in London </title>
            <meta name="description" content=" Attractions and events ">
        </head><body><h1>Ignored</h1></body></html>"#;

        let meta = HtmlLinkExtractor::new().extract_meta(html);
        assert_eq!(meta.title, "Things to do in London");
        assert_eq!(meta.description.as_deref(), Some("Attractions and events"));
    }

    #[test]
    fn test_title_falls_back_to_heading() {
        let html = r#"<html><head><title>   </title></head>
            <body><h1>Museums</h1></body></html>"#;
        let meta = HtmlLinkExtractor::new().extract_meta(html);
        assert_eq!(meta.title, "Museums");
        assert_eq!(meta.description, None);
    }

    #[test]
    fn test_missing_meta_is_empty() {
        let html = r#"<p>plain</p><meta name="description" content="">"#;
        let meta = HtmlLinkExtractor::new().extract_meta(html);
        assert_eq!(meta, PageMeta::default());
    }

    #[test]
    fn test_extract_only_parses_meta_when_asked() {
        let html = r#"<title>T</title><a href="/x">x</a>"#;
        let extractor = HtmlLinkExtractor::new();

        let without = extractor.extract(html, false);
        assert_eq!(without.links, vec!["/x"]);
        assert_eq!(without.meta, None);

        let with = extractor.extract(html, true);
        assert_eq!(with.meta.unwrap().title, "T");
    }
}
