// src/extract/mod.rs
// =============================================================================
// This module pulls links (and optionally a title/description) out of a
// fetched page body.
//
// The engine only depends on the LinkExtractor trait. Extractors return the
// raw href strings exactly as written in the page; turning them into
// absolute URLs is the normalizer's job.
//
// Submodules:
// - html: LinkExtractor for HTML documents, using CSS selectors
// =============================================================================

mod html;

pub use html::HtmlLinkExtractor;

// Title and description of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: Option<String>,
}

// What one extraction pass produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Raw hrefs, in document order
    pub links: Vec<String>,
    /// Raw `<base href>`, when the page declares one
    pub base_href: Option<String>,
    /// Only filled in when metadata was asked for
    pub meta: Option<PageMeta>,
}

pub trait LinkExtractor: Send + Sync {
    fn extract_links(&self, body: &str) -> Vec<String>;

    fn extract_meta(&self, _body: &str) -> PageMeta {
        PageMeta::default()
    }

    // Links plus, when `with_meta` is set, the page metadata
    //
    // Extractors that parse the body can override this to parse only once.
    fn extract(&self, body: &str, with_meta: bool) -> Extraction {
        Extraction {
            links: self.extract_links(body),
            base_href: None,
            meta: with_meta.then(|| self.extract_meta(body)),
        }
    }
}
