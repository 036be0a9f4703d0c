//! Page handler boundary
//!
//! A page handler consumes a fetched page and emits zero or more follow-up
//! URLs; the dispatcher enqueues whatever comes back (deduplication
//! applies). The trait has a blanket impl for plain closures, so a handler
//! can be as small as `|_page| Vec::new()`. [`LinkExtractor`] is the
//! provided default: it follows `<a href>` links.

use crate::crawler::fetcher::FetchedPage;
use scraper::{Html, Selector};
use url::Url;

/// Trait for processing fetched pages
pub trait PageHandler: Send + Sync {
    /// Processes a page and returns follow-up URLs to enqueue
    fn handle_page(&self, page: &FetchedPage) -> Vec<String>;
}

impl<F> PageHandler for F
where
    F: Fn(&FetchedPage) -> Vec<String> + Send + Sync,
{
    fn handle_page(&self, page: &FetchedPage) -> Vec<String> {
        self(page)
    }
}

/// Handler that never follows links
///
/// With this handler a crawl fetches exactly the resolved seeds.
pub struct NoFollow;

impl PageHandler for NoFollow {
    fn handle_page(&self, _page: &FetchedPage) -> Vec<String> {
        Vec::new()
    }
}

/// Default handler: extracts `<a href>` links from HTML bodies
///
/// Links are resolved against the page's final URL. Non-HTML bodies simply
/// produce no links (scraper parses them to an empty document).
pub struct LinkExtractor;

impl PageHandler for LinkExtractor {
    fn handle_page(&self, page: &FetchedPage) -> Vec<String> {
        let base = match Url::parse(&page.url) {
            Ok(base) => base,
            Err(e) => {
                tracing::debug!("Cannot resolve links against '{}': {}", page.url, e);
                return Vec::new();
            }
        };

        extract_links(&page.body_text(), &base)
    }
}

/// Extracts followable links from an HTML document
///
/// Skips `download` anchors, `javascript:`/`mailto:`/`tel:`/`data:`
/// schemes, fragment-only anchors, and anything that does not resolve to
/// an HTTP(S) URL.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    let selector = Selector::parse("a[href]").expect("static selector");
    for element in document.select(&selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(href) = element.value().attr("href") {
            if let Some(absolute_url) = resolve_link(href, base_url) {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Resolves an href to an absolute HTTP(S) URL, or None if it should be
/// excluded
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, body: &str) -> FetchedPage {
        FetchedPage {
            url: url.to_string(),
            status: 200,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_closure_is_a_handler() {
        let handler = |_page: &FetchedPage| vec!["https://example.com/next".to_string()];
        let out = handler.handle_page(&page("https://example.com/", ""));
        assert_eq!(out, vec!["https://example.com/next"]);
    }

    #[test]
    fn test_no_follow() {
        let body = r#"<html><body><a href="/page">Link</a></body></html>"#;
        assert!(NoFollow.handle_page(&page("https://example.com/", body)).is_empty());
    }

    #[test]
    fn test_extract_relative_link() {
        let body = r#"<html><body><a href="/other">Link</a></body></html>"#;
        let links = LinkExtractor.handle_page(&page("https://example.com/page", body));
        assert_eq!(links, vec!["https://example.com/other"]);
    }

    #[test]
    fn test_extract_absolute_link() {
        let body = r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#;
        let links = LinkExtractor.handle_page(&page("https://example.com/", body));
        assert_eq!(links, vec!["https://other.com/page"]);
    }

    #[test]
    fn test_skip_special_schemes() {
        let body = r##"
            <html><body>
                <a href="javascript:void(0)">Js</a>
                <a href="mailto:test@example.com">Mail</a>
                <a href="tel:+1234567890">Tel</a>
                <a href="data:text/html,x">Data</a>
                <a href="#section">Anchor</a>
                <a href="/valid">Valid</a>
            </body></html>
        "##;
        let links = LinkExtractor.handle_page(&page("https://example.com/", body));
        assert_eq!(links, vec!["https://example.com/valid"]);
    }

    #[test]
    fn test_skip_download_link() {
        let body = r#"<html><body><a href="/file.pdf" download>Download</a></body></html>"#;
        let links = LinkExtractor.handle_page(&page("https://example.com/", body));
        assert!(links.is_empty());
    }

    #[test]
    fn test_non_html_body_yields_no_links() {
        let links = LinkExtractor.handle_page(&page("https://example.com/", "just plain text"));
        assert!(links.is_empty());
    }

    #[test]
    fn test_unparseable_page_url_yields_no_links() {
        let body = r#"<html><body><a href="/x">X</a></body></html>"#;
        let links = LinkExtractor.handle_page(&page("::notaurl::", body));
        assert!(links.is_empty());
    }
}
