//! Per-source extraction of article detail from fetched detail pages.
//!
//! Each supported source is a small [`SourceStrategy`] that reads a parsed
//! detail page and returns an [`ArticleDetail`]. The [`ExtractorRegistry`]
//! picks the strategy for a URL by walking an ordered route list and taking
//! the first route whose host (and optional path prefix) matches.
//!
//! # Supported Sources
//!
//! | Source | Module | Host match |
//! |--------|--------|------------|
//! | Naver News | [`naver`] | `news.naver.com` |
//! | Finviz news pages | [`finviz`] | `finviz.com` + `/news/` |
//! | Yahoo Finance | [`finance`] | `finance.yahoo.com` |
//! | Investopedia | [`finance`] | `investopedia.com` |
//! | PR Newswire | [`wires`] | `prnewswire.com`, `prnewswire.co.uk` |
//! | BusinessWire | [`wires`] | `businesswire.com` |
//! | GlobeNewswire | [`wires`] | `globenewswire.com` |
//! | NewsFile | [`wires`] | `newsfilecorp.com` |
//!
//! A URL that matches no route gets an empty detail; that is not an error.

use crate::models::ArticleDetail;
use crate::utils::{element_text, non_empty, truncate_with_ellipsis};
use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

pub mod finance;
pub mod finviz;
pub mod naver;
pub mod wires;

/// Reads one source's detail page layout.
pub trait SourceStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Extract whatever the page offers. Missing elements yield `None`
    /// fields, never an error.
    fn extract(&self, document: &Html) -> ArticleDetail;
}

/// Host substring plus optional path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlPattern {
    pub host: &'static str,
    pub path_prefix: Option<&'static str>,
}

impl UrlPattern {
    pub const fn host(host: &'static str) -> Self {
        Self { host, path_prefix: None }
    }

    pub const fn host_path(host: &'static str, path_prefix: &'static str) -> Self {
        Self {
            host,
            path_prefix: Some(path_prefix),
        }
    }

    pub fn matches(&self, url: &Url) -> bool {
        let host_ok = url.host_str().is_some_and(|h| h.contains(self.host));
        let path_ok = self.path_prefix.is_none_or(|p| url.path().starts_with(p));
        host_ok && path_ok
    }
}

struct Route {
    pattern: UrlPattern,
    strategy: Box<dyn SourceStrategy>,
}

/// Ordered list of routes; the first match wins.
pub struct ExtractorRegistry {
    routes: Vec<Route>,
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(|r| (r.pattern.host, r.strategy.name())))
            .finish()
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ExtractorRegistry {
    /// Registry with no routes; every URL yields an empty detail.
    pub fn empty() -> Self {
        Self { routes: Vec::new() }
    }

    /// Append a route after the existing ones.
    pub fn with_route(mut self, pattern: UrlPattern, strategy: impl SourceStrategy + 'static) -> Self {
        self.routes.push(Route {
            pattern,
            strategy: Box::new(strategy),
        });
        self
    }

    /// Every source the tool knows how to read.
    pub fn builtin() -> Self {
        Self::empty()
            .with_route(UrlPattern::host("news.naver.com"), naver::NaverArticle)
            .with_route(UrlPattern::host_path("finviz.com", "/news/"), finviz::FinvizNews)
            .with_route(UrlPattern::host("finance.yahoo.com"), finance::YahooFinance)
            .with_route(UrlPattern::host("prnewswire.co.uk"), wires::PrNewswire)
            .with_route(UrlPattern::host("prnewswire.com"), wires::PrNewswire)
            .with_route(UrlPattern::host("businesswire.com"), wires::BusinessWire)
            .with_route(UrlPattern::host("globenewswire.com"), wires::GlobeNewswire)
            .with_route(UrlPattern::host("investopedia.com"), finance::Investopedia)
            .with_route(UrlPattern::host("newsfilecorp.com"), wires::NewsFile)
    }

    /// Strategy for `url`, if any route matches.
    pub fn dispatch(&self, url: &str) -> Option<&dyn SourceStrategy> {
        let parsed = Url::parse(url).ok()?;
        self.routes
            .iter()
            .find(|r| r.pattern.matches(&parsed))
            .map(|r| r.strategy.as_ref())
    }

    /// Run the matching strategy and cap the body at `body_cap` characters.
    pub fn extract(&self, url: &str, document: &Html, body_cap: usize) -> ArticleDetail {
        let Some(strategy) = self.dispatch(url) else {
            debug!(%url, "No extraction strategy for URL");
            return ArticleDetail::default();
        };
        let mut detail = strategy.extract(document);
        detail.body = detail.body.map(|b| truncate_with_ellipsis(&b, body_cap));
        debug!(
            %url,
            strategy = strategy.name(),
            has_time = detail.published_at.is_some(),
            has_body = detail.body.is_some(),
            "Extracted article detail"
        );
        detail
    }
}

/// Body text by the "first sufficiently long paragraph" rule.
///
/// The first paragraph longer than `min_len` characters wins. When none
/// qualifies, the first three non-empty paragraphs are joined with spaces.
pub(crate) fn first_long_paragraph<'a>(
    paragraphs: impl IntoIterator<Item = ElementRef<'a>>,
    min_len: usize,
) -> Option<String> {
    let texts: Vec<String> = paragraphs
        .into_iter()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    if let Some(long) = texts.iter().find(|t| t.chars().count() > min_len) {
        return Some(long.clone());
    }
    non_empty(texts.iter().take(3).cloned().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    struct Fixed;

    impl SourceStrategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn extract(&self, _document: &Html) -> ArticleDetail {
            ArticleDetail {
                body: Some("x".repeat(400)),
                ..Default::default()
            }
        }
    }

    #[test]
    fn test_dispatch_first_match_wins() {
        let registry = ExtractorRegistry::builtin();
        assert_eq!(
            registry.dispatch("https://n.news.naver.com/mnews/article/015/0005123456").unwrap().name(),
            "naver"
        );
        assert_eq!(
            registry.dispatch("https://www.prnewswire.co.uk/news-releases/x.html").unwrap().name(),
            "prnewswire"
        );
        assert_eq!(
            registry.dispatch("https://finance.yahoo.com/news/fed-raises-rates.html").unwrap().name(),
            "yahoo_finance"
        );
    }

    #[test]
    fn test_dispatch_respects_path_prefix() {
        let registry = ExtractorRegistry::builtin();
        assert_eq!(registry.dispatch("https://finviz.com/news/12345/fed").unwrap().name(), "finviz");
        assert!(registry.dispatch("https://finviz.com/quote.ashx?t=AAPL").is_none());
    }

    #[test]
    fn test_unknown_host_yields_empty_detail() {
        let registry = ExtractorRegistry::builtin();
        let doc = Html::parse_document("<p>Some long paragraph that nobody will read because no route matched.</p>");
        assert!(registry.dispatch("https://www.example.org/story").is_none());
        assert!(registry.extract("https://www.example.org/story", &doc, 300).is_empty());
        assert!(registry.extract("not a url", &doc, 300).is_empty());
    }

    #[test]
    fn test_extract_caps_body() {
        let registry = ExtractorRegistry::empty().with_route(UrlPattern::host("example.com"), Fixed);
        let doc = Html::parse_document("");
        let detail = registry.extract("https://example.com/a", &doc, 300);
        let body = detail.body.unwrap();
        assert_eq!(body.chars().count(), 303);
        assert!(body.ends_with("..."));
    }

    #[test]
    fn test_first_long_paragraph_prefers_long_one() {
        let doc = Html::parse_fragment(
            "<div><p>Short intro.</p><p>This paragraph is comfortably longer than fifty characters in total.</p></div>",
        );
        let p = Selector::parse("p").unwrap();
        assert_eq!(
            first_long_paragraph(doc.select(&p), 50).as_deref(),
            Some("This paragraph is comfortably longer than fifty characters in total.")
        );
    }

    #[test]
    fn test_first_long_paragraph_joins_first_three_as_fallback() {
        let doc = Html::parse_fragment("<div><p>One.</p><p></p><p>Two.</p><p>Three.</p><p>Four.</p></div>");
        let p = Selector::parse("p").unwrap();
        assert_eq!(first_long_paragraph(doc.select(&p), 80).as_deref(), Some("One. Two. Three."));
        let empty = Html::parse_fragment("<div></div>");
        assert!(first_long_paragraph(empty.select(&p), 80).is_none());
    }
}
