//! Finance portals: Yahoo Finance and Investopedia.

use super::{SourceStrategy, first_long_paragraph};
use crate::models::ArticleDetail;
use crate::utils::{element_text, first_text, non_empty};
use scraper::{ElementRef, Html};

/// Yahoo Finance articles (`finance.yahoo.com/news/...`).
///
/// The first body paragraph is often a `By …` byline; those are skipped
/// before the length rule is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct YahooFinance;

impl SourceStrategy for YahooFinance {
    fn name(&self) -> &'static str {
        "yahoo_finance"
    }

    fn extract(&self, document: &Html) -> ArticleDetail {
        let root = document.root_element();
        let paragraphs = root
            .select(selector!(".article .body-wrap .body p"))
            .filter(|p: &ElementRef<'_>| !element_text(*p).starts_with("By "));

        ArticleDetail {
            published_at: first_text(root, selector!(".byline-attr-meta-time")),
            body: first_long_paragraph(paragraphs, 50),
            ..Default::default()
        }
    }
}

/// Investopedia articles. The body is made of `finance-sc-block-html`
/// blocks which are joined in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Investopedia;

impl SourceStrategy for Investopedia {
    fn name(&self) -> &'static str {
        "investopedia"
    }

    fn extract(&self, document: &Html) -> ArticleDetail {
        let root = document.root_element();
        let blocks = root
            .select(selector!(".article-body-content .finance-sc-block-html"))
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let body = non_empty(blocks)
            .or_else(|| first_long_paragraph(root.select(selector!(".article-body-content p")), 80));

        ArticleDetail {
            published_at: first_text(root, selector!(".mntl-attribution__item-date")),
            body,
            ..Default::default()
        }
    }
}
