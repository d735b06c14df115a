//! Finviz-hosted news pages (`finviz.com/news/...`).
//!
//! Finviz mirrors many press releases whose original hosts need script
//! execution, which makes this page the usual fallback for finance entries.
//! The timestamp has no dedicated element, so it is found by pattern in the
//! article text (`February 19, 2026, 4:02 PM`).

use super::{SourceStrategy, first_long_paragraph};
use crate::models::ArticleDetail;
use crate::utils::element_text;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static DATELINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"((?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},\s+\d{4},?\s*\d{1,2}:\d{2}\s*(?:AM|PM)?)",
    )
    .expect("dateline regex")
});

/// Paragraphs shorter than this are captions or bylines.
const MIN_PARAGRAPH: usize = 80;

#[derive(Debug, Clone, Copy, Default)]
pub struct FinvizNews;

impl SourceStrategy for FinvizNews {
    fn name(&self) -> &'static str {
        "finviz"
    }

    fn extract(&self, document: &Html) -> ArticleDetail {
        let Some(wrapper) = document
            .select(selector!(".news-content"))
            .next()
            .and_then(|content| content.select(selector!("div")).next())
        else {
            return ArticleDetail::default();
        };

        let text = element_text(wrapper);
        let published_at = DATELINE.captures(&text).map(|c| c[1].to_string());
        let body = first_long_paragraph(wrapper.select(selector!("p")), MIN_PARAGRAPH);

        ArticleDetail {
            published_at,
            body,
            ..Default::default()
        }
    }
}
