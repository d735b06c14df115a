//! Finviz market news listing (`finviz.com/news.ashx?v=3`).
//!
//! Each row links either to an external publisher or to a finviz-hosted copy
//! of the story. The anchor's `href` may be truncated, so the full external
//! URL is taken from its `onclick` handler when present. A finviz-hosted
//! link is kept as the entry's mirror.

use super::{ListingContext, find_container};
use crate::fetch::host_within;
use crate::models::ListingEntry;
use crate::utils::{element_text, first_text};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::warn;
use url::Url;

static TRACK_AND_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"trackAndOpenNews\(event,\s*'[^']*',\s*'([^']+)'\)").expect("invalid onclick pattern")
});

pub fn parse_news(document: &Html, ctx: &ListingContext) -> Vec<ListingEntry> {
    let Some(container) = find_container(document, selector!("#news"), selector!("[id*='news']")) else {
        warn!(section = %ctx.section, "News container not found");
        return Vec::new();
    };

    container
        .select(selector!(".news table tr"))
        .filter_map(|row| news_row(row, ctx))
        .take(ctx.max_items)
        .collect()
}

fn news_row(row: ElementRef<'_>, ctx: &ListingContext) -> Option<ListingEntry> {
    let cell = row.select(selector!(".news_link-cell")).next()?;
    let badges = cell.select(selector!(".news-badges-container")).next()?;
    let anchor = badges.select(selector!("a")).next()?;

    let title = element_text(anchor);
    if title.is_empty() {
        return None;
    }

    let href = ctx.resolve(anchor.value().attr("href").unwrap_or_default());
    let external = anchor
        .value()
        .attr("onclick")
        .and_then(|js| TRACK_AND_OPEN.captures(js))
        .and_then(|caps| caps.get(1))
        .map(|m| ctx.resolve(m.as_str()))
        .filter(|u| !u.is_empty());

    let mirror_url = Some(href.clone()).filter(|u| is_finviz_hosted(u));
    let url = external.unwrap_or(href);

    let tags = badges
        .select(selector!(".stock-news-label"))
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();
    let press = first_text(cell, selector!(".news_date-cell")).unwrap_or_default();

    let mut entry = ListingEntry::new(&ctx.section, title, url, press, String::new());
    entry.mirror_url = mirror_url;
    entry.tags = tags;
    Some(entry)
}

fn is_finviz_hosted(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| host_within(h, "finviz.com")))
        .unwrap_or(false)
}
