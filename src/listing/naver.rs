//! Naver News listing layouts: section headlines, subsection "latest"
//! blocks, per-press editorial lists, and the section sub-navigation used
//! to discover subsections.

use super::{ListingContext, find_container};
use crate::config::SectionConfig;
use crate::fetch::{PageFetcher, PageRequest, fetch_document};
use crate::models::ListingEntry;
use crate::utils::{first_text, truncate_with_ellipsis};
use itertools::Itertools;
use scraper::{ElementRef, Html};
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument, warn};
use url::Url;

/// Only the first few article groups of a "latest" block are current.
const LATEST_GROUPS: usize = 4;

fn lede(item: ElementRef<'_>, ctx: &ListingContext) -> String {
    first_text(item, selector!(".sa_text_lede"))
        .map(|t| truncate_with_ellipsis(&t, ctx.summary_cap))
        .unwrap_or_default()
}

fn press(item: ElementRef<'_>) -> String {
    first_text(item, selector!(".sa_text_press")).unwrap_or_default()
}

/// Headline cluster on a section front page (`/section/101`).
pub fn parse_headlines(document: &Html, ctx: &ListingContext) -> Vec<ListingEntry> {
    let Some(container) = find_container(
        document,
        selector!("div.section_component.as_section_headline"),
        selector!("div[class*='as_section_headline']"),
    ) else {
        warn!(section = %ctx.section, "Headline block not found");
        return Vec::new();
    };

    let mut items: Vec<ElementRef<'_>> = container.select(selector!("div.sa_item")).collect();
    if items.is_empty() {
        items = container.select(selector!("li.sa_item")).collect();
    }

    items
        .into_iter()
        .filter_map(|item| headline_item(item, ctx))
        .take(ctx.max_items)
        .collect()
}

fn headline_item(item: ElementRef<'_>, ctx: &ListingContext) -> Option<ListingEntry> {
    let title = first_text(item, selector!(".sa_text_strong"))?;
    let link = item
        .select(selector!("a.sa_text_title"))
        .next()
        .or_else(|| item.select(selector!("a[href]")).next());
    let href = link
        .and_then(|a| {
            let el = a.value();
            el.attr("data-imp-url")
                .filter(|u| !u.trim().is_empty())
                .or_else(|| el.attr("href"))
        })
        .unwrap_or_default();

    Some(ListingEntry::new(&ctx.section, title, ctx.resolve(href), press(item), lede(item, ctx)))
}

/// "Latest articles" block on a subsection page.
pub fn parse_latest(document: &Html, ctx: &ListingContext) -> Vec<ListingEntry> {
    let Some(container) = find_container(
        document,
        selector!(".section_latest"),
        selector!("[class*='section_latest']"),
    ) else {
        warn!(section = %ctx.section, "Latest-articles block not found");
        return Vec::new();
    };

    container
        .select(selector!(".section_article"))
        .take(LATEST_GROUPS)
        .filter_map(|group| group.select(selector!(".sa_list")).next())
        .flat_map(|list| list.select(selector!(".sa_item")))
        .filter_map(|item| latest_item(item, ctx))
        .take(ctx.max_items)
        .collect()
}

fn latest_item(item: ElementRef<'_>, ctx: &ListingContext) -> Option<ListingEntry> {
    let title_el = item.select(selector!(".sa_text_title")).next()?;
    let title = first_text(item, selector!(".sa_text_title"))?;
    let href = title_el.value().attr("href").unwrap_or_default();
    Some(ListingEntry::new(&ctx.section, title, ctx.resolve(href), press(item), lede(item, ctx)))
}

/// Editorial list of one press office. The section name is the press name.
///
/// Items only need a link; the headline may be missing here and is then
/// taken from the article page.
pub fn parse_editorials(document: &Html, ctx: &ListingContext) -> Vec<ListingEntry> {
    let Some(container) = find_container(
        document,
        selector!(".opinion_editorial_list"),
        selector!("[class*='opinion_editorial_list']"),
    ) else {
        warn!(section = %ctx.section, "Editorial list not found");
        return Vec::new();
    };

    container
        .select(selector!(".opinion_editorial_item"))
        .filter_map(|item| {
            let href = item.select(selector!("a[href]")).next()?.value().attr("href")?;
            let url = ctx.resolve(href);
            if url.is_empty() {
                return None;
            }
            let title = first_text(item, selector!(".title")).unwrap_or_default();
            let summary = first_text(item, selector!(".description"))
                .map(|t| truncate_with_ellipsis(&t, ctx.summary_cap))
                .unwrap_or_default();
            Some(ListingEntry::new(&ctx.section, title, url, ctx.section.clone(), summary))
        })
        .take(ctx.max_items)
        .collect()
}

/// Subsections listed in a section page's sub-navigation, unique by URL.
pub fn parse_subsections(document: &Html, base: &Url) -> Vec<SectionConfig> {
    let Some(nav) = document.select(selector!(".ct_snb_nav")).next() else {
        warn!("Sub-navigation not found");
        return Vec::new();
    };

    nav.select(selector!(".ct_snb_nav_item"))
        .filter_map(|item| {
            let link = item.select(selector!(".ct_snb_nav_item_link")).next()?;
            let name = first_text(item, selector!(".ct_snb_nav_item_link"))?;
            let href = link.value().attr("href")?;
            let url = base.join(href).ok()?;
            Some(SectionConfig {
                name,
                url: url.to_string(),
            })
        })
        .unique_by(|s| s.url.clone())
        .collect()
}

/// Fetch `nav_url` and list its subsections.
#[instrument(level = "info", skip(fetcher))]
pub async fn discover_sections<F: PageFetcher>(
    fetcher: &F,
    nav_url: &str,
    delay: Duration,
) -> Result<Vec<SectionConfig>, Box<dyn Error>> {
    let base = Url::parse(nav_url)?;
    let document = fetch_document(fetcher, PageRequest::new(nav_url, delay)).await?;
    let sections = parse_subsections(&document, &base);
    info!(count = sections.len(), "Discovered subsections");
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(section: &str, url: &str) -> ListingContext {
        ListingContext::new(section, Url::parse(url).unwrap(), 70, 50)
    }

    const HEADLINES: &str = r#"
        <div class="section_component as_section_headline">
          <ul class="sa_list">
            <li class="sa_item"><div class="sa_item_inner">
              <a href="https://n.news.naver.com/mnews/article/015/1" data-imp-url="https://n.news.naver.com/mnews/article/015/1?imp=1" class="sa_text_title">
                <strong class="sa_text_strong">한은, 기준금리 동결</strong></a>
              <div class="sa_text_lede">한국은행 금융통화위원회가 기준금리를 연 3.5%로 유지했다. 시장의 예상과 부합하는 결정이며 하반기 인하 가능성이 거론된다. 이창용 총재는 물가 경로를 더 지켜보겠다고 말했다.</div>
              <div class="sa_text_press">한국경제</div>
            </div></li>
            <li class="sa_item"><div class="sa_item_inner">
              <div class="sa_text_lede">제목이 없는 항목</div>
            </div></li>
            <li class="sa_item"><div class="sa_item_inner">
              <a href="/mnews/article/011/2" class="sa_text_title"><strong class="sa_text_strong">코스피 2600 회복</strong></a>
              <div class="sa_text_press">서울경제</div>
            </div></li>
          </ul>
        </div>"#;

    #[test]
    fn test_headlines_in_document_order_skipping_untitled() {
        let doc = Html::parse_document(HEADLINES);
        let entries = parse_headlines(&doc, &ctx("경제", "https://news.naver.com/section/101"));
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.section, "경제");
        assert_eq!(first.title, "한은, 기준금리 동결");
        assert_eq!(first.url, "https://n.news.naver.com/mnews/article/015/1?imp=1");
        assert_eq!(first.press, "한국경제");
        assert_eq!(first.summary.chars().count(), 73);
        assert!(first.summary.ends_with("..."));

        let second = &entries[1];
        assert_eq!(second.url, "https://news.naver.com/mnews/article/011/2");
        assert_eq!(second.summary, "");
    }

    #[test]
    fn test_headlines_alternate_container_by_substring() {
        let html = r#"<div class="sc_v2 as_section_headline_v2">
              <div class="sa_item"><a class="sa_text_title" href="https://n.news.naver.com/a/1"><strong class="sa_text_strong">T</strong></a></div>
            </div>"#;
        let doc = Html::parse_document(html);
        let entries = parse_headlines(&doc, &ctx("경제", "https://news.naver.com/section/101"));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "T");
    }

    #[test]
    fn test_missing_container_yields_nothing() {
        let doc = Html::parse_document("<div class='maintenance'>점검 중</div>");
        let c = ctx("경제", "https://news.naver.com/section/101");
        assert!(parse_headlines(&doc, &c).is_empty());
        assert!(parse_latest(&doc, &c).is_empty());
        assert!(parse_editorials(&doc, &c).is_empty());
    }

    #[test]
    fn test_latest_reads_first_four_groups_only() {
        let group = |n: usize| {
            format!(
                r#"<div class="section_article"><ul class="sa_list">
                     <li class="sa_item"><a class="sa_text_title" href="/article/{n}"><strong>기사 {n}</strong></a>
                       <div class="sa_text_press">언론사{n}</div></li>
                   </ul></div>"#
            )
        };
        let groups: String = (1..=5).map(group).collect();
        let html = format!(r#"<div class="section_latest _persist">{groups}</div>"#);
        let doc = Html::parse_document(&html);
        let entries = parse_latest(&doc, &ctx("금융", "https://news.naver.com/breakingnews/section/101/259"));
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].title, "기사 1");
        assert_eq!(entries[0].url, "https://news.naver.com/article/1");
        assert_eq!(entries[3].press, "언론사4");
    }

    #[test]
    fn test_latest_respects_max_items() {
        let items: String = (1..=10)
            .map(|n| format!(r#"<li class="sa_item"><a class="sa_text_title" href="/a/{n}">기사 {n}</a></li>"#))
            .collect();
        let html = format!(r#"<div class="section_latest"><div class="section_article"><ul class="sa_list">{items}</ul></div></div>"#);
        let doc = Html::parse_document(&html);
        let mut c = ctx("금융", "https://news.naver.com/breakingnews/section/101/259");
        c.max_items = 3;
        assert_eq!(parse_latest(&doc, &c).len(), 3);
    }

    #[test]
    fn test_editorials_need_only_a_link() {
        let html = r#"
            <ul class="opinion_editorial_list">
              <li class="opinion_editorial_item"><a href="/mnews/article/015/100"><strong class="title">[사설] 노동개혁 서둘러야</strong>
                <p class="description">정부는 연내 입법을 마쳐야 한다.</p></a></li>
              <li class="opinion_editorial_item"><a href="https://n.news.naver.com/mnews/article/015/101"></a></li>
              <li class="opinion_editorial_item"><span>링크 없음</span></li>
            </ul>"#;
        let doc = Html::parse_document(html);
        let entries = parse_editorials(&doc, &ctx("한국경제", "https://news.naver.com/opinion/editorial?officeId=015"));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "[사설] 노동개혁 서둘러야");
        assert_eq!(entries[0].url, "https://news.naver.com/mnews/article/015/100");
        assert_eq!(entries[0].press, "한국경제");
        assert_eq!(entries[0].summary, "정부는 연내 입법을 마쳐야 한다.");
        assert_eq!(entries[1].title, "");
    }

    #[test]
    fn test_subsections_unique_by_url() {
        let html = r#"
            <ul class="ct_snb_nav">
              <li class="ct_snb_nav_item"><a class="ct_snb_nav_item_link" href="/breakingnews/section/101/259">금융</a></li>
              <li class="ct_snb_nav_item"><a class="ct_snb_nav_item_link" href="/breakingnews/section/101/258">증권</a></li>
              <li class="ct_snb_nav_item"><a class="ct_snb_nav_item_link" href="/breakingnews/section/101/259">금융</a></li>
            </ul>"#;
        let doc = Html::parse_document(html);
        let base = Url::parse("https://news.naver.com/section/101").unwrap();
        let sections = parse_subsections(&doc, &base);
        assert_eq!(
            sections,
            vec![
                SectionConfig::new("금융", "https://news.naver.com/breakingnews/section/101/259"),
                SectionConfig::new("증권", "https://news.naver.com/breakingnews/section/101/258"),
            ]
        );
    }
}
