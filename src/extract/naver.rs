//! Naver News article pages (`n.news.naver.com/mnews/article/...`).
//!
//! The page header carries one or two datestamps: the first is the
//! publication time, and when a second one exists the modification time is
//! the element marked `_ARTICLE_MODIFY_DATE_TIME`. The body container has
//! moved around over the years, so three locations are tried in order.

use super::SourceStrategy;
use crate::models::ArticleDetail;
use crate::utils::{element_text, first_text, non_empty};
use scraper::Html;

#[derive(Debug, Clone, Copy, Default)]
pub struct NaverArticle;

impl SourceStrategy for NaverArticle {
    fn name(&self) -> &'static str {
        "naver"
    }

    fn extract(&self, document: &Html) -> ArticleDetail {
        let root = document.root_element();

        let stamps: Vec<String> = root
            .select(selector!(".media_end_head_info_datestamp_time"))
            .map(element_text)
            .collect();
        let published_at = stamps.first().cloned().and_then(non_empty);
        let modified_at = if stamps.len() >= 2 {
            first_text(root, selector!("._ARTICLE_MODIFY_DATE_TIME"))
        } else {
            None
        };

        let body = [
            selector!("._article_body"),
            selector!("#newsct_article"),
            selector!(".newsct_article"),
        ]
        .into_iter()
        .find_map(|sel| first_text(root, sel));

        ArticleDetail {
            published_at,
            modified_at,
            body,
            headline: first_text(root, selector!(".media_end_head_headline")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"
        <html><body>
          <h2 class="media_end_head_headline"><span>[사설] 금리 동결, 이제는 구조개혁이다</span></h2>
          <div class="media_end_head_info_datestamp">
            <span class="media_end_head_info_datestamp_time _ARTICLE_DATE_TIME" data-date-time="2025-05-06 09:01:00">2025.05.06. 오전 9:01</span>
            <span class="media_end_head_info_datestamp_time _ARTICLE_MODIFY_DATE_TIME" data-modify-date-time="2025-05-06 10:15:00">2025.05.06. 오전 10:15</span>
          </div>
          <article id="dic_area" class="go_trans _article_content _article_body">
            한국은행이 기준금리를 동결했다.
            <br>시장은 하반기 인하를 기대하고 있다.
          </article>
        </body></html>
    "#;

    #[test]
    fn test_extracts_dates_headline_and_body() {
        let doc = Html::parse_document(ARTICLE);
        let detail = NaverArticle.extract(&doc);
        assert_eq!(detail.published_at.as_deref(), Some("2025.05.06. 오전 9:01"));
        assert_eq!(detail.modified_at.as_deref(), Some("2025.05.06. 오전 10:15"));
        assert_eq!(detail.headline.as_deref(), Some("[사설] 금리 동결, 이제는 구조개혁이다"));
        assert_eq!(
            detail.body.as_deref(),
            Some("한국은행이 기준금리를 동결했다. 시장은 하반기 인하를 기대하고 있다.")
        );
    }

    #[test]
    fn test_single_stamp_has_no_modified_time() {
        let doc = Html::parse_document(
            r#"<span class="media_end_head_info_datestamp_time">2025.05.06. 오후 3:00</span>
               <div id="newsct_article">본문</div>"#,
        );
        let detail = NaverArticle.extract(&doc);
        assert_eq!(detail.published_at.as_deref(), Some("2025.05.06. 오후 3:00"));
        assert!(detail.modified_at.is_none());
        assert_eq!(detail.body.as_deref(), Some("본문"));
    }

    #[test]
    fn test_unrelated_markup_yields_nothing() {
        let doc = Html::parse_document("<div class='something_else'>text</div>");
        assert!(NaverArticle.extract(&doc).is_empty());
    }
}
