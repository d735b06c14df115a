//! Press-release wires: PR Newswire, BusinessWire, GlobeNewswire, NewsFile.
//!
//! Several of these render the release body with script, in which case the
//! strategy finds no body and the pipeline falls back to the entry's mirror.

use super::{SourceStrategy, first_long_paragraph};
use crate::models::ArticleDetail;
use crate::utils::{element_text, first_text, non_empty};
use scraper::Html;

/// `prnewswire.com` and `prnewswire.co.uk` releases.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrNewswire;

impl SourceStrategy for PrNewswire {
    fn name(&self) -> &'static str {
        "prnewswire"
    }

    fn extract(&self, document: &Html) -> ArticleDetail {
        let root = document.root_element();
        ArticleDetail {
            published_at: first_text(root, selector!(".mb-no")),
            body: first_long_paragraph(root.select(selector!(".release-body .row p")), 50),
            ..Default::default()
        }
    }
}

/// `businesswire.com` releases. No machine-readable timestamp in the page body.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusinessWire;

impl SourceStrategy for BusinessWire {
    fn name(&self) -> &'static str {
        "businesswire"
    }

    fn extract(&self, document: &Html) -> ArticleDetail {
        let root = document.root_element();
        let body = first_long_paragraph(root.select(selector!(".bw-release-story p")), 80)
            .or_else(|| first_text(root, selector!(".bw-release-story .bwalignc")));
        ArticleDetail {
            body,
            ..Default::default()
        }
    }
}

/// `globenewswire.com` releases.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobeNewswire;

impl SourceStrategy for GlobeNewswire {
    fn name(&self) -> &'static str {
        "globenewswire"
    }

    fn extract(&self, document: &Html) -> ArticleDetail {
        let root = document.root_element();
        ArticleDetail {
            published_at: first_text(root, selector!(".article-published-source")),
            body: first_long_paragraph(root.select(selector!(".article-body p")), 50),
            ..Default::default()
        }
    }
}

/// `newsfilecorp.com` releases.
///
/// The `#release` block starts with the dateline but runs on into the
/// release text, so only its head is kept. The body is every unstyled
/// paragraph; styled ones are disclaimers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewsFile;

const RELEASE_HEAD: usize = 100;

impl SourceStrategy for NewsFile {
    fn name(&self) -> &'static str {
        "newsfile"
    }

    fn extract(&self, document: &Html) -> ArticleDetail {
        let root = document.root_element();
        let published_at = first_text(root, selector!("#release")).map(|t| t.chars().take(RELEASE_HEAD).collect());
        let body = root
            .select(selector!("p:not([style])"))
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        ArticleDetail {
            published_at,
            body: non_empty(body),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prnewswire_release() {
        let html = r#"
            <p class="mb-no">May 06, 2025, 08:00 ET</p>
            <section class="release-body"><div class="row">
              <p>NEW YORK, May 6, 2025 /PRNewswire/ -- Example Holdings today reported first-quarter results ahead of expectations.</p>
            </div></section>"#;
        let detail = PrNewswire.extract(&Html::parse_document(html));
        assert_eq!(detail.published_at.as_deref(), Some("May 06, 2025, 08:00 ET"));
        assert!(detail.body.unwrap().contains("/PRNewswire/"));
    }

    #[test]
    fn test_prnewswire_script_rendered_page_has_no_body() {
        let html = r#"<p class="mb-no">May 06, 2025</p><div id="root"></div><script>render()</script>"#;
        let detail = PrNewswire.extract(&Html::parse_document(html));
        assert!(detail.published_at.is_some());
        assert!(detail.body.is_none());
    }

    #[test]
    fn test_businesswire_falls_back_to_centered_block() {
        let html = r#"<div class="bw-release-story"><div class="bwalignc">ACME Announces Dividend</div></div>"#;
        let detail = BusinessWire.extract(&Html::parse_document(html));
        assert_eq!(detail.body.as_deref(), Some("ACME Announces Dividend"));
        assert!(detail.published_at.is_none());
    }

    #[test]
    fn test_globenewswire_release() {
        let html = r#"
            <span class="article-published-source">May 06, 2025 07:30 ET | Source: Example Inc.</span>
            <div class="article-body"><p>TORONTO, May 06, 2025 (GLOBE NEWSWIRE) -- Example Inc. announced a strategic partnership today.</p></div>"#;
        let detail = GlobeNewswire.extract(&Html::parse_document(html));
        assert!(detail.published_at.unwrap().starts_with("May 06, 2025"));
        assert!(detail.body.unwrap().contains("GLOBE NEWSWIRE"));
    }

    #[test]
    fn test_newsfile_skips_styled_paragraphs_and_trims_dateline() {
        let long_release = format!("Vancouver, British Columbia--(Newsfile Corp. - May 6, 2025) - {}", "x".repeat(200));
        let html = format!(
            r#"<div id="release">{long_release}</div>
               <p style="font-size:8pt">Not for distribution in the United States. This disclaimer is long enough to qualify otherwise.</p>
               <p>Example Mining Corp. is pleased to announce drilling results.</p>
               <p>Assays are pending.</p>"#
        );
        let detail = NewsFile.extract(&Html::parse_document(&html));
        let published = detail.published_at.unwrap();
        assert_eq!(published.chars().count(), RELEASE_HEAD);
        assert!(published.starts_with("Vancouver, British Columbia--(Newsfile Corp. - May 6, 2025)"));
        assert_eq!(
            detail.body.as_deref(),
            Some("Example Mining Corp. is pleased to announce drilling results. Assays are pending.")
        );
    }
}
