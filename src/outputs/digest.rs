//! Plain-text digest rendering.
//!
//! # Layout
//!
//! ```text
//! === 2025-05-06 헤드라인 모음 ===
//!
//!
//! 목차:
//! 1. === 경제 ===
//! 2. === 사회 ===
//!
//!
//! === 경제 ===
//!
//! 제목: 한은, 기준금리 동결
//! 내용: 한국은행 금융통화위원회가...
//! 언론사: 한국경제
//! 작성일: 2025.05.06. 오전 9:01
//! 링크: https://n.news.naver.com/mnews/article/015/1
//!
//! ==================================================
//!
//! ```
//!
//! The table of contents lists every configured section, including ones that
//! produced nothing; the body only carries sections with articles. Optional
//! lines (tags, dates, body) are left out when absent.

use crate::config::LabelSet;
use crate::models::{AggregatedArticle, Digest};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

const RULE_WIDTH: usize = 50;

/// Field labels for one output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub contents: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
    pub press: &'static str,
    pub tags: &'static str,
    pub published: &'static str,
    pub modified: &'static str,
    pub body: &'static str,
    pub link: &'static str,
    pub empty: &'static str,
}

impl LabelSet {
    pub fn labels(self) -> Labels {
        match self {
            LabelSet::Korean => Labels {
                contents: "목차",
                title: "제목",
                summary: "내용",
                press: "언론사",
                tags: "종목",
                published: "작성일",
                modified: "수정일",
                body: "본문",
                link: "링크",
                empty: "수집된 기사가 없습니다.",
            },
            LabelSet::English => Labels {
                contents: "Contents",
                title: "Title",
                summary: "Summary",
                press: "Press",
                tags: "Labels",
                published: "Date",
                modified: "Modified",
                body: "Content",
                link: "Link",
                empty: "No entries collected.",
            },
        }
    }
}

/// Render `digest` as the text document.
pub fn render_digest(digest: &Digest, labels: LabelSet) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_document(&mut out, digest, &labels.labels());
    out
}

fn write_document(out: &mut String, digest: &Digest, labels: &Labels) -> fmt::Result {
    write!(out, "=== {} {} ===\n\n\n", digest.date, digest.title)?;

    if !digest.configured_sections.is_empty() {
        writeln!(out, "{}:", labels.contents)?;
        for (idx, name) in digest.configured_sections.iter().enumerate() {
            writeln!(out, "{}. === {} ===", idx + 1, name)?;
        }
        out.push_str("\n\n");
    }

    if digest.article_count() == 0 {
        writeln!(out, "{}", labels.empty)?;
        return Ok(());
    }

    for section in digest.sections.iter().filter(|s| !s.articles.is_empty()) {
        write!(out, "=== {} ===\n\n", section.name)?;
        for article in &section.articles {
            write_article(out, article, labels)?;
        }
    }
    Ok(())
}

fn write_article(out: &mut String, article: &AggregatedArticle, labels: &Labels) -> fmt::Result {
    let entry = &article.entry;
    let detail = &article.detail;

    writeln!(out, "{}: {}", labels.title, article.display_title())?;
    writeln!(out, "{}: {}", labels.summary, entry.summary)?;
    writeln!(out, "{}: {}", labels.press, entry.press)?;
    if !entry.tags.is_empty() {
        writeln!(out, "{}: {}", labels.tags, entry.tags.join(", "))?;
    }
    if let Some(published) = &detail.published_at {
        writeln!(out, "{}: {}", labels.published, published)?;
    }
    if let Some(modified) = &detail.modified_at {
        writeln!(out, "{}: {}", labels.modified, modified)?;
    }
    if let Some(body) = &detail.body {
        writeln!(out, "{}: {}", labels.body, body)?;
    }
    write!(out, "{}: {}\n\n", labels.link, entry.url)?;
    write!(out, "{}\n\n", "=".repeat(RULE_WIDTH))
}

/// `{output_dir}/{collection}/{YYYY}/{MM}/{YYYY-MM-DD}_{file_stem}.txt`
pub fn digest_path(output_dir: &str, collection: &str, file_stem: &str, date: NaiveDate) -> PathBuf {
    Path::new(output_dir)
        .join(collection)
        .join(date.format("%Y").to_string())
        .join(date.format("%m").to_string())
        .join(format!("{}_{}.txt", date.format("%Y-%m-%d"), file_stem))
}

/// Write the rendered digest, replacing any earlier file for the same day.
///
/// The text goes to a temporary sibling first and is renamed into place, so
/// readers never see a partial digest.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_digest(path: &Path, text: &str) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("txt.tmp");
    fs::write(&tmp, text).await?;
    fs::rename(&tmp, path).await?;
    info!(bytes = text.len(), "Wrote digest");
    Ok(())
}
