//! Data models for listing entries, extracted article details, and digests.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ListingEntry`]: One article summary scraped from a listing page
//! - [`ArticleDetail`]: Fields extracted from an article's detail page
//! - [`AggregatedArticle`]: A listing entry joined with its detail
//! - [`Digest`]: The ordered, sectioned result of one collection run

use serde::{Deserialize, Serialize};

/// One article summary as it appears on a listing page.
///
/// Created by the listing collectors and never mutated afterwards. The `url`
/// is the deduplication key when it is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Name of the section the listing page belongs to.
    pub section: String,
    /// Headline text. May be empty on listings that only carry links.
    pub title: String,
    /// Absolute URL of the detail page, or empty when the listing had none.
    pub url: String,
    /// Publisher or press office name.
    pub press: String,
    /// Short lede, already cut to the configured summary budget.
    pub summary: String,
    /// A same-content mirror of `url` that can be tried when `url` yields no body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_url: Option<String>,
    /// Ticker or topic labels shown next to the headline.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ListingEntry {
    /// Build an entry with only the always-present fields set.
    pub fn new(section: &str, title: String, url: String, press: String, summary: String) -> Self {
        Self {
            section: section.to_string(),
            title,
            url,
            press,
            summary,
            mirror_url: None,
            tags: Vec::new(),
        }
    }
}

/// Fields extracted from a detail page.
///
/// Every field is optional; a strategy that finds nothing returns
/// [`ArticleDetail::default`]. Absent fields are left out of the digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Headline as printed on the detail page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
}

impl ArticleDetail {
    pub fn is_empty(&self) -> bool {
        self.published_at.is_none()
            && self.modified_at.is_none()
            && self.body.is_none()
            && self.headline.is_none()
    }

    /// Fill only the fields that are still `None` from `other`.
    ///
    /// Fields already set are never overwritten, so the first source that
    /// produced a value for a field keeps it.
    pub fn fill_missing(&mut self, other: ArticleDetail) {
        if self.published_at.is_none() {
            self.published_at = other.published_at;
        }
        if self.modified_at.is_none() {
            self.modified_at = other.modified_at;
        }
        if self.body.is_none() {
            self.body = other.body;
        }
        if self.headline.is_none() {
            self.headline = other.headline;
        }
    }
}

/// A listing entry joined with whatever detail could be extracted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedArticle {
    #[serde(flatten)]
    pub entry: ListingEntry,
    #[serde(flatten)]
    pub detail: ArticleDetail,
}

impl AggregatedArticle {
    /// Title to print: the listing title, or the detail headline when the
    /// listing carried none.
    pub fn display_title(&self) -> &str {
        if self.entry.title.is_empty() {
            self.detail.headline.as_deref().unwrap_or("")
        } else {
            &self.entry.title
        }
    }
}

/// All surviving articles of one section, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestSection {
    pub name: String,
    pub articles: Vec<AggregatedArticle>,
}

/// How one configured section fared during listing collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionOutcome {
    pub name: String,
    /// The listing page was fetched and parsed without a transport error.
    pub listed: bool,
    /// Entries extracted from the listing page.
    pub collected: usize,
    /// Entries that survived deduplication.
    pub accepted: usize,
}

/// The assembled result of one collection run.
///
/// `configured_sections` keeps every configured section name in order, even
/// those that produced no articles; `sections` only holds non-empty ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    /// Run date in `YYYY-MM-DD` format.
    pub date: String,
    /// Human-readable collection title, e.g. `헤드라인 모음`.
    pub title: String,
    pub configured_sections: Vec<String>,
    pub sections: Vec<DigestSection>,
    pub outcomes: Vec<SectionOutcome>,
}

impl Digest {
    pub fn article_count(&self) -> usize {
        self.sections.iter().map(|s| s.articles.len()).sum()
    }

    /// True when at least one section's listing page was collected.
    pub fn listing_completed(&self) -> bool {
        self.outcomes.iter().any(|o| o.listed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, url: &str) -> ListingEntry {
        ListingEntry::new("Economy", title.to_string(), url.to_string(), "Press".to_string(), String::new())
    }

    #[test]
    fn test_fill_missing_keeps_existing_fields() {
        let mut primary = ArticleDetail {
            published_at: Some("2025-05-06 09:00".to_string()),
            ..Default::default()
        };
        let fallback = ArticleDetail {
            published_at: Some("May 6, 2025, 9:00 AM".to_string()),
            body: Some("Body from the mirror".to_string()),
            ..Default::default()
        };
        primary.fill_missing(fallback);
        assert_eq!(primary.published_at.as_deref(), Some("2025-05-06 09:00"));
        assert_eq!(primary.body.as_deref(), Some("Body from the mirror"));
        assert!(primary.modified_at.is_none());
    }

    #[test]
    fn test_detail_is_empty() {
        assert!(ArticleDetail::default().is_empty());
        let d = ArticleDetail {
            headline: Some("x".to_string()),
            ..Default::default()
        };
        assert!(!d.is_empty());
    }

    #[test]
    fn test_display_title_falls_back_to_headline() {
        let with_title = AggregatedArticle {
            entry: entry("Fed raises rates", "https://a"),
            detail: ArticleDetail {
                headline: Some("Other".to_string()),
                ..Default::default()
            },
        };
        assert_eq!(with_title.display_title(), "Fed raises rates");

        let without_title = AggregatedArticle {
            entry: entry("", "https://b"),
            detail: ArticleDetail {
                headline: Some("[사설] 금리 동결의 의미".to_string()),
                ..Default::default()
            },
        };
        assert_eq!(without_title.display_title(), "[사설] 금리 동결의 의미");
    }

    #[test]
    fn test_digest_serialization_flattens_articles() {
        let digest = Digest {
            date: "2025-05-06".to_string(),
            title: "Latest Stock News".to_string(),
            configured_sections: vec!["Economy".to_string()],
            sections: vec![DigestSection {
                name: "Economy".to_string(),
                articles: vec![AggregatedArticle {
                    entry: entry("Fed raises rates", "https://example.com/a"),
                    detail: ArticleDetail::default(),
                }],
            }],
            outcomes: vec![SectionOutcome {
                name: "Economy".to_string(),
                listed: true,
                collected: 1,
                accepted: 1,
            }],
        };

        let json = serde_json::to_string(&digest).unwrap();
        assert!(json.contains("\"title\":\"Fed raises rates\""));
        assert!(!json.contains("published_at"));
        assert_eq!(digest.article_count(), 1);
        assert!(digest.listing_completed());
    }
}
