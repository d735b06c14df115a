//! The aggregation pipeline for one collection.
//!
//! A run moves through [`PipelineStage`]s in order and never goes back:
//!
//! 1. **CollectingListings**: one listing page per section, sequentially
//! 2. **Deduplicating**: near-duplicates dropped across all sections, first seen wins
//! 3. **EnrichingDetails**: detail pages fetched with bounded concurrency
//! 4. **Assembling**: articles grouped by section in first-seen order
//!
//! Failures degrade instead of aborting: a listing page that cannot be
//! fetched gives its section zero entries, and a detail page that cannot be
//! fetched (or whose strategy panics) leaves that article with listing
//! fields only.

use crate::config::{CollectionConfig, PipelineSettings, SectionConfig};
use crate::dedup::Deduplicator;
use crate::extract::ExtractorRegistry;
use crate::fetch::{PageFetcher, PageRequest, fetch_document};
use crate::journal::RunJournal;
use crate::listing::{collect_listing, naver::discover_sections};
use crate::models::{AggregatedArticle, ArticleDetail, Digest, DigestSection, ListingEntry, SectionOutcome};
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use futures::FutureExt;
use futures::stream::{self, StreamExt};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineStage {
    CollectingListings,
    Deduplicating,
    EnrichingDetails,
    Assembling,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::CollectingListings => "collecting listings",
            PipelineStage::Deduplicating => "deduplicating",
            PipelineStage::EnrichingDetails => "enriching details",
            PipelineStage::Assembling => "assembling",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

fn enter(stage: PipelineStage, collection: &str) {
    info!(collection, %stage, "Pipeline stage");
}

/// Run every stage for `collection` and return the assembled digest.
///
/// Never fails: the digest is produced even when nothing was collected.
#[instrument(level = "info", skip_all, fields(collection = %collection.key, %date))]
pub async fn run_collection<F: PageFetcher>(
    fetcher: &F,
    registry: &ExtractorRegistry,
    collection: &CollectionConfig,
    settings: &PipelineSettings,
    date: NaiveDate,
    journal: &RunJournal,
) -> Digest {
    let key = collection.key.as_str();
    journal.note(format!("[{key}] Collecting {}", collection.title));

    enter(PipelineStage::CollectingListings, key);
    let sections = resolve_sections(fetcher, collection, settings, journal).await;
    let compact_date = date.format("%Y%m%d").to_string();
    let mut outcomes = Vec::with_capacity(sections.len());
    let mut listed: Vec<Vec<ListingEntry>> = Vec::with_capacity(sections.len());

    for section in &sections {
        let url = section.resolved_url(&compact_date);
        match collect_listing(fetcher, collection.kind, &section.name, &url, settings).await {
            Ok(entries) => {
                journal.note(format!("[{key}] {}: {} entries", section.name, entries.len()));
                outcomes.push(SectionOutcome {
                    name: section.name.clone(),
                    listed: true,
                    collected: entries.len(),
                    accepted: 0,
                });
                listed.push(entries);
            }
            Err(e) => {
                warn!(section = %section.name, %url, error = %e, "Listing page failed; section left empty");
                journal.warn(format!(
                    "[{key}] {}: listing failed ({})",
                    section.name,
                    truncate_for_log(&e.to_string(), 200)
                ));
                outcomes.push(SectionOutcome {
                    name: section.name.clone(),
                    listed: false,
                    collected: 0,
                    accepted: 0,
                });
                listed.push(Vec::new());
            }
        }
    }

    enter(PipelineStage::Deduplicating, key);
    let mut dedup = Deduplicator::new(settings.similarity_threshold);
    for (outcome, entries) in outcomes.iter_mut().zip(listed) {
        outcome.accepted = entries.into_iter().map(|e| dedup.offer(e)).filter(|kept| *kept).count();
    }
    let accepted = dedup.into_accepted();
    let collected: usize = outcomes.iter().map(|o| o.collected).sum();
    journal.note(format!(
        "[{key}] {} of {collected} entries kept after deduplication",
        accepted.len()
    ));

    enter(PipelineStage::EnrichingDetails, key);
    let articles = enrich_all(fetcher, registry, accepted, settings).await;

    enter(PipelineStage::Assembling, key);
    let digest = Digest {
        date: date.format("%Y-%m-%d").to_string(),
        title: collection.title.clone(),
        configured_sections: sections.into_iter().map(|s| s.name).collect(),
        sections: group_by_section(articles),
        outcomes,
    };

    enter(PipelineStage::Done, key);
    journal.note(format!(
        "[{key}] {} articles in {} sections",
        digest.article_count(),
        digest.sections.len()
    ));
    digest
}

/// Sections to collect: discovered from the collection's navigation page
/// when configured, otherwise (or when discovery finds nothing) the static list.
async fn resolve_sections<F: PageFetcher>(
    fetcher: &F,
    collection: &CollectionConfig,
    settings: &PipelineSettings,
    journal: &RunJournal,
) -> Vec<SectionConfig> {
    let Some(nav_url) = collection.discover_from.as_deref() else {
        return collection.sections.clone();
    };

    match discover_sections(fetcher, nav_url, settings.listing_delay).await {
        Ok(found) if !found.is_empty() => {
            journal.note(format!("[{}] Discovered {} sections", collection.key, found.len()));
            found
        }
        Ok(_) => {
            journal.warn(format!("[{}] No sections discovered; using configured list", collection.key));
            collection.sections.clone()
        }
        Err(e) => {
            warn!(%nav_url, error = %e, "Section discovery failed");
            journal.warn(format!("[{}] Section discovery failed ({e}); using configured list", collection.key));
            collection.sections.clone()
        }
    }
}

/// Enrich every entry, at most `max_concurrent_details` at a time, and return
/// the articles in the order of `entries`.
async fn enrich_all<F: PageFetcher>(
    fetcher: &F,
    registry: &ExtractorRegistry,
    entries: Vec<ListingEntry>,
    settings: &PipelineSettings,
) -> Vec<AggregatedArticle> {
    let mut results: Vec<(usize, AggregatedArticle)> = stream::iter(entries.into_iter().enumerate())
        .map(|(i, entry)| async move {
            let detail = AssertUnwindSafe(enrich_entry(fetcher, registry, &entry, settings))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    warn!(index = i, url = %entry.url, "Detail extraction panicked; keeping listing fields");
                    ArticleDetail::default()
                });
            (i, AggregatedArticle { entry, detail })
        })
        .buffer_unordered(settings.max_concurrent_details.max(1))
        .collect()
        .await;

    results.sort_by_key(|(i, _)| *i);
    results.into_iter().map(|(_, article)| article).collect()
}

/// Detail for one entry. Tries the mirror when the primary page gave no body.
async fn enrich_entry<F: PageFetcher>(
    fetcher: &F,
    registry: &ExtractorRegistry,
    entry: &ListingEntry,
    settings: &PipelineSettings,
) -> ArticleDetail {
    let mut detail = fetch_detail(fetcher, registry, &entry.url, settings).await;

    if detail.body.is_some() {
        return detail;
    }
    if let Some(mirror) = entry.mirror_url.as_deref().filter(|m| *m != entry.url) {
        debug!(url = %entry.url, %mirror, "No body; trying mirror");
        let fallback = fetch_detail(fetcher, registry, mirror, settings).await;
        detail.fill_missing(fallback);
    }
    detail
}

async fn fetch_detail<F: PageFetcher>(
    fetcher: &F,
    registry: &ExtractorRegistry,
    url: &str,
    settings: &PipelineSettings,
) -> ArticleDetail {
    if url.is_empty() || registry.dispatch(url).is_none() {
        return ArticleDetail::default();
    }
    match fetch_document(fetcher, PageRequest::new(url, settings.detail_delay)).await {
        Ok(document) => {
            panic::catch_unwind(AssertUnwindSafe(|| registry.extract(url, &document, settings.body_cap)))
                .unwrap_or_else(|_| {
                    warn!(%url, "Extraction panicked; treating page as empty");
                    ArticleDetail::default()
                })
        }
        Err(e) => {
            warn!(%url, error = %e, "Detail page failed");
            ArticleDetail::default()
        }
    }
}

/// Group by section name in first-seen order, keeping order within sections.
fn group_by_section(articles: Vec<AggregatedArticle>) -> Vec<DigestSection> {
    let mut sections: Vec<DigestSection> = Vec::new();
    for article in articles {
        match sections.iter_mut().find(|s| s.name == article.entry.section) {
            Some(section) => section.articles.push(article),
            None => sections.push(DigestSection {
                name: article.entry.section.clone(),
                articles: vec![article],
            }),
        }
    }
    sections
}
