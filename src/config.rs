//! Digest configuration: collections, sections, caps and politeness delays.
//!
//! The built-in [`DigestConfig::default`] describes the four collections the
//! tool produces every day. A YAML file passed with `--config` replaces any
//! subset of the fields; missing fields keep their defaults.
//!
//! ```yaml
//! summary_cap: 70
//! similarity_threshold: 0.8
//! collections:
//!   - key: headlines
//!     title: 헤드라인 모음
//!     file_stem: 헤드라인_모음
//!     kind: headline
//!     sections:
//!       - name: 경제
//!         url: https://news.naver.com/section/101
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;
use tracing::{info, instrument};

/// Which listing layout a collection's pages use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    /// Naver section front page, headline cluster block.
    Headline,
    /// Naver subsection page, "latest articles" block.
    Latest,
    /// Naver per-press editorial list.
    Editorial,
    /// finviz.com market news table.
    Finviz,
}

/// Field labels used by the text digest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSet {
    #[default]
    Korean,
    English,
}

/// A named listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionConfig {
    pub name: String,
    /// Listing URL. `{date}` is replaced with the run date as `YYYYMMDD`.
    pub url: String,
}

impl SectionConfig {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    /// Listing URL with the `{date}` placeholder filled in.
    pub fn resolved_url(&self, compact_date: &str) -> String {
        self.url.replace("{date}", compact_date)
    }
}

/// One output document and the listing pages that feed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Short identifier, also the output subdirectory.
    pub key: String,
    /// Title printed in the digest header.
    pub title: String,
    /// File name stem, the file is `{date}_{file_stem}.txt`.
    pub file_stem: String,
    pub kind: ListingKind,
    #[serde(default)]
    pub labels: LabelSet,
    /// Page whose sub-navigation lists the sections to collect. When
    /// discovery fails the static `sections` are used instead.
    #[serde(default)]
    pub discover_from: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionConfig>,
    #[serde(default)]
    pub summary_cap: Option<usize>,
    #[serde(default)]
    pub body_cap: Option<usize>,
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Character budget for listing ledes.
    pub summary_cap: usize,
    /// Character budget for detail bodies.
    pub body_cap: usize,
    /// Titles whose similarity ratio exceeds this are duplicates.
    pub similarity_threshold: f64,
    /// Minimum gap between two listing requests to the same host.
    pub listing_delay_ms: u64,
    /// Minimum gap between two detail requests to the same host.
    pub detail_delay_ms: u64,
    pub max_items_per_listing: usize,
    pub max_concurrent_details: usize,
    /// Connect/read timeout for every request.
    pub timeout_secs: u64,
    /// Extra attempts after a failed fetch.
    pub fetch_retries: usize,
    pub connectivity_probe_url: String,
    pub connectivity_attempts: usize,
    pub connectivity_interval_secs: u64,
    pub collections: Vec<CollectionConfig>,
}

/// Knobs the aggregation pipeline needs for one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub summary_cap: usize,
    pub body_cap: usize,
    pub similarity_threshold: f64,
    pub listing_delay: Duration,
    pub detail_delay: Duration,
    pub max_items_per_listing: usize,
    pub max_concurrent_details: usize,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            summary_cap: 70,
            body_cap: 300,
            similarity_threshold: 0.8,
            listing_delay_ms: 1000,
            detail_delay_ms: 500,
            max_items_per_listing: 50,
            max_concurrent_details: 4,
            timeout_secs: 10,
            fetch_retries: 2,
            connectivity_probe_url: "https://www.google.com".to_string(),
            connectivity_attempts: 5,
            connectivity_interval_secs: 5,
            collections: default_collections(),
        }
    }
}

impl DigestConfig {
    /// Resolve the per-collection overrides against the global values.
    pub fn settings_for(&self, collection: &CollectionConfig) -> PipelineSettings {
        PipelineSettings {
            summary_cap: collection.summary_cap.unwrap_or(self.summary_cap),
            body_cap: collection.body_cap.unwrap_or(self.body_cap),
            similarity_threshold: self.similarity_threshold,
            listing_delay: Duration::from_millis(self.listing_delay_ms),
            detail_delay: Duration::from_millis(self.detail_delay_ms),
            max_items_per_listing: self.max_items_per_listing,
            max_concurrent_details: self.max_concurrent_details.max(1),
        }
    }

    /// Reject values that would make the pipeline misbehave.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(format!(
                "similarity_threshold must be within 0.0..=1.0, got {}",
                self.similarity_threshold
            )
            .into());
        }
        if self.max_items_per_listing == 0 {
            return Err("max_items_per_listing must be at least 1".into());
        }
        for collection in &self.collections {
            if collection.sections.is_empty() && collection.discover_from.is_none() {
                return Err(format!("collection `{}` has no sections", collection.key).into());
            }
        }
        Ok(())
    }
}

/// Load the configuration from `path`, or the built-in default when `None`.
#[instrument(level = "info")]
pub fn load_config(path: Option<&str>) -> Result<DigestConfig, Box<dyn Error>> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            let config: DigestConfig = serde_yaml::from_str(&raw)?;
            info!(path, collections = config.collections.len(), "Loaded configuration file");
            config
        }
        None => DigestConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn default_collections() -> Vec<CollectionConfig> {
    vec![
        CollectionConfig {
            key: "headlines".to_string(),
            title: "헤드라인 모음".to_string(),
            file_stem: "헤드라인_모음".to_string(),
            kind: ListingKind::Headline,
            labels: LabelSet::Korean,
            discover_from: None,
            sections: vec![
                SectionConfig::new("경제", "https://news.naver.com/section/101"),
                SectionConfig::new("IT/과학", "https://news.naver.com/section/105"),
                SectionConfig::new("세계", "https://news.naver.com/section/104"),
                SectionConfig::new("정치", "https://news.naver.com/section/100"),
                SectionConfig::new("사회", "https://news.naver.com/section/102"),
                SectionConfig::new("생활/문화", "https://news.naver.com/section/103"),
            ],
            summary_cap: None,
            body_cap: None,
        },
        CollectionConfig {
            key: "economics".to_string(),
            title: "경제 영역별 뉴스 모음".to_string(),
            file_stem: "경제_영역별_뉴스_모음".to_string(),
            kind: ListingKind::Latest,
            labels: LabelSet::Korean,
            discover_from: Some("https://news.naver.com/section/101".to_string()),
            sections: vec![
                SectionConfig::new("금융", "https://news.naver.com/breakingnews/section/101/259"),
                SectionConfig::new("증권", "https://news.naver.com/breakingnews/section/101/258"),
                SectionConfig::new("산업/재계", "https://news.naver.com/breakingnews/section/101/261"),
                SectionConfig::new("중기/벤처", "https://news.naver.com/breakingnews/section/101/771"),
                SectionConfig::new("부동산", "https://news.naver.com/breakingnews/section/101/260"),
                SectionConfig::new("글로벌 경제", "https://news.naver.com/breakingnews/section/101/262"),
                SectionConfig::new("생활경제", "https://news.naver.com/breakingnews/section/101/310"),
                SectionConfig::new("경제 일반", "https://news.naver.com/breakingnews/section/101/263"),
            ],
            summary_cap: None,
            body_cap: None,
        },
        CollectionConfig {
            key: "opinions".to_string(),
            title: "사설 모음".to_string(),
            file_stem: "사설_모음".to_string(),
            kind: ListingKind::Editorial,
            labels: LabelSet::Korean,
            discover_from: None,
            sections: [
                ("한국경제", "015"),
                ("서울경제", "011"),
                ("파이낸셜뉴스", "014"),
                ("디지털타임스", "029"),
                ("코리아중앙데일리", "640"),
            ]
            .iter()
            .map(|(press, office_id)| {
                SectionConfig::new(
                    press,
                    &format!("https://news.naver.com/opinion/editorial?officeId={office_id}&date={{date}}"),
                )
            })
            .collect(),
            summary_cap: None,
            body_cap: None,
        },
        CollectionConfig {
            key: "stock_news".to_string(),
            title: "Latest Stock News".to_string(),
            file_stem: "Stock_News".to_string(),
            kind: ListingKind::Finviz,
            labels: LabelSet::English,
            discover_from: None,
            sections: vec![SectionConfig::new("Market News", "https://finviz.com/news.ashx?v=3")],
            summary_cap: None,
            body_cap: None,
        },
    ]
}
