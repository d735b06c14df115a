//! Page fetching: HTTP client, per-host politeness throttle and connectivity probe.
//!
//! Everything that touches the network goes through [`PageFetcher`], so the
//! listing collectors and the pipeline can be driven by an in-memory fetcher
//! in tests.
//!
//! # Politeness
//!
//! Every request names the minimum gap it wants after the previous request
//! to the same host. [`HostThrottle`] reserves send slots per host, so the
//! gap holds even when several detail pages are fetched concurrently.

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER, USER_AGENT};
use scraper::Html;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{Instant, sleep, sleep_until};
use tracing::{debug, info, instrument, warn};
use url::Url;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// One page request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub url: &'a str,
    /// Minimum gap after the previous request to the same host.
    pub min_interval: Duration,
}

impl<'a> PageRequest<'a> {
    pub fn new(url: &'a str, min_interval: Duration) -> Self {
        Self { url, min_interval }
    }
}

/// Something that can turn a URL into page text.
pub trait PageFetcher {
    /// Fetch the page body as text.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx statuses and undecodable bodies.
    async fn fetch_text(&self, request: PageRequest<'_>) -> Result<String, Box<dyn Error>>;
}

/// Fetch a page and parse it into an HTML tree.
pub async fn fetch_document<F: PageFetcher>(
    fetcher: &F,
    request: PageRequest<'_>,
) -> Result<Html, Box<dyn Error>> {
    let body = fetcher.fetch_text(request).await?;
    Ok(Html::parse_document(&body))
}

/// `host` is `domain` itself or one of its subdomains.
pub(crate) fn host_within(host: &str, domain: &str) -> bool {
    host == domain || host.strip_suffix(domain).is_some_and(|rest| rest.ends_with('.'))
}

/// Request headers to send, chosen by target host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderProfile {
    /// Desktop browser headers preferring Korean content.
    Browser,
    /// finviz.com rejects requests without an English locale and a referer.
    Finviz,
}

impl HeaderProfile {
    pub fn for_url(url: &str) -> Self {
        match Url::parse(url) {
            Ok(u) if u.host_str().is_some_and(|h| host_within(h, "finviz.com")) => HeaderProfile::Finviz,
            _ => HeaderProfile::Browser,
        }
    }

    pub fn headers(self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
        match self {
            HeaderProfile::Browser => {
                headers.insert(
                    ACCEPT_LANGUAGE,
                    HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
                );
            }
            HeaderProfile::Finviz => {
                headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
                headers.insert(REFERER, HeaderValue::from_static("https://finviz.com/"));
            }
        }
        headers
    }
}

/// Per-host send-slot reservation.
#[derive(Debug, Default)]
pub struct HostThrottle {
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl HostThrottle {
    /// Wait until `host` may be contacted again, then reserve the following
    /// slot `min_interval` later.
    pub async fn wait(&self, host: &str, min_interval: Duration) {
        let slot = {
            let mut slots = self.next_slot.lock().unwrap_or_else(|p| p.into_inner());
            let now = Instant::now();
            let slot = slots.get(host).copied().filter(|s| *s > now).unwrap_or(now);
            slots.insert(host.to_string(), slot + min_interval);
            slot
        };
        if slot > Instant::now() {
            debug!(host, wait_ms = (slot - Instant::now()).as_millis() as u64, "Politeness delay");
        }
        sleep_until(slot).await;
    }
}

/// [`PageFetcher`] backed by `reqwest`.
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    throttle: HostThrottle,
}

impl HttpFetcher {
    /// Build a client with the given connect/read timeout.
    pub fn new(timeout: Duration) -> Result<Self, Box<dyn Error>> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            throttle: HostThrottle::default(),
        })
    }

    /// Send a HEAD request and report whether anything answered.
    pub async fn probe(&self, url: &str) -> bool {
        self.client
            .head(url)
            .headers(HeaderProfile::Browser.headers())
            .send()
            .await
            .is_ok()
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(url = %request.url))]
    async fn fetch_text(&self, request: PageRequest<'_>) -> Result<String, Box<dyn Error>> {
        let parsed = Url::parse(request.url)?;
        let host = parsed.host_str().ok_or("URL has no host")?.to_string();
        self.throttle.wait(&host, request.min_interval).await;

        let response = self
            .client
            .get(parsed)
            .headers(HeaderProfile::for_url(request.url).headers())
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

/// Probe `probe_url` up to `attempts` times, `interval` apart.
///
/// Returns `false` when every attempt failed; the caller abandons the run.
#[instrument(level = "info", skip(fetcher))]
pub async fn wait_for_connectivity(
    fetcher: &HttpFetcher,
    probe_url: &str,
    attempts: usize,
    interval: Duration,
) -> bool {
    for attempt in 1..=attempts.max(1) {
        if fetcher.probe(probe_url).await {
            info!(attempt, "Connectivity confirmed");
            return true;
        }
        if attempt < attempts {
            warn!(attempt, max = attempts, ?interval, "No connectivity; retrying");
            sleep(interval).await;
        }
    }
    false
}
