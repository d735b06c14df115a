//! Retry decorator for page fetches with exponential backoff and jitter.
//!
//! [`RetryFetch`] wraps any [`PageFetcher`] and retries failed fetches.
//! Client errors (4xx) are returned immediately: the page is gone or
//! forbidden, and asking again only adds load on the source.
//!
//! # Retry Strategy
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```

use crate::fetch::{PageFetcher, PageRequest};
use rand::{Rng, rng};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Wrapper that adds exponential backoff retry logic to a [`PageFetcher`].
pub struct RetryFetch<T> {
    /// The underlying fetcher.
    inner: T,
    /// Attempts after the first one before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: Duration,
    /// Upper bound on a single backoff delay.
    max_delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: PageFetcher,
{
    /// Wrap `inner`, retrying up to `max_retries` times.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let fetcher = RetryFetch::new(HttpFetcher::new(Duration::from_secs(10))?, 2, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

/// A 4xx response will not change on retry.
fn is_retryable(e: &(dyn Error + 'static)) -> bool {
    match e.downcast_ref::<reqwest::Error>() {
        Some(re) => !re.status().is_some_and(|s| s.is_client_error()),
        None => true,
    }
}

impl<T> PageFetcher for RetryFetch<T>
where
    T: PageFetcher,
{
    #[instrument(level = "debug", skip_all, fields(url = %request.url))]
    async fn fetch_text(&self, request: PageRequest<'_>) -> Result<String, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch_text(request).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries || !is_retryable(e.as_ref()) {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "fetch gave up"
                        );
                        return Err(e);
                    }

                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1).min(16));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
