//! Community price feed.
//!
//! The feed is a JSON file in a GitHub repository, served base64-encoded
//! through the contents API. Snapshots are cached for a configurable TTL;
//! when a refresh fails and an older snapshot exists, the older one is
//! served.

use super::converter::{ContentsResponse, DataConverter, PriceFeedDto};
use super::inventory::check_status;
use super::HttpTransport;
use crate::config::PacingConfig;
use crate::error::Result;
use crate::pricing::PriceSnapshot;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone)]
struct CachedSnapshot {
    snapshot: Arc<PriceSnapshot>,
    fetched_at: Instant,
}

/// Fetches and caches [`PriceSnapshot`]s.
pub struct PriceFeedClient {
    transport: Arc<dyn HttpTransport>,
    url: Url,
    ttl: Duration,
    /// Wait reported for a 429 that carries no `Retry-After`.
    default_retry_after_secs: u64,
    cache: RwLock<Option<CachedSnapshot>>,
}

impl PriceFeedClient {
    pub fn new(transport: Arc<dyn HttpTransport>, url: &str, ttl: Duration) -> Result<Self> {
        Ok(Self {
            transport,
            url: Url::parse(url)?,
            ttl,
            default_retry_after_secs: PacingConfig::default().default_retry_after_secs,
            cache: RwLock::new(None),
        })
    }

    pub fn with_retry_after(mut self, default_retry_after_secs: u64) -> Self {
        self.default_retry_after_secs = default_retry_after_secs;
        self
    }

    /// The cached snapshot if still fresh, otherwise a newly fetched one.
    pub async fn snapshot(&self) -> Result<Arc<PriceSnapshot>> {
        if let Some(cached) = self.cache.read().await.as_ref()
            && cached.fetched_at.elapsed() < self.ttl
        {
            return Ok(Arc::clone(&cached.snapshot));
        }
        self.refresh().await
    }

    /// Fetch a new snapshot, falling back to the cached one on failure.
    pub async fn refresh(&self) -> Result<Arc<PriceSnapshot>> {
        match self.fetch().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                info!(entries = snapshot.len(), "price feed refreshed");
                *self.cache.write().await = Some(CachedSnapshot {
                    snapshot: Arc::clone(&snapshot),
                    fetched_at: Instant::now(),
                });
                Ok(snapshot)
            }
            Err(e) => match self.cache.read().await.as_ref() {
                Some(cached) => {
                    warn!(error = %e, "price feed refresh failed, serving stale snapshot");
                    Ok(Arc::clone(&cached.snapshot))
                }
                None => Err(e),
            },
        }
    }

    async fn fetch(&self) -> Result<PriceSnapshot> {
        let response = self.transport.get(self.url.clone(), None).await?;
        let response = check_status(response, self.default_retry_after_secs)?;
        let envelope: ContentsResponse = response.json()?;
        decode_contents(&envelope.content)
    }
}

/// Decode a contents-API payload into a snapshot.
///
/// GitHub wraps the base64 text at 60 columns, so whitespace is removed
/// before decoding.
pub fn decode_contents(content: &str) -> Result<PriceSnapshot> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    let feed: PriceFeedDto = serde_json::from_slice(&bytes)?;

    PriceSnapshot::new(
        feed.timestamp.and_then(DataConverter::convert_timestamp),
        feed.data
            .into_iter()
            .map(DataConverter::convert_price_entry)
            .collect(),
    )
}
