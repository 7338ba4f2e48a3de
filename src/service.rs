//! The pricing pipeline: stash contents, feed prices and user overrides
//! merged into priced rows.

use crate::api::{
    FetchReport, InventoryClient, PriceFeedClient, ReqwestTransport, Session,
};
use crate::config::Config;
use crate::error::Result;
use crate::pricing::{Overrides, PriceSnapshot, PricedRows};
use crate::state::{League, StashTab};
use crate::store::{OverrideChange, PreferenceStore};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Output of one pricing run.
#[derive(Debug, Clone)]
pub struct PricingRun {
    pub league: String,
    pub rows: PricedRows,
    pub report: FetchReport,
    /// When the feed snapshot was published.
    pub prices_as_of: Option<DateTime<Utc>>,
    /// Set when no feed snapshot could be had and rows are unpriced.
    pub feed_error: Option<String>,
    /// Set when saved overrides could not be read and feed prices were used.
    pub overrides_error: Option<String>,
}

/// Runs pricing and override edits against the configured backends.
pub struct TradeService {
    inventory: InventoryClient,
    feed: PriceFeedClient,
    preferences: Arc<dyn PreferenceStore>,
}

impl TradeService {
    pub fn new(
        inventory: InventoryClient,
        feed: PriceFeedClient,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            inventory,
            feed,
            preferences,
        }
    }

    /// Build the HTTP clients described by `config`.
    pub fn from_config(config: &Config, preferences: Arc<dyn PreferenceStore>) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.api)?);
        let inventory = InventoryClient::new(
            transport.clone(),
            &config.api.inventory_base_url,
            config.pacing.clone(),
        )?;
        let feed = PriceFeedClient::new(
            transport,
            &config.api.price_feed_url,
            Duration::from_secs(config.feed.cache_ttl_secs),
        )?
        .with_retry_after(config.pacing.default_retry_after_secs);
        Ok(Self::new(inventory, feed, preferences))
    }

    pub async fn leagues(&self, session: &Session) -> Result<Vec<League>> {
        self.inventory.fetch_leagues(session).await
    }

    pub async fn tabs(&self, session: &Session, league: &str) -> Result<Vec<StashTab>> {
        self.inventory.fetch_tabs(session, league).await
    }

    /// Fetch `tabs`, then price what was found.
    ///
    /// A feed outage does not discard the fetched items: rows come back
    /// unpriced with `feed_error` set. Unreadable overrides likewise leave
    /// rows at feed prices with `overrides_error` set.
    pub async fn price_tabs(
        &self,
        session: &Session,
        league: &str,
        tabs: &[StashTab],
        cancel: &CancellationToken,
    ) -> Result<PricingRun> {
        let report = self.inventory.fetch_items(session, league, tabs, cancel).await?;

        let (snapshot, feed_error) = match self.feed.snapshot().await {
            Ok(snapshot) => (snapshot, None),
            Err(e) => {
                warn!(error = %e, "price feed unavailable, rows will be unpriced");
                (Arc::new(PriceSnapshot::empty()), Some(e.to_string()))
            }
        };
        let (overrides, overrides_error) =
            match self.preferences.get_overrides(&session.user_id, league).await {
                Ok(overrides) => (overrides, None),
                Err(e) => {
                    warn!(error = %e, "saved prices unavailable, using feed prices");
                    (Overrides::new(), Some(e.to_string()))
                }
            };

        let rows = PricedRows::aggregate(&report.items, &snapshot, &overrides);
        info!(
            league,
            rows = rows.len(),
            total = %rows.total_value(),
            "pricing run complete"
        );

        Ok(PricingRun {
            league: league.to_string(),
            rows,
            report,
            prices_as_of: snapshot.updated_at(),
            feed_error,
            overrides_error,
        })
    }

    /// Set or clear the user's price for `item` in `league`.
    pub async fn set_override(
        &self,
        session: &Session,
        league: &str,
        item: &str,
        value: Option<Decimal>,
    ) -> Result<OverrideChange> {
        let change = self
            .preferences
            .set_override(&session.user_id, item, league, value)
            .await?;
        info!(item, league, ?change, "override saved");
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HttpResponse, MockHttpTransport};
    use crate::catalog::Catalog;
    use crate::config::PacingConfig;
    use crate::error::Error;
    use crate::store::{MemoryPreferenceStore, MockPreferenceStore};
    use base64::Engine;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const FIRE: &str = "Your Maps are on Fire";

    fn transport(feed_ok: bool) -> Arc<MockHttpTransport> {
        let feed = base64::engine::general_purpose::STANDARD
            .encode(r#"{"timestamp": 1700000000, "data": [{"name": "Fire", "chaos": 10, "divine": 1, "lowConfidence": false, "ratio": 1}]}"#);
        let items = format!(
            r#"{{"stash": {{"items": [{0}, {0}, {0}]}}}}"#,
            format!(r#"{{"typeLine": "Charged Compass", "enchantMods": ["{FIRE}"], "icon": "fire.png"}}"#)
        );

        let mut mock = MockHttpTransport::new();
        mock.expect_get().returning(move |url, _| {
            Ok(if url.host_str() == Some("feed.example.com") {
                if feed_ok {
                    HttpResponse::new(200).with_body(serde_json::json!({ "content": feed }).to_string())
                } else {
                    HttpResponse::new(502)
                }
            } else {
                HttpResponse::new(200).with_body(items.clone())
            })
        });
        Arc::new(mock)
    }

    fn service(feed_ok: bool, preferences: Arc<dyn PreferenceStore>) -> TradeService {
        let transport = transport(feed_ok);
        let inventory = InventoryClient::new(transport.clone(), "https://inv.example.com", PacingConfig::default())
            .unwrap()
            .with_catalog(Catalog::from_pairs(&[(FIRE, "Fire")]));
        let feed = PriceFeedClient::new(transport, "https://feed.example.com/c.json", Duration::from_secs(60)).unwrap();
        TradeService::new(inventory, feed, preferences)
    }

    fn tabs() -> Vec<StashTab> {
        vec![StashTab {
            id: "a1".to_string(),
            name: "Compasses".to_string(),
            kind: "NormalStash".to_string(),
            index: 0,
            colour: "#000000".to_string(),
            children: Vec::new(),
        }]
    }

    fn session() -> Session {
        Session::new("user", "token").unwrap()
    }

    #[tokio::test]
    async fn test_three_fires_price_to_thirty() {
        let service = service(true, Arc::new(MemoryPreferenceStore::new()));
        let run = service
            .price_tabs(&session(), "Standard", &tabs(), &CancellationToken::new())
            .await
            .unwrap();

        let fire = run.rows.get("Fire").unwrap();
        assert_eq!(fire.quantity(), 3);
        assert_eq!(fire.unit_price(), dec!(10));
        assert_eq!(fire.total_value(), dec!(30));
        assert_eq!(run.feed_error, None);
    }

    #[tokio::test]
    async fn test_override_applies_to_next_run() {
        let service = service(true, Arc::new(MemoryPreferenceStore::new()));
        let change = service
            .set_override(&session(), "Standard", "Fire", Some(dec!(5)))
            .await
            .unwrap();
        assert_eq!(change, OverrideChange::Created);

        let run = service
            .price_tabs(&session(), "Standard", &tabs(), &CancellationToken::new())
            .await
            .unwrap();
        let fire = run.rows.get("Fire").unwrap();
        assert_eq!(fire.custom_price(), Some(dec!(5)));
        assert_eq!(fire.total_value(), dec!(15));
    }

    #[tokio::test]
    async fn test_feed_outage_keeps_items_unpriced() {
        let service = service(false, Arc::new(MemoryPreferenceStore::new()));
        let run = service
            .price_tabs(&session(), "Standard", &tabs(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(run.rows.get("Fire").unwrap().quantity(), 3);
        assert_eq!(run.rows.total_value(), Decimal::ZERO);
        assert!(run.feed_error.is_some());
    }

    #[tokio::test]
    async fn test_overrides_are_read_for_session_user_and_league() {
        let mut preferences = MockPreferenceStore::new();
        preferences
            .expect_get_overrides()
            .withf(|user, league| user == "user" && league == "Standard")
            .times(1)
            .returning(|_, _| Ok(Default::default()));

        let service = service(true, Arc::new(preferences));
        service
            .price_tabs(&session(), "Standard", &tabs(), &CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_clearing_a_price_that_was_never_set_is_unchanged() {
        let service = service(true, Arc::new(MemoryPreferenceStore::new()));
        let change = service
            .set_override(&session(), "Standard", "Fire", None)
            .await
            .unwrap();
        assert_eq!(change, OverrideChange::Unchanged);
        assert!(!change.is_change());
    }

    #[tokio::test]
    async fn test_clearing_a_saved_price_reports_deletion() {
        let service = service(true, Arc::new(MemoryPreferenceStore::new()));
        service
            .set_override(&session(), "Standard", "Fire", Some(dec!(5)))
            .await
            .unwrap();
        let change = service
            .set_override(&session(), "Standard", "Fire", None)
            .await
            .unwrap();
        assert_eq!(change, OverrideChange::Deleted);
    }

    #[tokio::test]
    async fn test_unreadable_overrides_keep_feed_prices() {
        let mut preferences = MockPreferenceStore::new();
        preferences
            .expect_get_overrides()
            .returning(|_, _| Err(Error::Io(std::io::Error::other("preferences file is corrupt"))));

        let service = service(true, Arc::new(preferences));
        let run = service
            .price_tabs(&session(), "Standard", &tabs(), &CancellationToken::new())
            .await
            .unwrap();

        let fire = run.rows.get("Fire").unwrap();
        assert_eq!(fire.quantity(), 3);
        assert_eq!(fire.total_value(), dec!(30));
        assert_eq!(run.feed_error, None);
        assert!(run.overrides_error.unwrap().contains("corrupt"));
    }
}
