//! Configuration settings for compass-trader.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `COMPASS_TRADER_TRADE__DISPLAY_NAME`.
const ENV_PREFIX: &str = "COMPASS_TRADER";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API configuration.
    pub api: ApiConfig,
    /// Request pacing against the inventory API.
    pub pacing: PacingConfig,
    /// Price feed configuration.
    pub feed: FeedConfig,
    /// Trade listing settings.
    pub trade: TradeConfig,
    /// UI configuration.
    pub ui: UiConfig,
    /// Key bindings.
    pub keybindings: KeyBindings,
}

impl Config {
    /// Load configuration from file, returning default if file doesn't exist.
    pub fn load_or_default() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration from file, layered with environment overrides.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(default_path);

        let mut config: Self = config::Config::builder()
            .add_source(config::File::from(config_path.as_path()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .and_then(|layered| layered.try_deserialize())
            .map_err(|e| crate::Error::config(e.to_string()))?;

        config.apply_env_credentials();
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<()> {
        let config_path = path.unwrap_or_else(default_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Return the configured user id, generating and storing one on first use.
    pub fn ensure_user_id(&mut self) -> String {
        self.api
            .user_id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone()
    }

    /// The OAuth credentials use the same variable names the PoE developer docs suggest.
    fn apply_env_credentials(&mut self) {
        if let Ok(token) = std::env::var("POE_ACCESS_TOKEN") {
            self.api.access_token = Some(token);
        }
        if let Ok(client_id) = std::env::var("POE_CLIENT_ID") {
            self.api.client_id = client_id;
        }
        if let Ok(email) = std::env::var("POE_CONTACT_EMAIL") {
            self.api.contact_email = email;
        }
    }
}

fn default_path() -> PathBuf {
    super::config_dir()
        .map(|p| p.join("config.toml"))
        .unwrap_or_else(|_| Path::new("config.toml").to_path_buf())
}

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Inventory API base URL.
    pub inventory_base_url: String,
    /// Price feed URL (GitHub contents endpoint).
    pub price_feed_url: String,
    /// OAuth bearer token for the inventory API.
    pub access_token: Option<String>,
    /// OAuth client id, sent in the User-Agent.
    pub client_id: String,
    /// Contact address, sent in the User-Agent.
    pub contact_email: String,
    /// Local user id that owns price overrides.
    pub user_id: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            inventory_base_url: "https://api.pathofexile.com".to_string(),
            price_feed_url: "https://api.github.com/repos/The-Forbidden-Trove/tft-data-prices/contents/lsc/bulk-compasses.json".to_string(),
            access_token: None,
            client_id: "compass-trader".to_string(),
            contact_email: String::new(),
            user_id: None,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// User-Agent in the format the inventory API requires for OAuth clients.
    pub fn user_agent(&self) -> String {
        format!(
            "OAuth {}/{} (contact: {})",
            self.client_id,
            env!("CARGO_PKG_VERSION"),
            self.contact_email
        )
    }
}

/// What to do with a tab after waiting out a 429.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitPolicy {
    /// Skip the tab for this run.
    #[default]
    Abandon,
    /// Re-issue the request once.
    RetryOnce,
}

/// Pacing configuration for the inventory client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause once a rule has this many requests or fewer left in its window.
    pub safety_margin: u32,
    /// Wait used when a 429 carries no Retry-After header.
    pub default_retry_after_secs: u64,
    /// Behaviour after a 429 wait.
    pub rate_limit_policy: RateLimitPolicy,
    /// Tab types that never hold compasses.
    pub excluded_tab_kinds: Vec<String>,
    /// Item type line that is considered tradeable.
    pub tradeable_type_line: String,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            safety_margin: 3,
            default_retry_after_secs: 60,
            rate_limit_policy: RateLimitPolicy::Abandon,
            excluded_tab_kinds: vec!["MapStash".to_string()],
            tradeable_type_line: "Charged Compass".to_string(),
        }
    }
}

/// Price feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// How long a fetched snapshot is served before refreshing.
    pub cache_ttl_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 2 * 60 * 60,
        }
    }
}

/// Trade listing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeConfig {
    /// In-game name shown in the listing.
    pub display_name: Option<String>,
    /// Chaos per divine.
    pub divine_price: Option<Decimal>,
    /// League selected on startup.
    pub league: Option<String>,
    /// First segment of the listing header.
    pub listing_title: String,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            display_name: None,
            divine_price: None,
            league: None,
            listing_title: "WTS Softcore Compasses".to_string(),
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Tick rate in milliseconds for UI updates.
    pub tick_rate_ms: u64,
    /// Enable mouse support.
    pub mouse_support: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            mouse_support: true,
        }
    }
}

/// Key bindings configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub quit: String,
    pub help: String,
    pub up: String,
    pub down: String,
    /// Toggle the highlighted tab or row.
    pub select: String,
    /// Reload leagues and tabs.
    pub refresh: String,
    /// Fetch and price the selected tabs.
    pub fetch: String,
    /// Abort a running fetch.
    pub cancel_fetch: String,
    pub tabs_view: String,
    pub items_view: String,
    pub listing_view: String,
    pub search: String,
    pub command: String,
    /// Edit the custom price of the highlighted row.
    pub edit_value: String,
    /// Edit the quantity of the highlighted row.
    pub edit_quantity: String,
    /// Remove the custom price of the highlighted row.
    pub clear_value: String,
    pub sort_name: String,
    pub sort_quantity: String,
    pub sort_price: String,
    pub sort_total: String,
    /// Generate the trade listing.
    pub generate_listing: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "?".to_string(),
            up: "k".to_string(),
            down: "j".to_string(),
            select: "Enter".to_string(),
            refresh: "r".to_string(),
            fetch: "f".to_string(),
            cancel_fetch: "Ctrl+c".to_string(),
            tabs_view: "1".to_string(),
            items_view: "2".to_string(),
            listing_view: "3".to_string(),
            search: "/".to_string(),
            command: ":".to_string(),
            edit_value: "e".to_string(),
            edit_quantity: "u".to_string(),
            clear_value: "x".to_string(),
            sort_name: "a".to_string(),
            sort_quantity: "n".to_string(),
            sort_price: "p".to_string(),
            sort_total: "t".to_string(),
            generate_listing: "g".to_string(),
        }
    }
}
