//! Inventory API client.
//!
//! Stash tabs are fetched one at a time. Every successful response reports
//! how much of each rate-limit window is used; when a window is close to
//! full the client sleeps for that window before its next request.

use super::converter::{DataConverter, LeaguesResponse, StashItemsResponse, StashesResponse};
use super::rate_limit::{pacing_delay, parse_rate_limits, retry_after};
use super::{HttpResponse, HttpTransport, RawInventoryItem, Session};
use crate::catalog::Catalog;
use crate::config::{PacingConfig, RateLimitPolicy};
use crate::error::{Error, Result};
use crate::pricing::ClassifiedItem;
use crate::state::{League, StashTab, flatten_tabs};
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What happened to one tab during a fetch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabStatus {
    Fetched { items: usize },
    /// Tab type is excluded from fetching.
    Skipped,
    NotFound,
    /// Gave up on the tab after waiting out a 429.
    RateLimited { retry_after_secs: u64 },
    Failed { status: Option<u16>, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabOutcome {
    pub tab_id: String,
    pub tab_name: String,
    pub status: TabStatus,
}

/// Result of a fetch run. Items from tabs that succeeded are kept even
/// when other tabs failed or the run was cancelled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchReport {
    pub items: Vec<ClassifiedItem>,
    pub outcomes: Vec<TabOutcome>,
    /// Modifier signatures the catalog did not recognise.
    pub classification_gaps: Vec<String>,
    pub cancelled: bool,
}

impl FetchReport {
    pub fn fetched_tabs(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, TabStatus::Fetched { .. } | TabStatus::NotFound))
            .count()
    }

    pub fn failed_tabs(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    TabStatus::Failed { .. } | TabStatus::RateLimited { .. }
                )
            })
            .count()
    }

    /// One-line description for the status bar.
    pub fn summary(&self) -> String {
        let mut text = format!(
            "{} items from {} tabs",
            self.items.len(),
            self.fetched_tabs()
        );
        if self.failed_tabs() > 0 {
            text.push_str(&format!(", {} tabs failed", self.failed_tabs()));
        }
        if !self.classification_gaps.is_empty() {
            text.push_str(&format!(
                ", {} unrecognised",
                self.classification_gaps.len()
            ));
        }
        if self.cancelled {
            text.push_str(" (cancelled)");
        }
        text
    }
}

/// Outcome of requesting a single tab.
struct TabFetch {
    status: TabStatus,
    items: Vec<RawInventoryItem>,
    pacing: Option<Duration>,
}

/// Client for leagues, stash tabs and stash contents.
pub struct InventoryClient {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
    pacing: PacingConfig,
    catalog: Arc<Catalog>,
}

impl InventoryClient {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: &str, pacing: PacingConfig) -> Result<Self> {
        Ok(Self {
            transport,
            base_url: Url::parse(base_url)?,
            pacing,
            catalog: Arc::new(Catalog::builtin().clone()),
        })
    }

    /// Use a different compass table.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// List the available leagues.
    pub async fn fetch_leagues(&self, session: &Session) -> Result<Vec<League>> {
        let url = self.endpoint(&["league"])?;
        let response = self.get_checked(url, session).await?;
        let leagues: LeaguesResponse = response.json()?;

        Ok(leagues
            .leagues
            .into_iter()
            .map(DataConverter::convert_league)
            .collect())
    }

    /// List the stash tabs of `league`, folders flattened into their children.
    pub async fn fetch_tabs(&self, session: &Session, league: &str) -> Result<Vec<StashTab>> {
        validate_league(league)?;
        let url = self.endpoint(&["stash", league])?;
        let response = self.get_checked(url, session).await?;
        let stashes: StashesResponse = response.json()?;

        let tabs: Vec<StashTab> = stashes
            .stashes
            .into_iter()
            .map(DataConverter::convert_stash_tab)
            .collect();
        Ok(flatten_tabs(&tabs))
    }

    /// Fetch and classify the tradeable items in `tabs`, one tab at a time.
    ///
    /// Per-tab failures are recorded in the report and do not stop the run.
    /// Errors are returned only for bad input, before any request is made.
    pub async fn fetch_items(
        &self,
        session: &Session,
        league: &str,
        tabs: &[StashTab],
        cancel: &CancellationToken,
    ) -> Result<FetchReport> {
        validate_league(league)?;
        for tab in tabs {
            validate_tab_id(&tab.id)?;
        }

        let mut report = FetchReport::default();
        let mut pending: Option<Duration> = None;

        for tab in tabs {
            if self.pacing.excluded_tab_kinds.iter().any(|k| k == &tab.kind) {
                debug!(tab = %tab.name, kind = %tab.kind, "skipping excluded tab type");
                report.outcomes.push(outcome(tab, TabStatus::Skipped));
                continue;
            }

            if let Some(delay) = pending.take() {
                warn!(
                    delay_secs = delay.as_secs(),
                    next_tab = %tab.name,
                    "near rate limit, pausing before next request"
                );
                if !pause(delay, cancel).await {
                    report.cancelled = true;
                    break;
                }
            }
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let Some(fetch) = self.fetch_tab(session, league, tab, cancel).await else {
                report.cancelled = true;
                break;
            };

            self.classify_into(&mut report, tab, fetch.items);
            report.outcomes.push(outcome(tab, fetch.status));
            pending = fetch.pacing;
        }

        info!(summary = %report.summary(), "fetch run finished");
        Ok(report)
    }

    /// Request one tab, handling 429 per the configured policy.
    /// Returns `None` if cancelled.
    async fn fetch_tab(
        &self,
        session: &Session,
        league: &str,
        tab: &StashTab,
        cancel: &CancellationToken,
    ) -> Option<TabFetch> {
        let url = match self.endpoint(&["stash", league, &tab.id]) {
            Ok(url) => url,
            Err(e) => return Some(failed(None, e.to_string())),
        };
        let mut retried = false;

        loop {
            let request = self
                .transport
                .get(url.clone(), Some(session.access_token().to_string()));
            let response = tokio::select! {
                _ = cancel.cancelled() => return None,
                response = request => response,
            };

            let response = match response {
                Ok(response) => response,
                Err(e) => {
                    warn!(tab = %tab.name, error = %e, "request failed");
                    return Some(failed(None, e.to_string()));
                }
            };

            match response.status {
                429 => {
                    let wait = retry_after(&response).unwrap_or(self.pacing.default_retry_after_secs);
                    warn!(tab = %tab.name, retry_after_secs = wait, "rate limited");
                    if !pause(Duration::from_secs(wait), cancel).await {
                        return None;
                    }
                    if self.pacing.rate_limit_policy == RateLimitPolicy::RetryOnce && !retried {
                        retried = true;
                        continue;
                    }
                    return Some(TabFetch {
                        status: TabStatus::RateLimited {
                            retry_after_secs: wait,
                        },
                        items: Vec::new(),
                        pacing: None,
                    });
                }
                404 => {
                    info!(tab = %tab.name, "stash tab not found");
                    return Some(TabFetch {
                        status: TabStatus::NotFound,
                        items: Vec::new(),
                        pacing: None,
                    });
                }
                _ if response.is_success() => return Some(self.read_tab(tab, &response)),
                status => {
                    warn!(tab = %tab.name, status, "upstream error fetching tab");
                    return Some(failed(Some(status), response.body_snippet()));
                }
            }
        }
    }

    fn read_tab(&self, tab: &StashTab, response: &HttpResponse) -> TabFetch {
        let pacing = match parse_rate_limits(response) {
            Ok(states) => pacing_delay(&states, self.pacing.safety_margin),
            Err(e) => {
                warn!(tab = %tab.name, error = %e, "ignoring unreadable rate limit headers");
                None
            }
        };

        match response.json::<StashItemsResponse>() {
            Ok(body) => {
                let items = body.stash.items;
                info!(tab = %tab.name, items = items.len(), "fetched stash tab");
                TabFetch {
                    status: TabStatus::Fetched { items: items.len() },
                    items,
                    pacing,
                }
            }
            Err(e) => {
                warn!(tab = %tab.name, error = %e, "could not decode stash contents");
                TabFetch {
                    pacing,
                    ..failed(Some(response.status), e.to_string())
                }
            }
        }
    }

    fn classify_into(&self, report: &mut FetchReport, tab: &StashTab, items: Vec<RawInventoryItem>) {
        for item in items
            .into_iter()
            .filter(|i| i.type_line == self.pacing.tradeable_type_line)
        {
            match self.catalog.classify(&item.enchant_mods) {
                Some(name) => report.items.push(ClassifiedItem::new(name, item.icon)),
                None => {
                    let signature = Catalog::signature(&item.enchant_mods);
                    warn!(tab = %tab.name, %signature, "unrecognised compass modifiers, item skipped");
                    report.classification_gaps.push(signature);
                }
            }
        }
    }

    async fn get_checked(&self, url: Url, session: &Session) -> Result<HttpResponse> {
        let response = self
            .transport
            .get(url, Some(session.access_token().to_string()))
            .await?;
        check_status(response, self.pacing.default_retry_after_secs)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config(format!("{} cannot be used as a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Map a non-2xx response to the error taxonomy.
pub(crate) fn check_status(response: HttpResponse, default_retry_after_secs: u64) -> Result<HttpResponse> {
    match response.status {
        _ if response.is_success() => Ok(response),
        401 | 403 => Err(Error::auth(format!(
            "request rejected with status {}",
            response.status
        ))),
        404 => Err(Error::not_found("resource not found")),
        429 => Err(Error::RateLimited {
            retry_after_secs: retry_after(&response).unwrap_or(default_retry_after_secs),
        }),
        status => Err(Error::upstream(status, response.body_snippet())),
    }
}

async fn pause(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}

fn outcome(tab: &StashTab, status: TabStatus) -> TabOutcome {
    TabOutcome {
        tab_id: tab.id.clone(),
        tab_name: tab.name.clone(),
        status,
    }
}

fn failed(status: Option<u16>, message: String) -> TabFetch {
    TabFetch {
        status: TabStatus::Failed { status, message },
        items: Vec::new(),
        pacing: None,
    }
}

fn validate_league(league: &str) -> Result<()> {
    if league.trim().is_empty() {
        return Err(Error::validation("league must not be empty"));
    }
    Ok(())
}

fn validate_tab_id(id: &str) -> Result<()> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::validation(format!("invalid stash tab id '{id}'")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockHttpTransport;
    use pretty_assertions::assert_eq;

    const ALVA: &str = "Your Maps contain Alva";

    fn tab(id: &str, kind: &str) -> StashTab {
        StashTab {
            id: id.to_string(),
            name: format!("Tab {id}"),
            kind: kind.to_string(),
            index: 0,
            colour: "#ffffff".to_string(),
            children: Vec::new(),
        }
    }

    fn items_body(mods: &[&str]) -> String {
        let items: Vec<String> = mods
            .iter()
            .map(|m| {
                format!(
                    r#"{{"typeLine": "Charged Compass", "enchantMods": ["{m}"], "icon": "i"}}"#
                )
            })
            .collect();
        format!(r#"{{"stash": {{"items": [{}]}}}}"#, items.join(","))
    }

    fn client(mock: MockHttpTransport) -> InventoryClient {
        InventoryClient::new(Arc::new(mock), "https://api.example.com", PacingConfig::default())
            .unwrap()
            .with_catalog(Catalog::from_pairs(&[(ALVA, "Alva")]))
    }

    fn session() -> Session {
        Session::new("user", "token").unwrap()
    }

    #[tokio::test]
    async fn test_map_stash_is_never_requested() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .withf(|url, _| url.path() == "/stash/Standard/a1")
            .times(1)
            .returning(|_, _| Ok(HttpResponse::new(200).with_body(items_body(&[ALVA]))));

        let report = client(mock)
            .fetch_items(
                &session(),
                "Standard",
                &[tab("a1", "CurrencyStash"), tab("m1", "MapStash")],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.items, vec![ClassifiedItem::new("Alva", "i")]);
        assert_eq!(report.outcomes[1].status, TabStatus::Skipped);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_run() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get().times(3).returning(|url, _| {
            Ok(match url.path() {
                "/stash/Standard/a1" => HttpResponse::new(200).with_body(items_body(&[ALVA, ALVA])),
                "/stash/Standard/b2" => HttpResponse::new(500).with_body("boom"),
                _ => HttpResponse::new(404),
            })
        });

        let report = client(mock)
            .fetch_items(
                &session(),
                "Standard",
                &[tab("a1", "NormalStash"), tab("b2", "NormalStash"), tab("c3", "NormalStash")],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.items.len(), 2);
        assert_eq!(
            report.outcomes[1].status,
            TabStatus::Failed {
                status: Some(500),
                message: "boom".to_string()
            }
        );
        assert_eq!(report.outcomes[2].status, TabStatus::NotFound);
        assert_eq!(report.failed_tabs(), 1);
    }

    #[tokio::test]
    async fn test_unknown_modifiers_are_reported_not_guessed() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get().returning(|_, _| {
            Ok(HttpResponse::new(200).with_body(
                r#"{"stash": {"items": [
                    {"typeLine": "Charged Compass", "enchantMods": ["Brand new modifier"], "icon": "i"},
                    {"typeLine": "Chaos Orb", "enchantMods": ["Your Maps contain Alva"], "icon": "i"}
                ]}}"#,
            ))
        });

        let report = client(mock)
            .fetch_items(&session(), "Standard", &[tab("a1", "NormalStash")], &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.items.is_empty());
        assert_eq!(report.classification_gaps, vec!["Brand new modifier".to_string()]);
    }

    #[tokio::test]
    async fn test_bad_input_fails_before_any_request() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get().times(0);
        let client = client(mock);

        let result = client
            .fetch_items(&session(), "Standard", &[tab("../x", "NormalStash")], &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = client
            .fetch_items(&session(), " ", &[tab("a1", "NormalStash")], &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_fetch_tabs_flattens_folders() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .withf(|url, bearer| url.path() == "/stash/Some%20League" && bearer.as_deref() == Some("token"))
            .returning(|_, _| {
                Ok(HttpResponse::new(200).with_body(
                    r#"{"stashes": [
                        {"id": "a1", "name": "A", "type": "NormalStash", "index": 0, "metadata": {"colour": "ff"}},
                        {"id": "f1", "name": "F", "type": "Folder", "index": 1, "metadata": {"colour": "0"},
                         "children": [{"id": "b2", "name": "B", "type": "QuadStash", "index": 2, "metadata": {"colour": "1"}}]}
                    ]}"#,
                ))
            });

        let tabs = client(mock).fetch_tabs(&session(), "Some League").await.unwrap();
        let ids: Vec<&str> = tabs.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b2"]);
        assert_eq!(tabs[0].colour, "#0000ff");
    }

    #[tokio::test]
    async fn test_fetch_leagues_maps_status_errors() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .times(1)
            .returning(|_, _| Ok(HttpResponse::new(429).with_header("Retry-After", "7")));
        let result = client(mock).fetch_leagues(&session()).await;
        assert!(matches!(result, Err(Error::RateLimited { retry_after_secs: 7 })));

        let mut mock = MockHttpTransport::new();
        mock.expect_get()
            .returning(|_, _| Ok(HttpResponse::new(401)));
        assert!(matches!(client(mock).fetch_leagues(&session()).await, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_keeps_empty_report() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get().times(0);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = client(mock)
            .fetch_items(&session(), "Standard", &[tab("a1", "NormalStash")], &cancel)
            .await
            .unwrap();
        assert!(report.cancelled);
        assert!(report.outcomes.is_empty());
    }
}
