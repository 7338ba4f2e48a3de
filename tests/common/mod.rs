//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use compass_trader::Result;
use compass_trader::api::{HttpResponse, HttpTransport, Session};
use compass_trader::catalog::Catalog;
use compass_trader::state::StashTab;
use reqwest::Url;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

pub const FIRE: &str = "Your Maps are on Fire";
pub const ALVA: &str = "Your Maps contain Alva";

/// Transport that replays queued responses keyed by the last path segment.
///
/// Unscripted requests get a 500.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, VecDeque<HttpResponse>>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, key: &str, response: HttpResponse) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Keys requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
    }

    /// When each request was made.
    pub fn times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: Url, _bearer: Option<String>) -> Result<HttpResponse> {
        let key = url
            .path_segments()
            .and_then(|mut s| s.next_back())
            .unwrap_or_default()
            .to_string();
        self.calls.lock().unwrap().push((key.clone(), Instant::now()));
        let next = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        Ok(next.unwrap_or_else(|| HttpResponse::new(500).with_body("unscripted")))
    }
}

pub fn session() -> Session {
    Session::new("user-1", "token").unwrap()
}

pub fn catalog() -> Catalog {
    Catalog::from_pairs(&[(FIRE, "Fire"), (ALVA, "Alva")])
}

pub fn tab(id: &str) -> StashTab {
    StashTab {
        id: id.to_string(),
        name: format!("Tab {id}"),
        kind: "NormalStash".to_string(),
        index: 0,
        colour: "#ffffff".to_string(),
        children: Vec::new(),
    }
}

/// A stash contents response holding one compass per modifier.
pub fn stash(mods: &[&str]) -> HttpResponse {
    let items: Vec<String> = mods
        .iter()
        .map(|m| format!(r#"{{"typeLine": "Charged Compass", "enchantMods": ["{m}"], "icon": "c.png"}}"#))
        .collect();
    HttpResponse::new(200).with_body(format!(r#"{{"stash": {{"items": [{}]}}}}"#, items.join(",")))
}

/// Attach an `Account` rule with one window of `window` seconds.
pub fn with_usage(response: HttpResponse, limit: u32, used: u32, window: u64) -> HttpResponse {
    response
        .with_header("X-Rate-Limit-Rules", "Account")
        .with_header("X-Rate-Limit-Account", format!("{limit}:{window}:{window}"))
        .with_header("X-Rate-Limit-Account-State", format!("{used}:{window}:0"))
}
