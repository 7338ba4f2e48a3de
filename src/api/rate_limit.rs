//! Rate-limit header parsing and pacing decisions.
//!
//! The inventory API reports its limits on every response:
//!
//! ```text
//! X-Rate-Limit-Rules: Account
//! X-Rate-Limit-Account: 30:60:60,100:1800:600
//! X-Rate-Limit-Account-State: 28:60:0,40:1800:0
//! ```
//!
//! Each comma-separated entry is `limit:window[:penalty]` for the rule and
//! `count:window[:active]` for its state, paired by position.

use super::HttpResponse;
use crate::error::{Error, Result};
use std::time::Duration;
use tracing::debug;

const RULES_HEADER: &str = "X-Rate-Limit-Rules";

/// Usage of one rule window, as reported by the last response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitState {
    pub rule_name: String,
    pub limit: u32,
    pub window_secs: u64,
    pub current_count: u32,
}

impl RateLimitState {
    /// Requests left in the window; negative once the limit is exceeded.
    pub fn remaining(&self) -> i64 {
        i64::from(self.limit) - i64::from(self.current_count)
    }

    pub fn is_near_limit(&self, safety_margin: u32) -> bool {
        self.remaining() <= i64::from(safety_margin)
    }
}

/// Parse every rule window reported by `response`.
///
/// A response without the rules header yields no states.
pub fn parse_rate_limits(response: &HttpResponse) -> Result<Vec<RateLimitState>> {
    let Some(rules) = response.header(RULES_HEADER) else {
        return Ok(Vec::new());
    };

    let mut states = Vec::new();
    for rule in rules.split(',').map(str::trim).filter(|r| !r.is_empty()) {
        let limits_header = format!("X-Rate-Limit-{rule}");
        let state_header = format!("X-Rate-Limit-{rule}-State");

        let limits = response
            .header(&limits_header)
            .ok_or_else(|| Error::validation(format!("missing {limits_header} header")))?;
        let usage = response
            .header(&state_header)
            .ok_or_else(|| Error::validation(format!("missing {state_header} header")))?;

        let limits = parse_entries(limits)?;
        let usage = parse_entries(usage)?;
        if limits.len() != usage.len() {
            return Err(Error::validation(format!(
                "{limits_header} has {} entries but {state_header} has {}",
                limits.len(),
                usage.len()
            )));
        }

        for ((limit, window_secs), (count, _)) in limits.into_iter().zip(usage) {
            states.push(RateLimitState {
                rule_name: rule.to_string(),
                limit: to_u32(limit)?,
                window_secs,
                current_count: to_u32(count)?,
            });
        }
    }

    debug!(?states, "parsed rate limit headers");
    Ok(states)
}

/// Delay owed before the next request.
///
/// Every window with `safety_margin` or fewer requests left triggers a
/// wait of that window's length, one after another, so the delays add up.
pub fn pacing_delay(states: &[RateLimitState], safety_margin: u32) -> Option<Duration> {
    states
        .iter()
        .filter(|s| s.is_near_limit(safety_margin))
        .map(|s| s.window_secs)
        .reduce(u64::saturating_add)
        .map(Duration::from_secs)
}

/// `Retry-After` in seconds, if present and numeric.
pub fn retry_after(response: &HttpResponse) -> Option<u64> {
    response
        .header("Retry-After")
        .and_then(|v| v.trim().parse().ok())
}

fn parse_entries(value: &str) -> Result<Vec<(u64, u64)>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(|entry| {
            let mut fields = entry.split(':').map(|f| f.trim().parse::<u64>());
            match (fields.next(), fields.next()) {
                (Some(Ok(first)), Some(Ok(window))) => Ok((first, window)),
                _ => Err(Error::validation(format!("malformed rate limit entry '{entry}'"))),
            }
        })
        .collect()
}

fn to_u32(value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::validation(format!("rate limit value {value} out of range")))
}
