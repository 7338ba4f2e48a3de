//! Persistence of user price overrides.
//!
//! An override is unique per (user, item, league). Setting a value that is
//! already stored is a no-op, and setting `None` removes the override.

mod json;
mod memory;

pub use json::JsonPreferenceStore;
pub use memory::MemoryPreferenceStore;

use crate::error::{Error, Result};
use crate::pricing::Overrides;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a `set_override` call changed the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideChange {
    Created,
    Updated,
    Deleted,
    Unchanged,
}

impl OverrideChange {
    /// Whether anything was written.
    pub fn is_change(self) -> bool {
        self != Self::Unchanged
    }
}

/// Storage for per-user, per-league price overrides.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// All overrides of `user_id` in `league`, keyed by item name.
    async fn get_overrides(&self, user_id: &str, league: &str) -> Result<Overrides>;

    /// Create, update or (with `None`) remove an override.
    async fn set_override(
        &self,
        user_id: &str,
        item: &str,
        league: &str,
        value: Option<Decimal>,
    ) -> Result<OverrideChange>;

    /// Remove an override; `NotFound` if there is none.
    async fn delete_override(&self, user_id: &str, item: &str, league: &str) -> Result<()>;
}

/// A stored override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceOverride {
    pub user_id: String,
    pub item_name: String,
    pub league: String,
    pub value: Decimal,
}

type OverrideKey = (String, String, String);

/// The override table shared by the store implementations.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct OverrideTable {
    /// (user, league, item) -> value
    values: BTreeMap<OverrideKey, Decimal>,
}

impl OverrideTable {
    pub(crate) fn from_records(records: Vec<PriceOverride>) -> Self {
        let values = records
            .into_iter()
            .map(|r| ((r.user_id, r.league, r.item_name), r.value))
            .collect();
        Self { values }
    }

    pub(crate) fn records(&self) -> Vec<PriceOverride> {
        self.values
            .iter()
            .map(|((user_id, league, item_name), value)| PriceOverride {
                user_id: user_id.clone(),
                item_name: item_name.clone(),
                league: league.clone(),
                value: *value,
            })
            .collect()
    }

    pub(crate) fn get(&self, user_id: &str, league: &str) -> Overrides {
        self.values
            .iter()
            .filter(|((u, l, _), _)| u == user_id && l == league)
            .map(|((_, _, item), value)| (item.clone(), *value))
            .collect()
    }

    pub(crate) fn set(
        &mut self,
        user_id: &str,
        item: &str,
        league: &str,
        value: Option<Decimal>,
    ) -> Result<OverrideChange> {
        validate_key(user_id, item, league)?;
        let key = key(user_id, item, league);

        let change = match (value, self.values.get(&key)) {
            (Some(v), _) if v < Decimal::ZERO => {
                return Err(Error::validation(format!(
                    "price for '{item}' cannot be negative"
                )));
            }
            (Some(v), Some(existing)) if *existing == v => OverrideChange::Unchanged,
            (Some(v), existing) => {
                let created = existing.is_none();
                self.values.insert(key, v);
                if created {
                    OverrideChange::Created
                } else {
                    OverrideChange::Updated
                }
            }
            (None, Some(_)) => {
                self.values.remove(&key);
                OverrideChange::Deleted
            }
            (None, None) => OverrideChange::Unchanged,
        };
        Ok(change)
    }

    pub(crate) fn delete(&mut self, user_id: &str, item: &str, league: &str) -> Result<()> {
        validate_key(user_id, item, league)?;
        self.values
            .remove(&key(user_id, item, league))
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("no override for '{item}' in {league}")))
    }
}

fn key(user_id: &str, item: &str, league: &str) -> OverrideKey {
    (user_id.to_string(), league.to_string(), item.to_string())
}

fn validate_key(user_id: &str, item: &str, league: &str) -> Result<()> {
    if user_id.is_empty() || item.trim().is_empty() || league.trim().is_empty() {
        return Err(Error::validation("user, item and league are required"));
    }
    Ok(())
}
