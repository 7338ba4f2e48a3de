//! In-process preference store.

use super::{OverrideChange, OverrideTable, PreferenceStore};
use crate::error::Result;
use crate::pricing::Overrides;
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

/// Keeps overrides in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    table: RwLock<OverrideTable>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get_overrides(&self, user_id: &str, league: &str) -> Result<Overrides> {
        Ok(self.table.read().await.get(user_id, league))
    }

    async fn set_override(
        &self,
        user_id: &str,
        item: &str,
        league: &str,
        value: Option<Decimal>,
    ) -> Result<OverrideChange> {
        self.table.write().await.set(user_id, item, league, value)
    }

    async fn delete_override(&self, user_id: &str, item: &str, league: &str) -> Result<()> {
        self.table.write().await.delete(user_id, item, league)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_set_twice_leaves_one_override() {
        let store = MemoryPreferenceStore::new();
        store.set_override("u", "Alva", "Std", Some(dec!(5))).await.unwrap();
        let change = store.set_override("u", "Alva", "Std", Some(dec!(5))).await.unwrap();

        assert_eq!(change, OverrideChange::Unchanged);
        let overrides = store.get_overrides("u", "Std").await.unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides.get("Alva"), Some(&dec!(5)));
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let store = MemoryPreferenceStore::new();
        store.set_override("u", "Alva", "Std", Some(dec!(5))).await.unwrap();
        store.delete_override("u", "Alva", "Std").await.unwrap();

        assert!(store.get_overrides("u", "Std").await.unwrap().is_empty());
        assert!(matches!(
            store.delete_override("u", "Alva", "Std").await,
            Err(Error::NotFound(_))
        ));
    }
}
