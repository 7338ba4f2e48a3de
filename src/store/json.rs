//! File-backed preference store.

use super::{OverrideChange, OverrideTable, PreferenceStore, PriceOverride};
use crate::error::Result;
use crate::pricing::Overrides;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

const FILE_NAME: &str = "overrides.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct OverrideFile {
    overrides: Vec<PriceOverride>,
}

/// Stores overrides as JSON in the data directory.
///
/// Every change rewrites the file through a temporary file and a rename,
/// so a crash mid-write leaves the previous contents intact.
#[derive(Debug)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    table: Mutex<OverrideTable>,
}

impl JsonPreferenceStore {
    /// Open the store in the default data directory.
    pub async fn open_default() -> Result<Self> {
        Self::open(crate::config::data_dir()?.join(FILE_NAME)).await
    }

    /// Open the store at `path`; a missing file is an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let table = match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                let file: OverrideFile = serde_json::from_str(&text)?;
                OverrideTable::from_records(file.overrides)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => OverrideTable::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, table: &OverrideTable) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OverrideFile {
            overrides: table.records(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), count = file.overrides.len(), "overrides saved");
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for JsonPreferenceStore {
    async fn get_overrides(&self, user_id: &str, league: &str) -> Result<Overrides> {
        Ok(self.table.lock().await.get(user_id, league))
    }

    async fn set_override(
        &self,
        user_id: &str,
        item: &str,
        league: &str,
        value: Option<Decimal>,
    ) -> Result<OverrideChange> {
        let mut table = self.table.lock().await;
        let mut next = table.clone();
        let change = next.set(user_id, item, league, value)?;
        if change.is_change() {
            self.persist(&next).await?;
            *table = next;
        }
        Ok(change)
    }

    async fn delete_override(&self, user_id: &str, item: &str, league: &str) -> Result<()> {
        let mut table = self.table.lock().await;
        let mut next = table.clone();
        next.delete(user_id, item, league)?;
        self.persist(&next).await?;
        *table = next;
        Ok(())
    }
}
