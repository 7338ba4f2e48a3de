//! Price feed snapshots.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One priced item from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    /// Canonical item name.
    pub name: String,
    /// Price in chaos orbs.
    pub chaos_value: Decimal,
    /// Price in divine orbs.
    pub divine_value: Decimal,
    /// Feed marks thinly traded items.
    pub low_confidence: bool,
    /// Listing ratio reported by the feed.
    pub ratio: Decimal,
}

impl PriceEntry {
    /// Create an entry with only the prices set.
    pub fn new(name: impl Into<String>, chaos_value: Decimal, divine_value: Decimal) -> Self {
        Self {
            name: name.into(),
            chaos_value,
            divine_value,
            low_confidence: false,
            ratio: Decimal::ZERO,
        }
    }
}

/// An immutable, validated price list.
///
/// Snapshots are replaced wholesale on refresh; nothing mutates one after
/// construction.
#[derive(Debug, Clone, Default)]
pub struct PriceSnapshot {
    updated_at: Option<DateTime<Utc>>,
    entries: Vec<PriceEntry>,
    by_name: HashMap<String, usize>,
}

impl PriceSnapshot {
    /// Validate and index a list of entries.
    ///
    /// Rejects negative prices and duplicate names.
    pub fn new(updated_at: Option<DateTime<Utc>>, entries: Vec<PriceEntry>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            if entry.chaos_value < Decimal::ZERO || entry.divine_value < Decimal::ZERO {
                return Err(Error::validation(format!(
                    "negative price for '{}' in price feed",
                    entry.name
                )));
            }
            if by_name.insert(entry.name.clone(), i).is_some() {
                return Err(Error::validation(format!(
                    "duplicate entry '{}' in price feed",
                    entry.name
                )));
            }
        }

        Ok(Self {
            updated_at,
            entries,
            by_name,
        })
    }

    /// A snapshot with no prices; every item is unpriced.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up an entry by canonical name.
    pub fn get(&self, name: &str) -> Option<&PriceEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// Chaos price for a name, if the feed lists it.
    pub fn chaos_price(&self, name: &str) -> Option<Decimal> {
        self.get(name).map(|e| e.chaos_value)
    }

    /// When the feed publisher produced this snapshot.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_lookup_by_name() {
        let snapshot = PriceSnapshot::new(
            None,
            vec![
                PriceEntry::new("Fire", dec!(10), dec!(1)),
                PriceEntry::new("Ice", dec!(4.5), dec!(0.2)),
            ],
        )
        .unwrap();

        assert_eq!(snapshot.chaos_price("Ice"), Some(dec!(4.5)));
        assert_eq!(snapshot.chaos_price("ice"), None);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_rejects_duplicates() {
        let result = PriceSnapshot::new(
            None,
            vec![
                PriceEntry::new("Fire", dec!(10), dec!(1)),
                PriceEntry::new("Fire", dec!(11), dec!(1)),
            ],
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_negative_prices() {
        let result = PriceSnapshot::new(None, vec![PriceEntry::new("Fire", dec!(-1), dec!(0))]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
