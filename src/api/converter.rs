//! Wire types and their conversion to internal state types.

use crate::pricing::PriceEntry;
use crate::state::{League, StashTab};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct LeaguesResponse {
    pub leagues: Vec<LeagueDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeagueDto {
    pub id: String,
    #[serde(default)]
    pub realm: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<CategoryDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryDto {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StashesResponse {
    pub stashes: Vec<StashTabDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StashTabDto {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub metadata: StashMetadataDto,
    #[serde(default)]
    pub children: Vec<StashTabDto>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StashMetadataDto {
    pub colour: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StashItemsResponse {
    pub stash: StashContentsDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StashContentsDto {
    #[serde(default)]
    pub items: Vec<RawInventoryItem>,
}

/// An item as the inventory API reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInventoryItem {
    pub type_line: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enchant_mods: Vec<String>,
    #[serde(default)]
    pub icon: String,
}

/// GitHub contents API envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentsResponse {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PriceFeedDto {
    pub timestamp: Option<f64>,
    pub data: Vec<PriceEntryDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PriceEntryDto {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub chaos: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub divine: Decimal,
    #[serde(default)]
    pub low_confidence: bool,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub ratio: Option<Decimal>,
}

/// Converts API responses to internal state types.
pub struct DataConverter;

impl DataConverter {
    pub(crate) fn convert_league(league: LeagueDto) -> League {
        League {
            id: league.id,
            realm: league.realm,
            description: league.description,
            category: league.category.map(|c| c.id),
        }
    }

    pub(crate) fn convert_stash_tab(tab: StashTabDto) -> StashTab {
        StashTab {
            id: tab.id,
            name: tab.name,
            kind: tab.kind,
            index: tab.index,
            colour: Self::convert_colour(tab.metadata.colour.as_deref().unwrap_or_default()),
            children: tab
                .children
                .into_iter()
                .map(Self::convert_stash_tab)
                .collect(),
        }
    }

    pub(crate) fn convert_price_entry(entry: PriceEntryDto) -> PriceEntry {
        PriceEntry {
            name: entry.name,
            chaos_value: entry.chaos,
            divine_value: entry.divine,
            low_confidence: entry.low_confidence,
            ratio: entry.ratio.unwrap_or_default(),
        }
    }

    /// Tab colours arrive as bare hex with leading zeros stripped.
    pub fn convert_colour(colour: &str) -> String {
        format!("#{colour:0>6}")
    }

    /// Feed timestamps are unix time, in milliseconds on current feeds
    /// and seconds on older ones.
    pub fn convert_timestamp(timestamp: f64) -> Option<DateTime<Utc>> {
        if !timestamp.is_finite() || timestamp < 0.0 {
            return None;
        }
        let whole = timestamp as i64;
        if whole >= 100_000_000_000 {
            DateTime::from_timestamp_millis(whole)
        } else {
            DateTime::from_timestamp(whole, 0)
        }
    }
}
