//! # Compass Trader
//!
//! A terminal trading assistant for Path of Exile charged compasses.
//! It reads the player's stash tabs, classifies each compass by its
//! enchant modifiers, prices the result against a community price feed
//! plus the player's own overrides, and formats a trade listing.
//!
//! ## Architecture
//!
//! - **App**: Terminal lifecycle, event loop and background pricing runs
//! - **UI**: Layout and rendering logic
//! - **API**: Inventory API and price feed clients, rate-limit pacing
//! - **Catalog**: Modifier signature to compass name lookup
//! - **Pricing**: Aggregation, sorting, order totals and listing text
//! - **Store**: Persisted per-user price overrides
//! - **Service**: The pricing pipeline tying the above together
//! - **State**: Centralized state management
//! - **Events**: Input handling and event processing
//! - **Config**: Configuration management

pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod pricing;
pub mod service;
pub mod state;
pub mod store;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
pub use service::{PricingRun, TradeService};
