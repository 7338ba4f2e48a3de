//! Pricing engine.
//!
//! Folds classified compasses into priced rows, applies user edits,
//! sorts rows and renders the trade listing. Everything here is pure:
//! no I/O, no clocks, so it is tested directly.

mod engine;
mod listing;
mod order;
mod snapshot;
mod sort;

pub use engine::{ClassifiedItem, ClassifiedRow, Overrides, PricedRows, aggregate, apply_override};
pub use listing::{ListingError, ListingRequest, format_listing, format_total};
pub use order::{OrderCalculator, OrderLine};
pub use snapshot::{PriceEntry, PriceSnapshot};
pub use sort::{SortDirection, SortField, SortState, sort_rows};
