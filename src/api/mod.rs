//! Remote API integration.
//!
//! Two upstreams are involved: the game's inventory API (leagues, stash
//! tabs and their contents, all rate limited) and a community price feed.
//! Both are reached through [`HttpTransport`] so tests can script responses.

mod converter;
mod inventory;
mod price_feed;
pub mod rate_limit;
mod session;
mod transport;

pub use converter::{DataConverter, RawInventoryItem};
pub use inventory::{FetchReport, InventoryClient, TabOutcome, TabStatus};
pub use price_feed::{PriceFeedClient, decode_contents};
pub use rate_limit::{RateLimitState, pacing_delay, parse_rate_limits};
pub use session::Session;
#[cfg(test)]
pub use transport::MockHttpTransport;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
