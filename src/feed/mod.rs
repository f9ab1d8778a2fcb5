//! Upstream sports feed.
//!
//! Defines the `SportsFeed` trait the pipeline fetches through, and the
//! ESPN implementation used in production.

pub mod espn;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{Event, League, OddsQuote};

/// Abstraction over the three upstream request/response operations.
///
/// Implementations may fail or return malformed data freely; the
/// pipeline stages are responsible for containing those failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SportsFeed: Send + Sync {
    /// Full league catalog, in upstream order.
    async fn fetch_leagues(&self) -> Result<Vec<League>>;

    /// Events on a league's scoreboard.
    async fn fetch_scoreboard(&self, league: &League) -> Result<Vec<Event>>;

    /// Moneyline quote for one event. `Ok(None)` means the provider has
    /// no odds for it.
    async fn fetch_odds(&self, league: &League, event_id: &str) -> Result<Option<OddsQuote>>;
}
