//! League catalog fetch.
//!
//! Resolves the upstream league list and caps it to bound the
//! per-league fan-out that follows. A failed fetch is an empty catalog,
//! not an error: the cycle carries on and publishes an empty view.

use tracing::{info, warn};

use crate::feed::SportsFeed;
use crate::types::League;

#[derive(Debug, Clone)]
pub struct LeagueCatalogFetcher {
    limit: usize,
}

impl LeagueCatalogFetcher {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// First `limit` leagues in upstream order, or none on failure.
    pub async fn fetch(&self, feed: &dyn SportsFeed) -> Vec<League> {
        match feed.fetch_leagues().await {
            Ok(mut leagues) => {
                let total = leagues.len();
                leagues.truncate(self.limit);
                info!(total, kept = leagues.len(), "League catalog fetched");
                leagues
            }
            Err(e) => {
                warn!(error = %e, "League catalog fetch failed, continuing with no leagues");
                Vec::new()
            }
        }
    }
}
