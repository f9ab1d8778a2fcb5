//! Per-live-event odds fan-out.
//!
//! Odds are only requested for events that were live at selection
//! time. An event whose fetch fails or comes back empty is simply left
//! out of the result; there are no placeholder entries.

use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::fan_out;
use super::live::LiveEvent;
use crate::feed::SportsFeed;
use crate::types::OddsQuote;

#[derive(Debug, Clone, Default)]
pub struct OddsAggregator {
    max_concurrency: Option<usize>,
}

impl OddsAggregator {
    pub fn new(max_concurrency: Option<usize>) -> Self {
        Self { max_concurrency }
    }

    pub async fn fetch_all(
        &self,
        feed: &dyn SportsFeed,
        live: &[LiveEvent<'_>],
    ) -> HashMap<String, OddsQuote> {
        let fetches: Vec<_> = live
            .iter()
            .map(|item| Self::fetch_one(feed, *item))
            .collect();
        let odds: HashMap<String, OddsQuote> = fan_out(fetches, self.max_concurrency)
            .await
            .into_iter()
            .flatten()
            .collect();

        info!(live = live.len(), quoted = odds.len(), "Live odds fetched");
        odds
    }

    async fn fetch_one(feed: &dyn SportsFeed, item: LiveEvent<'_>) -> Option<(String, OddsQuote)> {
        let event_id = &item.event.id;
        match feed.fetch_odds(item.league, event_id).await {
            Ok(Some(quote)) => Some((event_id.clone(), quote)),
            Ok(None) => {
                debug!(league = %item.league.slug, event_id = %event_id, "No odds offered");
                None
            }
            Err(e) => {
                warn!(
                    league = %item.league.slug,
                    event_id = %event_id,
                    error = %e,
                    "Odds fetch failed, skipping event"
                );
                None
            }
        }
    }
}
