//! Per-league scoreboard fan-out.
//!
//! Every league's scoreboard is fetched concurrently. A league whose
//! fetch fails maps to an empty event list; siblings are unaffected and
//! the result always has exactly one entry per input league.

use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::fan_out;
use crate::feed::SportsFeed;
use crate::types::{Event, League};

#[derive(Debug, Clone, Default)]
pub struct ScoreboardAggregator {
    max_concurrency: Option<usize>,
}

impl ScoreboardAggregator {
    pub fn new(max_concurrency: Option<usize>) -> Self {
        Self { max_concurrency }
    }

    pub async fn fetch_all(
        &self,
        feed: &dyn SportsFeed,
        leagues: &[League],
    ) -> HashMap<String, Vec<Event>> {
        // Collected up front: a lazy iterator held across the await keeps
        // the cycle future from being `Send`.
        let fetches: Vec<_> = leagues
            .iter()
            .map(|league| Self::fetch_one(feed, league))
            .collect();
        let results = fan_out(fetches, self.max_concurrency).await;

        let failed = results.iter().filter(|(_, ok, _)| !ok).count();
        let scores: HashMap<String, Vec<Event>> = results
            .into_iter()
            .map(|(league_id, _, events)| (league_id, events))
            .collect();

        info!(
            leagues = leagues.len(),
            failed,
            events = scores.values().map(Vec::len).sum::<usize>(),
            "Scoreboards fetched"
        );
        scores
    }

    /// `(league id, fetch succeeded, events)`
    async fn fetch_one(feed: &dyn SportsFeed, league: &League) -> (String, bool, Vec<Event>) {
        match feed.fetch_scoreboard(league).await {
            Ok(events) => {
                debug!(league = %league.slug, events = events.len(), "Scoreboard fetched");
                (league.id.clone(), true, events)
            }
            Err(e) => {
                warn!(league = %league.slug, error = %e, "Scoreboard fetch failed, using empty list");
                (league.id.clone(), false, Vec::new())
            }
        }
    }
}
