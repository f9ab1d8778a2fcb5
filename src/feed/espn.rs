//! ESPN public soccer endpoints.
//!
//! Core API: `https://sports.core.api.espn.com/v2/` (league catalog, odds)
//! Site API: `https://site.api.espn.com/apis/site/v2/` (scoreboards)
//! Auth: none. Both base URLs come from config so tests can point the
//! client at a local server.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::SportsFeed;
use crate::config::UpstreamConfig;
use crate::odds::deserialize_american;
use crate::types::{Event, FeedError, League, OddsQuote};

// ---------------------------------------------------------------------------
// API response types (ESPN JSON → Rust)
// ---------------------------------------------------------------------------

/// `GET /sports/{sport}/leagues`
#[derive(Debug, Deserialize)]
struct LeagueListing {
    #[serde(default)]
    items: Option<Vec<League>>,
}

/// `GET /sports/{sport}/leagues/{slug}/events/{id}/competitions/{id}/odds`
#[derive(Debug, Deserialize)]
struct OddsListing {
    /// Kept raw: only the first provider entry is ever decoded.
    #[serde(default)]
    items: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OddsItem {
    #[serde(default)]
    home_team_odds: Option<TeamOdds>,
    #[serde(default)]
    away_team_odds: Option<TeamOdds>,
}

#[derive(Debug, Deserialize)]
struct TeamOdds {
    #[serde(default)]
    current: Option<CurrentOdds>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentOdds {
    #[serde(default)]
    money_line: Option<MoneyLine>,
}

#[derive(Debug, Deserialize)]
struct MoneyLine {
    #[serde(default, deserialize_with = "deserialize_american")]
    american: Option<f64>,
}

impl TeamOdds {
    fn american(&self) -> Option<f64> {
        self.current
            .as_ref()
            .and_then(|c| c.money_line.as_ref())
            .and_then(|m| m.american)
    }
}

// ---------------------------------------------------------------------------
// Payload parsing
// ---------------------------------------------------------------------------

fn parse_leagues(payload: Value) -> Result<Vec<League>> {
    let listing: LeagueListing =
        serde_json::from_value(payload).context("Failed to parse ESPN league listing")?;
    Ok(listing.items.unwrap_or_default())
}

/// Scoreboards arrive either as a bare event list or wrapped under
/// `events` (the site API shape). Anything else is a shape error.
fn parse_scoreboard(payload: Value) -> Result<Vec<Event>> {
    let events = match payload {
        Value::Array(_) => payload,
        Value::Object(mut obj) => match obj.remove("events") {
            Some(events @ Value::Array(_)) => events,
            _ => return Err(FeedError::Shape("scoreboard has no events list".into()).into()),
        },
        other => {
            return Err(FeedError::Shape(format!("scoreboard is not a list: {other}")).into())
        }
    };
    serde_json::from_value(events).context("Failed to parse ESPN scoreboard events")
}

/// Only the first odds provider entry is used.
fn parse_odds(payload: Value) -> Result<Option<OddsQuote>> {
    let listing: OddsListing =
        serde_json::from_value(payload).context("Failed to parse ESPN odds listing")?;
    let Some(first) = listing.items.and_then(|items| items.into_iter().next()) else {
        return Ok(None);
    };
    let first: OddsItem =
        serde_json::from_value(first).context("Failed to parse ESPN odds entry")?;
    Ok(Some(OddsQuote {
        home: first.home_team_odds.as_ref().and_then(TeamOdds::american),
        away: first.away_team_odds.as_ref().and_then(TeamOdds::american),
    }))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// ESPN soccer feed client.
pub struct EspnFeed {
    http: Client,
    core_base_url: String,
    site_base_url: String,
    sport: String,
}

impl EspnFeed {
    pub fn new(cfg: &UpstreamConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .user_agent(cfg.user_agent.as_str())
            .build()
            .context("Failed to build HTTP client for ESPN")?;

        Ok(Self {
            http,
            core_base_url: cfg.core_base_url.trim_end_matches('/').to_string(),
            site_base_url: cfg.site_base_url.trim_end_matches('/').to_string(),
            sport: cfg.sport.clone(),
        })
    }

    fn leagues_url(&self) -> String {
        format!("{}/sports/{}/leagues?lang=en&region=us", self.core_base_url, self.sport)
    }

    fn scoreboard_url(&self, slug: &str) -> String {
        format!(
            "{}/sports/{}/{}/scoreboard",
            self.site_base_url,
            self.sport,
            urlencoding::encode(slug),
        )
    }

    fn odds_url(&self, slug: &str, event_id: &str) -> String {
        let event_id = urlencoding::encode(event_id);
        format!(
            "{}/sports/{}/leagues/{}/events/{event_id}/competitions/{event_id}/odds",
            self.core_base_url,
            self.sport,
            urlencoding::encode(slug),
        )
    }

    /// GET a URL and decode the body as JSON. Non-2xx is an error.
    async fn get_json(&self, url: &str) -> Result<Value> {
        debug!(url = %url, "Fetching ESPN resource");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("ESPN request failed: {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        resp.json()
            .await
            .with_context(|| format!("ESPN returned invalid JSON: {url}"))
    }
}

#[async_trait]
impl SportsFeed for EspnFeed {
    async fn fetch_leagues(&self) -> Result<Vec<League>> {
        let payload = self.get_json(&self.leagues_url()).await?;
        parse_leagues(payload)
    }

    async fn fetch_scoreboard(&self, league: &League) -> Result<Vec<Event>> {
        let payload = self.get_json(&self.scoreboard_url(&league.slug)).await?;
        parse_scoreboard(payload)
    }

    async fn fetch_odds(&self, league: &League, event_id: &str) -> Result<Option<OddsQuote>> {
        let payload = self.get_json(&self.odds_url(&league.slug, event_id)).await?;
        parse_odds(payload)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
