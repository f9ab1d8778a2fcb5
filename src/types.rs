//! Shared types for MATCHDAY.
//!
//! These types form the data model used across all modules: the
//! upstream-shaped league/event records, the per-cycle aggregate
//! snapshot, and the published cycle state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Status state marking an event as currently in progress.
pub const LIVE_STATE: &str = "in";

// ---------------------------------------------------------------------------
// League
// ---------------------------------------------------------------------------

/// A league from the upstream catalog. Identity is `id`; `slug` is the
/// key the scoreboard and odds endpoints are addressed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
    #[serde(default)]
    pub slug: String,
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.slug)
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A scoreboard event, shaped like the upstream record.
///
/// Only the fields the pipeline and dashboard read are modelled; all of
/// them are optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub id: String,
    /// Kickoff time, ISO 8601.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub competitions: Vec<Competition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventStatus {
    #[serde(rename = "type", default)]
    pub status_type: Option<StatusType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusType {
    /// "pre" | "in" | "post"
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub short_detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    #[serde(default)]
    pub id: Option<String>,
    /// "home" | "away"
    #[serde(default)]
    pub home_away: Option<String>,
    #[serde(default)]
    pub team: Option<Team>,
    /// ESPN sends scores as strings, occasionally as numbers.
    #[serde(default, deserialize_with = "deserialize_score")]
    pub score: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl Event {
    /// The raw `status.type.state`, if present.
    pub fn state(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.status_type.as_ref())
            .and_then(|t| t.state.as_deref())
    }

    /// Whether the event is currently in progress.
    pub fn is_live(&self) -> bool {
        self.state() == Some(LIVE_STATE)
    }

    pub fn short_detail(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|s| s.status_type.as_ref())
            .and_then(|t| t.short_detail.as_deref())
    }

    /// Competitors of the first competition (empty if none).
    pub fn competitors(&self) -> &[Competitor] {
        self.competitions
            .first()
            .map(|c| c.competitors.as_slice())
            .unwrap_or(&[])
    }
}

impl Competitor {
    pub fn is_home(&self) -> bool {
        self.home_away.as_deref() == Some("home")
    }

    pub fn display_name(&self) -> &str {
        self.team
            .as_ref()
            .and_then(|t| t.display_name.as_deref())
            .unwrap_or("TBD")
    }
}

// ---------------------------------------------------------------------------
// Odds
// ---------------------------------------------------------------------------

/// American moneylines for the two sides of one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub home: Option<f64>,
    pub away: Option<f64>,
}

impl OddsQuote {
    /// The moneyline for a competitor's side of the event.
    pub fn for_competitor(&self, competitor: &Competitor) -> Option<f64> {
        if competitor.is_home() {
            self.home
        } else {
            self.away
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregate snapshot
// ---------------------------------------------------------------------------

/// One fully assembled refresh cycle: leagues × events × live odds.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateView {
    pub cycle_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub leagues: Vec<League>,
    pub scores_by_league: HashMap<String, Vec<Event>>,
    pub odds_by_event: HashMap<String, OddsQuote>,
}

impl AggregateView {
    /// Events fetched for a league (empty when its fetch degraded).
    pub fn events_for(&self, league_id: &str) -> &[Event] {
        self.scores_by_league
            .get(league_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn odds_for(&self, event_id: &str) -> Option<&OddsQuote> {
        self.odds_by_event.get(event_id)
    }

    pub fn event_count(&self) -> usize {
        self.scores_by_league.values().map(Vec::len).sum()
    }

    /// Verify the snapshot invariants: one score entry per league, and
    /// odds only for events that are live in this snapshot.
    pub fn check_consistency(&self) -> Result<(), CycleError> {
        if let Some(missing) = self
            .leagues
            .iter()
            .find(|l| !self.scores_by_league.contains_key(&l.id))
        {
            return Err(CycleError::Inconsistent(format!(
                "no scoreboard entry for league {}",
                missing.id
            )));
        }

        for event_id in self.odds_by_event.keys() {
            let live = self
                .scores_by_league
                .values()
                .flatten()
                .any(|e| &e.id == event_id && e.is_live());
            if !live {
                return Err(CycleError::Inconsistent(format!(
                    "odds present for non-live event {event_id}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Published cycle state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleStatus::Idle => write!(f, "idle"),
            CycleStatus::Loading => write!(f, "loading"),
            CycleStatus::Ready => write!(f, "ready"),
            CycleStatus::Error => write!(f, "error"),
        }
    }
}

/// What consumers observe. Replaced wholesale, never patched.
#[derive(Debug, Clone)]
pub struct CycleState {
    pub status: CycleStatus,
    /// Last complete snapshot. Kept while loading, dropped on error.
    pub view: Option<std::sync::Arc<AggregateView>>,
    pub error: Option<String>,
    pub last_cycle_id: Option<Uuid>,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
}

impl Default for CycleState {
    fn default() -> Self {
        Self {
            status: CycleStatus::Idle,
            view: None,
            error: None,
            last_cycle_id: None,
            cycles_completed: 0,
            cycles_failed: 0,
        }
    }
}

/// Result of asking the orchestrator to refresh.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    Completed(std::sync::Arc<AggregateView>),
    Failed(String),
    /// A cycle was already in flight; this trigger was ignored.
    Skipped,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failure of a single upstream fetch.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Unexpected payload shape: {0}")]
    Shape(String),
}

/// Failure that escaped every per-fetch containment point.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("Refresh cycle panicked: {0}")]
    Panicked(String),

    #[error("Inconsistent snapshot: {0}")]
    Inconsistent(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
