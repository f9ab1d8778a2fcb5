//! Snapshot → presentation model.
//!
//! Applies the time window at render time and attaches implied
//! probabilities to live events only.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::odds::implied_percentage;
use crate::types::{AggregateView, Competitor, Event, League, OddsQuote};
use crate::window::TimeWindow;

#[derive(Debug, Clone, Serialize)]
pub struct LeagueCard {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
    pub events: Vec<EventCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventCard {
    pub id: String,
    pub date: Option<String>,
    pub detail: Option<String>,
    pub state: Option<String>,
    pub live: bool,
    pub competitors: Vec<CompetitorLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompetitorLine {
    pub id: Option<String>,
    pub name: String,
    pub home_away: Option<String>,
    pub score: Option<String>,
    pub moneyline: Option<f64>,
    /// e.g. "60.0%"; only for live events with a quote.
    pub implied: Option<String>,
}

/// Leagues with at least one in-window event, in catalog order.
pub fn render(view: &AggregateView, window: &TimeWindow, now: DateTime<Utc>) -> Vec<LeagueCard> {
    view.leagues
        .iter()
        .filter_map(|league| render_league(view, league, window, now))
        .collect()
}

fn render_league(
    view: &AggregateView,
    league: &League,
    window: &TimeWindow,
    now: DateTime<Utc>,
) -> Option<LeagueCard> {
    let in_window: Vec<&Event> = view
        .events_for(&league.id)
        .iter()
        .filter(|e| window.contains_raw(e.date.as_deref(), now))
        .collect();

    // Visibility follows the window alone; an event that cannot be drawn
    // is dropped without hiding its league.
    if in_window.is_empty() {
        return None;
    }

    let events = in_window
        .into_iter()
        .filter_map(|e| render_event(e, view.odds_for(&e.id)))
        .collect();

    Some(LeagueCard {
        id: league.id.clone(),
        name: league.name.clone(),
        abbreviation: league.abbreviation.clone(),
        events,
    })
}

/// Events without a competition are not displayable.
fn render_event(event: &Event, odds: Option<&OddsQuote>) -> Option<EventCard> {
    event.competitions.first()?;
    let live = event.is_live();

    Some(EventCard {
        id: event.id.clone(),
        date: event.date.clone(),
        detail: event.short_detail().map(str::to_string),
        state: event.state().map(str::to_string),
        live,
        competitors: event
            .competitors()
            .iter()
            .map(|c| render_competitor(c, odds, live))
            .collect(),
    })
}

fn render_competitor(c: &Competitor, odds: Option<&OddsQuote>, live: bool) -> CompetitorLine {
    let moneyline = odds.and_then(|q| q.for_competitor(c));
    CompetitorLine {
        id: c.id.clone(),
        name: c.display_name().to_string(),
        home_away: c.home_away.clone(),
        score: c.score.clone(),
        moneyline,
        implied: if live { implied_percentage(moneyline) } else { None },
    }
}
