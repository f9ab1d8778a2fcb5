//! End-to-end refresh cycles against an in-memory feed.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use matchday::config::PipelineConfig;
use matchday::dashboard::render::render;
use matchday::engine::orchestrator::AggregationOrchestrator;
use matchday::feed::SportsFeed;
use matchday::types::*;
use matchday::window::TimeWindow;

/// A deterministic feed. Scoreboards and odds are keyed by slug and
/// event id; anything missing from `failing_*` behaves normally.
#[derive(Default)]
struct StubFeed {
    leagues: Vec<League>,
    scoreboards: HashMap<String, Vec<Event>>,
    odds: HashMap<String, Option<OddsQuote>>,
    failing_scoreboards: Vec<String>,
    failing_odds: Vec<String>,
    odds_requests: Mutex<Vec<String>>,
}

impl StubFeed {
    fn odds_requests(&self) -> Vec<String> {
        self.odds_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SportsFeed for StubFeed {
    async fn fetch_leagues(&self) -> Result<Vec<League>> {
        Ok(self.leagues.clone())
    }

    async fn fetch_scoreboard(&self, league: &League) -> Result<Vec<Event>> {
        if self.failing_scoreboards.contains(&league.slug) {
            return Err(anyhow!("HTTP 500 for {}", league.slug));
        }
        Ok(self.scoreboards.get(&league.slug).cloned().unwrap_or_default())
    }

    async fn fetch_odds(&self, _league: &League, event_id: &str) -> Result<Option<OddsQuote>> {
        self.odds_requests.lock().unwrap().push(event_id.to_string());
        if self.failing_odds.iter().any(|id| id == event_id) {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.odds.get(event_id).cloned().flatten())
    }
}

fn league(id: &str, slug: &str) -> League {
    League {
        id: id.to_string(),
        name: format!("League {id}"),
        abbreviation: slug.to_uppercase(),
        slug: slug.to_string(),
    }
}

fn live_event(id: &str) -> Event {
    event(id, "in")
}

fn event(id: &str, state: &str) -> Event {
    serde_json::from_value(json!({
        "id": id,
        "date": Utc::now().to_rfc3339(),
        "status": {"type": {"state": state, "shortDetail": "55'"}},
        "competitions": [{"competitors": [
            {"id": "10", "homeAway": "home", "team": {"displayName": "Arsenal"}, "score": "1"},
            {"id": "20", "homeAway": "away", "team": {"displayName": "Chelsea"}, "score": "1"}
        ]}]
    }))
    .unwrap()
}

async fn run(feed: Arc<StubFeed>) -> Arc<AggregateView> {
    let orch = AggregationOrchestrator::new(feed, &PipelineConfig::default());
    match orch.refresh().await {
        RefreshOutcome::Completed(view) => view,
        other => panic!("expected a completed cycle, got {other:?}"),
    }
}

#[tokio::test]
async fn live_event_with_odds_renders_probabilities() {
    let feed = Arc::new(StubFeed {
        leagues: vec![league("1", "eng.1")],
        scoreboards: HashMap::from([("eng.1".to_string(), vec![live_event("e1")])]),
        odds: HashMap::from([(
            "e1".to_string(),
            Some(OddsQuote { home: Some(-150.0), away: Some(130.0) }),
        )]),
        ..Default::default()
    });

    let view = run(feed).await;
    assert_eq!(
        view.odds_by_event.get("e1"),
        Some(&OddsQuote { home: Some(-150.0), away: Some(130.0) })
    );

    let cards = render(&view, &TimeWindow::default(), Utc::now());
    let competitors = &cards[0].events[0].competitors;
    assert_eq!(competitors[0].implied.as_deref(), Some("60.0%"));
    assert_eq!(competitors[1].implied.as_deref(), Some("43.5%"));
}

#[tokio::test]
async fn failing_odds_fetch_omits_key_but_keeps_event() {
    let feed = Arc::new(StubFeed {
        leagues: vec![league("1", "eng.1")],
        scoreboards: HashMap::from([("eng.1".to_string(), vec![live_event("e1")])]),
        failing_odds: vec!["e1".to_string()],
        ..Default::default()
    });

    let view = run(feed).await;
    assert!(!view.odds_by_event.contains_key("e1"));
    assert_eq!(view.events_for("1")[0].id, "e1");

    let cards = render(&view, &TimeWindow::default(), Utc::now());
    assert!(cards[0].events[0].competitors.iter().all(|c| c.implied.is_none()));
}

#[tokio::test]
async fn one_failing_scoreboard_is_contained() {
    let feed = Arc::new(StubFeed {
        leagues: vec![league("1", "eng.1"), league("2", "esp.1"), league("3", "ita.1")],
        scoreboards: HashMap::from([
            ("eng.1".to_string(), vec![event("a", "pre")]),
            ("esp.1".to_string(), vec![event("b", "pre")]),
            ("ita.1".to_string(), vec![event("c", "post"), event("d", "pre")]),
        ]),
        failing_scoreboards: vec!["esp.1".to_string()],
        ..Default::default()
    });

    let view = run(feed).await;
    assert_eq!(view.scores_by_league.len(), 3);
    assert_eq!(view.events_for("1").len(), 1);
    assert!(view.events_for("2").is_empty());
    assert_eq!(view.events_for("3").len(), 2);
}

#[tokio::test]
async fn odds_requested_only_for_live_events() {
    let feed = Arc::new(StubFeed {
        leagues: vec![league("1", "eng.1")],
        scoreboards: HashMap::from([(
            "eng.1".to_string(),
            vec![
                event("a", "pre"),
                live_event("b"),
                event("c", "post"),
                live_event("d"),
                event("e", "pre"),
            ],
        )]),
        odds: HashMap::from([("b".to_string(), None)]),
        ..Default::default()
    });

    let view = run(feed.clone()).await;

    let mut requested = feed.odds_requests();
    requested.sort();
    assert_eq!(requested, vec!["b", "d"]);
    // "b" had an empty odds response and "d" no entry at all.
    assert!(view.odds_by_event.is_empty());
}

#[tokio::test]
async fn each_cycle_replaces_the_snapshot() {
    let first = Arc::new(StubFeed {
        leagues: vec![league("1", "eng.1")],
        scoreboards: HashMap::from([("eng.1".to_string(), vec![live_event("e1")])]),
        odds: HashMap::from([("e1".to_string(), Some(OddsQuote { home: Some(-110.0), away: None }))]),
        ..Default::default()
    });
    let orch = AggregationOrchestrator::new(first, &PipelineConfig::default());
    let RefreshOutcome::Completed(v1) = orch.refresh().await else {
        panic!("first cycle should complete");
    };
    let RefreshOutcome::Completed(v2) = orch.refresh().await else {
        panic!("second cycle should complete");
    };

    assert_ne!(v1.cycle_id, v2.cycle_id);
    let state = orch.snapshot().await;
    assert_eq!(state.cycles_completed, 2);
    assert_eq!(state.last_cycle_id, Some(v2.cycle_id));
    assert_eq!(state.view.unwrap().cycle_id, v2.cycle_id);
}

#[tokio::test]
async fn bounded_fan_out_gives_same_result() {
    let feed = Arc::new(StubFeed {
        leagues: (0..10).map(|i| league(&i.to_string(), &format!("lg.{i}"))).collect(),
        scoreboards: (0..10)
            .map(|i| (format!("lg.{i}"), vec![live_event(&format!("ev{i}"))]))
            .collect(),
        odds: (0..10)
            .map(|i| (format!("ev{i}"), Some(OddsQuote { home: Some(100.0), away: Some(-120.0) })))
            .collect(),
        ..Default::default()
    });

    let cfg = PipelineConfig { catalog_limit: 26, max_concurrency: Some(3) };
    let orch = AggregationOrchestrator::new(feed, &cfg);
    let RefreshOutcome::Completed(view) = orch.refresh().await else {
        panic!("cycle should complete");
    };
    assert_eq!(view.scores_by_league.len(), 10);
    assert_eq!(view.odds_by_event.len(), 10);
    assert!(view.check_consistency().is_ok());
}
