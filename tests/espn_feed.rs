//! `EspnFeed` against an in-process axum server standing in for ESPN.

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use matchday::config::{PipelineConfig, UpstreamConfig};
use matchday::engine::orchestrator::AggregationOrchestrator;
use matchday::feed::espn::EspnFeed;
use matchday::feed::SportsFeed;
use matchday::types::{League, OddsQuote, RefreshOutcome};

async fn leagues() -> Json<serde_json::Value> {
    let items: Vec<_> = (0..30)
        .map(|i| {
            let slug = if i == 0 { "eng.1".to_string() } else { format!("lg.{i}") };
            json!({"id": i.to_string(), "name": format!("League {i}"),
                   "abbreviation": format!("L{i}"), "slug": slug, "$ref": "ignored"})
        })
        .collect();
    Json(json!({"count": items.len(), "items": items}))
}

async fn scoreboard(Path(slug): Path<String>) -> impl IntoResponse {
    match slug.as_str() {
        "eng.1" => Json(json!({
            "leagues": [],
            "events": [{
                "id": "e1",
                "date": Utc::now().format("%Y-%m-%dT%H:%MZ").to_string(),
                "status": {"type": {"state": "in", "shortDetail": "61'"}},
                "competitions": [{"competitors": [
                    {"id": "1", "homeAway": "home", "team": {"displayName": "Arsenal"}, "score": "2"},
                    {"id": "2", "homeAway": "away", "team": {"displayName": "Chelsea"}, "score": "0"}
                ]}]
            }, {
                "id": "e2",
                "status": {"type": {"state": "in"}}
            }]
        }))
        .into_response(),
        "lg.1" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        "lg.2" => Json(json!({"unexpected": true})).into_response(),
        "lg.3" => "not json".into_response(),
        _ => Json(json!([])).into_response(),
    }
}

async fn odds(Path((_slug, event_id, _comp)): Path<(String, String, String)>) -> impl IntoResponse {
    match event_id.as_str() {
        "e1" => Json(json!({"items": [{
            "provider": {"name": "ESPN BET"},
            "homeTeamOdds": {"current": {"moneyLine": {"american": "-150"}}},
            "awayTeamOdds": {"current": {"moneyLine": {"american": "+130"}}}
        }]}))
        .into_response(),
        _ => (StatusCode::NOT_FOUND, "no odds").into_response(),
    }
}

/// Serve the fake upstream on an ephemeral port and return its base URL.
async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/core/sports/soccer/leagues", get(leagues))
        .route("/site/sports/soccer/:slug/scoreboard", get(scoreboard))
        .route(
            "/core/sports/soccer/leagues/:slug/events/:event_id/competitions/:comp/odds",
            get(odds),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn feed_for(base: &str) -> EspnFeed {
    EspnFeed::new(&UpstreamConfig {
        core_base_url: format!("{base}/core"),
        site_base_url: format!("{base}/site"),
        request_timeout_secs: 5,
        ..UpstreamConfig::default()
    })
    .unwrap()
}

fn league(slug: &str) -> League {
    League {
        id: slug.to_string(),
        name: String::new(),
        abbreviation: String::new(),
        slug: slug.to_string(),
    }
}

#[tokio::test]
async fn fetches_and_parses_each_endpoint() {
    let base = spawn_upstream().await;
    let feed = feed_for(&base);

    let leagues = feed.fetch_leagues().await.unwrap();
    assert_eq!(leagues.len(), 30);
    assert_eq!(leagues[0].slug, "eng.1");

    let events = feed.fetch_scoreboard(&league("eng.1")).await.unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].is_live());

    let quote = feed.fetch_odds(&league("eng.1"), "e1").await.unwrap();
    assert_eq!(quote, Some(OddsQuote { home: Some(-150.0), away: Some(130.0) }));
}

#[tokio::test]
async fn upstream_failures_surface_as_errors() {
    let base = spawn_upstream().await;
    let feed = feed_for(&base);

    assert!(feed.fetch_scoreboard(&league("lg.1")).await.is_err());
    assert!(feed.fetch_scoreboard(&league("lg.2")).await.is_err());
    assert!(feed.fetch_scoreboard(&league("lg.3")).await.is_err());
    assert!(feed.fetch_odds(&league("eng.1"), "e2").await.is_err());
}

#[tokio::test]
async fn full_cycle_against_fake_upstream() {
    let base = spawn_upstream().await;
    let feed = Arc::new(feed_for(&base));
    let orch = AggregationOrchestrator::new(feed, &PipelineConfig::default());

    let RefreshOutcome::Completed(view) = orch.refresh().await else {
        panic!("cycle should complete");
    };

    assert_eq!(view.leagues.len(), 26);
    assert_eq!(view.scores_by_league.len(), 26);
    assert_eq!(view.events_for("0").len(), 2);
    for failing in ["1", "2", "3"] {
        assert!(view.events_for(failing).is_empty());
    }
    assert_eq!(view.odds_by_event.len(), 1);
    assert_eq!(view.odds_by_event["e1"].home, Some(-150.0));
}

#[tokio::test]
async fn unreachable_upstream_yields_empty_snapshot() {
    // Nothing listens on port 9 of localhost in the test environment.
    let feed = Arc::new(feed_for("http://127.0.0.1:9"));
    let orch = AggregationOrchestrator::new(feed, &PipelineConfig::default());

    let RefreshOutcome::Completed(view) = orch.refresh().await else {
        panic!("an empty catalog is still a completed cycle");
    };
    assert!(view.leagues.is_empty());
}
