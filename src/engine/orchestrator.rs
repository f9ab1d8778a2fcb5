//! Refresh cycle orchestrator.
//!
//! Sequences catalog → scoreboards → live selection → odds into one
//! `AggregateView` and publishes it as the new `CycleState`. Consumers
//! only ever see a complete snapshot: the previous one while a cycle is
//! loading, the new one once it is ready.
//!
//! At most one cycle runs at a time. A trigger arriving while a cycle
//! is in flight is ignored (`RefreshOutcome::Skipped`); the running
//! cycle is neither cancelled nor followed by a queued one.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use super::catalog::LeagueCatalogFetcher;
use super::live::select_live;
use super::odds::OddsAggregator;
use super::scoreboard::ScoreboardAggregator;
use crate::config::PipelineConfig;
use crate::feed::SportsFeed;
use crate::types::{AggregateView, CycleError, CycleState, CycleStatus, RefreshOutcome};

/// Clears the in-flight flag when the cycle that claimed it ends.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The stateless half of the orchestrator: everything one cycle needs.
#[derive(Clone)]
struct Pipeline {
    feed: Arc<dyn SportsFeed>,
    catalog: LeagueCatalogFetcher,
    scoreboards: ScoreboardAggregator,
    odds: OddsAggregator,
}

impl Pipeline {
    async fn run(self, cycle_id: Uuid) -> AggregateView {
        let feed = self.feed.as_ref();

        // 1. Leagues
        let leagues = self.catalog.fetch(feed).await;

        // 2. Scoreboards (barrier 1)
        let scores_by_league = self.scoreboards.fetch_all(feed, &leagues).await;

        // 3. Live selection
        let live = select_live(&leagues, &scores_by_league);
        debug!(live = live.len(), "Live events selected");

        // 4. Odds (barrier 2)
        let odds_by_event = self.odds.fetch_all(feed, &live).await;

        AggregateView {
            cycle_id,
            completed_at: Utc::now(),
            leagues,
            scores_by_league,
            odds_by_event,
        }
    }
}

pub struct AggregationOrchestrator {
    pipeline: Pipeline,
    state: Arc<RwLock<CycleState>>,
    in_flight: Arc<AtomicBool>,
}

impl AggregationOrchestrator {
    pub fn new(feed: Arc<dyn SportsFeed>, cfg: &PipelineConfig) -> Self {
        Self {
            pipeline: Pipeline {
                feed,
                catalog: LeagueCatalogFetcher::new(cfg.catalog_limit),
                scoreboards: ScoreboardAggregator::new(cfg.max_concurrency),
                odds: OddsAggregator::new(cfg.max_concurrency),
            },
            state: Arc::new(RwLock::new(CycleState::default())),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Copy of the currently published state.
    pub async fn snapshot(&self) -> CycleState {
        self.state.read().await.clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one refresh cycle to completion, unless one is already running.
    pub async fn refresh(&self) -> RefreshOutcome {
        match self.try_claim() {
            Some(guard) => self.run_claimed(guard).await,
            None => {
                debug!("Refresh requested while a cycle is in flight, ignoring");
                RefreshOutcome::Skipped
            }
        }
    }

    /// Start a cycle in the background. Returns `false` if one was
    /// already running and nothing was started.
    pub fn spawn_refresh(self: &Arc<Self>) -> bool {
        let Some(guard) = self.try_claim() else {
            debug!("Refresh requested while a cycle is in flight, ignoring");
            return false;
        };
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.run_claimed(guard).await;
        });
        true
    }

    fn try_claim(&self) -> Option<InFlightGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(Arc::clone(&self.in_flight)))
    }

    async fn run_claimed(&self, _guard: InFlightGuard) -> RefreshOutcome {
        let cycle_id = Uuid::new_v4();
        self.run_cycle(cycle_id)
            .instrument(info_span!("cycle", %cycle_id))
            .await
    }

    async fn run_cycle(&self, cycle_id: Uuid) -> RefreshOutcome {
        self.publish_loading().await;
        info!("Starting refresh cycle");

        // The cycle runs as its own task so a panic anywhere inside it
        // surfaces as a cycle failure instead of unwinding the caller.
        let task = tokio::spawn(self.pipeline.clone().run(cycle_id).in_current_span());
        let result = match task.await {
            Ok(view) => view.check_consistency().map(|_| view),
            Err(e) if e.is_panic() => Err(CycleError::Panicked(panic_message(e.into_panic()))),
            Err(e) => Err(CycleError::Panicked(e.to_string())),
        };

        match result {
            Ok(view) => {
                let view = Arc::new(view);
                info!(
                    leagues = view.leagues.len(),
                    events = view.event_count(),
                    quoted = view.odds_by_event.len(),
                    "Refresh cycle complete"
                );
                self.publish_ready(Arc::clone(&view)).await;
                RefreshOutcome::Completed(view)
            }
            Err(e) => {
                error!(error = %e, "Refresh cycle failed");
                let message = e.to_string();
                self.publish_error(cycle_id, message.clone()).await;
                RefreshOutcome::Failed(message)
            }
        }
    }

    /// Keeps whatever view is published; a previous cycle's error does
    /// not carry over.
    async fn publish_loading(&self) {
        let mut state = self.state.write().await;
        *state = CycleState {
            status: CycleStatus::Loading,
            view: state.view.clone(),
            error: None,
            last_cycle_id: state.last_cycle_id,
            cycles_completed: state.cycles_completed,
            cycles_failed: state.cycles_failed,
        };
    }

    async fn publish_ready(&self, view: Arc<AggregateView>) {
        let mut state = self.state.write().await;
        *state = CycleState {
            status: CycleStatus::Ready,
            last_cycle_id: Some(view.cycle_id),
            view: Some(view),
            error: None,
            cycles_completed: state.cycles_completed + 1,
            cycles_failed: state.cycles_failed,
        };
    }

    async fn publish_error(&self, cycle_id: Uuid, message: String) {
        let mut state = self.state.write().await;
        *state = CycleState {
            status: CycleStatus::Error,
            view: None,
            error: Some(message),
            last_cycle_id: Some(cycle_id),
            cycles_completed: state.cycles_completed,
            cycles_failed: state.cycles_failed + 1,
        };
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
