//! # Refresh Scheduler
//!
//! A self-scheduling background loop that keeps the snapshot warm without
//! any traffic. Each cycle looks at the store and picks one state:
//!
//! - **Idle-wait**: no snapshot at all. Wait `idle_interval`, then try a
//!   bootstrap refresh if the store is still empty.
//! - **Scheduled-wait**: the snapshot is fresh. Sleep until its expiration.
//! - **Refresh**: the snapshot is stale. Run the pipeline now.
//! - **Retry**: a refresh failed, or it installed a puzzle that is already
//!   expired. Log it and wait `error_backoff`.
//!
//! Every wait also ends early when the store is replaced (for instance by a
//! query that refreshed inline), so the next cycle plans against the new
//! expiration. Errors never escape the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use super::clock::Clock;
use super::policy::RefreshPolicy;
use super::refresher::Refresher;
use super::store::SnapshotStore;
use crate::puzzle::model::PuzzleSnapshot;
use crate::puzzle::source::PuzzleSource;

/// What one scheduler cycle decided to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// The store is empty; wait this long before a bootstrap attempt.
    IdleWait(Duration),
    /// The snapshot is fresh; wait this long, until it expires.
    ScheduledWait(Duration),
    /// The snapshot is stale; refresh now.
    Refresh,
}

/// Picks the next state for `snapshot` at Unix time `now`.
pub fn plan(snapshot: Option<&PuzzleSnapshot>, now: i64, policy: &RefreshPolicy) -> SchedulerState {
    match snapshot {
        None => SchedulerState::IdleWait(policy.idle_interval),
        Some(current) => match current.expiration() {
            Some(expiration) if now < expiration => {
                SchedulerState::ScheduledWait(Duration::from_secs((expiration - now) as u64))
            }
            _ => SchedulerState::Refresh,
        },
    }
}

/// The background refresh loop. One per process.
pub struct RefreshScheduler<S, C> {
    refresher: Arc<Refresher<S, C>>,
    store: Arc<SnapshotStore>,
    clock: Arc<C>,
    policy: RefreshPolicy,
    changes: watch::Receiver<Option<Arc<PuzzleSnapshot>>>,
}

impl<S, C> RefreshScheduler<S, C>
where
    S: PuzzleSource,
    C: Clock,
{
    /// Creates a scheduler driving `refresher` with `clock` under `policy`.
    pub fn new(refresher: Arc<Refresher<S, C>>, clock: Arc<C>, policy: RefreshPolicy) -> Self {
        let store = Arc::clone(refresher.store());
        let changes = store.subscribe();
        Self {
            refresher,
            store,
            clock,
            policy,
            changes,
        }
    }

    /// Runs cycles until `shutdown` fires.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!("Refresh scheduler started");
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Refresh scheduler received shutdown signal.");
                    break;
                }
                state = self.run_once() => {
                    debug!(?state, "Scheduler cycle finished");
                }
            }
        }
    }

    /// Executes one cycle and returns the state it acted on.
    pub async fn run_once(&mut self) -> SchedulerState {
        let current = self.store.get();
        let state = plan(current.as_deref(), self.clock.now(), &self.policy);

        match state {
            SchedulerState::IdleWait(wait) => {
                info!("No data available, waiting {} seconds before retry", wait.as_secs());
                self.wait(wait).await;
                if self.store.get().is_none() {
                    self.refresh_or_back_off().await;
                }
            }
            SchedulerState::ScheduledWait(wait) => {
                info!("Scheduling next fetch in {} seconds", wait.as_secs());
                self.wait(wait).await;
            }
            SchedulerState::Refresh => {
                info!("Data expired, fetching immediately");
                self.refresh_or_back_off().await;
            }
        }

        state
    }

    async fn refresh_or_back_off(&mut self) {
        match self.refresher.refresh().await {
            Ok(snapshot) => {
                // Our own install must not cut the next wait short.
                self.changes.borrow_and_update();
                debug!(print_date = %snapshot.print_date(), "Background refresh complete");

                if !SnapshotStore::is_valid(Some(&*snapshot), self.clock.now()) {
                    warn!(
                        print_date = %snapshot.print_date(),
                        expiration = ?snapshot.expiration(),
                        "Fetched puzzle is already expired, retrying in {} seconds",
                        self.policy.error_backoff.as_secs()
                    );
                    self.wait(self.policy.error_backoff).await;
                }
            }
            Err(e) => {
                error!(kind = e.kind(), "Error in background task: {}", e);
                info!("Retrying in {} seconds", self.policy.error_backoff.as_secs());
                self.wait(self.policy.error_backoff).await;
            }
        }
    }

    /// Sleeps for `duration` or until the store is replaced.
    async fn wait(&mut self, duration: Duration) {
        let clock = Arc::clone(&self.clock);
        tokio::select! {
            _ = clock.sleep(duration) => {}
            changed = self.changes.changed() => {
                match changed {
                    Ok(()) => {
                        self.changes.borrow_and_update();
                        info!("Snapshot replaced elsewhere, re-planning");
                    }
                    // The store outlives the scheduler; fall back to the plain sleep.
                    Err(_) => clock.sleep(duration).await,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::model::{Side, ValidPuzzle};
    use serde_json::Map;

    fn snapshot(expiration: Option<i64>) -> PuzzleSnapshot {
        PuzzleSnapshot {
            puzzle: ValidPuzzle {
                our_solution: vec![],
                print_date: "2024-01-15".into(),
                sides: vec![Side::from("ABC")],
                date: "2024-01-15".into(),
                dictionary: vec![],
                expiration,
                extra: Map::new(),
            },
            all_solutions: vec![],
            one_word_solutions: vec![],
            perfect_solutions: vec![],
        }
    }

    #[test]
    fn empty_store_idles() {
        let policy = RefreshPolicy::default();
        assert_eq!(
            plan(None, 1_000, &policy),
            SchedulerState::IdleWait(Duration::from_secs(60))
        );
    }

    #[test]
    fn fresh_snapshot_waits_until_expiration() {
        let policy = RefreshPolicy::default();
        let current = snapshot(Some(4_600));
        assert_eq!(
            plan(Some(&current), 1_000, &policy),
            SchedulerState::ScheduledWait(Duration::from_secs(3_600))
        );
    }

    #[test]
    fn stale_or_undated_snapshot_refreshes() {
        let policy = RefreshPolicy::default();
        assert_eq!(
            plan(Some(&snapshot(Some(999))), 1_000, &policy),
            SchedulerState::Refresh
        );
        assert_eq!(
            plan(Some(&snapshot(Some(1_000))), 1_000, &policy),
            SchedulerState::Refresh
        );
        assert_eq!(plan(Some(&snapshot(None)), 1_000, &policy), SchedulerState::Refresh);
    }

    #[test]
    fn idle_interval_follows_policy() {
        let policy = RefreshPolicy::from_secs(5, 10);
        assert_eq!(
            plan(None, 0, &policy),
            SchedulerState::IdleWait(Duration::from_secs(5))
        );
    }
}
