//! # Single-Flight Refresher
//!
//! Runs the refresh pipeline (fetch → validate → solve → install) with at
//! most one attempt in flight.
//!
//! ## Coordination
//! - Callers queue on an async gate. Whoever holds it starts the pipeline.
//! - The pipeline runs in its own task which owns the gate until the outcome
//!   is recorded. A caller that goes away (a dropped request) does not cancel
//!   it, and nobody else can start a second attempt meanwhile.
//! - A caller that arrived while an attempt was running receives that
//!   attempt's outcome (snapshot or error) instead of starting another one.
//! - A caller that gets the gate after a fresh snapshot was installed by
//!   someone else returns that snapshot without fetching.
//!
//! Solving and writing the record are blocking work and run on the blocking pool.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use super::clock::Clock;
use super::store::SnapshotStore;
use crate::puzzle::error::PuzzleError;
use crate::puzzle::model::{PuzzleSnapshot, RawPuzzle};
use crate::puzzle::solver::solve;
use crate::puzzle::source::PuzzleSource;
use crate::puzzle::validate::validate;
use crate::utils::timing::{timed, timed_async};

type Outcome = Result<Arc<PuzzleSnapshot>, PuzzleError>;

/// The result of the most recent completed attempt.
struct Flight {
    attempt: u64,
    outcome: Outcome,
}

/// Validates `raw` and solves it into a snapshot ready to install.
pub fn build_snapshot(raw: RawPuzzle) -> Result<PuzzleSnapshot, PuzzleError> {
    let puzzle = validate(raw)?;
    let solutions = timed("solve_letter_boxed_data", || {
        solve(&puzzle.sides, &puzzle.dictionary)
    })?;

    Ok(PuzzleSnapshot {
        puzzle,
        all_solutions: solutions.all_solutions,
        one_word_solutions: solutions.one_word_solutions,
        perfect_solutions: solutions.perfect_solutions,
    })
}

/// Single-flight owner of the refresh pipeline.
pub struct Refresher<S, C> {
    source: S,
    store: Arc<SnapshotStore>,
    clock: Arc<C>,
    gate: Arc<Mutex<Option<Flight>>>,
    completed: AtomicU64,
}

impl<S, C> Refresher<S, C>
where
    S: PuzzleSource,
    C: Clock,
{
    /// Wires the pipeline to its source, store and clock.
    pub fn new(source: S, store: Arc<SnapshotStore>, clock: Arc<C>) -> Self {
        Self {
            source,
            store,
            clock,
            gate: Arc::new(Mutex::new(None)),
            completed: AtomicU64::new(0),
        }
    }

    /// The store this refresher installs into.
    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Number of pipeline attempts that have run to completion or failure.
    pub fn attempts(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Makes sure a fresh snapshot is installed, fetching only if needed.
    ///
    /// Dropping the returned future does not abort an attempt it started.
    ///
    /// # Errors
    /// The [`PuzzleError`] of the attempt this call ran or joined. The store
    /// keeps its previous snapshot on failure.
    pub async fn refresh(self: &Arc<Self>) -> Result<Arc<PuzzleSnapshot>, PuzzleError> {
        let seen = self.completed.load(Ordering::Acquire);
        let gate = Arc::clone(&self.gate).lock_owned().await;

        if let Some(flight) = gate.as_ref() {
            if flight.attempt > seen {
                debug!(attempt = flight.attempt, "Joined concurrent refresh");
                return flight.outcome.clone();
            }
        }

        let current = self.store.get();
        if SnapshotStore::is_valid(current.as_deref(), self.clock.now()) {
            if let Some(fresh) = &current {
                debug!(print_date = %fresh.print_date(), "Snapshot already fresh, skipping fetch");
                return Ok(Arc::clone(fresh));
            }
        }

        let this = Arc::clone(self);
        tokio::spawn(async move { this.lead(gate).await })
            .await
            .map_err(|e| PuzzleError::Solver(format!("refresh task failed: {}", e)))?
    }

    /// Runs one attempt and records its outcome before releasing the gate.
    async fn lead(&self, mut gate: OwnedMutexGuard<Option<Flight>>) -> Outcome {
        let outcome = self.run_pipeline().await;
        let attempt = self.completed.load(Ordering::Acquire) + 1;
        *gate = Some(Flight {
            attempt,
            outcome: outcome.clone(),
        });
        self.completed.store(attempt, Ordering::Release);
        outcome
    }

    async fn run_pipeline(&self) -> Outcome {
        timed_async("refresh", async {
            let raw = self.source.fetch_puzzle().await?;
            let store = Arc::clone(&self.store);
            let snapshot = tokio::task::spawn_blocking(move || {
                let snapshot = build_snapshot(raw)?;
                Ok::<_, PuzzleError>(store.replace(snapshot))
            })
            .await
            .map_err(|e| PuzzleError::Solver(format!("solver task failed: {}", e)))??;

            info!(
                print_date = %snapshot.print_date(),
                expiration = ?snapshot.expiration(),
                all = snapshot.all_solutions.len(),
                one_word = snapshot.one_word_solutions.len(),
                perfect = snapshot.perfect_solutions.len(),
                "Successfully fetched and saved new data"
            );
            Ok::<_, PuzzleError>(snapshot)
        })
        .await
    }
}
