//! # Query Handler
//!
//! Serves "give me today's puzzle and its solutions". A fresh snapshot is
//! returned as-is with no solving; anything else goes through the
//! single-flight refresher, so concurrent queries on a stale store share one
//! fetch.

use std::sync::Arc;

use tracing::info;

use super::clock::Clock;
use super::refresher::Refresher;
use super::store::SnapshotStore;
use crate::puzzle::error::PuzzleError;
use crate::puzzle::model::PuzzleSnapshot;
use crate::puzzle::source::PuzzleSource;

/// Read path over the store and its refresher.
pub struct QueryHandler<S, C> {
    refresher: Arc<Refresher<S, C>>,
    store: Arc<SnapshotStore>,
    clock: Arc<C>,
}

impl<S, C> Clone for QueryHandler<S, C> {
    fn clone(&self) -> Self {
        Self {
            refresher: Arc::clone(&self.refresher),
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S, C> QueryHandler<S, C>
where
    S: PuzzleSource,
    C: Clock,
{
    /// Serves from `refresher`'s store, judging freshness by `clock`.
    pub fn new(refresher: Arc<Refresher<S, C>>, clock: Arc<C>) -> Self {
        let store = Arc::clone(refresher.store());
        Self {
            refresher,
            store,
            clock,
        }
    }

    /// Returns a fresh snapshot, refreshing first when the store has none.
    ///
    /// # Errors
    /// The refresh failure, verbatim. A stale snapshot is never returned.
    pub async fn handle_query(&self) -> Result<Arc<PuzzleSnapshot>, PuzzleError> {
        let current = self.store.get();

        if SnapshotStore::is_valid(current.as_deref(), self.clock.now()) {
            if let Some(snapshot) = &current {
                info!("Returning cached data, for puzzle {}", snapshot.print_date());
                return Ok(Arc::clone(snapshot));
            }
        }

        let reason = if current.is_some() {
            "Puzzle has expired"
        } else {
            "No data found"
        };
        info!("Returning new data, for reason: {}", reason);
        self.refresher.refresh().await
    }

    /// The snapshot currently held, fresh or not.
    pub fn current(&self) -> Option<Arc<PuzzleSnapshot>> {
        self.store.get()
    }
}
