use std::sync::Arc;

use lib_letterboxed::cache::{
    QueryHandler, RefreshPolicy, RefreshScheduler, Refresher, SnapshotStore, SystemClock,
};
use lib_letterboxed::puzzle::{NytPuzzleSource, PuzzleError};

use crate::letterboxed_logic::config::Config;

pub type Query = QueryHandler<NytPuzzleSource, SystemClock>;
pub type Scheduler = RefreshScheduler<NytPuzzleSource, SystemClock>;

// Shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub query: Query,
    refresher: Arc<Refresher<NytPuzzleSource, SystemClock>>,
    clock: Arc<SystemClock>,
    policy: RefreshPolicy,
}

impl AppState {
    /// Opens the persisted record and wires the refresh pipeline for `config`.
    pub fn from_config(config: &Config) -> Result<Self, PuzzleError> {
        let url = config.source_url.as_deref().unwrap_or(lib_letterboxed::puzzle::DEFAULT_SOURCE_URL);
        let source = NytPuzzleSource::new(url, config.client_options())?;

        let store = Arc::new(match &config.data_file {
            Some(path) => SnapshotStore::open(path),
            None => SnapshotStore::in_memory(),
        });
        let clock = Arc::new(SystemClock);
        let refresher = Arc::new(Refresher::new(source, store, Arc::clone(&clock)));

        Ok(Self {
            query: QueryHandler::new(Arc::clone(&refresher), Arc::clone(&clock)),
            refresher,
            clock,
            policy: config.refresh_policy(),
        })
    }

    pub fn scheduler(&self) -> Scheduler {
        RefreshScheduler::new(Arc::clone(&self.refresher), Arc::clone(&self.clock), self.policy)
    }
}
