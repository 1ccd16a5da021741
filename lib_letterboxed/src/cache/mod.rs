//! # Puzzle Freshness Cache
//!
//! Keeps exactly one solved puzzle warm and serves it.
//!
//! ## Core Components:
//!
//! - **`store`**: `SnapshotStore`, the single current snapshot behind a
//!   `watch` channel, mirrored to one JSON record on disk.
//! - **`refresher`**: `Refresher`, the fetch → validate → solve → install
//!   pipeline behind a single-flight gate, so overlapping callers share one
//!   attempt.
//! - **`scheduler`**: `RefreshScheduler`, the background state machine
//!   (idle-wait, scheduled-wait, refresh, retry) that refreshes the puzzle
//!   when it expires even without traffic.
//! - **`query`**: `QueryHandler`, the read path that refreshes inline on a
//!   miss instead of serving stale data.
//! - **`clock`**: the time source all of the above are driven by, so the
//!   state machine can be exercised without real sleeps.
//! - **`policy`**: idle and backoff intervals.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Time source abstraction.
pub mod clock;
/// Idle and backoff intervals.
pub mod policy;
/// Read path with inline refresh on miss.
pub mod query;
/// Single-flight refresh pipeline.
pub mod refresher;
/// Background refresh state machine.
pub mod scheduler;
/// Single-snapshot store with on-disk persistence.
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use policy::RefreshPolicy;
pub use query::QueryHandler;
pub use refresher::{build_snapshot, Refresher};
pub use scheduler::{plan, RefreshScheduler, SchedulerState};
pub use store::{SnapshotStore, StoreError};
