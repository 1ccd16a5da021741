//! Stage timing.
//!
//! Every stage of a refresh (fetch, validate, solve) is wrapped so that its
//! duration ends up in the log as `"<stage> took: <secs> seconds"`.

use std::future::Future;
use std::time::Instant;

use chrono::Utc;
use tracing::info;

/// Current Unix time in whole seconds.
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Runs `f` and logs how long it took under `label`.
pub fn timed<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let started = Instant::now();
    let out = f();
    info!("{} took: {} seconds", label, started.elapsed().as_secs_f64());
    out
}

/// Async counterpart of [`timed`].
pub async fn timed_async<T, F>(label: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    let started = Instant::now();
    let out = fut.await;
    info!("{} took: {} seconds", label, started.elapsed().as_secs_f64());
    out
}
