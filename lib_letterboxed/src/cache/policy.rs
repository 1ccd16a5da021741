use std::time::Duration;

/// Intervals driving the refresh scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// How long to wait before retrying when no snapshot exists at all.
    pub idle_interval: Duration,
    /// How long to wait after a failed refresh.
    pub error_backoff: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            idle_interval: Duration::from_secs(60),
            error_backoff: Duration::from_secs(300),
        }
    }
}

impl RefreshPolicy {
    /// Builds a policy from whole seconds.
    pub fn from_secs(idle_secs: u64, backoff_secs: u64) -> Self {
        Self {
            idle_interval: Duration::from_secs(idle_secs),
            error_backoff: Duration::from_secs(backoff_secs),
        }
    }
}
