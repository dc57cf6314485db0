use async_trait::async_trait;
use auditsweep_core::AppResult;
use chrono::TimeDelta;

/// Port that deletes audit entries outside the retention window.
#[async_trait]
pub trait AuditTrimmer: Send + Sync {
    /// Deletes entries older than `max_age` and returns how many were removed.
    async fn trim_older_than(&self, max_age: TimeDelta) -> AppResult<u64>;
}
