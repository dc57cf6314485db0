use async_trait::async_trait;
use auditsweep_core::AppResult;
use auditsweep_domain::AuditTrimmingSettings;
use chrono::{DateTime, Utc};

/// Repository port for the audit trimming policy and run bookkeeping.
#[async_trait]
pub trait AuditTrimmingSettingsRepository: Send + Sync {
    /// Loads a fresh settings snapshot.
    async fn load_settings(&self) -> AppResult<AuditTrimmingSettings>;

    /// Records the completion time of a successful trim.
    ///
    /// Only the last-run timestamp is written so concurrent edits to the
    /// policy fields are never overwritten.
    async fn record_last_run(&self, completed_at: DateTime<Utc>) -> AppResult<()>;
}
