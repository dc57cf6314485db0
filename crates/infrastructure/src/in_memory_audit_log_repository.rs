use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;

use auditsweep_application::{AuditTrimmer, Clock};
use auditsweep_core::AppResult;

use crate::AuditLogEntryInput;

/// In-memory audit log used for single-process runs and tests.
pub struct InMemoryAuditLogRepository {
    clock: Arc<dyn Clock>,
    entries: RwLock<Vec<AuditLogEntryInput>>,
}

impl InMemoryAuditLogRepository {
    /// Creates an empty audit log measured against `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Appends one audit entry.
    pub async fn append_entry(&self, entry: AuditLogEntryInput) {
        self.entries.write().await.push(entry);
    }

    /// Returns the number of stored entries.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl AuditTrimmer for InMemoryAuditLogRepository {
    async fn trim_older_than(&self, max_age: TimeDelta) -> AppResult<u64> {
        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(max_age)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|entry| entry.created_at >= cutoff);

        Ok(u64::try_from(before - entries.len()).unwrap_or(u64::MAX))
    }
}
