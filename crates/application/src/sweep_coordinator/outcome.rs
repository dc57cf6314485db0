use chrono::{DateTime, Utc};

/// Summary of one completed trim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditTrimReport {
    /// Number of audit entries deleted.
    pub deleted_count: u64,
    /// Entries created before this instant were outside retention.
    pub cutoff: DateTime<Utc>,
    /// Completion time recorded as the last run.
    pub completed_at: DateTime<Utc>,
}

/// Step of a sweep that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStage {
    /// Talking to the distributed lock backend.
    LockAcquisition,
    /// Loading the trimming settings snapshot.
    SettingsLoad,
    /// Deleting expired audit entries.
    Trim,
    /// Recording the last run after a successful trim.
    SettingsPersist,
}

impl SweepStage {
    /// Returns a stable label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LockAcquisition => "lock_acquisition",
            Self::SettingsLoad => "settings_load",
            Self::Trim => "trim",
            Self::SettingsPersist => "settings_persist",
        }
    }
}

/// Error captured inside a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepFailure {
    /// Step that failed.
    pub stage: SweepStage,
    /// Rendered error message.
    pub message: String,
}

/// Result of one sweep attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The trim ran and its completion time was recorded.
    Trimmed(AuditTrimReport),
    /// Another sweep is already running in this process.
    SkippedInProgress,
    /// Another node (or this one) holds the distributed lock.
    SkippedLockHeld,
    /// The minimum run interval has not elapsed since the last trim.
    SkippedNotDue {
        /// When the next trim becomes due.
        next_due_at: Option<DateTime<Utc>>,
    },
    /// The sweep failed; the error was logged and swallowed.
    Failed(SweepFailure),
}

impl SweepOutcome {
    /// Returns a stable label for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trimmed(_) => "trimmed",
            Self::SkippedInProgress => "skipped_in_progress",
            Self::SkippedLockHeld => "skipped_lock_held",
            Self::SkippedNotDue { .. } => "skipped_not_due",
            Self::Failed(_) => "failed",
        }
    }
}
