//! Audit trail trimming policy and run bookkeeping.

use auditsweep_core::{AppError, AppResult};
use chrono::{DateTime, TimeDelta, Utc};

/// Retention window applied when no policy has been stored yet.
pub const DEFAULT_RETENTION_DAYS: i32 = 10;

/// Minimum spacing between trims applied when no policy has been stored yet.
pub const DEFAULT_MINIMUM_RUN_INTERVAL_HOURS: i32 = 12;

/// Snapshot of the audit trimming policy plus the last successful run.
///
/// Both durations are non-negative. `last_run_utc` is only ever advanced by
/// the sweep that completed a trim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditTrimmingSettings {
    retention_period: TimeDelta,
    minimum_run_interval: TimeDelta,
    last_run_utc: Option<DateTime<Utc>>,
}

impl AuditTrimmingSettings {
    /// Creates validated trimming settings.
    pub fn new(
        retention_period: TimeDelta,
        minimum_run_interval: TimeDelta,
        last_run_utc: Option<DateTime<Utc>>,
    ) -> AppResult<Self> {
        if retention_period < TimeDelta::zero() {
            return Err(AppError::Validation(
                "audit retention period must not be negative".to_owned(),
            ));
        }

        if minimum_run_interval < TimeDelta::zero() {
            return Err(AppError::Validation(
                "audit trimming minimum run interval must not be negative".to_owned(),
            ));
        }

        Ok(Self {
            retention_period,
            minimum_run_interval,
            last_run_utc,
        })
    }

    /// Builds settings from their persisted units (whole days and whole hours).
    pub fn from_stored(
        retention_days: i32,
        minimum_run_interval_hours: i32,
        last_run_utc: Option<DateTime<Utc>>,
    ) -> AppResult<Self> {
        let retention_period = TimeDelta::try_days(i64::from(retention_days)).ok_or_else(|| {
            AppError::Validation(format!(
                "audit retention_days '{retention_days}' is out of range"
            ))
        })?;
        let minimum_run_interval = TimeDelta::try_hours(i64::from(minimum_run_interval_hours))
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "audit minimum_run_interval_hours '{minimum_run_interval_hours}' is out of range"
                ))
            })?;

        Self::new(retention_period, minimum_run_interval, last_run_utc)
    }

    /// Returns how long audit entries are kept.
    #[must_use]
    pub fn retention_period(&self) -> TimeDelta {
        self.retention_period
    }

    /// Returns the minimum spacing between two successful trims.
    #[must_use]
    pub fn minimum_run_interval(&self) -> TimeDelta {
        self.minimum_run_interval
    }

    /// Returns when the last successful trim completed, if ever.
    #[must_use]
    pub fn last_run_utc(&self) -> Option<DateTime<Utc>> {
        self.last_run_utc
    }

    /// Returns whether a trim may run at `now`.
    ///
    /// A policy that never ran is always due. A last run recorded in the
    /// future (clock skew between nodes) is treated as not yet due.
    #[must_use]
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        match self.last_run_utc {
            None => true,
            Some(last_run) => now.signed_duration_since(last_run) >= self.minimum_run_interval,
        }
    }

    /// Returns the earliest instant the next trim becomes due.
    #[must_use]
    pub fn next_due_at(&self) -> Option<DateTime<Utc>> {
        self.last_run_utc
            .and_then(|last_run| last_run.checked_add_signed(self.minimum_run_interval))
    }

    /// Returns the instant before which audit entries fall outside retention.
    #[must_use]
    pub fn cutoff_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.retention_period)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl Default for AuditTrimmingSettings {
    fn default() -> Self {
        Self {
            retention_period: TimeDelta::days(i64::from(DEFAULT_RETENTION_DAYS)),
            minimum_run_interval: TimeDelta::hours(i64::from(DEFAULT_MINIMUM_RUN_INTERVAL_HOURS)),
            last_run_utc: None,
        }
    }
}
