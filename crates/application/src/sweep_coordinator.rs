//! Audit trail trimming sweep coordination.
//!
//! A sweep passes four gates in order: a process-local re-entrancy guard, a
//! cluster-wide distributed lock, the due-time check against the last
//! successful run, and finally the trim itself followed by the last-run
//! update. Every gate short-circuits without side effects, and every error
//! past the local guard is logged and folded into [`SweepOutcome::Failed`].

mod config;
mod guard;
mod outcome;


use std::sync::Arc;

use chrono::TimeDelta;
use tokio::sync::Mutex;
use tracing::{debug, error, info, trace, warn};

use crate::audit_trimming_ports::{
    AuditTrimmer, AuditTrimmingSettingsRepository, Clock, DistributedLockProvider,
};

pub use config::{AUDIT_TRIMMING_LOCK_NAME, DEFAULT_LEASE_SECONDS, SweepCoordinatorConfig};
pub use guard::DistributedLockGuard;
pub use outcome::{AuditTrimReport, SweepFailure, SweepOutcome, SweepStage};

/// Application service that runs audit trimming at most once cluster-wide.
///
/// Clones share the same local guard and therefore behave as one process.
#[derive(Clone)]
pub struct SweepCoordinator {
    config: SweepCoordinatorConfig,
    local_guard: Arc<Mutex<()>>,
    clock: Arc<dyn Clock>,
    lock_provider: Arc<dyn DistributedLockProvider>,
    trimmer: Arc<dyn AuditTrimmer>,
    settings_repository: Arc<dyn AuditTrimmingSettingsRepository>,
}

impl SweepCoordinator {
    /// Creates a coordinator with its own local guard.
    #[must_use]
    pub fn new(
        config: SweepCoordinatorConfig,
        clock: Arc<dyn Clock>,
        lock_provider: Arc<dyn DistributedLockProvider>,
        trimmer: Arc<dyn AuditTrimmer>,
        settings_repository: Arc<dyn AuditTrimmingSettingsRepository>,
    ) -> Self {
        Self {
            config,
            local_guard: Arc::new(Mutex::new(())),
            clock,
            lock_provider,
            trimmer,
            settings_repository,
        }
    }

    /// Returns the coordinator configuration.
    #[must_use]
    pub fn config(&self) -> &SweepCoordinatorConfig {
        &self.config
    }

    /// Runs one sweep attempt.
    ///
    /// Never returns an error: failures are logged and reported through the
    /// outcome, and the next trigger tick is the retry.
    pub async fn sweep(&self) -> SweepOutcome {
        let Ok(_local_guard) = self.local_guard.try_lock() else {
            trace!(
                lock_name = %self.config.lock_name(),
                "audit trimming sweep already running in this process"
            );
            return SweepOutcome::SkippedInProgress;
        };

        debug!(lock_name = %self.config.lock_name(), "beginning audit trimming sweep");

        let outcome = self.sweep_under_distributed_lock().await;
        if let SweepOutcome::Failed(failure) = &outcome {
            error!(
                lock_name = %self.config.lock_name(),
                holder_id = %self.config.holder_id(),
                stage = failure.stage.as_str(),
                error = %failure.message,
                "audit trimming sweep failed"
            );
        }

        debug!(
            lock_name = %self.config.lock_name(),
            outcome = outcome.as_str(),
            "ending audit trimming sweep"
        );
        outcome
    }

    async fn sweep_under_distributed_lock(&self) -> SweepOutcome {
        let guard = match DistributedLockGuard::acquire(
            Arc::clone(&self.lock_provider),
            self.config.lock_name(),
            self.config.holder_id(),
            self.config.lease_seconds(),
        )
        .await
        {
            Ok(Some(guard)) => guard,
            Ok(None) => {
                debug!(
                    lock_name = %self.config.lock_name(),
                    "audit trimming lock is held by another sweep"
                );
                return SweepOutcome::SkippedLockHeld;
            }
            Err(error) => {
                return SweepOutcome::Failed(SweepFailure {
                    stage: SweepStage::LockAcquisition,
                    message: error.to_string(),
                });
            }
        };

        if let Some(lock) = guard.lock() {
            debug!(
                lock_name = %lock.name,
                holder_id = %lock.holder_id,
                lease_seconds = lock.lease_seconds,
                "acquired audit trimming lock"
            );
        }

        let outcome = self.trim_if_due().await;

        if let Err(error) = guard.release().await {
            warn!(
                lock_name = %self.config.lock_name(),
                error = %error,
                "failed to release audit trimming lock, waiting for lease expiry"
            );
        }

        outcome
    }

    async fn trim_if_due(&self) -> SweepOutcome {
        let settings = match self.settings_repository.load_settings().await {
            Ok(settings) => settings,
            Err(error) => {
                return SweepOutcome::Failed(SweepFailure {
                    stage: SweepStage::SettingsLoad,
                    message: error.to_string(),
                });
            }
        };

        let now = self.clock.now();
        if !settings.is_due_at(now) {
            let next_due_at = settings.next_due_at();
            debug!(
                last_run_utc = ?settings.last_run_utc(),
                next_due_at = ?next_due_at,
                "audit trimming is not due yet"
            );
            return SweepOutcome::SkippedNotDue { next_due_at };
        }

        let retention_period = settings.retention_period();
        let cutoff = settings.cutoff_at(now);
        debug!(cutoff = %cutoff, "starting audit trail trimming");

        let deleted_count = match self.trimmer.trim_older_than(retention_period).await {
            Ok(deleted_count) => deleted_count,
            Err(error) => {
                return SweepOutcome::Failed(SweepFailure {
                    stage: SweepStage::Trim,
                    message: error.to_string(),
                });
            }
        };

        let completed_at = self.clock.now();
        debug!(deleted_count, "audit trail trimming completed");

        let lease = TimeDelta::seconds(i64::from(self.config.lease_seconds()));
        if completed_at.signed_duration_since(now) > lease {
            warn!(
                lock_name = %self.config.lock_name(),
                lease_seconds = self.config.lease_seconds(),
                started_at = %now,
                completed_at = %completed_at,
                "audit trimming outlasted its lock lease"
            );
        }

        if let Err(error) = self.settings_repository.record_last_run(completed_at).await {
            return SweepOutcome::Failed(SweepFailure {
                stage: SweepStage::SettingsPersist,
                message: format!(
                    "{deleted_count} audit entries were deleted but the run was not recorded: {error}"
                ),
            });
        }

        info!(
            deleted_count,
            cutoff = %cutoff,
            completed_at = %completed_at,
            "audit trail trimmed"
        );

        SweepOutcome::Trimmed(AuditTrimReport {
            deleted_count,
            cutoff,
            completed_at,
        })
    }
}
