use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use auditsweep_application::{
    AUDIT_TRIMMING_LOCK_NAME, AuditTrimmer, Clock, DistributedLockProvider, SweepCoordinator,
    SweepCoordinatorConfig, SweepOutcome,
};
use auditsweep_core::AppError;
use auditsweep_domain::AuditTrimmingSettings;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use super::InMemoryDistributedLockProvider;
use crate::{
    AuditLogEntryInput, InMemoryAuditLogRepository, InMemoryAuditTrimmingSettingsRepository,
};

struct ManualClock {
    now_millis: AtomicI64,
}

impl ManualClock {
    fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now_millis: AtomicI64::new(now.timestamp_millis()),
        }
    }

    fn advance(&self, delta: TimeDelta) {
        self.now_millis
            .fetch_add(delta.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

fn entry(resource_id: String, created_at: DateTime<Utc>) -> AuditLogEntryInput {
    AuditLogEntryInput {
        subject: "alice".to_owned(),
        action: "runtime.record.updated".to_owned(),
        resource_type: "runtime_record".to_owned(),
        resource_id,
        detail: None,
        created_at,
    }
}

struct Cluster {
    clock: Arc<ManualClock>,
    lock_provider: Arc<InMemoryDistributedLockProvider>,
    audit_log: Arc<InMemoryAuditLogRepository>,
    settings_repository: Arc<InMemoryAuditTrimmingSettingsRepository>,
}

impl Cluster {
    async fn seeded(expired_entries: usize, retained_entries: usize) -> Self {
        let clock = Arc::new(ManualClock::starting_at(reference_now()));
        let lock_provider = Arc::new(InMemoryDistributedLockProvider::new(clock.clone()));
        let audit_log = Arc::new(InMemoryAuditLogRepository::new(clock.clone()));
        let settings_repository = Arc::new(InMemoryAuditTrimmingSettingsRepository::new(
            AuditTrimmingSettings::new(TimeDelta::days(90), TimeDelta::hours(12), None)
                .unwrap_or_else(|_| panic!("valid settings")),
        ));

        for index in 0..expired_entries {
            audit_log
                .append_entry(entry(
                    format!("expired-{index}"),
                    reference_now() - TimeDelta::days(120),
                ))
                .await;
        }
        for index in 0..retained_entries {
            audit_log
                .append_entry(entry(
                    format!("retained-{index}"),
                    reference_now() - TimeDelta::days(10),
                ))
                .await;
        }

        Self {
            clock,
            lock_provider,
            audit_log,
            settings_repository,
        }
    }

    fn node(&self, holder_id: &str) -> SweepCoordinator {
        SweepCoordinator::new(
            SweepCoordinatorConfig::new(holder_id, 3_600)
                .unwrap_or_else(|_| panic!("valid config")),
            self.clock.clone(),
            self.lock_provider.clone(),
            self.audit_log.clone(),
            self.settings_repository.clone(),
        )
    }
}

#[tokio::test]
async fn lock_is_exclusive_until_released() {
    let clock = Arc::new(ManualClock::starting_at(reference_now()));
    let provider = InMemoryDistributedLockProvider::new(clock);

    let Ok(Some(first)) = provider.try_acquire("job", "node-a", 60).await else {
        panic!("first acquire should succeed");
    };

    let same_holder = provider.try_acquire("job", "node-a", 60).await;
    assert!(matches!(same_holder, Ok(None)));

    let other_holder = provider.try_acquire("job", "node-b", 60).await;
    assert!(matches!(other_holder, Ok(None)));

    assert!(provider.release(&first).await.is_ok());
    assert!(provider.release(&first).await.is_ok());

    let second = provider.try_acquire("job", "node-b", 60).await;
    assert!(matches!(second, Ok(Some(ref lock)) if lock.holder_id == "node-b"));
}

#[tokio::test]
async fn expired_lease_is_reclaimed_and_stale_release_is_ignored() {
    let clock = Arc::new(ManualClock::starting_at(reference_now()));
    let provider = InMemoryDistributedLockProvider::new(clock.clone());

    let Ok(Some(crashed)) = provider.try_acquire("job", "node-a", 60).await else {
        panic!("first acquire should succeed");
    };

    clock.advance(TimeDelta::seconds(59));
    assert!(matches!(
        provider.try_acquire("job", "node-b", 60).await,
        Ok(None)
    ));

    clock.advance(TimeDelta::seconds(1));
    let Ok(Some(takeover)) = provider.try_acquire("job", "node-b", 60).await else {
        panic!("expired lease should be reclaimed");
    };
    assert_ne!(takeover.token, crashed.token);

    assert!(provider.release(&crashed).await.is_ok());
    assert!(matches!(
        provider.try_acquire("job", "node-c", 60).await,
        Ok(None)
    ));
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let clock = Arc::new(ManualClock::starting_at(reference_now()));
    let provider = InMemoryDistributedLockProvider::new(clock);

    assert!(matches!(
        provider.try_acquire("", "node-a", 60).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        provider.try_acquire("job", " ", 60).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        provider.try_acquire("job", "node-a", 0).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn ninety_day_retention_trims_once_and_repeat_deletes_nothing() {
    let cluster = Cluster::seeded(42, 3).await;
    let node = cluster.node("node-a");

    let outcome = node.sweep().await;

    let SweepOutcome::Trimmed(report) = outcome else {
        panic!("expected trimmed outcome, got {outcome:?}");
    };
    assert_eq!(report.deleted_count, 42);
    assert_eq!(report.completed_at, reference_now());
    assert_eq!(cluster.audit_log.entry_count().await, 3);

    let repeat_trim = cluster.audit_log.trim_older_than(TimeDelta::days(90)).await;
    assert_eq!(repeat_trim.unwrap_or(u64::MAX), 0);

    cluster.clock.advance(TimeDelta::seconds(1));
    let repeat_sweep = node.sweep().await;
    assert!(matches!(repeat_sweep, SweepOutcome::SkippedNotDue { .. }));
    assert_eq!(cluster.audit_log.entry_count().await, 3);
}

#[tokio::test]
async fn crashed_holder_delays_trim_only_until_lease_expires() {
    let cluster = Cluster::seeded(2, 1).await;

    let crashed = cluster
        .lock_provider
        .try_acquire(AUDIT_TRIMMING_LOCK_NAME, "node-a", 3_600)
        .await;
    assert!(matches!(crashed, Ok(Some(_))));

    let survivor = cluster.node("node-b");
    assert_eq!(survivor.sweep().await, SweepOutcome::SkippedLockHeld);
    assert_eq!(cluster.audit_log.entry_count().await, 3);

    cluster.clock.advance(TimeDelta::seconds(3_600));
    let outcome = survivor.sweep().await;

    assert!(matches!(outcome, SweepOutcome::Trimmed(ref report) if report.deleted_count == 2));
    assert_eq!(cluster.audit_log.entry_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_nodes_never_trim_twice() {
    let cluster = Cluster::seeded(10, 2).await;

    let sweeps = (0..6)
        .map(|index| {
            let node = cluster.node(format!("node-{index}").as_str());
            tokio::spawn(async move { node.sweep().await })
        })
        .collect::<Vec<_>>();

    let mut trimmed = 0;
    for sweep in sweeps {
        let outcome = sweep
            .await
            .unwrap_or_else(|error| panic!("sweep task failed: {error}"));
        match outcome {
            SweepOutcome::Trimmed(report) => {
                trimmed += 1;
                assert_eq!(report.deleted_count, 10);
            }
            SweepOutcome::SkippedLockHeld | SweepOutcome::SkippedNotDue { .. } => {}
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    assert_eq!(trimmed, 1);
    assert_eq!(cluster.audit_log.entry_count().await, 2);
}
