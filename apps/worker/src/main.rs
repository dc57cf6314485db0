//! Auditsweep trimming worker runtime.

#![forbid(unsafe_code)]

mod worker_config;

use std::sync::Arc;
use std::time::Duration;

use auditsweep_application::{
    DistributedLockProvider, SweepCoordinator, SweepCoordinatorConfig, SweepOutcome,
};
use auditsweep_core::{AppError, AppResult};
use auditsweep_infrastructure::{
    PostgresAuditLogRepository, PostgresAuditTrimmingSettingsRepository,
    PostgresDistributedLockProvider, RedisDistributedLockProvider, SystemClock,
};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::worker_config::{LockBackend, WorkerConfig, WorkerMode};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.mode == WorkerMode::MigrateOnly {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let coordinator = build_sweep_coordinator(&config, pool)?;

    info!(
        worker_id = %config.worker_id,
        lock_backend = config.lock_backend.as_str(),
        lock_name = %coordinator.config().lock_name(),
        lease_seconds = config.lease_seconds,
        tick_seconds = config.tick_seconds,
        batch_size = config.batch_size,
        "auditsweep-worker started"
    );

    if config.mode == WorkerMode::Once {
        let outcome = coordinator.sweep().await;
        log_outcome(&config, &outcome);
        return Ok(());
    }

    let tick = Duration::from_secs(config.tick_seconds);
    loop {
        let outcome = coordinator.sweep().await;
        log_outcome(&config, &outcome);

        tokio::select! {
            () = tokio::time::sleep(tick) => {}
            signal = tokio::signal::ctrl_c() => {
                if let Err(error) = signal {
                    return Err(AppError::Internal(format!(
                        "failed to listen for shutdown signal: {error}"
                    )));
                }
                info!(worker_id = %config.worker_id, "auditsweep-worker shutting down");
                return Ok(());
            }
        }
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_sweep_coordinator(config: &WorkerConfig, pool: PgPool) -> AppResult<SweepCoordinator> {
    let lock_provider: Arc<dyn DistributedLockProvider> = match &config.lock_backend {
        LockBackend::Redis { redis_url } => {
            let client = redis::Client::open(redis_url.as_str())
                .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))?;
            Arc::new(RedisDistributedLockProvider::new(
                client,
                config.lock_key_prefix.clone(),
            ))
        }
        LockBackend::Postgres => Arc::new(PostgresDistributedLockProvider::new(pool.clone())),
    };

    let audit_log_repository =
        PostgresAuditLogRepository::new(pool.clone()).with_batch_size(config.batch_size)?;
    let settings_repository = PostgresAuditTrimmingSettingsRepository::new(pool);

    Ok(SweepCoordinator::new(
        SweepCoordinatorConfig::new(config.worker_id.as_str(), config.lease_seconds)?,
        Arc::new(SystemClock),
        lock_provider,
        Arc::new(audit_log_repository),
        Arc::new(settings_repository),
    ))
}

fn log_outcome(config: &WorkerConfig, outcome: &SweepOutcome) {
    match outcome {
        SweepOutcome::Trimmed(report) => info!(
            worker_id = %config.worker_id,
            deleted_count = report.deleted_count,
            cutoff = %report.cutoff,
            "audit trimming sweep finished"
        ),
        SweepOutcome::SkippedNotDue { next_due_at } => debug!(
            worker_id = %config.worker_id,
            next_due_at = ?next_due_at,
            "audit trimming not due yet"
        ),
        // Already logged at error level by the coordinator.
        SweepOutcome::Failed(_) => {}
        other => debug!(
            worker_id = %config.worker_id,
            outcome = other.as_str(),
            "audit trimming sweep skipped"
        ),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
