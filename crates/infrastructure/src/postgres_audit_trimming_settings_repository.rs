use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use auditsweep_application::AuditTrimmingSettingsRepository;
use auditsweep_core::{AppError, AppResult};
use auditsweep_domain::AuditTrimmingSettings;


/// PostgreSQL-backed repository for the singleton audit trimming settings row.
#[derive(Clone)]
pub struct PostgresAuditTrimmingSettingsRepository {
    pool: PgPool,
}

impl PostgresAuditTrimmingSettingsRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditTrimmingSettingsRepository for PostgresAuditTrimmingSettingsRepository {
    async fn load_settings(&self) -> AppResult<AuditTrimmingSettings> {
        let row = sqlx::query_as::<_, (i32, i32, Option<DateTime<Utc>>)>(
            r#"
            SELECT retention_days, minimum_run_interval_hours, last_run_at
            FROM audit_trimming_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load audit trimming settings: {error}"))
        })?;

        let Some((retention_days, minimum_run_interval_hours, last_run_at)) = row else {
            return Ok(AuditTrimmingSettings::default());
        };

        AuditTrimmingSettings::from_stored(retention_days, minimum_run_interval_hours, last_run_at)
            .map_err(|error| {
                AppError::Internal(format!(
                    "invalid stored audit trimming settings: {error}"
                ))
            })
    }

    async fn record_last_run(&self, completed_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_trimming_settings (id, last_run_at)
            VALUES (1, $1)
            ON CONFLICT (id) DO UPDATE
            SET last_run_at = EXCLUDED.last_run_at
            "#,
        )
        .bind(completed_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to record audit trimming run: {error}"))
        })?;

        Ok(())
    }
}
