use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use sqlx::PgPool;
use tracing::debug;

use auditsweep_application::AuditTrimmer;
use auditsweep_core::{AppError, AppResult};

use crate::AuditLogEntryInput;


/// Rows removed per delete statement when no batch size is configured.
pub const DEFAULT_TRIM_BATCH_SIZE: u32 = 1_000;

/// PostgreSQL-backed repository for audit log entries.
#[derive(Clone)]
pub struct PostgresAuditLogRepository {
    pool: PgPool,
    batch_size: u32,
}

impl PostgresAuditLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            batch_size: DEFAULT_TRIM_BATCH_SIZE,
        }
    }

    /// Sets how many rows one delete statement may remove.
    pub fn with_batch_size(mut self, batch_size: u32) -> AppResult<Self> {
        if batch_size == 0 {
            return Err(AppError::Validation(
                "audit trim batch_size must be greater than zero".to_owned(),
            ));
        }

        self.batch_size = batch_size;
        Ok(self)
    }

    /// Appends one audit entry and returns its identifier.
    pub async fn append_entry(&self, entry: AuditLogEntryInput) -> AppResult<uuid::Uuid> {
        let entry_id = uuid::Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO audit_log_entries (
                id,
                subject,
                action,
                resource_type,
                resource_id,
                detail,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry_id)
        .bind(entry.subject)
        .bind(entry.action)
        .bind(entry.resource_type)
        .bind(entry.resource_id)
        .bind(entry.detail)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit entry: {error}")))?;

        Ok(entry_id)
    }

    async fn cutoff_for(&self, max_age: TimeDelta) -> AppResult<DateTime<Utc>> {
        sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            SELECT now() - ($1::BIGINT * INTERVAL '1 second')
            "#,
        )
        .bind(max_age.num_seconds())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve audit trim cutoff: {error}"))
        })
    }
}

#[async_trait]
impl AuditTrimmer for PostgresAuditLogRepository {
    async fn trim_older_than(&self, max_age: TimeDelta) -> AppResult<u64> {
        let cutoff = self.cutoff_for(max_age).await?;
        let batch_size = u64::from(self.batch_size);
        let mut deleted_total = 0_u64;

        loop {
            let deleted = sqlx::query(
                r#"
                DELETE FROM audit_log_entries
                WHERE id IN (
                    SELECT id
                    FROM audit_log_entries
                    WHERE created_at < $1
                    ORDER BY created_at
                    LIMIT $2
                )
                "#,
            )
            .bind(cutoff)
            .bind(i64::from(self.batch_size))
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to trim audit log entries: {error}"))
            })?
            .rows_affected();

            deleted_total = deleted_total.saturating_add(deleted);
            if deleted > 0 {
                debug!(
                    deleted,
                    deleted_total,
                    cutoff = %cutoff,
                    "deleted audit log batch"
                );
            }

            if deleted < batch_size {
                return Ok(deleted_total);
            }
        }
    }
}
