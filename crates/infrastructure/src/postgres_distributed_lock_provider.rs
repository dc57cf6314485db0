use async_trait::async_trait;
use sqlx::PgPool;

use auditsweep_application::{DistributedLock, DistributedLockProvider};
use auditsweep_core::{AppError, AppResult};

use crate::lock_validation::validate_lock_request;


/// PostgreSQL-backed distributed lock provider.
///
/// A row in `distributed_locks` is a lease; an expired row may be taken over
/// by the next acquirer in the same statement that checks it.
#[derive(Clone)]
pub struct PostgresDistributedLockProvider {
    pool: PgPool,
}

impl PostgresDistributedLockProvider {
    /// Creates a provider with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DistributedLockProvider for PostgresDistributedLockProvider {
    async fn try_acquire(
        &self,
        name: &str,
        holder_id: &str,
        lease_seconds: u32,
    ) -> AppResult<Option<DistributedLock>> {
        validate_lock_request(name, holder_id, lease_seconds)?;

        let token = format!("{holder_id}:{}", uuid::Uuid::new_v4());
        let acquired_token = sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO distributed_locks (name, holder_id, token, acquired_at, expires_at)
            VALUES ($1, $2, $3, now(), now() + ($4::BIGINT * INTERVAL '1 second'))
            ON CONFLICT (name) DO UPDATE
            SET
                holder_id = EXCLUDED.holder_id,
                token = EXCLUDED.token,
                acquired_at = EXCLUDED.acquired_at,
                expires_at = EXCLUDED.expires_at
            WHERE distributed_locks.expires_at <= now()
            RETURNING token
            "#,
        )
        .bind(name)
        .bind(holder_id)
        .bind(token.as_str())
        .bind(i64::from(lease_seconds))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to acquire distributed lock: {error}"))
        })?;

        Ok(acquired_token.map(|token| DistributedLock {
            name: name.to_owned(),
            holder_id: holder_id.to_owned(),
            token,
            lease_seconds,
        }))
    }

    async fn release(&self, lock: &DistributedLock) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM distributed_locks
            WHERE name = $1 AND token = $2
            "#,
        )
        .bind(lock.name.as_str())
        .bind(lock.token.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to release distributed lock: {error}"))
        })?;

        Ok(())
    }
}
