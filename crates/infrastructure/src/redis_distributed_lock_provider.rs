//! Redis-backed distributed lock provider.

use async_trait::async_trait;
use auditsweep_application::{DistributedLock, DistributedLockProvider};
use auditsweep_core::{AppError, AppResult};
use redis::Script;

use crate::lock_validation::validate_lock_request;

const RELEASE_LOCK_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
  return redis.call('DEL', KEYS[1])
else
  return 0
end
"#;

/// Redis implementation of distributed lock coordination.
///
/// Acquisition is one atomic `SET NX EX`, so a crash can never leave a key
/// without its lease.
#[derive(Clone)]
pub struct RedisDistributedLockProvider {
    client: redis::Client,
    key_prefix: String,
}

impl RedisDistributedLockProvider {
    /// Creates one provider adapter.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, name: &str) -> String {
        format!("{}:{name}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl DistributedLockProvider for RedisDistributedLockProvider {
    async fn try_acquire(
        &self,
        name: &str,
        holder_id: &str,
        lease_seconds: u32,
    ) -> AppResult<Option<DistributedLock>> {
        validate_lock_request(name, holder_id, lease_seconds)?;

        let key = self.key_for(name);
        let token = format!("{holder_id}:{}", uuid::Uuid::new_v4());
        let mut connection = self.connection().await?;

        let reply: Option<String> = redis::cmd("SET")
            .arg(key.as_str())
            .arg(token.as_str())
            .arg("NX")
            .arg("EX")
            .arg(lease_seconds)
            .query_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to acquire distributed lock: {error}"))
            })?;

        if reply.is_none() {
            return Ok(None);
        }

        Ok(Some(DistributedLock {
            name: name.to_owned(),
            holder_id: holder_id.to_owned(),
            token,
            lease_seconds,
        }))
    }

    async fn release(&self, lock: &DistributedLock) -> AppResult<()> {
        let key = self.key_for(lock.name.as_str());
        let script = Script::new(RELEASE_LOCK_SCRIPT);
        let mut connection = self.connection().await?;

        script
            .key(key)
            .arg(lock.token.as_str())
            .invoke_async::<i32>(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to release distributed lock: {error}"))
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use auditsweep_application::DistributedLockProvider;

    use super::RedisDistributedLockProvider;

    fn test_provider() -> Option<RedisDistributedLockProvider> {
        let Ok(redis_url) = std::env::var("REDIS_URL") else {
            return None;
        };

        let client = match redis::Client::open(redis_url.as_str()) {
            Ok(client) => client,
            Err(error) => panic!("invalid REDIS_URL in test: {error}"),
        };

        Some(RedisDistributedLockProvider::new(
            client,
            format!("auditsweep:test:{}", uuid::Uuid::new_v4()),
        ))
    }

    #[tokio::test]
    async fn lock_is_exclusive_until_released() {
        let Some(provider) = test_provider() else {
            return;
        };

        let first = provider.try_acquire("audit-trim", "node-a", 30).await;
        let Ok(Some(first)) = first else {
            panic!("first acquire should succeed");
        };

        let contended = provider.try_acquire("audit-trim", "node-b", 30).await;
        assert!(matches!(contended, Ok(None)));

        assert!(provider.release(&first).await.is_ok());
        assert!(provider.release(&first).await.is_ok());

        let second = provider.try_acquire("audit-trim", "node-b", 30).await;
        assert!(matches!(second, Ok(Some(_))));
    }

    #[tokio::test]
    async fn stale_token_does_not_release_new_holder() {
        let Some(provider) = test_provider() else {
            return;
        };

        let Ok(Some(first)) = provider.try_acquire("audit-trim", "node-a", 30).await else {
            panic!("first acquire should succeed");
        };
        assert!(provider.release(&first).await.is_ok());

        let Ok(Some(_second)) = provider.try_acquire("audit-trim", "node-b", 30).await else {
            panic!("second acquire should succeed");
        };
        assert!(provider.release(&first).await.is_ok());

        let contended = provider.try_acquire("audit-trim", "node-c", 30).await;
        assert!(matches!(contended, Ok(None)));
    }
}
