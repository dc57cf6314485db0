use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;

use auditsweep_application::{Clock, DistributedLock, DistributedLockProvider};
use auditsweep_core::AppResult;

use crate::lock_validation::validate_lock_request;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
struct HeldLease {
    token: String,
    expires_at: DateTime<Utc>,
}

/// In-process lock provider with clock-driven lease expiry.
///
/// Coordinates every coordinator sharing one instance, which makes it the
/// single-node backend and the test double for multi-node scenarios.
pub struct InMemoryDistributedLockProvider {
    clock: Arc<dyn Clock>,
    leases: Mutex<HashMap<String, HeldLease>>,
}

impl InMemoryDistributedLockProvider {
    /// Creates an empty provider measuring leases against `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            leases: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl DistributedLockProvider for InMemoryDistributedLockProvider {
    async fn try_acquire(
        &self,
        name: &str,
        holder_id: &str,
        lease_seconds: u32,
    ) -> AppResult<Option<DistributedLock>> {
        validate_lock_request(name, holder_id, lease_seconds)?;

        let now = self.clock.now();
        let mut leases = self.leases.lock().await;
        if leases
            .get(name)
            .is_some_and(|lease| lease.expires_at > now)
        {
            return Ok(None);
        }

        let token = format!("{holder_id}:{}", uuid::Uuid::new_v4());
        let expires_at = now
            .checked_add_signed(TimeDelta::seconds(i64::from(lease_seconds)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        leases.insert(
            name.to_owned(),
            HeldLease {
                token: token.clone(),
                expires_at,
            },
        );

        Ok(Some(DistributedLock {
            name: name.to_owned(),
            holder_id: holder_id.to_owned(),
            token,
            lease_seconds,
        }))
    }

    async fn release(&self, lock: &DistributedLock) -> AppResult<()> {
        let mut leases = self.leases.lock().await;
        if leases
            .get(lock.name.as_str())
            .is_some_and(|lease| lease.token == lock.token)
        {
            leases.remove(lock.name.as_str());
        }

        Ok(())
    }
}
