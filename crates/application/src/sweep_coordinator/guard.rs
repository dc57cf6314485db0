use std::sync::Arc;

use auditsweep_core::AppResult;
use tracing::warn;

use crate::audit_trimming_ports::{DistributedLock, DistributedLockProvider};

/// Scoped ownership of one distributed lock.
///
/// Call [`DistributedLockGuard::release`] when the protected section ends. A
/// guard dropped without an explicit release (panic or cancelled future)
/// hands the release to the current Tokio runtime; without a runtime the
/// lease expiry reclaims the lock.
pub struct DistributedLockGuard {
    provider: Arc<dyn DistributedLockProvider>,
    lock: Option<DistributedLock>,
}

impl DistributedLockGuard {
    /// Attempts to acquire `name` and wraps the lock in a guard.
    pub async fn acquire(
        provider: Arc<dyn DistributedLockProvider>,
        name: &str,
        holder_id: &str,
        lease_seconds: u32,
    ) -> AppResult<Option<Self>> {
        let lock = provider.try_acquire(name, holder_id, lease_seconds).await?;

        Ok(lock.map(|lock| Self {
            provider,
            lock: Some(lock),
        }))
    }

    /// Returns the held lock.
    #[must_use]
    pub fn lock(&self) -> Option<&DistributedLock> {
        self.lock.as_ref()
    }

    /// Releases the lock now.
    pub async fn release(mut self) -> AppResult<()> {
        match self.lock.take() {
            Some(lock) => self.provider.release(&lock).await,
            None => Ok(()),
        }
    }
}

impl Drop for DistributedLockGuard {
    fn drop(&mut self) {
        let Some(lock) = self.lock.take() else {
            return;
        };

        let provider = Arc::clone(&self.provider);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(error) = provider.release(&lock).await {
                        warn!(
                            lock_name = %lock.name,
                            error = %error,
                            "failed to release abandoned distributed lock"
                        );
                    }
                });
            }
            Err(_) => {
                warn!(
                    lock_name = %lock.name,
                    lease_seconds = lock.lease_seconds,
                    "no runtime available to release distributed lock, waiting for lease expiry"
                );
            }
        }
    }
}
