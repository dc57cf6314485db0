use async_trait::async_trait;
use auditsweep_core::AppResult;

/// One exclusively held, leased distributed lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributedLock {
    /// Stable lock name shared by every node contending for the same job.
    pub name: String,
    /// Identity of the node that holds the lock.
    pub holder_id: String,
    /// Per-acquisition token used for compare-and-release.
    pub token: String,
    /// Lease length after which the backend may reclaim the lock.
    pub lease_seconds: u32,
}

/// Cross-process mutual exclusion with a bounded lease.
#[async_trait]
pub trait DistributedLockProvider: Send + Sync {
    /// Attempts to acquire the named lock without waiting.
    ///
    /// Returns `Ok(None)` while any holder, including this node, keeps a
    /// live lease on the name.
    async fn try_acquire(
        &self,
        name: &str,
        holder_id: &str,
        lease_seconds: u32,
    ) -> AppResult<Option<DistributedLock>>;

    /// Releases one lock using token compare-and-delete semantics.
    ///
    /// Releasing a lock whose lease already expired or was taken over is a
    /// no-op.
    async fn release(&self, lock: &DistributedLock) -> AppResult<()>;
}
