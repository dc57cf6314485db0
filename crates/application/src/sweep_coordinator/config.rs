use auditsweep_core::{AppError, AppResult, NonEmptyString};

/// Stable distributed lock name shared by every node running audit trimming.
pub const AUDIT_TRIMMING_LOCK_NAME: &str = "auditsweep.audit_trimming.sweep";

/// Default lease for the audit trimming lock.
///
/// Must stay above the worst-case trim duration: the lease is not renewed
/// while a trim runs.
pub const DEFAULT_LEASE_SECONDS: u32 = 3_600;

/// Identity and lease settings for one sweep coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepCoordinatorConfig {
    lock_name: NonEmptyString,
    holder_id: NonEmptyString,
    lease_seconds: u32,
}

impl SweepCoordinatorConfig {
    /// Creates a config for `holder_id` using the default lock name.
    pub fn new(holder_id: impl Into<String>, lease_seconds: u32) -> AppResult<Self> {
        if lease_seconds == 0 {
            return Err(AppError::Validation(
                "sweep lease_seconds must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            lock_name: NonEmptyString::new(AUDIT_TRIMMING_LOCK_NAME)?,
            holder_id: NonEmptyString::new(holder_id)?,
            lease_seconds,
        })
    }

    /// Overrides the distributed lock name.
    pub fn with_lock_name(mut self, lock_name: impl Into<String>) -> AppResult<Self> {
        self.lock_name = NonEmptyString::new(lock_name)?;
        Ok(self)
    }

    /// Returns the distributed lock name.
    #[must_use]
    pub fn lock_name(&self) -> &str {
        self.lock_name.as_str()
    }

    /// Returns the node identity presented to the lock backend.
    #[must_use]
    pub fn holder_id(&self) -> &str {
        self.holder_id.as_str()
    }

    /// Returns the distributed lock lease.
    #[must_use]
    pub fn lease_seconds(&self) -> u32 {
        self.lease_seconds
    }
}
