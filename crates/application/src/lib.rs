//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_trimming_ports;
mod sweep_coordinator;

pub use audit_trimming_ports::{
    AuditTrimmer, AuditTrimmingSettingsRepository, Clock, DistributedLock,
    DistributedLockProvider,
};
pub use sweep_coordinator::{
    AUDIT_TRIMMING_LOCK_NAME, AuditTrimReport, DEFAULT_LEASE_SECONDS, DistributedLockGuard,
    SweepCoordinator, SweepCoordinatorConfig, SweepFailure, SweepOutcome, SweepStage,
};
