//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod trimming;

pub use trimming::{
    AuditTrimmingSettings, DEFAULT_MINIMUM_RUN_INTERVAL_HOURS, DEFAULT_RETENTION_DAYS,
};
