//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod audit_log_entry;
mod in_memory_audit_log_repository;
mod in_memory_audit_trimming_settings_repository;
mod in_memory_distributed_lock_provider;
mod lock_validation;
mod postgres_audit_log_repository;
mod postgres_audit_trimming_settings_repository;
mod postgres_distributed_lock_provider;
mod redis_distributed_lock_provider;
mod system_clock;

pub use audit_log_entry::AuditLogEntryInput;
pub use in_memory_audit_log_repository::InMemoryAuditLogRepository;
pub use in_memory_audit_trimming_settings_repository::InMemoryAuditTrimmingSettingsRepository;
pub use in_memory_distributed_lock_provider::InMemoryDistributedLockProvider;
pub use postgres_audit_log_repository::{DEFAULT_TRIM_BATCH_SIZE, PostgresAuditLogRepository};
pub use postgres_audit_trimming_settings_repository::PostgresAuditTrimmingSettingsRepository;
pub use postgres_distributed_lock_provider::PostgresDistributedLockProvider;
pub use redis_distributed_lock_provider::RedisDistributedLockProvider;
pub use system_clock::SystemClock;
