mod clock;
mod lock;
mod settings;
mod trimmer;

pub use clock::Clock;
pub use lock::{DistributedLock, DistributedLockProvider};
pub use settings::AuditTrimmingSettingsRepository;
pub use trimmer::AuditTrimmer;
