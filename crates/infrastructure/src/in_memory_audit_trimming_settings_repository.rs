use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use auditsweep_application::AuditTrimmingSettingsRepository;
use auditsweep_core::AppResult;
use auditsweep_domain::AuditTrimmingSettings;

/// In-memory audit trimming settings.
#[derive(Default)]
pub struct InMemoryAuditTrimmingSettingsRepository {
    settings: RwLock<AuditTrimmingSettings>,
}

impl InMemoryAuditTrimmingSettingsRepository {
    /// Creates a repository seeded with `settings`.
    #[must_use]
    pub fn new(settings: AuditTrimmingSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl AuditTrimmingSettingsRepository for InMemoryAuditTrimmingSettingsRepository {
    async fn load_settings(&self) -> AppResult<AuditTrimmingSettings> {
        Ok(*self.settings.read().await)
    }

    async fn record_last_run(&self, completed_at: DateTime<Utc>) -> AppResult<()> {
        let mut settings = self.settings.write().await;
        *settings = AuditTrimmingSettings::new(
            settings.retention_period(),
            settings.minimum_run_interval(),
            Some(completed_at),
        )?;

        Ok(())
    }
}
