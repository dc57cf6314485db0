use chrono::{DateTime, Utc};

/// New audit log entry written by audit producers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntryInput {
    /// Actor subject.
    pub subject: String,
    /// Stable action identifier.
    pub action: String,
    /// Event resource type.
    pub resource_type: String,
    /// Event resource identifier.
    pub resource_id: String,
    /// Optional event detail.
    pub detail: Option<String>,
    /// Event timestamp.
    pub created_at: DateTime<Utc>,
}
