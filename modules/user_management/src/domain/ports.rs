use async_trait::async_trait;

use crate::contract::model::{Envelope, Log, LogLevel};

/// Audit trail the user service appends to after every mutation attempt.
#[async_trait]
pub trait AuditPort: Send + Sync {
    async fn record(&self, level: LogLevel, message: String) -> Envelope<Log>;
}
