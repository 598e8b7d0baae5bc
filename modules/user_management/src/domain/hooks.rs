use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use crate::contract::model::{Log, LogLevel};
use crate::domain::repo::Insertable;

/// Invoked by a façade when a by-id lookup finds nothing.
#[async_trait]
pub trait LookupMissHook: Send + Sync {
    async fn on_miss(&self, entity: &'static str, id: i64);
}

/// Records every miss as an Error-level audit log entry.
///
/// Writes go through [`Insertable`] only, so a miss recorded while serving a
/// log lookup never triggers another lookup. Install it on the store that
/// serves lookups, pointing at a store without a hook.
pub struct RecordMissAsLog {
    sink: Arc<dyn Insertable<Log>>,
}

impl RecordMissAsLog {
    pub fn new(sink: Arc<dyn Insertable<Log>>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl LookupMissHook for RecordMissAsLog {
    async fn on_miss(&self, entity: &'static str, id: i64) {
        let record = Log::new(
            LogLevel::Error,
            format!("{entity} with ID {id} not found."),
            Utc::now(),
        );
        match self.sink.insert(record).await {
            Ok(env) if env.success => {}
            Ok(env) => warn!(entity, id, message = %env.message, "Lookup miss was not recorded"),
            Err(e) => warn!(entity, id, error = %e, "Lookup miss was not recorded"),
        }
    }
}
