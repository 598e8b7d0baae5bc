//! SeaORM-backed log façade. Append-only: no update or remove path exists.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder};
use tracing::{debug, warn};

use crate::contract::model::{Envelope, Log, Lookup};
use crate::domain::hooks::{LookupMissHook, RecordMissAsLog};
use crate::domain::repo::{Insertable, LogsRepository, Readable};
use crate::infra::storage::entity::log::{Column, Entity as LogEntity};
use crate::infra::storage::mapper::log_active_model;

pub struct SeaOrmLogsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
    miss_hook: Option<Arc<dyn LookupMissHook>>,
}

impl<C> SeaOrmLogsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            miss_hook: None,
        }
    }

    pub fn with_miss_hook(mut self, hook: Arc<dyn LookupMissHook>) -> Self {
        self.miss_hook = Some(hook);
        self
    }
}

impl<C> SeaOrmLogsRepository<C>
where
    C: ConnectionTrait + Clone + Send + Sync + 'static,
{
    /// Store whose lookup misses are recorded as logs through a second,
    /// hook-less store on the same connection.
    pub fn with_self_audit(conn: C) -> Self {
        let sink = Arc::new(SeaOrmLogsRepository::new(conn.clone()));
        Self::new(conn).with_miss_hook(Arc::new(RecordMissAsLog::new(sink)))
    }
}

#[async_trait]
impl<C> Readable<Log> for SeaOrmLogsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    fn entity_name(&self) -> &'static str {
        "Log"
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Log>> {
        let rows = LogEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await
            .context("list logs failed")?;
        rows.into_iter()
            .map(|m| Log::try_from(m).map_err(anyhow::Error::from))
            .collect()
    }

    async fn get_by_id(&self, id: i64) -> anyhow::Result<Lookup<Log>> {
        let found = LogEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find log by id failed")?;
        Ok(found.map(Log::try_from).transpose()?.into())
    }
}

#[async_trait]
impl<C> Insertable<Log> for SeaOrmLogsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert(&self, log: Log) -> anyhow::Result<Envelope<Log>> {
        let mut am = log_active_model(&log);
        am.id = sea_orm::ActiveValue::NotSet;
        match LogEntity::insert(am).exec(&self.conn).await {
            Ok(res) => {
                let saved = Log {
                    id: res.last_insert_id,
                    ..log
                };
                debug!(log_id = saved.id, "Log record stored");
                Ok(Envelope::success(saved, "Log created"))
            }
            Err(e) => {
                warn!(error = %e, "Log record rejected by store");
                Ok(Envelope::failure("Error creating log."))
            }
        }
    }
}

#[async_trait]
impl<C> LogsRepository for SeaOrmLogsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_log(&self, id: i64) -> anyhow::Result<Envelope<Log>> {
        match self.get_by_id(id).await? {
            Lookup::Found(log) => Ok(Envelope::success(log, "Log found")),
            Lookup::NotFound => {
                if let Some(hook) = &self.miss_hook {
                    hook.on_miss(self.entity_name(), id).await;
                }
                Ok(Envelope::failure("Log not found"))
            }
        }
    }
}
