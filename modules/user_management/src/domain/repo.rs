//! Persistence ports the domain depends on.
//!
//! Capabilities are split per concern so an entity kind only exposes what it
//! supports: users are fully writable, logs are append-only.
//!
//! Store faults surface as `Err`. "Nothing was affected" is an expected
//! outcome and surfaces as a failed [`Envelope`].

use async_trait::async_trait;

use crate::contract::model::{Envelope, Log, Lookup, User};
use crate::domain::error::NotFoundError;

#[async_trait]
pub trait Readable<T>: Send + Sync
where
    T: Send + 'static,
{
    /// Entity name used in lookup errors and audit messages.
    fn entity_name(&self) -> &'static str;

    /// Every record in insertion order.
    async fn list_all(&self) -> anyhow::Result<Vec<T>>;

    async fn get_by_id(&self, id: i64) -> anyhow::Result<Lookup<T>>;

    /// Strict lookup: a missing identifier is an error ([`NotFoundError`]).
    async fn fetch(&self, id: i64) -> anyhow::Result<T> {
        match self.get_by_id(id).await? {
            Lookup::Found(entity) => Ok(entity),
            Lookup::NotFound => Err(NotFoundError::new(self.entity_name(), id).into()),
        }
    }
}

#[async_trait]
pub trait Insertable<T>: Send + Sync
where
    T: Send + 'static,
{
    /// Persist a new record; the identifier carried by `entity` is ignored
    /// and the returned value holds the assigned one.
    async fn insert(&self, entity: T) -> anyhow::Result<Envelope<T>>;
}

#[async_trait]
pub trait Writable<T>: Insertable<T>
where
    T: Send + 'static,
{
    /// Replace every mutable field of the record with `entity.id`.
    async fn update(&self, entity: T) -> anyhow::Result<Envelope<T>>;

    async fn remove(&self, entity: T) -> anyhow::Result<Envelope<T>>;
}

/// User façade.
#[async_trait]
pub trait UsersRepository: Readable<User> + Writable<User> {
    /// Run an operation the store always rejects. Diagnostic only.
    async fn raise_fault(&self) -> anyhow::Result<()>;
}

/// Log façade. Faults while inserting are folded into failed envelopes.
#[async_trait]
pub trait LogsRepository: Readable<Log> + Insertable<Log> {
    /// Lookup that reports a miss as a failed envelope and notifies the
    /// installed lookup-miss hook.
    async fn find_log(&self, id: i64) -> anyhow::Result<Envelope<Log>>;
}
