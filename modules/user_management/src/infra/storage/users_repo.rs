//! SeaORM-backed user façade.
//!
//! Generic over `C: ConnectionTrait`, so it runs on a `DatabaseConnection`
//! or inside a transaction owned by the caller.

use anyhow::Context;
use async_trait::async_trait;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::contract::model::{Envelope, Lookup, User};
use crate::domain::repo::{Insertable, Readable, UsersRepository, Writable};
use crate::infra::storage::entity::user::{Column, Entity as UserEntity};
use crate::infra::storage::mapper::user_active_model;

/// Statement the store always rejects; used by the fault probe.
const FAULT_PROBE_SQL: &str = "SELECT * FROM fault_probe";

pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> Readable<User> for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    fn entity_name(&self) -> &'static str {
        "User"
    }

    async fn list_all(&self) -> anyhow::Result<Vec<User>> {
        let rows = UserEntity::find()
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await
            .context("list users failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(&self, id: i64) -> anyhow::Result<Lookup<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find user by id failed")?;
        Ok(Lookup::from(found).map(User::from))
    }
}

#[async_trait]
impl<C> Insertable<User> for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert(&self, user: User) -> anyhow::Result<Envelope<User>> {
        let mut am = user_active_model(&user);
        am.id = sea_orm::ActiveValue::NotSet;
        match UserEntity::insert(am).exec(&self.conn).await {
            Ok(res) => {
                let saved = User {
                    id: res.last_insert_id,
                    ..user
                };
                Ok(Envelope::success(saved, "Creation successful."))
            }
            Err(DbErr::RecordNotInserted) => Ok(Envelope::failure("Creation failed.")),
            Err(e) => Err(e).context("insert user failed"),
        }
    }
}

#[async_trait]
impl<C> Writable<User> for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn update(&self, user: User) -> anyhow::Result<Envelope<User>> {
        let mut am = user_active_model(&user);
        am.id = sea_orm::ActiveValue::NotSet;
        let res = UserEntity::update_many()
            .set(am)
            .filter(Column::Id.eq(user.id))
            .exec(&self.conn)
            .await
            .context("update user failed")?;
        if res.rows_affected == 0 {
            return Ok(Envelope::failure("Update failed."));
        }
        Ok(Envelope::success(user, "Update successful."))
    }

    async fn remove(&self, user: User) -> anyhow::Result<Envelope<User>> {
        let res = UserEntity::delete_by_id(user.id)
            .exec(&self.conn)
            .await
            .context("delete user failed")?;
        if res.rows_affected == 0 {
            return Ok(Envelope::failure("Delete failed."));
        }
        Ok(Envelope::success(user, "Delete successful."))
    }
}

#[async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn raise_fault(&self) -> anyhow::Result<()> {
        self.conn
            .execute_unprepared(FAULT_PROBE_SQL)
            .await
            .context("fault probe")?;
        Ok(())
    }
}
