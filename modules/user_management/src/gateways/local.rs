use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::UserManagementApi,
    error::UserManagementError,
    model::{Envelope, Log, User, UserDetails},
};
use crate::domain::{log_service::LogService, user_service::UserService};

/// Local implementation of the UserManagementApi trait that delegates to the domain services
pub struct UserManagementLocalClient {
    users: Arc<UserService>,
    logs: Arc<LogService>,
}

impl UserManagementLocalClient {
    pub fn new(users: Arc<UserService>, logs: Arc<LogService>) -> Self {
        Self { users, logs }
    }
}

#[async_trait]
impl UserManagementApi for UserManagementLocalClient {
    async fn list_users(&self, active: Option<bool>) -> Result<Vec<User>, UserManagementError> {
        let users = match active {
            Some(flag) => self.users.filter_by_active(flag).await,
            None => self.users.list_all().await,
        };
        users.map_err(UserManagementError::from)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, UserManagementError> {
        self.users
            .get_user(id)
            .await
            .map_err(UserManagementError::from)
    }

    async fn create_user(&self, details: UserDetails) -> Envelope<User> {
        self.users.create_user(details).await
    }

    async fn update_user(&self, id: i64, details: UserDetails) -> Envelope<User> {
        self.users.update_user(id, details).await
    }

    async fn delete_user(&self, id: i64) -> Envelope<User> {
        self.users.delete_user(id).await
    }

    async fn trigger_fault(&self) -> Envelope<User> {
        self.users.trigger_fault().await
    }

    async fn list_logs(&self) -> Result<Vec<Log>, UserManagementError> {
        self.logs.list_all().await.map_err(UserManagementError::from)
    }

    async fn get_log(&self, id: i64) -> Envelope<Log> {
        self.logs.get_log(id).await
    }

    async fn record_demo_fault(&self) -> Envelope<Log> {
        self.logs.record_demo_fault().await
    }
}
