use async_trait::async_trait;

use crate::contract::{
    error::UserManagementError,
    model::{Envelope, Log, User, UserDetails},
};

/// Public API trait for the user_management module that other crates can use
#[async_trait]
pub trait UserManagementApi: Send + Sync {
    /// List users; `Some(flag)` keeps only users whose active flag equals it
    async fn list_users(&self, active: Option<bool>) -> Result<Vec<User>, UserManagementError>;

    /// Get a user by ID; `Ok(None)` when absent
    async fn get_user(&self, id: i64) -> Result<Option<User>, UserManagementError>;

    async fn create_user(&self, details: UserDetails) -> Envelope<User>;

    /// Replace a user's fields. The active flag is reset to false.
    async fn update_user(&self, id: i64, details: UserDetails) -> Envelope<User>;

    async fn delete_user(&self, id: i64) -> Envelope<User>;

    /// Exercise the store failure path end to end
    async fn trigger_fault(&self) -> Envelope<User>;

    /// All audit log records in insertion order
    async fn list_logs(&self) -> Result<Vec<Log>, UserManagementError>;

    async fn get_log(&self, id: i64) -> Envelope<Log>;

    /// Append the demo error record
    async fn record_demo_fault(&self) -> Envelope<Log>;
}
