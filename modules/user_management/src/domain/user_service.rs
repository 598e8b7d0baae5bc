use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::contract::model::{Envelope, LogLevel, User, UserDetails, UNASSIGNED_ID};
use crate::domain::error::DomainError;
use crate::domain::ports::AuditPort;
use crate::domain::repo::UsersRepository;
use crate::domain::validator::UserValidator;

const DELETE_FAILED: &str = "Delete failed.";

/// Roster rules on top of the user façade.
/// Every mutation attempt leaves exactly one entry in the audit trail.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UsersRepository>,
    audit: Arc<dyn AuditPort>,
    validator: UserValidator,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UsersRepository>,
        audit: Arc<dyn AuditPort>,
        validator: UserValidator,
    ) -> Self {
        Self {
            repo,
            audit,
            validator,
        }
    }

    #[instrument(name = "users.service.list_all", skip(self))]
    pub async fn list_all(&self) -> Result<Vec<User>, DomainError> {
        debug!("Listing users");
        let users = self
            .repo
            .list_all()
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;
        debug!("Listed {} users", users.len());
        Ok(users)
    }

    #[instrument(name = "users.service.filter_by_active", skip(self))]
    pub async fn filter_by_active(&self, is_active: bool) -> Result<Vec<User>, DomainError> {
        debug!("Filtering users by active flag");
        let users = self.list_all().await?;
        Ok(users
            .into_iter()
            .filter(|u| u.is_active == is_active)
            .collect())
    }

    #[instrument(name = "users.service.get_user", skip(self), fields(user_id = id))]
    pub async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        debug!("Getting user by id");
        let found = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;
        Ok(found.into_option())
    }

    #[instrument(
        name = "users.service.create_user",
        skip(self, details),
        fields(email = %details.email)
    )]
    pub async fn create_user(&self, details: UserDetails) -> Envelope<User> {
        info!("Creating new user");

        if let Err(e) = self.validator.validate(&details) {
            warn!("Rejected new user: {}", e);
            self.record_audit(LogLevel::Error, format!("User creation rejected: {e}")).await;
            return Envelope::failure(e.to_string());
        }

        let user = User::from_details(UNASSIGNED_ID, details, false);
        match self.repo.insert(user).await {
            Ok(env) if env.success => {
                let id = env.value().map(|u| u.id).unwrap_or(UNASSIGNED_ID);
                info!("Successfully created user with id={}", id);
                self.record_audit(LogLevel::Information, format!("User {id} created.")).await;
                env
            }
            Ok(env) => {
                error!("User creation was not persisted: {}", env.message);
                self.record_audit(
                    LogLevel::Error,
                    format!("User creation failed: {}", env.message),
                )
                .await;
                Envelope::failure(env.message)
            }
            Err(e) => {
                error!("User creation faulted: {:#}", e);
                self.record_audit(LogLevel::Error, format!("User creation failed: {e:#}")).await;
                Envelope::failure(format!("{e:#}"))
            }
        }
    }

    /// Replace every field of user `id`. The active flag is always reset.
    #[instrument(name = "users.service.update_user", skip(self, details), fields(user_id = id))]
    pub async fn update_user(&self, id: i64, details: UserDetails) -> Envelope<User> {
        info!("Updating user");

        if let Err(e) = self.validator.validate(&details) {
            warn!("Rejected update: {}", e);
            self.record_audit(LogLevel::Error, format!("Update rejected for user {id}: {e}")).await;
            return Envelope::failure(e.to_string());
        }

        let user = User::from_details(id, details, false);
        match self.repo.update(user).await {
            Ok(env) if env.success => {
                info!("Successfully updated user");
                self.record_audit(LogLevel::Information, format!("User {id} updated.")).await;
                env
            }
            Ok(env) => {
                error!("Update was not persisted: {}", env.message);
                self.record_audit(
                    LogLevel::Error,
                    format!("Update failed for user {id}: {}", env.message),
                )
                .await;
                Envelope::failure(env.message)
            }
            Err(e) => {
                error!("Update faulted: {:#}", e);
                self.record_audit(
                    LogLevel::Error,
                    format!("Update failed for user {id}: {e:#}"),
                )
                .await;
                Envelope::failure(format!("{e:#}"))
            }
        }
    }

    #[instrument(name = "users.service.delete_user", skip(self), fields(user_id = id))]
    pub async fn delete_user(&self, id: i64) -> Envelope<User> {
        info!("Deleting user");

        let user = match self.repo.fetch(id).await {
            Ok(user) => user,
            Err(e) => {
                warn!("Delete lookup failed: {}", e);
                self.record_audit(
                    LogLevel::Error,
                    format!("Delete failed for user {id}: {e}"),
                )
                .await;
                return Envelope::failure(DELETE_FAILED);
            }
        };

        match self.repo.remove(user).await {
            Ok(env) if env.success => {
                info!("Successfully deleted user");
                self.record_audit(LogLevel::Information, format!("User {id} deleted.")).await;
                env
            }
            Ok(env) => {
                error!("Delete was not persisted: {}", env.message);
                self.record_audit(
                    LogLevel::Error,
                    format!("Delete failed for user {id}: {}", env.message),
                )
                .await;
                Envelope::failure(DELETE_FAILED)
            }
            Err(e) => {
                error!("Delete faulted: {:#}", e);
                self.record_audit(
                    LogLevel::Error,
                    format!("Delete failed for user {id}: {e}"),
                )
                .await;
                Envelope::failure(DELETE_FAILED)
            }
        }
    }

    /// Drive a store fault through the service and audit it.
    #[instrument(name = "users.service.trigger_fault", skip(self))]
    pub async fn trigger_fault(&self) -> Envelope<User> {
        match self.repo.raise_fault().await {
            Err(e) => {
                error!("Store fault: {:#}", e);
                self.record_audit(LogLevel::Error, format!("Store fault: {e:#}")).await;
                Envelope::failure(format!("{e:#}"))
            }
            Ok(()) => {
                warn!("Fault probe did not fault");
                self.record_audit(
                    LogLevel::Warning,
                    "Fault probe completed without raising.".to_string(),
                )
                .await;
                Envelope::failure("Fault probe completed without raising.")
            }
        }
    }

    /// Append an audit entry. A rejected write is reported but never fails
    /// the user operation it describes.
    async fn record_audit(&self, level: LogLevel, message: String) {
        let env = self.audit.record(level, message).await;
        if !env.success {
            warn!("Audit entry was not stored: {}", env.message);
        }
    }
}
