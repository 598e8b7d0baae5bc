use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::{debug, info};

use crate::config::UserManagementConfig;
use crate::contract::client::UserManagementApi;
use crate::domain::log_service::LogService;
use crate::domain::user_service::UserService;
use crate::domain::validator::UserValidator;
use crate::gateways::local::UserManagementLocalClient;
use crate::infra::storage::{
    self, logs_repo::SeaOrmLogsRepository, seed::seed_fixtures,
    users_repo::SeaOrmUsersRepository,
};

/// Wired user management module: both services over one store.
#[derive(Clone)]
pub struct UserManagement {
    users: Arc<UserService>,
    logs: Arc<LogService>,
}

impl UserManagement {
    /// Open the store at `url`, then [`init`](Self::init) on it.
    pub async fn connect(
        url: &str,
        max_conns: Option<u32>,
        cfg: &UserManagementConfig,
    ) -> anyhow::Result<Self> {
        let conn = storage::connect(url, max_conns).await?;
        Self::init(conn, cfg).await
    }

    /// Migrate, seed when enabled, and wire repositories to services.
    pub async fn init(conn: DatabaseConnection, cfg: &UserManagementConfig) -> anyhow::Result<Self> {
        info!("Initializing user_management module");
        debug!(
            "Loaded user_management config: seed_fixtures={}, min_adult_age={}",
            cfg.seed_fixtures, cfg.min_adult_age
        );

        storage::migrate(&conn).await?;
        if cfg.seed_fixtures {
            seed_fixtures(&conn).await?;
        }

        let logs = Arc::new(LogService::new(Arc::new(
            SeaOrmLogsRepository::with_self_audit(conn.clone()),
        )));
        let users = Arc::new(UserService::new(
            Arc::new(SeaOrmUsersRepository::new(conn)),
            logs.clone(),
            UserValidator::new(cfg.min_adult_age),
        ));

        info!("user_management module ready");
        Ok(Self { users, logs })
    }

    pub fn users(&self) -> Arc<UserService> {
        self.users.clone()
    }

    pub fn logs(&self) -> Arc<LogService> {
        self.logs.clone()
    }

    /// In-process client for other crates.
    pub fn client(&self) -> Arc<dyn UserManagementApi> {
        Arc::new(UserManagementLocalClient::new(
            self.users.clone(),
            self.logs.clone(),
        ))
    }
}
