use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, instrument};

use crate::contract::model::{Envelope, Log, LogLevel};
use crate::domain::error::DomainError;
use crate::domain::ports::AuditPort;
use crate::domain::repo::LogsRepository;

pub const DEMO_FAULT_MESSAGE: &str = "Fake exception created for demo";

/// Audit log assembly on top of the log façade.
#[derive(Clone)]
pub struct LogService {
    repo: Arc<dyn LogsRepository>,
}

impl LogService {
    pub fn new(repo: Arc<dyn LogsRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "logs.service.list_all", skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Log>, DomainError> {
        debug!("Listing logs");
        self.repo
            .list_all()
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))
    }

    /// Stamp and append a record. A rejected write hands back the record
    /// marked unsuccessful with the failure message as its exception.
    #[instrument(name = "logs.service.create_log", skip(self, message), fields(level = %level))]
    pub async fn create_log(&self, level: LogLevel, message: impl Into<String>) -> Envelope<Log> {
        let mut log = Log::new(level, message, Utc::now());
        log.is_success = true;

        let failure = match self.repo.insert(log.clone()).await {
            Ok(env) if env.success => {
                debug!("Appended log record");
                let saved = env.into_value().unwrap_or(log);
                return Envelope::success(saved, "Success");
            }
            Ok(env) => env.message,
            Err(e) => format!("{e:#}"),
        };

        error!("Log record was not stored: {}", failure);
        log.is_success = false;
        log.exception = Some(failure.clone());
        Envelope::failure_with(log, failure)
    }

    #[instrument(name = "logs.service.get_log", skip(self), fields(log_id = id))]
    pub async fn get_log(&self, id: i64) -> Envelope<Log> {
        match self.repo.find_log(id).await {
            Ok(env) => env,
            Err(e) => {
                error!("Log lookup faulted: {:#}", e);
                Envelope::failure(format!("{e:#}"))
            }
        }
    }

    /// Append the canned demo error record.
    #[instrument(name = "logs.service.record_demo_fault", skip(self))]
    pub async fn record_demo_fault(&self) -> Envelope<Log> {
        info!("Recording demo fault");
        self.create_log(LogLevel::Error, DEMO_FAULT_MESSAGE).await
    }
}

#[async_trait]
impl AuditPort for LogService {
    async fn record(&self, level: LogLevel, message: String) -> Envelope<Log> {
        self.create_log(level, message).await
    }
}
