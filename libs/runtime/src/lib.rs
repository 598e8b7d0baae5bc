//! Process-level plumbing shared by binaries: layered configuration,
//! logging setup and home directory resolution.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    default_logging_config, is_in_memory_url, AppConfig, AppSection, CliArgs, DatabaseConfig,
    LoggingConfig, Section,
};
