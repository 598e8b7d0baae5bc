use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use runtime::{AppConfig, CliArgs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use user_management::client::UserManagementApi;
use user_management::config::UserManagementConfig;
use user_management::model::{Envelope, Log, LogLevel, User, UserDetails};
use user_management::UserManagement;

const MODULE_NAME: &str = "user_management";

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps in-memory DSNs as-is.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if runtime::is_in_memory_url(dsn) {
        return Ok(dsn.to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// usermgmt - user roster and audit log administration
#[derive(Parser)]
#[command(name = "usermgmt")]
#[command(about = "usermgmt - user roster and audit log administration")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check configuration
    Check,
    /// Manage the user roster
    #[command(subcommand)]
    Users(UsersCommand),
    /// Inspect the audit log
    #[command(subcommand)]
    Logs(LogsCommand),
}

#[derive(Subcommand)]
enum UsersCommand {
    /// List users
    List {
        /// Only active users
        #[arg(long, conflicts_with = "inactive")]
        active: bool,
        /// Only inactive users
        #[arg(long)]
        inactive: bool,
    },
    /// Show one user
    View { id: i64 },
    /// Create a user (starts inactive)
    Add(UserFields),
    /// Replace a user's fields (resets the active flag)
    Edit {
        id: i64,
        #[command(flatten)]
        fields: UserFields,
    },
    /// Delete a user
    Delete { id: i64 },
    /// Run the store fault probe
    Fault,
}

#[derive(Subcommand)]
enum LogsCommand {
    /// List audit records in insertion order
    List {
        /// Only records at or above this severity (Trace, Debug, Information,
        /// Warning, Error, Critical)
        #[arg(long)]
        level: Option<LogLevel>,
    },
    /// Show one audit record
    View { id: i64 },
    /// Append the demo error record
    Fault,
}

#[derive(Args)]
struct UserFields {
    #[arg(long)]
    forename: String,
    #[arg(long)]
    surname: String,
    #[arg(long)]
    email: String,
    /// Date of birth, YYYY-MM-DD
    #[arg(long, value_parser = parse_date)]
    dob: NaiveDate,
}

impl From<UserFields> for UserDetails {
    fn from(f: UserFields) -> Self {
        Self {
            forename: f.forename,
            surname: f.surname,
            email: f.email,
            date_of_birth: f.dob,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (mock store / verbosity)
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.app.home_dir));
    tracing::info!("usermgmt starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => check_config(&config),
        Commands::Users(cmd) => {
            let api = open(&config).await?;
            run_users(api.as_ref(), cmd).await
        }
        Commands::Logs(cmd) => {
            let api = open(&config).await?;
            run_logs(api.as_ref(), cmd).await
        }
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    // Surface module config errors without touching the store
    let _: UserManagementConfig = config.module_config(MODULE_NAME)?;
    let db = config.database_or_default();
    absolutize_sqlite_dsn(&db.url, Path::new(&config.app.home_dir), false)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn open(config: &AppConfig) -> Result<Arc<dyn UserManagementApi>> {
    let module_cfg: UserManagementConfig = config.module_config(MODULE_NAME)?;
    let db = config.database_or_default();
    let url = absolutize_sqlite_dsn(db.url.trim(), Path::new(&config.app.home_dir), true)?;

    if db.is_in_memory() {
        tracing::info!("Using in-memory database, changes are discarded on exit");
    }
    tracing::info!("Connecting to database: {}", url);
    let module = UserManagement::connect(&url, db.max_conns, &module_cfg).await?;
    Ok(module.client())
}

async fn run_users(api: &dyn UserManagementApi, cmd: UsersCommand) -> Result<()> {
    match cmd {
        UsersCommand::List { active, inactive } => {
            let filter = match (active, inactive) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            for user in api.list_users(filter).await? {
                println!("{}", format_user(&user));
            }
            Ok(())
        }
        UsersCommand::View { id } => match api.get_user(id).await? {
            Some(user) => {
                println!("{}", format_user(&user));
                Ok(())
            }
            None => Err(anyhow!("User {id} not found")),
        },
        UsersCommand::Add(fields) => report(api.create_user(fields.into()).await, format_user),
        UsersCommand::Edit { id, fields } => {
            report(api.update_user(id, fields.into()).await, format_user)
        }
        UsersCommand::Delete { id } => report(api.delete_user(id).await, format_user),
        UsersCommand::Fault => report(api.trigger_fault().await, format_user),
    }
}

async fn run_logs(api: &dyn UserManagementApi, cmd: LogsCommand) -> Result<()> {
    match cmd {
        LogsCommand::List { level } => {
            let logs = api.list_logs().await?;
            for log in logs.iter().filter(|l| level.map_or(true, |min| l.level >= min)) {
                println!("{}", format_log(&log));
            }
            Ok(())
        }
        LogsCommand::View { id } => report(api.get_log(id).await, format_log),
        LogsCommand::Fault => report(api.record_demo_fault().await, format_log),
    }
}

/// Print a successful envelope; a failed one becomes the process error.
fn report<T>(env: Envelope<T>, render: fn(&T) -> String) -> Result<()> {
    if !env.success {
        return Err(anyhow!(env.message));
    }
    println!("{}", env.message);
    if let Some(value) = env.value() {
        println!("{}", render(value));
    }
    Ok(())
}

fn format_user(u: &User) -> String {
    format!(
        "{:>4}  {} {}  <{}>  born {}  {}",
        u.id,
        u.forename,
        u.surname,
        u.email,
        u.date_of_birth,
        if u.is_active { "active" } else { "inactive" }
    )
}

fn format_log(l: &Log) -> String {
    let mut line = format!(
        "{:>4}  {}  {:<11}  {}  {}",
        l.id,
        l.timestamp.format("%Y-%m-%d %H:%M:%S"),
        l.level.as_str(),
        if l.is_success { "ok" } else { "--" },
        l.message
    );
    if let Some(exception) = &l.exception {
        line.push_str(&format!("  [{exception}]"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_dsn_is_kept() {
        let base = Path::new("/tmp/base");
        assert_eq!(
            absolutize_sqlite_dsn("sqlite::memory:", base, false).unwrap(),
            "sqlite::memory:"
        );
        let shared = "sqlite://file:roster?mode=memory&cache=shared";
        assert_eq!(absolutize_sqlite_dsn(shared, base, false).unwrap(), shared);
    }

    #[test]
    fn relative_sqlite_path_is_anchored_at_base_dir() {
        let base = Path::new("/tmp/base");
        let dsn = absolutize_sqlite_dsn("sqlite://data/users.db?mode=rwc", base, false).unwrap();
        assert_eq!(dsn, "sqlite:///tmp/base/data/users.db?mode=rwc");
    }

    #[test]
    fn non_sqlite_dsn_is_rejected() {
        let base = Path::new("/tmp/base");
        assert!(absolutize_sqlite_dsn("postgres://localhost/db", base, false).is_err());
        assert!(absolutize_sqlite_dsn("sqlite://", base, false).is_err());
    }

    #[test]
    fn dates_parse_as_iso() {
        assert_eq!(
            parse_date("1990-01-01"),
            Ok(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap())
        );
        assert!(parse_date("01/01/1990").is_err());
    }

    #[test]
    fn logs_list_level_parses_by_name() {
        let cli = Cli::try_parse_from(["usermgmt", "logs", "list", "--level", "warning"]).unwrap();
        match cli.command {
            Some(Commands::Logs(LogsCommand::List { level })) => {
                assert_eq!(level, Some(LogLevel::Warning))
            }
            _ => panic!("expected logs list"),
        }

        assert!(Cli::try_parse_from(["usermgmt", "logs", "list", "--level", "warn"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
