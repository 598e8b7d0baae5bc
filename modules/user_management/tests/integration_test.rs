use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DatabaseConnection};

use user_management::client::UserManagementApi;
use user_management::config::UserManagementConfig;
use user_management::contract::model::{Log, LogLevel, Lookup, User, UserDetails, UNASSIGNED_ID};
use user_management::domain::repo::{Insertable, LogsRepository, Readable, UsersRepository, Writable};
use user_management::infra::storage::{
    self, logs_repo::SeaOrmLogsRepository, seed::seed_fixtures, users_repo::SeaOrmUsersRepository,
};
use user_management::UserManagement;

/// Fresh migrated in-memory store per test
async fn create_test_db() -> DatabaseConnection {
    storage::open_in_memory()
        .await
        .expect("Failed to open test database")
}

fn unseeded() -> UserManagementConfig {
    UserManagementConfig {
        seed_fixtures: false,
        ..Default::default()
    }
}

async fn create_test_client(cfg: &UserManagementConfig) -> Arc<dyn UserManagementApi> {
    let conn = storage::connect(storage::IN_MEMORY_URL, None)
        .await
        .expect("Failed to connect to test database");
    UserManagement::init(conn, cfg)
        .await
        .expect("Failed to init module")
        .client()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn details(forename: &str, surname: &str, email: &str) -> UserDetails {
    UserDetails {
        forename: forename.into(),
        surname: surname.into(),
        email: email.into(),
        date_of_birth: date(1990, 1, 1),
    }
}

fn new_user(email: &str) -> User {
    User::from_details(UNASSIGNED_ID, details("Ada", "Lovelace", email), true)
}

#[tokio::test]
async fn test_users_facade_crud() -> Result<()> {
    let repo = SeaOrmUsersRepository::new(create_test_db().await);

    let first = repo.insert(new_user("a@example.com")).await?;
    assert!(first.success);
    assert_eq!(first.message, "Creation successful.");
    let first = first.value.unwrap();
    let second = repo.insert(new_user("b@example.com")).await?.value.unwrap();
    assert!(second.id > first.id, "ids are assigned monotonically");

    let listed = repo.list_all().await?;
    assert_eq!(listed, vec![first.clone(), second.clone()]);

    let mut changed = first.clone();
    changed.surname = "Byron".into();
    let env = repo.update(changed.clone()).await?;
    assert!(env.success);
    assert_eq!(env.message, "Update successful.");
    assert_eq!(repo.get_by_id(first.id).await?, Lookup::Found(changed.clone()));

    let env = repo.remove(changed).await?;
    assert!(env.success);
    assert_eq!(env.message, "Delete successful.");
    assert_eq!(repo.get_by_id(first.id).await?, Lookup::NotFound);

    Ok(())
}

#[tokio::test]
async fn test_users_facade_zero_rows_are_failed_envelopes() -> Result<()> {
    let repo = SeaOrmUsersRepository::new(create_test_db().await);
    let ghost = User {
        id: 404,
        ..new_user("ghost@example.com")
    };

    let env = repo.update(ghost.clone()).await?;
    assert!(!env.success);
    assert_eq!(env.message, "Update failed.");
    assert!(env.value.is_none());

    let env = repo.remove(ghost).await?;
    assert!(!env.success);
    assert_eq!(env.message, "Delete failed.");
    assert!(env.value.is_none());
    Ok(())
}

#[tokio::test]
async fn test_strict_and_raw_user_lookup() -> Result<()> {
    let repo = SeaOrmUsersRepository::new(create_test_db().await);

    assert_eq!(repo.get_by_id(12).await?, Lookup::NotFound);
    let err = repo.fetch(12).await.unwrap_err();
    assert_eq!(err.to_string(), "Entity of type User with ID 12 not found.");
    Ok(())
}

#[tokio::test]
async fn test_fault_probe_always_errors() {
    let repo = SeaOrmUsersRepository::new(create_test_db().await);
    let err = repo.raise_fault().await.unwrap_err();
    assert!(format!("{err:#}").contains("fault_probe"));
}

#[tokio::test]
async fn test_log_facade_append_and_lookup() -> Result<()> {
    let repo = SeaOrmLogsRepository::new(create_test_db().await);

    let mut log = Log::new(LogLevel::Warning, "careful", chrono::Utc::now());
    log.exception = Some("details".into());
    let env = repo.insert(log.clone()).await?;
    assert!(env.success);
    assert_eq!(env.message, "Log created");
    let saved = env.value.unwrap();
    assert_eq!(saved.level, LogLevel::Warning);
    assert_eq!(saved.exception.as_deref(), Some("details"));

    let found = repo.find_log(saved.id).await?;
    assert!(found.success);
    assert_eq!(found.message, "Log found");
    assert_eq!(found.value.unwrap().message, "careful");
    Ok(())
}

#[tokio::test]
async fn test_log_facade_swallows_store_faults() -> Result<()> {
    let conn = create_test_db().await;
    conn.execute_unprepared("DROP TABLE logs").await?;
    let repo = SeaOrmLogsRepository::new(conn);

    let env = repo
        .insert(Log::new(LogLevel::Information, "lost", chrono::Utc::now()))
        .await?;
    assert!(!env.success);
    assert_eq!(env.message, "Error creating log.");
    assert!(env.value.is_none());
    Ok(())
}

#[tokio::test]
async fn test_log_lookup_miss_is_recorded_once() -> Result<()> {
    let conn = create_test_db().await;
    let repo = SeaOrmLogsRepository::with_self_audit(conn);

    let env = repo.find_log(77).await?;
    assert!(!env.success);
    assert_eq!(env.message, "Log not found");
    assert!(env.value.is_none());

    let logs = repo.list_all().await?;
    assert_eq!(logs.len(), 1, "the hook must not recurse");
    assert_eq!(logs[0].level, LogLevel::Error);
    assert_eq!(logs[0].message, "Log with ID 77 not found.");
    assert!(!logs[0].is_success);
    Ok(())
}

#[tokio::test]
async fn test_plain_log_store_has_no_miss_side_effects() -> Result<()> {
    let repo = SeaOrmLogsRepository::new(create_test_db().await);
    let env = repo.find_log(1).await?;
    assert_eq!(env.message, "Log not found");
    assert!(repo.list_all().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_seed_fixtures_runs_once() -> Result<()> {
    let conn = create_test_db().await;

    let report = seed_fixtures(&conn).await?;
    assert_eq!((report.users, report.logs), (11, 2));
    let again = seed_fixtures(&conn).await?;
    assert_eq!((again.users, again.logs), (0, 0));

    let users = SeaOrmUsersRepository::new(conn.clone()).list_all().await?;
    assert_eq!(users.len(), 11);
    assert_eq!(users[0].email, "ploew@example.com");
    assert_eq!(users[1].forename, "Benjamin Franklin");
    assert_eq!(users.iter().filter(|u| !u.is_active).count(), 4);

    let logs = SeaOrmLogsRepository::new(conn.clone()).list_all().await?;
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].message, "Logging started");
    assert_eq!(logs[1].level, LogLevel::Error);
    assert_eq!(logs[1].exception.as_deref(), Some("Fake NullReferenceException"));

    // New rows continue after the fixture ids
    let created = SeaOrmUsersRepository::new(conn)
        .insert(new_user("next@example.com"))
        .await?
        .value
        .unwrap();
    assert_eq!(created.id, 12);
    Ok(())
}

#[tokio::test]
async fn test_create_user_writes_one_information_log() -> Result<()> {
    let client = create_test_client(&unseeded()).await;

    let env = client
        .create_user(details("Existing", "User", "existinguser@example.com"))
        .await;
    assert!(env.success);
    let user = env.value.unwrap();
    assert!(!user.is_active);

    let logs = client.list_logs().await?;
    let mentions: Vec<_> = logs
        .iter()
        .filter(|l| l.message.contains(&format!("User {}", user.id)))
        .collect();
    assert_eq!(mentions.len(), 1);
    assert_eq!(mentions[0].level, LogLevel::Information);
    assert!(mentions[0].is_success);
    Ok(())
}

#[tokio::test]
async fn test_get_user_missing_is_none() -> Result<()> {
    let client = create_test_client(&unseeded()).await;
    assert_eq!(client.get_user(123).await?, None);
    assert!(client.list_logs().await?.is_empty(), "reads write no logs");
    Ok(())
}

#[tokio::test]
async fn test_update_resets_active_flag() -> Result<()> {
    let client = create_test_client(&UserManagementConfig::default()).await;

    let before = client.get_user(1).await?.unwrap();
    assert!(before.is_active);

    let env = client
        .update_user(1, details("Peter", "Loew", "ploew@example.com"))
        .await;
    assert!(env.success);
    assert!(!client.get_user(1).await?.unwrap().is_active);
    Ok(())
}

#[tokio::test]
async fn test_delete_missing_user() -> Result<()> {
    let client = create_test_client(&unseeded()).await;

    let env = client.delete_user(999).await;
    assert!(!env.success);
    assert_eq!(env.message, "Delete failed.");

    let logs = client.list_logs().await?;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].level, LogLevel::Error);
    assert!(!logs[0].message.contains("deleted"));
    Ok(())
}

#[tokio::test]
async fn test_trigger_fault_end_to_end() -> Result<()> {
    let client = create_test_client(&unseeded()).await;

    let env = client.trigger_fault().await;
    assert!(!env.success);
    assert!(env.message.contains("fault_probe"));

    let logs = client.list_logs().await?;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].level, LogLevel::Error);
    Ok(())
}

#[tokio::test]
async fn test_get_log_miss_through_client() -> Result<()> {
    let client = create_test_client(&UserManagementConfig::default()).await;

    let env = client.get_log(50).await;
    assert!(!env.success);
    assert_eq!(env.message, "Log not found");

    let logs = client.list_logs().await?;
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[2].message, "Log with ID 50 not found.");

    let demo = client.record_demo_fault().await;
    assert!(demo.success);
    assert_eq!(demo.value.unwrap().id, 4);
    Ok(())
}

#[tokio::test]
async fn test_list_users_filters() -> Result<()> {
    let client = create_test_client(&UserManagementConfig::default()).await;

    assert_eq!(client.list_users(None).await?.len(), 11);
    let active = client.list_users(Some(true)).await?;
    assert_eq!(active.len(), 7);
    assert!(active.iter().all(|u| u.is_active));
    let inactive = client.list_users(Some(false)).await?;
    assert_eq!(inactive.len(), 4);
    assert!(inactive.iter().all(|u| !u.is_active));
    Ok(())
}

#[tokio::test]
async fn test_configured_min_age_applies() -> Result<()> {
    let cfg = UserManagementConfig {
        seed_fixtures: false,
        min_adult_age: 200,
    };
    let client = create_test_client(&cfg).await;

    let env = client
        .create_user(details("Old", "Enough", "old@example.com"))
        .await;
    assert!(!env.success);
    assert_eq!(env.message, "User must be at least 200 years old");
    Ok(())
}

#[tokio::test]
async fn test_end_to_end_create_list_update() -> Result<()> {
    let client = create_test_client(&unseeded()).await;

    let created = client
        .create_user(details("Existing", "User", "existinguser@example.com"))
        .await;
    assert!(created.success);
    let id = created.value.unwrap().id;

    let listed = client.list_users(None).await?;
    let entry = listed.iter().find(|u| u.id == id).expect("listed");
    assert!(!entry.is_active);
    assert_eq!(entry.email, "existinguser@example.com");

    let updated = client
        .update_user(id, details("Existing", "User", "newemail@example.com"))
        .await;
    assert!(updated.success);

    let fetched = client.get_user(id).await?.expect("still present");
    assert_eq!(fetched.email, "newemail@example.com");
    assert_eq!(fetched.forename, "Existing");
    assert_eq!(fetched.surname, "User");
    assert_eq!(fetched.date_of_birth, date(1990, 1, 1));
    assert!(!fetched.is_active);
    Ok(())
}
