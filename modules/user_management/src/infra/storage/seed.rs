//! Bootstrap fixtures. Each table is seeded only while it is empty.

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Set};
use tracing::info;

use crate::contract::model::LogLevel;
use crate::infra::storage::entity::{log, user};

/// (id, forename, surname, email, is_active, date of birth)
const ROSTER: [(i64, &str, &str, &str, bool, (i32, u32, u32)); 11] = [
    (1, "Peter", "Loew", "ploew@example.com", true, (1990, 1, 1)),
    (2, "Benjamin Franklin", "Gates", "bfgates@example.com", true, (1991, 2, 2)),
    (3, "Castor", "Troy", "ctroy@example.com", false, (1992, 3, 3)),
    (4, "Memphis", "Raines", "mraines@example.com", true, (1993, 4, 4)),
    (5, "Stanley", "Goodspeed", "sgodspeed@example.com", true, (1994, 5, 5)),
    (6, "H.I.", "McDunnough", "himcdunnough@example.com", true, (1995, 6, 6)),
    (7, "Cameron", "Poe", "cpoe@example.com", false, (1996, 7, 7)),
    (8, "Edward", "Malus", "emalus@example.com", false, (1997, 8, 8)),
    (9, "Damon", "Macready", "dmacready@example.com", false, (1998, 9, 9)),
    (10, "Johnny", "Blaze", "jblaze@example.com", true, (1999, 10, 10)),
    (11, "Robin", "Feld", "rfeld@example.com", true, (2000, 11, 11)),
];

/// Rows written by one seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub logs: usize,
}

pub async fn seed_fixtures<C>(conn: &C) -> anyhow::Result<SeedReport>
where
    C: ConnectionTrait,
{
    let mut report = SeedReport::default();

    if user::Entity::find().count(conn).await.context("count users")? == 0 {
        let rows = ROSTER
            .iter()
            .map(|&(id, forename, surname, email, is_active, (y, m, d))| {
                let date_of_birth = NaiveDate::from_ymd_opt(y, m, d)
                    .with_context(|| format!("invalid fixture date for user {id}"))?;
                Ok(user::ActiveModel {
                    id: Set(id),
                    forename: Set(forename.to_owned()),
                    surname: Set(surname.to_owned()),
                    email: Set(email.to_owned()),
                    date_of_birth: Set(date_of_birth),
                    is_active: Set(is_active),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        report.users = rows.len();
        user::Entity::insert_many(rows)
            .exec(conn)
            .await
            .context("seed users")?;
    }

    if log::Entity::find().count(conn).await.context("count logs")? == 0 {
        let now = Utc::now();
        let rows = vec![
            log::ActiveModel {
                id: Set(1),
                timestamp: Set(now),
                level: Set(LogLevel::Information.code()),
                is_success: Set(false),
                message: Set("Logging started".to_owned()),
                exception: Set(None),
            },
            log::ActiveModel {
                id: Set(2),
                timestamp: Set(now),
                level: Set(LogLevel::Error.code()),
                is_success: Set(false),
                message: Set("Exception example".to_owned()),
                exception: Set(Some("Fake NullReferenceException".to_owned())),
            },
        ];
        report.logs = rows.len();
        log::Entity::insert_many(rows)
            .exec(conn)
            .await
            .context("seed logs")?;
    }

    info!(users = report.users, logs = report.logs, "Seeded fixtures");
    Ok(report)
}
