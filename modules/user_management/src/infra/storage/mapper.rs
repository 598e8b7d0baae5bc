use sea_orm::{ActiveValue::NotSet, Set};

use crate::contract::model::{Log, LogLevel, User, UNASSIGNED_ID};
use crate::infra::storage::entity::{log, user};

impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            forename: m.forename,
            surname: m.surname,
            email: m.email,
            date_of_birth: m.date_of_birth,
            is_active: m.is_active,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("log {id} has unknown level code {code}")]
pub struct UnknownLevelCode {
    pub id: i64,
    pub code: i32,
}

impl TryFrom<log::Model> for Log {
    type Error = UnknownLevelCode;

    fn try_from(m: log::Model) -> Result<Self, Self::Error> {
        let level = LogLevel::from_code(m.level).ok_or(UnknownLevelCode {
            id: m.id,
            code: m.level,
        })?;
        Ok(Self {
            id: m.id,
            timestamp: m.timestamp,
            level,
            is_success: m.is_success,
            message: m.message,
            exception: m.exception,
        })
    }
}

/// Active model for a user. An unassigned id is left for the store to pick.
pub fn user_active_model(u: &User) -> user::ActiveModel {
    user::ActiveModel {
        id: if u.id == UNASSIGNED_ID { NotSet } else { Set(u.id) },
        forename: Set(u.forename.clone()),
        surname: Set(u.surname.clone()),
        email: Set(u.email.clone()),
        date_of_birth: Set(u.date_of_birth),
        is_active: Set(u.is_active),
    }
}

pub fn log_active_model(l: &Log) -> log::ActiveModel {
    log::ActiveModel {
        id: if l.id == UNASSIGNED_ID { NotSet } else { Set(l.id) },
        timestamp: Set(l.timestamp),
        level: Set(l.level.code()),
        is_success: Set(l.is_success),
        message: Set(l.message.clone()),
        exception: Set(l.exception.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn unknown_level_code_is_rejected() {
        let m = log::Model {
            id: 9,
            timestamp: Utc::now(),
            level: 42,
            is_success: true,
            message: "x".into(),
            exception: None,
        };
        let err = Log::try_from(m).unwrap_err();
        assert_eq!(err.to_string(), "log 9 has unknown level code 42");
    }

    #[test]
    fn unassigned_id_is_not_set() {
        let u = User {
            id: UNASSIGNED_ID,
            forename: "A".into(),
            surname: "B".into(),
            email: "a@b.com".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            is_active: false,
        };
        assert_eq!(user_active_model(&u).id, NotSet);
        let u = User { id: 4, ..u };
        assert_eq!(user_active_model(&u).id, Set(4));
    }
}
