use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

/// Identifier carried by entities that have not been persisted yet.
/// The store assigns the real one on insert.
pub const UNASSIGNED_ID: i64 = 0;

/// Roster entry (no serde; transport DTOs live with their transport)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub forename: String,
    pub surname: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub is_active: bool,
}

/// Caller-supplied user fields for create and update.
/// Update replaces every field, so there is no partial variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    pub forename: String,
    pub surname: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
}

impl User {
    /// Build a user from details with the given identifier and active flag.
    pub fn from_details(id: i64, details: UserDetails, is_active: bool) -> Self {
        Self {
            id,
            forename: details.forename,
            surname: details.surname,
            email: details.email,
            date_of_birth: details.date_of_birth,
            is_active,
        }
    }
}

/// Audit log severity. Ordering is for display and filtering only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Information,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Information,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "Trace",
            LogLevel::Debug => "Debug",
            LogLevel::Information => "Information",
            LogLevel::Warning => "Warning",
            LogLevel::Error => "Error",
            LogLevel::Critical => "Critical",
        }
    }

    /// Stable numeric code used by the store.
    pub fn code(self) -> i32 {
        match self {
            LogLevel::Trace => 0,
            LogLevel::Debug => 1,
            LogLevel::Information => 2,
            LogLevel::Warning => 3,
            LogLevel::Error => 4,
            LogLevel::Critical => 5,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct ParseLogLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLogLevelError(s.to_string()))
    }
}

/// Audit log record. Append-only: the store never updates or removes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub is_success: bool,
    pub message: String,
    pub exception: Option<String>,
}

impl Log {
    /// Unsaved record stamped with `timestamp`.
    pub fn new(level: LogLevel, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            timestamp,
            level,
            is_success: false,
            message: message.into(),
            exception: None,
        }
    }
}

/// Uniform outcome of a mutating operation.
///
/// A failed envelope always carries a non-empty message. Façade failures
/// carry no value; the log service may attach the record it failed to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: String,
    pub value: Option<T>,
}

const FALLBACK_FAILURE_MESSAGE: &str = "Operation failed.";

fn failure_message(message: String) -> String {
    if message.trim().is_empty() {
        FALLBACK_FAILURE_MESSAGE.to_string()
    } else {
        message
    }
}

impl<T> Envelope<T> {
    pub fn success(value: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            value: Some(value),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: failure_message(message.into()),
            value: None,
        }
    }

    /// Failed outcome that still hands back the value it concerns.
    pub fn failure_with(value: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: failure_message(message.into()),
            value: Some(value),
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

/// Outcome of a by-id read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(v) => Lookup::Found(f(v)),
            Lookup::NotFound => Lookup::NotFound,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Lookup::Found(v),
            None => Lookup::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_are_ordered() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Information < LogLevel::Warning);
        assert!(LogLevel::Error < LogLevel::Critical);
        let mut shuffled = vec![LogLevel::Error, LogLevel::Trace, LogLevel::Warning];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![LogLevel::Trace, LogLevel::Warning, LogLevel::Error]
        );
    }

    #[test]
    fn log_level_codes_are_stable() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_code(level.code()), Some(level));
        }
        assert_eq!(LogLevel::from_code(6), None);
        assert_eq!(LogLevel::Information.code(), 2);
    }

    #[test]
    fn log_level_parses_case_insensitively() {
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!(" CRITICAL ".parse::<LogLevel>(), Ok(LogLevel::Critical));
        assert!("warn".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Information.to_string(), "Information");
    }

    #[test]
    fn failed_envelope_never_has_empty_message() {
        let env: Envelope<()> = Envelope::failure("");
        assert!(!env.success);
        assert_eq!(env.message, FALLBACK_FAILURE_MESSAGE);
        assert!(env.value.is_none());

        let env = Envelope::failure_with(7, "   ");
        assert_eq!(env.message, FALLBACK_FAILURE_MESSAGE);
        assert_eq!(env.value, Some(7));
    }

    #[test]
    fn lookup_converts_from_option() {
        assert_eq!(Lookup::from(Some(1)), Lookup::Found(1));
        assert_eq!(Lookup::<i32>::from(None), Lookup::NotFound);
        assert_eq!(Lookup::Found(3).map(|v| v + 1).into_option(), Some(4));
    }
}
