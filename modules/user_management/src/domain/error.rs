use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },

    #[error("Invalid email format: '{email}'")]
    InvalidEmail { email: String },

    #[error("User must be at least {min_age} years old")]
    Underage { min_age: u32 },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn empty_field(field: &'static str) -> Self {
        Self::EmptyField { field }
    }

    pub fn invalid_email(email: impl Into<String>) -> Self {
        Self::InvalidEmail {
            email: email.into(),
        }
    }

    pub fn underage(min_age: u32) -> Self {
        Self::Underage { min_age }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

/// Raised by strict lookups when the identifier is absent from the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Entity of type {entity} with ID {id} not found.")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: i64,
}

impl NotFoundError {
    pub fn new(entity: &'static str, id: i64) -> Self {
        Self { entity, id }
    }
}
