use chrono::{Datelike, NaiveDate, Utc};
use validator::ValidateEmail;

use crate::contract::model::UserDetails;
use crate::domain::error::DomainError;

pub const DEFAULT_MIN_ADULT_AGE: u32 = 18;

/// Current calendar date (UTC).
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Whole years between `date_of_birth` and `on`, one less if the birthday
/// has not come round yet in `on`'s year.
pub fn age_on(date_of_birth: NaiveDate, on: NaiveDate) -> i32 {
    let years = on.year() - date_of_birth.year();
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years - 1
    } else {
        years
    }
}

/// Input rules for user records.
#[derive(Debug, Clone)]
pub struct UserValidator {
    min_adult_age: u32,
}

impl Default for UserValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ADULT_AGE)
    }
}

impl UserValidator {
    pub fn new(min_adult_age: u32) -> Self {
        Self { min_adult_age }
    }

    pub fn min_adult_age(&self) -> u32 {
        self.min_adult_age
    }

    /// A single bare address: no surrounding whitespace, no display name,
    /// no trailing period.
    pub fn is_valid_email(&self, email: &str) -> bool {
        if email.trim().is_empty() || email.ends_with('.') {
            return false;
        }
        if email.trim() != email {
            return false;
        }
        email.validate_email()
    }

    pub fn is_adult(&self, date_of_birth: NaiveDate) -> bool {
        self.is_adult_on(date_of_birth, today())
    }

    pub fn is_adult_on(&self, date_of_birth: NaiveDate, on: NaiveDate) -> bool {
        i64::from(age_on(date_of_birth, on)) >= i64::from(self.min_adult_age)
    }

    /// Check every rule, reporting the first one broken.
    pub fn validate(&self, details: &UserDetails) -> Result<(), DomainError> {
        self.validate_on(details, today())
    }

    pub fn validate_on(&self, details: &UserDetails, on: NaiveDate) -> Result<(), DomainError> {
        if details.forename.trim().is_empty() {
            return Err(DomainError::empty_field("Forename"));
        }
        if details.surname.trim().is_empty() {
            return Err(DomainError::empty_field("Surname"));
        }
        if !self.is_valid_email(&details.email) {
            return Err(DomainError::invalid_email(details.email.clone()));
        }
        if !self.is_adult_on(details.date_of_birth, on) {
            return Err(DomainError::underage(self.min_adult_age));
        }
        Ok(())
    }
}
