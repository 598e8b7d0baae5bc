use serde::{Deserialize, Serialize};

use crate::domain::validator::DEFAULT_MIN_ADULT_AGE;

/// Configuration for the user_management module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UserManagementConfig {
    /// Insert the bootstrap roster and log records into empty tables.
    #[serde(default = "default_seed_fixtures")]
    pub seed_fixtures: bool,
    #[serde(default = "default_min_adult_age")]
    pub min_adult_age: u32,
}

impl Default for UserManagementConfig {
    fn default() -> Self {
        Self {
            seed_fixtures: default_seed_fixtures(),
            min_adult_age: default_min_adult_age(),
        }
    }
}

fn default_seed_fixtures() -> bool {
    true
}

fn default_min_adult_age() -> u32 {
    DEFAULT_MIN_ADULT_AGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: UserManagementConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg, UserManagementConfig::default());
        assert!(cfg.seed_fixtures);
        assert_eq!(cfg.min_adult_age, 18);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<UserManagementConfig, _> =
            serde_json::from_value(serde_json::json!({ "page_size": 10 }));
        assert!(res.is_err());
    }
}
