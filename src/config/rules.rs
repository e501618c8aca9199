//! Recurring-rule seed configuration loading from config.toml
//!
//! This module provides functionality to load recurring auto-debit rule
//! definitions from a TOML configuration file. The rules defined in
//! config.toml are used to seed the database on startup when they are
//! missing, so standing dues and pledges survive a fresh deployment.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct RulesConfig {
    /// List of rule definitions to seed
    #[serde(default)]
    pub rules: Vec<RuleSeed>,
}

/// Configuration for a single recurring rule
#[derive(Debug, Deserialize, Clone)]
pub struct RuleSeed {
    /// Member whose wallet the rule debits
    pub user_id: String,
    /// Amount in minor currency units
    pub amount: i64,
    /// Cadence: `"daily"`, `"weekly"`, or `"monthly"`
    pub schedule: String,
    /// Description carried onto each ledger entry the rule produces
    pub description: String,
    /// Optional operator recorded on the rule, defaults to `"config"`
    #[serde(default)]
    pub created_by: Option<String>,
}

/// Loads rule configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RulesConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads rule configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<RulesConfig> {
    load_config("config.toml")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_rules_config() {
        let toml_str = r#"
            [[rules]]
            user_id = "u1"
            amount = 1000
            schedule = "monthly"
            description = "Camp dues"
            created_by = "admin"

            [[rules]]
            user_id = "u2"
            amount = 500
            schedule = "weekly"
            description = "Building pledge"
        "#;

        let config: RulesConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].user_id, "u1");
        assert_eq!(config.rules[0].amount, 1000);
        assert_eq!(config.rules[0].schedule, "monthly");
        assert_eq!(config.rules[0].created_by, Some("admin".to_string()));

        assert_eq!(config.rules[1].description, "Building pledge");
        assert_eq!(config.rules[1].created_by, None);
    }

    #[test]
    fn test_parse_empty_config() {
        let config: RulesConfig = toml::from_str("").unwrap();
        assert!(config.rules.is_empty());
    }
}
