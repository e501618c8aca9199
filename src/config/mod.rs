/// Database configuration and connection management
pub mod database;

/// Recurring-rule seed configuration from config.toml
pub mod rules;
