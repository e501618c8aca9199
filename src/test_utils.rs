//! Shared test utilities for the wallet core.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test wallets, credits, and rules with sensible defaults.

use crate::{
    core::{
        ledger::{self, CreditRequest, DebitRequest},
        rules::{self, CreateRuleRequest, Schedule},
        wallet,
    },
    entities,
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test wallet with default display fields.
///
/// # Defaults
/// * `email`: `"test@example.com"`
/// * `name`: `"Test Member"`
pub async fn create_test_wallet(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<entities::wallet::Model> {
    wallet::ensure_wallet(db, user_id, "test@example.com", "Test Member").await
}

/// Credits a test wallet, creating it on first use.
///
/// # Defaults
/// * `source`: `"topup"`
/// * no description, metadata, or actor
pub async fn credit_test_wallet(
    db: &DatabaseConnection,
    user_id: &str,
    amount: i64,
    reference: &str,
) -> Result<entities::wallet::Model> {
    ledger::credit_wallet(
        db,
        CreditRequest {
            user_id: user_id.to_string(),
            email: "test@example.com".to_string(),
            name: "Test Member".to_string(),
            amount,
            reference: reference.to_string(),
            source: "topup".to_string(),
            description: None,
            metadata: None,
            created_by: None,
        },
    )
    .await
}

/// Builds a debit request with test defaults (`source = "service-charge"`).
#[must_use]
pub fn debit_request(user_id: &str, amount: i64, reference: &str) -> DebitRequest {
    DebitRequest {
        user_id: user_id.to_string(),
        amount,
        reference: reference.to_string(),
        source: "service-charge".to_string(),
        description: None,
        metadata: None,
        created_by: None,
    }
}

/// Creates a test rule with a default description.
///
/// # Defaults
/// * `description`: `"Monthly dues"`
/// * `created_by`: `"admin"`
pub async fn create_test_rule(
    db: &DatabaseConnection,
    user_id: &str,
    amount: i64,
    schedule: Schedule,
) -> Result<entities::wallet_rule::Model> {
    rules::create_wallet_rule(
        db,
        CreateRuleRequest {
            user_id: user_id.to_string(),
            amount,
            schedule,
            description: "Monthly dues".to_string(),
            created_by: "admin".to_string(),
        },
    )
    .await
}

/// Rewrites a rule's `next_run_at`, used to simulate the passage of time.
pub async fn set_rule_next_run(
    db: &DatabaseConnection,
    rule_id: i64,
    next_run_at: DateTime<Utc>,
) -> Result<()> {
    let rule = entities::WalletRule::find_by_id(rule_id)
        .one(db)
        .await?
        .ok_or(Error::RuleNotFound { id: rule_id })?;

    let mut active_model: entities::wallet_rule::ActiveModel = rule.into();
    active_model.next_run_at = Set(next_run_at);
    active_model.update(db).await?;
    Ok(())
}

/// Backdates a rule so the scheduler sees it as due.
pub async fn make_rule_due(db: &DatabaseConnection, rule_id: i64) -> Result<()> {
    set_rule_next_run(db, rule_id, Utc::now() - Duration::minutes(5)).await
}

/// Sets up a complete test environment with a wallet.
/// Returns (db, wallet) for common test scenarios.
pub async fn setup_with_wallet() -> Result<(DatabaseConnection, entities::wallet::Model)> {
    let db = setup_test_db().await?;
    let wallet = create_test_wallet(&db, "u1").await?;
    Ok((db, wallet))
}
