//! Database configuration module for the wallet core.
//!
//! This module handles `SQLite` database connection and table creation using
//! `SeaORM`. It provides functions for establishing database connections and
//! creating all necessary tables based on the entity definitions. The module
//! uses `SeaORM`'s `Schema::create_table_from_entity` method to generate SQL
//! from the entity models, so the database schema always matches the Rust
//! struct definitions without manual SQL.

use crate::entities::{LedgerEntry, Wallet, WalletRule};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the `DATABASE_URL` environment variable or
/// returns the default local `SQLite` path.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/member_wallet.sqlite".to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a default local `SQLite` file if no environment variable is
/// set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates the wallet, ledger, and rule tables from the entity definitions.
///
/// Table creation is `IF NOT EXISTS`, so the daemon can run this on every
/// startup against an existing database.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut wallet_table = schema.create_table_from_entity(Wallet);
    let mut ledger_table = schema.create_table_from_entity(LedgerEntry);
    let mut rule_table = schema.create_table_from_entity(WalletRule);

    db.execute(builder.build(wallet_table.if_not_exists())).await?;
    db.execute(builder.build(ledger_table.if_not_exists())).await?;
    db.execute(builder.build(rule_table.if_not_exists())).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        ledger_entry::Model as LedgerEntryModel, wallet::Model as WalletModel,
        wallet_rule::Model as WalletRuleModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<WalletModel> = Wallet::find().limit(1).all(&db).await?;
        let _: Vec<LedgerEntryModel> = LedgerEntry::find().limit(1).all(&db).await?;
        let _: Vec<WalletRuleModel> = WalletRule::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<WalletModel> = Wallet::find().limit(1).all(&db).await?;
        Ok(())
    }
}
