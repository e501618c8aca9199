//! Wallet statement reporting.
//!
//! Provides the structured view the admin dashboard renders for one member:
//! the wallet record, recent ledger activity, and lifetime credit/debit
//! totals. Framework-agnostic; the HTTP layer formats the result.

use crate::{
    entities::{LedgerEntry, ledger_entry, wallet},
    errors::{Error, Result},
};
use sea_orm::{DatabaseConnection, prelude::*};

/// A member's wallet overview with recent activity and lifetime totals.
#[derive(Debug, Clone)]
pub struct WalletStatement {
    /// The wallet being reported on
    pub wallet: wallet::Model,
    /// Most recent ledger entries, newest first
    pub recent_entries: Vec<ledger_entry::Model>,
    /// Sum of all completed credits
    pub total_credited: i64,
    /// Sum of all completed debits
    pub total_debited: i64,
}

/// Generates a statement for one member's wallet.
///
/// Totals are computed over completed entries only; failed attempts appear in
/// the recent activity but never move the totals. `entry_limit` bounds the
/// recent entries (default 10).
pub async fn generate_wallet_statement(
    db: &DatabaseConnection,
    user_id: &str,
    entry_limit: Option<u64>,
) -> Result<WalletStatement> {
    let wallet = crate::core::wallet::get_wallet(db, user_id)
        .await?
        .ok_or_else(|| Error::WalletNotFound {
            user_id: user_id.to_string(),
        })?;

    let limit = entry_limit.unwrap_or(10);
    let recent_entries = crate::core::ledger::list_ledger(db, user_id, Some(limit)).await?;

    let completed = LedgerEntry::find()
        .filter(ledger_entry::Column::UserId.eq(user_id))
        .filter(ledger_entry::Column::Status.eq("completed"))
        .all(db)
        .await?;

    let mut total_credited = 0;
    let mut total_debited = 0;
    for entry in &completed {
        if entry.entry_type == "credit" {
            total_credited += entry.amount;
        } else {
            total_debited += entry.amount;
        }
    }

    Ok(WalletStatement {
        wallet,
        recent_entries,
        total_credited,
        total_debited,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::ledger::debit_wallet;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_generate_wallet_statement() -> Result<()> {
        let db = setup_test_db().await?;

        credit_test_wallet(&db, "u1", 1000, "pay-1").await?;
        credit_test_wallet(&db, "u1", 500, "pay-2").await?;
        debit_wallet(&db, debit_request("u1", 300, "svc-1")).await?;
        let refused = debit_wallet(&db, debit_request("u1", 9999, "svc-2")).await;
        assert!(refused.is_err());

        let statement = generate_wallet_statement(&db, "u1", None).await?;

        assert_eq!(statement.wallet.balance, 1200);
        assert_eq!(statement.total_credited, 1500);
        // The refused debit never moves the totals
        assert_eq!(statement.total_debited, 300);
        assert_eq!(statement.recent_entries.len(), 4);
        assert_eq!(statement.recent_entries[0].status, "failed");

        Ok(())
    }

    #[tokio::test]
    async fn test_statement_limits_recent_entries() -> Result<()> {
        let db = setup_test_db().await?;

        for i in 0..5 {
            credit_test_wallet(&db, "u1", 100, &format!("pay-{i}")).await?;
        }

        let statement = generate_wallet_statement(&db, "u1", Some(2)).await?;
        assert_eq!(statement.recent_entries.len(), 2);
        // Totals still cover everything
        assert_eq!(statement.total_credited, 500);

        Ok(())
    }

    #[tokio::test]
    async fn test_statement_missing_wallet() -> Result<()> {
        let db = setup_test_db().await?;

        let result = generate_wallet_statement(&db, "ghost", None).await;
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            Error::WalletNotFound { user_id: _ }
        ));

        Ok(())
    }
}
