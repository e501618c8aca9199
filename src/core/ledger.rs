//! Ledger business logic - Credits, debits, and the append-only audit trail.
//!
//! Every balance mutation runs inside one database transaction that pairs the
//! atomic balance update with exactly one ledger entry, successful or not. The
//! caller-supplied `reference` is the idempotency key for both operations: a
//! reference names one operation attempt, so a repeated reference returns the
//! current wallet without touching the balance or the ledger, even when the
//! original attempt failed.

use crate::{
    core::wallet::{ensure_wallet, try_debit_balance_atomic, update_wallet_balance_atomic},
    entities::{LedgerEntry, Wallet, ledger_entry, wallet},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};

/// Default number of entries returned by [`list_ledger`].
const DEFAULT_LEDGER_LIMIT: u64 = 50;

/// Parameters for [`credit_wallet`].
///
/// `reference` must uniquely identify this credit attempt; upstream payment
/// providers commonly redeliver webhooks, and the reference is what collapses
/// those replays into a single applied credit.
#[derive(Debug, Clone)]
pub struct CreditRequest {
    /// Member whose wallet is credited
    pub user_id: String,
    /// Display email, refreshed on the wallet by the embedded ensure
    pub email: String,
    /// Display name, refreshed on the wallet by the embedded ensure
    pub name: String,
    /// Positive amount in minor currency units
    pub amount: i64,
    /// Idempotency key for this operation attempt
    pub reference: String,
    /// Origin tag, e.g. `"topup"` or `"admin-adjustment"`
    pub source: String,
    /// Optional description carried onto the ledger entry
    pub description: Option<String>,
    /// Optional opaque metadata stored with the entry
    pub metadata: Option<serde_json::Value>,
    /// Optional actor recorded on the entry
    pub created_by: Option<String>,
}

/// Parameters for [`debit_wallet`].
#[derive(Debug, Clone)]
pub struct DebitRequest {
    /// Member whose wallet is debited
    pub user_id: String,
    /// Positive amount in minor currency units
    pub amount: i64,
    /// Idempotency key for this operation attempt
    pub reference: String,
    /// Origin tag, e.g. `"service-charge"` or `"auto"`
    pub source: String,
    /// Optional description; failed debits default to `"Insufficient balance"`
    pub description: Option<String>,
    /// Optional opaque metadata stored with the entry
    pub metadata: Option<serde_json::Value>,
    /// Optional actor recorded on the entry
    pub created_by: Option<String>,
}

/// Finds the ledger entry recorded under an idempotency reference, if any.
pub async fn find_ledger_entry_by_reference<C>(
    db: &C,
    reference: &str,
) -> Result<Option<ledger_entry::Model>>
where
    C: ConnectionTrait,
{
    LedgerEntry::find()
        .filter(ledger_entry::Column::Reference.eq(reference))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Credits a wallet and appends a `completed` ledger entry.
///
/// The wallet is created on first use and its display fields refreshed. If the
/// reference was already recorded, the credit is treated as applied and the
/// current wallet is returned unchanged; callers should treat that as success.
pub async fn credit_wallet(
    db: &DatabaseConnection,
    request: CreditRequest,
) -> Result<wallet::Model> {
    if request.amount <= 0 {
        return Err(Error::InvalidAmount {
            amount: request.amount,
        });
    }

    // One transaction: the balance increment and its ledger entry land together
    let txn = db.begin().await?;

    let current = ensure_wallet(&txn, &request.user_id, &request.email, &request.name).await?;

    if find_ledger_entry_by_reference(&txn, &request.reference)
        .await?
        .is_some()
    {
        // Duplicate delivery; the credit is already applied
        txn.commit().await?;
        return Ok(current);
    }

    let updated = update_wallet_balance_atomic(&txn, &request.user_id, request.amount).await?;

    let entry = ledger_entry::ActiveModel {
        reference: Set(request.reference),
        user_id: Set(request.user_id),
        entry_type: Set("credit".to_string()),
        source: Set(request.source),
        amount: Set(request.amount),
        status: Set("completed".to_string()),
        description: Set(request.description.unwrap_or_default()),
        metadata: Set(request.metadata),
        balance_after: Set(updated.balance),
        created_by: Set(request.created_by),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    entry.insert(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Debits a wallet, refusing to drive the balance below zero.
///
/// A refused debit (missing wallet or inadequate balance) still appends a
/// `failed` ledger entry carrying the untouched pre-state balance, commits it,
/// and then returns [`Error::InsufficientFunds`]; the caller must treat the
/// failure as terminal for this attempt. A repeated reference is a no-op that
/// returns the current wallet, mirroring the credit path.
pub async fn debit_wallet(db: &DatabaseConnection, request: DebitRequest) -> Result<wallet::Model> {
    if request.amount <= 0 {
        return Err(Error::InvalidAmount {
            amount: request.amount,
        });
    }

    let txn = db.begin().await?;

    if find_ledger_entry_by_reference(&txn, &request.reference)
        .await?
        .is_some()
    {
        // The reference was consumed by an earlier attempt
        let current = Wallet::find_by_id(request.user_id.as_str())
            .one(&txn)
            .await?
            .ok_or_else(|| Error::WalletNotFound {
                user_id: request.user_id.clone(),
            })?;
        txn.commit().await?;
        return Ok(current);
    }

    let current = match Wallet::find_by_id(request.user_id.as_str()).one(&txn).await? {
        Some(wallet) => wallet,
        None => {
            record_failed_debit(&txn, &request, 0).await?;
            txn.commit().await?;
            return Err(Error::InsufficientFunds {
                current: 0,
                required: request.amount,
            });
        }
    };

    if !try_debit_balance_atomic(&txn, &request.user_id, request.amount).await? {
        record_failed_debit(&txn, &request, current.balance).await?;
        txn.commit().await?;
        return Err(Error::InsufficientFunds {
            current: current.balance,
            required: request.amount,
        });
    }

    let updated = Wallet::find_by_id(request.user_id.as_str())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::WalletNotFound {
            user_id: request.user_id.clone(),
        })?;

    let entry = ledger_entry::ActiveModel {
        reference: Set(request.reference),
        user_id: Set(request.user_id),
        entry_type: Set("debit".to_string()),
        source: Set(request.source),
        amount: Set(request.amount),
        status: Set("completed".to_string()),
        description: Set(request.description.unwrap_or_default()),
        metadata: Set(request.metadata),
        balance_after: Set(updated.balance),
        created_by: Set(request.created_by),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    entry.insert(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Appends the `failed` audit row for a refused debit.
async fn record_failed_debit<C>(db: &C, request: &DebitRequest, balance_after: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let entry = ledger_entry::ActiveModel {
        reference: Set(request.reference.clone()),
        user_id: Set(request.user_id.clone()),
        entry_type: Set("debit".to_string()),
        source: Set(request.source.clone()),
        amount: Set(request.amount),
        status: Set("failed".to_string()),
        description: Set(request
            .description
            .clone()
            .unwrap_or_else(|| "Insufficient balance".to_string())),
        metadata: Set(request.metadata.clone()),
        balance_after: Set(balance_after),
        created_by: Set(request.created_by.clone()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    entry.insert(db).await?;
    Ok(())
}

/// Retrieves a member's ledger entries, most recent first.
///
/// `limit` defaults to 50 when not given.
pub async fn list_ledger(
    db: &DatabaseConnection,
    user_id: &str,
    limit: Option<u64>,
) -> Result<Vec<ledger_entry::Model>> {
    LedgerEntry::find()
        .filter(ledger_entry::Column::UserId.eq(user_id))
        .order_by_desc(ledger_entry::Column::CreatedAt)
        .order_by_desc(ledger_entry::Column::Id)
        .limit(limit.unwrap_or(DEFAULT_LEDGER_LIMIT))
        .all(db)
        .await
        .map_err(Into::into)
}
