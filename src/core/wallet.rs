//! Wallet business logic - Handles wallet lifecycle and balance primitives.
//!
//! Provides the upsert-style ensure operation, read-only lookups, bounded
//! administrative search, and the two atomic balance updates that every credit
//! and debit funnels through. Balance mutation is always a single UPDATE
//! statement so concurrent operations against the same wallet cannot interleave
//! a read-modify-write and lose updates or drive a balance negative.

use crate::{
    entities::{Wallet, wallet},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*, sea_query::Condition};

/// Maximum number of rows returned by [`search_wallets`].
const SEARCH_LIMIT: u64 = 20;

/// Creates the wallet for `user_id` if it does not exist, otherwise refreshes
/// its display fields.
///
/// The upsert never touches an existing balance, so it is safe to call on every
/// request that handles a wallet. Generic over [`ConnectionTrait`] so it can
/// run inside a surrounding database transaction.
pub async fn ensure_wallet<C>(
    db: &C,
    user_id: &str,
    email: &str,
    name: &str,
) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();

    if let Some(existing) = Wallet::find_by_id(user_id).one(db).await? {
        let mut active_model: wallet::ActiveModel = existing.into();
        active_model.email = Set(email.to_string());
        active_model.name = Set(name.to_string());
        active_model.updated_at = Set(now);
        return active_model.update(db).await.map_err(Into::into);
    }

    let new_wallet = wallet::ActiveModel {
        user_id: Set(user_id.to_string()),
        email: Set(email.to_string()),
        name: Set(name.to_string()),
        balance: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };
    new_wallet.insert(db).await.map_err(Into::into)
}

/// Finds a wallet by its member id, returning None if the member has no wallet
/// yet. Read-only, no side effects.
pub async fn get_wallet(db: &DatabaseConnection, user_id: &str) -> Result<Option<wallet::Model>> {
    Wallet::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Case-insensitive substring search across email, name, and member id.
///
/// Used by administrative tooling to locate a member's wallet; results are
/// capped at 20 rows.
pub async fn search_wallets(db: &DatabaseConnection, query: &str) -> Result<Vec<wallet::Model>> {
    use sea_orm::sea_query::{Expr, Func};

    let pattern = format!("%{}%", query.to_lowercase());
    Wallet::find()
        .filter(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(wallet::Column::Email))).like(pattern.as_str()))
                .add(Expr::expr(Func::lower(Expr::col(wallet::Column::Name))).like(pattern.as_str()))
                .add(
                    Expr::expr(Func::lower(Expr::col(wallet::Column::UserId)))
                        .like(pattern.as_str()),
                ),
        )
        .order_by_asc(wallet::Column::UserId)
        .limit(SEARCH_LIMIT)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds `amount_delta` to a wallet balance in a single atomic UPDATE.
///
/// The statement is `UPDATE wallets SET balance = balance + delta WHERE
/// user_id = ?`, so no balance read happens outside the database and
/// concurrent credits cannot lose updates.
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `user_id` - Wallet to update
/// * `amount_delta` - Amount to add to the balance
///
/// # Returns
/// The updated wallet model
pub async fn update_wallet_balance_atomic<C>(
    db: &C,
    user_id: &str,
    amount_delta: i64,
) -> Result<wallet::Model>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    Wallet::update_many()
        .col_expr(
            wallet::Column::Balance,
            Expr::col(wallet::Column::Balance).add(amount_delta),
        )
        .col_expr(wallet::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(wallet::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    Wallet::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::WalletNotFound {
            user_id: user_id.to_string(),
        })
}

/// Attempts to subtract `amount` from a wallet balance, refusing to go
/// negative.
///
/// The check and the decrement are one conditional UPDATE (`... SET balance =
/// balance - ? WHERE user_id = ? AND balance >= ?`), so two concurrent debits
/// can never both succeed against the same funds.
///
/// # Returns
/// `true` when the debit was applied, `false` when the balance was inadequate
/// or the wallet does not exist.
pub async fn try_debit_balance_atomic<C>(db: &C, user_id: &str, amount: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    use sea_orm::sea_query::Expr;

    let result = Wallet::update_many()
        .col_expr(
            wallet::Column::Balance,
            Expr::col(wallet::Column::Balance).sub(amount),
        )
        .col_expr(wallet::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(wallet::Column::UserId.eq(user_id))
        .filter(wallet::Column::Balance.gte(amount))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}
