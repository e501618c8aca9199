//! Wallet entity - one balance record per portal member.
//!
//! Wallets are keyed by the member's stable `user_id` and carry denormalized
//! display fields that are refreshed on every ensure call. Balances are stored
//! in minor currency units.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wallet database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    /// Stable member identifier, the wallet's key
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// Denormalized display email, overwritten on every ensure call
    pub email: String,
    /// Denormalized display name, overwritten on every ensure call
    pub name: String,
    /// Current balance in minor currency units; debits never drive it below zero
    pub balance: i64,
    /// When the wallet was first created
    pub created_at: DateTimeUtc,
    /// When the wallet was last mutated
    pub updated_at: DateTimeUtc,
}

/// Wallets, ledger entries, and rules are independent tables; lookups join on
/// `user_id` in application code.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
