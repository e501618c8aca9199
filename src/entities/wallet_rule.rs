//! Wallet rule entity - recurring auto-debit instructions.
//!
//! Each rule debits a fixed amount from one member's wallet on a cadence.
//! `next_run_at` always holds the next scheduled execution time; the scheduler
//! advances it after every run, successful or not.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wallet rule database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_rules")]
pub struct Model {
    /// Unique identifier for the rule
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Member whose wallet is debited
    pub user_id: String,
    /// Amount to debit each period, in minor currency units
    pub amount: i64,
    /// Cadence: `"daily"`, `"weekly"`, or `"monthly"`
    pub schedule: String,
    /// Description carried onto each ledger entry the rule produces
    pub description: String,
    /// Next scheduled execution time
    pub next_run_at: DateTimeUtc,
    /// Inactive rules are skipped by the scheduler
    pub active: bool,
    /// Operator who created the rule
    pub created_by: String,
    /// When the rule was created
    pub created_at: DateTimeUtc,
    /// When the rule was last modified
    pub updated_at: DateTimeUtc,
}

/// Rules reference wallets by `user_id` only; no schema-level relation
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
