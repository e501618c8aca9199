//! Ledger entry entity - the append-only record of balance mutations.
//!
//! One row is written per attempted credit or debit, successful or not. The
//! `reference` column is the caller-supplied idempotency key and is unique
//! across the whole ledger; rows are never updated after insert.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ledger entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Caller-supplied idempotency key, unique across the ledger
    #[sea_orm(unique)]
    pub reference: String,
    /// Member the operation was applied to
    pub user_id: String,
    /// Operation type: `"credit"` or `"debit"`
    pub entry_type: String,
    /// Origin tag, e.g. `"topup"`, `"auto"`, `"admin-adjustment"`
    pub source: String,
    /// Positive magnitude in minor currency units
    pub amount: i64,
    /// Outcome: `"completed"` or `"failed"`
    pub status: String,
    /// Human-readable description of the operation
    pub description: String,
    /// Opaque key-value bag supplied by the caller
    pub metadata: Option<Json>,
    /// Balance immediately after the operation, or the untouched pre-state
    /// balance when the operation failed
    pub balance_after: i64,
    /// Optional actor that triggered the operation
    pub created_by: Option<String>,
    /// When the operation was attempted
    pub created_at: DateTimeUtc,
}

/// Ledger entries reference wallets by `user_id` only; no schema-level relation
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
